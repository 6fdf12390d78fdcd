//! Scroll progress meter.
//!
//! Maps raw scroll geometry to a completion ratio in `[0, 1]`. The ratio is
//! recomputed synchronously on every scroll event (no coalescing; the math
//! is two arithmetic operations) and written through an equality gate, so
//! consumers only hear about actual changes.

use vantage_core::{MutableState, State};

/// Raw geometry reported by the scroll host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollMetrics {
    /// Scrolled distance from the top.
    pub scroll_top: f32,
    /// Total content height.
    pub scroll_height: f32,
    /// Height of the visible region.
    pub client_height: f32,
}

/// Completion ratio for `metrics`, always finite and in `[0, 1]`.
///
/// Content that does not scroll (`scroll_height <= client_height`) reads as
/// `0.0`, not an error and not a division by zero. Overscroll past either
/// end clamps. Non-finite garbage resolves to `0.0`.
pub fn progress_ratio(metrics: ScrollMetrics) -> f32 {
    let range = metrics.scroll_height - metrics.client_height;
    if !range.is_finite() || range <= 0.0 {
        return 0.0;
    }
    let ratio = metrics.scroll_top / range;
    if !ratio.is_finite() {
        return 0.0;
    }
    ratio.clamp(0.0, 1.0)
}

/// Push-based scroll progress state.
pub struct ScrollMeter {
    ratio: MutableState<f32>,
}

impl Default for ScrollMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollMeter {
    pub fn new() -> Self {
        Self {
            ratio: MutableState::new(0.0),
        }
    }

    /// Scroll event entry. Recomputes and publishes the ratio if it changed.
    pub fn on_scroll(&self, metrics: ScrollMetrics) {
        self.ratio.set_if_changed(progress_ratio(metrics));
    }

    /// Current completion ratio.
    #[inline]
    pub fn ratio(&self) -> f32 {
        self.ratio.value()
    }

    /// Watchable view of the ratio.
    pub fn ratio_state(&self) -> State<f32> {
        self.ratio.as_state()
    }
}

impl std::fmt::Debug for ScrollMeter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollMeter")
            .field("ratio", &self.ratio.value())
            .finish()
    }
}
