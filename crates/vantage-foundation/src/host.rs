//! Host capability traits.
//!
//! The components in this crate never talk to a platform directly. The
//! embedder supplies an [`IntersectionHost`] for viewport crossings, an
//! [`InteractiveProbe`] for pointer-target classification, and a
//! [`PointerClass`] describing the primary input device. Every capability
//! may be absent or degraded; the components resolve that locally (fail-open
//! visibility, disabled tracking) and nothing here returns an error to page
//! code.

use crate::geometry::Point;

/// Opaque handle for a trackable element, minted by the embedder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

/// Identifier for an active intersection watch.
pub type IntersectionWatchId = u64;

/// Geometry options for an intersection watch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WatchOptions {
    /// Fraction of the element that must be inside the viewport, in `[0, 1]`.
    pub threshold: f32,
    /// Margin added around the viewport before the threshold test, in
    /// CSS-pixel-like units. Positive values grow the viewport.
    pub root_margin: f32,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: 0.0,
        }
    }
}

/// Viewport-intersection detection facility.
///
/// The host calls back into
/// [`VisibilityObserver::on_intersection`](crate::visibility::VisibilityObserver::on_intersection)
/// whenever a watched element crosses its threshold. Implementations must
/// tolerate `unwatch` being called while such a dispatch is still running;
/// observers release watches from inside their own transition handling.
pub trait IntersectionHost {
    /// Starts watching `element`. `None` means the facility is unavailable;
    /// callers fail open.
    fn watch(&self, element: ElementId, options: WatchOptions) -> Option<IntersectionWatchId>;

    /// Stops a watch. Unknown ids are ignored.
    fn unwatch(&self, watch: IntersectionWatchId);
}

/// Pointer-target classification facility: whether the element under a
/// viewport position is interactive (links, buttons, anything styled as a
/// pointer target).
pub trait InteractiveProbe {
    fn is_interactive_at(&self, position: Point) -> bool;
}

/// Host-reported primary input class, in the web `pointer:` media-query
/// vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerClass {
    /// Precise device such as a mouse or trackpad.
    Fine,
    /// Imprecise device such as a touchscreen.
    Coarse,
    /// No pointing device at all.
    None,
}

impl PointerClass {
    /// Whether a pointer tracker should run for this class. Only `Fine`
    /// devices get hover feedback.
    #[inline]
    pub fn supports_tracking(self) -> bool {
        matches!(self, PointerClass::Fine)
    }
}
