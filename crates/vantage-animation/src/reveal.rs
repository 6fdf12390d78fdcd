//! Reveal binding: visibility in, renderable style out.
//!
//! The mapping is pure. Every call computes the style from its inputs alone;
//! repeated application with unchanged inputs yields identical styles, so a
//! renderer may call it every frame without accumulating drift. A revealed
//! element always lands exactly on [`RevealStyle::IDENTITY`] regardless of
//! the entry direction.

use vantage_foundation::geometry::Point;
use vantage_foundation::visibility::VisibilitySubscription;

use crate::easing::Easing;

/// Hidden-state vertical entry distance.
const VERTICAL_ENTRY_OFFSET: f32 = 20.0;
/// Hidden-state horizontal entry distance.
const HORIZONTAL_ENTRY_OFFSET: f32 = 30.0;
/// Hidden-state scale for the zoom variant.
const ZOOM_ENTRY_SCALE: f32 = 0.95;

/// Which way an element travels as it reveals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RevealDirection {
    /// Rises into place from 20px below.
    #[default]
    Up,
    /// Drops into place from 20px above.
    Down,
    /// Slides in from 30px to the left.
    Left,
    /// Slides in from 30px to the right.
    Right,
    /// Fades in place, no travel.
    None,
}

/// Renderable presentation of one revealable element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealStyle {
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Translation from the element's laid-out position.
    pub offset: Point,
    /// Uniform scale about the element's center.
    pub scale: f32,
}

impl RevealStyle {
    /// Fully revealed: opaque, in place, unscaled.
    pub const IDENTITY: RevealStyle = RevealStyle {
        opacity: 1.0,
        offset: Point::ZERO,
        scale: 1.0,
    };

    const fn hidden_at(offset: Point) -> Self {
        Self {
            opacity: 0.0,
            offset,
            scale: 1.0,
        }
    }

    /// Linear interpolation between two styles at `t` in `[0, 1]`.
    pub fn lerp(from: RevealStyle, to: RevealStyle, t: f32) -> RevealStyle {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f32, b: f32| a + (b - a) * t;
        RevealStyle {
            opacity: mix(from.opacity, to.opacity),
            offset: Point::new(mix(from.offset.x, to.offset.x), mix(from.offset.y, to.offset.y)),
            scale: mix(from.scale, to.scale),
        }
    }
}

/// A hidden/shown style pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealVariant {
    pub hidden: RevealStyle,
    pub shown: RevealStyle,
}

impl RevealVariant {
    /// Rise-in fade, the default entry.
    pub const fn fade_in() -> Self {
        Self::directional(Point::new(0.0, VERTICAL_ENTRY_OFFSET))
    }

    /// Slide in from the left.
    pub const fn fade_in_left() -> Self {
        Self::directional(Point::new(-HORIZONTAL_ENTRY_OFFSET, 0.0))
    }

    /// Slide in from the right.
    pub const fn fade_in_right() -> Self {
        Self::directional(Point::new(HORIZONTAL_ENTRY_OFFSET, 0.0))
    }

    /// Grow from 95% scale, no travel.
    pub const fn zoom_in() -> Self {
        Self {
            hidden: RevealStyle {
                opacity: 0.0,
                offset: Point::ZERO,
                scale: ZOOM_ENTRY_SCALE,
            },
            shown: RevealStyle::IDENTITY,
        }
    }

    /// The variant a given travel direction denotes.
    pub const fn from_direction(direction: RevealDirection) -> Self {
        match direction {
            RevealDirection::Up => Self::fade_in(),
            RevealDirection::Down => Self::directional(Point::new(0.0, -VERTICAL_ENTRY_OFFSET)),
            RevealDirection::Left => Self::fade_in_left(),
            RevealDirection::Right => Self::fade_in_right(),
            RevealDirection::None => Self::directional(Point::ZERO),
        }
    }

    const fn directional(offset: Point) -> Self {
        Self {
            hidden: RevealStyle::hidden_at(offset),
            shown: RevealStyle::IDENTITY,
        }
    }

    /// Style for the given visibility.
    pub fn resolve(&self, visible: bool) -> RevealStyle {
        if visible {
            self.shown
        } else {
            self.hidden
        }
    }
}

/// Transition applied while a style change settles. The defaults mirror a
/// 600 ms `ease-out` CSS transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealTransition {
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Default for RevealTransition {
    fn default() -> Self {
        Self {
            duration_ms: 600,
            easing: Easing::EaseOut,
        }
    }
}

impl RevealTransition {
    /// Eased progress after `elapsed_ms`, in `[0, 1]`. Zero-duration
    /// transitions complete instantly.
    pub fn progress(&self, elapsed_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let linear = (elapsed_ms as f32 / self.duration_ms as f32).clamp(0.0, 1.0);
        self.easing.apply(linear)
    }
}

/// Style for a direction at a given visibility. Pure and idempotent.
pub fn reveal_style(visible: bool, direction: RevealDirection) -> RevealStyle {
    RevealVariant::from_direction(direction).resolve(visible)
}

/// Style driven by a live subscription's current visibility.
pub fn reveal_style_for(
    subscription: &VisibilitySubscription,
    direction: RevealDirection,
) -> RevealStyle {
    reveal_style(subscription.is_visible(), direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use std::sync::Arc;
    use vantage_core::{DefaultScheduler, Runtime};
    use vantage_foundation::host::{
        ElementId, IntersectionHost, IntersectionWatchId, WatchOptions,
    };
    use vantage_foundation::visibility::{VisibilityConfig, VisibilityObserver};

    #[test]
    fn every_direction_lands_on_identity_when_visible() {
        for direction in [
            RevealDirection::Up,
            RevealDirection::Down,
            RevealDirection::Left,
            RevealDirection::Right,
            RevealDirection::None,
        ] {
            assert_eq!(reveal_style(true, direction), RevealStyle::IDENTITY);
        }
    }

    #[test]
    fn hidden_offsets_follow_the_travel_direction() {
        assert_eq!(
            reveal_style(false, RevealDirection::Up).offset,
            Point::new(0.0, 20.0)
        );
        assert_eq!(
            reveal_style(false, RevealDirection::Down).offset,
            Point::new(0.0, -20.0)
        );
        assert_eq!(
            reveal_style(false, RevealDirection::Left).offset,
            Point::new(-30.0, 0.0)
        );
        assert_eq!(
            reveal_style(false, RevealDirection::Right).offset,
            Point::new(30.0, 0.0)
        );
        assert_eq!(reveal_style(false, RevealDirection::None).offset, Point::ZERO);
    }

    #[test]
    fn hidden_styles_are_transparent_and_unscaled() {
        for direction in [
            RevealDirection::Up,
            RevealDirection::Down,
            RevealDirection::Left,
            RevealDirection::Right,
            RevealDirection::None,
        ] {
            let style = reveal_style(false, direction);
            assert_eq!(style.opacity, 0.0);
            assert_eq!(style.scale, 1.0);
        }
    }

    #[test]
    fn zoom_variant_grows_from_95_percent() {
        let variant = RevealVariant::zoom_in();
        assert_eq!(variant.hidden.scale, 0.95);
        assert_eq!(variant.hidden.opacity, 0.0);
        assert_eq!(variant.hidden.offset, Point::ZERO);
        assert_eq!(variant.resolve(true), RevealStyle::IDENTITY);
    }

    #[test]
    fn lerp_blends_all_channels() {
        let variant = RevealVariant::fade_in();
        let mid = RevealStyle::lerp(variant.hidden, variant.shown, 0.5);
        assert_eq!(mid.opacity, 0.5);
        assert_eq!(mid.offset, Point::new(0.0, 10.0));
        assert_eq!(mid.scale, 1.0);
    }

    #[test]
    fn default_transition_is_600ms_ease_out() {
        let transition = RevealTransition::default();
        assert_eq!(transition.duration_ms, 600);
        assert_eq!(transition.easing, Easing::EaseOut);

        assert_eq!(transition.progress(0), 0.0);
        assert_eq!(transition.progress(600), 1.0);
        assert_eq!(transition.progress(10_000), 1.0);
        let early = transition.progress(150);
        assert!(early > 0.25 && early < 1.0);
    }

    #[test]
    fn zero_duration_transition_completes_instantly() {
        let transition = RevealTransition {
            duration_ms: 0,
            easing: Easing::Linear,
        };
        assert_eq!(transition.progress(0), 1.0);
    }

    struct AlwaysWatch;

    impl IntersectionHost for AlwaysWatch {
        fn watch(&self, _: ElementId, _: WatchOptions) -> Option<IntersectionWatchId> {
            Some(1)
        }

        fn unwatch(&self, _: IntersectionWatchId) {}
    }

    #[test]
    fn subscription_visibility_drives_the_style() {
        let runtime = Runtime::new(Arc::new(DefaultScheduler));
        let observer = VisibilityObserver::new(runtime.handle(), Rc::new(AlwaysWatch));
        let element = ElementId(3);
        let sub = observer.observe(Some(element), VisibilityConfig::default());

        assert_eq!(
            reveal_style_for(&sub, RevealDirection::Up),
            reveal_style(false, RevealDirection::Up)
        );

        observer.on_intersection(element, true);
        assert_eq!(
            reveal_style_for(&sub, RevealDirection::Up),
            RevealStyle::IDENTITY
        );
    }
}
