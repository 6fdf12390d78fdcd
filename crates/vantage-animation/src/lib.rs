//! Reveal styling for Vantage.
//!
//! Pure mapping from visibility to renderable style. The stateful side
//! (when an element counts as visible) lives in `vantage-foundation`; this
//! crate only answers what a visible or hidden element looks like and how
//! the change between the two is timed.

pub mod easing;
pub mod reveal;

pub use easing::Easing;
pub use reveal::{
    reveal_style, reveal_style_for, RevealDirection, RevealStyle, RevealTransition, RevealVariant,
};
