//! Viewport- and pointer-driven UI feedback primitives.
//!
//! This crate turns asynchronous, high-frequency host signals into
//! low-frequency, idempotent UI state:
//!
//! - [`VisibilityObserver`](visibility::VisibilityObserver) resolves raw
//!   viewport-intersection crossings into per-element reveal phases, with
//!   optional activation delays and one-shot settling.
//! - [`PointerTracker`](pointer::PointerTracker) coalesces pointer moves to
//!   one committed sample per frame and throttles target classification.
//! - [`ScrollMeter`](scroll::ScrollMeter) maps scroll geometry to a clamped
//!   completion ratio.
//!
//! Components never talk to a platform directly; embedders supply the
//! capability traits in [`host`] and drive the [`vantage_core`] runtime.
//! Absent capabilities degrade locally (fail-open visibility, disabled
//! tracking); nothing returns an error to page code.

pub mod geometry;
pub mod host;
pub mod pointer;
pub mod scroll;
pub mod visibility;

pub use geometry::{Point, Rect};
pub use host::{
    ElementId, InteractiveProbe, IntersectionHost, IntersectionWatchId, PointerClass, WatchOptions,
};
pub use pointer::{PointerSample, PointerSnapshot, PointerTracker, CLASSIFY_INTERVAL_MS};
pub use scroll::{progress_ratio, ScrollMeter, ScrollMetrics};
pub use visibility::{
    VisibilityConfig, VisibilityObserver, VisibilityPhase, VisibilitySubscription,
};
