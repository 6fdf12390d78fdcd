//! Host abstraction traits.
//!
//! A host embeds the runtime by providing two small services: a
//! [`RuntimeScheduler`] that requests a frame dispatch from whatever drives
//! the host's loop, and a [`Clock`] that supplies the millisecond timestamps
//! fed back into [`RuntimeHandle::drain_frame_callbacks`] and
//! [`RuntimeHandle::fire_timers`].
//!
//! [`RuntimeHandle::drain_frame_callbacks`]: crate::runtime::RuntimeHandle::drain_frame_callbacks
//! [`RuntimeHandle::fire_timers`]: crate::runtime::RuntimeHandle::fire_timers

use std::fmt::Debug;

/// Requests frame dispatches from the host event loop.
///
/// Implementations must be cheap and idempotent: the runtime may call
/// [`schedule_frame`](RuntimeScheduler::schedule_frame) several times before
/// the host gets around to a single dispatch, and the host owes at most one
/// dispatch per burst of requests.
pub trait RuntimeScheduler: Send + Sync {
    /// Ask the host to call `drain_frame_callbacks` soon.
    fn schedule_frame(&self);
}

/// Monotonic time source owned by the host.
pub trait Clock {
    /// Host-specific instant type.
    type Instant: Copy + Debug;

    /// Current instant.
    fn now(&self) -> Self::Instant;

    /// Milliseconds elapsed since `earlier`.
    fn millis_since(&self, earlier: Self::Instant) -> u64;
}
