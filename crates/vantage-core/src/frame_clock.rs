//! Frame and timer registration helpers.
//!
//! [`FrameClock`] wraps a [`RuntimeHandle`] and hands out registrations that
//! cancel themselves on drop, so a component that goes away mid-flight takes
//! its pending callbacks with it.

use crate::runtime::{FrameCallbackId, RuntimeHandle, TimerId};

/// Issues frame callbacks and one-shot timers against a runtime.
#[derive(Clone, Debug)]
pub struct FrameClock {
    runtime: RuntimeHandle,
}

impl FrameClock {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self { runtime }
    }

    #[inline]
    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.clone()
    }

    /// Runs `callback` on the next frame dispatch with the dispatch time in
    /// milliseconds. The registration cancels on drop.
    pub fn with_frame_millis(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> FrameCallbackRegistration {
        let id = self.runtime.register_frame_callback(callback);
        FrameCallbackRegistration {
            runtime: self.runtime.clone(),
            id,
        }
    }

    /// Runs `callback` once `delay_millis` has elapsed on the runtime's
    /// clock. The registration cancels on drop.
    pub fn after_millis(
        &self,
        delay_millis: u64,
        callback: impl FnOnce(u64) + 'static,
    ) -> TimerRegistration {
        let id = self.runtime.schedule_timer(delay_millis, callback);
        TimerRegistration {
            runtime: self.runtime.clone(),
            id,
        }
    }
}

/// Pending frame callback. Dropping it cancels the callback if it has not
/// run yet.
#[derive(Debug)]
pub struct FrameCallbackRegistration {
    runtime: RuntimeHandle,
    id: Option<FrameCallbackId>,
}

impl FrameCallbackRegistration {
    /// Registration that is already spent. Stands in where no callback was
    /// scheduled.
    pub fn inactive() -> Self {
        Self {
            runtime: RuntimeHandle::detached(),
            id: None,
        }
    }

    /// Whether the callback is still pending cancellation-wise. The flag is
    /// not cleared when the callback runs, only by [`cancel`](Self::cancel)
    /// or drop.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    pub fn cancel(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }
}

impl Drop for FrameCallbackRegistration {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Armed one-shot timer. Dropping it cancels the timer if it has not fired
/// yet.
#[derive(Debug)]
pub struct TimerRegistration {
    runtime: RuntimeHandle,
    id: Option<TimerId>,
}

impl TimerRegistration {
    /// Registration that is already spent.
    pub fn inactive() -> Self {
        Self {
            runtime: RuntimeHandle::detached(),
            id: None,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    pub fn cancel(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_timer(id);
        }
    }
}

impl Drop for TimerRegistration {
    fn drop(&mut self) {
        self.cancel();
    }
}
