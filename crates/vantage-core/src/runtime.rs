//! Single-threaded dispatch runtime.
//!
//! [`Runtime`] owns two registries: frame callbacks, which run on the next
//! host frame dispatch, and one-shot timers, which run once their deadline
//! passes. The host drives both explicitly by calling
//! [`drain_frame_callbacks`](Runtime::drain_frame_callbacks) and
//! [`fire_timers`](Runtime::fire_timers) with its clock's current
//! millisecond reading. Nothing here spawns threads or blocks; a host that
//! sleeps can ask [`next_timer_deadline`](Runtime::next_timer_deadline) how
//! long it may sleep for.
//!
//! Components hold a [`RuntimeHandle`], a weak reference that degrades to
//! no-ops once the runtime is gone, so a stray handle kept by a disposed
//! component can never prolong the runtime's life or crash a teardown path.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::platform::RuntimeScheduler;

/// Identifier for a registered frame callback.
pub type FrameCallbackId = u64;

/// Identifier for an armed one-shot timer.
pub type TimerId = u64;

type DispatchFn = Box<dyn FnOnce(u64)>;

struct FrameCallbackEntry {
    id: FrameCallbackId,
    callback: DispatchFn,
}

struct TimerEntry {
    id: TimerId,
    deadline_millis: u64,
    callback: DispatchFn,
}

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    needs_frame: Cell<bool>,
    now_millis: Cell<u64>,
    frame_count: Cell<u64>,
    frame_callbacks: RefCell<VecDeque<FrameCallbackEntry>>,
    next_frame_callback_id: Cell<u64>,
    timers: RefCell<Vec<TimerEntry>>,
    next_timer_id: Cell<u64>,
    dispatching: Cell<bool>,
}

impl RuntimeInner {
    fn request_frame(&self) {
        self.needs_frame.set(true);
        self.scheduler.schedule_frame();
    }

    fn register_frame_callback(&self, callback: DispatchFn) -> FrameCallbackId {
        let id = self.next_frame_callback_id.get();
        self.next_frame_callback_id.set(id + 1);
        self.frame_callbacks
            .borrow_mut()
            .push_back(FrameCallbackEntry { id, callback });
        self.request_frame();
        id
    }

    fn cancel_frame_callback(&self, id: FrameCallbackId) {
        let mut callbacks = self.frame_callbacks.borrow_mut();
        callbacks.retain(|entry| entry.id != id);
        if callbacks.is_empty() {
            self.needs_frame.set(false);
        }
    }

    fn drain_frame_callbacks(&self, now_millis: u64) {
        if self.dispatching.get() {
            return;
        }
        self.dispatching.set(true);
        self.now_millis.set(now_millis);
        self.frame_count.set(self.frame_count.get() + 1);
        self.needs_frame.set(false);
        // Snapshot first: callbacks registered while draining run on the
        // next frame, never this one.
        let pending = std::mem::take(&mut *self.frame_callbacks.borrow_mut());
        for entry in pending {
            (entry.callback)(now_millis);
        }
        self.dispatching.set(false);
    }

    fn schedule_timer(&self, delay_millis: u64, callback: DispatchFn) -> TimerId {
        let id = self.next_timer_id.get();
        self.next_timer_id.set(id + 1);
        let deadline_millis = self.now_millis.get().saturating_add(delay_millis);
        self.timers.borrow_mut().push(TimerEntry {
            id,
            deadline_millis,
            callback,
        });
        id
    }

    fn cancel_timer(&self, id: TimerId) {
        self.timers.borrow_mut().retain(|entry| entry.id != id);
    }

    fn fire_timers(&self, now_millis: u64) {
        if self.dispatching.get() {
            return;
        }
        self.dispatching.set(true);
        self.now_millis.set(now_millis);
        // Snapshot the due set before running anything: a timer armed from
        // inside a timer callback waits for a later call even when its
        // deadline is already past.
        let mut due = Vec::new();
        {
            let mut timers = self.timers.borrow_mut();
            let mut index = 0;
            while index < timers.len() {
                if timers[index].deadline_millis <= now_millis {
                    due.push(timers.remove(index));
                } else {
                    index += 1;
                }
            }
        }
        // Entries are stored in arming order, so a stable sort keeps ties
        // firing in the order they were armed.
        due.sort_by_key(|entry| entry.deadline_millis);
        for entry in due {
            (entry.callback)(now_millis);
        }
        self.dispatching.set(false);
    }

    fn next_timer_deadline(&self) -> Option<u64> {
        self.timers
            .borrow()
            .iter()
            .map(|entry| entry.deadline_millis)
            .min()
    }
}

/// Owner of the dispatch registries. Hosts create one per event loop.
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner {
                scheduler,
                needs_frame: Cell::new(false),
                now_millis: Cell::new(0),
                frame_count: Cell::new(0),
                frame_callbacks: RefCell::new(VecDeque::new()),
                next_frame_callback_id: Cell::new(1),
                timers: RefCell::new(Vec::new()),
                next_timer_id: Cell::new(1),
                dispatching: Cell::new(false),
            }),
        }
    }

    /// Weak handle for components. Cheap to clone.
    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether a frame dispatch is currently wanted.
    #[inline]
    pub fn needs_frame(&self) -> bool {
        self.inner.needs_frame.get()
    }

    pub fn set_needs_frame(&self, needs_frame: bool) {
        self.inner.needs_frame.set(needs_frame);
        if needs_frame {
            self.inner.scheduler.schedule_frame();
        }
    }

    /// Timestamp of the most recent dispatch, in milliseconds.
    #[inline]
    pub fn now_millis(&self) -> u64 {
        self.inner.now_millis.get()
    }

    /// Ordinal of the most recent frame dispatch. Starts at zero and
    /// increments once per [`drain_frame_callbacks`](Self::drain_frame_callbacks).
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.inner.frame_count.get()
    }

    pub fn register_frame_callback(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> FrameCallbackId {
        self.inner.register_frame_callback(Box::new(callback))
    }

    pub fn cancel_frame_callback(&self, id: FrameCallbackId) {
        self.inner.cancel_frame_callback(id);
    }

    /// Runs every frame callback registered before this call, passing
    /// `now_millis` through. Hosts must supply nondecreasing timestamps.
    pub fn drain_frame_callbacks(&self, now_millis: u64) {
        self.inner.drain_frame_callbacks(now_millis);
    }

    pub fn schedule_timer(
        &self,
        delay_millis: u64,
        callback: impl FnOnce(u64) + 'static,
    ) -> TimerId {
        self.inner.schedule_timer(delay_millis, Box::new(callback))
    }

    pub fn cancel_timer(&self, id: TimerId) {
        self.inner.cancel_timer(id);
    }

    /// Runs every timer whose deadline is at or before `now_millis`, in
    /// deadline order. Hosts must supply nondecreasing timestamps.
    pub fn fire_timers(&self, now_millis: u64) {
        self.inner.fire_timers(now_millis);
    }

    /// Earliest armed deadline, if any. Sleeping hosts use this as their
    /// wake bound.
    pub fn next_timer_deadline(&self) -> Option<u64> {
        self.inner.next_timer_deadline()
    }
}

/// Weak reference to a [`Runtime`].
///
/// Every method is a no-op (or returns `None`) once the runtime is dropped.
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
}

impl RuntimeHandle {
    /// Handle that was never attached to a runtime. Useful as a default in
    /// tests and inert components.
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    /// Whether the backing runtime is still alive.
    pub fn is_attached(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn register_frame_callback(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> Option<FrameCallbackId> {
        self.inner
            .upgrade()
            .map(|inner| inner.register_frame_callback(Box::new(callback)))
    }

    pub fn cancel_frame_callback(&self, id: FrameCallbackId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_frame_callback(id);
        }
    }

    pub fn drain_frame_callbacks(&self, now_millis: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_frame_callbacks(now_millis);
        }
    }

    pub fn schedule_timer(
        &self,
        delay_millis: u64,
        callback: impl FnOnce(u64) + 'static,
    ) -> Option<TimerId> {
        self.inner
            .upgrade()
            .map(|inner| inner.schedule_timer(delay_millis, Box::new(callback)))
    }

    pub fn cancel_timer(&self, id: TimerId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_timer(id);
        }
    }

    pub fn fire_timers(&self, now_millis: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.fire_timers(now_millis);
        }
    }

    pub fn next_timer_deadline(&self) -> Option<u64> {
        self.inner.upgrade().and_then(|inner| inner.next_timer_deadline())
    }

    pub fn needs_frame(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.needs_frame.get())
            .unwrap_or(false)
    }

    pub fn set_needs_frame(&self, needs_frame: bool) {
        if let Some(inner) = self.inner.upgrade() {
            inner.needs_frame.set(needs_frame);
            if needs_frame {
                inner.scheduler.schedule_frame();
            }
        }
    }

    /// Timestamp of the most recent dispatch, or zero when detached.
    pub fn now_millis(&self) -> u64 {
        self.inner
            .upgrade()
            .map(|inner| inner.now_millis.get())
            .unwrap_or(0)
    }

    /// Ordinal of the most recent frame dispatch, or zero when detached.
    pub fn frame_count(&self) -> u64 {
        self.inner
            .upgrade()
            .map(|inner| inner.frame_count.get())
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Scheduler that never requests frames. For hosts that dispatch on their
/// own cadence regardless of demand.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
