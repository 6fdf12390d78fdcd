//! Wall-clock host services.
//!
//! Binds the Vantage runtime to real time: [`StdScheduler`] latches frame
//! requests (optionally waking a parked host loop), [`StdClock`] reads a
//! monotonic wasm-safe instant, and [`StdHost`] bundles the two with a
//! [`Runtime`] behind a simple `tick` / `next_wake` surface:
//!
//! ```no_run
//! use vantage_runtime_std::StdHost;
//!
//! let host = StdHost::new();
//! loop {
//!     host.tick();
//!     if let Some(wait) = host.next_wake() {
//!         std::thread::sleep(wait);
//!     } else {
//!         break; // nothing scheduled
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vantage_core::{Clock, Runtime, RuntimeHandle, RuntimeScheduler};
use web_time::Instant;

type Waker = Box<dyn Fn() + Send + Sync>;

/// Frame-request latch with an optional waker for parked loops.
#[derive(Default)]
pub struct StdScheduler {
    frame_requested: AtomicBool,
    waker: Mutex<Option<Waker>>,
}

impl StdScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Installs a callback invoked on every frame request, replacing any
    /// previous one. Hosts park on a condvar or channel and wake here.
    pub fn set_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut slot) = self.waker.lock() {
            *slot = Some(Box::new(waker));
        }
    }

    pub fn clear_waker(&self) {
        if let Ok(mut slot) = self.waker.lock() {
            slot.take();
        }
    }

    /// Consumes the latch: whether a frame was requested since the last take.
    pub fn take_frame_request(&self) -> bool {
        self.frame_requested.swap(false, Ordering::AcqRel)
    }

    /// Peeks the latch without consuming it.
    pub fn frame_requested(&self) -> bool {
        self.frame_requested.load(Ordering::Acquire)
    }
}

impl RuntimeScheduler for StdScheduler {
    fn schedule_frame(&self) {
        self.frame_requested.store(true, Ordering::Release);
        if let Ok(slot) = self.waker.lock() {
            if let Some(waker) = slot.as_ref() {
                waker();
            }
        }
    }
}

impl std::fmt::Debug for StdScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdScheduler")
            .field("frame_requested", &self.frame_requested())
            .finish()
    }
}

/// Monotonic clock over [`web_time::Instant`], so the same host code runs
/// native and on wasm.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn millis_since(&self, earlier: Instant) -> u64 {
        self.now().duration_since(earlier).as_millis() as u64
    }
}

/// Runtime plus wall-clock plumbing, driven by a host loop.
pub struct StdHost {
    runtime: Runtime,
    scheduler: Arc<StdScheduler>,
    clock: StdClock,
    start: Instant,
}

impl Default for StdHost {
    fn default() -> Self {
        Self::new()
    }
}

impl StdHost {
    pub fn new() -> Self {
        let scheduler = StdScheduler::new();
        let runtime = Runtime::new(scheduler.clone());
        let clock = StdClock;
        let start = clock.now();
        Self {
            runtime,
            scheduler,
            clock,
            start,
        }
    }

    #[inline]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    #[inline]
    pub fn scheduler(&self) -> &Arc<StdScheduler> {
        &self.scheduler
    }

    /// Milliseconds since the host was created.
    pub fn now_millis(&self) -> u64 {
        self.clock.millis_since(self.start)
    }

    /// One host-loop iteration: fires due timers, then drains frame
    /// callbacks if a frame was requested (including by a timer that just
    /// fired). Returns whether a frame ran.
    pub fn tick(&self) -> bool {
        let now = self.now_millis();
        self.runtime.fire_timers(now);
        let frame_wanted = self.scheduler.take_frame_request() || self.runtime.needs_frame();
        if frame_wanted {
            self.runtime.drain_frame_callbacks(now);
        }
        frame_wanted
    }

    /// How long the loop may sleep before the next scheduled work, or
    /// `None` when nothing at all is scheduled. A pending frame request
    /// reads as zero.
    pub fn next_wake(&self) -> Option<Duration> {
        if self.runtime.needs_frame() || self.scheduler.frame_requested() {
            return Some(Duration::ZERO);
        }
        self.runtime.next_timer_deadline().map(|deadline| {
            Duration::from_millis(deadline.saturating_sub(self.now_millis()))
        })
    }
}

impl std::fmt::Debug for StdHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdHost")
            .field("now_millis", &self.now_millis())
            .field("needs_frame", &self.runtime.needs_frame())
            .finish()
    }
}
