//! Pointer tracker.
//!
//! Raw pointer moves arrive far faster than the render pipeline wants
//! updates, so the tracker splits the work across two cadences. Every move
//! overwrites a single pending slot and arms at most one frame callback;
//! when the frame drains, the last written position becomes the committed
//! sample for that frame. Classification (is the pointer over something
//! interactive) runs on the move event itself but no more than once per
//! [`CLASSIFY_INTERVAL_MS`], and writes through an equality gate so a burst
//! of identical answers produces zero state changes.
//!
//! Hosts whose primary input cannot hover ([`PointerClass::Coarse`] or
//! [`PointerClass::None`]) get a tracker that is disabled from birth: every
//! dispatch is a no-op and nothing is ever registered with the runtime.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use vantage_core::{FrameCallbackRegistration, FrameClock, MutableState, RuntimeHandle, State};

use crate::geometry::Point;
use crate::host::{InteractiveProbe, PointerClass};

/// Minimum spacing between two pointer-target classifications.
pub const CLASSIFY_INTERVAL_MS: u64 = 100;

/// Position committed by a frame drain, tagged with the frame ordinal that
/// committed it. No two commits share a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub position: Point,
    pub frame: u64,
}

/// Poll-style view of the tracker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSnapshot {
    pub position: Point,
    pub over_interactive: bool,
    pub in_viewport: bool,
    pub enabled: bool,
}

struct TrackerInner {
    clock: FrameClock,
    runtime: RuntimeHandle,
    probe: Rc<dyn InteractiveProbe>,
    enabled: Cell<bool>,
    pending: Cell<Option<Point>>,
    frame_request: RefCell<Option<FrameCallbackRegistration>>,
    committed: MutableState<PointerSample>,
    over_interactive: MutableState<bool>,
    in_viewport: MutableState<bool>,
    last_classified_at: Cell<Option<u64>>,
}

impl TrackerInner {
    fn commit(&self) {
        // Release the request slot first so a watcher below may arm a fresh
        // one for the next frame.
        self.frame_request.borrow_mut().take();
        let Some(position) = self.pending.take() else {
            return;
        };
        let frame = self.runtime.frame_count();
        if self.committed.with(|sample| sample.position != position) {
            self.committed.set(PointerSample { position, frame });
        }
    }

    fn maybe_classify(&self, position: Point) {
        let now = self.runtime.now_millis();
        let due = match self.last_classified_at.get() {
            None => true,
            Some(last) => now.saturating_sub(last) >= CLASSIFY_INTERVAL_MS,
        };
        if !due {
            return;
        }
        self.last_classified_at.set(Some(now));
        let interactive = self.probe.is_interactive_at(position);
        self.over_interactive.set_if_changed(interactive);
    }
}

/// Frame-coalescing pointer state tracker.
pub struct PointerTracker {
    inner: Rc<TrackerInner>,
}

impl PointerTracker {
    pub fn new(
        runtime: RuntimeHandle,
        class: PointerClass,
        probe: Rc<dyn InteractiveProbe>,
    ) -> Self {
        let enabled = class.supports_tracking();
        if !enabled {
            log::debug!("pointer tracker idle for {class:?} input");
        }
        Self {
            inner: Rc::new(TrackerInner {
                clock: FrameClock::new(runtime.clone()),
                runtime,
                probe,
                enabled: Cell::new(enabled),
                pending: Cell::new(None),
                frame_request: RefCell::new(None),
                committed: MutableState::new(PointerSample {
                    position: Point::ZERO,
                    frame: 0,
                }),
                over_interactive: MutableState::new(false),
                in_viewport: MutableState::new(false),
                last_classified_at: Cell::new(None),
            }),
        }
    }

    /// Raw move event. Overwrites the pending sample (last write wins within
    /// a frame) and classifies the target if the throttle window has passed.
    pub fn on_pointer_move(&self, position: Point) {
        let inner = &self.inner;
        if !inner.enabled.get() {
            return;
        }
        inner.pending.set(Some(position));
        if inner.frame_request.borrow().is_none() {
            let weak = Rc::downgrade(inner);
            let registration = inner.clock.with_frame_millis(move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.commit();
                }
            });
            // A detached runtime yields a spent registration; keep the slot
            // free so nothing blocks if the runtime comes back never.
            if registration.is_active() {
                *inner.frame_request.borrow_mut() = Some(registration);
            }
        }
        inner.maybe_classify(position);
    }

    /// Pointer entered the tracked viewport. Idempotent.
    pub fn on_pointer_enter(&self) {
        if self.inner.enabled.get() {
            self.inner.in_viewport.set_if_changed(true);
        }
    }

    /// Pointer left the tracked viewport. Idempotent.
    pub fn on_pointer_leave(&self) {
        if self.inner.enabled.get() {
            self.inner.in_viewport.set_if_changed(false);
        }
    }

    /// Turns the tracker off: cancels any armed frame request, drops the
    /// pending sample, and makes every later dispatch a no-op.
    pub fn disable(&self) {
        if !self.inner.enabled.get() {
            return;
        }
        self.inner.enabled.set(false);
        self.inner.pending.take();
        self.inner.frame_request.borrow_mut().take();
        log::debug!("pointer tracker disabled");
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    pub fn snapshot(&self) -> PointerSnapshot {
        PointerSnapshot {
            position: self.inner.committed.with(|sample| sample.position),
            over_interactive: self.inner.over_interactive.value(),
            in_viewport: self.inner.in_viewport.value(),
            enabled: self.inner.enabled.get(),
        }
    }

    /// Committed sample, updated at most once per frame.
    pub fn sample_state(&self) -> State<PointerSample> {
        self.inner.committed.as_state()
    }

    /// Classification flag, updated at most once per throttle window.
    pub fn interactive_state(&self) -> State<bool> {
        self.inner.over_interactive.as_state()
    }

    /// Viewport presence flag.
    pub fn viewport_state(&self) -> State<bool> {
        self.inner.in_viewport.as_state()
    }
}

impl std::fmt::Debug for PointerTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerTracker")
            .field("enabled", &self.inner.enabled.get())
            .field("pending", &self.inner.pending.get().is_some())
            .finish()
    }
}
