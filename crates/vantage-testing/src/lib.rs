//! Deterministic headless harness for Vantage components.
//!
//! Nothing here touches wall-clock time. [`VantageTestRule`] owns a runtime
//! and a manual millisecond clock; tests inject synthetic intersection,
//! pointer, and scroll events, then advance time explicitly and assert on
//! the resulting state. The hosts are instrumented so teardown tests can
//! check that every watch and callback was released.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;

use vantage_core::{Runtime, RuntimeHandle, RuntimeScheduler};
use vantage_foundation::geometry::{Point, Rect};
use vantage_foundation::host::{
    ElementId, InteractiveProbe, IntersectionHost, IntersectionWatchId, PointerClass, WatchOptions,
};
use vantage_foundation::pointer::PointerTracker;
use vantage_foundation::scroll::ScrollMeter;
use vantage_foundation::visibility::VisibilityObserver;

/// Milliseconds per synthetic frame, a 60 Hz cadence.
pub const FRAME_INTERVAL_MS: u64 = 16;

/// Scheduler that only counts frame requests; the rule drains explicitly.
#[derive(Default)]
pub struct TestScheduler {
    requests: AtomicUsize,
}

impl TestScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Total frame requests since construction.
    pub fn frame_requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl RuntimeScheduler for TestScheduler {
    fn schedule_frame(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

struct WatchEntry {
    element: ElementId,
    options: WatchOptions,
}

/// Instrumented intersection facility.
///
/// Mints watch ids and keeps a live table so tests can assert that
/// observers release exactly what they acquired. The [`disabled`]
/// constructor refuses every watch, which exercises the fail-open path.
///
/// [`disabled`]: TestIntersectionHost::disabled
pub struct TestIntersectionHost {
    enabled: bool,
    next_id: Cell<IntersectionWatchId>,
    watches: RefCell<IndexMap<IntersectionWatchId, WatchEntry>>,
    total: Cell<usize>,
}

impl TestIntersectionHost {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            enabled: true,
            next_id: Cell::new(1),
            watches: RefCell::new(IndexMap::new()),
            total: Cell::new(0),
        })
    }

    /// Host without the facility: every `watch` returns `None`.
    pub fn disabled() -> Rc<Self> {
        Rc::new(Self {
            enabled: false,
            next_id: Cell::new(1),
            watches: RefCell::new(IndexMap::new()),
            total: Cell::new(0),
        })
    }

    /// Watches currently held against this host.
    pub fn active_watch_count(&self) -> usize {
        self.watches.borrow().len()
    }

    /// Watches ever granted, released or not.
    pub fn total_watches(&self) -> usize {
        self.total.get()
    }

    /// Whether some active watch covers `element`.
    pub fn is_watching(&self, element: ElementId) -> bool {
        self.watches
            .borrow()
            .values()
            .any(|entry| entry.element == element)
    }

    /// Options of the first active watch on `element`.
    pub fn watch_options(&self, element: ElementId) -> Option<WatchOptions> {
        self.watches
            .borrow()
            .values()
            .find(|entry| entry.element == element)
            .map(|entry| entry.options)
    }
}

impl IntersectionHost for TestIntersectionHost {
    fn watch(&self, element: ElementId, options: WatchOptions) -> Option<IntersectionWatchId> {
        if !self.enabled {
            return None;
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.watches
            .borrow_mut()
            .insert(id, WatchEntry { element, options });
        self.total.set(self.total.get() + 1);
        Some(id)
    }

    fn unwatch(&self, watch: IntersectionWatchId) {
        self.watches.borrow_mut().shift_remove(&watch);
    }
}

/// Interactive-target probe backed by a list of rectangles: anything inside
/// a region counts as interactive. Probe calls are counted for throttle
/// assertions.
pub struct RegionProbe {
    regions: RefCell<Vec<Rect>>,
    probes: Cell<usize>,
}

impl RegionProbe {
    pub fn new(regions: Vec<Rect>) -> Rc<Self> {
        Rc::new(Self {
            regions: RefCell::new(regions),
            probes: Cell::new(0),
        })
    }

    pub fn empty() -> Rc<Self> {
        Self::new(Vec::new())
    }

    pub fn add_region(&self, region: Rect) {
        self.regions.borrow_mut().push(region);
    }

    pub fn clear(&self) {
        self.regions.borrow_mut().clear();
    }

    /// Number of classification probes performed.
    pub fn probe_count(&self) -> usize {
        self.probes.get()
    }
}

impl InteractiveProbe for RegionProbe {
    fn is_interactive_at(&self, position: Point) -> bool {
        self.probes.set(self.probes.get() + 1);
        self.regions
            .borrow()
            .iter()
            .any(|region| region.contains(position))
    }
}

/// Test fixture: runtime, instrumented hosts, and a manual clock.
pub struct VantageTestRule {
    runtime: Runtime,
    scheduler: Arc<TestScheduler>,
    intersection: Rc<TestIntersectionHost>,
    now: Cell<u64>,
}

impl Default for VantageTestRule {
    fn default() -> Self {
        Self::new()
    }
}

impl VantageTestRule {
    pub fn new() -> Self {
        Self::with_intersection_host(TestIntersectionHost::new())
    }

    /// Rule over a specific intersection host, e.g.
    /// [`TestIntersectionHost::disabled`].
    pub fn with_intersection_host(intersection: Rc<TestIntersectionHost>) -> Self {
        let scheduler = TestScheduler::new();
        let runtime = Runtime::new(scheduler.clone());
        Self {
            runtime,
            scheduler,
            intersection,
            now: Cell::new(0),
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
    pub fn scheduler(&self) -> &Arc<TestScheduler> {
        &self.scheduler
    }

    #[inline]
    pub fn intersection_host(&self) -> &Rc<TestIntersectionHost> {
        &self.intersection
    }

    /// Current manual-clock reading in milliseconds.
    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// Observer wired to this rule's runtime and intersection host.
    pub fn new_observer(&self) -> VisibilityObserver {
        VisibilityObserver::new(self.runtime.handle(), self.intersection.clone())
    }

    /// Tracker wired to this rule's runtime.
    pub fn new_pointer_tracker(
        &self,
        class: PointerClass,
        probe: Rc<dyn InteractiveProbe>,
    ) -> PointerTracker {
        PointerTracker::new(self.runtime.handle(), class, probe)
    }

    pub fn new_scroll_meter(&self) -> ScrollMeter {
        ScrollMeter::new()
    }

    /// Advances the clock by `delta` and fires every timer due by then.
    /// Timers armed by those callbacks wait for a later advance.
    pub fn advance_millis(&self, delta: u64) {
        let now = self.now.get() + delta;
        self.now.set(now);
        self.runtime.fire_timers(now);
    }

    /// Advances one frame interval, then drains frame callbacks.
    pub fn advance_frame(&self) {
        self.advance_millis(FRAME_INTERVAL_MS);
        self.runtime.drain_frame_callbacks(self.now.get());
    }

    /// Runs frames until the runtime stops asking for them. Returns how
    /// many frames ran.
    pub fn pump_until_idle(&self) -> u32 {
        let mut frames = 0;
        while self.runtime.needs_frame() {
            self.advance_frame();
            frames += 1;
            if frames > 1_000 {
                log::warn!("pump_until_idle gave up after {frames} frames");
                break;
            }
        }
        frames
    }
}

impl std::fmt::Debug for VantageTestRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VantageTestRule")
            .field("now", &self.now.get())
            .field("frame_count", &self.runtime.frame_count())
            .finish()
    }
}
