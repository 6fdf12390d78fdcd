//! Pointer tracking under synthetic event storms: coalescing, throttling,
//! and the capability gate, all on the manual clock.

use std::cell::RefCell;
use std::rc::Rc;

use vantage_foundation::geometry::{Point, Rect};
use vantage_foundation::host::PointerClass;
use vantage_foundation::pointer::PointerSample;
use vantage_foundation::visibility::VisibilityConfig;
use vantage_foundation::ElementId;
use vantage_testing::{RegionProbe, VantageTestRule};

const LINK: Rect = Rect::new(100.0, 100.0, 200.0, 40.0);

fn over_link() -> Point {
    Point::new(150.0, 120.0)
}

fn off_link() -> Point {
    Point::new(10.0, 10.0)
}

#[test]
fn a_thousand_moves_in_one_tick_commit_exactly_once() {
    let rule = VantageTestRule::new();
    let probe = RegionProbe::new(vec![LINK]);
    let tracker = rule.new_pointer_tracker(PointerClass::Fine, probe);

    let commits: Rc<RefCell<Vec<PointerSample>>> = Rc::new(RefCell::new(Vec::new()));
    let commits_clone = Rc::clone(&commits);
    let _watch = tracker
        .sample_state()
        .watch(move |sample| commits_clone.borrow_mut().push(*sample));

    for i in 0..1_000 {
        tracker.on_pointer_move(Point::new(i as f32, 0.5 * i as f32));
    }
    rule.advance_frame();

    let commits = commits.borrow();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].position, Point::new(999.0, 499.5));
    assert_eq!(commits[0].frame, rule.runtime().frame_count());
}

#[test]
fn commits_in_different_ticks_never_share_a_frame() {
    let rule = VantageTestRule::new();
    let tracker = rule.new_pointer_tracker(PointerClass::Fine, RegionProbe::empty());

    let frames: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));
    let frames_clone = Rc::clone(&frames);
    let _watch = tracker
        .sample_state()
        .watch(move |sample| frames_clone.borrow_mut().push(sample.frame));

    for tick in 0..5u32 {
        tracker.on_pointer_move(Point::new(tick as f32, 0.0));
        tracker.on_pointer_move(Point::new(tick as f32 + 0.5, 0.0));
        rule.advance_frame();
    }

    let frames = frames.borrow();
    assert_eq!(frames.len(), 5);
    let mut deduped = frames.clone();
    deduped.dedup();
    assert_eq!(*frames, deduped, "two commits shared a frame count");
}

#[test]
fn hovering_a_link_for_250ms_classifies_on_schedule() {
    let rule = VantageTestRule::new();
    let probe = RegionProbe::new(vec![LINK]);
    let tracker = rule.new_pointer_tracker(PointerClass::Fine, probe);

    let flips: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));
    let flips_clone = Rc::clone(&flips);
    let _watch = tracker
        .interactive_state()
        .watch(move |flag| flips_clone.borrow_mut().push(*flag));

    // Enter the link at t = 0: first classification is immediate.
    tracker.on_pointer_move(over_link());
    assert!(tracker.snapshot().over_interactive);

    // Stay on the link through t = 250, wiggling inside it.
    rule.advance_millis(100);
    tracker.on_pointer_move(Point::new(160.0, 125.0));
    rule.advance_millis(100);
    tracker.on_pointer_move(Point::new(170.0, 130.0));
    rule.advance_millis(50);

    // Leave at t = 250; the throttle defers the re-probe.
    tracker.on_pointer_move(off_link());
    assert!(tracker.snapshot().over_interactive);

    // By t = 300 a move re-classifies and the flag falls.
    rule.advance_millis(50);
    tracker.on_pointer_move(off_link());
    assert!(!tracker.snapshot().over_interactive);

    assert_eq!(*flips.borrow(), vec![true, false]);
}

#[test]
fn repeated_hovering_produces_exactly_one_transition() {
    let rule = VantageTestRule::new();
    let probe = RegionProbe::new(vec![LINK]);
    let tracker = rule.new_pointer_tracker(PointerClass::Fine, probe.clone());

    let flips: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));
    let flips_clone = Rc::clone(&flips);
    let _watch = tracker
        .interactive_state()
        .watch(move |flag| flips_clone.borrow_mut().push(*flag));

    for _ in 0..10 {
        tracker.on_pointer_move(over_link());
        rule.advance_millis(100);
    }

    assert_eq!(*flips.borrow(), vec![true]);
    assert!(probe.probe_count() >= 2, "throttle starved the probe");
}

#[test]
fn coarse_pointer_hosts_get_a_dead_tracker() {
    let rule = VantageTestRule::new();
    let probe = RegionProbe::new(vec![LINK]);
    let tracker = rule.new_pointer_tracker(PointerClass::Coarse, probe.clone());

    tracker.on_pointer_move(over_link());
    tracker.on_pointer_enter();
    rule.advance_frame();

    let snapshot = tracker.snapshot();
    assert!(!snapshot.enabled);
    assert!(!snapshot.over_interactive);
    assert!(!snapshot.in_viewport);
    assert_eq!(snapshot.position, Point::ZERO);
    assert_eq!(probe.probe_count(), 0);
    assert_eq!(rule.scheduler().frame_requests(), 0);
}

#[test]
fn enter_and_leave_are_level_triggered() {
    let rule = VantageTestRule::new();
    let tracker = rule.new_pointer_tracker(PointerClass::Fine, RegionProbe::empty());

    let flips: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));
    let flips_clone = Rc::clone(&flips);
    let _watch = tracker
        .viewport_state()
        .watch(move |flag| flips_clone.borrow_mut().push(*flag));

    tracker.on_pointer_enter();
    tracker.on_pointer_enter();
    tracker.on_pointer_move(over_link());
    tracker.on_pointer_leave();
    tracker.on_pointer_leave();
    tracker.on_pointer_enter();

    assert_eq!(*flips.borrow(), vec![true, false, true]);
}

#[test]
fn pointer_and_visibility_share_one_runtime_cleanly() {
    let rule = VantageTestRule::new();
    let observer = rule.new_observer();
    let tracker = rule.new_pointer_tracker(PointerClass::Fine, RegionProbe::empty());

    let element = ElementId(9);
    let sub = observer.observe(
        Some(element),
        VisibilityConfig {
            activation_delay_ms: 32,
            ..VisibilityConfig::default()
        },
    );
    observer.on_intersection(element, true);

    tracker.on_pointer_move(Point::new(1.0, 1.0));
    rule.advance_frame(); // t = 16: commit lands, dwell still pending
    assert_eq!(tracker.snapshot().position, Point::new(1.0, 1.0));
    assert!(!sub.is_visible());

    tracker.on_pointer_move(Point::new(2.0, 2.0));
    rule.advance_frame(); // t = 32: dwell elapses, second commit lands
    assert!(sub.is_visible());
    assert_eq!(tracker.snapshot().position, Point::new(2.0, 2.0));
}
