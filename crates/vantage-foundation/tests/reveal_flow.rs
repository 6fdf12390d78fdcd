//! End-to-end visibility scenarios: synthetic intersection dispatches in,
//! reveal state out, with the manual clock deciding when delays elapse.

use vantage_animation::{reveal_style, reveal_style_for, RevealDirection, RevealStyle};
use vantage_foundation::host::ElementId;
use vantage_foundation::visibility::{VisibilityConfig, VisibilityPhase};
use vantage_testing::{TestIntersectionHost, VantageTestRule};

const HERO: ElementId = ElementId(1);
const CARD: ElementId = ElementId(2);

fn delayed(delay_ms: u64) -> VisibilityConfig {
    VisibilityConfig {
        activation_delay_ms: delay_ms,
        ..VisibilityConfig::default()
    }
}

#[test]
fn enter_with_a_400ms_delay_reveals_at_exactly_400() {
    let rule = VantageTestRule::new();
    let observer = rule.new_observer();
    let sub = observer.observe(Some(HERO), delayed(400));

    observer.on_intersection(HERO, true);
    assert_eq!(sub.phase(), VisibilityPhase::PendingActivation);
    assert!(!sub.is_visible());

    rule.advance_millis(399);
    assert!(!sub.is_visible(), "revealed one millisecond early");

    rule.advance_millis(1);
    assert!(sub.is_visible());
    assert_eq!(sub.phase(), VisibilityPhase::Settled);

    // Forever means forever: later exits and re-entries change nothing.
    observer.on_intersection(HERO, false);
    rule.advance_millis(10_000);
    observer.on_intersection(HERO, true);
    assert!(sub.is_visible());
}

#[test]
fn settled_visibility_is_monotonic_under_dispatch_noise() {
    let rule = VantageTestRule::new();
    let observer = rule.new_observer();
    let sub = observer.observe(Some(HERO), VisibilityConfig::default());

    observer.on_intersection(HERO, true);
    assert!(sub.is_visible());

    for round in 0..20 {
        observer.on_intersection(HERO, round % 2 == 0);
        rule.advance_frame();
        assert!(sub.is_visible(), "visibility regressed on round {round}");
    }
}

#[test]
fn exit_during_the_dwell_requires_a_full_restart() {
    let rule = VantageTestRule::new();
    let observer = rule.new_observer();
    let sub = observer.observe(Some(HERO), delayed(400));

    observer.on_intersection(HERO, true);
    rule.advance_millis(250);
    observer.on_intersection(HERO, false);
    assert_eq!(sub.phase(), VisibilityPhase::Unseen);

    // 150 ms later the old deadline passes; nothing may fire.
    rule.advance_millis(150);
    assert!(!sub.is_visible());

    observer.on_intersection(HERO, true);
    rule.advance_millis(399);
    assert!(!sub.is_visible());
    rule.advance_millis(1);
    assert!(sub.is_visible());
}

#[test]
fn disposing_mid_dwell_releases_every_resource() {
    let rule = VantageTestRule::new();
    let observer = rule.new_observer();
    let host = rule.intersection_host().clone();

    let sub = observer.observe(Some(HERO), delayed(400));
    observer.on_intersection(HERO, true);
    assert_eq!(host.active_watch_count(), 1);
    assert!(rule.runtime().next_timer_deadline().is_some());

    let visibility = sub.visibility();
    let flips = std::rc::Rc::new(std::cell::Cell::new(0u32));
    let flips_clone = std::rc::Rc::clone(&flips);
    let _watch = visibility.watch(move |_| flips_clone.set(flips_clone.get() + 1));

    sub.dispose();
    assert_eq!(host.active_watch_count(), 0);
    assert_eq!(rule.runtime().next_timer_deadline(), None);
    assert_eq!(observer.subscription_count(), 0);

    rule.advance_millis(1_000);
    assert_eq!(flips.get(), 0, "state changed after dispose");
    assert!(!visibility.value());
}

#[test]
fn watch_options_carry_the_subscription_geometry() {
    let rule = VantageTestRule::new();
    let observer = rule.new_observer();
    let host = rule.intersection_host().clone();

    let config = VisibilityConfig {
        threshold: 0.25,
        root_margin: 12.0,
        ..VisibilityConfig::default()
    };
    let _sub = observer.observe(Some(HERO), config);

    let options = host.watch_options(HERO).unwrap();
    assert_eq!(options.threshold, 0.25);
    assert_eq!(options.root_margin, 12.0);
}

#[test]
fn absent_facility_fails_open_without_leaking_watches() {
    let rule = VantageTestRule::with_intersection_host(TestIntersectionHost::disabled());
    let observer = rule.new_observer();

    let sub = observer.observe(Some(HERO), delayed(400));
    assert!(sub.is_visible(), "fail-open must not wait out the delay");
    assert_eq!(sub.phase(), VisibilityPhase::Settled);
    assert_eq!(rule.intersection_host().total_watches(), 0);
    assert_eq!(rule.runtime().next_timer_deadline(), None);
}

#[test]
fn repeating_card_animates_both_ways_while_hero_stays_settled() {
    let rule = VantageTestRule::new();
    let observer = rule.new_observer();
    let hero = observer.observe(Some(HERO), VisibilityConfig::default());
    let card = observer.observe(
        Some(CARD),
        VisibilityConfig {
            trigger_once: false,
            ..VisibilityConfig::default()
        },
    );

    observer.on_intersection(HERO, true);
    observer.on_intersection(CARD, true);
    assert!(hero.is_visible());
    assert!(card.is_visible());

    observer.on_intersection(HERO, false);
    observer.on_intersection(CARD, false);
    assert!(hero.is_visible());
    assert!(!card.is_visible());

    observer.on_intersection(CARD, true);
    assert!(card.is_visible());
}

#[test]
fn reveal_styles_follow_the_subscription() {
    let rule = VantageTestRule::new();
    let observer = rule.new_observer();
    let sub = observer.observe(Some(HERO), delayed(100));

    assert_eq!(
        reveal_style_for(&sub, RevealDirection::Left),
        reveal_style(false, RevealDirection::Left)
    );

    observer.on_intersection(HERO, true);
    rule.advance_millis(100);
    assert_eq!(
        reveal_style_for(&sub, RevealDirection::Left),
        RevealStyle::IDENTITY
    );
}
