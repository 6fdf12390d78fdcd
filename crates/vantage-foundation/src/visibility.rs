//! Visibility observer.
//!
//! Converts raw viewport-intersection crossings into per-element reveal
//! state. Page code registers an element once and keeps the returned
//! [`VisibilitySubscription`]; the host reports threshold crossings through
//! [`VisibilityObserver::on_intersection`], and each subscription steps its
//! own machine:
//!
//! ```text
//! Unseen -> Intersecting -> PendingActivation -> Visible -> Settled
//!                \________________/                  |
//!                 (delay = 0 skips straight on)      | trigger_once = false
//!                                                    v
//!                                                  Unseen
//! ```
//!
//! `Intersecting` is transient and resolves within the dispatch that entered
//! it. Leaving the viewport while an activation delay is pending cancels the
//! armed timer and reverts to `Unseen`; the next entry restarts the full
//! sequence. A `trigger_once` subscription that reaches `Settled` releases
//! its host watch and any timer immediately and reports visible forever.

use indexmap::IndexMap;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use vantage_core::collections::HashMap;
use vantage_core::{FrameClock, MutableState, RuntimeHandle, State, TimerRegistration};

use crate::host::{ElementId, IntersectionHost, IntersectionWatchId, WatchOptions};

/// Per-subscription tuning. The defaults reveal an element once it is 10%
/// inside the unpadded viewport, immediately and permanently.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityConfig {
    /// Fraction of the element that must be inside the viewport, in `[0, 1]`.
    pub threshold: f32,
    /// Margin added around the viewport before the threshold test.
    pub root_margin: f32,
    /// Whether the first activation is permanent.
    pub trigger_once: bool,
    /// Dwell required between crossing the threshold and becoming visible.
    pub activation_delay_ms: u64,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: 0.0,
            trigger_once: true,
            activation_delay_ms: 0,
        }
    }
}

impl VisibilityConfig {
    fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            threshold: self.threshold,
            root_margin: self.root_margin,
        }
    }
}

/// Lifecycle phase of one subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityPhase {
    /// Not in the viewport (or never dispatched).
    Unseen,
    /// Raw crossing received; resolves before the dispatch returns.
    Intersecting,
    /// In the viewport, waiting out the activation delay.
    PendingActivation,
    /// Revealed.
    Visible,
    /// Revealed permanently; host resources already released.
    Settled,
}

type SubscriptionKey = u64;

struct SubscriptionInner {
    key: SubscriptionKey,
    element: Option<ElementId>,
    config: VisibilityConfig,
    phase: Cell<VisibilityPhase>,
    visible: MutableState<bool>,
    watch: Cell<Option<IntersectionWatchId>>,
    timer: RefCell<Option<TimerRegistration>>,
    clock: FrameClock,
    host: Rc<dyn IntersectionHost>,
    observer: Weak<ObserverInner>,
}

impl SubscriptionInner {
    fn become_visible(&self) {
        self.phase.set(VisibilityPhase::Visible);
        self.visible.set_if_changed(true);
        if self.config.trigger_once {
            self.settle();
        }
    }

    fn settle(&self) {
        self.phase.set(VisibilityPhase::Settled);
        self.timer.borrow_mut().take();
        self.release_watch();
    }

    fn release_watch(&self) {
        if let Some(watch) = self.watch.take() {
            self.host.unwatch(watch);
        }
    }

    fn dispose(&self) {
        if self.timer.borrow_mut().take().is_some() {
            log::debug!("disposed visibility subscription with an armed activation timer");
        }
        self.release_watch();
        if let Some(observer) = self.observer.upgrade() {
            observer.remove(self.key, self.element);
        }
    }
}

fn step(inner: &Rc<SubscriptionInner>, intersecting: bool) {
    match (inner.phase.get(), intersecting) {
        (VisibilityPhase::Unseen, true) => {
            inner.phase.set(VisibilityPhase::Intersecting);
            resolve_entry(inner);
        }
        (VisibilityPhase::PendingActivation, false) => {
            // Cancel-and-restart: drop the armed delay, require a fresh
            // full dwell on the next entry.
            inner.timer.borrow_mut().take();
            inner.phase.set(VisibilityPhase::Unseen);
        }
        (VisibilityPhase::Visible, false) => {
            inner.phase.set(VisibilityPhase::Unseen);
            inner.visible.set_if_changed(false);
        }
        // Settled ignores everything; repeated same-direction crossings
        // and exits while Unseen are no-ops.
        _ => {}
    }
}

fn resolve_entry(inner: &Rc<SubscriptionInner>) {
    let delay = inner.config.activation_delay_ms;
    if delay == 0 {
        inner.become_visible();
        return;
    }
    inner.phase.set(VisibilityPhase::PendingActivation);
    let weak = Rc::downgrade(inner);
    let registration = inner.clock.after_millis(delay, move |_| {
        if let Some(sub) = weak.upgrade() {
            if sub.phase.get() == VisibilityPhase::PendingActivation {
                sub.timer.borrow_mut().take();
                sub.become_visible();
            }
        }
    });
    *inner.timer.borrow_mut() = Some(registration);
}

struct ObserverInner {
    clock: FrameClock,
    host: Rc<dyn IntersectionHost>,
    registry: RefCell<IndexMap<SubscriptionKey, Rc<SubscriptionInner>>>,
    // Routing index. Keys per element stay in observe order, which is the
    // only dispatch ordering promised.
    by_element: RefCell<HashMap<ElementId, Vec<SubscriptionKey>>>,
    next_key: Cell<SubscriptionKey>,
}

impl ObserverInner {
    fn insert(&self, key: SubscriptionKey, element: ElementId, sub: Rc<SubscriptionInner>) {
        self.registry.borrow_mut().insert(key, sub);
        self.by_element
            .borrow_mut()
            .entry(element)
            .or_default()
            .push(key);
    }

    fn remove(&self, key: SubscriptionKey, element: Option<ElementId>) {
        self.registry.borrow_mut().shift_remove(&key);
        if let Some(element) = element {
            let mut by_element = self.by_element.borrow_mut();
            if let Some(keys) = by_element.get_mut(&element) {
                keys.retain(|candidate| *candidate != key);
                if keys.is_empty() {
                    by_element.remove(&element);
                }
            }
        }
    }
}

/// Per-page registry of visibility subscriptions.
pub struct VisibilityObserver {
    inner: Rc<ObserverInner>,
}

impl VisibilityObserver {
    pub fn new(runtime: RuntimeHandle, host: Rc<dyn IntersectionHost>) -> Self {
        Self {
            inner: Rc::new(ObserverInner {
                clock: FrameClock::new(runtime),
                host,
                registry: RefCell::new(IndexMap::new()),
                by_element: RefCell::new(HashMap::default()),
                next_key: Cell::new(1),
            }),
        }
    }

    /// Starts observing `element`.
    ///
    /// `None` for the element yields an inert subscription: never visible,
    /// no host watch, no timers. When the host declines the watch the
    /// subscription fails open and reports visible immediately.
    pub fn observe(
        &self,
        element: Option<ElementId>,
        config: VisibilityConfig,
    ) -> VisibilitySubscription {
        let key = self.inner.next_key.get();
        self.inner.next_key.set(key + 1);
        let sub = Rc::new(SubscriptionInner {
            key,
            element,
            config,
            phase: Cell::new(VisibilityPhase::Unseen),
            visible: MutableState::new(false),
            watch: Cell::new(None),
            timer: RefCell::new(None),
            clock: self.inner.clock.clone(),
            host: Rc::clone(&self.inner.host),
            observer: Rc::downgrade(&self.inner),
        });
        let Some(element) = element else {
            return VisibilitySubscription { inner: sub };
        };
        match self.inner.host.watch(element, config.watch_options()) {
            Some(watch) => {
                sub.watch.set(Some(watch));
                self.inner.insert(key, element, Rc::clone(&sub));
            }
            None => {
                log::warn!(
                    "intersection facility unavailable; treating {element:?} as visible"
                );
                sub.become_visible();
            }
        }
        VisibilitySubscription { inner: sub }
    }

    /// Host dispatch entry: `element` crossed (or left) its threshold.
    ///
    /// Routes to every live subscription on that element. Ordering is
    /// guaranteed per element only; subscriptions on other elements are
    /// untouched.
    pub fn on_intersection(&self, element: ElementId, intersecting: bool) {
        // Snapshot so a transition watcher may observe or dispose other
        // subscriptions without tripping over the registry borrows.
        let matching: Vec<Rc<SubscriptionInner>> = {
            let registry = self.inner.registry.borrow();
            let by_element = self.inner.by_element.borrow();
            by_element
                .get(&element)
                .into_iter()
                .flatten()
                .filter_map(|key| registry.get(key).map(Rc::clone))
                .collect()
        };
        for sub in matching {
            step(&sub, intersecting);
        }
    }

    /// Number of subscriptions currently holding registry entries.
    pub fn subscription_count(&self) -> usize {
        self.inner.registry.borrow().len()
    }
}

impl std::fmt::Debug for VisibilityObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityObserver")
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

/// Handle to one observed element. Dropping it (or calling
/// [`dispose`](Self::dispose)) releases the host watch, any armed timer,
/// and the registry entry.
pub struct VisibilitySubscription {
    inner: Rc<SubscriptionInner>,
}

impl VisibilitySubscription {
    /// Whether the element is currently revealed. Stays `true` forever once
    /// the subscription settles.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.inner.visible.value()
    }

    #[inline]
    pub fn phase(&self) -> VisibilityPhase {
        self.inner.phase.get()
    }

    /// Watchable view of the revealed flag.
    pub fn visibility(&self) -> State<bool> {
        self.inner.visible.as_state()
    }

    #[inline]
    pub fn element(&self) -> Option<ElementId> {
        self.inner.element
    }

    #[inline]
    pub fn config(&self) -> VisibilityConfig {
        self.inner.config
    }

    /// Releases all resources now. Equivalent to dropping the handle.
    pub fn dispose(self) {}
}

impl Drop for VisibilitySubscription {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}

impl std::fmt::Debug for VisibilitySubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilitySubscription")
            .field("element", &self.inner.element)
            .field("phase", &self.inner.phase.get())
            .finish()
    }
}
