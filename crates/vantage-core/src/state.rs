//! Push-based state cells.
//!
//! [`MutableState`] is a single-threaded observable value. Writers call
//! [`set`](MutableState::set) or [`set_if_changed`](MutableState::set_if_changed);
//! watchers registered through [`watch`](MutableState::watch) run synchronously
//! after the write lands, in registration order. [`State`] is the read-only
//! view handed to consumers that must not write.
//!
//! Watchers fire on writes only. A new watcher is not called with the
//! current value; read it first, then watch.

use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type WatcherId = u64;

type WatcherFn<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct WatcherEntry<T> {
    id: WatcherId,
    callback: WatcherFn<T>,
}

struct StateInner<T> {
    value: RefCell<T>,
    watchers: RefCell<SmallVec<[WatcherEntry<T>; 2]>>,
    next_watcher_id: Cell<WatcherId>,
}

fn register_watcher<T>(
    inner: &Rc<StateInner<T>>,
    callback: impl FnMut(&T) + 'static,
) -> WatchHandle<T> {
    let id = inner.next_watcher_id.get();
    inner.next_watcher_id.set(id + 1);
    inner.watchers.borrow_mut().push(WatcherEntry {
        id,
        callback: Rc::new(RefCell::new(callback)),
    });
    WatchHandle {
        inner: Rc::downgrade(inner),
        id,
    }
}

impl<T> StateInner<T> {
    fn unwatch(&self, id: WatcherId) {
        self.watchers.borrow_mut().retain(|entry| entry.id != id);
    }

    fn notify(&self, value: &T) {
        // Snapshot the watcher list so a watcher may add or remove watchers
        // without holding the list borrow. An entry unregistered before its
        // turn is skipped; so is a watcher that re-enters itself through a
        // nested write.
        let snapshot: SmallVec<[(WatcherId, WatcherFn<T>); 2]> = self
            .watchers
            .borrow()
            .iter()
            .map(|entry| (entry.id, Rc::clone(&entry.callback)))
            .collect();
        for (id, callback) in snapshot {
            let alive = self.watchers.borrow().iter().any(|entry| entry.id == id);
            if !alive {
                continue;
            }
            match callback.try_borrow_mut() {
                Ok(mut callback) => callback(value),
                Err(_) => {
                    log::warn!("state watcher re-entered during notification; skipping");
                }
            }
        }
    }
}

/// Writable observable value.
pub struct MutableState<T> {
    inner: Rc<StateInner<T>>,
}

impl<T: Clone + 'static> MutableState<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(StateInner {
                value: RefCell::new(value),
                watchers: RefCell::new(SmallVec::new()),
                next_watcher_id: Cell::new(1),
            }),
        }
    }

    /// Clone of the current value.
    #[inline]
    pub fn value(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrows the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Writes `value` and notifies every watcher, even when the new value
    /// equals the old one. Use [`set_if_changed`](Self::set_if_changed) to
    /// suppress redundant notifications.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value.clone();
        self.inner.notify(&value);
    }

    /// Writes `value` only if it differs from the current one. Returns
    /// whether a write (and notification) happened.
    pub fn set_if_changed(&self, value: T) -> bool
    where
        T: PartialEq,
    {
        if *self.inner.value.borrow() == value {
            return false;
        }
        self.set(value);
        true
    }

    /// Registers `callback` to run after every write, in registration
    /// order. Dropping the returned handle unregisters it.
    pub fn watch(&self, callback: impl FnMut(&T) + 'static) -> WatchHandle<T> {
        register_watcher(&self.inner, callback)
    }

    /// Read-only view sharing this cell.
    pub fn as_state(&self) -> State<T> {
        State {
            inner: Rc::clone(&self.inner),
        }
    }

    /// Number of live watchers. Intended for teardown assertions in tests.
    pub fn watcher_count(&self) -> usize {
        self.inner.watchers.borrow().len()
    }
}

impl<T> Clone for MutableState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for MutableState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MutableState")
            .field(&*self.inner.value.borrow())
            .finish()
    }
}

/// Read-only view of a [`MutableState`].
///
/// Holding a `State` keeps the cell alive, but the value only changes while
/// some writer still holds the `MutableState`.
pub struct State<T> {
    inner: Rc<StateInner<T>>,
}

impl<T: Clone + 'static> State<T> {
    /// Clone of the current value.
    #[inline]
    pub fn value(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrows the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Registers `callback` to run after every write.
    pub fn watch(&self, callback: impl FnMut(&T) + 'static) -> WatchHandle<T> {
        register_watcher(&self.inner, callback)
    }

    /// Number of live watchers. Intended for teardown assertions in tests.
    pub fn watcher_count(&self) -> usize {
        self.inner.watchers.borrow().len()
    }
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("State")
            .field(&*self.inner.value.borrow())
            .finish()
    }
}

/// Active watch registration. Dropping it unregisters the watcher.
pub struct WatchHandle<T> {
    inner: Weak<StateInner<T>>,
    id: WatcherId,
}

impl<T> WatchHandle<T> {
    /// Unregisters explicitly. Equivalent to dropping the handle.
    pub fn unwatch(self) {}
}

impl<T> Drop for WatchHandle<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.unwatch(self.id);
        }
    }
}

impl<T> std::fmt::Debug for WatchHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle").field("id", &self.id).finish()
    }
}
