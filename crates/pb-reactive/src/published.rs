#![forbid(unsafe_code)]

//! A published value that pushes every new value to its subscribers.
//!
//! [`Published<T>`] is a shared, version-tracked cell. Subscribing returns a
//! [`Subscription`] guard; the callback stays registered for exactly as long as
//! the guard is alive.
//!
//! # Invariants
//!
//! 1. A new subscriber is called once with the current value before
//!    `subscribe` returns.
//! 2. Every `set`/`update` bumps the version by one and notifies, even when
//!    the new value equals the old one.
//! 3. Subscribers are notified in registration order.
//! 4. After a `Subscription` is dropped or cancelled, its callback is not
//!    called again, including later in a notification already under way.
//! 5. Subscribers see values in version order, and the last value a subscriber
//!    sees matches `get()`.
//!
//! # Re-entrancy
//!
//! Callbacks run with no borrow held, so they may read the publisher,
//! subscribe, or cancel any subscription. A `set`/`update` from inside a
//! callback changes the value at once but its notification is queued; it is
//! delivered to every subscriber after the current round finishes.
//!
//! `set`, `update` and `with` hold the value borrowed while their closure
//! runs. That closure must not touch the same publisher (or a clone of it);
//! doing so panics with a `RefCell` borrow error.
//!
//! # Failure Modes
//!
//! - Callback panic: propagates to the caller of `set`/`update`/`subscribe`.
//!   Notifications still queued for that round are discarded.
//! - Closure passed to `set`/`update`/`with` touching the same publisher:
//!   panics (see above).

use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

type Callback<T> = dyn Fn(&T);

struct Inner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
    /// A notification round is running further up the stack.
    notifying: bool,
    /// Changes made from inside callbacks, delivered after the current round.
    pending: VecDeque<(u64, T)>,
}

/// Shared value whose changes are pushed to subscribers.
///
/// Cloning a `Published` shares the same value and subscriber list.
pub struct Published<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Published<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Published<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Published")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

impl<T: Default + Clone + 'static> Default for Published<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + 'static> Published<T> {
    /// Publish `value` with version 0 and no subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                version: 0,
                subscribers: Vec::new(),
                notifying: false,
                pending: VecDeque::new(),
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value for the duration of `f`.
    ///
    /// `f` must not call `set` or `update` on this publisher.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        self.update(|slot| *slot = value);
    }

    /// Mutate the value in place and notify subscribers.
    ///
    /// `f` runs with the value mutably borrowed and must not read or write
    /// this publisher. Called from inside a callback, the change is applied
    /// now and delivered once the running round completes.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let first = {
            let mut inner = self.inner.borrow_mut();
            f(&mut inner.value);
            inner.version += 1;
            let change = (inner.version, inner.value.clone());
            if inner.notifying {
                trace!(version = change.0, "published value queued behind running round");
                inner.pending.push_back(change);
                return;
            }
            inner.notifying = true;
            change
        };

        let _round = NotifyRound { inner: &self.inner };
        let mut next = Some(first);
        while let Some((version, value)) = next {
            let subscribers = {
                let mut inner = self.inner.borrow_mut();
                inner.subscribers.retain(|weak| weak.strong_count() > 0);
                inner.subscribers.clone()
            };
            trace!(version, subscribers = subscribers.len(), "published value changed");
            for weak in &subscribers {
                // Upgrade late: a callback earlier in this round may have
                // cancelled this one.
                if let Some(callback) = weak.upgrade() {
                    callback(&value);
                }
            }
            next = self.inner.borrow_mut().pending.pop_front();
        }
    }

    /// Register `callback`, call it with the current value, and return the
    /// guard that keeps it registered.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Rc<Callback<T>> = Rc::new(callback);
        let current = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.push(Rc::downgrade(&callback));
            inner.value.clone()
        };
        callback(&current);
        Subscription {
            guard: Some(Box::new(callback)),
        }
    }

    /// Number of mutations so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of subscriptions that are still alive.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

/// Ends a notification round, including when a callback panics.
struct NotifyRound<'a, T> {
    inner: &'a RefCell<Inner<T>>,
}

impl<T> Drop for NotifyRound<'_, T> {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.notifying = false;
            inner.pending.clear();
        }
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Keeps a [`Published`] callback registered until dropped or cancelled.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    guard: Option<Box<dyn Any>>,
}

impl Subscription {
    /// Unsubscribe now. Cancelling twice is a no-op.
    pub fn cancel(&mut self) {
        self.guard = None;
    }

    /// Whether the callback is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.guard.is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn subscribe_delivers_current_value_first() {
        let name = Published::new(String::from("Ray"));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = name.subscribe(move |v: &String| s.borrow_mut().push(v.clone()));
        assert_eq!(*seen.borrow(), ["Ray"]);
    }

    #[test]
    fn set_notifies_and_bumps_version() {
        let count = Published::new(0);
        let last = Rc::new(Cell::new(-1));
        let l = Rc::clone(&last);
        let _sub = count.subscribe(move |v| l.set(*v));

        count.set(5);
        assert_eq!(last.get(), 5);
        assert_eq!(count.version(), 1);
        assert_eq!(count.get(), 5);
    }

    #[test]
    fn equal_value_still_notifies() {
        let flag = Published::new(true);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = flag.subscribe(move |_| h.set(h.get() + 1));

        flag.set(true);
        flag.set(true);
        assert_eq!(hits.get(), 3, "initial delivery plus two sets");
        assert_eq!(flag.version(), 2);
    }

    #[test]
    fn update_mutates_in_place() {
        let list = Published::new(vec![1, 2]);
        list.update(|v| v.push(3));
        assert_eq!(list.get(), [1, 2, 3]);
        assert_eq!(list.with(Vec::len), 3);
    }

    #[test]
    fn dropped_subscription_stops_delivery() {
        let value = Published::new(0);
        let last = Rc::new(Cell::new(0));
        let l = Rc::clone(&last);
        let sub = value.subscribe(move |v| l.set(*v));
        value.set(1);
        drop(sub);
        value.set(2);
        assert_eq!(last.get(), 1);
        assert_eq!(value.subscriber_count(), 0);
    }

    #[test]
    fn cancel_is_idempotent() {
        let value = Published::new(0);
        let mut sub = value.subscribe(|_| {});
        assert!(sub.is_active());
        sub.cancel();
        sub.cancel();
        assert!(!sub.is_active());
        assert_eq!(value.subscriber_count(), 0);
    }

    #[test]
    fn subscribers_notified_in_registration_order() {
        let value = Published::new(0);
        let order = Rc::new(RefCell::new(Vec::new()));
        let subs: Vec<_> = (0..3)
            .map(|i| {
                let o = Rc::clone(&order);
                value.subscribe(move |_| o.borrow_mut().push(i))
            })
            .collect();
        order.borrow_mut().clear();

        value.set(1);
        assert_eq!(*order.borrow(), [0, 1, 2]);
        drop(subs);
    }

    #[test]
    fn callback_may_read_publisher() {
        let value = Published::new(1);
        let reader = value.clone();
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let _sub = value.subscribe(move |_| s.set(reader.get() * 10));
        value.set(4);
        assert_eq!(seen.get(), 40);
    }

    #[test]
    fn clone_shares_state() {
        let a = Published::new(1);
        let b = a.clone();
        b.set(9);
        assert_eq!(a.get(), 9);
        assert_eq!(a.version(), 1);
    }

    #[test]
    fn debug_shows_value_and_version() {
        let value = Published::new(3);
        value.set(4);
        let debug = format!("{value:?}");
        assert!(debug.contains("value: 4"));
        assert!(debug.contains("version: 1"));
    }

    #[test]
    fn subscription_cancelled_mid_round_is_skipped() {
        let value = Published::new(0);
        let later: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let slot = Rc::clone(&later);
        let _first = value.subscribe(move |v| {
            if *v == 1 {
                if let Some(sub) = slot.borrow_mut().as_mut() {
                    sub.cancel();
                }
            }
        });

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        *later.borrow_mut() = Some(value.subscribe(move |v| s.borrow_mut().push(*v)));

        value.set(1);
        assert_eq!(*seen.borrow(), [0], "cancelled callback must not run");
        assert!(later.borrow().as_ref().is_some_and(|sub| !sub.is_active()));
    }

    #[test]
    fn set_from_callback_is_delivered_after_round() {
        let value = Published::new(0);
        let writer = value.clone();
        let first_seen = Rc::new(RefCell::new(Vec::new()));
        let f = Rc::clone(&first_seen);
        let _first = value.subscribe(move |v| {
            f.borrow_mut().push(*v);
            if *v == 1 {
                writer.set(2);
            }
        });

        let second_seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&second_seen);
        let _second = value.subscribe(move |v| s.borrow_mut().push(*v));

        value.set(1);
        assert_eq!(*first_seen.borrow(), [0, 1, 2]);
        assert_eq!(*second_seen.borrow(), [0, 1, 2]);
        assert_eq!(second_seen.borrow().last().copied(), Some(value.get()));
        assert_eq!(value.version(), 2);
    }

    #[test]
    fn chained_sets_from_callback_keep_version_order() {
        let value = Published::new(0);
        let writer = value.clone();
        let _bump = value.subscribe(move |v| {
            if (1..3).contains(v) {
                writer.set(v + 1);
            }
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _log = value.subscribe(move |v| s.borrow_mut().push(*v));

        value.set(1);
        assert_eq!(*seen.borrow(), [0, 1, 2, 3]);
        assert_eq!(value.get(), 3);
    }

    #[test]
    fn panicking_callback_does_not_wedge_publisher() {
        let value = Published::new(0);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let mut bomb = value.subscribe(move |v| {
            h.set(h.get() + 1);
            assert!(*v != 1, "boom");
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| value.set(1)));
        assert!(result.is_err());

        bomb.cancel();
        let last = Rc::new(Cell::new(0));
        let l = Rc::clone(&last);
        let _sub = value.subscribe(move |v| l.set(*v));
        value.set(2);
        assert_eq!(last.get(), 2);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    #[should_panic]
    fn update_closure_must_not_read_publisher() {
        let value = Published::new(1);
        let reader = value.clone();
        value.update(|v| *v = reader.get() + 1);
    }

    #[tracing_test::traced_test]
    #[test]
    fn change_is_traced() {
        let value = Published::new(0);
        value.set(1);
        assert!(logs_contain("published value changed"));
    }
}
