#![forbid(unsafe_code)]

//! Lifetime scope for a group of subscriptions.
//!
//! A [`SubscriptionBag`] is what an observer keeps when it watches several
//! publishers at once: drop the bag (or [`clear`](SubscriptionBag::clear) it)
//! and every callback it holds goes quiet together.
//!
//! # Invariants
//!
//! 1. After the bag is dropped or cleared, none of its callbacks fire again.
//! 2. `len()` counts the subscriptions the bag currently holds.
//! 3. A cleared bag is empty and can be reused.

use std::fmt;

use crate::published::{Published, Subscription};

/// Owns subscriptions for a logical scope (a view, a session, a test).
#[derive(Default)]
pub struct SubscriptionBag {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionBag {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `subscription` alive until the bag is dropped or cleared.
    pub fn hold(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Subscribe to `source` and keep the subscription in this bag.
    ///
    /// Returns the bag for chaining.
    pub fn subscribe<T: Clone + 'static>(
        &mut self,
        source: &Published<T>,
        callback: impl Fn(&T) + 'static,
    ) -> &mut Self {
        let subscription = source.subscribe(callback);
        self.subscriptions.push(subscription);
        self
    }

    /// Number of held subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether the bag holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release every held subscription now.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

impl fmt::Debug for SubscriptionBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionBag")
            .field("len", &self.subscriptions.len())
            .finish()
    }
}
