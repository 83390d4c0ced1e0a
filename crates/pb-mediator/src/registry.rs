#![forbid(unsafe_code)]

//! Generic one-to-many broadcast registry.
//!
//! [`Mediator<C>`] keeps an insertion-ordered list of colleagues, each held
//! strongly or weakly, and invokes an action on every live colleague except an
//! optional excluded one. It does not know what a message is: a concrete
//! mediator (see [`crate::chat`]) decides the callback shape and calls
//! [`Mediator::invoke_colleagues`] with a closure that translates the broadcast
//! into its own colleague interface.
//!
//! # Invariants
//!
//! 1. Dispatch order is registration order.
//! 2. Each broadcast invokes the action exactly once per live, non-excluded
//!    entry. A colleague registered twice is invoked twice.
//! 3. A weak entry whose colleague is gone is never invoked, and is removed by
//!    the first broadcast (or [`Mediator::prune`]) that notices it.
//! 4. A strong entry keeps its colleague alive until it is removed or the
//!    registry is dropped.
//! 5. Broadcasts have no hidden state: two broadcasts with the same action over
//!    an unchanged set of live colleagues produce the same invocations.
//!
//! # Re-entrancy
//!
//! A broadcast snapshots the live colleagues and releases its borrow of the
//! registry before the first action runs. Actions may register, remove or
//! broadcast on the same registry:
//!
//! - colleagues registered during a broadcast are first reached by the next one;
//! - colleagues removed during a broadcast still receive the current one if the
//!   snapshot already held them.
//!
//! # Failure Modes
//!
//! None. A dead weak colleague is treated as absent, and a registry with no live
//! colleagues turns every broadcast into a no-op returning `0`.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use pb_mediator::{ColleagueId, Mediator, Ownership};
//!
//! let mediator: Mediator<RefCell<Vec<&str>>> = Mediator::new();
//! let a = Rc::new(RefCell::new(Vec::new()));
//! let b = Rc::new(RefCell::new(Vec::new()));
//! mediator.add_colleague(&a, Ownership::Strong);
//! mediator.add_colleague(&b, Ownership::Weak);
//!
//! let reached = mediator.invoke_colleagues(Some(ColleagueId::of(&a)), |inbox| {
//!     inbox.borrow_mut().push("hello");
//! });
//! assert_eq!(reached, 1);
//! assert!(a.borrow().is_empty());
//! assert_eq!(*b.borrow(), ["hello"]);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::colleague::{ColleagueEntry, ColleagueId, Ownership};

/// Insertion-ordered registry of strong and weak colleagues.
///
/// Single-threaded: the registry is neither `Send` nor `Sync`, and all methods
/// take `&self` so colleagues can share it through an `Rc`.
pub struct Mediator<C: ?Sized> {
    entries: RefCell<Vec<ColleagueEntry<C>>>,
}

impl<C: ?Sized> Default for Mediator<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized> Mediator<C> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Append `colleague` to the end of the dispatch order.
    ///
    /// `ownership` accepts an [`Ownership`] or a `bool` (`true` = strong).
    /// Registering the same colleague again adds a second entry.
    pub fn add_colleague(&self, colleague: &Rc<C>, ownership: impl Into<Ownership>) {
        let entry = ColleagueEntry::new(colleague, ownership.into());
        trace!(id = %entry.id(), ownership = ?entry.ownership(), "colleague registered");
        self.entries.borrow_mut().push(entry);
    }

    /// Remove every entry for `id`, returning how many were removed.
    pub fn remove_colleague(&self, id: ColleagueId) -> usize {
        let removed = {
            let mut entries = self.entries.borrow_mut();
            let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut *entries)
                .into_iter()
                .partition(|entry| entry.id() == id);
            *entries = kept;
            removed
        };
        // Dropped after the borrow ends: a colleague's own Drop may call back in.
        let count = removed.len();
        drop(removed);
        if count > 0 {
            trace!(%id, count, "colleague removed");
        }
        count
    }

    /// Invoke `action` on every live colleague except `excluding`, in
    /// registration order. Returns the number of invocations.
    ///
    /// Dead weak entries met along the way are pruned.
    pub fn invoke_colleagues<F>(&self, excluding: Option<ColleagueId>, mut action: F) -> usize
    where
        F: FnMut(&Rc<C>),
    {
        let targets = self.live_snapshot(excluding);
        let _span = tracing::trace_span!(
            "invoke_colleagues",
            targets = targets.len(),
            excluding = excluding.map(tracing::field::display)
        )
        .entered();
        for colleague in &targets {
            action(colleague);
        }
        targets.len()
    }

    /// Live colleagues in dispatch order.
    #[must_use]
    pub fn colleagues(&self) -> Vec<Rc<C>> {
        self.live_snapshot(None)
    }

    /// Whether a live entry for `id` exists.
    #[must_use]
    pub fn contains(&self, id: ColleagueId) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|entry| entry.id() == id && entry.is_alive())
    }

    /// Number of entries, including dead weak entries not yet pruned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the registry has no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Number of entries whose colleague still exists.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.is_alive())
            .count()
    }

    /// Drop dead weak entries now, returning how many were removed.
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(ColleagueEntry::is_alive);
        let pruned = before - entries.len();
        if pruned > 0 {
            debug!(pruned, remaining = entries.len(), "pruned dead weak colleagues");
        }
        pruned
    }

    fn live_snapshot(&self, excluding: Option<ColleagueId>) -> Vec<Rc<C>> {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        let mut live = Vec::with_capacity(before);
        entries.retain(|entry| match entry.resolve() {
            Some(colleague) => {
                if excluding != Some(entry.id()) {
                    live.push(colleague);
                }
                true
            }
            None => false,
        });
        let pruned = before - entries.len();
        if pruned > 0 {
            debug!(pruned, remaining = entries.len(), "pruned dead weak colleagues");
        }
        live
    }
}

impl<C: ?Sized> fmt::Debug for Mediator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.borrow();
        f.debug_struct("Mediator")
            .field("len", &entries.len())
            .field("live", &entries.iter().filter(|e| e.is_alive()).count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
