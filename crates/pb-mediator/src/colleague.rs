#![forbid(unsafe_code)]

//! Colleague identity and ownership-tagged registry entries.
//!
//! A colleague is any value living in an [`Rc`] allocation. The registry never
//! looks inside it; it only needs two things:
//!
//! - a stable identity ([`ColleagueId`]) for exclusion and removal, and
//! - a way to get back a usable `Rc<C>` ([`ColleagueEntry::resolve`]).
//!
//! # Invariants
//!
//! 1. Identity is the address of the colleague's value inside its `Rc`
//!    allocation, so two colleagues with identical fields still differ.
//! 2. An `Rc` allocation is not freed while any `Weak` to it exists, so the id
//!    recorded in a weak entry cannot be reused by another colleague while that
//!    entry is still registered.
//! 3. A `Strong` entry always resolves; a `Weak` entry resolves only while some
//!    other owner keeps the colleague alive.

use std::fmt;
use std::rc::{Rc, Weak};

/// Opaque identity of a registered colleague.
///
/// Two ids compare equal exactly when they refer to the same allocation.
/// Once a colleague is gone and no entry still refers to it, its address may be
/// handed to a new colleague: do not keep an id past the colleague's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColleagueId(usize);

impl ColleagueId {
    /// Identity of the colleague held by `colleague`.
    #[inline]
    #[must_use]
    pub fn of<C: ?Sized>(colleague: &Rc<C>) -> Self {
        Self(Rc::as_ptr(colleague).cast::<()>().addr())
    }

    /// Identity of a colleague seen through a plain borrow.
    ///
    /// `value` must be borrowed out of the colleague's `Rc` (for example
    /// `&self` inside a trait method) for the id to match [`ColleagueId::of`].
    #[inline]
    #[must_use]
    pub fn of_ref<T: ?Sized>(value: &T) -> Self {
        Self(std::ptr::from_ref(value).cast::<()>().addr())
    }

    #[inline]
    fn of_weak<C: ?Sized>(colleague: &Weak<C>) -> Self {
        Self(colleague.as_ptr().cast::<()>().addr())
    }
}

impl fmt::Display for ColleagueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "colleague@{:#x}", self.0)
    }
}

/// How the registry holds on to a colleague.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Ownership {
    /// The registry co-owns the colleague and keeps it alive.
    #[default]
    Strong,
    /// The registry observes the colleague without keeping it alive.
    Weak,
}

impl Ownership {
    /// Whether this is [`Ownership::Strong`].
    #[inline]
    #[must_use]
    pub const fn is_strong(self) -> bool {
        matches!(self, Self::Strong)
    }
}

/// `true` maps to [`Ownership::Strong`], `false` to [`Ownership::Weak`].
impl From<bool> for Ownership {
    fn from(strong_reference: bool) -> Self {
        if strong_reference {
            Self::Strong
        } else {
            Self::Weak
        }
    }
}

enum Slot<C: ?Sized> {
    Strong(Rc<C>),
    Weak(Weak<C>),
}

/// A colleague reference tagged with its [`Ownership`] mode.
pub struct ColleagueEntry<C: ?Sized> {
    id: ColleagueId,
    slot: Slot<C>,
}

impl<C: ?Sized> ColleagueEntry<C> {
    /// Wrap `colleague` with the given ownership.
    #[must_use]
    pub fn new(colleague: &Rc<C>, ownership: Ownership) -> Self {
        let slot = match ownership {
            Ownership::Strong => Slot::Strong(Rc::clone(colleague)),
            Ownership::Weak => Slot::Weak(Rc::downgrade(colleague)),
        };
        Self {
            id: ColleagueId::of(colleague),
            slot,
        }
    }

    /// Identity of the wrapped colleague.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ColleagueId {
        self.id
    }

    /// Ownership mode this entry was created with.
    #[must_use]
    pub fn ownership(&self) -> Ownership {
        match self.slot {
            Slot::Strong(_) => Ownership::Strong,
            Slot::Weak(_) => Ownership::Weak,
        }
    }

    /// The colleague, if it still exists.
    #[must_use]
    pub fn resolve(&self) -> Option<Rc<C>> {
        match &self.slot {
            Slot::Strong(rc) => Some(Rc::clone(rc)),
            Slot::Weak(weak) => weak.upgrade(),
        }
    }

    /// Whether [`resolve`](Self::resolve) would return `Some`.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        match &self.slot {
            Slot::Strong(_) => true,
            Slot::Weak(weak) => weak.strong_count() > 0,
        }
    }
}

impl<C: ?Sized> Clone for ColleagueEntry<C> {
    fn clone(&self) -> Self {
        let slot = match &self.slot {
            Slot::Strong(rc) => Slot::Strong(Rc::clone(rc)),
            Slot::Weak(weak) => {
                debug_assert_eq!(ColleagueId::of_weak(weak), self.id);
                Slot::Weak(Weak::clone(weak))
            }
        };
        Self { id: self.id, slot }
    }
}

impl<C: ?Sized> fmt::Debug for ColleagueEntry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColleagueEntry")
            .field("id", &self.id)
            .field("ownership", &self.ownership())
            .field("alive", &self.is_alive())
            .finish()
    }
}
