#![forbid(unsafe_code)]

//! Observer pattern primitives for patternbook.
//!
//! - [`Published`]: a shared, version-tracked value that pushes every new value
//!   to its subscribers.
//! - [`Subscription`]: RAII guard; the callback is registered while it lives.
//! - [`SubscriptionBag`]: holds many subscriptions and releases them together.
//!
//! # Architecture
//!
//! `Published<T>` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! Subscribers are stored as `Weak` callbacks; the strong half lives in the
//! `Subscription`, so dropping the guard is all it takes to unsubscribe. Dead
//! callbacks are pruned lazily on the next notification.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use pb_reactive::Published;
//!
//! let name = Published::new(String::from("Ray"));
//! let log = Rc::new(RefCell::new(Vec::new()));
//!
//! let sink = Rc::clone(&log);
//! let mut subscriber = Some(name.subscribe(move |n| {
//!     sink.borrow_mut().push(format!("User's name is {n}"));
//! }));
//! name.set("Vicki".into());
//!
//! subscriber = None;
//! name.set("Ray has left the building".into());
//!
//! assert!(subscriber.is_none());
//! assert_eq!(*log.borrow(), ["User's name is Ray", "User's name is Vicki"]);
//! ```

pub mod bag;
pub mod published;

pub use bag::SubscriptionBag;
pub use published::{Published, Subscription};
