#![forbid(unsafe_code)]

//! Mediator pattern primitives for patternbook.
//!
//! - [`Mediator`]: generic, insertion-ordered broadcast registry over colleagues
//!   held with [`Ownership::Strong`] or [`Ownership::Weak`] references.
//! - [`ColleagueId`]: reference-identity key used to exclude a sender or remove
//!   a colleague.
//! - [`chat`]: a concrete chat-room mediator composed from the registry.
//!
//! # Architecture
//!
//! The registry is single-threaded (`Rc` + `RefCell`). It is a building block,
//! not a message bus: it knows nothing about messages, only how to invoke an
//! action on each live colleague. Concrete mediators wrap it and choose the
//! callback their colleagues implement.

pub mod chat;
pub mod colleague;
pub mod error;
pub mod registry;

pub use chat::{Colleague, MediatorProtocol, Musketeer, MusketeerMediator, ReceivedMessage};
pub use colleague::{ColleagueEntry, ColleagueId, Ownership};
pub use error::MediatorError;
pub use registry::Mediator;
