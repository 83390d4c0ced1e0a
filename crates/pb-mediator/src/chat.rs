#![forbid(unsafe_code)]

//! A chat-room mediator built on [`Mediator`].
//!
//! Colleagues never hold references to one another. A [`Musketeer`] only knows
//! its mediator, and the [`MusketeerMediator`] relays every message to all other
//! registered colleagues through [`Mediator::invoke_colleagues`].
//!
//! # Invariants
//!
//! 1. A sender never receives its own message.
//! 2. Messages reach the other colleagues in the order they joined.
//! 3. The mediator owns its colleagues (strong registration); colleagues only
//!    hold a `Weak` back to the mediator, so there is no reference cycle.
//!
//! # Failure Modes
//!
//! - Sending after the mediator is dropped returns
//!   [`MediatorError::MediatorDropped`]; nothing is delivered.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use pb_mediator::chat::{Musketeer, MusketeerMediator};
//!
//! let mediator = Rc::new(MusketeerMediator::new());
//! let athos = Musketeer::new(&mediator, "Athos");
//! let porthos = Musketeer::new(&mediator, "Porthos");
//!
//! assert_eq!(athos.send_message("One for all...!").unwrap(), 1);
//! assert_eq!(porthos.received()[0].text, "One for all...!");
//! assert!(athos.received().is_empty());
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::info;

use crate::colleague::{ColleagueId, Ownership};
use crate::error::MediatorError;
use crate::registry::Mediator;

/// A participant that can receive relayed messages.
pub trait Colleague {
    /// Display name used in logs and as the sender of received messages.
    fn name(&self) -> &str;

    /// Called by the mediator when `sender` (or nobody, for announcements)
    /// sends `message`.
    fn did_send_message(&self, sender: Option<&dyn Colleague>, message: &str);
}

/// What a colleague needs from its mediator.
pub trait MediatorProtocol {
    /// Register a colleague for future messages.
    fn add_colleague(&self, colleague: Rc<dyn Colleague>);

    /// Relay `message` from `by` to every other colleague. Returns the number
    /// of colleagues reached.
    fn send_message(&self, message: &str, by: &dyn Colleague) -> usize;
}

// ---------------------------------------------------------------------------
// MusketeerMediator
// ---------------------------------------------------------------------------

/// Chat-room mediator that relays each message to everyone but its sender.
///
/// Colleagues are registered strongly and never de-duplicated.
#[derive(Default)]
pub struct MusketeerMediator {
    colleagues: Mediator<dyn Colleague>,
}

impl MusketeerMediator {
    /// Create a mediator with no colleagues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Announce `message` to every colleague, with no sender.
    pub fn broadcast(&self, message: &str) -> usize {
        info!(text = message, "announcement");
        self.colleagues
            .invoke_colleagues(None, |colleague| colleague.did_send_message(None, message))
    }

    /// Underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Mediator<dyn Colleague> {
        &self.colleagues
    }
}

impl MediatorProtocol for MusketeerMediator {
    fn add_colleague(&self, colleague: Rc<dyn Colleague>) {
        self.colleagues.add_colleague(&colleague, Ownership::Strong);
    }

    fn send_message(&self, message: &str, by: &dyn Colleague) -> usize {
        self.colleagues
            .invoke_colleagues(Some(ColleagueId::of_ref(by)), |colleague| {
                colleague.did_send_message(Some(by), message);
            })
    }
}

impl fmt::Debug for MusketeerMediator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MusketeerMediator")
            .field("colleagues", &self.colleagues.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Musketeer
// ---------------------------------------------------------------------------

/// A message as seen by its recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Sender's name, or `None` for an announcement.
    pub from: Option<String>,
    /// Message body.
    pub text: String,
}

/// A named colleague that talks only through its mediator.
pub struct Musketeer {
    name: String,
    mediator: Weak<dyn MediatorProtocol>,
    inbox: RefCell<Vec<ReceivedMessage>>,
}

impl Musketeer {
    /// Create a musketeer and register it with `mediator`.
    pub fn new<M>(mediator: &Rc<M>, name: impl Into<String>) -> Rc<Self>
    where
        M: MediatorProtocol + 'static,
    {
        let weak: Weak<M> = Rc::downgrade(mediator);
        let musketeer = Rc::new(Self {
            name: name.into(),
            mediator: weak,
            inbox: RefCell::new(Vec::new()),
        });
        let colleague: Rc<dyn Colleague> = musketeer.clone();
        mediator.add_colleague(colleague);
        musketeer
    }

    /// Send `message` to every other colleague of this musketeer's mediator.
    ///
    /// Returns the number of colleagues reached.
    pub fn send_message(&self, message: &str) -> Result<usize, MediatorError> {
        let mediator = self
            .mediator
            .upgrade()
            .ok_or_else(|| MediatorError::MediatorDropped {
                colleague: self.name.clone(),
            })?;
        info!(musketeer = %self.name, "{} sent: {}", self.name, message);
        Ok(mediator.send_message(message, self))
    }

    /// Messages received so far, oldest first.
    #[must_use]
    pub fn received(&self) -> Vec<ReceivedMessage> {
        self.inbox.borrow().clone()
    }
}

impl Colleague for Musketeer {
    fn name(&self) -> &str {
        &self.name
    }

    fn did_send_message(&self, sender: Option<&dyn Colleague>, message: &str) {
        info!(musketeer = %self.name, "{} received: {}", self.name, message);
        self.inbox.borrow_mut().push(ReceivedMessage {
            from: sender.map(|s| s.name().to_owned()),
            text: message.to_owned(),
        });
    }
}

impl fmt::Debug for Musketeer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Musketeer")
            .field("name", &self.name)
            .field("received", &self.inbox.borrow().len())
            .finish()
    }
}
