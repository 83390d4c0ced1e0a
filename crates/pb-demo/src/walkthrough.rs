#![forbid(unsafe_code)]

//! The two playground pages, as runnable walkthroughs.

use std::cell::RefCell;
use std::rc::Rc;

use pb_mediator::{MediatorError, Musketeer, MusketeerMediator};
use pb_reactive::Published;
use tracing::{info, info_span};

/// Three musketeers take turns speaking, then the mediator calls the charge.
///
/// Returns the musketeers so callers can inspect what each one received.
pub fn mediator() -> Result<Vec<Rc<Musketeer>>, MediatorError> {
    let _span = info_span!("mediator").entered();
    let mediator = Rc::new(MusketeerMediator::new());
    let athos = Musketeer::new(&mediator, "Athos");
    let porthos = Musketeer::new(&mediator, "Porthos");
    let aramis = Musketeer::new(&mediator, "Aramis");

    athos.send_message("One for all...!")?;
    porthos.send_message("and all for one...!")?;
    aramis.send_message("Unus pro omnibus, omnes pro uno!")?;

    let reached = mediator.broadcast("Charge!");
    info!(reached, "mediator walkthrough done");
    Ok(vec![athos, porthos, aramis])
}

/// A user's published name is observed until the subscriber lets go.
///
/// Returns the lines the subscriber printed.
pub fn observer() -> Vec<String> {
    let _span = info_span!("observer").entered();
    let name = Published::new(String::from("Ray"));
    let lines = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&lines);
    let mut subscriber = Some(name.subscribe(move |n| {
        let line = format!("User's name is {n}");
        info!("{line}");
        sink.borrow_mut().push(line);
    }));

    name.set("Vicki".into());
    subscriber.take();
    name.set("Ray has left the building".into());

    info!(
        version = name.version(),
        subscribed = subscriber.is_some(),
        "observer walkthrough done"
    );
    lines.take()
}
