#![forbid(unsafe_code)]

//! Playground for the patternbook crates.
//!
//! Runs the mediator and observer walkthroughs and logs every step to stderr.
//! Set `PB_LOG` (or `RUST_LOG`) to change verbosity, e.g.
//! `PB_LOG=pb_mediator=trace,info`.

mod logging;
mod walkthrough;

use std::process::ExitCode;

use tracing::error;

fn main() -> ExitCode {
    logging::init();

    if let Err(err) = walkthrough::mediator() {
        error!(%err, "mediator walkthrough failed");
        return ExitCode::FAILURE;
    }
    walkthrough::observer();
    ExitCode::SUCCESS
}
