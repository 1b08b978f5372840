//! Event sources for the application.
//!
//! User input (keys, resizes) is read on a dedicated thread so the event loop
//! never blocks on the terminal. Execution responses travel on a separate
//! channel owned by the session registry.
//!
//! # Submodules
//!
//! - `terminal`: decoding of key input into line-editing events

pub mod terminal;

use std::io::Result;
use std::thread;

use tokio::sync::mpsc::{self, Receiver};

/// Type alias for user input events from the terminal.
pub type UserEvent = crossterm::event::Event;

/// Initializes the user event stream.
///
/// Spawns a thread that reads events with `crossterm::event::read()` and
/// forwards them. The thread ends once the receiver is dropped.
pub fn init_user_event() -> Receiver<Result<UserEvent>> {
    let (tx, rx) = mpsc::channel(64);
    thread::spawn(move || {
        loop {
            if tx.blocking_send(crossterm::event::read()).is_err() {
                break;
            }
        }
    });
    rx
}
