//! Typed session<->UI messages for mirror.
//!
//! This crate defines the message types exchanged between the screen
//! session and whatever drives it, plus the small value types (icons,
//! sizes, configuration) shared by every other crate in the workspace.

mod commands;
mod events;
mod state;
mod types;

pub use commands::ScreenCommand;
pub use events::ScreenEvent;
pub use state::{CloseReason, ScreenState};
pub use types::{Icon, ScreenConfig, Size, DEFAULT_DISCONNECT_TIMEOUT_MS};

use crossbeam_channel::{Receiver, Sender};

/// Channel capacity for commands (UI → screen).
pub const COMMAND_CHANNEL_CAPACITY: usize = 16;

/// Channel capacity for events (screen → UI).
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Creates a bounded command channel.
pub fn command_channel() -> (Sender<ScreenCommand>, Receiver<ScreenCommand>) {
    crossbeam_channel::bounded(COMMAND_CHANNEL_CAPACITY)
}

/// Creates a bounded event channel.
pub fn event_channel() -> (Sender<ScreenEvent>, Receiver<ScreenEvent>) {
    crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY)
}
