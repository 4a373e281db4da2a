//! Screen session for mirror.
//!
//! This crate ties frame rendering to the disconnect watchdog: the
//! [`Screen`] renders frames while the device is connected, shows the
//! disconnected icon when it goes away, and closes either on user request
//! or when the disconnect timeout expires.

mod error;
mod listener;
mod screen;

pub use error::SessionError;
pub use listener::{ChannelListener, DisconnectNotice};
pub use screen::Screen;

/// Channel capacity for monitor notices; a monitor sends at most two.
pub const NOTICE_CHANNEL_CAPACITY: usize = 4;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
