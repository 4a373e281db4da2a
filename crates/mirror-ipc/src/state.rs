//! Screen state machine types.

use serde::{Deserialize, Serialize};

/// The current state of a screen session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenState {
    /// Frames are flowing from the device.
    #[default]
    Mirroring,

    /// The device went away; the screen waits for the disconnect timeout.
    Disconnected {
        /// Configured timeout, `None` when the screen stays open until closed.
        timeout_ms: Option<u64>,
    },

    /// The screen is closed.
    Closed {
        /// Why the screen closed.
        reason: CloseReason,
    },
}

impl ScreenState {
    /// Returns true while frames are being mirrored.
    pub fn is_mirroring(&self) -> bool {
        matches!(self, Self::Mirroring)
    }

    /// Returns true once the device has been lost.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }

    /// Returns true once the screen is closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }

    /// Returns a simple string representation of the state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mirroring => "Mirroring",
            Self::Disconnected { .. } => "Disconnected",
            Self::Closed { .. } => "Closed",
        }
    }
}

/// Reason for closing the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    /// The user closed the window.
    UserRequested,

    /// The device was lost and did not come back before the deadline.
    DisconnectTimeout,

    /// The session hit an error it cannot continue after.
    Failed,
}

impl CloseReason {
    /// Returns a display message for this reason.
    pub fn message(&self) -> &'static str {
        match self {
            Self::UserRequested => "Window closed by user",
            Self::DisconnectTimeout => "Device disconnected",
            Self::Failed => "Screen session failed",
        }
    }
}
