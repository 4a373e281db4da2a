//! Events sent from the screen session to the UI.

use serde::{Deserialize, Serialize};

use crate::state::{CloseReason, ScreenState};
use crate::types::Size;

/// Events that the screen can send to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenEvent {
    /// Screen state has changed.
    StateChanged {
        /// Previous state.
        previous: ScreenState,

        /// Current state.
        current: ScreenState,
    },

    /// The frame texture was (re)created with a new size.
    FrameSizeChanged(Size),

    /// The frame source went away without a close request.
    DeviceDisconnected,

    /// The disconnected icon is now on screen.
    DisconnectedIconShown,

    /// The screen has closed and its loop returned.
    Closed(CloseReason),
}
