//! Commands sent to the screen session.

use serde::{Deserialize, Serialize};

/// Commands that the UI can send to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenCommand {
    /// The user closed the window.
    Close,
}
