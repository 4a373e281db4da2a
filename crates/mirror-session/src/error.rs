//! Error types for the session module.

use thiserror::Error;

use mirror_disconnect::DisconnectError;
use mirror_render::RenderError;

/// Errors that end a screen session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The disconnect monitor could not be started.
    #[error("Disconnect monitor failed: {0}")]
    Disconnect(#[from] DisconnectError),

    /// The window could not be drawn at all.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}
