//! Error types for the render module.

use thiserror::Error;

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The frame does not describe a usable picture.
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// The backend could not create a texture.
    #[error("Could not create texture: {0}")]
    TextureCreation(String),

    /// The backend could not upload pixels into a texture.
    #[error("Could not update texture: {0}")]
    TextureUpdate(String),

    /// The backend could not present the frame.
    #[error("Could not present: {0}")]
    Present(String),
}
