//! Error types for the disconnect module.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when starting a disconnect monitor.
#[derive(Debug, Error)]
pub enum DisconnectError {
    /// The worker thread could not be spawned.
    #[error("Could not spawn disconnect worker: {0}")]
    Spawn(#[source] io::Error),
}

/// Errors that can occur while loading an icon.
#[derive(Debug, Error)]
pub enum IconError {
    /// No icon directory was configured and the executable path is unusable.
    #[error("Could not locate icon directory: {0}")]
    NoExecutableDir(String),

    /// The icon file could not be read.
    #[error("Could not read icon {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The icon file is not a decodable image.
    #[error("Could not decode icon {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
