//! Common types shared across the workspace.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Default delay between device loss and the window closing.
pub const DEFAULT_DISCONNECT_TIMEOUT_MS: u64 = 2000;

/// Configuration for a screen session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Window title.
    pub window_title: String,

    /// How long the disconnected icon stays up before the window closes.
    ///
    /// `None` keeps the window open until the user closes it.
    pub disconnect_timeout_ms: Option<u64>,

    /// Directory holding the icon files (falls back to `MIRROR_ICON_DIR`,
    /// then to the executable's directory).
    pub icon_dir: Option<PathBuf>,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            window_title: "mirror".to_string(),
            disconnect_timeout_ms: Some(DEFAULT_DISCONNECT_TIMEOUT_MS),
            icon_dir: None,
        }
    }
}

impl ScreenConfig {
    /// Parse a configuration from JSON; absent fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Absolute deadline for the disconnect timeout, counted from `now`.
    pub fn disconnect_deadline(&self, now: Instant) -> Option<Instant> {
        self.disconnect_timeout_ms
            .map(|ms| now + Duration::from_millis(ms))
    }
}

/// Dimensions in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A decoded RGBA8 image, used for status icons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    /// Tightly packed RGBA8 pixels, row-major.
    pub pixels: Bytes,

    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

impl Icon {
    /// Bytes per pixel of the RGBA8 layout.
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Create a new icon.
    pub fn new(pixels: Bytes, width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Icon dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Bytes in one row of pixels.
    pub fn pitch(&self) -> usize {
        self.width as usize * Self::BYTES_PER_PIXEL
    }

    /// Validate that the pixel data matches the dimensions.
    pub fn is_valid(&self) -> bool {
        !self.size().is_empty() && self.pixels.len() == self.pitch() * self.height as usize
    }
}
