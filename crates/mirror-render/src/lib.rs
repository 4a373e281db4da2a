//! Frame rendering for mirror.
//!
//! This crate owns the path from a decoded video frame to something on
//! screen: the [`VideoFrame`] type, the [`Renderer`] backend seam, and the
//! [`TextureManager`] that keeps a single texture bound and recreates it
//! only when the incoming content no longer fits.

mod error;
mod frame;
mod headless;
mod renderer;
mod texture;

pub use error::RenderError;
pub use frame::{ColorRange, ColorSpace, VideoFrame};
pub use headless::{HeadlessRenderer, HeadlessStats, HeadlessStatsHandle, HeadlessTexture};
pub use renderer::{FrameTextureSpec, Renderer, TextureKind};
pub use texture::{FrameUpload, TextureManager};

use crossbeam_channel::{Receiver, Sender};

/// Channel capacity for decoded frames.
pub const FRAME_CHANNEL_CAPACITY: usize = 3;

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Creates a bounded channel carrying decoded frames to the screen.
pub fn frame_channel() -> (Sender<VideoFrame>, Receiver<VideoFrame>) {
    crossbeam_channel::bounded(FRAME_CHANNEL_CAPACITY)
}
