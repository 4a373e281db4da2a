//! In-memory renderer backend.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use mirror_ipc::{Icon, Size};

use crate::error::RenderError;
use crate::frame::VideoFrame;
use crate::renderer::{FrameTextureSpec, Renderer, TextureKind};
use crate::RenderResult;

/// A texture living in system memory.
#[derive(Debug)]
pub struct HeadlessTexture {
    /// Unique id, never reused within one renderer.
    pub id: u64,

    pub kind: TextureKind,

    pub size: Size,

    /// Luma for frame textures, RGBA for icon textures, tightly packed.
    pub pixels: Vec<u8>,
}

/// Counters kept by a [`HeadlessRenderer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessStats {
    pub textures_created: u64,
    pub textures_destroyed: u64,
    pub frame_uploads: u64,
    pub presents: u64,

    /// Kind and size of the texture drawn by the last present, if any.
    pub last_presented: Option<(TextureKind, Size)>,
}

impl HeadlessStats {
    /// Textures created and not yet destroyed.
    pub fn live_textures(&self) -> u64 {
        self.textures_created - self.textures_destroyed
    }
}

/// Shared view of a renderer's counters, usable after the renderer has
/// been moved into a texture manager.
#[derive(Debug, Clone, Default)]
pub struct HeadlessStatsHandle {
    inner: Arc<Mutex<HeadlessStats>>,
}

impl HeadlessStatsHandle {
    /// Get current counters.
    pub fn snapshot(&self) -> HeadlessStats {
        self.inner.lock().clone()
    }
}

/// Renderer that keeps textures in memory and draws nowhere.
///
/// Used when no display is available and by tests.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    stats: HeadlessStatsHandle,
    next_id: u64,
}

impl HeadlessRenderer {
    /// Create a new headless renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle on this renderer's counters.
    pub fn stats(&self) -> HeadlessStatsHandle {
        self.stats.clone()
    }

    fn allocate(&mut self, kind: TextureKind, size: Size, pixels: Vec<u8>) -> HeadlessTexture {
        let id = self.next_id;
        self.next_id += 1;
        self.stats.inner.lock().textures_created += 1;

        trace!(id, ?kind, width = size.width, height = size.height, "Texture allocated");

        HeadlessTexture {
            id,
            kind,
            size,
            pixels,
        }
    }
}

impl Renderer for HeadlessRenderer {
    type Texture = HeadlessTexture;

    fn name(&self) -> &str {
        "headless"
    }

    fn create_frame_texture(&mut self, spec: &FrameTextureSpec) -> RenderResult<HeadlessTexture> {
        if spec.size.is_empty() {
            return Err(RenderError::TextureCreation(format!(
                "empty size {}x{}",
                spec.size.width, spec.size.height
            )));
        }

        let len = spec.size.width as usize * spec.size.height as usize;
        Ok(self.allocate(TextureKind::Frame, spec.size, vec![0u8; len]))
    }

    fn create_icon_texture(&mut self, icon: &Icon) -> RenderResult<HeadlessTexture> {
        if !icon.is_valid() {
            return Err(RenderError::TextureCreation(format!(
                "malformed icon {}x{} with {} bytes",
                icon.width,
                icon.height,
                icon.pixels.len()
            )));
        }

        Ok(self.allocate(TextureKind::Icon, icon.size(), icon.pixels.to_vec()))
    }

    fn update_frame_texture(
        &mut self,
        texture: &mut HeadlessTexture,
        frame: &VideoFrame,
    ) -> RenderResult<()> {
        if texture.kind != TextureKind::Frame || texture.size != frame.size() {
            return Err(RenderError::TextureUpdate(format!(
                "texture {} ({:?} {}x{}) cannot take a {}x{} frame",
                texture.id,
                texture.kind,
                texture.size.width,
                texture.size.height,
                frame.width,
                frame.height
            )));
        }
        frame.validate()?;

        // Only luma is kept.
        let width = frame.width as usize;
        let linesize = frame.linesizes[0];
        for (row, dst) in texture.pixels.chunks_exact_mut(width).enumerate() {
            let start = row * linesize;
            dst.copy_from_slice(&frame.planes[0][start..start + width]);
        }

        self.stats.inner.lock().frame_uploads += 1;
        Ok(())
    }

    fn destroy_texture(&mut self, texture: HeadlessTexture) {
        trace!(id = texture.id, "Texture destroyed");
        self.stats.inner.lock().textures_destroyed += 1;
    }

    fn present(&mut self, texture: Option<&HeadlessTexture>) -> RenderResult<()> {
        let mut stats = self.stats.inner.lock();
        stats.presents += 1;
        stats.last_presented = texture.map(|t| (t.kind, t.size));
        Ok(())
    }
}
