//! Rendering backend seam.

use mirror_ipc::{Icon, Size};

use crate::frame::{ColorRange, ColorSpace, VideoFrame};
use crate::RenderResult;

/// What the bound texture currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    /// A streaming YUV texture fed by decoded frames.
    Frame,

    /// A static RGBA texture made from an icon.
    Icon,
}

/// Parameters for a streaming frame texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTextureSpec {
    pub size: Size,
    pub color_space: ColorSpace,
    pub color_range: ColorRange,
}

impl FrameTextureSpec {
    /// Spec matching the given frame.
    pub fn for_frame(frame: &VideoFrame) -> Self {
        Self {
            size: frame.size(),
            color_space: frame.color_space,
            color_range: frame.color_range,
        }
    }
}

/// A rendering backend able to hold textures and draw one of them.
///
/// Textures are owned values handed back to the backend for destruction;
/// the backend never drops them on its own.
pub trait Renderer {
    /// Backend texture handle.
    type Texture;

    /// Backend name for diagnostics.
    fn name(&self) -> &str;

    /// Create a streaming YUV 4:2:0 texture.
    fn create_frame_texture(&mut self, spec: &FrameTextureSpec) -> RenderResult<Self::Texture>;

    /// Create a static texture from an RGBA icon.
    fn create_icon_texture(&mut self, icon: &Icon) -> RenderResult<Self::Texture>;

    /// Upload the planes of `frame` into a frame texture of the same size.
    fn update_frame_texture(
        &mut self,
        texture: &mut Self::Texture,
        frame: &VideoFrame,
    ) -> RenderResult<()>;

    /// Release a texture.
    fn destroy_texture(&mut self, texture: Self::Texture);

    /// Clear the target, draw `texture` if any, and present.
    fn present(&mut self, texture: Option<&Self::Texture>) -> RenderResult<()>;
}
