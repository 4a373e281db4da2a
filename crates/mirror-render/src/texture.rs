//! Texture lifecycle management.

use tracing::{debug, info};

use mirror_ipc::{Icon, Size};

use crate::frame::VideoFrame;
use crate::renderer::{FrameTextureSpec, Renderer, TextureKind};
use crate::RenderResult;

/// What [`TextureManager::set_from_frame`] had to do with the bound texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUpload {
    /// The bound frame texture already matched and was updated in place.
    Reused,

    /// A new frame texture of this size was created.
    Recreated(Size),
}

struct BoundTexture<T> {
    texture: T,
    size: Size,
    kind: TextureKind,
}

/// Owns the single texture shown on screen.
///
/// Frame textures are kept across frames of the same size; anything else
/// (first frame, new size, switching from the icon) recreates it.
pub struct TextureManager<R: Renderer> {
    renderer: R,
    bound: Option<BoundTexture<R::Texture>>,
}

impl<R: Renderer> TextureManager<R> {
    /// Create a manager drawing through `renderer`.
    pub fn new(renderer: R) -> Self {
        info!("Renderer: {}", renderer.name());
        Self {
            renderer,
            bound: None,
        }
    }

    /// Show a decoded frame, recreating the texture if it does not fit.
    pub fn set_from_frame(&mut self, frame: &VideoFrame) -> RenderResult<FrameUpload> {
        frame.validate()?;
        let size = frame.size();

        let (bound, upload) = match self.bound.take() {
            Some(bound) if bound.kind == TextureKind::Frame && bound.size == size => {
                (bound, FrameUpload::Reused)
            }
            previous => {
                // Incompatible texture, recreate it
                if let Some(previous) = previous {
                    self.renderer.destroy_texture(previous.texture);
                }

                let spec = FrameTextureSpec::for_frame(frame);
                let texture = self.renderer.create_frame_texture(&spec)?;

                info!("Texture: {}x{}", size.width, size.height);
                let bound = BoundTexture {
                    texture,
                    size,
                    kind: TextureKind::Frame,
                };
                (bound, FrameUpload::Recreated(size))
            }
        };

        let bound = self.bound.insert(bound);
        self.renderer.update_frame_texture(&mut bound.texture, frame)?;

        Ok(upload)
    }

    /// Show an icon. Always recreates the texture.
    pub fn set_from_icon(&mut self, icon: &Icon) -> RenderResult<()> {
        self.reset();

        let texture = self.renderer.create_icon_texture(icon)?;
        debug!(width = icon.width, height = icon.height, "Icon texture created");

        self.bound = Some(BoundTexture {
            texture,
            size: icon.size(),
            kind: TextureKind::Icon,
        });

        Ok(())
    }

    /// Release the bound texture, if any.
    pub fn reset(&mut self) {
        if let Some(bound) = self.bound.take() {
            self.renderer.destroy_texture(bound.texture);
        }
    }

    /// Draw the bound texture (or just clear when there is none).
    pub fn present(&mut self) -> RenderResult<()> {
        let texture = self.bound.as_ref().map(|bound| &bound.texture);
        self.renderer.present(texture)
    }

    /// Size of the bound texture.
    pub fn size(&self) -> Option<Size> {
        self.bound.as_ref().map(|bound| bound.size)
    }

    /// Kind of the bound texture.
    pub fn kind(&self) -> Option<TextureKind> {
        self.bound.as_ref().map(|bound| bound.kind)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

impl<R: Renderer> Drop for TextureManager<R> {
    fn drop(&mut self) {
        self.reset();
    }
}
