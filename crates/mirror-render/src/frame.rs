//! Decoded video frame types.

use bytes::Bytes;

use mirror_ipc::Size;

use crate::error::RenderError;
use crate::RenderResult;

/// Color space tag carried from the decoder to the backend.
///
/// The texture manager does not interpret it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorSpace {
    Bt601,
    Bt709,
    Bt2020,
    #[default]
    Unspecified,
}

/// Color range tag carried from the decoder to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorRange {
    /// Studio swing (16-235).
    #[default]
    Limited,

    /// Full swing (0-255).
    Full,
}

/// A decoded planar YUV 4:2:0 frame.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Y, U and V planes.
    pub planes: [Bytes; 3],

    /// Bytes per row of each plane.
    pub linesizes: [usize; 3],

    /// Frame width in pixels.
    pub width: u32,

    /// Frame height in pixels.
    pub height: u32,

    pub color_space: ColorSpace,

    pub color_range: ColorRange,

    /// Monotonically increasing sequence number.
    pub sequence: u64,
}

impl VideoFrame {
    /// Create a new frame with unspecified color tags.
    pub fn new(
        planes: [Bytes; 3],
        linesizes: [usize; 3],
        width: u32,
        height: u32,
        sequence: u64,
    ) -> Self {
        Self {
            planes,
            linesizes,
            width,
            height,
            color_space: ColorSpace::default(),
            color_range: ColorRange::default(),
            sequence,
        }
    }

    /// A tightly packed mid-gray frame.
    pub fn blank(width: u32, height: u32, sequence: u64) -> Self {
        let [y_width, c_width] = Self::plane_widths(width);
        let [y_height, c_height, _] = Self::plane_heights(height);

        let y = Bytes::from(vec![0x80u8; y_width * y_height]);
        let c = Bytes::from(vec![0x80u8; c_width * c_height]);

        Self::new([y, c.clone(), c], [y_width, c_width, c_width], width, height, sequence)
    }

    /// Set the color tags.
    pub fn with_color(mut self, color_space: ColorSpace, color_range: ColorRange) -> Self {
        self.color_space = color_space;
        self.color_range = color_range;
        self
    }

    /// Frame dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Calculate tightly packed YUV 4:2:0 buffer size for given dimensions.
    pub fn yuv420_buffer_size(width: u32, height: u32) -> usize {
        let [y_width, c_width] = Self::plane_widths(width);
        let [y_height, c_height, _] = Self::plane_heights(height);
        y_width * y_height + 2 * c_width * c_height
    }

    /// Check that the planes hold enough data for the dimensions.
    pub fn validate(&self) -> RenderResult<()> {
        if self.size().is_empty() {
            return Err(RenderError::InvalidFrame(format!(
                "empty frame {}x{}",
                self.width, self.height
            )));
        }

        let [y_width, c_width] = Self::plane_widths(self.width);
        let min_widths = [y_width, c_width, c_width];
        let heights = Self::plane_heights(self.height);

        for (i, plane) in self.planes.iter().enumerate() {
            let linesize = self.linesizes[i];
            if linesize < min_widths[i] {
                return Err(RenderError::InvalidFrame(format!(
                    "plane {} linesize {} < {}",
                    i, linesize, min_widths[i]
                )));
            }

            // The last row may be shorter than the linesize.
            let needed = linesize
                .checked_mul(heights[i] - 1)
                .and_then(|n| n.checked_add(min_widths[i]))
                .ok_or_else(|| {
                    RenderError::InvalidFrame(format!(
                        "plane {} linesize {} overflows for {} rows",
                        i, linesize, heights[i]
                    ))
                })?;
            if plane.len() < needed {
                return Err(RenderError::InvalidFrame(format!(
                    "plane {} holds {} bytes, {} needed",
                    i,
                    plane.len(),
                    needed
                )));
            }
        }

        Ok(())
    }

    /// Validate that the frame data matches its dimensions.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    fn plane_widths(width: u32) -> [usize; 2] {
        let width = width as usize;
        [width, width.div_ceil(2)]
    }

    fn plane_heights(height: u32) -> [usize; 3] {
        let height = height as usize;
        let chroma = height.div_ceil(2);
        [height, chroma, chroma]
    }
}
