//! Image frame buffer and region-of-interest types.
//!
//! [`Frame`] is the unit of data that flows along graph edges: a row-major
//! `f32` raster with a width, a height and a depth. Depth is 1 for ordinary
//! frames; only the stacking task produces depth > 1 volumes, which exist
//! solely to feed the flatten reduction.

/// Row-major float image buffer.
///
/// `data.len()` is always `width * height * depth`. Layer `z` occupies
/// `data[z * width * height .. (z + 1) * width * height]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Number of columns.
    pub width: u32,
    /// Number of rows per layer.
    pub height: u32,
    /// Number of stacked layers (1 for ordinary frames).
    pub depth: u32,
    /// Pixel values, row-major, layer by layer.
    pub data: Vec<f32>,
}

impl Frame {
    /// Creates a zero-filled single-layer frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth: 1,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    /// Creates a single-layer frame from existing pixel data.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != width * height`.
    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> Self {
        assert_eq!(
            data.len(),
            width as usize * height as usize,
            "pixel data does not match {width}x{height}"
        );
        Self {
            width,
            height,
            depth: 1,
            data,
        }
    }

    /// Creates a stacked volume from existing pixel data.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != width * height * depth`.
    pub fn with_depth(width: u32, height: u32, depth: u32, data: Vec<f32>) -> Self {
        assert_eq!(
            data.len(),
            width as usize * height as usize * depth as usize,
            "pixel data does not match {width}x{height}x{depth}"
        );
        Self {
            width,
            height,
            depth,
            data,
        }
    }

    /// Returns `(width, height)` of a single layer.
    #[inline]
    pub fn shape(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels in a single layer.
    #[inline]
    pub fn layer_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns the pixels of layer `z`.
    ///
    /// # Panics
    ///
    /// Panics if `z >= depth`.
    pub fn layer(&self, z: u32) -> &[f32] {
        assert!(z < self.depth, "layer {z} out of range (depth {})", self.depth);
        let len = self.layer_len();
        &self.data[z as usize * len..(z as usize + 1) * len]
    }

    /// True when both frames have the same width and height.
    #[inline]
    pub fn same_shape(&self, other: &Frame) -> bool {
        self.width == other.width && self.height == other.height
    }
}

/// Vertical row subset read from each stored frame.
///
/// `height: None` means "down to the bottom of the frame"; `y_step` selects
/// every step-th row within the range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roi {
    /// First row.
    pub y: u32,
    /// Number of rows spanned, before `y_step` subsampling.
    pub height: Option<u32>,
    /// Row stride (1 = every row).
    pub y_step: u32,
}

impl Default for Roi {
    fn default() -> Self {
        Self::full()
    }
}

impl Roi {
    /// The whole frame: every row.
    pub fn full() -> Self {
        Self {
            y: 0,
            height: None,
            y_step: 1,
        }
    }

    /// Row indices selected from a frame of the given height.
    ///
    /// Empty when `y` is at or beyond the frame bottom.
    pub fn row_indices(&self, frame_height: u32) -> Vec<u32> {
        let step = self.y_step.max(1);
        let end = match self.height {
            Some(h) => (self.y + h).min(frame_height),
            None => frame_height,
        };
        (self.y..end).step_by(step as usize).collect()
    }

    /// Number of rows a frame of the given height yields under this ROI.
    pub fn out_height(&self, frame_height: u32) -> u32 {
        self.row_indices(frame_height).len() as u32
    }
}
