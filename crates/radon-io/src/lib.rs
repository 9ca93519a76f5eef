//! Radon I/O - raster stack files and source discovery.
//!
//! Frames are stored in `.rst` stack files: a 16-byte header (magic
//! `RST1`, width, height, frame count as little-endian `u32`) followed by
//! the frames as raw little-endian `f32` rows. The format is deliberately
//! minimal — just enough structure for header-only probing, row-wise ROI
//! reads and append-mode writes, which is everything the pipelines need.
//!
//! Sources are referenced by path, directory or glob pattern; see
//! [`discover`].

mod discover;
mod stack;

pub use discover::{discover, frame_count, probe_shape};
pub use stack::{STACK_EXTENSION, StackError, StackInfo, StackReader, StackWriter, stack_info};

/// Convenience result alias for stack operations.
pub type Result<T> = std::result::Result<T, StackError>;
