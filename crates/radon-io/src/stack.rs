//! Reading and writing `.rst` raster stack files.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use radon_core::{Frame, Roi};
use thiserror::Error;

/// File extension used by stack files (without the dot).
pub const STACK_EXTENSION: &str = "rst";

const MAGIC: [u8; 4] = *b"RST1";
const HEADER_LEN: u64 = 16;

/// Errors that can occur in the stack container layer.
#[derive(Debug, Error)]
pub enum StackError {
    /// Failed to read a file.
    #[error("failed to read '{path}': {source}")]
    Read {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("failed to write '{path}': {source}")]
    Write {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file does not start with the stack magic.
    #[error("'{path}' is not a raster stack file")]
    BadMagic {
        /// Offending path.
        path: PathBuf,
    },

    /// The file is shorter than its header claims.
    #[error("'{path}' is truncated")]
    Truncated {
        /// Offending path.
        path: PathBuf,
    },

    /// A frame index beyond the stored frame count was requested.
    #[error("frame {index} out of range for '{path}' ({frames} frames)")]
    FrameOutOfRange {
        /// Offending path.
        path: PathBuf,
        /// Requested frame index.
        index: u32,
        /// Frames actually stored.
        frames: u32,
    },

    /// A frame's shape disagrees with the stack being written.
    #[error(
        "shape mismatch writing '{path}': stack is {stack_width}x{stack_height}, \
         frame is {width}x{height}"
    )]
    ShapeMismatch {
        /// Offending path.
        path: PathBuf,
        /// Width already committed to the stack.
        stack_width: u32,
        /// Height already committed to the stack.
        stack_height: u32,
        /// Width of the rejected frame.
        width: u32,
        /// Height of the rejected frame.
        height: u32,
    },

    /// The region of interest selects no rows.
    #[error("region of interest selects no rows (y={y}, frame height {height})")]
    EmptyRoi {
        /// Configured first row.
        y: u32,
        /// Height of the stored frames.
        height: u32,
    },

    /// Nothing matched a source pattern.
    #[error("no stacks match '{pattern}'")]
    NoMatches {
        /// The pattern as given.
        pattern: String,
    },

    /// A source pattern could not be interpreted.
    #[error("invalid source pattern '{pattern}'")]
    BadPattern {
        /// The pattern as given.
        pattern: String,
    },
}

/// Stack metadata extracted from the header without touching pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Number of frames committed to the file.
    pub frames: u32,
}

impl StackInfo {
    /// Size of one frame's pixel data in bytes.
    #[inline]
    pub fn frame_bytes(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height) * 4
    }
}

fn read_header(file: &mut impl Read, path: &Path) -> Result<StackInfo, StackError> {
    let mut header = [0u8; HEADER_LEN as usize];
    file.read_exact(&mut header).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            StackError::Truncated {
                path: path.to_path_buf(),
            }
        } else {
            StackError::Read {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    if header[..4] != MAGIC {
        return Err(StackError::BadMagic {
            path: path.to_path_buf(),
        });
    }
    let word = |i: usize| u32::from_le_bytes(header[i..i + 4].try_into().unwrap());
    Ok(StackInfo {
        width: word(4),
        height: word(8),
        frames: word(12),
    })
}

/// Reads a stack's header.
pub fn stack_info(path: impl AsRef<Path>) -> Result<StackInfo, StackError> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| StackError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_header(&mut file, path)
}

/// Sequential/random reader over one stack file.
pub struct StackReader {
    path: PathBuf,
    file: BufReader<File>,
    info: StackInfo,
}

impl StackReader {
    /// Opens a stack file and validates its header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StackError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| StackError::Read {
            path: path.clone(),
            source: e,
        })?;
        let mut file = BufReader::new(file);
        let info = read_header(&mut file, &path)?;
        Ok(Self { path, file, info })
    }

    /// Header metadata.
    pub fn info(&self) -> &StackInfo {
        &self.info
    }

    /// Reads a whole frame.
    pub fn read_frame(&mut self, index: u32) -> Result<Frame, StackError> {
        self.read_frame_roi(index, &Roi::full())
    }

    /// Reads the ROI rows of a frame.
    ///
    /// The returned frame has the full stack width and one row per ROI
    /// index; rows are fetched with per-row seeks so a narrow ROI never
    /// pulls the whole frame off disk.
    pub fn read_frame_roi(&mut self, index: u32, roi: &Roi) -> Result<Frame, StackError> {
        if index >= self.info.frames {
            return Err(StackError::FrameOutOfRange {
                path: self.path.clone(),
                index,
                frames: self.info.frames,
            });
        }
        let rows = roi.row_indices(self.info.height);
        if rows.is_empty() {
            return Err(StackError::EmptyRoi {
                y: roi.y,
                height: self.info.height,
            });
        }

        let width = self.info.width as usize;
        let row_bytes = width * 4;
        let base = HEADER_LEN + u64::from(index) * self.info.frame_bytes();

        let mut data = Vec::with_capacity(rows.len() * width);
        let contiguous = roi.y_step <= 1;
        if contiguous {
            self.seek_to(base + u64::from(rows[0]) * row_bytes as u64)?;
            self.read_values(rows.len() * width, &mut data)?;
        } else {
            for &row in &rows {
                self.seek_to(base + u64::from(row) * row_bytes as u64)?;
                self.read_values(width, &mut data)?;
            }
        }

        Ok(Frame::from_data(self.info.width, rows.len() as u32, data))
    }

    fn seek_to(&mut self, offset: u64) -> Result<(), StackError> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| StackError::Read {
                path: self.path.clone(),
                source: e,
            })?;
        Ok(())
    }

    fn read_values(&mut self, count: usize, into: &mut Vec<f32>) -> Result<(), StackError> {
        let mut bytes = vec![0u8; count * 4];
        self.file.read_exact(&mut bytes).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                StackError::Truncated {
                    path: self.path.clone(),
                }
            } else {
                StackError::Read {
                    path: self.path.clone(),
                    source: e,
                }
            }
        })?;
        into.extend(
            bytes
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes(b.try_into().unwrap())),
        );
        Ok(())
    }
}

/// Streaming writer for one stack file.
///
/// The first frame written fixes the stack's shape; every later frame must
/// match. The header's frame count is only updated by
/// [`finish`](Self::finish) — dropping the writer without finishing leaves
/// the previously committed count intact, so readers never see a
/// half-written tail.
pub struct StackWriter {
    path: PathBuf,
    file: BufWriter<File>,
    shape: Option<(u32, u32)>,
    frames: u32,
}

impl StackWriter {
    /// Creates (or truncates) a stack file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, StackError> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| StackError::Write {
                path: path.clone(),
                source: e,
            })?;
        let mut header = [0u8; HEADER_LEN as usize];
        header[..4].copy_from_slice(&MAGIC);
        file.write_all(&header).map_err(|e| StackError::Write {
            path: path.clone(),
            source: e,
        })?;
        Ok(Self {
            path,
            file: BufWriter::new(file),
            shape: None,
            frames: 0,
        })
    }

    /// Opens a stack file for appending, creating it when absent.
    ///
    /// New frames land after the committed frame count; any uncommitted
    /// tail left by an interrupted writer is overwritten.
    pub fn append(path: impl AsRef<Path>) -> Result<Self, StackError> {
        let path = path.as_ref();
        if !path.exists() {
            return Self::create(path);
        }
        let path = path.to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| StackError::Write {
                path: path.clone(),
                source: e,
            })?;
        let info = read_header(&mut file, &path)?;
        let end = HEADER_LEN + u64::from(info.frames) * info.frame_bytes();
        file.seek(SeekFrom::Start(end))
            .map_err(|e| StackError::Write {
                path: path.clone(),
                source: e,
            })?;
        let shape = (info.width > 0 && info.height > 0).then_some((info.width, info.height));
        Ok(Self {
            path,
            file: BufWriter::new(file),
            shape,
            frames: info.frames,
        })
    }

    /// Writes a frame (every layer of a stacked volume counts separately).
    pub fn write_frame(&mut self, frame: &Frame) -> Result<(), StackError> {
        match self.shape {
            None => self.shape = Some(frame.shape()),
            Some((w, h)) if (w, h) != frame.shape() => {
                return Err(StackError::ShapeMismatch {
                    path: self.path.clone(),
                    stack_width: w,
                    stack_height: h,
                    width: frame.width,
                    height: frame.height,
                });
            }
            Some(_) => {}
        }

        let mut bytes = Vec::with_capacity(frame.data.len() * 4);
        for v in &frame.data {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        self.file.write_all(&bytes).map_err(|e| StackError::Write {
            path: self.path.clone(),
            source: e,
        })?;
        self.frames += frame.depth;
        Ok(())
    }

    /// Number of frames written so far (committed plus pending).
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Flushes pixel data and commits the header.
    pub fn finish(mut self) -> Result<StackInfo, StackError> {
        let (width, height) = self.shape.unwrap_or((0, 0));
        let mut header = [0u8; HEADER_LEN as usize];
        header[..4].copy_from_slice(&MAGIC);
        header[4..8].copy_from_slice(&width.to_le_bytes());
        header[8..12].copy_from_slice(&height.to_le_bytes());
        header[12..16].copy_from_slice(&self.frames.to_le_bytes());

        let commit = |file: &mut BufWriter<File>| -> std::io::Result<()> {
            file.flush()?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(&header)?;
            file.flush()
        };
        commit(&mut self.file).map_err(|e| StackError::Write {
            path: self.path.clone(),
            source: e,
        })?;

        tracing::debug!(
            "stack_finish: '{}' {}x{}, {} frames",
            self.path.display(),
            width,
            height,
            self.frames
        );
        Ok(StackInfo {
            width,
            height,
            frames: self.frames,
        })
    }
}
