//! The pipeline parameter set and its validation.

use std::path::PathBuf;
use std::str::FromStr;

use radon_core::Roi;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Statistic used to combine reference frames into a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReductionMode {
    /// Stack all frames, then take the element-wise median.
    Median,
    /// Streaming element-wise mean; needs no up-front frame count.
    #[default]
    Average,
}

impl FromStr for ReductionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "median" => Ok(ReductionMode::Median),
            "average" => Ok(ReductionMode::Average),
            _ => Err(ConfigError::invalid(
                "reduction_mode",
                "invalid reduction mode",
            )),
        }
    }
}

impl core::fmt::Display for ReductionMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReductionMode::Median => write!(f, "median"),
            ReductionMode::Average => write!(f, "average"),
        }
    }
}

/// Build-time parameters for the preprocessing pipelines.
///
/// Immutable once a graph has been built from it; the chunked sinogram
/// runner derives a fresh per-chunk copy with an adjusted ROI instead of
/// mutating a shared instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Params {
    /// Projection source: path, directory or glob pattern.
    pub projections: Option<String>,
    /// Dark reference source.
    pub darks: Option<String>,
    /// Flat reference source (taken before the scan).
    pub flats: Option<String>,
    /// Second flat reference source (taken after the scan); enables
    /// dual-flat interpolation.
    pub flats2: Option<String>,
    /// Output stack path.
    pub output: Option<PathBuf>,

    /// Divisor applied to dark values before subtraction.
    pub dark_scale: f32,
    /// Apply the negative-log transform after normalization.
    pub absorptivity: bool,
    /// Replace non-finite correction results with 0.
    pub fix_nan_and_inf: bool,
    /// Reference frame reduction statistic.
    pub reduction_mode: ReductionMode,
    /// Downsampling factor applied after every reader (1 = no-op).
    pub resize: u32,

    /// First ROI row.
    pub y: u32,
    /// ROI height in rows; `None` = down to the frame bottom.
    pub height: Option<u32>,
    /// ROI row stride.
    pub y_step: u32,

    /// First projection frame index.
    pub start: usize,
    /// Projection frame stride.
    pub step: usize,
    /// Number of projection frames to process; `None` = all remaining.
    pub number: Option<usize>,

    /// Sinogram rows per chunked run; `None` = single run.
    pub pass_size: Option<usize>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            projections: None,
            darks: None,
            flats: None,
            flats2: None,
            output: None,
            dark_scale: 1.0,
            absorptivity: false,
            fix_nan_and_inf: false,
            reduction_mode: ReductionMode::default(),
            resize: 1,
            y: 0,
            height: None,
            y_step: 1,
            start: 0,
            step: 1,
            number: None,
            pass_size: None,
        }
    }
}

impl Params {
    /// Validates every option value, fail-fast.
    ///
    /// Path presence is not checked here — which paths are required depends
    /// on the pipeline being built, so the builders raise `MissingInput`
    /// themselves.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resize < 1 {
            return Err(ConfigError::invalid("resize", "must be at least 1"));
        }
        if !self.dark_scale.is_finite() || self.dark_scale <= 0.0 {
            return Err(ConfigError::invalid(
                "dark_scale",
                format!("must be a positive number, got {}", self.dark_scale),
            ));
        }
        if self.y_step < 1 {
            return Err(ConfigError::invalid("y_step", "must be at least 1"));
        }
        if self.step < 1 {
            return Err(ConfigError::invalid("step", "must be at least 1"));
        }
        if self.number == Some(0) {
            return Err(ConfigError::invalid("number", "must be at least 1"));
        }
        if self.pass_size == Some(0) {
            return Err(ConfigError::invalid("pass_size", "must be at least 1"));
        }
        if self.height == Some(0) {
            return Err(ConfigError::invalid("height", "must be at least 1"));
        }
        Ok(())
    }

    /// The region of interest shared by the projection and reference
    /// readers.
    pub fn roi(&self) -> Roi {
        Roi {
            y: self.y,
            height: self.height,
            y_step: self.y_step,
        }
    }

    /// Number of projection frames the `(start, step, number)` slice
    /// selects out of `total` available frames.
    pub fn selected_frames(&self, total: usize) -> usize {
        if self.start >= total {
            return 0;
        }
        let available = (total - self.start).div_ceil(self.step);
        available.min(self.number.unwrap_or(total))
    }
}
