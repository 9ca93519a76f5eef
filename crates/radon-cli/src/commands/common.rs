//! Options shared by the pipeline subcommands.

use std::path::PathBuf;

use clap::Args;
use radon_config::{ConfigError, Params, ReductionMode, load_recipe};

/// Pipeline configuration flags.
///
/// Every flag is optional; values start from a recipe file when `--recipe`
/// is given (defaults otherwise) and explicitly set flags override it.
#[derive(Args)]
pub struct PipelineOpts {
    /// TOML recipe providing values for any flag not set explicitly
    #[arg(long, value_name = "FILE")]
    recipe: Option<PathBuf>,

    /// Projection source: stack file, directory or glob pattern
    #[arg(long)]
    projections: Option<String>,

    /// Dark reference source
    #[arg(long)]
    darks: Option<String>,

    /// Flat reference source (taken before the scan)
    #[arg(long)]
    flats: Option<String>,

    /// Second flat reference source (taken after the scan)
    #[arg(long)]
    flats2: Option<String>,

    /// Output stack path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Divisor applied to dark values before subtraction
    #[arg(long)]
    dark_scale: Option<f32>,

    /// Apply the negative-log transform after normalization
    #[arg(long)]
    absorptivity: bool,

    /// Replace NaN/Inf correction results with 0
    #[arg(long)]
    fix_nan_and_inf: bool,

    /// Reference reduction statistic (median or average)
    #[arg(long)]
    reduction_mode: Option<ReductionMode>,

    /// Downsampling factor applied after every reader (1 = off)
    #[arg(long)]
    resize: Option<u32>,

    /// First region-of-interest row
    #[arg(long)]
    y: Option<u32>,

    /// Region-of-interest height in rows (defaults to the frame bottom)
    #[arg(long)]
    height: Option<u32>,

    /// Region-of-interest row stride
    #[arg(long)]
    y_step: Option<u32>,

    /// First projection frame index
    #[arg(long)]
    start: Option<usize>,

    /// Projection frame stride
    #[arg(long)]
    step: Option<usize>,

    /// Number of projection frames to process (defaults to all remaining)
    #[arg(long)]
    number: Option<usize>,
}

impl PipelineOpts {
    /// Merges recipe values and explicit flags into a validated `Params`.
    pub fn resolve(self) -> Result<Params, ConfigError> {
        let mut params = match &self.recipe {
            Some(path) => load_recipe(path)?,
            None => Params::default(),
        };

        if self.projections.is_some() {
            params.projections = self.projections;
        }
        if self.darks.is_some() {
            params.darks = self.darks;
        }
        if self.flats.is_some() {
            params.flats = self.flats;
        }
        if self.flats2.is_some() {
            params.flats2 = self.flats2;
        }
        if self.output.is_some() {
            params.output = self.output;
        }
        if let Some(dark_scale) = self.dark_scale {
            params.dark_scale = dark_scale;
        }
        if self.absorptivity {
            params.absorptivity = true;
        }
        if self.fix_nan_and_inf {
            params.fix_nan_and_inf = true;
        }
        if let Some(mode) = self.reduction_mode {
            params.reduction_mode = mode;
        }
        if let Some(resize) = self.resize {
            params.resize = resize;
        }
        if let Some(y) = self.y {
            params.y = y;
        }
        if self.height.is_some() {
            params.height = self.height;
        }
        if let Some(y_step) = self.y_step {
            params.y_step = y_step;
        }
        if let Some(start) = self.start {
            params.start = start;
        }
        if let Some(step) = self.step {
            params.step = step;
        }
        if self.number.is_some() {
            params.number = self.number;
        }

        params.validate()?;
        Ok(params)
    }
}
