//! Configuration for the radon preprocessing pipelines.
//!
//! [`Params`] carries the entire recognized option surface — source paths,
//! region of interest, frame slicing, reduction mode, resize factor,
//! dual-flat handling, chunking — and validates it fail-fast, before any
//! graph is built or file touched. Parameters can also be loaded from a
//! TOML recipe file; unrecognized recipe keys are rejected.
//!
//! # Example
//!
//! ```rust
//! use radon_config::{Params, ReductionMode};
//!
//! let params = Params {
//!     projections: Some("scan/proj_*.rst".into()),
//!     darks: Some("scan/darks.rst".into()),
//!     flats: Some("scan/flats.rst".into()),
//!     reduction_mode: ReductionMode::Median,
//!     ..Params::default()
//! };
//! params.validate().unwrap();
//! ```

mod error;
mod params;
mod recipe;

pub use error::ConfigError;
pub use params::{Params, ReductionMode};
pub use recipe::load_recipe;
