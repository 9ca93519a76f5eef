//! Radon Pipeline - translates a [`Params`](radon_config::Params)
//! configuration into concrete task graphs and runs them.
//!
//! Two pipelines are provided:
//!
//! - **Flat-field correction** ([`run_flat_correct`]): readers for
//!   projections, darks and flats (plus an optional second flat source),
//!   optional binning, a reduction stage per reference source, optional
//!   dual-flat interpolation, the correction node, and a writer.
//! - **Sinogram generation** ([`run_sinogram_generation`]): the correction
//!   sub-pipeline (or a bare projection reader when no references are
//!   configured) feeding a transpose node and a writer. When a pass size is
//!   configured the vertical ROI is partitioned and one fresh graph is
//!   built and run per interval, appending to a single output stack.
//!
//! Both builders are fail-fast: configuration problems surface before any
//! node is created, any thread spawned or any file touched.

mod error;
mod flat_correct;
mod sinogram;

pub use error::PipelineError;
pub use flat_correct::{attach_flat_correct, run_flat_correct};
pub use sinogram::{
    attach_sinogram, resolved_height, run_sinogram_chunk, run_sinogram_generation,
    sinogram_chunks,
};
