//! Radon Tasks - the processing nodes the pipelines are assembled from.
//!
//! Every node kind of the preprocessing engine lives here as a concrete
//! [`Task`](radon_core::Task) implementation:
//!
//! - [`ReadTask`] / [`WriteTask`] - stack file I/O endpoints
//! - [`BinTask`] - k×k block-mean downsampling
//! - [`StackTask`] / [`FlattenTask`] / [`AverageTask`] - reference frame
//!   reduction (median via stack+flatten, mean via streaming average)
//! - [`InterpolateTask`] - dual-flat linear blending across the scan
//! - [`FlatFieldCorrectTask`] - the correction itself
//! - [`TransposeTask`] - projection stack → sinograms
//!
//! The numeric kernels are free functions (`bin_frame`, `median_flatten`,
//! `correct_frame`, ...) so they can be tested without channels; the task
//! types only add the streaming protocol on top.

mod binning;
mod correct;
mod descriptor;
mod interpolate;
mod read;
mod reduce;
mod transpose;
mod write;

pub use binning::{BinTask, bin_frame};
pub use correct::{
    DARK_PORT, FLAT_PORT, FlatFieldCorrectTask, PROJECTIONS_PORT, correct_frame,
};
pub use descriptor::{TaskDescriptor, task_descriptors};
pub use interpolate::{AFTER_PORT, BEFORE_PORT, InterpolateTask, lerp_frame};
pub use read::ReadTask;
pub use reduce::{AverageTask, FlattenTask, StackTask, median_flatten, stack_frames};
pub use transpose::{TransposeTask, transpose_projections};
pub use write::WriteTask;
