//! Pipeline error type, aggregating the lower layers.

use radon_config::ConfigError;
use radon_core::{GraphError, RunError};
use radon_io::StackError;
use thiserror::Error;

/// Anything that can go wrong building or running a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration is incomplete or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Graph wiring failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A scheduler run failed.
    #[error(transparent)]
    Run(#[from] RunError),

    /// Source discovery or header probing failed.
    #[error(transparent)]
    Stack(#[from] StackError),
}
