//! Sinogram generation pipeline and the chunked runner.

use radon_config::{ConfigError, Params};
use radon_core::{NodeId, Scheduler, TaskGraph};
use radon_io::{frame_count, probe_shape};
use radon_tasks::{ReadTask, TransposeTask, WriteTask};

use crate::error::PipelineError;
use crate::flat_correct::{attach_flat_correct, require};

/// Builds the sinogram sub-pipeline into `graph` and returns the transpose
/// node.
///
/// When both darks and flats are configured the projections pass through
/// flat-field correction first; otherwise a bare projection reader feeds
/// the transpose directly. The transpose is configured with the exact
/// number of projections the frame slice selects.
pub fn attach_sinogram(graph: &mut TaskGraph, params: &Params) -> Result<NodeId, PipelineError> {
    params.validate()?;
    let projections = require(&params.projections, "projections")?;
    let count = params.selected_frames(frame_count(projections)?);

    let source = if params.darks.is_some() && params.flats.is_some() {
        attach_flat_correct(graph, params)?
    } else {
        graph.add_task(Box::new(ReadTask::new(projections, params.roi()).with_slice(
            params.start,
            params.step,
            params.number,
        )))
    };

    let transpose = graph.add_task(Box::new(TransposeTask::new(count)));
    graph.connect_default(source, transpose)?;
    Ok(transpose)
}

/// Consecutive, non-overlapping `(y, height)` intervals covering
/// `[y, y + height)`.
///
/// The interval length is `y_step * pass_size` rows (the whole height when
/// no pass size is given); the last interval may be shorter. For
/// `height = 100, y = 0, y_step = 1, pass_size = 30` the boundaries are
/// `[0, 30, 60, 90, 100]` — four runs of 30/30/30/10 rows.
pub fn sinogram_chunks(
    y: u32,
    height: u32,
    y_step: u32,
    pass_size: Option<usize>,
) -> Vec<(u32, u32)> {
    let step = match pass_size {
        Some(pass) => y_step.max(1).saturating_mul(pass as u32),
        None => height,
    }
    .max(1);

    let mut chunks = Vec::new();
    let mut start = y;
    let end = y + height;
    while start < end {
        let chunk = step.min(end - start);
        chunks.push((start, chunk));
        start += chunk;
    }
    chunks
}

/// The effective ROI height: configured, or probed from the projections.
pub fn resolved_height(params: &Params) -> Result<u32, PipelineError> {
    if let Some(height) = params.height {
        return Ok(height);
    }
    let projections = require(&params.projections, "projections")?;
    let (_, frame_height) = probe_shape(projections)?;
    let height = frame_height.saturating_sub(params.y);
    if height == 0 {
        return Err(ConfigError::invalid(
            "y",
            format!("row {} is at or beyond the frame height {frame_height}", params.y),
        )
        .into());
    }
    Ok(height)
}

/// Builds and runs one sinogram graph for a single `(y, height)` interval.
///
/// Every call constructs a fresh graph and scheduler — no state carries
/// over between chunks except the output file's append cursor.
pub fn run_sinogram_chunk(
    params: &Params,
    chunk: (u32, u32),
    append: bool,
) -> Result<(), PipelineError> {
    let output = params
        .output
        .clone()
        .ok_or(ConfigError::MissingInput { option: "output" })?;

    let mut chunk_params = params.clone();
    chunk_params.y = chunk.0;
    chunk_params.height = Some(chunk.1);

    let mut graph = TaskGraph::new();
    let sinograms = attach_sinogram(&mut graph, &chunk_params)?;
    let writer = graph.add_task(Box::new(WriteTask::new(output, append)));
    graph.connect_default(sinograms, writer)?;

    tracing::debug!(
        "sinogram: rows {}..{} ({} nodes, append={append})",
        chunk.0,
        chunk.0 + chunk.1,
        graph.node_count()
    );
    Scheduler::new().run(graph)?;
    Ok(())
}

/// Generates sinograms for the whole configured ROI, chunk by chunk.
///
/// Each chunk run completes (including its file write) before the next
/// graph is built; only the first run truncates the output. A failed chunk
/// aborts the sequence and leaves the chunks already committed in place —
/// the output is always a valid stack.
pub fn run_sinogram_generation(params: &Params) -> Result<(), PipelineError> {
    params.validate()?;
    require(&params.projections, "projections")?;
    if params.output.is_none() {
        return Err(ConfigError::MissingInput { option: "output" }.into());
    }

    let height = resolved_height(params)?;
    let chunks = sinogram_chunks(params.y, height, params.y_step, params.pass_size);
    tracing::info!(
        "sinogram: {} run(s) over rows {}..{}",
        chunks.len(),
        params.y,
        params.y + height
    );
    for (i, chunk) in chunks.iter().enumerate() {
        run_sinogram_chunk(params, *chunk, i != 0)?;
    }
    Ok(())
}
