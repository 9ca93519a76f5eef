//! Flat-field correction pipeline builder.

use radon_config::{ConfigError, Params, ReductionMode};
use radon_core::{NodeId, Scheduler, TaskGraph};
use radon_io::frame_count;
use radon_tasks::{
    AFTER_PORT, AverageTask, BEFORE_PORT, BinTask, DARK_PORT, FLAT_PORT, FlatFieldCorrectTask,
    FlattenTask, InterpolateTask, PROJECTIONS_PORT, ReadTask, StackTask, WriteTask,
};

use crate::error::PipelineError;

pub(crate) fn require<'a>(
    value: &'a Option<String>,
    option: &'static str,
) -> Result<&'a str, ConfigError> {
    value.as_deref().ok_or(ConfigError::MissingInput { option })
}

/// Appends the reduction sub-chain for one reference source and returns
/// the node producing the single reduced frame.
///
/// Median mode needs the source's frame count up front (stack + flatten);
/// average mode reduces as a stream.
fn attach_reduction(
    graph: &mut TaskGraph,
    source: NodeId,
    mode: ReductionMode,
    pattern: &str,
) -> Result<NodeId, PipelineError> {
    match mode {
        ReductionMode::Median => {
            let count = frame_count(pattern)?;
            let stack = graph.add_task(Box::new(StackTask::new(count)));
            let flatten = graph.add_task(Box::new(FlattenTask));
            graph.connect_default(source, stack)?;
            graph.connect_default(stack, flatten)?;
            Ok(flatten)
        }
        ReductionMode::Average => {
            let average = graph.add_task(Box::new(AverageTask));
            graph.connect_default(source, average)?;
            Ok(average)
        }
    }
}

/// Builds the flat-field correction sub-pipeline into `graph`.
///
/// Requires projections, darks and flats to be configured; fails with
/// `MissingInput` before creating any node otherwise. Returns the
/// correction node for further composition (the sinogram pipeline hangs a
/// transpose off it).
///
/// The reference readers share the projections' ROI but not its frame
/// slice — references must stay row-aligned with the projections, while
/// frame selection only applies to the projection sequence.
pub fn attach_flat_correct(
    graph: &mut TaskGraph,
    params: &Params,
) -> Result<NodeId, PipelineError> {
    params.validate()?;
    let projections = require(&params.projections, "projections")?;
    let darks = require(&params.darks, "darks")?;
    let flats = require(&params.flats, "flats")?;

    let roi = params.roi();
    let mut proj = graph.add_task(Box::new(
        ReadTask::new(projections, roi.clone()).with_slice(
            params.start,
            params.step,
            params.number,
        ),
    ));
    let mut dark = graph.add_task(Box::new(ReadTask::new(darks, roi.clone())));
    let mut flat_before = graph.add_task(Box::new(ReadTask::new(flats, roi.clone())));
    let mut flat_after = match params.flats2.as_deref() {
        Some(pattern) => Some(graph.add_task(Box::new(ReadTask::new(pattern, roi)))),
        None => None,
    };

    if params.resize > 1 {
        tracing::debug!("flat-correct: binning every input by {}", params.resize);
        let readers = [&mut proj, &mut dark, &mut flat_before]
            .into_iter()
            .chain(flat_after.as_mut());
        for reader in readers {
            let bin = graph.add_task(Box::new(BinTask::new(params.resize)));
            graph.connect_default(*reader, bin)?;
            *reader = bin;
        }
    }

    tracing::debug!(
        "flat-correct: reducing references with mode '{}'",
        params.reduction_mode
    );
    let dark_reduced = attach_reduction(graph, dark, params.reduction_mode, darks)?;
    let flat_before_reduced =
        attach_reduction(graph, flat_before, params.reduction_mode, flats)?;

    let ffc = graph.add_task(Box::new(FlatFieldCorrectTask::new(
        params.dark_scale,
        params.absorptivity,
        params.fix_nan_and_inf,
    )));
    graph.connect(proj, 0, ffc, PROJECTIONS_PORT)?;
    graph.connect(dark_reduced, 0, ffc, DARK_PORT)?;

    if let (Some(flat_after), Some(flats2)) = (flat_after, params.flats2.as_deref()) {
        // One interpolated flat per projection actually selected.
        let count = params.selected_frames(frame_count(projections)?);
        let flat_after_reduced =
            attach_reduction(graph, flat_after, params.reduction_mode, flats2)?;
        let interpolate = graph.add_task(Box::new(InterpolateTask::new(count)));
        graph.connect(flat_before_reduced, 0, interpolate, BEFORE_PORT)?;
        graph.connect(flat_after_reduced, 0, interpolate, AFTER_PORT)?;
        graph.connect(interpolate, 0, ffc, FLAT_PORT)?;
    } else {
        graph.connect(flat_before_reduced, 0, ffc, FLAT_PORT)?;
    }

    Ok(ffc)
}

/// Builds and runs the complete flat-field correction pipeline:
/// sub-pipeline → write node → one scheduler run.
pub fn run_flat_correct(params: &Params) -> Result<(), PipelineError> {
    let output = params
        .output
        .clone()
        .ok_or(ConfigError::MissingInput { option: "output" })?;

    let mut graph = TaskGraph::new();
    let ffc = attach_flat_correct(&mut graph, params)?;
    let writer = graph.add_task(Box::new(WriteTask::new(output, false)));
    graph.connect_default(ffc, writer)?;

    tracing::info!(
        "flat-correct: running {} nodes / {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Scheduler::new().run(graph)?;
    Ok(())
}
