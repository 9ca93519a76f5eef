//! Sinogram generation: transpose a projection stack into per-row
//! sinograms.

use radon_core::{Frame, Ports, Task, TaskError};

/// Reorganizes `n` projections of shape h×w into h sinograms of shape n×w.
///
/// Row `j` of sinogram `r` is row `r` of projection `j` — each output
/// frame collects one detector row across the whole angular sweep.
pub fn transpose_projections(projections: &[Frame]) -> Result<Vec<Frame>, TaskError> {
    let first = projections.first().ok_or(TaskError::FrameUnderrun {
        expected: 1,
        got: 0,
    })?;
    let (width, height) = first.shape();
    for frame in projections {
        if !first.same_shape(frame) {
            return Err(TaskError::shape_mismatch(first, frame));
        }
    }

    let w = width as usize;
    let n = projections.len();
    let mut sinograms = Vec::with_capacity(height as usize);
    for r in 0..height as usize {
        let mut data = Vec::with_capacity(n * w);
        for projection in projections {
            data.extend_from_slice(&projection.data[r * w..(r + 1) * w]);
        }
        sinograms.push(Frame::from_data(width, n as u32, data));
    }
    Ok(sinograms)
}

/// Collects the configured number of projections, then emits sinograms.
///
/// A barrier node: sinogram row `j` needs projection `j`'s pixels for every
/// row, so the full (ROI-limited) stack has to be materialized. Chunked
/// generation keeps that footprint bounded by splitting the ROI.
pub struct TransposeTask {
    count: usize,
}

impl TransposeTask {
    /// Creates a transpose for exactly `count` projections.
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

impl Task for TransposeTask {
    fn name(&self) -> &'static str {
        "transpose-projections"
    }

    fn input_ports(&self) -> &'static [&'static str] {
        &["projections"]
    }

    fn output_ports(&self) -> &'static [&'static str] {
        &["sinograms"]
    }

    fn run(self: Box<Self>, ports: Ports) -> Result<(), TaskError> {
        let mut projections = Vec::with_capacity(self.count);
        while projections.len() < self.count {
            match ports.input(0).recv() {
                Some(frame) => projections.push(frame),
                None => {
                    return Err(TaskError::FrameUnderrun {
                        expected: self.count,
                        got: projections.len(),
                    });
                }
            }
        }

        let sinograms = transpose_projections(&projections)?;
        drop(projections);
        for sinogram in sinograms {
            ports.output(0).send(sinogram)?;
        }
        while ports.input(0).recv().is_some() {}
        Ok(())
    }
}
