//! Reference frame reduction: stack + median flatten, and streaming mean.
//!
//! Reduction nodes are barriers — they consume their whole input before
//! producing anything, because a median needs every sample and a mean is
//! only final once the stream closes.

use radon_core::{Frame, Ports, Task, TaskError};

/// Concatenates equal-shaped single-layer frames into one volume.
pub fn stack_frames(frames: Vec<Frame>) -> Result<Frame, TaskError> {
    let mut iter = frames.into_iter();
    let first = iter.next().ok_or(TaskError::FrameUnderrun {
        expected: 1,
        got: 0,
    })?;

    let (width, height) = first.shape();
    let mut depth = first.depth;
    let mut data = first.data;
    for frame in iter {
        if frame.shape() != (width, height) {
            return Err(TaskError::ShapeMismatch {
                expected_width: width,
                expected_height: height,
                width: frame.width,
                height: frame.height,
            });
        }
        depth += frame.depth;
        data.extend_from_slice(&frame.data);
    }
    Ok(Frame::with_depth(width, height, depth, data))
}

/// Element-wise median across a volume's layers.
///
/// An even layer count takes the mean of the two middle samples.
pub fn median_flatten(volume: &Frame) -> Frame {
    let depth = volume.depth as usize;
    let len = volume.layer_len();
    let mut out = Vec::with_capacity(len);
    let mut samples = vec![0.0f32; depth];

    for i in 0..len {
        for (z, sample) in samples.iter_mut().enumerate() {
            *sample = volume.data[z * len + i];
        }
        samples.sort_by(f32::total_cmp);
        let median = if depth % 2 == 1 {
            samples[depth / 2]
        } else {
            (samples[depth / 2 - 1] + samples[depth / 2]) / 2.0
        };
        out.push(median);
    }
    Frame::from_data(volume.width, volume.height, out)
}

/// Collects exactly `count` frames into one stacked volume.
///
/// Closing the input early is a [`TaskError::FrameUnderrun`]; surplus
/// frames are drained and dropped so the upstream reader never blocks.
pub struct StackTask {
    count: usize,
}

impl StackTask {
    /// Creates a stacker for `count` frames (≥ 1, from the source's frame
    /// count).
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

impl Task for StackTask {
    fn name(&self) -> &'static str {
        "stack"
    }

    fn input_ports(&self) -> &'static [&'static str] {
        &["frames"]
    }

    fn output_ports(&self) -> &'static [&'static str] {
        &["volume"]
    }

    fn run(self: Box<Self>, ports: Ports) -> Result<(), TaskError> {
        let mut collected = Vec::with_capacity(self.count);
        while collected.len() < self.count {
            match ports.input(0).recv() {
                Some(frame) => collected.push(frame),
                None => {
                    return Err(TaskError::FrameUnderrun {
                        expected: self.count,
                        got: collected.len(),
                    });
                }
            }
        }
        ports.output(0).send(stack_frames(collected)?)?;
        while ports.input(0).recv().is_some() {}
        Ok(())
    }
}

/// Reduces each incoming volume to its element-wise median.
pub struct FlattenTask;

impl Task for FlattenTask {
    fn name(&self) -> &'static str {
        "flatten"
    }

    fn input_ports(&self) -> &'static [&'static str] {
        &["volume"]
    }

    fn output_ports(&self) -> &'static [&'static str] {
        &["frame"]
    }

    fn run(self: Box<Self>, ports: Ports) -> Result<(), TaskError> {
        while let Some(volume) = ports.input(0).recv() {
            ports.output(0).send(median_flatten(&volume))?;
        }
        Ok(())
    }
}

/// Streaming element-wise mean over all frames until the input closes.
pub struct AverageTask;

impl Task for AverageTask {
    fn name(&self) -> &'static str {
        "average"
    }

    fn input_ports(&self) -> &'static [&'static str] {
        &["frames"]
    }

    fn output_ports(&self) -> &'static [&'static str] {
        &["frame"]
    }

    fn run(self: Box<Self>, ports: Ports) -> Result<(), TaskError> {
        let mut acc: Option<Frame> = None;
        let mut count = 0usize;

        while let Some(frame) = ports.input(0).recv() {
            match &mut acc {
                None => acc = Some(frame),
                Some(sum) => {
                    if !sum.same_shape(&frame) {
                        return Err(TaskError::shape_mismatch(sum, &frame));
                    }
                    for (s, v) in sum.data.iter_mut().zip(&frame.data) {
                        *s += v;
                    }
                }
            }
            count += 1;
        }

        let mut mean = acc.ok_or(TaskError::FrameUnderrun {
            expected: 1,
            got: 0,
        })?;
        let norm = 1.0 / count as f32;
        for v in &mut mean.data {
            *v *= norm;
        }
        ports.output(0).send(mean)?;
        Ok(())
    }
}
