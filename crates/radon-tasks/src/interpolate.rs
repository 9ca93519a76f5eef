//! Dual-flat interpolation: linear blend between the before- and
//! after-scan flat references across the acquisition index.

use radon_core::{Frame, Ports, Task, TaskError};

/// Input port carrying the reduced before-scan flat.
pub const BEFORE_PORT: usize = 0;
/// Input port carrying the reduced after-scan flat.
pub const AFTER_PORT: usize = 1;

/// Linear blend `before * (1 - t) + after * t`.
///
/// `t = 0` returns `before` exactly and `t = 1` returns `after` exactly —
/// the boundary frames of a dual-flat sequence are bit-faithful copies of
/// the reduced references.
pub fn lerp_frame(before: &Frame, after: &Frame, t: f32) -> Result<Frame, TaskError> {
    if !before.same_shape(after) {
        return Err(TaskError::shape_mismatch(before, after));
    }
    if t == 0.0 {
        return Ok(before.clone());
    }
    if t == 1.0 {
        return Ok(after.clone());
    }
    let data = before
        .data
        .iter()
        .zip(&after.data)
        .map(|(b, a)| b * (1.0 - t) + a * t)
        .collect();
    Ok(Frame::from_data(before.width, before.height, data))
}

/// Emits `count` per-projection flats interpolated between two inputs.
pub struct InterpolateTask {
    count: usize,
}

impl InterpolateTask {
    /// Creates an interpolator for `count` projections (the number actually
    /// selected by the frame slice).
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

impl Task for InterpolateTask {
    fn name(&self) -> &'static str {
        "interpolate"
    }

    fn input_ports(&self) -> &'static [&'static str] {
        &["before", "after"]
    }

    fn output_ports(&self) -> &'static [&'static str] {
        &["frames"]
    }

    fn run(self: Box<Self>, ports: Ports) -> Result<(), TaskError> {
        let before = ports
            .input(BEFORE_PORT)
            .recv()
            .ok_or(TaskError::FrameUnderrun {
                expected: 1,
                got: 0,
            })?;
        let after = ports
            .input(AFTER_PORT)
            .recv()
            .ok_or(TaskError::FrameUnderrun {
                expected: 1,
                got: 0,
            })?;

        for i in 0..self.count {
            let t = if self.count <= 1 {
                0.0
            } else {
                i as f32 / (self.count - 1) as f32
            };
            ports.output(0).send(lerp_frame(&before, &after, t)?)?;
        }
        Ok(())
    }
}
