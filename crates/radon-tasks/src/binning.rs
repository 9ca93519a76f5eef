//! Block-mean downsampling.

use radon_core::{Frame, Ports, Task, TaskError};

/// Bins a frame by `factor`: every k×k block becomes its mean.
///
/// Output dimensions are the integer quotients; trailing rows/columns that
/// do not fill a whole block are dropped. A factor of 1 is a plain copy.
pub fn bin_frame(frame: &Frame, factor: u32) -> Frame {
    if factor <= 1 {
        return frame.clone();
    }
    let k = factor as usize;
    let in_w = frame.width as usize;
    let out_w = in_w / k;
    let out_h = frame.height as usize / k;
    let norm = 1.0 / (k * k) as f32;

    let mut data = Vec::with_capacity(out_w * out_h * frame.depth as usize);
    for z in 0..frame.depth {
        let layer = frame.layer(z);
        for by in 0..out_h {
            for bx in 0..out_w {
                let mut sum = 0.0;
                for dy in 0..k {
                    let row = (by * k + dy) * in_w + bx * k;
                    for dx in 0..k {
                        sum += layer[row + dx];
                    }
                }
                data.push(sum * norm);
            }
        }
    }
    Frame::with_depth(out_w as u32, out_h as u32, frame.depth, data)
}

/// Streaming k×k block-mean downsampler.
pub struct BinTask {
    factor: u32,
}

impl BinTask {
    /// Creates a binner. `factor` is validated at the configuration layer
    /// and must be ≥ 1.
    pub fn new(factor: u32) -> Self {
        Self { factor }
    }
}

impl Task for BinTask {
    fn name(&self) -> &'static str {
        "bin"
    }

    fn input_ports(&self) -> &'static [&'static str] {
        &["frames"]
    }

    fn output_ports(&self) -> &'static [&'static str] {
        &["frames"]
    }

    fn run(self: Box<Self>, ports: Ports) -> Result<(), TaskError> {
        while let Some(frame) = ports.input(0).recv() {
            ports.output(0).send(bin_frame(&frame, self.factor))?;
        }
        Ok(())
    }
}
