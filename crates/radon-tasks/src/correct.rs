//! Flat-field correction.

use radon_core::{Frame, Ports, Task, TaskError};

/// Input port carrying the projection stream.
pub const PROJECTIONS_PORT: usize = 0;
/// Input port carrying the reduced dark frame.
pub const DARK_PORT: usize = 1;
/// Input port carrying the reduced (or interpolated) flat frame(s).
pub const FLAT_PORT: usize = 2;

/// Corrects one projection against a dark and a flat reference.
///
/// Per pixel: `(P - D / dark_scale) / (F - D / dark_scale)`, then `-ln`
/// when `absorptivity` is set, then non-finite values are replaced with 0
/// when `fix_nan_and_inf` is set. With the fix enabled the output contains
/// no NaN or Inf even where the denominator is exactly zero.
pub fn correct_frame(
    projection: &Frame,
    dark: &Frame,
    flat: &Frame,
    dark_scale: f32,
    absorptivity: bool,
    fix_nan_and_inf: bool,
) -> Result<Frame, TaskError> {
    if !projection.same_shape(dark) {
        return Err(TaskError::shape_mismatch(projection, dark));
    }
    if !projection.same_shape(flat) {
        return Err(TaskError::shape_mismatch(projection, flat));
    }

    let inv_scale = 1.0 / dark_scale;
    let data = projection
        .data
        .iter()
        .zip(&dark.data)
        .zip(&flat.data)
        .map(|((&p, &d), &f)| {
            let dark = d * inv_scale;
            let mut value = (p - dark) / (f - dark);
            if absorptivity {
                value = -value.ln();
            }
            if fix_nan_and_inf && !value.is_finite() {
                value = 0.0;
            }
            value
        })
        .collect();

    Ok(Frame::from_data(projection.width, projection.height, data))
}

/// Streams projections through flat-field correction.
///
/// The dark input yields exactly one reduced frame. The flat input either
/// yields one reduced frame (reused for every projection) or one frame per
/// projection (dual-flat interpolation); the task keeps pairing incoming
/// projections with the freshest flat until the flat stream closes.
pub struct FlatFieldCorrectTask {
    dark_scale: f32,
    absorptivity: bool,
    fix_nan_and_inf: bool,
}

impl FlatFieldCorrectTask {
    /// Creates a correction task. `dark_scale` is validated at the
    /// configuration layer and must be positive.
    pub fn new(dark_scale: f32, absorptivity: bool, fix_nan_and_inf: bool) -> Self {
        Self {
            dark_scale,
            absorptivity,
            fix_nan_and_inf,
        }
    }
}

impl Task for FlatFieldCorrectTask {
    fn name(&self) -> &'static str {
        "flat-field-correct"
    }

    fn input_ports(&self) -> &'static [&'static str] {
        &["projections", "dark", "flat"]
    }

    fn output_ports(&self) -> &'static [&'static str] {
        &["corrected"]
    }

    fn run(self: Box<Self>, ports: Ports) -> Result<(), TaskError> {
        let dark = ports
            .input(DARK_PORT)
            .recv()
            .ok_or(TaskError::FrameUnderrun {
                expected: 1,
                got: 0,
            })?;
        let mut flat = ports
            .input(FLAT_PORT)
            .recv()
            .ok_or(TaskError::FrameUnderrun {
                expected: 1,
                got: 0,
            })?;

        let mut flats_open = true;
        let mut corrected = 0usize;
        while let Some(projection) = ports.input(PROJECTIONS_PORT).recv() {
            if corrected > 0 && flats_open {
                match ports.input(FLAT_PORT).recv() {
                    Some(next) => flat = next,
                    None => flats_open = false,
                }
            }
            let frame = correct_frame(
                &projection,
                &dark,
                &flat,
                self.dark_scale,
                self.absorptivity,
                self.fix_nan_and_inf,
            )?;
            ports.output(0).send(frame)?;
            corrected += 1;
        }

        tracing::debug!("flat-field-correct: {corrected} projections");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use radon_core::{InputPort, OutputPort};

    fn frame(values: &[f32]) -> Frame {
        Frame::from_data(values.len() as u32, 1, values.to_vec())
    }

    #[test]
    fn normalizes_against_references() {
        let out = correct_frame(
            &frame(&[60.0, 110.0]),
            &frame(&[10.0, 10.0]),
            &frame(&[110.0, 210.0]),
            1.0,
            false,
            false,
        )
        .unwrap();
        assert_eq!(out.data, vec![0.5, 0.5]);
    }

    #[test]
    fn dark_scale_divides_the_dark() {
        // dark/2 = 5: (25 - 5) / (45 - 5) = 0.5
        let out = correct_frame(
            &frame(&[25.0]),
            &frame(&[10.0]),
            &frame(&[45.0]),
            2.0,
            false,
            false,
        )
        .unwrap();
        assert_eq!(out.data, vec![0.5]);
    }

    #[test]
    fn absorptivity_takes_negative_log() {
        let out = correct_frame(
            &frame(&[1.0]),
            &frame(&[0.0]),
            &frame(&[f32::exp(2.0)]),
            1.0,
            true,
            false,
        )
        .unwrap();
        assert!((out.data[0] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn zero_denominator_is_sanitized() {
        // flat == dark/scale: denominator is exactly zero
        let out = correct_frame(
            &frame(&[5.0, 0.0]),
            &frame(&[10.0, 10.0]),
            &frame(&[10.0, 10.0]),
            1.0,
            false,
            true,
        )
        .unwrap();
        assert!(out.data.iter().all(|v| v.is_finite()));
        assert_eq!(out.data, vec![0.0, 0.0]);
    }

    #[test]
    fn without_fix_non_finite_values_pass_through() {
        let out = correct_frame(
            &frame(&[5.0]),
            &frame(&[10.0]),
            &frame(&[10.0]),
            1.0,
            false,
            false,
        )
        .unwrap();
        assert!(!out.data[0].is_finite());
    }

    #[test]
    fn reference_shape_mismatch_is_rejected() {
        let err = correct_frame(
            &Frame::new(2, 2),
            &Frame::new(3, 2),
            &Frame::new(2, 2),
            1.0,
            false,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, TaskError::ShapeMismatch { .. }));
    }

    fn run_correction(
        projections: Vec<Frame>,
        dark: Frame,
        flats: Vec<Frame>,
    ) -> Vec<Frame> {
        let (p_tx, p_rx) = unbounded();
        let (d_tx, d_rx) = unbounded();
        let (f_tx, f_rx) = unbounded();
        let (out_tx, out_rx) = unbounded();
        for p in projections {
            p_tx.send(p).unwrap();
        }
        d_tx.send(dark).unwrap();
        for f in flats {
            f_tx.send(f).unwrap();
        }
        drop((p_tx, d_tx, f_tx));

        let ports = Ports::new(
            vec![
                InputPort::new(p_rx),
                InputPort::new(d_rx),
                InputPort::new(f_rx),
            ],
            vec![OutputPort::new(vec![out_tx])],
        );
        Box::new(FlatFieldCorrectTask::new(1.0, false, false))
            .run(ports)
            .unwrap();
        out_rx.try_iter().collect()
    }

    #[test]
    fn single_flat_is_reused_for_every_projection() {
        let out = run_correction(
            vec![frame(&[2.0]), frame(&[4.0]), frame(&[8.0])],
            frame(&[0.0]),
            vec![frame(&[8.0])],
        );
        let values: Vec<f32> = out.iter().map(|f| f.data[0]).collect();
        assert_eq!(values, vec![0.25, 0.5, 1.0]);
    }

    #[test]
    fn per_projection_flats_are_consumed_in_step() {
        let out = run_correction(
            vec![frame(&[2.0]), frame(&[2.0])],
            frame(&[0.0]),
            vec![frame(&[2.0]), frame(&[8.0])],
        );
        let values: Vec<f32> = out.iter().map(|f| f.data[0]).collect();
        assert_eq!(values, vec![1.0, 0.25]);
    }
}
