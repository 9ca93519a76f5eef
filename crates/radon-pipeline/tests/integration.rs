//! End-to-end pipeline tests over synthetic stacks on disk.

use std::path::{Path, PathBuf};

use radon_config::{Params, ReductionMode};
use radon_core::Frame;
use radon_io::{StackReader, StackWriter, stack_info};
use radon_pipeline::{PipelineError, run_flat_correct, run_sinogram_generation};
use tempfile::{TempDir, tempdir};

fn write_stack(path: &Path, frames: &[Frame]) {
    let mut writer = StackWriter::create(path).unwrap();
    for frame in frames {
        writer.write_frame(frame).unwrap();
    }
    writer.finish().unwrap();
}

fn constant(width: u32, height: u32, value: f32) -> Frame {
    Frame::from_data(width, height, vec![value; (width * height) as usize])
}

fn read_all(path: &Path) -> Vec<Frame> {
    let mut reader = StackReader::open(path).unwrap();
    let frames = reader.info().frames;
    (0..frames).map(|i| reader.read_frame(i).unwrap()).collect()
}

/// A scan directory with constant darks/flats and projections whose
/// corrected value is exactly `attenuations[i]` everywhere.
struct Scan {
    dir: TempDir,
    params: Params,
}

fn synthetic_scan(width: u32, height: u32, attenuations: &[f32]) -> Scan {
    const DARK: f32 = 2.0;
    const FLAT: f32 = 10.0;

    let dir = tempdir().unwrap();
    write_stack(
        &dir.path().join("darks.rst"),
        &[constant(width, height, DARK), constant(width, height, DARK)],
    );
    write_stack(
        &dir.path().join("flats.rst"),
        &[constant(width, height, FLAT), constant(width, height, FLAT)],
    );
    let projections: Vec<Frame> = attenuations
        .iter()
        .map(|a| constant(width, height, DARK + (FLAT - DARK) * a))
        .collect();
    write_stack(&dir.path().join("projections.rst"), &projections);

    let source = |name: &str| Some(dir.path().join(name).to_str().unwrap().to_string());
    let params = Params {
        projections: source("projections.rst"),
        darks: source("darks.rst"),
        flats: source("flats.rst"),
        output: Some(dir.path().join("out.rst")),
        ..Params::default()
    };
    Scan { dir, params }
}

fn assert_constant_frames(frames: &[Frame], expected: &[f32]) {
    assert_eq!(frames.len(), expected.len());
    for (frame, &value) in frames.iter().zip(expected) {
        for &pixel in &frame.data {
            assert!(
                (pixel - value).abs() < 1e-5,
                "expected {value}, got {pixel}"
            );
        }
    }
}

#[test]
fn flat_correct_normalizes_projections() {
    let scan = synthetic_scan(4, 4, &[0.25, 0.5, 0.75]);
    run_flat_correct(&scan.params).unwrap();

    let out = read_all(&scan.dir.path().join("out.rst"));
    assert!(out.iter().all(|f| f.shape() == (4, 4)));
    assert_constant_frames(&out, &[0.25, 0.5, 0.75]);
}

#[test]
fn median_and_average_agree_on_identical_references() {
    let scan = synthetic_scan(4, 4, &[0.5]);

    let mut median = scan.params.clone();
    median.reduction_mode = ReductionMode::Median;
    median.output = Some(scan.dir.path().join("median.rst"));
    run_flat_correct(&median).unwrap();

    let mut average = scan.params.clone();
    average.reduction_mode = ReductionMode::Average;
    average.output = Some(scan.dir.path().join("average.rst"));
    run_flat_correct(&average).unwrap();

    assert_eq!(
        read_all(&scan.dir.path().join("median.rst")),
        read_all(&scan.dir.path().join("average.rst"))
    );
}

#[test]
fn dual_flat_interpolates_across_the_scan() {
    const DARK: f32 = 2.0;
    let dir = tempdir().unwrap();
    write_stack(&dir.path().join("darks.rst"), &[constant(2, 2, DARK)]);
    write_stack(&dir.path().join("flats.rst"), &[constant(2, 2, 10.0)]);
    write_stack(&dir.path().join("flats2.rst"), &[constant(2, 2, 18.0)]);

    // Effective flats should be 10, 14, 18; build projections so every
    // corrected value is exactly 0.5 only when interpolation happens.
    let projections: Vec<Frame> = [10.0, 14.0, 18.0]
        .iter()
        .map(|flat| constant(2, 2, DARK + (flat - DARK) * 0.5))
        .collect();
    write_stack(&dir.path().join("projections.rst"), &projections);

    let source = |name: &str| Some(dir.path().join(name).to_str().unwrap().to_string());
    let params = Params {
        projections: source("projections.rst"),
        darks: source("darks.rst"),
        flats: source("flats.rst"),
        flats2: source("flats2.rst"),
        output: Some(dir.path().join("out.rst")),
        ..Params::default()
    };
    run_flat_correct(&params).unwrap();

    let out = read_all(&dir.path().join("out.rst"));
    assert_constant_frames(&out, &[0.5, 0.5, 0.5]);
}

#[test]
fn resize_bins_everything_before_correction() {
    let scan = synthetic_scan(4, 4, &[0.5]);
    let mut params = scan.params.clone();
    params.resize = 2;
    run_flat_correct(&params).unwrap();

    let out = read_all(&scan.dir.path().join("out.rst"));
    assert_eq!(out.len(), 1);
    // both projection and reference dims divided by the factor
    assert_eq!(out[0].shape(), (2, 2));
    assert_constant_frames(&out, &[0.5]);
}

#[test]
fn fix_nan_and_inf_sanitizes_zero_denominators() {
    let dir = tempdir().unwrap();
    // flats equal darks: denominator is exactly zero everywhere
    write_stack(&dir.path().join("darks.rst"), &[constant(2, 2, 5.0)]);
    write_stack(&dir.path().join("flats.rst"), &[constant(2, 2, 5.0)]);
    write_stack(&dir.path().join("projections.rst"), &[constant(2, 2, 7.0)]);

    let source = |name: &str| Some(dir.path().join(name).to_str().unwrap().to_string());
    let params = Params {
        projections: source("projections.rst"),
        darks: source("darks.rst"),
        flats: source("flats.rst"),
        output: Some(dir.path().join("out.rst")),
        fix_nan_and_inf: true,
        ..Params::default()
    };
    run_flat_correct(&params).unwrap();

    let out = read_all(&dir.path().join("out.rst"));
    assert!(out[0].data.iter().all(|v| v.is_finite()));
}

#[test]
fn missing_reference_fails_before_any_output() {
    let scan = synthetic_scan(2, 2, &[0.5]);
    let mut params = scan.params.clone();
    params.darks = None;

    match run_flat_correct(&params) {
        Err(PipelineError::Config(err)) => {
            assert!(err.to_string().contains("darks"));
        }
        other => panic!("expected MissingInput, got {other:?}"),
    }
    assert!(!scan.dir.path().join("out.rst").exists());
}

#[test]
fn frame_slice_limits_the_corrected_stack() {
    let scan = synthetic_scan(2, 2, &[0.1, 0.2, 0.3, 0.4, 0.5]);
    let mut params = scan.params.clone();
    params.start = 1;
    params.step = 2;
    params.number = Some(2);
    run_flat_correct(&params).unwrap();

    let out = read_all(&scan.dir.path().join("out.rst"));
    assert_constant_frames(&out, &[0.2, 0.4]);
}

fn sinogram_params(dir: &Path, output: PathBuf) -> Params {
    Params {
        projections: Some(dir.join("projections.rst").to_str().unwrap().to_string()),
        output: Some(output),
        ..Params::default()
    }
}

#[test]
fn sinogram_transposes_bare_projections() {
    let dir = tempdir().unwrap();
    // two projections, 3 wide x 2 high
    write_stack(
        &dir.path().join("projections.rst"),
        &[
            Frame::from_data(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            Frame::from_data(3, 2, vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0]),
        ],
    );

    let params = sinogram_params(dir.path(), dir.path().join("sino.rst"));
    run_sinogram_generation(&params).unwrap();

    let out = read_all(&dir.path().join("sino.rst"));
    assert_eq!(out.len(), 2); // one sinogram per detector row
    assert_eq!(out[0].shape(), (3, 2)); // width x num_projections
    assert_eq!(out[0].data, vec![1.0, 2.0, 3.0, 7.0, 8.0, 9.0]);
    assert_eq!(out[1].data, vec![4.0, 5.0, 6.0, 10.0, 11.0, 12.0]);
}

#[test]
fn chunked_generation_matches_a_single_run() {
    let dir = tempdir().unwrap();
    let projections: Vec<Frame> = (0..3)
        .map(|i| {
            let data = (0..4 * 6).map(|p| (i * 100 + p) as f32).collect();
            Frame::from_data(4, 6, data)
        })
        .collect();
    write_stack(&dir.path().join("projections.rst"), &projections);

    let single = sinogram_params(dir.path(), dir.path().join("single.rst"));
    run_sinogram_generation(&single).unwrap();

    let mut chunked = sinogram_params(dir.path(), dir.path().join("chunked.rst"));
    chunked.pass_size = Some(2);
    run_sinogram_generation(&chunked).unwrap();

    assert_eq!(
        read_all(&dir.path().join("single.rst")),
        read_all(&dir.path().join("chunked.rst"))
    );
    // 6 detector rows in chunks of 2 → same 6 sinograms either way
    assert_eq!(stack_info(&dir.path().join("chunked.rst")).unwrap().frames, 6);
}

#[test]
fn sinogram_with_correction_uses_corrected_values() {
    let scan = synthetic_scan(3, 2, &[0.25, 0.75]);
    let mut params = scan.params.clone();
    params.output = Some(scan.dir.path().join("sino.rst"));
    run_sinogram_generation(&params).unwrap();

    let out = read_all(&scan.dir.path().join("sino.rst"));
    assert_eq!(out.len(), 2);
    for sinogram in &out {
        assert_eq!(sinogram.shape(), (3, 2));
        // row j of every sinogram holds projection j's corrected value
        assert!(sinogram.data[..3].iter().all(|v| (v - 0.25).abs() < 1e-5));
        assert!(sinogram.data[3..].iter().all(|v| (v - 0.75).abs() < 1e-5));
    }
}

#[test]
fn sinogram_roi_limits_the_rows() {
    let dir = tempdir().unwrap();
    write_stack(
        &dir.path().join("projections.rst"),
        &[Frame::from_data(2, 4, (0..8).map(|v| v as f32).collect())],
    );

    let mut params = sinogram_params(dir.path(), dir.path().join("sino.rst"));
    params.y = 1;
    params.height = Some(2);
    run_sinogram_generation(&params).unwrap();

    let out = read_all(&dir.path().join("sino.rst"));
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].data, vec![2.0, 3.0]); // frame row 1
    assert_eq!(out[1].data, vec![4.0, 5.0]); // frame row 2
}

#[test]
fn sinogram_without_projections_is_missing_input() {
    let dir = tempdir().unwrap();
    let params = Params {
        output: Some(dir.path().join("sino.rst")),
        ..Params::default()
    };
    assert!(matches!(
        run_sinogram_generation(&params),
        Err(PipelineError::Config(_))
    ));
    assert!(!dir.path().join("sino.rst").exists());
}
