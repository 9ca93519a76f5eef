//! `radon generate` - synthesize a deterministic scan for demos and tests.
//!
//! The phantom is a soft disk whose shadow sweeps across the detector with
//! the projection index, giving sinograms with a recognizable sine trace.

use std::f32::consts::PI;
use std::path::{Path, PathBuf};

use clap::Args;
use radon_core::Frame;
use radon_io::StackWriter;

const DARK_LEVEL: f32 = 100.0;
const FLAT_LEVEL: f32 = 1000.0;

/// Arguments for the generate subcommand.
#[derive(Args)]
pub struct GenerateArgs {
    /// Output directory for the generated stacks
    #[arg(value_name = "DIR")]
    dir: PathBuf,

    /// Frame width in pixels
    #[arg(long, default_value = "64")]
    width: u32,

    /// Frame height in pixels
    #[arg(long, default_value = "64")]
    height: u32,

    /// Number of projection frames
    #[arg(long, default_value = "90")]
    projections: u32,

    /// Number of dark and flat reference frames
    #[arg(long, default_value = "10")]
    references: u32,

    /// Also generate an after-scan flat stack with illumination drift
    #[arg(long)]
    flats2: bool,
}

fn dark_frame(width: u32, height: u32, index: u32) -> Frame {
    let data = (0..width * height)
        .map(|p| {
            let x = p % width;
            let y = p / width;
            DARK_LEVEL + ((x + y + index) % 3) as f32 * 0.5
        })
        .collect();
    Frame::from_data(width, height, data)
}

fn flat_frame(width: u32, height: u32, gain: f32) -> Frame {
    let data = (0..width * height)
        .map(|p| {
            let x = (p % width) as f32 / width as f32;
            gain * FLAT_LEVEL * (0.9 + 0.2 * x)
        })
        .collect();
    Frame::from_data(width, height, data)
}

fn projection_frame(width: u32, height: u32, index: u32, count: u32) -> Frame {
    let angle = index as f32 / count as f32 * PI;
    // the disk's shadow center moves sinusoidally across the detector
    let center = 0.5 + 0.3 * angle.sin();
    let dark = dark_frame(width, height, 0);
    let flat = flat_frame(width, height, 1.0);

    let data = (0..width * height)
        .map(|p| {
            let x = (p % width) as f32 / width as f32;
            let distance = (x - center).abs();
            let transmission = 1.0 - 0.6 * (-distance * distance * 60.0).exp();
            let i = p as usize;
            dark.data[i] + (flat.data[i] - dark.data[i]) * transmission
        })
        .collect();
    Frame::from_data(width, height, data)
}

fn write_stack(
    path: &Path,
    frames: impl Iterator<Item = Frame>,
) -> anyhow::Result<()> {
    let mut writer = StackWriter::create(path)?;
    for frame in frames {
        writer.write_frame(&frame)?;
    }
    let info = writer.finish()?;
    println!(
        "  {}: {}x{}, {} frames",
        path.display(),
        info.width,
        info.height,
        info.frames
    );
    Ok(())
}

/// Generates darks, flats and projections into the target directory.
pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    std::fs::create_dir_all(&args.dir)?;
    println!("Generating synthetic scan in {}...", args.dir.display());

    let (w, h) = (args.width, args.height);
    write_stack(
        &args.dir.join("darks.rst"),
        (0..args.references).map(|i| dark_frame(w, h, i)),
    )?;
    write_stack(
        &args.dir.join("flats.rst"),
        (0..args.references).map(|_| flat_frame(w, h, 1.0)),
    )?;
    if args.flats2 {
        // after-scan flats carry a 10% illumination drift
        write_stack(
            &args.dir.join("flats2.rst"),
            (0..args.references).map(|_| flat_frame(w, h, 1.1)),
        )?;
    }
    write_stack(
        &args.dir.join("projections.rst"),
        (0..args.projections).map(|i| projection_frame(w, h, i, args.projections)),
    )?;

    println!("Done.");
    Ok(())
}
