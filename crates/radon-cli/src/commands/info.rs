//! `radon info` - print stack metadata without reading pixel data.

use clap::Args;
use radon_io::{discover, stack_info};

/// Arguments for the info subcommand.
#[derive(Args)]
pub struct InfoArgs {
    /// Stack file, directory or glob pattern
    #[arg(value_name = "SOURCE")]
    source: String,
}

/// Prints header metadata for every matching stack.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let paths = discover(&args.source)?;
    let mut total_frames = 0usize;

    for path in &paths {
        let info = stack_info(path)?;
        let bytes = info.frame_bytes() * u64::from(info.frames);
        println!(
            "{}: {}x{}, {} frames, {:.1} MiB",
            path.display(),
            info.width,
            info.height,
            info.frames,
            bytes as f64 / (1024.0 * 1024.0)
        );
        total_frames += info.frames as usize;
    }

    if paths.len() > 1 {
        println!("{} stacks, {} frames total", paths.len(), total_frames);
    }
    Ok(())
}
