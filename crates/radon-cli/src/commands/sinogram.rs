//! `radon sinogram` - generate sinograms, optionally in chunked runs.

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use radon_pipeline::{resolved_height, run_sinogram_chunk, sinogram_chunks};

use super::common::PipelineOpts;

/// Arguments for the sinogram subcommand.
#[derive(Args)]
pub struct SinogramArgs {
    #[command(flatten)]
    opts: PipelineOpts,

    /// Sinogram rows per run; bounds memory by splitting the ROI into
    /// several graph runs that append to one output
    #[arg(long)]
    pass_size: Option<usize>,
}

/// Runs sinogram generation chunk by chunk with a progress bar.
pub fn run(args: SinogramArgs) -> anyhow::Result<()> {
    let mut params = args.opts.resolve()?;
    if args.pass_size.is_some() {
        params.pass_size = args.pass_size;
    }
    params.validate()?;

    let height = resolved_height(&params)?;
    let chunks = sinogram_chunks(params.y, height, params.y_step, params.pass_size);
    println!(
        "Generating sinograms for rows {}..{} in {} run(s)...",
        params.y,
        params.y + height,
        chunks.len()
    );

    let progress = ProgressBar::new(chunks.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("##-"),
    );

    for (i, chunk) in chunks.iter().enumerate() {
        run_sinogram_chunk(&params, *chunk, i != 0)?;
        progress.inc(1);
    }
    progress.finish_with_message("done");

    if let Some(output) = &params.output {
        println!("Wrote {}", output.display());
    }
    Ok(())
}
