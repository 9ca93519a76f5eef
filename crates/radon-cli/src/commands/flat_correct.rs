//! `radon flat-correct` - run the flat-field correction pipeline.

use clap::Args;
use radon_pipeline::run_flat_correct;

use super::common::PipelineOpts;

/// Arguments for the flat-correct subcommand.
#[derive(Args)]
pub struct FlatCorrectArgs {
    #[command(flatten)]
    opts: PipelineOpts,
}

/// Runs the flat-field correction pipeline once.
pub fn run(args: FlatCorrectArgs) -> anyhow::Result<()> {
    let params = args.opts.resolve()?;
    run_flat_correct(&params)?;

    if let Some(output) = &params.output {
        println!("Wrote {}", output.display());
    }
    Ok(())
}
