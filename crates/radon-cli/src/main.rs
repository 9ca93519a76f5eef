//! Radon CLI - command-line interface for the tomographic preprocessing
//! pipelines.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "radon")]
#[command(version, about = "Tomographic preprocessing pipelines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flat-field correct projections against dark and flat references
    FlatCorrect(commands::flat_correct::FlatCorrectArgs),

    /// Generate sinograms from (optionally corrected) projections
    Sinogram(commands::sinogram::SinogramArgs),

    /// Show stack file metadata
    Info(commands::info::InfoArgs),

    /// Generate a synthetic scan for demos and testing
    Generate(commands::generate::GenerateArgs),

    /// List the available processing tasks and their ports
    Tasks(commands::tasks::TasksArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::FlatCorrect(args) => commands::flat_correct::run(args),
        Commands::Sinogram(args) => commands::sinogram::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Tasks(args) => commands::tasks::run(args),
    }
}
