//! `radon tasks` - list the processing tasks the pipelines are built from.

use clap::Args;
use radon_tasks::task_descriptors;

/// Arguments for the tasks subcommand.
#[derive(Args)]
pub struct TasksArgs {
    /// Also show each task's input and output ports
    #[arg(long)]
    ports: bool,
}

/// Prints the task table.
pub fn run(args: TasksArgs) -> anyhow::Result<()> {
    for descriptor in task_descriptors() {
        println!("{:<24} {}", descriptor.id, descriptor.summary);
        if args.ports {
            println!(
                "{:<24}   inputs: [{}]  outputs: [{}]",
                "",
                descriptor.inputs.join(", "),
                descriptor.outputs.join(", ")
            );
        }
    }
    Ok(())
}
