use clap::{Args, Subcommand};

mod mask;

#[derive(Debug, Args)]
pub(crate) struct GcashCommand {
    #[command(subcommand)]
    command: GcashSubcommand,
}

#[derive(Debug, Subcommand)]
enum GcashSubcommand {
    Mask(mask::MaskNumberArgs),
}

pub(crate) fn run(command: GcashCommand) -> Result<(), String> {
    match command.command {
        GcashSubcommand::Mask(args) => mask::run(&args),
    }
}
