use clap::{Args, Subcommand};

mod generate;

#[derive(Debug, Args)]
pub(crate) struct ReferenceCommand {
    #[command(subcommand)]
    command: ReferenceSubcommand,
}

#[derive(Debug, Subcommand)]
enum ReferenceSubcommand {
    Generate(generate::GenerateReferenceArgs),
}

pub(crate) fn run(command: ReferenceCommand) -> Result<(), String> {
    match command.command {
        ReferenceSubcommand::Generate(args) => generate::run(&args),
    }
}
