use clap::{Args, Subcommand};

mod decode;

#[derive(Debug, Args)]
pub(crate) struct PickupCommand {
    #[command(subcommand)]
    command: PickupSubcommand,
}

#[derive(Debug, Subcommand)]
enum PickupSubcommand {
    Decode(decode::DecodeScanArgs),
}

pub(crate) fn run(command: PickupCommand) -> Result<(), String> {
    match command.command {
        PickupSubcommand::Decode(args) => decode::run(&args),
    }
}
