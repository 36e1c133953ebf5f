use clap::{Args, Subcommand};

mod earn;

#[derive(Debug, Args)]
pub(crate) struct LoyaltyCommand {
    #[command(subcommand)]
    command: LoyaltySubcommand,
}

#[derive(Debug, Subcommand)]
enum LoyaltySubcommand {
    Earn(earn::EarnPointsArgs),
}

pub(crate) async fn run(command: LoyaltyCommand) -> Result<(), String> {
    match command.command {
        LoyaltySubcommand::Earn(args) => earn::run(args).await,
    }
}
