use clap::{Parser, Subcommand};

mod gcash;
mod loyalty;
mod migrate;
mod pickup;
mod reference;
mod voucher;

#[derive(Debug, Parser)]
#[command(name = "canteen-app", about = "Canteen ledger CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate(migrate::MigrateArgs),
    Voucher(voucher::VoucherCommand),
    Loyalty(loyalty::LoyaltyCommand),
    Reference(reference::ReferenceCommand),
    Gcash(gcash::GcashCommand),
    Pickup(pickup::PickupCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Migrate(args) => migrate::run(args).await,
            Commands::Voucher(command) => voucher::run(command).await,
            Commands::Loyalty(command) => loyalty::run(command).await,
            Commands::Reference(command) => reference::run(command),
            Commands::Gcash(command) => gcash::run(command),
            Commands::Pickup(command) => pickup::run(command),
        }
    }
}
