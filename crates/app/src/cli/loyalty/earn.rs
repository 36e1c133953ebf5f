use clap::Args;
use canteen_app::{
    config::LedgerSettings,
    context::AppContext,
    domain::parties::{Customer, CustomerUuid},
};

#[derive(Debug, Args)]
pub(crate) struct EarnPointsArgs {
    /// Customer to credit
    #[arg(long)]
    customer_uuid: CustomerUuid,

    /// Customer email, used when the account is opened
    #[arg(long)]
    email: String,

    /// Points to credit
    #[arg(long)]
    points: u64,

    /// Shown in the customer's transaction history
    #[arg(long, default_value = "Manual adjustment")]
    description: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: EarnPointsArgs) -> Result<(), String> {
    let context = AppContext::from_database_url(&args.database_url, &LedgerSettings::default())
        .await
        .map_err(|error| format!("failed to initialize: {error}"))?;

    let account = context
        .loyalty
        .earn_points(
            Customer::new(args.customer_uuid, args.email),
            args.points,
            args.description,
        )
        .await
        .map_err(|error| format!("failed to credit points: {error}"))?;

    println!("customer_uuid: {}", account.customer);
    println!("balance: {}", account.points);

    Ok(())
}
