use clap::Args;
use canteen_app::{
    config::LedgerSettings,
    context::AppContext,
    domain::{
        parties::StallUuid,
        vouchers::{
            data::NewVoucher,
            records::{Targeting, VoucherDiscount, VoucherUuid},
        },
    },
};
use jiff::{SignedDuration, Timestamp};

#[derive(Debug, Args)]
pub(crate) struct CreateVoucherArgs {
    /// Code customers type at checkout; stored upper-cased
    #[arg(long)]
    code: String,

    /// Fixed discount in centavos
    #[arg(long, conflicts_with = "percent_off", required_unless_present = "percent_off")]
    amount_off: Option<u64>,

    /// Percentage discount, 1-100
    #[arg(long)]
    percent_off: Option<u16>,

    /// Cap on a percentage discount, in centavos
    #[arg(long, requires = "percent_off")]
    max_discount: Option<u64>,

    /// Smallest subtotal the voucher applies to, in centavos
    #[arg(long, default_value_t = 0)]
    min_order: u64,

    /// Total number of uses across all customers
    #[arg(long)]
    max_usage: u64,

    /// Days from now the voucher stays valid
    #[arg(long, default_value_t = 30)]
    valid_days: i64,

    /// Restrict to these customer emails; repeatable
    #[arg(long = "user")]
    users: Vec<String>,

    /// Restrict to these stalls; repeatable
    #[arg(long = "stall")]
    stalls: Vec<StallUuid>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

fn targeting<T>(selected: Vec<T>) -> Targeting<T> {
    if selected.is_empty() {
        Targeting::All
    } else {
        Targeting::Selected(selected.into_iter().collect())
    }
}

pub(crate) async fn run(args: CreateVoucherArgs) -> Result<(), String> {
    let discount = match (args.amount_off, args.percent_off) {
        (Some(amount), _) => VoucherDiscount::FixedAmountOff { amount },
        (None, Some(percentage)) => VoucherDiscount::PercentageOff {
            percentage,
            max_discount: args.max_discount,
        },
        (None, None) => return Err("one of --amount-off or --percent-off is required".to_string()),
    };

    let valid_for = SignedDuration::from_hours(args.valid_days.saturating_mul(24));
    let now = Timestamp::now();
    let valid_until = now
        .checked_add(valid_for)
        .map_err(|error| format!("invalid validity window: {error}"))?;

    let context = AppContext::from_database_url(&args.database_url, &LedgerSettings::default())
        .await
        .map_err(|error| format!("failed to initialize: {error}"))?;

    let voucher = context
        .vouchers
        .create_voucher(NewVoucher {
            uuid: VoucherUuid::new(),
            code: args.code,
            discount,
            min_order_amount: args.min_order,
            valid_from: now,
            valid_until,
            max_usage: args.max_usage,
            user_targeting: targeting(args.users),
            stall_targeting: targeting(args.stalls),
            is_active: true,
        })
        .await
        .map_err(|error| format!("failed to create voucher: {error}"))?;

    println!("voucher_uuid: {}", voucher.uuid);
    println!("code: {}", voucher.code);
    println!("valid_until: {}", voucher.valid_until);

    Ok(())
}
