use clap::Args;
use canteen_app::domain::references::{self, PAYMENT_REFERENCE_PREFIX};
use jiff::Timestamp;

#[derive(Debug, Args)]
pub(crate) struct GenerateReferenceArgs {
    /// Code prefix
    #[arg(long, default_value = PAYMENT_REFERENCE_PREFIX)]
    prefix: String,

    /// How many codes to print
    #[arg(long, default_value_t = 1)]
    count: usize,
}

pub(crate) fn run(args: &GenerateReferenceArgs) -> Result<(), String> {
    if args.count == 0 {
        return Err("count must be at least 1".to_string());
    }

    for _ in 0..args.count {
        println!("{}", references::generate_reference(&args.prefix, Timestamp::now()));
    }

    Ok(())
}
