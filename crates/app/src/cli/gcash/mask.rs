use clap::Args;
use canteen_app::domain::payments::phone::GcashNumber;

#[derive(Debug, Args)]
pub(crate) struct MaskNumberArgs {
    /// Mobile number in any common format, e.g. `+63 917 123 4567`
    number: String,
}

pub(crate) fn run(args: &MaskNumberArgs) -> Result<(), String> {
    let number = GcashNumber::parse(&args.number)
        .map_err(|error| format!("invalid GCash number: {error}"))?;

    println!("formatted: {number}");
    println!("masked: {}", number.masked());

    Ok(())
}
