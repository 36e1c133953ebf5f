use clap::Args;
use canteen_app::domain::orders::pickup::{self, PickupScan};

#[derive(Debug, Args)]
pub(crate) struct DecodeScanArgs {
    /// Scanned QR payload or a typed order id
    scan: String,
}

pub(crate) fn run(args: &DecodeScanArgs) -> Result<(), String> {
    let scan =
        pickup::decode_scan(&args.scan).map_err(|error| format!("unreadable scan: {error}"))?;

    println!("order_uuid: {}", scan.order());

    if let PickupScan::Token(token) = scan {
        println!("issued_at: {}", token.issued_at);
    }

    Ok(())
}
