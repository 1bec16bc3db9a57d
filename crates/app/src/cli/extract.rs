use clap::Args;
use tally::extract::{extract_payload, is_valid_code};

#[derive(Debug, Args)]
pub(crate) struct ExtractArgs {
    /// Raw QR payload, e.g. `{"code":"SAVE10"}` or `https://shop.example/?code=SAVE10`
    payload: String,
}

pub(crate) fn run(args: &ExtractArgs) -> Result<(), String> {
    let payload = extract_payload(&args.payload);

    println!("code: {}", payload.code);
    println!(
        "customer_hint: {}",
        payload.customer_hint.as_deref().unwrap_or("none")
    );
    println!("valid: {}", is_valid_code(&payload.code));

    Ok(())
}
