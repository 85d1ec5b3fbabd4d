use web3ns_sdk_rs::Resolution;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let resolution = Resolution::new()?;

    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".to_string());

    println!("Reverse lookup for address: {}", address);

    match resolution.reverse(&address).await {
        Ok(domain) => println!("✓ Primary ENS name: {}", domain),
        Err(e) => eprintln!("✗ Reverse lookup failed: {}", e),
    }

    Ok(())
}
