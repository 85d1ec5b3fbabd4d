use web3ns_sdk_rs::Resolution;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Creating resolution client with mainnet defaults...");
    let resolution = Resolution::new()?;

    let domain = std::env::args().nth(1).unwrap_or_else(|| "brad.crypto".to_string());
    println!("\nResolving domain: {}", domain);
    println!("Namehash: {}", resolution.namehash(&domain)?);

    match resolution.resolve(&domain).await {
        Ok(response) => {
            println!("\n✓ Resolved via {:?}", response.service);
            println!("  Owner: {}", response.owner.as_deref().unwrap_or("(unregistered)"));
            println!(
                "  Resolver: {}",
                response.resolver.as_deref().unwrap_or("(none)")
            );
            println!("  TTL: {}", response.ttl);

            if !response.addresses.is_empty() {
                println!("\n  Addresses:");
                for (ticker, addr) in &response.addresses {
                    println!("    {}: {}", ticker, addr);
                }
            }

            if !response.records.is_empty() {
                println!("\n  Records:");
                for (key, value) in &response.records {
                    println!("    {}: {}", key, value);
                }
            }
        }
        Err(e) => {
            eprintln!("\n✗ Error resolving domain: {}", e);
        }
    }

    Ok(())
}
