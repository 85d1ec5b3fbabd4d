//! # web3ns SDK for Rust
//!
//! A Rust SDK for resolving blockchain domain names (.eth, .crypto, .zil and
//! friends) into cryptocurrency addresses and records, via the ENS, ZNS or
//! CNS smart contracts or the centralized Unstoppable Domains API.
//!
//! ## Quick Start
//!
//! ```no_run
//! use web3ns_sdk_rs::Resolution;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Mainnet defaults for ENS, ZNS and CNS
//!     let resolution = Resolution::new()?;
//!
//!     // Resolve a domain to its BCH address
//!     let bch = resolution.addr("brad.crypto", "BCH").await?;
//!     println!("BCH: {}", bch);
//!
//!     // Full resolution: owner, resolver, addresses, records
//!     let response = resolution.resolve("brad.crypto").await?;
//!     println!("Owner: {:?}", response.owner);
//!
//!     Ok(())
//! }
//! ```

pub mod cns;
pub mod ens;
pub mod error;
pub mod models;
pub mod namehash;
pub mod naming_service;
pub mod provider;
pub mod resolution;
pub mod udapi;
pub mod zns;

// Re-exports
pub use error::{ResolutionError, ResolutionResult};
pub use models::{NamingServiceName, ResolutionResponse, SourceConfig, Sources};
pub use naming_service::NamingService;
pub use resolution::Resolution;
