use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Naming service backend tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NamingServiceName {
    /// Ethereum Name Service (.eth, .luxe, .xyz, .kred)
    Ens,
    /// Zilliqa Name Service (.zil)
    Zns,
    /// Crypto Name Service (.crypto)
    Cns,
    /// Unstoppable Domains HTTP API (.crypto, .zil)
    Udapi,
}

impl fmt::Display for NamingServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NamingServiceName::Ens => "ENS",
            NamingServiceName::Zns => "ZNS",
            NamingServiceName::Cns => "CNS",
            NamingServiceName::Udapi => "UDAPI",
        };
        f.write_str(name)
    }
}

/// Per-backend source configuration.
///
/// `url` and `registry` fall back to the static default tables for the
/// named network; an unknown network fails construction with
/// `UnsupportedNetwork`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    pub network: String,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub registry: Option<String>,
}

impl SourceConfig {
    pub fn mainnet() -> Self {
        Self {
            network: "mainnet".to_string(),
            url: None,
            registry: None,
        }
    }
}

/// Source configuration for the blockchain-backed dispatcher.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub ens: Option<SourceConfig>,
    pub zns: Option<SourceConfig>,
    pub cns: Option<SourceConfig>,
}

/// Uniform response shape returned by `resolve` on every backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionResponse {
    /// Owner address, None for an unregistered domain
    pub owner: Option<String>,

    /// Resolver contract address, None when no resolver is configured
    pub resolver: Option<String>,

    /// Currency ticker -> address
    #[serde(default)]
    pub addresses: HashMap<String, String>,

    /// Arbitrary record key -> value
    #[serde(default)]
    pub records: HashMap<String, String>,

    /// Registry TTL, 0 where the backend stores none
    pub ttl: u64,

    /// Which backend answered
    pub service: NamingServiceName,
}

impl ResolutionResponse {
    /// An unregistered-domain response: nulls and empty maps, never an error.
    pub fn unregistered(service: NamingServiceName) -> Self {
        Self {
            owner: None,
            resolver: None,
            addresses: HashMap::new(),
            records: HashMap::new(),
            ttl: 0,
            service,
        }
    }
}

/// Generic JSON-RPC 2.0 request
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u32,
    pub method: String,
    pub params: serde_json::Value,
}

impl JsonRpcRequest {
    pub fn new(method: &str, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: 1,
            method: method.to_string(),
            params,
        }
    }
}

/// Generic JSON-RPC 2.0 response envelope. Missing `result`/`error` fields
/// deserialize to None without a `Default` bound on `T`.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object (rate limits and node failures arrive here)
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// The zero address, meaning "unregistered" on both registries.
pub const NULL_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Ethereum network id -> network name
pub fn network_name_for_id(id: u64) -> Option<&'static str> {
    match id {
        1 => Some("mainnet"),
        3 => Some("ropsten"),
        4 => Some("rinkeby"),
        5 => Some("goerli"),
        42 => Some("kovan"),
        _ => None,
    }
}

/// Default Ethereum JSON-RPC endpoint per network
pub fn default_eth_url(network: &str) -> Option<&'static str> {
    match network {
        "mainnet" => Some("https://cloudflare-eth.com"),
        "goerli" => Some("https://rpc.ankr.com/eth_goerli"),
        _ => None,
    }
}

/// Default ENS registry address per network
pub fn default_ens_registry(network: &str) -> Option<&'static str> {
    match network {
        "mainnet" => Some("0x314159265dD8dbb310642f98f50C066173C1259b"),
        "ropsten" => Some("0x112234455c3a32fd11230c42e7bccd4a84e02010"),
        "rinkeby" => Some("0xe7410170f87102df0055eb195163a03b7f2bff4a"),
        "goerli" => Some("0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e"),
        _ => None,
    }
}

/// Default CNS registry address per network (mainnet only)
pub fn default_cns_registry(network: &str) -> Option<&'static str> {
    match network {
        "mainnet" => Some("0xD1E5b0FF1287aA9f9A268759062E4Ab08b9Dacbe"),
        _ => None,
    }
}

/// Default Zilliqa API endpoint per network
pub fn default_zil_url(network: &str) -> Option<&'static str> {
    match network {
        "mainnet" => Some("https://api.zilliqa.com"),
        "testnet" => Some("https://dev-api.zilliqa.com"),
        _ => None,
    }
}

/// Default ZNS registry address per network (base16 form)
pub fn default_zns_registry(network: &str) -> Option<&'static str> {
    match network {
        "mainnet" => Some("0x9611c53BE6d1b32058b2747bdeCECed7e1216793"),
        _ => None,
    }
}

/// SLIP-44 coin type for a currency ticker, used for ENSIP-9 multicoin
/// lookups. Tickers are matched case-insensitively.
pub fn coin_type(ticker: &str) -> Option<u64> {
    let t = ticker.to_ascii_uppercase();
    let id = match t.as_str() {
        "BTC" => 0,
        "LTC" => 2,
        "DOGE" => 3,
        "DASH" => 5,
        "ETH" => 60,
        "ETC" => 61,
        "XRP" => 144,
        "BCH" => 145,
        "XLM" => 148,
        "TRX" => 195,
        "ZIL" => 313,
        "MATIC" => 966,
        _ => return None,
    };
    Some(id)
}

/// Coin types whose addresses are plain 20-byte EVM accounts.
pub fn is_evm_coin(coin: u64) -> bool {
    matches!(coin, 60 | 61 | 966)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_id_table() {
        assert_eq!(network_name_for_id(1), Some("mainnet"));
        assert_eq!(network_name_for_id(5), Some("goerli"));
        assert_eq!(network_name_for_id(99), None);
    }

    #[test]
    fn test_coin_types() {
        assert_eq!(coin_type("eth"), Some(60));
        assert_eq!(coin_type("BCH"), Some(145));
        assert_eq!(coin_type("ZIL"), Some(313));
        assert_eq!(coin_type("NOPE"), None);
        assert!(is_evm_coin(60));
        assert!(!is_evm_coin(0));
    }

    #[test]
    fn test_registry_defaults() {
        assert!(default_ens_registry("mainnet").is_some());
        assert!(default_cns_registry("goerli").is_none());
        assert!(default_zns_registry("mainnet").is_some());
    }

    #[test]
    fn test_rpc_envelope_deserializes_without_default_bound() {
        // JsonRpcError has no Default impl, and neither does every T this
        // envelope is read into; missing fields must still become None.
        let ok: JsonRpcResponse<String> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"0xab"}"#).unwrap();
        assert_eq!(ok.result.as_deref(), Some("0xab"));
        assert!(ok.error.is_none());

        let err: JsonRpcResponse<String> = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32005,"message":"rate limited"}}"#,
        )
        .unwrap();
        assert!(err.result.is_none());
        assert_eq!(err.error.unwrap().code, -32005);
    }

    #[test]
    fn test_unregistered_response_shape() {
        let r = ResolutionResponse::unregistered(NamingServiceName::Cns);
        assert!(r.owner.is_none());
        assert!(r.addresses.is_empty());
        assert_eq!(r.ttl, 0);
    }
}
