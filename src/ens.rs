use crate::error::{ResolutionError, ResolutionResult};
use crate::models::{
    default_ens_registry, default_eth_url, is_evm_coin, NamingServiceName, ResolutionResponse,
    SourceConfig,
};
use crate::namehash::{eth_namehash, to_hex};
use crate::naming_service::{checked_coin_type, valid_labels, NamingService};
use crate::provider::{
    decode_address, decode_bytes, decode_string, decode_uint, encode_call, uint_word,
    JsonRpcProvider, Param,
};
use std::collections::HashMap;

const ENS_TLDS: [&str; 4] = ["eth", "luxe", "xyz", "kred"];

/// Ethereum Name Service backend: registry + resolver contracts over
/// JSON-RPC `eth_call`.
pub struct Ens {
    provider: JsonRpcProvider,
    registry: String,
    network: String,
}

impl Ens {
    pub fn new(config: SourceConfig) -> ResolutionResult<Self> {
        let url = config
            .url
            .or_else(|| default_eth_url(&config.network).map(String::from))
            .ok_or_else(|| ResolutionError::UnsupportedNetwork(config.network.clone()))?;
        let registry = config
            .registry
            .or_else(|| default_ens_registry(&config.network).map(String::from))
            .ok_or_else(|| ResolutionError::UnsupportedNetwork(config.network.clone()))?;

        Ok(Self {
            provider: JsonRpcProvider::new(url),
            registry,
            network: config.network,
        })
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    async fn registry_call(&self, signature: &str, node: &[u8; 32]) -> ResolutionResult<Option<Vec<u8>>> {
        let data = encode_call(signature, &[Param::Word(node)]);
        self.provider.eth_call(&self.registry, data).await
    }

    async fn owner_of_node(&self, node: &[u8; 32]) -> ResolutionResult<Option<String>> {
        let ret = self.registry_call("owner(bytes32)", node).await?;
        Ok(ret.and_then(|r| decode_address(&r)))
    }

    async fn resolver_of_node(&self, node: &[u8; 32]) -> ResolutionResult<Option<String>> {
        let ret = self.registry_call("resolver(bytes32)", node).await?;
        Ok(ret.and_then(|r| decode_address(&r)))
    }

    async fn ttl_of_node(&self, node: &[u8; 32]) -> ResolutionResult<u64> {
        let ret = self.registry_call("ttl(bytes32)", node).await?;
        Ok(ret.and_then(|r| decode_uint(&r)).unwrap_or(0))
    }

    /// owner/resolver ladder shared by record and address lookups. The two
    /// registry reads go out concurrently.
    async fn require_resolver(&self, domain: &str, node: &[u8; 32]) -> ResolutionResult<String> {
        let (owner, resolver) =
            tokio::try_join!(self.owner_of_node(node), self.resolver_of_node(node))?;

        if owner.is_none() {
            return Err(ResolutionError::UnregisteredDomain(domain.to_string()));
        }
        resolver.ok_or_else(|| ResolutionError::UnspecifiedResolver(domain.to_string()))
    }

    async fn eth_addr(&self, resolver: &str, node: &[u8; 32]) -> ResolutionResult<Option<String>> {
        let data = encode_call("addr(bytes32)", &[Param::Word(node)]);
        let ret = self.provider.eth_call(resolver, data).await?;
        Ok(ret.and_then(|r| decode_address(&r)))
    }

    /// ENSIP-9 multicoin record: raw bytes keyed by SLIP-44 coin type.
    async fn multicoin_addr(
        &self,
        resolver: &str,
        node: &[u8; 32],
        coin: u64,
    ) -> ResolutionResult<Option<Vec<u8>>> {
        let coin_word = uint_word(coin);
        let data = encode_call(
            "addr(bytes32,uint256)",
            &[Param::Word(node), Param::Word(&coin_word)],
        );
        let ret = self.provider.eth_call(resolver, data).await?;
        Ok(ret
            .and_then(|r| decode_bytes(&r))
            .filter(|b| !b.is_empty()))
    }
}

impl NamingService for Ens {
    fn service_name(&self) -> NamingServiceName {
        NamingServiceName::Ens
    }

    fn is_supported_domain(&self, domain: &str) -> bool {
        if !valid_labels(domain) {
            return false;
        }
        if domain == "addr.reverse" || domain.ends_with(".addr.reverse") {
            return true;
        }
        domain
            .rsplit('.')
            .next()
            .is_some_and(|tld| ENS_TLDS.contains(&tld))
    }

    fn namehash(&self, domain: &str) -> String {
        to_hex(&eth_namehash(domain))
    }

    async fn owner(&self, domain: &str) -> ResolutionResult<Option<String>> {
        self.owner_of_node(&eth_namehash(domain)).await
    }

    async fn resolver(&self, domain: &str) -> ResolutionResult<Option<String>> {
        self.resolver_of_node(&eth_namehash(domain)).await
    }

    async fn addr(&self, domain: &str, ticker: &str) -> ResolutionResult<String> {
        let coin = checked_coin_type(ticker)?;
        let node = eth_namehash(domain);
        let resolver = self.require_resolver(domain, &node).await?;

        let not_found = || ResolutionError::RecordNotFound {
            domain: domain.to_string(),
            key: format!("addr.{}", ticker.to_ascii_uppercase()),
        };

        if coin == 60 {
            return self
                .eth_addr(&resolver, &node)
                .await?
                .ok_or_else(not_found);
        }

        let bytes = self
            .multicoin_addr(&resolver, &node, coin)
            .await?
            .ok_or_else(not_found)?;

        // EVM-style coins are plain 20-byte accounts and render directly as
        // 0x-hex; other coin types are handed back as raw hex for an
        // external per-coin encoder to render.
        if is_evm_coin(coin) && bytes.len() != 20 {
            return Err(ResolutionError::RecordNotFound {
                domain: domain.to_string(),
                key: format!("addr.{}", ticker.to_ascii_uppercase()),
            });
        }
        Ok(format!("0x{}", hex::encode(bytes)))
    }

    async fn record(&self, domain: &str, key: &str) -> ResolutionResult<String> {
        let node = eth_namehash(domain);
        let resolver = self.require_resolver(domain, &node).await?;

        let data = encode_call("text(bytes32,string)", &[Param::Word(&node), Param::Str(key)]);
        let ret = self.provider.eth_call(&resolver, data).await?;

        ret.and_then(|r| decode_string(&r))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ResolutionError::RecordNotFound {
                domain: domain.to_string(),
                key: key.to_string(),
            })
    }

    async fn resolve(&self, domain: &str) -> ResolutionResult<ResolutionResponse> {
        tracing::info!("Resolving {} via ENS on {}", domain, self.network);

        let node = eth_namehash(domain);

        // owner, resolver and ttl are independent registry reads
        let (owner, resolver, ttl) = tokio::try_join!(
            self.owner_of_node(&node),
            self.resolver_of_node(&node),
            self.ttl_of_node(&node)
        )?;

        if owner.is_none() {
            tracing::debug!("{} is unregistered", domain);
            return Ok(ResolutionResponse::unregistered(NamingServiceName::Ens));
        }

        let mut addresses = HashMap::new();
        if let Some(resolver_addr) = &resolver {
            if let Some(eth) = self.eth_addr(resolver_addr, &node).await? {
                addresses.insert("ETH".to_string(), eth);
            }
        }

        Ok(ResolutionResponse {
            owner,
            resolver,
            addresses,
            records: HashMap::new(),
            ttl,
            service: NamingServiceName::Ens,
        })
    }

    async fn reverse(&self, address: &str) -> ResolutionResult<String> {
        let hex_part = address.strip_prefix("0x").unwrap_or(address).to_lowercase();
        let reverse_domain = format!("{}.addr.reverse", hex_part);

        tracing::debug!("Reverse lookup via {}", reverse_domain);

        let node = eth_namehash(&reverse_domain);
        let resolver = self
            .resolver_of_node(&node)
            .await?
            .ok_or_else(|| ResolutionError::UnspecifiedResolver(address.to_string()))?;

        let data = encode_call("name(bytes32)", &[Param::Word(&node)]);
        let ret = self.provider.eth_call(&resolver, data).await?;

        ret.and_then(|r| decode_string(&r))
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ResolutionError::RecordNotFound {
                domain: reverse_domain,
                key: "name".to_string(),
            })
    }
}
