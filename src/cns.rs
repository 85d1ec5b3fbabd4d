use crate::error::{ResolutionError, ResolutionResult};
use crate::models::{
    default_cns_registry, default_eth_url, NamingServiceName, ResolutionResponse, SourceConfig,
};
use crate::namehash::{eth_namehash, to_hex};
use crate::naming_service::{checked_coin_type, valid_labels, NamingService};
use crate::provider::{decode_address, decode_string, encode_call, JsonRpcProvider, Param};
use futures::future::join_all;
use std::collections::HashMap;

/// Currencies fetched eagerly by `resolve`. Individual `addr` calls can ask
/// for any ticker in the coin-type table.
const RESOLVE_CURRENCIES: [&str; 6] = ["BTC", "ETH", "LTC", "XRP", "BCH", "ZIL"];

/// Record keys beyond addresses that `resolve` fetches.
const RESOLVE_RECORDS: [&str; 2] = ["ipfs.html.value", "ipfs.redirect_domain.value"];

/// Crypto Name Service backend (.crypto). The namehash doubles as the ERC-721
/// token id, so ownership goes through `ownerOf`/`resolverOf` and records
/// through the resolver's `get(string,uint256)`.
pub struct Cns {
    provider: JsonRpcProvider,
    registry: String,
    network: String,
}

impl Cns {
    pub fn new(config: SourceConfig) -> ResolutionResult<Self> {
        let url = config
            .url
            .or_else(|| default_eth_url(&config.network).map(String::from))
            .ok_or_else(|| ResolutionError::UnsupportedNetwork(config.network.clone()))?;
        let registry = config
            .registry
            .or_else(|| default_cns_registry(&config.network).map(String::from))
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

    /// `ownerOf` reverts for an unminted token; the provider turns that
    /// revert into None, which here means "unregistered".
    async fn owner_of_token(&self, token: &[u8; 32]) -> ResolutionResult<Option<String>> {
        let data = encode_call("ownerOf(uint256)", &[Param::Word(token)]);
        let ret = self.provider.eth_call(&self.registry, data).await?;
        Ok(ret.and_then(|r| decode_address(&r)))
    }

    async fn resolver_of_token(&self, token: &[u8; 32]) -> ResolutionResult<Option<String>> {
        let data = encode_call("resolverOf(uint256)", &[Param::Word(token)]);
        let ret = self.provider.eth_call(&self.registry, data).await?;
        Ok(ret.and_then(|r| decode_address(&r)))
    }

    /// Read one record off the resolver. None when unset.
    async fn get(
        &self,
        resolver: &str,
        key: &str,
        token: &[u8; 32],
    ) -> ResolutionResult<Option<String>> {
        let data = encode_call("get(string,uint256)", &[Param::Str(key), Param::Word(token)]);
        let ret = self.provider.eth_call(resolver, data).await?;
        Ok(ret
            .and_then(|r| decode_string(&r))
            .filter(|s| !s.is_empty()))
    }

    async fn require_resolver(&self, domain: &str, token: &[u8; 32]) -> ResolutionResult<String> {
        let (owner, resolver) = tokio::try_join!(
            self.owner_of_token(token),
            self.resolver_of_token(token)
        )?;

        if owner.is_none() {
            return Err(ResolutionError::UnregisteredDomain(domain.to_string()));
        }
        resolver.ok_or_else(|| ResolutionError::UnspecifiedResolver(domain.to_string()))
    }
}

fn address_key(ticker: &str) -> String {
    format!("crypto.{}.address", ticker.to_ascii_uppercase())
}

impl NamingService for Cns {
    fn service_name(&self) -> NamingServiceName {
        NamingServiceName::Cns
    }

    fn is_supported_domain(&self, domain: &str) -> bool {
        valid_labels(domain) && domain.rsplit('.').next() == Some("crypto")
    }

    fn namehash(&self, domain: &str) -> String {
        to_hex(&eth_namehash(domain))
    }

    async fn owner(&self, domain: &str) -> ResolutionResult<Option<String>> {
        self.owner_of_token(&eth_namehash(domain)).await
    }

    async fn resolver(&self, domain: &str) -> ResolutionResult<Option<String>> {
        self.resolver_of_token(&eth_namehash(domain)).await
    }

    async fn addr(&self, domain: &str, ticker: &str) -> ResolutionResult<String> {
        checked_coin_type(ticker)?;

        let token = eth_namehash(domain);
        let resolver = self.require_resolver(domain, &token).await?;
        let key = address_key(ticker);

        self.get(&resolver, &key, &token)
            .await?
            .ok_or_else(|| ResolutionError::RecordNotFound {
                domain: domain.to_string(),
                key,
            })
    }

    async fn record(&self, domain: &str, key: &str) -> ResolutionResult<String> {
        let token = eth_namehash(domain);
        let resolver = self.require_resolver(domain, &token).await?;

        self.get(&resolver, key, &token)
            .await?
            .ok_or_else(|| ResolutionError::RecordNotFound {
                domain: domain.to_string(),
                key: key.to_string(),
            })
    }

    async fn twitter(&self, domain: &str) -> ResolutionResult<String> {
        let token = eth_namehash(domain);
        let resolver = self.require_resolver(domain, &token).await?;

        let (validation, username) = tokio::try_join!(
            self.get(&resolver, "validation.social.twitter.username", &token),
            self.get(&resolver, "social.twitter.username", &token)
        )?;

        // Signature checking against the Unstoppable validator is the
        // caller's verifier's job; absent records cannot verify at all.
        match (validation, username) {
            (Some(_), Some(username)) => Ok(username),
            _ => Err(ResolutionError::InvalidTwitterVerification(
                domain.to_string(),
            )),
        }
    }

    async fn resolve(&self, domain: &str) -> ResolutionResult<ResolutionResponse> {
        tracing::info!("Resolving {} via CNS on {}", domain, self.network);

        let token = eth_namehash(domain);

        let (owner, resolver) = tokio::try_join!(
            self.owner_of_token(&token),
            self.resolver_of_token(&token)
        )?;

        if owner.is_none() {
            tracing::debug!("{} is unregistered", domain);
            return Ok(ResolutionResponse::unregistered(NamingServiceName::Cns));
        }

        let mut addresses = HashMap::new();
        let mut records = HashMap::new();

        if let Some(resolver_addr) = &resolver {
            // fan out the preset key list in parallel
            let address_keys: Vec<String> =
                RESOLVE_CURRENCIES.iter().map(|t| address_key(t)).collect();
            let address_reads = address_keys
                .iter()
                .map(|key| self.get(resolver_addr, key, &token));
            let record_reads = RESOLVE_RECORDS
                .iter()
                .map(|key| self.get(resolver_addr, key, &token));

            let (address_values, record_values) =
                tokio::join!(join_all(address_reads), join_all(record_reads));

            for (ticker, value) in RESOLVE_CURRENCIES.iter().zip(address_values) {
                if let Some(value) = value? {
                    addresses.insert(ticker.to_string(), value);
                }
            }
            for (key, value) in RESOLVE_RECORDS.iter().zip(record_values) {
                if let Some(value) = value? {
                    records.insert(key.to_string(), value);
                }
            }
        }

        Ok(ResolutionResponse {
            owner,
            resolver,
            addresses,
            records,
            // CNS stores no TTL
            ttl: 0,
            service: NamingServiceName::Cns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cns() -> Cns {
        Cns::new(SourceConfig::mainnet()).unwrap()
    }

    #[test]
    fn test_supported_domains() {
        let cns = cns();
        assert!(cns.is_supported_domain("brad.crypto"));
        assert!(cns.is_supported_domain("crypto"));
        assert!(!cns.is_supported_domain("brad.zil"));
        assert!(!cns.is_supported_domain("crypto."));
    }

    #[test]
    fn test_mainnet_only_by_default() {
        let goerli = Cns::new(SourceConfig {
            network: "goerli".to_string(),
            url: None,
            registry: None,
        });
        assert!(matches!(
            goerli,
            Err(ResolutionError::UnsupportedNetwork(_))
        ));

        let goerli_with_registry = Cns::new(SourceConfig {
            network: "goerli".to_string(),
            url: None,
            registry: Some("0xabcdefabcdefabcdefabcdefabcdefabcdefabcd".to_string()),
        });
        assert!(goerli_with_registry.is_ok());
    }

    #[test]
    fn test_root_namehash_constant() {
        assert_eq!(
            cns().namehash("crypto"),
            "0x0f4a10a4f46c288cea365fcf45cccf0e9d901b945b9829ccdb54c10dc3cb7a6f"
        );
    }

    #[test]
    fn test_address_key_shape() {
        assert_eq!(address_key("bch"), "crypto.BCH.address");
    }

    #[tokio::test]
    async fn test_addr_rejects_bad_tickers_before_network() {
        let cns = cns();
        assert!(matches!(
            cns.addr("brad.crypto", "").await,
            Err(ResolutionError::UnspecifiedCurrency)
        ));
        assert!(matches!(
            cns.addr("brad.crypto", "FAKE").await,
            Err(ResolutionError::UnsupportedCurrency(_))
        ));
    }

    #[tokio::test]
    async fn test_reverse_is_unsupported() {
        let result = cns().reverse("0x1234").await;
        assert!(matches!(
            result,
            Err(ResolutionError::UnsupportedMethod {
                method: "reverse",
                service: NamingServiceName::Cns,
            })
        ));
    }
}
