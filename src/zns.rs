use crate::error::{ResolutionError, ResolutionResult};
use crate::models::{
    default_zil_url, default_zns_registry, NamingServiceName, ResolutionResponse, SourceConfig,
    NULL_ADDRESS,
};
use crate::namehash::{to_hex, zil_namehash};
use crate::naming_service::{checked_coin_type, valid_labels, NamingService};
use crate::provider::JsonRpcProvider;
use std::collections::HashMap;

/// Zilliqa Name Service backend (.zil) over `GetSmartContractSubState`.
///
/// The registry keeps `records[node] -> Record(owner, resolver)`; a resolver
/// contract keeps its whole key/value map in one `records` field, so a single
/// substate read returns every record for a domain.
pub struct Zns {
    provider: JsonRpcProvider,
    registry: String,
    network: String,
}

/// Registry entry for one node.
#[derive(Debug, Clone)]
struct RegistryRecord {
    owner: Option<String>,
    resolver: Option<String>,
}

impl Zns {
    pub fn new(config: SourceConfig) -> ResolutionResult<Self> {
        let url = config
            .url
            .or_else(|| default_zil_url(&config.network).map(String::from))
            .ok_or_else(|| ResolutionError::UnsupportedNetwork(config.network.clone()))?;
        let registry = config
            .registry
            .or_else(|| default_zns_registry(&config.network).map(String::from))
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

    fn non_null(addr: Option<&str>) -> Option<String> {
        addr.filter(|a| !a.is_empty() && !a.eq_ignore_ascii_case(NULL_ADDRESS))
            .map(String::from)
    }

    /// Read the registry entry for a domain. None for unregistered nodes.
    async fn registry_record(&self, domain: &str) -> ResolutionResult<Option<RegistryRecord>> {
        let node = to_hex(&zil_namehash(domain));

        tracing::debug!("ZNS registry lookup for {} ({})", domain, node);

        let state = self
            .provider
            .zil_sub_state(&self.registry, "records", vec![node.clone()])
            .await?;

        let Some(state) = state else {
            return Ok(None);
        };

        // records[node].arguments == [owner, resolver]
        let arguments = state
            .get("records")
            .and_then(|r| r.get(&node))
            .and_then(|e| e.get("arguments"))
            .and_then(|a| a.as_array())
            .ok_or_else(|| {
                ResolutionError::NamingServiceDown("unexpected registry substate shape".to_string())
            })?;

        Ok(Some(RegistryRecord {
            owner: Self::non_null(arguments.first().and_then(|v| v.as_str())),
            resolver: Self::non_null(arguments.get(1).and_then(|v| v.as_str())),
        }))
    }

    /// Full key/value record map held by a resolver contract.
    async fn resolver_records(&self, resolver: &str) -> ResolutionResult<HashMap<String, String>> {
        let state = self
            .provider
            .zil_sub_state(resolver, "records", vec![])
            .await?;

        let mut records = HashMap::new();
        if let Some(map) = state
            .as_ref()
            .and_then(|s| s.get("records"))
            .and_then(|r| r.as_object())
        {
            for (key, value) in map {
                if let Some(value) = value.as_str() {
                    records.insert(key.clone(), value.to_string());
                }
            }
        }
        Ok(records)
    }

    /// owner/resolver ladder, then the resolver's record map.
    async fn require_records(&self, domain: &str) -> ResolutionResult<HashMap<String, String>> {
        let entry = self
            .registry_record(domain)
            .await?
            .filter(|e| e.owner.is_some())
            .ok_or_else(|| ResolutionError::UnregisteredDomain(domain.to_string()))?;

        let resolver = entry
            .resolver
            .ok_or_else(|| ResolutionError::UnspecifiedResolver(domain.to_string()))?;

        self.resolver_records(&resolver).await
    }
}

/// ZNS resolvers key currency addresses as `crypto.<TICKER>.address`.
fn address_key(ticker: &str) -> String {
    format!("crypto.{}.address", ticker.to_ascii_uppercase())
}

/// Pull the `crypto.<TICKER>.address` entries out of a record map.
fn addresses_from_records(records: &HashMap<String, String>) -> HashMap<String, String> {
    records
        .iter()
        .filter_map(|(key, value)| {
            let ticker = key.strip_prefix("crypto.")?.strip_suffix(".address")?;
            Some((ticker.to_string(), value.clone()))
        })
        .collect()
}

impl NamingService for Zns {
    fn service_name(&self) -> NamingServiceName {
        NamingServiceName::Zns
    }

    fn is_supported_domain(&self, domain: &str) -> bool {
        valid_labels(domain) && domain.rsplit('.').next() == Some("zil")
    }

    fn namehash(&self, domain: &str) -> String {
        to_hex(&zil_namehash(domain))
    }

    async fn owner(&self, domain: &str) -> ResolutionResult<Option<String>> {
        Ok(self
            .registry_record(domain)
            .await?
            .and_then(|e| e.owner))
    }

    async fn resolver(&self, domain: &str) -> ResolutionResult<Option<String>> {
        Ok(self
            .registry_record(domain)
            .await?
            .and_then(|e| e.resolver))
    }

    async fn addr(&self, domain: &str, ticker: &str) -> ResolutionResult<String> {
        checked_coin_type(ticker)?;

        let records = self.require_records(domain).await?;
        records
            .get(&address_key(ticker))
            .cloned()
            .ok_or_else(|| ResolutionError::RecordNotFound {
                domain: domain.to_string(),
                key: address_key(ticker),
            })
    }

    async fn record(&self, domain: &str, key: &str) -> ResolutionResult<String> {
        let records = self.require_records(domain).await?;
        records
            .get(key)
            .cloned()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ResolutionError::RecordNotFound {
                domain: domain.to_string(),
                key: key.to_string(),
            })
    }

    async fn resolve(&self, domain: &str) -> ResolutionResult<ResolutionResponse> {
        tracing::info!("Resolving {} via ZNS on {}", domain, self.network);

        let Some(entry) = self.registry_record(domain).await?.filter(|e| e.owner.is_some())
        else {
            tracing::debug!("{} is unregistered", domain);
            return Ok(ResolutionResponse::unregistered(NamingServiceName::Zns));
        };

        let records = match &entry.resolver {
            Some(resolver) => self.resolver_records(resolver).await?,
            None => HashMap::new(),
        };

        Ok(ResolutionResponse {
            owner: entry.owner,
            resolver: entry.resolver,
            addresses: addresses_from_records(&records),
            records,
            // ZNS stores no TTL
            ttl: 0,
            service: NamingServiceName::Zns,
        })
    }
}
