use crate::cns::Cns;
use crate::ens::Ens;
use crate::error::{ResolutionError, ResolutionResult};
use crate::models::{NamingServiceName, ResolutionResponse, SourceConfig, Sources};
use crate::namehash::{eth_childhash, from_hex, to_hex, zil_childhash};
use crate::naming_service::NamingService;
use crate::udapi::UdApi;
use crate::zns::Zns;

/// The fixed set of backend variants. Selection is an explicit suffix match
/// over this enum, never runtime capability probing.
pub enum Backend {
    Ens(Ens),
    Zns(Zns),
    Cns(Cns),
    Udapi(UdApi),
}

// Each backend's async fn returns its own future type, so awaiting happens
// inside the match arms.
macro_rules! delegate {
    ($self:expr, $method:ident ( $($arg:expr),* )) => {
        match $self {
            Backend::Ens(s) => s.$method($($arg),*),
            Backend::Zns(s) => s.$method($($arg),*),
            Backend::Cns(s) => s.$method($($arg),*),
            Backend::Udapi(s) => s.$method($($arg),*),
        }
    };
    ($self:expr, await $method:ident ( $($arg:expr),* )) => {
        match $self {
            Backend::Ens(s) => s.$method($($arg),*).await,
            Backend::Zns(s) => s.$method($($arg),*).await,
            Backend::Cns(s) => s.$method($($arg),*).await,
            Backend::Udapi(s) => s.$method($($arg),*).await,
        }
    };
}

impl NamingService for Backend {
    fn service_name(&self) -> NamingServiceName {
        delegate!(self, service_name())
    }

    fn is_supported_domain(&self, domain: &str) -> bool {
        delegate!(self, is_supported_domain(domain))
    }

    fn namehash(&self, domain: &str) -> String {
        delegate!(self, namehash(domain))
    }

    async fn owner(&self, domain: &str) -> ResolutionResult<Option<String>> {
        delegate!(self, await owner(domain))
    }

    async fn resolver(&self, domain: &str) -> ResolutionResult<Option<String>> {
        delegate!(self, await resolver(domain))
    }

    async fn addr(&self, domain: &str, ticker: &str) -> ResolutionResult<String> {
        delegate!(self, await addr(domain, ticker))
    }

    async fn record(&self, domain: &str, key: &str) -> ResolutionResult<String> {
        delegate!(self, await record(domain, key))
    }

    async fn twitter(&self, domain: &str) -> ResolutionResult<String> {
        delegate!(self, await twitter(domain))
    }

    async fn resolve(&self, domain: &str) -> ResolutionResult<ResolutionResponse> {
        delegate!(self, await resolve(domain))
    }

    async fn reverse(&self, address: &str) -> ResolutionResult<String> {
        delegate!(self, await reverse(address))
    }
}

/// The dispatcher: routes every call to the first backend whose suffix
/// predicate accepts the domain.
///
/// ```no_run
/// use web3ns_sdk_rs::Resolution;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let resolution = Resolution::new()?;
///     let bch = resolution.addr("brad.crypto", "BCH").await?;
///     println!("BCH address: {}", bch);
///     Ok(())
/// }
/// ```
pub struct Resolution {
    services: Vec<Backend>,
}

impl Resolution {
    /// Mainnet defaults for all three blockchain backends.
    pub fn new() -> ResolutionResult<Self> {
        Self::with_sources(Sources {
            ens: Some(SourceConfig::mainnet()),
            zns: Some(SourceConfig::mainnet()),
            cns: Some(SourceConfig::mainnet()),
        })
    }

    /// Build from per-backend source configuration. Only configured backends
    /// participate in dispatch; an unknown network name fails here, before
    /// any call is made.
    pub fn with_sources(sources: Sources) -> ResolutionResult<Self> {
        let mut services = Vec::new();

        if let Some(config) = sources.ens {
            services.push(Backend::Ens(Ens::new(config)?));
        }
        if let Some(config) = sources.zns {
            services.push(Backend::Zns(Zns::new(config)?));
        }
        if let Some(config) = sources.cns {
            services.push(Backend::Cns(Cns::new(config)?));
        }

        Ok(Self { services })
    }

    /// Resolve everything through the centralized API instead of chain nodes.
    pub fn from_api(url: Option<String>) -> Self {
        Self {
            services: vec![Backend::Udapi(UdApi::new(url))],
        }
    }

    fn find_service(&self, domain: &str) -> ResolutionResult<&Backend> {
        self.services
            .iter()
            .find(|s| s.is_supported_domain(domain))
            .ok_or_else(|| ResolutionError::UnsupportedDomain(domain.to_string()))
    }

    /// True when any configured backend claims the domain.
    pub fn is_supported_domain(&self, domain: &str) -> bool {
        self.services.iter().any(|s| s.is_supported_domain(domain))
    }

    /// Which backend would answer for this domain.
    pub fn service_name(&self, domain: &str) -> ResolutionResult<NamingServiceName> {
        Ok(self.find_service(domain)?.service_name())
    }

    /// Backend-specific namehash of the domain.
    pub fn namehash(&self, domain: &str) -> ResolutionResult<String> {
        Ok(self.find_service(domain)?.namehash(domain))
    }

    /// Hash of `label` under an already-hashed parent node. Takes an explicit
    /// service tag since there is no domain to route by. None when `parent`
    /// is not a 32-byte hex node.
    pub fn childhash(
        &self,
        parent: &str,
        label: &str,
        service: NamingServiceName,
    ) -> Option<String> {
        let parent = from_hex(parent)?;
        let node = match service {
            NamingServiceName::Zns => zil_childhash(&parent, label),
            _ => eth_childhash(&parent, label),
        };
        Some(to_hex(&node))
    }

    /// Full resolution: owner, resolver, addresses, records, ttl.
    pub async fn resolve(&self, domain: &str) -> ResolutionResult<ResolutionResponse> {
        self.find_service(domain)?.resolve(domain).await
    }

    /// Address for a currency ticker.
    pub async fn addr(&self, domain: &str, ticker: &str) -> ResolutionResult<String> {
        self.find_service(domain)?.addr(domain, ticker).await
    }

    /// Owner address, None for an unregistered domain.
    pub async fn owner(&self, domain: &str) -> ResolutionResult<Option<String>> {
        self.find_service(domain)?.owner(domain).await
    }

    /// Resolver contract address, None when unset.
    pub async fn resolver(&self, domain: &str) -> ResolutionResult<Option<String>> {
        self.find_service(domain)?.resolver(domain).await
    }

    /// Arbitrary record lookup.
    pub async fn record(&self, domain: &str, key: &str) -> ResolutionResult<String> {
        self.find_service(domain)?.record(domain, key).await
    }

    /// Verified Twitter handle for Unstoppable domains.
    pub async fn twitter(&self, domain: &str) -> ResolutionResult<String> {
        self.find_service(domain)?.twitter(domain).await
    }

    /// Reverse lookup, address to primary domain. Routed to ENS; fails with
    /// `UnsupportedMethod` when no ENS backend is configured.
    pub async fn reverse(&self, address: &str) -> ResolutionResult<String> {
        let ens = self
            .services
            .iter()
            .find(|s| s.service_name() == NamingServiceName::Ens);

        match ens {
            Some(ens) => ens.reverse(address).await,
            None => Err(ResolutionError::UnsupportedMethod {
                method: "reverse",
                service: self
                    .services
                    .first()
                    .map(|s| s.service_name())
                    .unwrap_or(NamingServiceName::Ens),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolution() -> Resolution {
        Resolution::new().unwrap()
    }

    #[test]
    fn test_suffix_dispatch() {
        let r = resolution();
        assert_eq!(
            r.service_name("vitalik.eth").unwrap(),
            NamingServiceName::Ens
        );
        assert_eq!(r.service_name("brad.zil").unwrap(), NamingServiceName::Zns);
        assert_eq!(
            r.service_name("brad.crypto").unwrap(),
            NamingServiceName::Cns
        );
        assert!(matches!(
            r.service_name("example.com"),
            Err(ResolutionError::UnsupportedDomain(_))
        ));
    }

    #[test]
    fn test_is_supported_domain() {
        let r = resolution();
        assert!(r.is_supported_domain("brad.crypto"));
        assert!(r.is_supported_domain("name.luxe"));
        assert!(!r.is_supported_domain("brad.com"));
        assert!(!r.is_supported_domain(""));
    }

    #[tokio::test]
    async fn test_unsupported_domain_fails_before_network() {
        let r = resolution();
        assert!(matches!(
            r.resolve("example.com").await,
            Err(ResolutionError::UnsupportedDomain(_))
        ));
        assert!(matches!(
            r.addr("example.com", "ETH").await,
            Err(ResolutionError::UnsupportedDomain(_))
        ));
    }

    #[test]
    fn test_namehash_routes_by_backend() {
        let r = resolution();
        // keccak for .crypto, sha256 for .zil
        assert_eq!(
            r.namehash("crypto").unwrap(),
            "0x0f4a10a4f46c288cea365fcf45cccf0e9d901b945b9829ccdb54c10dc3cb7a6f"
        );
        assert_eq!(
            r.namehash("zil").unwrap(),
            "0x9915d0456b878862e822e2361da37232f626a2e47505c8795134a95d36138ed3"
        );
    }

    #[test]
    fn test_childhash_matches_namehash() {
        let r = resolution();
        let parent = r.namehash("crypto").unwrap();
        assert_eq!(
            r.childhash(&parent, "brad", NamingServiceName::Cns),
            Some(r.namehash("brad.crypto").unwrap())
        );

        let zparent = r.namehash("zil").unwrap();
        assert_eq!(
            r.childhash(&zparent, "brad", NamingServiceName::Zns),
            Some(r.namehash("brad.zil").unwrap())
        );

        assert_eq!(r.childhash("0xnope", "brad", NamingServiceName::Ens), None);
    }

    #[tokio::test]
    async fn test_reverse_without_ens_is_unsupported() {
        let api_only = Resolution::from_api(None);
        assert!(matches!(
            api_only.reverse("0x1234").await,
            Err(ResolutionError::UnsupportedMethod {
                method: "reverse",
                ..
            })
        ));
    }

    #[test]
    fn test_api_mode_claims_ud_domains_only() {
        let api_only = Resolution::from_api(None);
        assert!(api_only.is_supported_domain("brad.crypto"));
        assert!(api_only.is_supported_domain("brad.zil"));
        assert!(!api_only.is_supported_domain("vitalik.eth"));
    }

    #[test]
    fn test_with_sources_subset() {
        let zns_only = Resolution::with_sources(Sources {
            ens: None,
            zns: Some(SourceConfig::mainnet()),
            cns: None,
        })
        .unwrap();
        assert!(zns_only.is_supported_domain("brad.zil"));
        assert!(!zns_only.is_supported_domain("brad.crypto"));
    }

    #[test]
    fn test_with_sources_unknown_network_fails() {
        let result = Resolution::with_sources(Sources {
            ens: Some(SourceConfig {
                network: "moonnet".to_string(),
                url: None,
                registry: None,
            }),
            zns: None,
            cns: None,
        });
        assert!(matches!(
            result,
            Err(ResolutionError::UnsupportedNetwork(_))
        ));
    }
}
