use crate::error::{ResolutionError, ResolutionResult};
use crate::models::{NamingServiceName, ResolutionResponse};

/// Capability set every naming-service backend implements.
///
/// Dispatch is static through the backend enum in `resolution`, so the async
/// methods never go through a vtable.
#[allow(async_fn_in_trait)]
pub trait NamingService {
    fn service_name(&self) -> NamingServiceName;

    /// Suffix + label syntax check. Never touches the network.
    fn is_supported_domain(&self, domain: &str) -> bool;

    /// 0x-hex node for this backend's hash algorithm.
    fn namehash(&self, domain: &str) -> String;

    /// Owner address; None when the registry holds the null address.
    async fn owner(&self, domain: &str) -> ResolutionResult<Option<String>>;

    /// Resolver contract address; None when no resolver is configured.
    async fn resolver(&self, domain: &str) -> ResolutionResult<Option<String>>;

    /// Address for a currency ticker.
    async fn addr(&self, domain: &str, ticker: &str) -> ResolutionResult<String>;

    /// Arbitrary record lookup.
    async fn record(&self, domain: &str, key: &str) -> ResolutionResult<String>;

    /// Full resolution: owner, resolver, address map, record map, ttl.
    /// An unregistered domain yields nulls and empty maps, never an error.
    async fn resolve(&self, domain: &str) -> ResolutionResult<ResolutionResponse>;

    /// Verified Twitter handle. Only backends carrying Unstoppable
    /// validation records override this.
    async fn twitter(&self, domain: &str) -> ResolutionResult<String> {
        let _ = domain;
        Err(ResolutionError::UnsupportedMethod {
            method: "twitter",
            service: self.service_name(),
        })
    }

    /// Reverse lookup, address to primary domain. ENS-specific.
    async fn reverse(&self, address: &str) -> ResolutionResult<String> {
        let _ = address;
        Err(ResolutionError::UnsupportedMethod {
            method: "reverse",
            service: self.service_name(),
        })
    }
}

/// Basic syntax check shared by the suffix predicates: non-empty labels of
/// ASCII alphanumerics and hyphens.
pub(crate) fn valid_labels(domain: &str) -> bool {
    !domain.is_empty()
        && domain.split('.').all(|label| {
            !label.is_empty()
                && label
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Fail-fast ticker validation: empty tickers and tickers without a SLIP-44
/// mapping never reach the network.
pub(crate) fn checked_coin_type(ticker: &str) -> ResolutionResult<u64> {
    if ticker.is_empty() {
        return Err(ResolutionError::UnspecifiedCurrency);
    }
    crate::models::coin_type(ticker)
        .ok_or_else(|| ResolutionError::UnsupportedCurrency(ticker.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_labels() {
        assert!(valid_labels("brad.crypto"));
        assert!(valid_labels("addr.reverse"));
        assert!(valid_labels("a-b.eth"));
        assert!(!valid_labels(""));
        assert!(!valid_labels(".eth"));
        assert!(!valid_labels("brad..crypto"));
        assert!(!valid_labels("spa ce.eth"));
    }

    #[test]
    fn test_checked_coin_type() {
        assert_eq!(checked_coin_type("BCH").unwrap(), 145);
        assert!(matches!(
            checked_coin_type(""),
            Err(ResolutionError::UnspecifiedCurrency)
        ));
        assert!(matches!(
            checked_coin_type("WAT"),
            Err(ResolutionError::UnsupportedCurrency(_))
        ));
    }
}
