use crate::error::{ResolutionError, ResolutionResult};
use crate::models::{NamingServiceName, ResolutionResponse, NULL_ADDRESS};
use crate::namehash::{eth_namehash, to_hex, zil_namehash};
use crate::naming_service::{checked_coin_type, valid_labels, NamingService};
use reqwest::Client;
use std::collections::HashMap;

const DEFAULT_API_URL: &str = "https://unstoppabledomains.com/api/v1";

/// Centralized Unstoppable Domains resolution API. Covers the same domain
/// space as CNS + ZNS without talking to a chain node.
pub struct UdApi {
    client: Client,
    base_url: String,
}

impl UdApi {
    pub fn new(url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, domain: &str) -> ResolutionResult<serde_json::Value> {
        let url = format!("{}/{}", self.base_url, domain);

        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ResolutionError::NamingServiceDown(format!(
                "HTTP {} from resolution API",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}

fn api_owner(body: &serde_json::Value) -> Option<String> {
    body.get("meta")
        .and_then(|m| m.get("owner"))
        .and_then(|o| o.as_str())
        .filter(|o| !o.is_empty() && !o.eq_ignore_ascii_case(NULL_ADDRESS))
        .map(String::from)
}

fn api_addresses(body: &serde_json::Value) -> HashMap<String, String> {
    let mut addresses = HashMap::new();
    if let Some(map) = body.get("addresses").and_then(|a| a.as_object()) {
        for (ticker, value) in map {
            if let Some(value) = value.as_str().filter(|v| !v.is_empty()) {
                addresses.insert(ticker.to_ascii_uppercase(), value.to_string());
            }
        }
    }
    addresses
}

/// Flatten the API answer into the dotted record keys the contract backends
/// use, so `record` behaves the same no matter which backend answered.
fn api_records(body: &serde_json::Value) -> HashMap<String, String> {
    let mut records = HashMap::new();

    if let Some(map) = body.get("records").and_then(|r| r.as_object()) {
        for (key, value) in map {
            if let Some(value) = value.as_str() {
                records.insert(key.clone(), value.to_string());
            }
        }
    }

    for (group, suffix) in [("ipfs", "value"), ("whois", "value"), ("social", "username")] {
        if let Some(map) = body.get(group).and_then(|g| g.as_object()) {
            for (key, value) in map {
                if let Some(value) = value.as_str().filter(|v| !v.is_empty()) {
                    records.insert(format!("{}.{}.{}", group, key, suffix), value.to_string());
                }
            }
        }
    }

    records
}

/// Same failure ladder as `addr`/`record`: unregistered before unverified.
fn twitter_from_body(domain: &str, body: &serde_json::Value) -> ResolutionResult<String> {
    if api_owner(body).is_none() {
        return Err(ResolutionError::UnregisteredDomain(domain.to_string()));
    }

    let records = api_records(body);
    match (
        records.get("validation.social.twitter.username"),
        records.get("social.twitter.username"),
    ) {
        (Some(_), Some(username)) => Ok(username.clone()),
        _ => Err(ResolutionError::InvalidTwitterVerification(
            domain.to_string(),
        )),
    }
}

impl NamingService for UdApi {
    fn service_name(&self) -> NamingServiceName {
        NamingServiceName::Udapi
    }

    fn is_supported_domain(&self, domain: &str) -> bool {
        valid_labels(domain)
            && matches!(domain.rsplit('.').next(), Some("crypto") | Some("zil"))
    }

    /// Hash algorithm follows the suffix: sha256 for .zil, keccak otherwise.
    fn namehash(&self, domain: &str) -> String {
        if domain.rsplit('.').next() == Some("zil") {
            to_hex(&zil_namehash(domain))
        } else {
            to_hex(&eth_namehash(domain))
        }
    }

    async fn owner(&self, domain: &str) -> ResolutionResult<Option<String>> {
        let body = self.fetch(domain).await?;
        Ok(api_owner(&body))
    }

    async fn resolver(&self, domain: &str) -> ResolutionResult<Option<String>> {
        let body = self.fetch(domain).await?;
        Ok(body
            .get("meta")
            .and_then(|m| m.get("resolver"))
            .and_then(|r| r.as_str())
            .filter(|r| !r.is_empty() && !r.eq_ignore_ascii_case(NULL_ADDRESS))
            .map(String::from))
    }

    async fn addr(&self, domain: &str, ticker: &str) -> ResolutionResult<String> {
        checked_coin_type(ticker)?;

        let body = self.fetch(domain).await?;
        if api_owner(&body).is_none() {
            return Err(ResolutionError::UnregisteredDomain(domain.to_string()));
        }

        api_addresses(&body)
            .remove(&ticker.to_ascii_uppercase())
            .ok_or_else(|| ResolutionError::RecordNotFound {
                domain: domain.to_string(),
                key: format!("crypto.{}.address", ticker.to_ascii_uppercase()),
            })
    }

    async fn record(&self, domain: &str, key: &str) -> ResolutionResult<String> {
        let body = self.fetch(domain).await?;
        if api_owner(&body).is_none() {
            return Err(ResolutionError::UnregisteredDomain(domain.to_string()));
        }

        api_records(&body)
            .remove(key)
            .ok_or_else(|| ResolutionError::RecordNotFound {
                domain: domain.to_string(),
                key: key.to_string(),
            })
    }

    async fn twitter(&self, domain: &str) -> ResolutionResult<String> {
        let body = self.fetch(domain).await?;
        twitter_from_body(domain, &body)
    }

    async fn resolve(&self, domain: &str) -> ResolutionResult<ResolutionResponse> {
        tracing::info!("Resolving {} via the resolution API", domain);

        let body = self.fetch(domain).await?;

        let Some(owner) = api_owner(&body) else {
            tracing::debug!("{} is unregistered", domain);
            return Ok(ResolutionResponse::unregistered(NamingServiceName::Udapi));
        };

        let ttl = body
            .get("meta")
            .and_then(|m| m.get("ttl"))
            .and_then(|t| t.as_u64())
            .unwrap_or(0);

        Ok(ResolutionResponse {
            owner: Some(owner),
            resolver: body
                .get("meta")
                .and_then(|m| m.get("resolver"))
                .and_then(|r| r.as_str())
                .filter(|r| !r.is_empty() && !r.eq_ignore_ascii_case(NULL_ADDRESS))
                .map(String::from),
            addresses: api_addresses(&body),
            records: api_records(&body),
            ttl,
            service: NamingServiceName::Udapi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_supported_domains() {
        let api = UdApi::new(None);
        assert!(api.is_supported_domain("brad.crypto"));
        assert!(api.is_supported_domain("brad.zil"));
        assert!(!api.is_supported_domain("vitalik.eth"));
        assert_eq!(api.base_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_namehash_dispatches_by_suffix() {
        let api = UdApi::new(None);
        assert_eq!(
            api.namehash("zil"),
            "0x9915d0456b878862e822e2361da37232f626a2e47505c8795134a95d36138ed3"
        );
        assert_eq!(
            api.namehash("crypto"),
            "0x0f4a10a4f46c288cea365fcf45cccf0e9d901b945b9829ccdb54c10dc3cb7a6f"
        );
    }

    #[test]
    fn test_api_body_parsing() {
        let body = json!({
            "addresses": { "BCH": "qzx048ez005q4yhphqu2pylpfc3hy88zzu4lu6q9j8", "eth": "0x1111111111111111111111111111111111111111" },
            "meta": { "owner": "0x2222222222222222222222222222222222222222", "ttl": 300 },
            "ipfs": { "html": "QmRoot" },
            "whois": { "email": "a@b.c" }
        });

        assert_eq!(
            api_owner(&body),
            Some("0x2222222222222222222222222222222222222222".to_string())
        );

        let addresses = api_addresses(&body);
        assert_eq!(
            addresses.get("BCH").map(String::as_str),
            Some("qzx048ez005q4yhphqu2pylpfc3hy88zzu4lu6q9j8")
        );
        // tickers are normalized to upper case
        assert!(addresses.contains_key("ETH"));

        let records = api_records(&body);
        assert_eq!(records.get("ipfs.html.value").map(String::as_str), Some("QmRoot"));
        assert_eq!(records.get("whois.email.value").map(String::as_str), Some("a@b.c"));
    }

    #[test]
    fn test_twitter_failure_ladder() {
        // no owner: unregistered wins over unverified
        let unregistered = json!({ "meta": {} });
        assert!(matches!(
            twitter_from_body("brad.crypto", &unregistered),
            Err(ResolutionError::UnregisteredDomain(_))
        ));

        // owner present but no validation record
        let unverified = json!({
            "meta": { "owner": "0x2222222222222222222222222222222222222222" },
            "social": { "twitter": "brad" }
        });
        assert!(matches!(
            twitter_from_body("brad.crypto", &unverified),
            Err(ResolutionError::InvalidTwitterVerification(_))
        ));

        // both records present
        let verified = json!({
            "meta": { "owner": "0x2222222222222222222222222222222222222222" },
            "records": {
                "validation.social.twitter.username": "0xsig",
                "social.twitter.username": "brad"
            }
        });
        assert_eq!(
            twitter_from_body("brad.crypto", &verified).unwrap(),
            "brad"
        );
    }

    #[test]
    fn test_null_owner_means_unregistered() {
        let body = json!({ "meta": { "owner": NULL_ADDRESS } });
        assert_eq!(api_owner(&body), None);
        let body = json!({ "meta": {} });
        assert_eq!(api_owner(&body), None);
    }

    #[tokio::test]
    async fn test_reverse_is_unsupported() {
        let api = UdApi::new(None);
        let result = api.reverse("0x1234").await;
        assert!(matches!(
            result,
            Err(ResolutionError::UnsupportedMethod {
                method: "reverse",
                service: NamingServiceName::Udapi,
            })
        ));
    }
}
