use thiserror::Error;

use crate::models::NamingServiceName;

pub type ResolutionResult<T> = Result<T, ResolutionError>;

/// Errors surfaced by domain resolution.
///
/// Support checks (`UnsupportedDomain`, `UnsupportedNetwork`,
/// `UnsupportedCurrency`) fail before any network call is made. Transport
/// failures of any backend are normalized to `NamingServiceDown` at the
/// provider boundary; everything else propagates unchanged.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("Domain {0} is not supported by any configured naming service")]
    UnsupportedDomain(String),

    #[error("Network {0} is not supported")]
    UnsupportedNetwork(String),

    #[error("Domain {0} is not registered")]
    UnregisteredDomain(String),

    #[error("Domain {0} has an owner but no resolver configured")]
    UnspecifiedResolver(String),

    #[error("Currency ticker is empty")]
    UnspecifiedCurrency,

    #[error("Currency {0} has no known coin-type mapping")]
    UnsupportedCurrency(String),

    #[error("No record {key} found for domain {domain}")]
    RecordNotFound { domain: String, key: String },

    #[error("Method {method} is not supported by {service}")]
    UnsupportedMethod {
        method: &'static str,
        service: NamingServiceName,
    },

    #[error("Naming service is down: {0}")]
    NamingServiceDown(String),

    #[error("Twitter verification failed for {0}")]
    InvalidTwitterVerification(String),
}

impl From<reqwest::Error> for ResolutionError {
    fn from(err: reqwest::Error) -> Self {
        ResolutionError::NamingServiceDown(err.to_string())
    }
}

impl From<serde_json::Error> for ResolutionError {
    fn from(err: serde_json::Error) -> Self {
        ResolutionError::NamingServiceDown(format!("malformed response: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JsonRpcResponse;

    #[test]
    fn test_malformed_json_maps_to_service_down() {
        let parse_err =
            serde_json::from_str::<JsonRpcResponse<String>>("not json").unwrap_err();
        let err = ResolutionError::from(parse_err);
        assert!(matches!(err, ResolutionError::NamingServiceDown(_)));
        assert!(err.to_string().contains("malformed response"));
    }
}
