use crate::error::{ResolutionError, ResolutionResult};
use crate::models::{JsonRpcRequest, JsonRpcResponse};
use crate::namehash::keccak256;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;

/// Thin JSON-RPC transport shared by the ENS, ZNS and CNS backends.
///
/// Every transport-level failure — fetch errors, non-2xx statuses, malformed
/// envelopes, node-side error objects such as rate limits — is remapped to
/// `NamingServiceDown` here. A contract revert is not a transport failure and
/// surfaces as `Ok(None)` from [`JsonRpcProvider::eth_call`].
#[derive(Clone)]
pub struct JsonRpcProvider {
    client: Client,
    url: String,
}

impl JsonRpcProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue a single JSON-RPC call. `Ok(None)` means the node answered with
    /// a null result, which some APIs use for "no such entry".
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> ResolutionResult<Option<T>> {
        let request = JsonRpcRequest::new(method, params);

        tracing::debug!("JSON-RPC {} -> {}", method, self.url);

        let response = self.client.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(ResolutionError::NamingServiceDown(format!(
                "HTTP {} from {}",
                response.status(),
                self.url
            )));
        }

        let envelope: JsonRpcResponse<T> = response.json().await?;

        if let Some(err) = envelope.error {
            return match normalize_rpc_error(err) {
                Some(err) => Err(err),
                None => Ok(None),
            };
        }

        Ok(envelope.result)
    }

    /// `eth_call` against `to` with prebuilt calldata. `Ok(None)` when the
    /// call reverted or returned no data.
    pub async fn eth_call(&self, to: &str, data: String) -> ResolutionResult<Option<Vec<u8>>> {
        let params = json!([{ "to": to, "data": data }, "latest"]);

        let result: Option<String> = self.call("eth_call", params).await?;

        let Some(result) = result else {
            return Ok(None);
        };

        let raw = result.strip_prefix("0x").unwrap_or(&result);
        if raw.is_empty() {
            return Ok(None);
        }

        let bytes = hex::decode(raw).map_err(|e| {
            ResolutionError::NamingServiceDown(format!("bad eth_call payload: {}", e))
        })?;
        Ok(Some(bytes))
    }

    /// Zilliqa `GetSmartContractSubState`. `Ok(None)` when the substate entry
    /// does not exist.
    pub async fn zil_sub_state(
        &self,
        contract: &str,
        field: &str,
        keys: Vec<String>,
    ) -> ResolutionResult<Option<serde_json::Value>> {
        let address = contract
            .strip_prefix("0x")
            .unwrap_or(contract)
            .to_lowercase();
        let params = json!([address, field, keys]);

        let state: Option<serde_json::Value> =
            self.call("GetSmartContractSubState", params).await?;

        // Zilliqa answers literal null both for a missing contract and a
        // missing substate key.
        Ok(state.filter(|v| !v.is_null()))
    }
}

/// Classify a node-side error object. A revert is a domain-level "no answer"
/// (None); everything else the node reports — rate limits included — is a
/// service failure.
fn normalize_rpc_error(err: crate::models::JsonRpcError) -> Option<ResolutionError> {
    if err.message.to_lowercase().contains("revert") {
        return None;
    }
    Some(ResolutionError::NamingServiceDown(format!(
        "RPC error {}: {}",
        err.code, err.message
    )))
}

/// 4-byte function selector: keccak256 of the canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// The handful of ABI parameter shapes the registries and resolvers take.
pub enum Param<'a> {
    /// bytes32 node / uint256 token id (same 32-byte word on the wire)
    Word(&'a [u8; 32]),
    /// dynamic string
    Str(&'a str),
}

fn u64_word(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// uint256 word for a small integer (coin types fit comfortably)
pub fn uint_word(value: u64) -> [u8; 32] {
    u64_word(value)
}

/// Build 0x-hex calldata: selector, static head words, dynamic tails.
pub fn encode_call(signature: &str, params: &[Param<'_>]) -> String {
    let head_len = 32 * params.len();
    let mut head: Vec<u8> = Vec::with_capacity(head_len);
    let mut tail: Vec<u8> = Vec::new();

    for param in params {
        match param {
            Param::Word(word) => head.extend_from_slice(*word),
            Param::Str(s) => {
                let offset = head_len + tail.len();
                head.extend_from_slice(&u64_word(offset as u64));
                tail.extend_from_slice(&u64_word(s.len() as u64));
                tail.extend_from_slice(s.as_bytes());
                let pad = (32 - s.len() % 32) % 32;
                tail.resize(tail.len() + pad, 0);
            }
        }
    }

    format!(
        "0x{}{}{}",
        hex::encode(selector(signature)),
        hex::encode(head),
        hex::encode(tail)
    )
}

/// Decode a single returned address word. None for the zero address.
pub fn decode_address(ret: &[u8]) -> Option<String> {
    let word = ret.get(..32)?;
    let addr = &word[12..32];
    if addr.iter().all(|b| *b == 0) {
        return None;
    }
    Some(format!("0x{}", hex::encode(addr)))
}

/// Decode a returned uint256 word into u64, saturating on overflow.
pub fn decode_uint(ret: &[u8]) -> Option<u64> {
    let word = ret.get(..32)?;
    if word[..24].iter().any(|b| *b != 0) {
        return Some(u64::MAX);
    }
    Some(u64::from_be_bytes(word[24..32].try_into().ok()?))
}

/// Decode dynamic `bytes` return data. None on truncated or malformed data.
pub fn decode_bytes(ret: &[u8]) -> Option<Vec<u8>> {
    let offset = usize::try_from(decode_uint(ret.get(..32)?)?).ok()?;
    let data_start = offset.checked_add(32)?;
    let len = usize::try_from(decode_uint(ret.get(offset..data_start)?)?).ok()?;
    let data_end = data_start.checked_add(len)?;
    ret.get(data_start..data_end).map(|b| b.to_vec())
}

/// Decode a dynamic `string` return. None when absent or not UTF-8.
pub fn decode_string(ret: &[u8]) -> Option<String> {
    let bytes = decode_bytes(ret)?;
    String::from_utf8(bytes).ok()
}
