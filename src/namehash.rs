//! Namehash primitives shared by the backends.
//!
//! ENS and CNS use the EIP-137 keccak256 construction; ZNS uses the same
//! recursion over sha256. The empty domain hashes to 32 zero bytes on both.

use sha2::{Digest, Sha256};
use sha3::Keccak256;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

fn namehash_with(domain: &str, hash: fn(&[u8]) -> [u8; 32]) -> [u8; 32] {
    let mut node = [0u8; 32];
    if domain.is_empty() {
        return node;
    }
    let lowered = domain.to_lowercase();
    for label in lowered.rsplit('.') {
        node = childhash_with(&node, label, hash);
    }
    node
}

fn childhash_with(parent: &[u8; 32], label: &str, hash: fn(&[u8]) -> [u8; 32]) -> [u8; 32] {
    // labels hash lowercased, same as full domains
    let label_hash = hash(label.to_lowercase().as_bytes());
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(parent);
    buf[32..].copy_from_slice(&label_hash);
    hash(&buf)
}

/// EIP-137 namehash (ENS and CNS)
pub fn eth_namehash(domain: &str) -> [u8; 32] {
    namehash_with(domain, keccak256)
}

pub fn eth_childhash(parent: &[u8; 32], label: &str) -> [u8; 32] {
    childhash_with(parent, label, keccak256)
}

/// ZNS namehash, the same recursion over sha256
pub fn zil_namehash(domain: &str) -> [u8; 32] {
    namehash_with(domain, sha256)
}

pub fn zil_childhash(parent: &[u8; 32], label: &str) -> [u8; 32] {
    childhash_with(parent, label, sha256)
}

/// Format a node as a 0x-prefixed hex string
pub fn to_hex(hash: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Parse a 0x-prefixed (or bare) 64-char hex node
pub fn from_hex(s: &str) -> Option<[u8; 32]> {
    let raw = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(raw).ok()?;
    bytes.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_domain_is_zero_node() {
        assert_eq!(eth_namehash(""), [0u8; 32]);
        assert_eq!(zil_namehash(""), [0u8; 32]);
    }

    // Published EIP-137 vectors
    #[test]
    fn test_eth_namehash_vectors() {
        assert_eq!(
            to_hex(&eth_namehash("eth")),
            "0x93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
        );
        assert_eq!(
            to_hex(&eth_namehash("foo.eth")),
            "0xde9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"
        );
    }

    #[test]
    fn test_crypto_namehash_vectors() {
        assert_eq!(
            to_hex(&eth_namehash("crypto")),
            "0x0f4a10a4f46c288cea365fcf45cccf0e9d901b945b9829ccdb54c10dc3cb7a6f"
        );
        assert_eq!(
            to_hex(&eth_namehash("brad.crypto")),
            "0x756e4e998dbffd803c21d23b06cd855cdc7a4b57706c95964a37e24b47c10fc9"
        );
    }

    #[test]
    fn test_zil_namehash_vector() {
        assert_eq!(
            to_hex(&zil_namehash("zil")),
            "0x9915d0456b878862e822e2361da37232f626a2e47505c8795134a95d36138ed3"
        );
    }

    #[test]
    fn test_namehash_is_case_insensitive() {
        assert_eq!(eth_namehash("Brad.Crypto"), eth_namehash("brad.crypto"));
    }

    #[test]
    fn test_childhash_matches_namehash() {
        let parent = eth_namehash("crypto");
        assert_eq!(
            eth_childhash(&parent, "brad"),
            eth_namehash("brad.crypto")
        );

        let zparent = zil_namehash("zil");
        assert_eq!(zil_childhash(&zparent, "brad"), zil_namehash("brad.zil"));
    }

    #[test]
    fn test_childhash_lowercases_labels() {
        let parent = eth_namehash("crypto");
        assert_eq!(eth_childhash(&parent, "Brad"), eth_namehash("Brad.crypto"));
        assert_eq!(eth_childhash(&parent, "Brad"), eth_namehash("brad.crypto"));

        let zparent = zil_namehash("zil");
        assert_eq!(zil_childhash(&zparent, "BRAD"), zil_namehash("brad.zil"));
    }

    #[test]
    fn test_hex_round_trip() {
        let node = eth_namehash("foo.eth");
        assert_eq!(from_hex(&to_hex(&node)), Some(node));
        assert_eq!(from_hex("0x1234"), None);
    }
}
