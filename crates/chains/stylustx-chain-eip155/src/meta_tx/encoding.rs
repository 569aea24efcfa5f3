//! Canonical encoding and hashing of authorizations.
//!
//! The authorization digest is the value the actor signs and the paymaster recovers
//! against. It is computed in two keccak-256 stages:
//!
//! ```text
//! payload_hash = keccak256(payload)
//! digest       = keccak256(DOMAIN_TAG || actor || target || value || payload_hash || nonce || deadline)
//! ```
//!
//! | Field          | Width | Encoding                         |
//! |----------------|-------|----------------------------------|
//! | `DOMAIN_TAG`   | 8     | ASCII `StylusTx`                 |
//! | `actor`        | 20    | raw address bytes                |
//! | `target`       | 20    | raw address bytes                |
//! | `value`        | 32    | big-endian, zero left-padded     |
//! | `payload_hash` | 32    | keccak-256 of the call data      |
//! | `nonce`        | 32    | big-endian, zero left-padded     |
//! | `deadline`     | 32    | big-endian, zero left-padded     |
//!
//! There are no length prefixes or delimiters. This layout is a wire contract with the
//! deployed paymaster's `compute_hash`: changing the order, a width, or the tag
//! invalidates every outstanding signature, and the failure is silent (signatures
//! recover to the wrong address).

use alloy_primitives::{Address, B256, Bytes, SignatureError, keccak256};
use serde::{Deserialize, Serialize};
use stylustx_types::authorization::{Authorization, SignedAuthorization};

/// Domain separation tag shared with the on-chain verifier.
pub const DOMAIN_TAG: &[u8] = b"StylusTx";

/// Length in bytes of every canonical encoding.
pub const ENCODED_LEN: usize = DOMAIN_TAG.len() + 20 + 20 + 32 + 32 + 32 + 32;

/// keccak-256 of the call data.
pub fn payload_hash(payload: &[u8]) -> B256 {
    keccak256(payload)
}

/// The canonical byte sequence of `authorization`.
pub fn encode(authorization: &Authorization) -> Vec<u8> {
    let mut message = Vec::with_capacity(ENCODED_LEN);
    message.extend_from_slice(DOMAIN_TAG);
    message.extend_from_slice(authorization.actor.as_slice());
    message.extend_from_slice(authorization.target.as_slice());
    message.extend_from_slice(&authorization.value.to_be_bytes::<32>());
    message.extend_from_slice(payload_hash(&authorization.payload).as_slice());
    message.extend_from_slice(&authorization.nonce.to_be_bytes::<32>());
    message.extend_from_slice(&authorization.deadline.to_be_bytes::<32>());
    message
}

/// The 32-byte digest the actor signs.
pub fn authorization_digest(authorization: &Authorization) -> B256 {
    keccak256(encode(authorization))
}

/// Recovers the address that signed `signed`'s authorization digest.
///
/// A signature over anything other than the canonical digest recovers to an
/// unrelated address; compare the result with the actor.
pub fn recover_signer(signed: &SignedAuthorization) -> Result<Address, SignatureError> {
    let digest = authorization_digest(signed.authorization());
    signed.recover_from_digest(&digest)
}

/// All intermediate values of the encoding, for cross-checking against other
/// implementations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedAuthorization {
    pub payload_hash: B256,
    pub encoded: Bytes,
    pub digest: B256,
}

impl EncodedAuthorization {
    pub fn new(authorization: &Authorization) -> Self {
        let encoded = encode(authorization);
        let digest = keccak256(&encoded);
        Self {
            payload_hash: payload_hash(&authorization.payload),
            encoded: Bytes::from(encoded),
            digest,
        }
    }
}
