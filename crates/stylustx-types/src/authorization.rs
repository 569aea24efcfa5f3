//! Authorization records exchanged between the actor, the relayer, and the paymaster.
//!
//! An [`Authorization`] names who grants permission (`actor`), which contract may be
//! invoked (`target`), what is sent along (`value`, `payload`), and the replay/expiry
//! guards (`nonce`, `deadline`). Once the actor signs its digest the record becomes a
//! [`SignedAuthorization`], which is immutable and is executed at most once.
//!
//! # Wire format
//!
//! Both types serialize as flat JSON objects with camelCase keys:
//!
//! ```json
//! {
//!   "actor": "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf",
//!   "target": "0xbbbb000000000000000000000000000000000002",
//!   "value": "0x0",
//!   "payload": "0x1234",
//!   "nonce": "0x0",
//!   "deadline": "0x6553f22c",
//!   "v": 27,
//!   "r": "0x...",
//!   "s": "0x..."
//! }
//! ```

use alloy_primitives::{Address, B256, Bytes, Signature, SignatureError, U256};
use serde::{Deserialize, Serialize};

/// An unsigned meta-transaction authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    /// The account granting permission.
    pub actor: Address,
    /// The contract allowed to be invoked.
    pub target: Address,
    /// Native-currency amount forwarded with the call (may be zero).
    pub value: U256,
    /// Opaque call data for `target`.
    pub payload: Bytes,
    /// The actor's current on-chain nonce, fetched from the paymaster.
    pub nonce: U256,
    /// Unix seconds after which the authorization is void.
    pub deadline: U256,
}

/// An [`Authorization`] together with the actor's `(v, r, s)` signature over its digest.
///
/// `v` is always held in the `{27, 28}` form. Signatures carrying a bare recovery id
/// (`0` or `1`) are normalised on construction and on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SignedAuthorizationWire", into = "SignedAuthorizationWire")]
pub struct SignedAuthorization {
    authorization: Authorization,
    v: u8,
    r: B256,
    s: B256,
}

impl SignedAuthorization {
    /// Attaches a signature produced over the authorization digest.
    pub fn new(authorization: Authorization, signature: Signature) -> Self {
        Self {
            authorization,
            v: 27 + (signature.v() as u8),
            r: B256::from(signature.r()),
            s: B256::from(signature.s()),
        }
    }

    /// Assembles a signed authorization from raw signature components.
    pub fn from_parts(authorization: Authorization, v: u8, r: B256, s: B256) -> Self {
        Self {
            authorization,
            v: normalize_v(v),
            r,
            s,
        }
    }

    /// The authorization that was signed.
    pub fn authorization(&self) -> &Authorization {
        &self.authorization
    }

    pub fn actor(&self) -> Address {
        self.authorization.actor
    }

    pub fn target(&self) -> Address {
        self.authorization.target
    }

    pub fn value(&self) -> U256 {
        self.authorization.value
    }

    pub fn payload(&self) -> &Bytes {
        &self.authorization.payload
    }

    pub fn nonce(&self) -> U256 {
        self.authorization.nonce
    }

    pub fn deadline(&self) -> U256 {
        self.authorization.deadline
    }

    /// Recovery identifier, `27` or `28`.
    pub fn v(&self) -> u8 {
        self.v
    }

    /// Big-endian `r` component.
    pub fn r(&self) -> B256 {
        self.r
    }

    /// Big-endian `s` component.
    pub fn s(&self) -> B256 {
        self.s
    }

    /// The signature as an alloy [`Signature`].
    pub fn signature(&self) -> Signature {
        let y_parity = self.v.wrapping_sub(27) & 1 == 1;
        Signature::new(
            U256::from_be_bytes(self.r.0),
            U256::from_be_bytes(self.s.0),
            y_parity,
        )
    }

    /// The 65-byte `r || s || v` encoding of the signature.
    pub fn signature_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(self.r.as_slice());
        bytes[32..64].copy_from_slice(self.s.as_slice());
        bytes[64] = self.v;
        bytes
    }

    /// Recovers the address that produced this signature over `digest`.
    ///
    /// `digest` must be the authorization digest; recovering over any other value
    /// yields an unrelated address rather than an error.
    pub fn recover_from_digest(&self, digest: &B256) -> Result<Address, SignatureError> {
        self.signature().recover_address_from_prehash(digest)
    }

    /// Drops the signature and returns the underlying authorization.
    pub fn into_authorization(self) -> Authorization {
        self.authorization
    }
}

fn normalize_v(v: u8) -> u8 {
    if v < 27 { v + 27 } else { v }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignedAuthorizationWire {
    #[serde(flatten)]
    authorization: Authorization,
    v: u8,
    r: B256,
    s: B256,
}

impl From<SignedAuthorizationWire> for SignedAuthorization {
    fn from(wire: SignedAuthorizationWire) -> Self {
        SignedAuthorization::from_parts(wire.authorization, wire.v, wire.r, wire.s)
    }
}

impl From<SignedAuthorization> for SignedAuthorizationWire {
    fn from(signed: SignedAuthorization) -> Self {
        Self {
            authorization: signed.authorization,
            v: signed.v,
            r: signed.r,
            s: signed.s,
        }
    }
}
