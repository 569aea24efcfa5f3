//! Capability-scoped signing interface.
//!
//! Wallets, hardware keys, and remote KMS backends all reduce to the same two
//! capabilities as far as meta-transactions are concerned: report the address whose
//! key they hold, and sign a 32-byte digest. Connection lifecycle, account switching,
//! and event listeners stay with whoever owns the wallet binding.

use alloy_primitives::{Address, B256, Signature};

/// Failure reported by a signing backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    /// The key holder declined to sign.
    #[error("Signing rejected by user: {0}")]
    Rejected(String),
    /// The backend could not be reached or failed while signing.
    #[error("Signer backend failure: {0}")]
    Backend(String),
}

/// Signs authorization digests on behalf of an actor.
///
/// Implementations receive the 32-byte authorization digest and must sign it as-is:
/// no message prefix, no re-hashing, no truncation. The paymaster recovers the signer
/// with a raw `ecrecover` over the same digest.
#[async_trait::async_trait]
pub trait AuthorizationSigner: Send + Sync {
    /// The address whose key produces the signatures.
    fn address(&self) -> Address;

    /// Signs `digest`, returning a recoverable ECDSA signature.
    async fn sign_digest(&self, digest: &B256) -> Result<Signature, SignerError>;
}

#[async_trait::async_trait]
impl<T: AuthorizationSigner + ?Sized> AuthorizationSigner for std::sync::Arc<T> {
    fn address(&self) -> Address {
        (**self).address()
    }

    async fn sign_digest(&self, digest: &B256) -> Result<Signature, SignerError> {
        (**self).sign_digest(digest).await
    }
}
