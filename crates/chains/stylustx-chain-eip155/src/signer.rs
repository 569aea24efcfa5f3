//! Local private-key signer for authorizations.

use alloy_primitives::{Address, B256, Signature};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use stylustx_types::signer::{AuthorizationSigner, SignerError};

/// Signs authorization digests with an in-memory secp256k1 key.
///
/// Signs the digest as-is with `sign_hash`. Never route it through personal-message
/// signing: the EIP-191 prefix changes the hash and the paymaster recovers a
/// different address.
#[derive(Clone, Debug)]
pub struct LocalAuthorizationSigner(PrivateKeySigner);

impl LocalAuthorizationSigner {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self(signer)
    }

    /// Parses a hex private key, with or without `0x`.
    pub fn from_hex(pk_hex: &str) -> Result<Self, SignerError> {
        let pk_hex = pk_hex.trim().trim_start_matches("0x");
        let signer: PrivateKeySigner = pk_hex
            .parse()
            .map_err(|_| SignerError::Backend("invalid private key hex".into()))?;
        Ok(Self(signer))
    }

    pub fn inner(&self) -> &PrivateKeySigner {
        &self.0
    }
}

impl From<PrivateKeySigner> for LocalAuthorizationSigner {
    fn from(value: PrivateKeySigner) -> Self {
        Self(value)
    }
}

#[async_trait::async_trait]
impl AuthorizationSigner for LocalAuthorizationSigner {
    fn address(&self) -> Address {
        self.0.address()
    }

    async fn sign_digest(&self, digest: &B256) -> Result<Signature, SignerError> {
        self.0
            .sign_hash_sync(digest)
            .map_err(|e| SignerError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, keccak256};

    #[test]
    fn test_from_hex() {
        let signer = LocalAuthorizationSigner::from_hex(
            "0x0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert_eq!(
            signer.address(),
            address!("0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf")
        );
        assert!(LocalAuthorizationSigner::from_hex("not a key").is_err());
    }

    #[tokio::test]
    async fn test_signs_raw_digest() {
        let signer = LocalAuthorizationSigner::new(PrivateKeySigner::random());
        let digest = keccak256(b"digest");
        let signature = signer.sign_digest(&digest).await.unwrap();
        assert_eq!(
            signature.recover_address_from_prehash(&digest).unwrap(),
            signer.address()
        );
    }
}
