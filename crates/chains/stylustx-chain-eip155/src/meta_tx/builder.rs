//! Assembling and signing authorizations.

use alloy_primitives::{Address, Bytes, U256};
use std::str::FromStr;
use std::sync::Arc;
use stylustx_types::authorization::{Authorization, SignedAuthorization};
use stylustx_types::signer::{AuthorizationSigner, SignerError};
use stylustx_types::timestamp::UnixTimestamp;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::meta_tx::encoding::authorization_digest;

/// Default lifetime of an authorization, in seconds.
///
/// Bounds how long a signature that has not yet been relayed stays usable.
pub const DEFAULT_DEADLINE_OFFSET: i64 = 5 * 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignError {
    #[error("No signer configured")]
    NoSigner,
    #[error("Signing rejected: {0}")]
    SigningRejected(String),
    /// The configured signer does not hold the actor's key; the paymaster would
    /// recover a different address and reject the call.
    #[error("Signer {actual} cannot sign for actor {expected}")]
    SignerMismatch { expected: Address, actual: Address },
}

impl From<SignerError> for SignError {
    fn from(value: SignerError) -> Self {
        match value {
            SignerError::Rejected(reason) => SignError::SigningRejected(reason),
            SignerError::Backend(reason) => SignError::SigningRejected(reason),
        }
    }
}

/// Builds authorizations and has them signed by the configured signer.
#[derive(Clone, Default)]
pub struct AuthorizationBuilder {
    signer: Option<Arc<dyn AuthorizationSigner>>,
}

impl AuthorizationBuilder {
    /// A builder without a signer; [`sign`](Self::sign) fails with [`SignError::NoSigner`].
    pub fn new() -> Self {
        Self { signer: None }
    }

    pub fn with_signer<S: AuthorizationSigner + 'static>(signer: S) -> Self {
        Self {
            signer: Some(Arc::new(signer)),
        }
    }

    pub fn set_signer(&mut self, signer: Arc<dyn AuthorizationSigner>) {
        self.signer = Some(signer);
    }

    pub fn signer(&self) -> Option<&Arc<dyn AuthorizationSigner>> {
        self.signer.as_ref()
    }

    /// Assembles an authorization whose deadline is `deadline_offset_secs` from now.
    ///
    /// `current_nonce` must be the actor's nonce as just read from the paymaster.
    pub fn build(
        &self,
        actor: &str,
        target: &str,
        value: U256,
        payload: impl Into<Bytes>,
        current_nonce: U256,
        deadline_offset_secs: i64,
    ) -> Result<Authorization, BuildError> {
        self.build_at(
            actor,
            target,
            value,
            payload,
            current_nonce,
            deadline_offset_secs,
            UnixTimestamp::now(),
        )
    }

    /// [`build`](Self::build) against an explicit clock reading.
    #[allow(clippy::too_many_arguments)]
    pub fn build_at(
        &self,
        actor: &str,
        target: &str,
        value: U256,
        payload: impl Into<Bytes>,
        current_nonce: U256,
        deadline_offset_secs: i64,
        now: UnixTimestamp,
    ) -> Result<Authorization, BuildError> {
        let actor = parse_address("actor", actor)?;
        let target = parse_address("target", target)?;
        assemble(
            actor,
            target,
            value,
            payload.into(),
            current_nonce,
            deadline_offset_secs,
            now,
        )
    }

    /// Signs the authorization digest with the configured signer.
    ///
    /// The signer receives the 32-byte digest, never the encoded bytes. `authorization`
    /// is left untouched; a new signed value is returned.
    #[cfg_attr(feature = "telemetry", instrument(skip_all, err, fields(
        actor = %authorization.actor,
        nonce = %authorization.nonce
    )))]
    pub async fn sign(
        &self,
        authorization: &Authorization,
    ) -> Result<SignedAuthorization, SignError> {
        let signer = self.signer.as_ref().ok_or(SignError::NoSigner)?;
        let signer_address = signer.address();
        if signer_address != authorization.actor {
            return Err(SignError::SignerMismatch {
                expected: authorization.actor,
                actual: signer_address,
            });
        }
        let digest = authorization_digest(authorization);
        let signature = signer.sign_digest(&digest).await?;
        #[cfg(feature = "telemetry")]
        tracing::debug!(digest = %digest, "authorization signed");
        Ok(SignedAuthorization::new(authorization.clone(), signature))
    }
}

impl std::fmt::Debug for AuthorizationBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationBuilder")
            .field("signer", &self.signer.as_ref().map(|s| s.address()))
            .finish()
    }
}

/// Assembles an authorization from already-typed addresses.
pub fn assemble(
    actor: Address,
    target: Address,
    value: U256,
    payload: Bytes,
    current_nonce: U256,
    deadline_offset_secs: i64,
    now: UnixTimestamp,
) -> Result<Authorization, BuildError> {
    if deadline_offset_secs <= 0 {
        return Err(BuildError::InvalidInput(format!(
            "deadline offset must be positive, got {deadline_offset_secs}"
        )));
    }
    let deadline = now + deadline_offset_secs as u64;
    #[cfg(feature = "telemetry")]
    tracing::debug!(
        actor = %actor,
        target = %target,
        nonce = %current_nonce,
        deadline = %deadline,
        "authorization built"
    );
    Ok(Authorization {
        actor,
        target,
        value,
        payload,
        nonce: current_nonce,
        deadline: deadline.to_u256(),
    })
}

/// Accepts 40 hex digits of any case, optionally prefixed by `0x` or `0X` and
/// surrounded by whitespace. The EIP-55 checksum is not enforced.
pub(crate) fn parse_address(field: &str, raw: &str) -> Result<Address, BuildError> {
    let trimmed = raw.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if hex.len() != 40 {
        return Err(BuildError::InvalidInput(format!(
            "{field} is not a 20-byte address: {raw}"
        )));
    }
    Address::from_str(hex)
        .map_err(|_| BuildError::InvalidInput(format!("{field} is not a 20-byte address: {raw}")))
}
