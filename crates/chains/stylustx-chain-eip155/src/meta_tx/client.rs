//! High-level client tying the paymaster reader, signer, verifier and relayer together.

use alloy_primitives::{Address, Bytes, U256};
use std::sync::Arc;
use stylustx_types::authorization::{Authorization, SignedAuthorization};
use stylustx_types::outcome::ExecutionOutcome;
use stylustx_types::paymaster::{ChainError, PaymasterReader, PaymasterSubmitter};
use stylustx_types::signer::AuthorizationSigner;
use stylustx_types::state::OnChainState;
use stylustx_types::timestamp::UnixTimestamp;

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::meta_tx::builder::{AuthorizationBuilder, BuildError, SignError, assemble, parse_address};
use crate::meta_tx::relay::{RelayError, execute};
use crate::meta_tx::verifier::{VerificationError, verify_at};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetaTxError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Sign(#[from] SignError),
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error(transparent)]
    Relay(#[from] RelayError),
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Client for one paymaster deployment.
///
/// Holds no nonce cache: every operation that needs the nonce reads it from the
/// paymaster first. Callers sending several authorizations for the same actor must
/// serialize them.
pub struct MetaTxClient<R> {
    reader: R,
    builder: AuthorizationBuilder,
}

impl<R> MetaTxClient<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            builder: AuthorizationBuilder::new(),
        }
    }

    pub fn with_signer<S: AuthorizationSigner + 'static>(mut self, signer: S) -> Self {
        self.builder.set_signer(Arc::new(signer));
        self
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn builder(&self) -> &AuthorizationBuilder {
        &self.builder
    }

    /// Address of the configured signer, if any.
    pub fn signer_address(&self) -> Option<Address> {
        self.builder.signer().map(|signer| signer.address())
    }
}

impl<R: PaymasterReader> MetaTxClient<R> {
    pub async fn get_nonce(&self, actor: Address) -> Result<U256, ChainError> {
        self.reader.get_nonce(actor).await
    }

    pub async fn get_allowed_target(&self) -> Result<Address, ChainError> {
        self.reader.get_allowed_target().await
    }

    pub async fn is_initialized(&self) -> Result<bool, ChainError> {
        self.reader.is_initialized().await
    }

    pub async fn is_paused(&self) -> Result<bool, ChainError> {
        self.reader.is_paused().await
    }

    /// Reads everything the verifier needs for `actor`, concurrently.
    #[cfg_attr(feature = "telemetry", instrument(skip_all, err, fields(actor = %actor)))]
    pub async fn fetch_state(&self, actor: Address) -> Result<OnChainState, ChainError> {
        let (nonce, allowed_target, initialized, paused) = tokio::try_join!(
            self.reader.get_nonce(actor),
            self.reader.get_allowed_target(),
            self.reader.is_initialized(),
            self.reader.is_paused(),
        )?;
        Ok(OnChainState {
            initialized,
            paused,
            allowed_target,
            nonces: Default::default(),
        }
        .with_nonce(actor, nonce))
    }

    /// Reads the signer's current nonce, builds an authorization for `target` and signs it.
    #[cfg_attr(feature = "telemetry", instrument(skip_all, err, fields(target = %target)))]
    pub async fn sign_meta_transaction(
        &self,
        target: &str,
        payload: impl Into<Bytes>,
        value: U256,
        deadline_offset_secs: i64,
    ) -> Result<SignedAuthorization, MetaTxError> {
        let actor = self.signer_address().ok_or(SignError::NoSigner)?;
        let target = parse_address("target", target)?;
        let nonce = self.reader.get_nonce(actor).await?;
        let authorization = assemble(
            actor,
            target,
            value,
            payload.into(),
            nonce,
            deadline_offset_secs,
            UnixTimestamp::now(),
        )?;
        Ok(self.builder.sign(&authorization).await?)
    }

    /// Rebuilds `authorization` against the actor's current nonce and a new deadline.
    pub async fn refresh(
        &self,
        authorization: &Authorization,
        deadline_offset_secs: i64,
    ) -> Result<Authorization, MetaTxError> {
        let nonce = self.reader.get_nonce(authorization.actor).await?;
        Ok(assemble(
            authorization.actor,
            authorization.target,
            authorization.value,
            authorization.payload.clone(),
            nonce,
            deadline_offset_secs,
            UnixTimestamp::now(),
        )?)
    }

    /// Fetches fresh state and runs the local verifier.
    pub async fn verify_meta_transaction(
        &self,
        signed: &SignedAuthorization,
    ) -> Result<(), MetaTxError> {
        let state = self.fetch_state(signed.actor()).await?;
        verify_at(signed, &state, UnixTimestamp::now())?;
        Ok(())
    }

    /// Verifies `signed` against fresh state, then submits it through `relayer`.
    ///
    /// Nothing is submitted when verification fails.
    #[cfg_attr(feature = "telemetry", instrument(skip_all, err, fields(
        actor = %signed.actor(),
        nonce = %signed.nonce()
    )))]
    pub async fn relay(
        &self,
        signed: &SignedAuthorization,
        relayer: Option<&dyn PaymasterSubmitter>,
    ) -> Result<ExecutionOutcome, MetaTxError> {
        self.verify_meta_transaction(signed).await?;
        Ok(execute(signed, relayer).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta_tx::builder::DEFAULT_DEADLINE_OFFSET;
    use crate::meta_tx::encoding::recover_signer;
    use crate::meta_tx::test_utils::{MockPaymaster, TestSigner};
    use alloy_primitives::{address, bytes};

    const TARGET: Address = address!("0xbbbb000000000000000000000000000000000002");
    const TARGET_STR: &str = "0xbbbb000000000000000000000000000000000002";

    fn client() -> (MetaTxClient<Arc<MockPaymaster>>, Arc<MockPaymaster>, Address) {
        let paymaster = Arc::new(MockPaymaster::new(OnChainState::active(TARGET)));
        let signer = TestSigner::key_one();
        let actor = signer.address();
        (MetaTxClient::new(paymaster.clone()).with_signer(signer), paymaster, actor)
    }

    #[tokio::test]
    async fn test_fetch_state_reads_all_values() {
        let (client, paymaster, actor) = client();
        paymaster.set_nonce(actor, U256::from(3));
        let state = client.fetch_state(actor).await.unwrap();
        assert!(state.initialized);
        assert!(!state.paused);
        assert_eq!(state.allowed_target, TARGET);
        assert_eq!(state.current_nonce_for(&actor), U256::from(3));
    }

    #[tokio::test]
    async fn test_fetch_state_surfaces_chain_errors() {
        let (client, paymaster, actor) = client();
        paymaster.set_reads_fail(true);
        assert!(matches!(
            client.fetch_state(actor).await,
            Err(ChainError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_sign_uses_current_nonce() {
        let (client, paymaster, actor) = client();
        paymaster.set_nonce(actor, U256::from(7));
        let signed = client
            .sign_meta_transaction(TARGET_STR, bytes!("1234"), U256::ZERO, DEFAULT_DEADLINE_OFFSET)
            .await
            .unwrap();
        assert_eq!(signed.nonce(), U256::from(7));
        assert_eq!(signed.actor(), actor);
        assert_eq!(recover_signer(&signed).unwrap(), actor);
    }

    #[tokio::test]
    async fn test_sign_without_signer() {
        let paymaster = Arc::new(MockPaymaster::new(OnChainState::active(TARGET)));
        let client = MetaTxClient::new(paymaster);
        assert_eq!(
            client
                .sign_meta_transaction(TARGET_STR, Bytes::new(), U256::ZERO, 60)
                .await
                .unwrap_err(),
            MetaTxError::Sign(SignError::NoSigner)
        );
    }

    #[tokio::test]
    async fn test_relay_then_replay_is_rejected() {
        let (client, paymaster, _) = client();
        let signed = client
            .sign_meta_transaction(TARGET_STR, bytes!("1234"), U256::ZERO, DEFAULT_DEADLINE_OFFSET)
            .await
            .unwrap();
        let outcome = client.relay(&signed, Some(paymaster.as_ref())).await.unwrap();
        assert!(outcome.success);

        let replay = client.relay(&signed, Some(paymaster.as_ref())).await;
        assert!(matches!(
            replay,
            Err(MetaTxError::Verification(VerificationError::NonceMismatch { .. }))
        ));
        assert_eq!(paymaster.submissions().len(), 1);
    }

    #[tokio::test]
    async fn test_advanced_nonce_fails_before_submission() {
        let (client, paymaster, actor) = client();
        let signed = client
            .sign_meta_transaction(TARGET_STR, bytes!("1234"), U256::ZERO, DEFAULT_DEADLINE_OFFSET)
            .await
            .unwrap();
        paymaster.set_nonce(actor, U256::from(1));
        let result = client.relay(&signed, Some(paymaster.as_ref())).await;
        assert_eq!(
            result,
            Err(MetaTxError::Verification(VerificationError::NonceMismatch {
                expected: U256::from(1),
                got: U256::ZERO,
            }))
        );
        assert!(paymaster.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_relay_without_relayer() {
        let (client, _, actor) = client();
        let signed = client
            .sign_meta_transaction(TARGET_STR, Bytes::new(), U256::ZERO, 60)
            .await
            .unwrap();
        assert_eq!(
            client.relay(&signed, None).await,
            Err(MetaTxError::Relay(RelayError::NoRelayer { actor }))
        );
    }

    #[tokio::test]
    async fn test_paused_paymaster_blocks_relay() {
        let (client, paymaster, _) = client();
        let signed = client
            .sign_meta_transaction(TARGET_STR, Bytes::new(), U256::ZERO, 60)
            .await
            .unwrap();
        paymaster.set_paused(true);
        assert_eq!(
            client.relay(&signed, Some(paymaster.as_ref())).await,
            Err(MetaTxError::Verification(VerificationError::ContractPaused))
        );
    }

    #[tokio::test]
    async fn test_refresh_picks_up_new_nonce() {
        let (client, paymaster, actor) = client();
        let signed = client
            .sign_meta_transaction(TARGET_STR, bytes!("1234"), U256::ZERO, 60)
            .await
            .unwrap();
        paymaster.set_nonce(actor, U256::from(2));
        let refreshed = client.refresh(signed.authorization(), 60).await.unwrap();
        assert_eq!(refreshed.nonce, U256::from(2));
        assert_eq!(refreshed.payload, bytes!("1234"));
        assert_eq!(refreshed.target, TARGET);
    }
}
