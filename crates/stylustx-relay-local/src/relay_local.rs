//! The relayer service behind the HTTP handlers.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stylustx_chain_eip155::meta_tx::{
    DOMAIN_TAG, EncodedAuthorization, MetaTxClient, MetaTxError, RelayError, VerificationError,
};
use stylustx_types::authorization::{Authorization, SignedAuthorization};
use stylustx_types::chain::ChainId;
use stylustx_types::networks::network_by_chain_id;
use stylustx_types::outcome::ExecutionOutcome;
use stylustx_types::paymaster::{ChainError, PaymasterReader, PaymasterSubmitter};

#[cfg(feature = "telemetry")]
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayLocalError {
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Relay(#[from] RelayError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<MetaTxError> for RelayLocalError {
    fn from(value: MetaTxError) -> Self {
        match value {
            MetaTxError::Verification(e) => RelayLocalError::Verification(e),
            MetaTxError::Chain(e) => RelayLocalError::Chain(e),
            MetaTxError::Relay(e) => RelayLocalError::Relay(e),
            MetaTxError::Build(e) => RelayLocalError::Internal(e.to_string()),
            MetaTxError::Sign(e) => RelayLocalError::Internal(e.to_string()),
        }
    }
}

/// Public description of this relayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayInfo {
    pub chain_id: ChainId,
    pub paymaster: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relayer: Option<Address>,
    pub domain_tag: String,
}

/// Result of `/verify`. A failed check is a normal answer, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerifyResponse {
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn invalid(reason: &VerificationError) -> Self {
        Self {
            valid: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Verifies and relays signed authorizations for one paymaster deployment.
///
/// Reads go through `reader`; submissions go through `submitter`, which holds the
/// relayer's funded credential. Without a submitter the service still answers
/// `/digest` and `/verify`, and `/relay` fails with [`RelayError::NoRelayer`].
pub struct RelayLocal {
    chain_id: ChainId,
    paymaster: Address,
    client: MetaTxClient<Arc<dyn PaymasterReader>>,
    submitter: Option<Arc<dyn PaymasterSubmitter>>,
}

impl RelayLocal {
    pub fn new(chain_id: ChainId, paymaster: Address, reader: Arc<dyn PaymasterReader>) -> Self {
        Self {
            chain_id,
            paymaster,
            client: MetaTxClient::new(reader),
            submitter: None,
        }
    }

    pub fn with_submitter(mut self, submitter: Arc<dyn PaymasterSubmitter>) -> Self {
        self.submitter = Some(submitter);
        self
    }

    pub fn info(&self) -> RelayInfo {
        RelayInfo {
            chain_id: self.chain_id.clone(),
            paymaster: self.paymaster,
            relayer: self.submitter.as_ref().map(|s| s.relayer_address()),
            domain_tag: String::from_utf8_lossy(DOMAIN_TAG).into_owned(),
        }
    }

    /// The canonical encoding and digest of `authorization`.
    pub fn digest(&self, authorization: &Authorization) -> EncodedAuthorization {
        EncodedAuthorization::new(authorization)
    }

    /// Block explorer link for `tx_hash` on a well-known network.
    pub fn tx_url(&self, tx_hash: &str) -> Option<String> {
        if tx_hash.is_empty() {
            return None;
        }
        network_by_chain_id(&self.chain_id).map(|network| network.tx_url(tx_hash))
    }

    /// Checks `signed` against fresh paymaster state.
    #[cfg_attr(feature = "telemetry", instrument(skip_all, err, fields(actor = %signed.actor())))]
    pub async fn verify(&self, signed: &SignedAuthorization) -> Result<VerifyResponse, RelayLocalError> {
        match self.client.verify_meta_transaction(signed).await {
            Ok(()) => Ok(VerifyResponse::valid()),
            Err(MetaTxError::Verification(reason)) => Ok(VerifyResponse::invalid(&reason)),
            Err(other) => Err(other.into()),
        }
    }

    /// Verifies `signed`, then submits it once from the relayer's wallet.
    #[cfg_attr(feature = "telemetry", instrument(skip_all, err, fields(
        actor = %signed.actor(),
        nonce = %signed.nonce()
    )))]
    pub async fn relay(&self, signed: &SignedAuthorization) -> Result<ExecutionOutcome, RelayLocalError> {
        let submitter = self.submitter.as_deref();
        let outcome = self.client.relay(signed, submitter).await?;
        #[cfg(feature = "telemetry")]
        if let Some(url) = self.tx_url(&outcome.tx_hash) {
            tracing::info!(success = outcome.success, explorer = %url, "relayed authorization");
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{U256, address};
    use stylustx_chain_eip155::meta_tx::test_utils::{MockPaymaster, RELAYER, TestSigner};
    use stylustx_chain_eip155::meta_tx::{AuthorizationBuilder, DEFAULT_DEADLINE_OFFSET};
    use stylustx_types::state::OnChainState;

    const TARGET: Address = address!("0xbbbb000000000000000000000000000000000002");

    fn relay_local(with_submitter: bool) -> (RelayLocal, Arc<MockPaymaster>) {
        let paymaster = Arc::new(MockPaymaster::new(OnChainState::active(TARGET)));
        let relay = RelayLocal::new(ChainId::eip155(421614), Address::repeat_byte(0x11), paymaster.clone());
        let relay = if with_submitter {
            relay.with_submitter(paymaster.clone())
        } else {
            relay
        };
        (relay, paymaster)
    }

    async fn signed(nonce: u64) -> SignedAuthorization {
        let signer = TestSigner::key_one();
        let actor = signer.address().to_string();
        let builder = AuthorizationBuilder::with_signer(signer);
        let authorization = builder
            .build(
                &actor,
                &TARGET.to_string(),
                U256::ZERO,
                vec![0x12, 0x34],
                U256::from(nonce),
                DEFAULT_DEADLINE_OFFSET,
            )
            .unwrap();
        builder.sign(&authorization).await.unwrap()
    }

    #[test]
    fn test_info_reports_relayer() {
        let (relay, _) = relay_local(true);
        let info = relay.info();
        assert_eq!(info.relayer, Some(RELAYER));
        assert_eq!(info.domain_tag, "StylusTx");
        let (relay, _) = relay_local(false);
        assert_eq!(relay.info().relayer, None);
    }

    #[test]
    fn test_tx_url_on_known_network() {
        let (relay, _) = relay_local(true);
        assert_eq!(
            relay.tx_url("0xabc").as_deref(),
            Some("https://sepolia.arbiscan.io/tx/0xabc")
        );
        assert_eq!(relay.tx_url(""), None);
        let unknown = RelayLocal::new(ChainId::eip155(31337), Address::ZERO, Arc::new(MockPaymaster::new(OnChainState::active(TARGET))));
        assert_eq!(unknown.tx_url("0xabc"), None);
    }

    #[tokio::test]
    async fn test_verify_reports_reason() {
        let (relay, paymaster) = relay_local(true);
        let signed = signed(0).await;
        assert_eq!(relay.verify(&signed).await.unwrap(), VerifyResponse::valid());
        paymaster.set_paused(true);
        let response = relay.verify(&signed).await.unwrap();
        assert!(!response.valid);
        assert_eq!(response.reason.as_deref(), Some("Paymaster is paused"));
    }

    #[tokio::test]
    async fn test_verify_surfaces_chain_failure() {
        let (relay, paymaster) = relay_local(true);
        paymaster.set_reads_fail(true);
        assert!(matches!(
            relay.verify(&signed(0).await).await,
            Err(RelayLocalError::Chain(ChainError::Transport(_)))
        ));
    }

    #[tokio::test]
    async fn test_relay_without_submitter() {
        let (relay, _) = relay_local(false);
        assert!(matches!(
            relay.relay(&signed(0).await).await,
            Err(RelayLocalError::Relay(RelayError::NoRelayer { .. }))
        ));
    }

    #[tokio::test]
    async fn test_relay_submits_once() {
        let (relay, paymaster) = relay_local(true);
        let signed = signed(0).await;
        assert!(relay.relay(&signed).await.unwrap().success);
        assert!(matches!(
            relay.relay(&signed).await,
            Err(RelayLocalError::Verification(VerificationError::NonceMismatch { .. }))
        ));
        assert_eq!(paymaster.submissions().len(), 1);
    }
}
