//! Alloy-backed access to a deployed StylusTx paymaster.
//!
//! [`Eip155PaymasterProvider`] reads paymaster state over JSON-RPC.
//! [`Eip155PaymasterRelayer`] additionally holds a funded wallet and submits
//! `execute(...)` transactions, waiting for the configured number of confirmations.

use alloy_network::EthereumWallet;
use alloy_primitives::{Address, B256, U256};
use alloy_provider::{DynProvider, PendingTransactionError, Provider, ProviderBuilder};
use alloy_rpc_types_eth::TransactionReceipt;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{SolInterface, sol};
use alloy_transport::TransportError;
use stylustx_types::authorization::{Authorization, SignedAuthorization};
use stylustx_types::outcome::SubmissionReceipt;
use stylustx_types::paymaster::{ChainError, PaymasterReader, PaymasterSubmitter};
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{Instrument, instrument};

use crate::chain::Eip155ChainReference;
use crate::chain::config::{Eip155ConfigError, Eip155PaymasterConfig};
use crate::meta_tx::authorization_digest;

sol! {
    #[allow(missing_docs)]
    #[allow(clippy::too_many_arguments)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface IStylusTxPaymaster {
        event MetaTxExecuted(address indexed user, address indexed target, uint256 nonce, bool success);

        error NotInitialized();
        error ContractPaused();
        error DeadlineExpired(uint256 deadline, uint256 current_time);
        error TargetNotAllowed(address target);
        error InvalidNonce(uint256 expected, uint256 provided);
        error InvalidSignature(address expected, address recovered);
        error CallFailed();

        function getNonce(address user) external view returns (uint256);
        function getAllowedTarget() external view returns (address);
        function isPaused() external view returns (bool);
        function isInitialized() external view returns (bool);
        function getMessageHash(
            address from,
            address to,
            uint256 value,
            bytes calldata data,
            uint256 nonce,
            uint256 deadline
        ) external view returns (bytes32);
        function execute(
            address from,
            address to,
            uint256 value,
            bytes calldata data,
            uint256 nonce,
            uint256 deadline,
            uint8 v,
            bytes32 r,
            bytes32 s
        ) external payable returns (bytes memory);
    }
}

pub type PaymasterInstance = IStylusTxPaymaster::IStylusTxPaymasterInstance<DynProvider>;

/// Decodes revert data produced by one of the paymaster's custom errors.
pub fn revert_reason(data: &[u8]) -> Option<String> {
    use IStylusTxPaymaster::IStylusTxPaymasterErrors as E;
    let reason = match E::abi_decode(data).ok()? {
        E::NotInitialized(_) => "Paymaster is not initialized".to_string(),
        E::ContractPaused(_) => "Paymaster is paused".to_string(),
        E::DeadlineExpired(e) => format!(
            "Deadline {} expired at block time {}",
            e.deadline, e.current_time
        ),
        E::TargetNotAllowed(e) => format!("Target {} is not allowed", e.target),
        E::InvalidNonce(e) => format!("Invalid nonce: expected {}, got {}", e.expected, e.provided),
        E::InvalidSignature(e) => format!(
            "Invalid signature: expected signer {}, recovered {}",
            e.expected, e.recovered
        ),
        E::CallFailed(_) => "Target call failed".to_string(),
    };
    Some(reason)
}

#[derive(Debug, thiserror::Error)]
pub enum Eip155PaymasterError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    PendingTransaction(#[from] PendingTransactionError),
    #[error("Contract call failed: {0}")]
    ContractCall(String),
    #[error("Paymaster reverted: {0}")]
    Reverted(String),
    #[error("Contract digest {onchain} differs from local digest {local}")]
    DigestMismatch { local: B256, onchain: B256 },
    #[error("Connected to chain {actual}, configured for {expected}")]
    ChainMismatch {
        expected: Eip155ChainReference,
        actual: u64,
    },
}

impl From<alloy_contract::Error> for Eip155PaymasterError {
    fn from(e: alloy_contract::Error) -> Self {
        if let Some(reason) = e.as_revert_data().as_deref().and_then(|data| revert_reason(data)) {
            return Self::Reverted(reason);
        }
        match e {
            alloy_contract::Error::UnknownFunction(_) => Self::ContractCall(e.to_string()),
            alloy_contract::Error::UnknownSelector(_) => Self::ContractCall(e.to_string()),
            alloy_contract::Error::NotADeploymentTransaction => Self::ContractCall(e.to_string()),
            alloy_contract::Error::ContractNotDeployed => Self::ContractCall(e.to_string()),
            alloy_contract::Error::ZeroData(_, _) => Self::ContractCall(e.to_string()),
            alloy_contract::Error::AbiError(_) => Self::ContractCall(e.to_string()),
            alloy_contract::Error::TransportError(e) => Self::Transport(e),
            alloy_contract::Error::PendingTransactionError(e) => Self::PendingTransaction(e),
        }
    }
}

impl From<Eip155PaymasterError> for ChainError {
    fn from(value: Eip155PaymasterError) -> Self {
        match value {
            Eip155PaymasterError::Transport(_) => ChainError::Transport(value.to_string()),
            Eip155PaymasterError::PendingTransaction(_) => {
                ChainError::PendingTransaction(value.to_string())
            }
            Eip155PaymasterError::ContractCall(_)
            | Eip155PaymasterError::Reverted(_)
            | Eip155PaymasterError::DigestMismatch { .. } => {
                ChainError::ContractCall(value.to_string())
            }
            Eip155PaymasterError::ChainMismatch { .. } => ChainError::Transport(value.to_string()),
        }
    }
}

fn contract_error(e: alloy_contract::Error) -> ChainError {
    Eip155PaymasterError::from(e).into()
}

/// Read-only view of one paymaster deployment.
#[derive(Clone)]
pub struct Eip155PaymasterProvider {
    chain: Eip155ChainReference,
    paymaster: PaymasterInstance,
}

impl Eip155PaymasterProvider {
    /// Connects over HTTP without a wallet.
    pub fn connect(chain: Eip155ChainReference, rpc_url: Url, paymaster: Address) -> Self {
        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();
        Self::from_provider(chain, provider, paymaster)
    }

    pub fn from_config(config: &Eip155PaymasterConfig) -> Result<Self, Eip155ConfigError> {
        Ok(Self::connect(
            config.chain_reference()?,
            config.rpc_url()?,
            config.paymaster,
        ))
    }

    pub fn from_provider(chain: Eip155ChainReference, provider: DynProvider, paymaster: Address) -> Self {
        Self {
            chain,
            paymaster: IStylusTxPaymaster::new(paymaster, provider),
        }
    }

    pub fn chain(&self) -> Eip155ChainReference {
        self.chain
    }

    pub fn paymaster_address(&self) -> Address {
        *self.paymaster.address()
    }

    /// Fails when the RPC endpoint serves a different chain than configured.
    #[cfg_attr(feature = "telemetry", instrument(skip_all, err, fields(chain = %self.chain)))]
    pub async fn check_chain_id(&self) -> Result<(), Eip155PaymasterError> {
        let actual = self.paymaster.provider().get_chain_id().await?;
        if actual != self.chain.inner() {
            return Err(Eip155PaymasterError::ChainMismatch {
                expected: self.chain,
                actual,
            });
        }
        Ok(())
    }

    /// The digest as computed by the deployed contract's `getMessageHash`.
    ///
    /// Must equal [`authorization_digest`](crate::meta_tx::authorization_digest) for the
    /// same authorization; a difference means the client and contract encodings drifted.
    #[cfg_attr(feature = "telemetry", instrument(skip_all, err, fields(actor = %authorization.actor)))]
    pub async fn message_hash(&self, authorization: &Authorization) -> Result<B256, ChainError> {
        self.paymaster
            .getMessageHash(
                authorization.actor,
                authorization.target,
                authorization.value,
                authorization.payload.clone(),
                authorization.nonce,
                authorization.deadline,
            )
            .call()
            .await
            .map_err(contract_error)
    }

    /// Fails when the deployed contract hashes a fixed reference authorization
    /// differently from [`authorization_digest`].
    #[cfg_attr(feature = "telemetry", instrument(skip_all, err, fields(paymaster = %self.paymaster_address())))]
    pub async fn check_message_hash(&self) -> Result<(), Eip155PaymasterError> {
        let authorization = reference_authorization();
        let onchain = self
            .message_hash(&authorization)
            .await
            .map_err(|e| Eip155PaymasterError::ContractCall(e.to_string()))?;
        ensure_same_digest(&authorization, onchain)
    }
}

fn reference_authorization() -> Authorization {
    Authorization {
        actor: Address::repeat_byte(0xaa),
        target: Address::repeat_byte(0xbb),
        value: U256::ZERO,
        payload: alloy_primitives::Bytes::from_static(&[0x12, 0x34]),
        nonce: U256::ZERO,
        deadline: U256::from(1_700_000_300u64),
    }
}

fn ensure_same_digest(
    authorization: &Authorization,
    onchain: B256,
) -> Result<(), Eip155PaymasterError> {
    let local = authorization_digest(authorization);
    if local != onchain {
        return Err(Eip155PaymasterError::DigestMismatch { local, onchain });
    }
    Ok(())
}

impl std::fmt::Debug for Eip155PaymasterProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Eip155PaymasterProvider")
            .field("chain", &self.chain)
            .field("paymaster", self.paymaster.address())
            .finish()
    }
}

#[async_trait::async_trait]
impl PaymasterReader for Eip155PaymasterProvider {
    async fn get_nonce(&self, actor: Address) -> Result<U256, ChainError> {
        let call = self.paymaster.getNonce(actor);
        let nonce_fut = call.call().into_future();
        #[cfg(feature = "telemetry")]
        let nonce = nonce_fut
            .instrument(tracing::info_span!(
                "fetch_paymaster_nonce",
                actor = %actor,
                otel.kind = "client"
            ))
            .await;
        #[cfg(not(feature = "telemetry"))]
        let nonce = nonce_fut.await;
        nonce.map_err(contract_error)
    }

    async fn get_allowed_target(&self) -> Result<Address, ChainError> {
        self.paymaster
            .getAllowedTarget()
            .call()
            .await
            .map_err(contract_error)
    }

    async fn is_initialized(&self) -> Result<bool, ChainError> {
        self.paymaster
            .isInitialized()
            .call()
            .await
            .map_err(contract_error)
    }

    async fn is_paused(&self) -> Result<bool, ChainError> {
        self.paymaster
            .isPaused()
            .call()
            .await
            .map_err(contract_error)
    }
}

/// A paymaster connection that pays for `execute` from the relayer's wallet.
#[derive(Clone)]
pub struct Eip155PaymasterRelayer {
    reader: Eip155PaymasterProvider,
    relayer: Address,
    confirmations: u64,
}

impl Eip155PaymasterRelayer {
    pub fn connect(
        chain: Eip155ChainReference,
        rpc_url: Url,
        paymaster: Address,
        signer: PrivateKeySigner,
        confirmations: u64,
    ) -> Self {
        let relayer = signer.address();
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(rpc_url)
            .erased();
        Self {
            reader: Eip155PaymasterProvider::from_provider(chain, provider, paymaster),
            relayer,
            confirmations,
        }
    }

    /// Connects using the RPC endpoint and relayer key named by `config`.
    pub fn from_config(config: &Eip155PaymasterConfig) -> Result<Self, Eip155ConfigError> {
        let signer = config.load_signer()?;
        let relayer = Self::connect(
            config.chain_reference()?,
            config.rpc_url()?,
            config.paymaster,
            signer,
            config.confirmations,
        );
        #[cfg(feature = "telemetry")]
        tracing::info!(
            chain = %config.chain,
            paymaster = %config.paymaster,
            relayer = %relayer.relayer,
            "Initialized paymaster relayer"
        );
        Ok(relayer)
    }

    pub fn reader(&self) -> &Eip155PaymasterProvider {
        &self.reader
    }

    async fn send_execute(
        &self,
        signed: &SignedAuthorization,
    ) -> Result<SubmissionReceipt, Eip155PaymasterError> {
        let call = self.reader.paymaster.execute(
            signed.actor(),
            signed.target(),
            signed.value(),
            signed.payload().clone(),
            signed.nonce(),
            signed.deadline(),
            signed.v(),
            signed.r(),
            signed.s(),
        );
        let pending = call.from(self.relayer).send().await?;
        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await?;
        Ok(submission_receipt(&receipt))
    }
}

impl std::fmt::Debug for Eip155PaymasterRelayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Eip155PaymasterRelayer")
            .field("reader", &self.reader)
            .field("relayer", &self.relayer)
            .field("confirmations", &self.confirmations)
            .finish()
    }
}

/// Maps an included transaction to what the relay executor reports.
///
/// Return data is the data of the first log, which for a successful call is the
/// paymaster's `MetaTxExecuted` event.
fn submission_receipt(receipt: &TransactionReceipt) -> SubmissionReceipt {
    let return_data = receipt
        .inner
        .logs()
        .first()
        .map(|log| log.inner.data.data.clone());
    SubmissionReceipt {
        tx_hash: receipt.transaction_hash,
        success: receipt.status(),
        return_data,
    }
}

#[async_trait::async_trait]
impl PaymasterReader for Eip155PaymasterRelayer {
    async fn get_nonce(&self, actor: Address) -> Result<U256, ChainError> {
        self.reader.get_nonce(actor).await
    }

    async fn get_allowed_target(&self) -> Result<Address, ChainError> {
        self.reader.get_allowed_target().await
    }

    async fn is_initialized(&self) -> Result<bool, ChainError> {
        self.reader.is_initialized().await
    }

    async fn is_paused(&self) -> Result<bool, ChainError> {
        self.reader.is_paused().await
    }
}

#[async_trait::async_trait]
impl PaymasterSubmitter for Eip155PaymasterRelayer {
    fn relayer_address(&self) -> Address {
        self.relayer
    }

    async fn submit(&self, signed: &SignedAuthorization) -> Result<SubmissionReceipt, ChainError> {
        let receipt_fut = self.send_execute(signed);
        #[cfg(feature = "telemetry")]
        let receipt = receipt_fut
            .instrument(tracing::info_span!(
                "call_execute",
                actor = %signed.actor(),
                target = %signed.target(),
                nonce = %signed.nonce(),
                deadline = %signed.deadline(),
                relayer = %self.relayer,
                paymaster = %self.reader.paymaster_address(),
                otel.kind = "client"
            ))
            .await;
        #[cfg(not(feature = "telemetry"))]
        let receipt = receipt_fut.await;
        receipt.map_err(ChainError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes};
    use alloy_sol_types::{SolCall, SolError};

    fn receipt_json(status: &str, logs: serde_json::Value) -> TransactionReceipt {
        let hash = format!("0x{}", "11".repeat(32));
        serde_json::from_value(serde_json::json!({
            "type": "0x2",
            "status": status,
            "cumulativeGasUsed": "0x5208",
            "logsBloom": format!("0x{}", "00".repeat(256)),
            "logs": logs,
            "transactionHash": hash,
            "transactionIndex": "0x0",
            "blockHash": format!("0x{}", "22".repeat(32)),
            "blockNumber": "0x1",
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x1",
            "from": "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
            "to": "0x1111111111111111111111111111111111111111",
            "contractAddress": null
        }))
        .unwrap()
    }

    #[test]
    fn test_receipt_return_data_is_first_log() {
        let log = serde_json::json!({
            "address": "0x1111111111111111111111111111111111111111",
            "topics": [],
            "data": "0x1234",
            "logIndex": "0x0",
            "removed": false
        });
        let second = serde_json::json!({
            "address": "0x1111111111111111111111111111111111111111",
            "topics": [],
            "data": "0x5678",
            "logIndex": "0x1",
            "removed": false
        });
        let receipt = submission_receipt(&receipt_json("0x1", serde_json::json!([log, second])));
        assert!(receipt.success);
        assert_eq!(receipt.return_data, Some(bytes!("1234")));
        assert_eq!(receipt.tx_hash, B256::repeat_byte(0x11));
    }

    #[test]
    fn test_reverted_receipt_has_no_return_data() {
        let receipt = submission_receipt(&receipt_json("0x0", serde_json::json!([])));
        assert!(!receipt.success);
        assert_eq!(receipt.return_data, None);
        assert_eq!(receipt.tx_hash, B256::repeat_byte(0x11));
    }

    #[test]
    fn test_revert_reason_decodes_custom_errors() {
        let data = IStylusTxPaymaster::InvalidNonce {
            expected: U256::from(1),
            provided: U256::ZERO,
        }
        .abi_encode();
        assert_eq!(
            revert_reason(&data).as_deref(),
            Some("Invalid nonce: expected 1, got 0")
        );
        let data = IStylusTxPaymaster::ContractPaused {}.abi_encode();
        assert_eq!(revert_reason(&data).as_deref(), Some("Paymaster is paused"));
    }

    #[test]
    fn test_revert_reason_ignores_foreign_data() {
        assert_eq!(revert_reason(&[0xde, 0xad, 0xbe, 0xef]), None);
        assert_eq!(revert_reason(&[]), None);
    }

    #[test]
    fn test_reverted_maps_to_contract_call() {
        let error = Eip155PaymasterError::Reverted("Paymaster is paused".into());
        assert_eq!(
            ChainError::from(error),
            ChainError::ContractCall("Paymaster reverted: Paymaster is paused".into())
        );
    }

    #[test]
    fn test_reference_digest_check() {
        let authorization = reference_authorization();
        let local = authorization_digest(&authorization);
        assert!(ensure_same_digest(&authorization, local).is_ok());
        assert!(matches!(
            ensure_same_digest(&authorization, B256::ZERO),
            Err(Eip155PaymasterError::DigestMismatch { onchain, .. }) if onchain == B256::ZERO
        ));
    }

    #[test]
    fn test_execute_calldata_field_order() {
        let call = IStylusTxPaymaster::executeCall {
            from: address!("0xaaaa000000000000000000000000000000000001"),
            to: address!("0xbbbb000000000000000000000000000000000002"),
            value: U256::ZERO,
            data: bytes!("1234"),
            nonce: U256::from(7),
            deadline: U256::from(1_700_000_300u64),
            v: 27,
            r: B256::repeat_byte(1),
            s: B256::repeat_byte(2),
        };
        let encoded = call.abi_encode();
        assert_eq!(
            &encoded[..4],
            IStylusTxPaymaster::executeCall::SELECTOR.as_slice()
        );
        // from, to, value, data offset, nonce, deadline, v, r, s
        assert_eq!(&encoded[4 + 12..4 + 32], call.from.as_slice());
        assert_eq!(&encoded[4 + 32 + 12..4 + 64], call.to.as_slice());
        assert_eq!(encoded[4 + 5 * 32 - 1], 7);
        assert_eq!(encoded[4 + 7 * 32 - 1], 27);
    }

    #[test]
    fn test_transport_errors_map_to_chain_errors() {
        let error = Eip155PaymasterError::ContractCall("execution reverted".into());
        assert!(matches!(
            ChainError::from(error),
            ChainError::ContractCall(_)
        ));
        let error = Eip155PaymasterError::ChainMismatch {
            expected: Eip155ChainReference::new(421614),
            actual: 1,
        };
        assert!(matches!(ChainError::from(error), ChainError::Transport(_)));
    }
}
