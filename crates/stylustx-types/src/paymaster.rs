//! Interfaces to the paymaster contract.
//!
//! The paymaster owns all mutable state that matters to a meta-transaction: the
//! per-actor nonce sequence, the allowed target, and the pause/initialization flags.
//! Clients see it through [`PaymasterReader`]; relayers additionally submit through
//! [`PaymasterSubmitter`], which holds the relayer's funded credential.

use alloy_primitives::{Address, U256};
use std::sync::Arc;

use crate::authorization::SignedAuthorization;
use crate::outcome::SubmissionReceipt;

/// Failure talking to the chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// RPC transport failed (connection, timeout, malformed response).
    #[error("Transport error: {0}")]
    Transport(String),
    /// The contract call reverted or could not be encoded/decoded.
    #[error("Contract call failed: {0}")]
    ContractCall(String),
    /// The transaction was sent but its inclusion could not be confirmed.
    #[error("Pending transaction error: {0}")]
    PendingTransaction(String),
}

/// Read-only view of the paymaster.
///
/// Values are eventually consistent with the latest confirmed block.
#[async_trait::async_trait]
pub trait PaymasterReader: Send + Sync {
    /// The nonce the contract expects from `actor` next.
    async fn get_nonce(&self, actor: Address) -> Result<U256, ChainError>;

    /// The single contract the paymaster will forward calls to.
    async fn get_allowed_target(&self) -> Result<Address, ChainError>;

    async fn is_initialized(&self) -> Result<bool, ChainError>;

    async fn is_paused(&self) -> Result<bool, ChainError>;
}

/// Submits signed authorizations to the paymaster, paying gas with the relayer's funds.
#[async_trait::async_trait]
pub trait PaymasterSubmitter: Send + Sync {
    /// The address whose funds pay for submission.
    fn relayer_address(&self) -> Address;

    /// Sends `execute(actor, target, value, payload, nonce, deadline, v, r, s)` and waits
    /// for inclusion.
    async fn submit(&self, signed: &SignedAuthorization) -> Result<SubmissionReceipt, ChainError>;
}

#[async_trait::async_trait]
impl<T: PaymasterReader + ?Sized> PaymasterReader for Arc<T> {
    async fn get_nonce(&self, actor: Address) -> Result<U256, ChainError> {
        (**self).get_nonce(actor).await
    }

    async fn get_allowed_target(&self) -> Result<Address, ChainError> {
        (**self).get_allowed_target().await
    }

    async fn is_initialized(&self) -> Result<bool, ChainError> {
        (**self).is_initialized().await
    }

    async fn is_paused(&self) -> Result<bool, ChainError> {
        (**self).is_paused().await
    }
}

#[async_trait::async_trait]
impl<T: PaymasterSubmitter + ?Sized> PaymasterSubmitter for Arc<T> {
    fn relayer_address(&self) -> Address {
        (**self).relayer_address()
    }

    async fn submit(&self, signed: &SignedAuthorization) -> Result<SubmissionReceipt, ChainError> {
        (**self).submit(signed).await
    }
}
