//! Results of relaying a signed authorization.

use alloy_primitives::{Bytes, TxHash};
use serde::{Deserialize, Serialize};

/// What the chain-submission collaborator reports once a transaction is included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// Hash of the included transaction.
    pub tx_hash: TxHash,
    /// Whether the transaction executed without reverting.
    pub success: bool,
    /// Data of the first log emitted by the paymaster, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_data: Option<Bytes>,
}

/// The reportable outcome of one submission attempt.
///
/// Produced once per attempt and never mutated. A failed outcome is a normal result,
/// not a defect: the caller decides whether to rebuild and try again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    pub success: bool,
    /// Transaction hash as `0x` hex; empty when the failure happened before submission.
    pub tx_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_data: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionOutcome {
    pub fn succeeded(tx_hash: TxHash, return_data: Option<Bytes>) -> Self {
        Self {
            success: true,
            tx_hash: tx_hash.to_string(),
            return_data,
            error: None,
        }
    }

    /// A failure that happened before any transaction hash was known.
    pub fn failed<E: Into<String>>(error: E) -> Self {
        Self {
            success: false,
            tx_hash: String::new(),
            return_data: None,
            error: Some(error.into()),
        }
    }

    /// A transaction that was included but reverted.
    pub fn reverted(tx_hash: TxHash) -> Self {
        Self {
            success: false,
            tx_hash: tx_hash.to_string(),
            return_data: None,
            error: Some(format!("Transaction {tx_hash} reverted")),
        }
    }
}

impl From<SubmissionReceipt> for ExecutionOutcome {
    fn from(receipt: SubmissionReceipt) -> Self {
        if receipt.success {
            ExecutionOutcome::succeeded(receipt.tx_hash, receipt.return_data)
        } else {
            ExecutionOutcome::reverted(receipt.tx_hash)
        }
    }
}
