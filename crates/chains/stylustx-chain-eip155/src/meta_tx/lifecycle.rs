//! Explicit, caller-driven stages of one meta-transaction.
//!
//! ```text
//! Built ──sign──▶ Signed ──verify──▶ Verified ──execute──▶ Executed
//!   ▲                        │
//!   └──────rebuild──── Rejected
//! ```
//!
//! Every transition borrows the current stage and returns the next one, so a failed
//! signing or relay attempt leaves the caller holding the stage it started from.

use alloy_primitives::U256;
use stylustx_types::authorization::{Authorization, SignedAuthorization};
use stylustx_types::outcome::ExecutionOutcome;
use stylustx_types::paymaster::PaymasterSubmitter;
use stylustx_types::state::OnChainState;
use stylustx_types::timestamp::UnixTimestamp;

use crate::meta_tx::builder::{AuthorizationBuilder, BuildError, SignError, assemble};
use crate::meta_tx::relay::{RelayError, execute};
use crate::meta_tx::verifier::{VerificationError, verify_at};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaTxStage {
    Built(Authorization),
    Signed(SignedAuthorization),
    Verified(SignedAuthorization),
    Executed(ExecutionOutcome),
    Rejected {
        signed: SignedAuthorization,
        reason: VerificationError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    #[error("Cannot {action} from stage {stage}")]
    IllegalTransition {
        stage: &'static str,
        action: &'static str,
    },
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Sign(#[from] SignError),
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl MetaTxStage {
    pub fn name(&self) -> &'static str {
        match self {
            MetaTxStage::Built(_) => "built",
            MetaTxStage::Signed(_) => "signed",
            MetaTxStage::Verified(_) => "verified",
            MetaTxStage::Executed(_) => "executed",
            MetaTxStage::Rejected { .. } => "rejected",
        }
    }

    pub fn is_executed(&self) -> bool {
        matches!(self, MetaTxStage::Executed(_))
    }

    fn illegal(&self, action: &'static str) -> StageError {
        StageError::IllegalTransition {
            stage: self.name(),
            action,
        }
    }

    /// `Built` → `Signed`.
    pub async fn sign(&self, builder: &AuthorizationBuilder) -> Result<MetaTxStage, StageError> {
        match self {
            MetaTxStage::Built(authorization) => {
                Ok(MetaTxStage::Signed(builder.sign(authorization).await?))
            }
            _ => Err(self.illegal("sign")),
        }
    }

    /// `Signed` → `Verified`, or `Rejected` carrying the reason.
    pub fn verify(&self, state: &OnChainState, now: UnixTimestamp) -> Result<MetaTxStage, StageError> {
        match self {
            MetaTxStage::Signed(signed) => Ok(match verify_at(signed, state, now) {
                Ok(()) => MetaTxStage::Verified(signed.clone()),
                Err(reason) => MetaTxStage::Rejected {
                    signed: signed.clone(),
                    reason,
                },
            }),
            _ => Err(self.illegal("verify")),
        }
    }

    /// `Verified` → `Executed`. A failed submission is still `Executed`, with a
    /// failed outcome.
    pub async fn execute(
        &self,
        relayer: Option<&dyn PaymasterSubmitter>,
    ) -> Result<MetaTxStage, StageError> {
        match self {
            MetaTxStage::Verified(signed) => {
                Ok(MetaTxStage::Executed(execute(signed, relayer).await?))
            }
            _ => Err(self.illegal("execute")),
        }
    }

    /// `Rejected` → `Built` with the same call and a refreshed nonce and deadline.
    pub fn rebuild(&self, fresh_nonce: U256, deadline_offset_secs: i64) -> Result<MetaTxStage, StageError> {
        self.rebuild_at(fresh_nonce, deadline_offset_secs, UnixTimestamp::now())
    }

    pub fn rebuild_at(
        &self,
        fresh_nonce: U256,
        deadline_offset_secs: i64,
        now: UnixTimestamp,
    ) -> Result<MetaTxStage, StageError> {
        match self {
            MetaTxStage::Rejected { signed, .. } => {
                let previous = signed.authorization();
                let authorization = assemble(
                    previous.actor,
                    previous.target,
                    previous.value,
                    previous.payload.clone(),
                    fresh_nonce,
                    deadline_offset_secs,
                    now,
                )?;
                Ok(MetaTxStage::Built(authorization))
            }
            _ => Err(self.illegal("rebuild")),
        }
    }
}
