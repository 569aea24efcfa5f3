//! Submitting signed authorizations through a funded relayer.

use alloy_primitives::Address;
use stylustx_types::authorization::SignedAuthorization;
use stylustx_types::outcome::ExecutionOutcome;
use stylustx_types::paymaster::PaymasterSubmitter;

#[cfg(feature = "telemetry")]
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// No relayer was supplied, or the relayer is the actor itself.
    #[error("No relayer available for actor {actor}")]
    NoRelayer { actor: Address },
}

/// Submits `signed` once and reports what the chain returned.
///
/// Submission and inclusion failures are folded into a failed [`ExecutionOutcome`];
/// the only `Err` is a missing relayer. Nothing is retried here.
#[cfg_attr(feature = "telemetry", instrument(skip_all, fields(
    actor = %signed.actor(),
    nonce = %signed.nonce()
)))]
pub async fn execute(
    signed: &SignedAuthorization,
    relayer: Option<&dyn PaymasterSubmitter>,
) -> Result<ExecutionOutcome, RelayError> {
    let relayer = match relayer {
        Some(relayer) if relayer.relayer_address() != signed.actor() => relayer,
        _ => {
            return Err(RelayError::NoRelayer {
                actor: signed.actor(),
            });
        }
    };
    let outcome = match relayer.submit(signed).await {
        Ok(receipt) => ExecutionOutcome::from(receipt),
        Err(error) => ExecutionOutcome::failed(error.to_string()),
    };
    #[cfg(feature = "telemetry")]
    if outcome.success {
        tracing::info!(tx_hash = %outcome.tx_hash, "authorization executed");
    } else {
        tracing::warn!(
            tx_hash = %outcome.tx_hash,
            error = outcome.error.as_deref().unwrap_or_default(),
            "authorization execution failed"
        );
    }
    Ok(outcome)
}
