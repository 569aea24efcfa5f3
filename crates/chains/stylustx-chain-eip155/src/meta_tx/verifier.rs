//! Pre-flight checks of a signed authorization against paymaster state.
//!
//! Mirrors the paymaster's own preconditions so that a doomed submission is caught
//! before any gas is paid. Signature recovery is left to the contract.

use alloy_primitives::{Address, U256};
use stylustx_types::authorization::SignedAuthorization;
use stylustx_types::state::OnChainState;
use stylustx_types::timestamp::UnixTimestamp;

/// Why a signed authorization would be rejected by the paymaster.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("Paymaster is not initialized")]
    NotInitialized,
    #[error("Paymaster is paused")]
    ContractPaused,
    /// Rebuild with a fresh deadline; the same signed value is never usable again.
    #[error("Deadline {deadline} expired at {now}")]
    DeadlineExpired { deadline: U256, now: U256 },
    /// Refetch the nonce and rebuild; covers both replays and stale nonces.
    #[error("Nonce mismatch: expected {expected}, got {got}")]
    NonceMismatch { expected: U256, got: U256 },
    #[error("Target {target} is not allowed, expected {allowed}")]
    TargetNotAllowed { target: Address, allowed: Address },
}

impl VerificationError {
    /// Whether rebuilding the authorization against fresh state can succeed.
    pub fn is_rebuildable(&self) -> bool {
        matches!(
            self,
            VerificationError::DeadlineExpired { .. } | VerificationError::NonceMismatch { .. }
        )
    }
}

/// Verifies `signed` against `state` at the current wall-clock time.
pub fn verify(signed: &SignedAuthorization, state: &OnChainState) -> Result<(), VerificationError> {
    verify_at(signed, state, UnixTimestamp::now())
}

/// Verifies `signed` against `state` as of `now`.
///
/// Checks run in a fixed order and the first failure is returned:
/// initialization, pause flag, deadline (`now > deadline` is expired), nonce, target.
pub fn verify_at(
    signed: &SignedAuthorization,
    state: &OnChainState,
    now: UnixTimestamp,
) -> Result<(), VerificationError> {
    let result = check(signed, state, now);
    #[cfg(feature = "telemetry")]
    if let Err(reason) = &result {
        tracing::info!(
            actor = %signed.actor(),
            nonce = %signed.nonce(),
            %reason,
            "authorization failed verification"
        );
    }
    result
}

fn check(
    signed: &SignedAuthorization,
    state: &OnChainState,
    now: UnixTimestamp,
) -> Result<(), VerificationError> {
    if !state.initialized {
        return Err(VerificationError::NotInitialized);
    }
    if state.paused {
        return Err(VerificationError::ContractPaused);
    }
    let now = now.to_u256();
    if now > signed.deadline() {
        return Err(VerificationError::DeadlineExpired {
            deadline: signed.deadline(),
            now,
        });
    }
    let expected = state.current_nonce_for(&signed.actor());
    if signed.nonce() != expected {
        return Err(VerificationError::NonceMismatch {
            expected,
            got: signed.nonce(),
        });
    }
    if signed.target() != state.allowed_target {
        return Err(VerificationError::TargetNotAllowed {
            target: signed.target(),
            allowed: state.allowed_target,
        });
    }
    Ok(())
}
