//! Read-only snapshot of paymaster state used for pre-flight verification.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Paymaster state as observed at one point in time.
///
/// The nonce sequence is owned by the contract; the client only ever reads it. An
/// actor missing from `nonces` has never transacted and its nonce is zero, matching
/// the contract's mapping default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnChainState {
    pub initialized: bool,
    pub paused: bool,
    pub allowed_target: Address,
    #[serde(default)]
    pub nonces: HashMap<Address, U256>,
}

impl OnChainState {
    /// A live, initialized paymaster allowing `allowed_target`, with no nonces consumed.
    pub fn active(allowed_target: Address) -> Self {
        Self {
            initialized: true,
            paused: false,
            allowed_target,
            nonces: HashMap::new(),
        }
    }

    /// Records the observed nonce for `actor`.
    pub fn with_nonce(mut self, actor: Address, nonce: U256) -> Self {
        self.nonces.insert(actor, nonce);
        self
    }

    /// The nonce the contract expects from `actor` next.
    pub fn current_nonce_for(&self, actor: &Address) -> U256 {
        self.nonces.get(actor).copied().unwrap_or(U256::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_unknown_actor_has_zero_nonce() {
        let state = OnChainState::active(Address::ZERO);
        assert_eq!(
            state.current_nonce_for(&address!("0x0000000000000000000000000000000000000001")),
            U256::ZERO
        );
    }

    #[test]
    fn test_with_nonce_overrides() {
        let actor = address!("0xaaaa000000000000000000000000000000000001");
        let state = OnChainState::active(Address::ZERO).with_nonce(actor, U256::from(7));
        assert_eq!(state.current_nonce_for(&actor), U256::from(7));
    }
}
