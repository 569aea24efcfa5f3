//! Well-known networks with a StylusTx paymaster deployment target.

use crate::chain::ChainId;

/// Static description of a supported network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownNetwork {
    /// Machine name used in configuration, e.g. `arbitrum-sepolia`.
    pub name: &'static str,
    /// Human-readable name.
    pub display_name: &'static str,
    /// Numeric EVM chain id.
    pub eip155_chain_id: u64,
    /// Public RPC endpoint.
    pub rpc_url: &'static str,
    /// Block explorer base URL.
    pub explorer_url: &'static str,
}

impl KnownNetwork {
    pub fn chain_id(&self) -> ChainId {
        ChainId::eip155(self.eip155_chain_id)
    }

    /// Explorer link for a transaction hash.
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, tx_hash)
    }
}

pub const ARBITRUM_SEPOLIA: KnownNetwork = KnownNetwork {
    name: "arbitrum-sepolia",
    display_name: "Arbitrum Sepolia",
    eip155_chain_id: 421614,
    rpc_url: "https://sepolia-rollup.arbitrum.io/rpc",
    explorer_url: "https://sepolia.arbiscan.io",
};

pub const ARBITRUM_ONE: KnownNetwork = KnownNetwork {
    name: "arbitrum-one",
    display_name: "Arbitrum One",
    eip155_chain_id: 42161,
    rpc_url: "https://arb1.arbitrum.io/rpc",
    explorer_url: "https://arbiscan.io",
};

/// Network used when configuration does not name one.
pub const DEFAULT_NETWORK: KnownNetwork = ARBITRUM_SEPOLIA;

pub static KNOWN_NETWORKS: &[KnownNetwork] = &[ARBITRUM_SEPOLIA, ARBITRUM_ONE];

pub fn network_by_name(name: &str) -> Option<&'static KnownNetwork> {
    KNOWN_NETWORKS.iter().find(|network| network.name == name)
}

pub fn network_by_chain_id(chain_id: &ChainId) -> Option<&'static KnownNetwork> {
    let numeric = chain_id.as_eip155()?;
    KNOWN_NETWORKS
        .iter()
        .find(|network| network.eip155_chain_id == numeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_and_id_agree() {
        for network in KNOWN_NETWORKS {
            let by_name = network_by_name(network.name).unwrap();
            let by_id = network_by_chain_id(&network.chain_id()).unwrap();
            assert_eq!(by_name, by_id);
        }
    }

    #[test]
    fn test_default_is_sepolia() {
        assert_eq!(DEFAULT_NETWORK.eip155_chain_id, 421614);
    }

    #[test]
    fn test_tx_url() {
        assert_eq!(ARBITRUM_ONE.tx_url("0xabc"), "https://arbiscan.io/tx/0xabc");
    }
}
