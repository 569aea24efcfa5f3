use crate::chain::Eip155ChainReference;
use stylustx_types::chain::ChainId;
use stylustx_types::networks::{ARBITRUM_ONE, ARBITRUM_SEPOLIA};

/// Per-network instances for the EVM networks StylusTx is deployed on.
///
/// ```
/// use stylustx_chain_eip155::networks::KnownNetworkEip155;
/// use stylustx_types::chain::ChainId;
///
/// let sepolia = ChainId::arbitrum_sepolia();
/// assert_eq!(sepolia.to_string(), "eip155:421614");
/// ```
pub trait KnownNetworkEip155<A> {
    /// Arbitrum Sepolia testnet (eip155:421614)
    fn arbitrum_sepolia() -> A;
    /// Arbitrum One mainnet (eip155:42161)
    fn arbitrum_one() -> A;
}

impl KnownNetworkEip155<ChainId> for ChainId {
    fn arbitrum_sepolia() -> ChainId {
        ARBITRUM_SEPOLIA.chain_id()
    }

    fn arbitrum_one() -> ChainId {
        ARBITRUM_ONE.chain_id()
    }
}

impl KnownNetworkEip155<Eip155ChainReference> for Eip155ChainReference {
    fn arbitrum_sepolia() -> Eip155ChainReference {
        Eip155ChainReference::new(ARBITRUM_SEPOLIA.eip155_chain_id)
    }

    fn arbitrum_one() -> Eip155ChainReference {
        Eip155ChainReference::new(ARBITRUM_ONE.eip155_chain_id)
    }
}
