use serde::{Deserialize, Serialize};
use std::fmt;
use stylustx_types::chain::ChainId;

/// Numeric EIP-155 chain id, e.g. `421614` for Arbitrum Sepolia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Eip155ChainReference(u64);

impl Eip155ChainReference {
    pub const fn new(chain_id: u64) -> Self {
        Self(chain_id)
    }

    pub fn inner(&self) -> u64 {
        self.0
    }

    /// The CAIP-2 form, `eip155:<id>`.
    pub fn as_chain_id(&self) -> ChainId {
        ChainId::eip155(self.0)
    }
}

impl fmt::Display for Eip155ChainReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Chain {0} is not an eip155 chain")]
pub struct NotEip155Chain(pub ChainId);

impl TryFrom<&ChainId> for Eip155ChainReference {
    type Error = NotEip155Chain;

    fn try_from(value: &ChainId) -> Result<Self, Self::Error> {
        value
            .as_eip155()
            .map(Eip155ChainReference)
            .ok_or_else(|| NotEip155Chain(value.clone()))
    }
}

impl From<Eip155ChainReference> for ChainId {
    fn from(value: Eip155ChainReference) -> Self {
        value.as_chain_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let reference = Eip155ChainReference::new(421614);
        let chain_id = reference.as_chain_id();
        assert_eq!(chain_id.to_string(), "eip155:421614");
        assert_eq!(Eip155ChainReference::try_from(&chain_id).unwrap(), reference);
    }

    #[test]
    fn test_rejects_other_namespaces() {
        let chain_id = ChainId::new("solana", "5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp");
        assert!(Eip155ChainReference::try_from(&chain_id).is_err());
    }
}
