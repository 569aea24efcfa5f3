//! Configuration of one paymaster deployment on an EVM chain.

use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use serde::{Deserialize, Serialize};
use stylustx_types::chain::ChainId;
use stylustx_types::networks::{DEFAULT_NETWORK, network_by_chain_id};
use url::Url;

use crate::chain::Eip155ChainReference;

/// Environment variable holding the relayer's private key when the config does not
/// name another one.
pub const DEFAULT_SIGNER_ENV: &str = "RELAYER_PRIVATE_KEY";

#[derive(Debug, thiserror::Error)]
pub enum Eip155ConfigError {
    #[error("Chain {0} is not an eip155 chain")]
    NotEip155(ChainId),
    #[error("No RPC endpoint configured for unknown chain {0}")]
    MissingRpc(ChainId),
    #[error("Environment variable {0} is not set")]
    MissingSigner(String),
    #[error("Environment variable {0} does not hold a valid private key")]
    InvalidSigner(String),
    #[error("Paymaster hashing check failed: {0}")]
    DigestMismatch(String),
}

/// ```json
/// {
///   "chain": "arbitrum-sepolia",
///   "paymaster": "0x...",
///   "confirmations": 1,
///   "signerEnv": "RELAYER_PRIVATE_KEY"
/// }
/// ```
///
/// `chain` defaults to Arbitrum Sepolia. `rpc` may be omitted for well-known networks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip155PaymasterConfig {
    #[serde(default = "default_chain")]
    pub chain: ChainId,
    #[serde(default)]
    pub rpc: Option<Url>,
    pub paymaster: Address,
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
    #[serde(default = "default_signer_env")]
    pub signer_env: String,
}

fn default_chain() -> ChainId {
    DEFAULT_NETWORK.chain_id()
}

fn default_confirmations() -> u64 {
    1
}

fn default_signer_env() -> String {
    DEFAULT_SIGNER_ENV.to_string()
}

impl Eip155PaymasterConfig {
    pub fn chain_reference(&self) -> Result<Eip155ChainReference, Eip155ConfigError> {
        Eip155ChainReference::try_from(&self.chain)
            .map_err(|_| Eip155ConfigError::NotEip155(self.chain.clone()))
    }

    /// The configured RPC endpoint, or the public one of a well-known network.
    pub fn rpc_url(&self) -> Result<Url, Eip155ConfigError> {
        if let Some(rpc) = &self.rpc {
            return Ok(rpc.clone());
        }
        network_by_chain_id(&self.chain)
            .and_then(|network| Url::parse(network.rpc_url).ok())
            .ok_or_else(|| Eip155ConfigError::MissingRpc(self.chain.clone()))
    }

    /// Reads the relayer key from the environment variable named by `signer_env`.
    pub fn load_signer(&self) -> Result<PrivateKeySigner, Eip155ConfigError> {
        let raw = std::env::var(&self.signer_env)
            .map_err(|_| Eip155ConfigError::MissingSigner(self.signer_env.clone()))?;
        raw.trim()
            .trim_start_matches("0x")
            .parse()
            .map_err(|_| Eip155ConfigError::InvalidSigner(self.signer_env.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_known_rpc() {
        let config: Eip155PaymasterConfig = serde_json::from_str(
            r#"{"chain":"arbitrum-sepolia","paymaster":"0x1111111111111111111111111111111111111111"}"#,
        )
        .unwrap();
        assert_eq!(config.confirmations, 1);
        assert_eq!(config.signer_env, DEFAULT_SIGNER_ENV);
        assert_eq!(config.chain_reference().unwrap().inner(), 421614);
        assert_eq!(
            config.rpc_url().unwrap().as_str(),
            "https://sepolia-rollup.arbitrum.io/rpc"
        );
    }

    #[test]
    fn test_chain_defaults_to_arbitrum_sepolia() {
        let config: Eip155PaymasterConfig = serde_json::from_str(
            r#"{"paymaster":"0x1111111111111111111111111111111111111111"}"#,
        )
        .unwrap();
        assert_eq!(config.chain, ChainId::eip155(421614));
        assert_eq!(
            config.rpc_url().unwrap().as_str(),
            "https://sepolia-rollup.arbitrum.io/rpc"
        );
    }

    #[test]
    fn test_unknown_chain_requires_rpc() {
        let config: Eip155PaymasterConfig = serde_json::from_str(
            r#"{"chain":"eip155:31337","paymaster":"0x1111111111111111111111111111111111111111"}"#,
        )
        .unwrap();
        assert!(matches!(
            config.rpc_url(),
            Err(Eip155ConfigError::MissingRpc(_))
        ));
    }

    #[test]
    fn test_missing_signer_env() {
        let config = Eip155PaymasterConfig {
            chain: ChainId::eip155(421614),
            rpc: None,
            paymaster: Address::ZERO,
            confirmations: 1,
            signer_env: "STYLUSTX_TEST_UNSET_SIGNER".into(),
        };
        assert!(matches!(
            config.load_signer(),
            Err(Eip155ConfigError::MissingSigner(_))
        ));
    }
}
