//! CAIP-2 chain identifier types.
//!
//! A CAIP-2 chain ID consists of two parts separated by a colon:
//!
//! - **Namespace**: The blockchain ecosystem (`eip155` for EVM chains)
//! - **Reference**: The chain-specific identifier (e.g., `421614` for Arbitrum Sepolia)
//!
//! # Examples
//!
//! ```
//! use stylustx_types::chain::ChainId;
//!
//! let sepolia = ChainId::new("eip155", "421614");
//! assert_eq!(sepolia.to_string(), "eip155:421614");
//!
//! // Either the CAIP-2 form or a well-known network name parses.
//! let by_name: ChainId = "arbitrum-sepolia".parse().unwrap();
//! assert_eq!(by_name, sepolia);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::str::FromStr;

use crate::networks;

/// A CAIP-2 compliant blockchain identifier.
///
/// # Serialization
///
/// Serializes to/from a colon-separated string: `"eip155:421614"`. Deserialization
/// also accepts a well-known network name such as `"arbitrum-one"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainId {
    /// The blockchain namespace (`eip155` for EVM chains).
    pub namespace: String,
    /// The chain-specific reference (e.g., `42161` for Arbitrum One).
    pub reference: String,
}

impl ChainId {
    /// Creates a new chain ID from namespace and reference components.
    pub fn new<N: Into<String>, R: Into<String>>(namespace: N, reference: R) -> Self {
        Self {
            namespace: namespace.into(),
            reference: reference.into(),
        }
    }

    /// Creates an `eip155` chain ID from a numeric EVM chain id.
    pub fn eip155(chain_id: u64) -> Self {
        Self::new("eip155", chain_id.to_string())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Returns the numeric chain id if this is an `eip155` chain.
    pub fn as_eip155(&self) -> Option<u64> {
        if self.namespace != "eip155" {
            return None;
        }
        self.reference.parse().ok()
    }

    /// Creates a chain ID from a well-known network name.
    ///
    /// ```
    /// use stylustx_types::chain::ChainId;
    ///
    /// let one = ChainId::from_network_name("arbitrum-one").unwrap();
    /// assert_eq!(one.to_string(), "eip155:42161");
    /// assert!(ChainId::from_network_name("unknown").is_none());
    /// ```
    pub fn from_network_name(network_name: &str) -> Option<Self> {
        networks::network_by_name(network_name).map(|network| network.chain_id())
    }

    /// Returns the well-known network name for this chain ID, if any.
    pub fn as_network_name(&self) -> Option<&'static str> {
        networks::network_by_chain_id(self).map(|network| network.name)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

impl From<ChainId> for String {
    fn from(value: ChainId) -> Self {
        value.to_string()
    }
}

/// Error returned when parsing an invalid chain ID string.
///
/// A valid chain ID is either `namespace:reference` with both components non-empty,
/// or a well-known network name.
#[derive(Debug, thiserror::Error)]
#[error("Invalid chain id format {0}")]
pub struct ChainIdFormatError(String);

impl FromStr for ChainId {
    type Err = ChainIdFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((namespace, reference)) = s.split_once(':') else {
            return ChainId::from_network_name(s).ok_or_else(|| ChainIdFormatError(s.into()));
        };
        if namespace.is_empty() || reference.is_empty() {
            return Err(ChainIdFormatError(s.into()));
        }
        Ok(ChainId::new(namespace, reference))
    }
}

impl Serialize for ChainId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ChainId::from_str(&s).map_err(de::Error::custom)
    }
}
