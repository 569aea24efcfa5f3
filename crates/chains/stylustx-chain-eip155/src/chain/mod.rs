//! EVM chain support for the StylusTx paymaster.
//!
//! - [`Eip155ChainReference`] - numeric chain id of an EVM network (e.g. `421614` for Arbitrum Sepolia)
//! - [`Eip155PaymasterConfig`](config::Eip155PaymasterConfig) - one paymaster deployment
//! - [`Eip155PaymasterProvider`] - reads paymaster state over JSON-RPC
//! - [`Eip155PaymasterRelayer`] - submits `execute` transactions from a funded wallet
//!
//! The provider types need the `relayer` feature.

pub mod types;

#[cfg(feature = "relayer")]
pub mod config;
#[cfg(feature = "relayer")]
pub mod provider;

#[cfg(feature = "relayer")]
pub use config::*;
#[cfg(feature = "relayer")]
pub use provider::*;

pub use types::*;
