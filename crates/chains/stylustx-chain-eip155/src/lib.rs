#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! EIP-155 (EVM) meta-transactions for the StylusTx paymaster.
//!
//! An actor signs an authorization off-chain; a relayer pays gas to submit it, and the
//! paymaster checks the nonce, deadline, target and signature before forwarding the call.
//!
//! # Modules
//!
//! - [`meta_tx`] - encoding, building, signing, verification and relaying
//! - [`chain`] - EVM chain references and, with `relayer`, the alloy-backed paymaster provider
//! - [`networks`] - well-known EVM networks
//! - `signer` (feature `client`) - a local private-key [`AuthorizationSigner`](stylustx_types::signer::AuthorizationSigner)
//!
//! # Features
//!
//! - `client` - local private-key signing
//! - `relayer` - JSON-RPC reads and `execute` submission through alloy
//! - `telemetry` - `tracing` spans and events

pub mod chain;
pub mod meta_tx;
pub mod networks;

#[cfg(feature = "client")]
pub mod signer;

pub use meta_tx::{
    AuthorizationBuilder, DEFAULT_DEADLINE_OFFSET, MetaTxClient, MetaTxError, MetaTxStage,
    authorization_digest,
};
