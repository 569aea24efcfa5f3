//! The meta-transaction authorization protocol.
//!
//! Data flows leaves-first through the submodules:
//!
//! ```text
//! builder ─▶ encoding ─▶ (signer) ─▶ verifier ─▶ relay ─▶ ExecutionOutcome
//! ```
//!
//! - [`encoding`] - canonical byte layout and the authorization digest
//! - [`builder`] - assembling authorizations and delegating signing
//! - [`verifier`] - pre-flight checks against paymaster state
//! - [`relay`] - one-shot submission through a funded relayer
//! - [`lifecycle`] - explicit Built → Signed → Verified → Executed stages
//! - [`client`] - the above composed over a [`PaymasterReader`](stylustx_types::paymaster::PaymasterReader)
//!
//! # Example
//!
//! ```ignore
//! use stylustx_chain_eip155::meta_tx::{DEFAULT_DEADLINE_OFFSET, MetaTxClient};
//!
//! let client = MetaTxClient::new(paymaster).with_signer(signer);
//! let signed = client
//!     .sign_meta_transaction(target, payload, U256::ZERO, DEFAULT_DEADLINE_OFFSET)
//!     .await?;
//! let outcome = client.relay(&signed, Some(&relayer)).await?;
//! ```

pub mod builder;
pub mod client;
pub mod encoding;
pub mod lifecycle;
pub mod relay;
pub mod verifier;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use builder::*;
pub use client::*;
pub use encoding::*;
pub use lifecycle::*;
pub use relay::*;
pub use verifier::*;
