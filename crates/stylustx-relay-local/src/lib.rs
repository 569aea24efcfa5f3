#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Local relayer for StylusTx meta-transactions.
//!
//! [`RelayLocal`] verifies signed authorizations against live paymaster state and
//! submits them from the relayer's own funded account. [`handlers::routes`] exposes
//! it as an Axum router.
//!
//! This crate provides:
//! - the relayer service and its error mapping
//! - HTTP handlers for digest, verify and relay requests
//! - graceful shutdown and log setup for server binaries

pub mod handlers;
pub mod relay_local;
pub mod util;

pub use handlers::*;
pub use relay_local::*;
