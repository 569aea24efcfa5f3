#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for StylusTx meta-transactions.
//!
//! A meta-transaction lets an actor authorize an on-chain call without paying gas:
//! the actor signs an [`Authorization`](authorization::Authorization) off-chain and a
//! relayer later submits the [`SignedAuthorization`](authorization::SignedAuthorization)
//! to the paymaster contract, which verifies the signature and nonce before executing.
//!
//! This crate holds the chain-agnostic pieces shared by clients and relayers:
//!
//! - [`authorization`] - unsigned and signed authorization records
//! - [`outcome`] - submission receipts and execution outcomes
//! - [`state`] - the on-chain state snapshot consumed by the local verifier
//! - [`signer`] - the capability-scoped signer interface
//! - [`paymaster`] - read/submit interfaces to the paymaster contract
//! - [`chain`] - CAIP-2 chain identifiers
//! - [`networks`] - well-known networks the paymaster is deployed on
//! - [`timestamp`] - Unix timestamps in seconds

pub mod authorization;
pub mod chain;
pub mod networks;
pub mod outcome;
pub mod paymaster;
pub mod signer;
pub mod state;
pub mod timestamp;
