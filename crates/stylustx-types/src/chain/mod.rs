//! Chain identification.
//!
//! The paymaster is deployed per chain, and signatures carry no chain id of their
//! own: the relayer must know which chain it talks to. [`ChainId`] names that chain in
//! [CAIP-2](https://standards.chainagnostic.org/CAIPs/caip-2) form.

mod chain_id;

pub use chain_id::*;
