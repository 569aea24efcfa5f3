//! Offline `digest` subcommand.

use stylustx_chain_eip155::meta_tx::EncodedAuthorization;
use stylustx_types::authorization::Authorization;

use crate::config::DigestArgs;

pub fn authorization(args: &DigestArgs) -> Authorization {
    Authorization {
        actor: args.actor,
        target: args.target,
        value: args.value,
        payload: args.payload.clone(),
        nonce: args.nonce,
        deadline: args.deadline,
    }
}

/// Prints the encoding of the given fields as pretty JSON on stdout.
pub fn print(args: &DigestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let encoded = EncodedAuthorization::new(&authorization(args));
    println!("{}", serde_json::to_string_pretty(&encoded)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Bytes, U256, address, b256};

    #[test]
    fn test_digest_of_scenario() {
        let args = DigestArgs {
            actor: address!("0xaaaa000000000000000000000000000000000001"),
            target: address!("0xbbbb000000000000000000000000000000000002"),
            value: U256::ZERO,
            payload: Bytes::from(vec![0x12, 0x34]),
            nonce: U256::ZERO,
            deadline: U256::from(1_700_000_300u64),
        };
        let encoded = EncodedAuthorization::new(&authorization(&args));
        assert_eq!(
            encoded.digest,
            b256!("0xa992d2bad5c589c6206724ed744ea8270c703eb581123490a17860b5998a0fee")
        );
        assert_eq!(encoded.encoded.len(), 176);
    }
}
