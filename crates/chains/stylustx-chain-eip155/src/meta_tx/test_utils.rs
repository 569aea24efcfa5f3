//! In-memory doubles for the signer and paymaster collaborators.

use alloy_primitives::{Address, B256, Bytes, Signature, U256, address, b256, keccak256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use std::sync::Mutex;
use stylustx_types::authorization::SignedAuthorization;
use stylustx_types::outcome::SubmissionReceipt;
use stylustx_types::paymaster::{ChainError, PaymasterReader, PaymasterSubmitter};
use stylustx_types::signer::{AuthorizationSigner, SignerError};
use stylustx_types::state::OnChainState;

pub const RELAYER: Address = address!("0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

/// In-memory signer over a fixed private key.
pub struct TestSigner(PrivateKeySigner);

impl TestSigner {
    /// The key `0x00..01`, whose address is `0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf`.
    pub fn key_one() -> Self {
        let key = b256!("0x0000000000000000000000000000000000000000000000000000000000000001");
        Self(PrivateKeySigner::from_bytes(&key).unwrap())
    }

    pub fn address(&self) -> Address {
        self.0.address()
    }
}

#[async_trait::async_trait]
impl AuthorizationSigner for TestSigner {
    fn address(&self) -> Address {
        self.0.address()
    }

    async fn sign_digest(&self, digest: &B256) -> Result<Signature, SignerError> {
        self.0
            .sign_hash_sync(digest)
            .map_err(|e| SignerError::Backend(e.to_string()))
    }
}

/// Claims an address and declines every request.
pub struct RejectingSigner(Address);

impl RejectingSigner {
    pub fn new(address: Address) -> Self {
        Self(address)
    }
}

#[async_trait::async_trait]
impl AuthorizationSigner for RejectingSigner {
    fn address(&self) -> Address {
        self.0
    }

    async fn sign_digest(&self, _digest: &B256) -> Result<Signature, SignerError> {
        Err(SignerError::Rejected("user denied message signature".into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitBehavior {
    Include,
    Revert,
    Fail(ChainError),
}

/// Paymaster double that behaves like the contract: it accepts a submission only
/// with the current nonce and then advances it.
pub struct MockPaymaster {
    state: Mutex<OnChainState>,
    relayer: Address,
    behavior: Mutex<SubmitBehavior>,
    reads_fail: Mutex<bool>,
    submissions: Mutex<Vec<SignedAuthorization>>,
}

impl MockPaymaster {
    pub fn new(state: OnChainState) -> Self {
        Self {
            state: Mutex::new(state),
            relayer: RELAYER,
            behavior: Mutex::new(SubmitBehavior::Include),
            reads_fail: Mutex::new(false),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_relayer(mut self, relayer: Address) -> Self {
        self.relayer = relayer;
        self
    }

    pub fn set_behavior(&self, behavior: SubmitBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    pub fn set_reads_fail(&self, fail: bool) {
        *self.reads_fail.lock().unwrap() = fail;
    }

    pub fn set_nonce(&self, actor: Address, nonce: U256) {
        self.state.lock().unwrap().nonces.insert(actor, nonce);
    }

    pub fn set_paused(&self, paused: bool) {
        self.state.lock().unwrap().paused = paused;
    }

    pub fn state(&self) -> OnChainState {
        self.state.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<SignedAuthorization> {
        self.submissions.lock().unwrap().clone()
    }

    fn check_reads(&self) -> Result<(), ChainError> {
        if *self.reads_fail.lock().unwrap() {
            Err(ChainError::Transport("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl PaymasterReader for MockPaymaster {
    async fn get_nonce(&self, actor: Address) -> Result<U256, ChainError> {
        self.check_reads()?;
        Ok(self.state.lock().unwrap().current_nonce_for(&actor))
    }

    async fn get_allowed_target(&self) -> Result<Address, ChainError> {
        self.check_reads()?;
        Ok(self.state.lock().unwrap().allowed_target)
    }

    async fn is_initialized(&self) -> Result<bool, ChainError> {
        self.check_reads()?;
        Ok(self.state.lock().unwrap().initialized)
    }

    async fn is_paused(&self) -> Result<bool, ChainError> {
        self.check_reads()?;
        Ok(self.state.lock().unwrap().paused)
    }
}

#[async_trait::async_trait]
impl PaymasterSubmitter for MockPaymaster {
    fn relayer_address(&self) -> Address {
        self.relayer
    }

    async fn submit(&self, signed: &SignedAuthorization) -> Result<SubmissionReceipt, ChainError> {
        let behavior = self.behavior.lock().unwrap().clone();
        if let SubmitBehavior::Fail(error) = &behavior {
            return Err(error.clone());
        }
        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(signed.clone());
        let tx_hash = keccak256(U256::from(submissions.len()).to_be_bytes::<32>());
        let mut state = self.state.lock().unwrap();
        let included = behavior == SubmitBehavior::Include
            && state.current_nonce_for(&signed.actor()) == signed.nonce();
        if !included {
            return Ok(SubmissionReceipt {
                tx_hash,
                success: false,
                return_data: None,
            });
        }
        let next = signed.nonce() + U256::from(1);
        state.nonces.insert(signed.actor(), next);
        Ok(SubmissionReceipt {
            tx_hash,
            success: true,
            return_data: Some(Bytes::from_static(b"ok")),
        })
    }
}
