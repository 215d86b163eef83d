//! Shared scaffolding for exercising the client against the in-process
//! ledger: funded wallets, a manual clock, and a signer that always refuses.

use crate::{
    ledger::{
        SignError,
        Signer,
    },
    local::LocalLedger,
    signer::KeySigner,
    tx::{
        SignedTransaction,
        Transaction,
    },
    types::Address,
};

pub const STARTING_GAS: u64 = 1_000_000;
pub const GENESIS_TIME_MS: u64 = 1_700_000_000_000;

pub struct TestContext {
    ledger: LocalLedger,
    alice: KeySigner,
    bob: KeySigner,
}

impl TestContext {
    pub fn new() -> Self {
        let ledger = LocalLedger::with_manual_clock(GENESIS_TIME_MS);
        let alice = KeySigner::from_secret([0xa1; 32]);
        let bob = KeySigner::from_secret([0xb0; 32]);
        ledger.faucet(alice.address(), STARTING_GAS);
        ledger.faucet(bob.address(), STARTING_GAS);
        Self { ledger, alice, bob }
    }

    pub fn ledger(&self) -> LocalLedger {
        self.ledger.clone()
    }

    pub fn alice(&self) -> KeySigner {
        self.alice.clone()
    }

    pub fn bob(&self) -> KeySigner {
        self.bob.clone()
    }

    pub fn advance_time(&self, ms: u64) {
        self.ledger.advance_time(ms);
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A wallet that declines every signature request.
#[derive(Clone)]
pub struct RejectingSigner {
    address: Address,
}

impl RejectingSigner {
    pub fn new() -> Self {
        Self {
            address: KeySigner::from_secret([0xee; 32]).address(),
        }
    }
}

impl Default for RejectingSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl Signer for RejectingSigner {
    fn address(&self) -> Address {
        self.address
    }

    fn sign(&self, _tx: Transaction) -> Result<SignedTransaction, SignError> {
        Err(SignError::Rejected)
    }
}
