//! Ledger-facing half of the Tamagosui client: the on-chain data model, the
//! transaction builder, the black-box [`Ledger`](ledger::Ledger) and
//! [`Signer`](ledger::Signer) seams, and their two implementations: an
//! in-process simulated ledger and an HTTP gateway client.

pub mod deployment;

pub mod events;

pub mod http;

pub mod ledger;

pub mod local;

pub mod signer;

pub mod test_helpers;

pub mod tx;

pub mod types;
