use crate::{
    events::{
        ChainEvent,
        EventKind,
    },
    tx::{
        SignedTransaction,
        Transaction,
    },
    types::{
        Accessory,
        AccessoryKind,
        AccessoryListing,
        Address,
        GameBalance,
        ObjectId,
        Pet,
        PetListing,
        TxDigest,
    },
};
use serde::{
    Deserialize,
    Serialize,
};
use std::future::Future;
use thiserror::Error;

/// Terminal outcome of a submitted transaction once the ledger has processed
/// it. A failure carries the contract-reported error string verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    Success,
    Failure { error: String },
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger transport error: {0}")]
    Transport(String),
    #[error("unknown transaction digest {0}")]
    UnknownDigest(TxDigest),
    #[error("gateway responded with {status}: {body}")]
    Gateway { status: u16, body: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum SignError {
    #[error("signature request rejected by wallet")]
    Rejected,
}

/// The connected wallet. Signing is user-paced and may be declined.
pub trait Signer: Send + Sync {
    fn address(&self) -> Address;
    fn sign(&self, tx: Transaction) -> Result<SignedTransaction, SignError>;
}

/// The external ledger, treated as a black box: submit a signed transaction
/// and get a digest, await the digest and get a terminal status, and read
/// objects and recently emitted events. Implemented by the in-process
/// [`LocalLedger`](crate::local::LocalLedger) and the HTTP gateway client
/// [`HttpLedger`](crate::http::HttpLedger).
pub trait Ledger: Send + Sync {
    /// Submit a signed transaction for execution.
    fn submit(
        &self,
        tx: SignedTransaction,
    ) -> impl Future<Output = Result<TxDigest, LedgerError>> + Send;

    /// Await the terminal status of a previously submitted transaction. No
    /// timeout is applied here; a hung endpoint stalls only the caller.
    fn wait_for_confirmation(
        &self,
        digest: &TxDigest,
    ) -> impl Future<Output = Result<TxStatus, LedgerError>> + Send;

    /// The pet owned by the given address, if any.
    fn owned_pet(
        &self,
        owner: &Address,
    ) -> impl Future<Output = Result<Option<Pet>, LedgerError>> + Send;

    /// Loose accessories owned by the given address (equipped ones excluded).
    fn owned_accessories(
        &self,
        owner: &Address,
    ) -> impl Future<Output = Result<Vec<Accessory>, LedgerError>> + Send;

    /// Accessories currently equipped to the given pet, one per kind slot.
    fn equipped_accessories(
        &self,
        pet: &ObjectId,
    ) -> impl Future<Output = Result<Vec<(AccessoryKind, Accessory)>, LedgerError>> + Send;

    /// The shared game-balance configuration object.
    fn game_balance(&self)
    -> impl Future<Output = Result<GameBalance, LedgerError>> + Send;

    /// Recently emitted events of the given kind, newest first, bounded by
    /// `limit`. Subject to indexing lag; completeness is not guaranteed.
    fn query_events(
        &self,
        kind: EventKind,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ChainEvent>, LedgerError>> + Send;

    /// Resolve a pet listing object by id. `None` when the object does not
    /// exist; an existing listing without an embedded pet is inactive.
    fn pet_listing(
        &self,
        id: &ObjectId,
    ) -> impl Future<Output = Result<Option<PetListing>, LedgerError>> + Send;

    /// Resolve an accessory listing object by id.
    fn accessory_listing(
        &self,
        id: &ObjectId,
    ) -> impl Future<Output = Result<Option<AccessoryListing>, LedgerError>> + Send;
}
