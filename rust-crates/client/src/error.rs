use tamagosui_chain::ledger::LedgerError;
use thiserror::Error;

/// Why a user action did not go through. Everything here is transient: the
/// UI stays interactive and the action can be retried.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Precondition: nothing was submitted.
    #[error("no connected account")]
    NoAccount,
    /// Another mutation is still in flight; nothing was submitted.
    #[error("another action is pending: {0}")]
    ActionInFlight(&'static str),
    /// The user declined to sign.
    #[error("signature request rejected by wallet")]
    WalletRejected,
    /// The ledger reported terminal failure; the contract message verbatim.
    #[error("transaction failed: {0}")]
    ExecutionFailure(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
