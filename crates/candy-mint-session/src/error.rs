use candy_mint_sdk::SdkError;
use solana_sdk::{pubkey::Pubkey, transaction::TransactionError};
use thiserror::Error;

pub type LedgerResult<T> = Result<T, LedgerError>;
pub type StateResult<T> = Result<T, StateError>;
pub type MintResult<T> = Result<T, MintError>;
pub type SessionResult<T> = Result<T, SessionError>;

/// Failures talking to the ledger
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("RPC error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    #[error("Account not found: {0}")]
    AccountNotFound(Pubkey),

    #[error("Transaction rejected before broadcast: {message}")]
    TransactionRejected {
        error: TransactionError,
        message: String,
    },

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

impl LedgerError {
    /// The transaction error behind a rejected submission, if the ledger reported one
    pub fn transaction_error(&self) -> Option<TransactionError> {
        match self {
            LedgerError::Rpc(e) => e.get_transaction_error(),
            LedgerError::TransactionRejected { error, .. } => Some(error.clone()),
            LedgerError::AccountNotFound(_) | LedgerError::Unavailable(_) => None,
        }
    }
}

/// Reading event state failed. Every variant is a connection error from the
/// session's point of view.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to read candy machine: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Malformed candy machine account: {0}")]
    MalformedAccount(#[from] SdkError),

    #[error("Candy machine reports {redeemed} redeemed of {available} available")]
    InconsistentSupply { available: u64, redeemed: u64 },

    #[error("Go-live date out of range: {0}")]
    InvalidStartTime(i64),
}

/// Mint failures that happen before a transaction id exists
#[derive(Error, Debug)]
pub enum MintError {
    #[error("Failed to build mint transaction: {0}")]
    Build(#[from] SdkError),

    #[error("Failed to sign mint transaction: {0}")]
    Signing(String),

    #[error("Could not submit mint transaction: {0}")]
    Connection(LedgerError),

    #[error("Mint rejected by the program: {message}")]
    Rejected {
        error: TransactionError,
        message: String,
    },
}

impl From<LedgerError> for MintError {
    fn from(error: LedgerError) -> Self {
        match error.transaction_error() {
            Some(transaction_error) => MintError::Rejected {
                error: transaction_error,
                message: error.to_string(),
            },
            None => MintError::Connection(error),
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session driver has stopped")]
    Closed,
}
