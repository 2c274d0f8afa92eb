/*!
# Failure Classification

Turns the two shapes a mint failure arrives in into one of a handful of user
outcomes. A numeric program error code is authoritative; a free-form message is
only scanned for known markers.
*/

use crate::MintError;
use candy_mint_sdk::CandyMachineError;
use solana_sdk::{instruction::InstructionError, transaction::TransactionError};

pub const SOLD_OUT_MESSAGE: &str = "SOLD OUT!";
pub const NOT_STARTED_MESSAGE: &str = "Minting period hasn't started yet.";
pub const INSUFFICIENT_FUNDS_MESSAGE: &str =
    "Insufficient funds to mint. Please fund your wallet.";
pub const DEFAULT_FAILURE_MESSAGE: &str = "Minting failed! Please try again!";
pub const MINT_SUCCEEDED_MESSAGE: &str = "Congratulations! Mint succeeded!";
pub const MINT_RETRY_MESSAGE: &str = "Mint failed! Please try again!";

/// Lowercase markers for insufficient funds. `0x135` is program error 309.
const INSUFFICIENT_FUNDS_MARKERS: [&str; 3] =
    ["0x135", "insufficient funds", "insufficient lamports"];

/// Lowercase markers for an empty candy machine. `0x137` is program error 311.
const SOLD_OUT_MARKERS: [&str; 1] = ["0x137"];

/// A mint failure as it reaches the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintFailure {
    /// Program error code, with the program's own message when known
    Structured { code: u32, message: Option<String> },
    /// Anything else, as text
    Unstructured(String),
}

impl MintFailure {
    pub fn from_transaction_error(error: &TransactionError) -> Self {
        match error {
            TransactionError::InstructionError(_, InstructionError::Custom(code)) => {
                MintFailure::Structured {
                    code: *code,
                    message: CandyMachineError::from_code(*code)
                        .map(|program_error| program_error.message().to_string()),
                }
            }
            other => MintFailure::Unstructured(other.to_string()),
        }
    }

    pub fn from_mint_error(error: &MintError) -> Self {
        match error {
            MintError::Rejected { error, .. } => Self::from_transaction_error(error),
            other => MintFailure::Unstructured(other.to_string()),
        }
    }
}

/// What the user is told
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserOutcome {
    SoldOut,
    NotStarted,
    InsufficientFunds,
    Generic(String),
}

impl UserOutcome {
    pub fn message(&self) -> &str {
        match self {
            UserOutcome::SoldOut => SOLD_OUT_MESSAGE,
            UserOutcome::NotStarted => NOT_STARTED_MESSAGE,
            UserOutcome::InsufficientFunds => INSUFFICIENT_FUNDS_MESSAGE,
            UserOutcome::Generic(message) => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub outcome: UserOutcome,
    /// Whether the session must treat the event as sold out from now on
    pub latches_sold_out: bool,
}

impl Classification {
    fn new(outcome: UserOutcome) -> Self {
        Self {
            outcome,
            latches_sold_out: false,
        }
    }
}

pub fn classify(failure: &MintFailure) -> Classification {
    match failure {
        MintFailure::Structured { code, message } => match CandyMachineError::from_code(*code) {
            Some(CandyMachineError::CandyMachineEmpty) => Classification {
                outcome: UserOutcome::SoldOut,
                latches_sold_out: true,
            },
            Some(CandyMachineError::CandyMachineNotLiveYet) => {
                Classification::new(UserOutcome::NotStarted)
            }
            _ => Classification::new(UserOutcome::Generic(
                message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            )),
        },
        MintFailure::Unstructured(message) => {
            let message = message.to_lowercase();
            let outcome = if contains_any(&message, &INSUFFICIENT_FUNDS_MARKERS) {
                UserOutcome::InsufficientFunds
            } else if contains_any(&message, &SOLD_OUT_MARKERS) {
                UserOutcome::SoldOut
            } else {
                UserOutcome::Generic(DEFAULT_FAILURE_MESSAGE.to_string())
            };
            Classification::new(outcome)
        }
    }
}

fn contains_any(haystack: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| haystack.contains(marker))
}
