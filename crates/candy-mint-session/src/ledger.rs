use crate::LedgerResult;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::Transaction, transaction::TransactionError,
};
use std::future::Future;

/// Status of a submitted transaction as seen by one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Not seen yet, or seen below the requested commitment
    Pending,
    Succeeded,
    Failed(TransactionError),
}

impl ConfirmationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConfirmationStatus::Pending)
    }
}

/// Read/write access to the remote ledger.
///
/// Futures are `Send` so a session can run on a spawned task.
pub trait LedgerClient: Send + Sync {
    /// Raw data of an account; `AccountNotFound` if it does not exist
    fn get_account_data(
        &self,
        address: &Pubkey,
    ) -> impl Future<Output = LedgerResult<Vec<u8>>> + Send;

    /// Balance in lamports
    fn get_balance(&self, address: &Pubkey) -> impl Future<Output = LedgerResult<u64>> + Send;

    fn get_latest_blockhash(&self) -> impl Future<Output = LedgerResult<Hash>> + Send;

    fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> impl Future<Output = LedgerResult<u64>> + Send;

    /// Broadcast a signed transaction. Returning a signature does not mean it executed.
    fn send_transaction(
        &self,
        transaction: &Transaction,
    ) -> impl Future<Output = LedgerResult<Signature>> + Send;

    /// One status poll for a submitted transaction
    fn get_signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> impl Future<Output = LedgerResult<ConfirmationStatus>> + Send;
}
