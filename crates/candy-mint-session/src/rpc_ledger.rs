use crate::{ConfirmationStatus, LedgerClient, LedgerError, LedgerResult, MintConfig};
use solana_client::{nonblocking::rpc_client::RpcClient, rpc_config::RpcSendTransactionConfig};
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};
use std::sync::Arc;
use tracing::debug;

/// `LedgerClient` backed by a Solana JSON-RPC node
pub struct RpcLedgerClient {
    rpc_client: Arc<RpcClient>,
    send_config: RpcSendTransactionConfig,
}

impl RpcLedgerClient {
    /// Create a client with default commitment (confirmed)
    pub fn new(rpc_url: String) -> Self {
        let rpc_client = RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed());
        Self::with_config(Arc::new(rpc_client), &MintConfig::default())
    }

    pub fn with_config(rpc_client: Arc<RpcClient>, config: &MintConfig) -> Self {
        let send_config = RpcSendTransactionConfig {
            skip_preflight: config.skip_preflight,
            preflight_commitment: Some(config.commitment.commitment),
            encoding: None,
            max_retries: config.send_max_retries,
            min_context_slot: None,
        };

        Self {
            rpc_client,
            send_config,
        }
    }

    /// Get the RPC client (for advanced operations)
    pub fn rpc_client(&self) -> &RpcClient {
        &self.rpc_client
    }
}

impl LedgerClient for RpcLedgerClient {
    async fn get_account_data(&self, address: &Pubkey) -> LedgerResult<Vec<u8>> {
        let response = self
            .rpc_client
            .get_account_with_commitment(address, self.rpc_client.commitment())
            .await?;

        response
            .value
            .map(|account| account.data)
            .ok_or(LedgerError::AccountNotFound(*address))
    }

    async fn get_balance(&self, address: &Pubkey) -> LedgerResult<u64> {
        Ok(self.rpc_client.get_balance(address).await?)
    }

    async fn get_latest_blockhash(&self) -> LedgerResult<Hash> {
        Ok(self.rpc_client.get_latest_blockhash().await?)
    }

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> LedgerResult<u64> {
        Ok(self
            .rpc_client
            .get_minimum_balance_for_rent_exemption(data_len)
            .await?)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> LedgerResult<Signature> {
        Ok(self
            .rpc_client
            .send_transaction_with_config(transaction, self.send_config)
            .await?)
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> LedgerResult<ConfirmationStatus> {
        let response = self.rpc_client.get_signature_statuses(&[*signature]).await?;

        let status = match response.value.into_iter().next().flatten() {
            Some(status) => status,
            None => return Ok(ConfirmationStatus::Pending),
        };

        if !status.satisfies_commitment(commitment) {
            debug!(
                "Signature {} seen at {:?}, waiting for {:?}",
                signature, status.confirmation_status, commitment.commitment
            );
            return Ok(ConfirmationStatus::Pending);
        }

        Ok(match status.err {
            Some(err) => ConfirmationStatus::Failed(err),
            None => ConfirmationStatus::Succeeded,
        })
    }
}
