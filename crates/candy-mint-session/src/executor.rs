use crate::{
    Clock, ConfirmationStatus, LedgerClient, MintConfig, MintError, MintResult, SystemClock,
};
use candy_mint_sdk::{
    build_mint_one_token_tx, CandyMachineAccount, MintAccounts, MINT_ACCOUNT_SPACE,
};
use chrono::{DateTime, Utc};
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::{Transaction, TransactionError},
};
use std::sync::Arc;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Wallet identity able to sign for the buyer
pub type WalletSigner = Arc<dyn Signer + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The transaction executed and the ledger reported an error
    Ledger(TransactionError),
    /// No terminal status within the timeout; the outcome is unknown
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintStatus {
    Pending,
    Confirmed,
    Failed(FailureReason),
}

/// One submitted mint transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintAttempt {
    pub status: MintStatus,
    pub transaction_id: Signature,
    pub submitted_at: DateTime<Utc>,
    /// Address of the token mint created by this attempt
    pub mint: Pubkey,
}

impl MintAttempt {
    fn submitted(transaction_id: Signature, mint: Pubkey, submitted_at: DateTime<Utc>) -> Self {
        Self {
            status: MintStatus::Pending,
            transaction_id,
            submitted_at,
            mint,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.status, MintStatus::Pending)
    }
}

/// Everything needed to mint one item
#[derive(Clone)]
pub struct MintRequest {
    pub candy_machine_id: Pubkey,
    pub candy_machine: CandyMachineAccount,
    pub buyer: WalletSigner,
    pub treasury: Pubkey,
}

impl std::fmt::Debug for MintRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MintRequest")
            .field("candy_machine_id", &self.candy_machine_id)
            .field("buyer", &self.buyer.pubkey())
            .field("treasury", &self.treasury)
            .finish()
    }
}

/// Builds, submits and confirms mint transactions.
///
/// The executor itself does not guard against concurrent calls; the session
/// only hands out a `MintRequest` from the `Active` state.
pub struct MintExecutor<L> {
    ledger: Arc<L>,
    config: MintConfig,
    clock: Arc<dyn Clock>,
}

impl<L> Clone for MintExecutor<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            config: self.config.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<L: LedgerClient> MintExecutor<L> {
    pub fn new(ledger: Arc<L>, config: MintConfig) -> Self {
        Self {
            ledger,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Stamp attempts with `clock` instead of the system time
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &MintConfig {
        &self.config
    }

    /// Submit one mint transaction and poll until it is terminal or the timeout hits.
    ///
    /// `Err` means nothing was broadcast. `Ok` always carries a terminal status;
    /// `Failed(Timeout)` does not mean the transaction was dropped.
    pub async fn mint(&self, request: &MintRequest) -> MintResult<MintAttempt> {
        let mint_keypair = Keypair::new();
        let accounts = MintAccounts {
            candy_machine_id: request.candy_machine_id,
            payer: request.buyer.pubkey(),
            treasury: request.treasury,
            mint: mint_keypair.pubkey(),
        };

        let mint_rent = self
            .ledger
            .get_minimum_balance_for_rent_exemption(MINT_ACCOUNT_SPACE as usize)
            .await?;
        let recent_blockhash = self.ledger.get_latest_blockhash().await?;

        let mut transaction = build_mint_one_token_tx(
            &request.candy_machine,
            &accounts,
            mint_rent,
            recent_blockhash,
        )?;
        sign_transaction(
            &mut transaction,
            request.buyer.as_ref(),
            &mint_keypair,
            recent_blockhash,
        )?;

        let signature = self.ledger.send_transaction(&transaction).await?;
        info!(
            "Submitted mint transaction {} for buyer {}",
            signature, accounts.payer
        );

        let mut attempt = MintAttempt::submitted(signature, accounts.mint, self.clock.now());
        attempt.status = self.await_confirmation(&signature).await;
        Ok(attempt)
    }

    /// Poll a signature until it is terminal, giving up after `tx_timeout`
    pub async fn await_confirmation(&self, signature: &Signature) -> MintStatus {
        match timeout(self.config.tx_timeout, self.poll_until_terminal(signature)).await {
            Ok(status) => status,
            Err(_) => {
                warn!(
                    "No confirmation for {} after {:?}; outcome unknown until next refresh",
                    signature, self.config.tx_timeout
                );
                MintStatus::Failed(FailureReason::Timeout)
            }
        }
    }

    async fn poll_until_terminal(&self, signature: &Signature) -> MintStatus {
        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self
                .ledger
                .get_signature_status(signature, self.config.commitment)
                .await
            {
                Ok(ConfirmationStatus::Pending) => {}
                Ok(ConfirmationStatus::Succeeded) => {
                    info!("Mint transaction {} confirmed", signature);
                    return MintStatus::Confirmed;
                }
                Ok(ConfirmationStatus::Failed(err)) => {
                    warn!("Mint transaction {} failed: {}", signature, err);
                    return MintStatus::Failed(FailureReason::Ledger(err));
                }
                // A failed poll is not a failed transaction; keep polling until the timeout
                Err(e) => debug!("Status poll for {} failed: {}", signature, e),
            }
        }
    }
}

fn sign_transaction(
    transaction: &mut Transaction,
    buyer: &dyn Signer,
    mint_keypair: &Keypair,
    recent_blockhash: Hash,
) -> MintResult<()> {
    let signers: Vec<&dyn Signer> = vec![buyer, mint_keypair];
    transaction
        .try_sign(&signers, recent_blockhash)
        .map_err(|e| MintError::Signing(e.to_string()))
}
