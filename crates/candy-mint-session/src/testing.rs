/*!
# Test Support

An in-memory `LedgerClient` with scripted behaviour, a settable clock and
account fixtures. Used by this crate's unit tests and the scenario tests under
`tests/`.
*/

use crate::{Clock, ConfirmationStatus, LedgerClient, LedgerError, LedgerResult};
use candy_mint_sdk::{CandyMachineAccount, CandyMachineData, CANDY_MACHINE_PROGRAM_ID};
use chrono::{DateTime, Duration, Utc};
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};
use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Mutex, MutexGuard, PoisonError},
};

/// Rent the fake charges for a mint account
pub const TEST_MINT_RENT_LAMPORTS: u64 = 1_461_600;
/// Fee the fake charges per submitted transaction
pub const TEST_FEE_LAMPORTS: u64 = 10_000;

/// How signature status polls answer for every submitted transaction
#[derive(Debug, Clone)]
pub enum ConfirmationScript {
    Immediately(ConfirmationStatus),
    /// Report `Pending` for this many polls first
    AfterPolls(usize, ConfirmationStatus),
    Never,
}

impl Default for ConfirmationScript {
    fn default() -> Self {
        ConfirmationScript::Immediately(ConfirmationStatus::Succeeded)
    }
}

#[derive(Default)]
struct FakeLedgerState {
    accounts: HashMap<Pubkey, Vec<u8>>,
    balances: HashMap<Pubkey, u64>,
    account_read_error: Option<String>,
    balance_read_error: Option<String>,
    submission_errors: VecDeque<LedgerError>,
    confirmation: ConfirmationScript,
    failing_status_polls: usize,
    polls_by_signature: HashMap<Signature, usize>,
    settled: HashSet<Signature>,
    submitted: Vec<Transaction>,
    account_reads: usize,
    balance_reads: usize,
    status_polls: usize,
}

/// In-memory ledger.
///
/// A successful confirmation also charges the fee and price to the payer and
/// redeems one item on the candy machine named in the transaction, so refreshes
/// after a mint see the new supply.
#[derive(Default)]
pub struct FakeLedger {
    state: Mutex<FakeLedgerState>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeLedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_account_data(&self, address: &Pubkey, data: Vec<u8>) {
        self.lock().accounts.insert(*address, data);
    }

    pub fn set_candy_machine(&self, address: &Pubkey, candy_machine: &CandyMachineAccount) {
        let data = candy_machine
            .to_account_data()
            .unwrap_or_else(|e| panic!("fixture candy machine must encode: {}", e));
        self.set_account_data(address, data);
    }

    pub fn candy_machine(&self, address: &Pubkey) -> Option<CandyMachineAccount> {
        let state = self.lock();
        let data = state.accounts.get(address)?;
        CandyMachineAccount::try_from_account_data(data).ok()
    }

    pub fn set_balance(&self, address: &Pubkey, lamports: u64) {
        self.lock().balances.insert(*address, lamports);
    }

    pub fn balance(&self, address: &Pubkey) -> u64 {
        self.lock().balances.get(address).copied().unwrap_or(0)
    }

    pub fn fail_account_reads(&self, message: &str) {
        self.lock().account_read_error = Some(message.to_string());
    }

    pub fn fail_balance_reads(&self, message: &str) {
        self.lock().balance_read_error = Some(message.to_string());
    }

    pub fn restore_reads(&self) {
        let mut state = self.lock();
        state.account_read_error = None;
        state.balance_read_error = None;
    }

    pub fn fail_next_submission(&self, error: LedgerError) {
        self.lock().submission_errors.push_back(error);
    }

    pub fn set_confirmation(&self, script: ConfirmationScript) {
        self.lock().confirmation = script;
    }

    /// Make the next `count` status polls fail at the transport level
    pub fn fail_status_polls(&self, count: usize) {
        self.lock().failing_status_polls = count;
    }

    pub fn submitted_count(&self) -> usize {
        self.lock().submitted.len()
    }

    pub fn last_submitted(&self) -> Option<Transaction> {
        self.lock().submitted.last().cloned()
    }

    pub fn account_reads(&self) -> usize {
        self.lock().account_reads
    }

    pub fn balance_reads(&self) -> usize {
        self.lock().balance_reads
    }

    pub fn status_polls(&self) -> usize {
        self.lock().status_polls
    }
}

impl FakeLedgerState {
    fn settle_successful_mint(&mut self, signature: &Signature) {
        let transaction = match self
            .submitted
            .iter()
            .find(|tx| tx.signatures.first() == Some(signature))
        {
            Some(tx) => tx.clone(),
            None => return,
        };

        let payer = transaction.message.account_keys[0];
        let candy_machine_id = transaction
            .message
            .instructions
            .iter()
            .filter(|ix| {
                transaction.message.account_keys[ix.program_id_index as usize]
                    == CANDY_MACHINE_PROGRAM_ID
            })
            .find_map(|ix| ix.accounts.get(1))
            .map(|index| transaction.message.account_keys[*index as usize]);

        let Some(candy_machine_id) = candy_machine_id else {
            return;
        };
        let Some(mut candy_machine) = self
            .accounts
            .get(&candy_machine_id)
            .and_then(|data| CandyMachineAccount::try_from_account_data(data).ok())
        else {
            return;
        };

        candy_machine.items_redeemed += 1;
        if let Ok(data) = candy_machine.to_account_data() {
            self.accounts.insert(candy_machine_id, data);
        }

        let balance = self.balances.entry(payer).or_insert(0);
        *balance = balance
            .saturating_sub(candy_machine.data.price)
            .saturating_sub(TEST_MINT_RENT_LAMPORTS);
    }
}

impl LedgerClient for FakeLedger {
    async fn get_account_data(&self, address: &Pubkey) -> LedgerResult<Vec<u8>> {
        let mut state = self.lock();
        state.account_reads += 1;
        if let Some(message) = &state.account_read_error {
            return Err(LedgerError::Unavailable(message.clone()));
        }
        state
            .accounts
            .get(address)
            .cloned()
            .ok_or(LedgerError::AccountNotFound(*address))
    }

    async fn get_balance(&self, address: &Pubkey) -> LedgerResult<u64> {
        let mut state = self.lock();
        state.balance_reads += 1;
        if let Some(message) = &state.balance_read_error {
            return Err(LedgerError::Unavailable(message.clone()));
        }
        Ok(state.balances.get(address).copied().unwrap_or(0))
    }

    async fn get_latest_blockhash(&self) -> LedgerResult<Hash> {
        Ok(Hash::new_unique())
    }

    async fn get_minimum_balance_for_rent_exemption(&self, _data_len: usize) -> LedgerResult<u64> {
        Ok(TEST_MINT_RENT_LAMPORTS)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> LedgerResult<Signature> {
        let mut state = self.lock();
        if let Some(error) = state.submission_errors.pop_front() {
            return Err(error);
        }

        let signature = transaction.signatures.first().copied().unwrap_or_default();
        let payer = transaction.message.account_keys[0];
        let balance = state.balances.entry(payer).or_insert(0);
        *balance = balance.saturating_sub(TEST_FEE_LAMPORTS);
        state.submitted.push(transaction.clone());
        Ok(signature)
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
        _commitment: CommitmentConfig,
    ) -> LedgerResult<ConfirmationStatus> {
        let mut state = self.lock();
        state.status_polls += 1;
        if state.failing_status_polls > 0 {
            state.failing_status_polls -= 1;
            return Err(LedgerError::Unavailable("status poll failed".to_string()));
        }

        let polls = state.polls_by_signature.entry(*signature).or_insert(0);
        *polls += 1;
        let polls = *polls;

        let status = match state.confirmation.clone() {
            ConfirmationScript::Immediately(status) => status,
            ConfirmationScript::AfterPolls(pending_polls, status) if polls > pending_polls => {
                status
            }
            ConfirmationScript::AfterPolls(..) | ConfirmationScript::Never => {
                ConfirmationStatus::Pending
            }
        };

        // Only the first successful observation changes ledger state
        if status == ConfirmationStatus::Succeeded && state.settled.insert(*signature) {
            state.settle_successful_mint(signature);
        }

        Ok(status)
    }
}

/// Clock that only moves when told to
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// SOL-priced candy machine fixture (2 SOL per item)
pub fn sample_candy_machine(
    items_available: u64,
    items_redeemed: u64,
    go_live_date: Option<i64>,
) -> CandyMachineAccount {
    CandyMachineAccount {
        authority: Pubkey::new_unique(),
        wallet: Pubkey::new_unique(),
        token_mint: None,
        config: Pubkey::new_unique(),
        data: CandyMachineData {
            uuid: "SOLKEY".to_string(),
            price: 2_000_000_000,
            items_available,
            go_live_date,
        },
        items_redeemed,
        bump: 255,
    }
}
