use crate::{LedgerClient, StateError, StateResult};
use candy_mint_sdk::CandyMachineAccount;
use chrono::{DateTime, Utc};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::debug;

/// Supply and timing of one mint event, as last read from the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventState {
    pub candy_machine_id: Pubkey,
    /// Decoded account; the mint instruction needs its config and treasury
    pub candy_machine: CandyMachineAccount,
    pub items_available: u64,
    pub items_redeemed: u64,
    /// `None` when the candy machine has no go-live date configured
    pub start_time: Option<DateTime<Utc>>,
}

impl EventState {
    pub fn from_account(
        candy_machine_id: Pubkey,
        candy_machine: CandyMachineAccount,
    ) -> StateResult<Self> {
        let items_available = candy_machine.data.items_available;
        let items_redeemed = candy_machine.items_redeemed;
        if items_redeemed > items_available {
            return Err(StateError::InconsistentSupply {
                available: items_available,
                redeemed: items_redeemed,
            });
        }

        let start_time = match candy_machine.data.go_live_date {
            Some(seconds) => Some(
                DateTime::<Utc>::from_timestamp(seconds, 0)
                    .ok_or(StateError::InvalidStartTime(seconds))?,
            ),
            None => None,
        };

        Ok(Self {
            candy_machine_id,
            candy_machine,
            items_available,
            items_redeemed,
            start_time,
        })
    }

    pub fn items_remaining(&self) -> u64 {
        self.items_available.saturating_sub(self.items_redeemed)
    }

    pub fn is_sold_out(&self) -> bool {
        self.items_remaining() == 0
    }

    /// Treasury wallet recorded on the candy machine
    pub fn treasury(&self) -> Pubkey {
        self.candy_machine.wallet
    }
}

/// Read-only view of the event on the ledger
pub struct StateReader<L> {
    ledger: Arc<L>,
}

impl<L: LedgerClient> StateReader<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Read and decode the candy machine. Performs no writes and no retries.
    pub async fn fetch(
        &self,
        wallet: &Pubkey,
        candy_machine_id: &Pubkey,
    ) -> StateResult<EventState> {
        let account_data = self.ledger.get_account_data(candy_machine_id).await?;
        let candy_machine = CandyMachineAccount::try_from_account_data(&account_data)?;
        let event_state = EventState::from_account(*candy_machine_id, candy_machine)?;

        debug!(
            "Candy machine {} for {}: {}/{} redeemed, go-live {:?}",
            candy_machine_id,
            wallet,
            event_state.items_redeemed,
            event_state.items_available,
            event_state.start_time
        );

        Ok(event_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_candy_machine, FakeLedger};
    use crate::LedgerError;

    #[tokio::test]
    async fn test_fetch_derives_remaining_supply() {
        let candy_machine_id = Pubkey::new_unique();
        let ledger = Arc::new(FakeLedger::new());
        ledger.set_candy_machine(
            &candy_machine_id,
            &sample_candy_machine(10, 4, Some(1_640_000_000)),
        );

        let reader = StateReader::new(ledger.clone());
        let state = reader
            .fetch(&Pubkey::new_unique(), &candy_machine_id)
            .await
            .unwrap();

        assert_eq!(state.items_available, 10);
        assert_eq!(state.items_redeemed, 4);
        assert_eq!(state.items_remaining(), 6);
        assert!(!state.is_sold_out());
        assert_eq!(
            state.start_time,
            DateTime::<Utc>::from_timestamp(1_640_000_000, 0)
        );
        assert_eq!(ledger.account_reads(), 1);
    }

    #[tokio::test]
    async fn test_fetch_sold_out() {
        let candy_machine_id = Pubkey::new_unique();
        let ledger = Arc::new(FakeLedger::new());
        ledger.set_candy_machine(&candy_machine_id, &sample_candy_machine(10, 10, None));

        let state = StateReader::new(ledger)
            .fetch(&Pubkey::new_unique(), &candy_machine_id)
            .await
            .unwrap();

        assert_eq!(state.items_remaining(), 0);
        assert!(state.is_sold_out());
        assert_eq!(state.start_time, None);
    }

    #[tokio::test]
    async fn test_fetch_missing_account() {
        let ledger = Arc::new(FakeLedger::new());
        let result = StateReader::new(ledger)
            .fetch(&Pubkey::new_unique(), &Pubkey::new_unique())
            .await;

        assert!(matches!(
            result,
            Err(StateError::Ledger(LedgerError::AccountNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_fetch_malformed_account() {
        let candy_machine_id = Pubkey::new_unique();
        let ledger = Arc::new(FakeLedger::new());
        ledger.set_account_data(&candy_machine_id, vec![0u8; 16]);

        let result = StateReader::new(ledger)
            .fetch(&Pubkey::new_unique(), &candy_machine_id)
            .await;

        assert!(matches!(result, Err(StateError::MalformedAccount(_))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_over_redeemed_supply() {
        let candy_machine_id = Pubkey::new_unique();
        let ledger = Arc::new(FakeLedger::new());
        ledger.set_candy_machine(&candy_machine_id, &sample_candy_machine(10, 11, None));

        let result = StateReader::new(ledger)
            .fetch(&Pubkey::new_unique(), &candy_machine_id)
            .await;

        assert!(matches!(
            result,
            Err(StateError::InconsistentSupply {
                available: 10,
                redeemed: 11
            })
        ));
    }

    #[tokio::test]
    async fn test_fetch_surfaces_unavailable_ledger() {
        let candy_machine_id = Pubkey::new_unique();
        let ledger = Arc::new(FakeLedger::new());
        ledger.set_candy_machine(&candy_machine_id, &sample_candy_machine(10, 0, None));
        ledger.fail_account_reads("node is behind");

        let result = StateReader::new(ledger)
            .fetch(&Pubkey::new_unique(), &candy_machine_id)
            .await;

        assert!(matches!(
            result,
            Err(StateError::Ledger(LedgerError::Unavailable(_)))
        ));
    }
}
