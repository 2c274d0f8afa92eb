/*!
# Session Controller

The session state machine. Every external happening (wallet change, countdown
elapse, mint request, mint result, refresh) arrives as a [`SessionEvent`] and is
applied by [`SessionController::handle`]. The controller never sleeps or spawns;
when it needs a timer or a mint it returns a [`SessionCommand`] for the driver.

```text
Disconnected --attach--> ConnectedIdle --start passed--> Active --mint--> Minting
                              |                            ^                 |
                              +--start ahead--> CountingDown                 |
                                                                              v
                             any --sold out--> SoldOut (terminal)     Active / SoldOut
```
*/

use crate::{
    classify, Clock, EventState, FailureReason, LedgerClient, MintAttempt, MintConfig,
    MintExecutor, MintFailure, MintRequest, MintResult, MintStatus, StateReader, WalletSigner,
    MINT_RETRY_MESSAGE, MINT_SUCCEEDED_MESSAGE,
};
use chrono::{DateTime, Utc};
use solana_sdk::{pubkey::Pubkey, signer::Signer};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};

/// Shown when event state cannot be read
pub const STATE_READ_FAILED_MESSAGE: &str = "Could not load the mint state. Please try again!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    ConnectedIdle,
    CountingDown,
    Active,
    Minting,
    SoldOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    Success,
    Error,
    Info,
    Warning,
}

/// The single most recent alert
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertState {
    pub visible: bool,
    pub message: String,
    pub severity: Option<AlertSeverity>,
}

impl AlertState {
    fn show(&mut self, message: impl Into<String>, severity: AlertSeverity) {
        self.visible = true;
        self.message = message.into();
        self.severity = Some(severity);
    }

    fn dismiss(&mut self) {
        self.visible = false;
    }
}

pub enum SessionEvent {
    WalletAttached(WalletSigner),
    WalletDetached,
    CountdownElapsed,
    /// The only request the presentation layer makes
    MintRequested,
    MintFinished(MintResult<MintAttempt>),
    RefreshRequested,
    AlertDismissed,
}

impl std::fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::WalletAttached(wallet) => {
                f.debug_tuple("WalletAttached").field(&wallet.pubkey()).finish()
            }
            SessionEvent::WalletDetached => f.write_str("WalletDetached"),
            SessionEvent::CountdownElapsed => f.write_str("CountdownElapsed"),
            SessionEvent::MintRequested => f.write_str("MintRequested"),
            SessionEvent::MintFinished(result) => {
                f.debug_tuple("MintFinished").field(result).finish()
            }
            SessionEvent::RefreshRequested => f.write_str("RefreshRequested"),
            SessionEvent::AlertDismissed => f.write_str("AlertDismissed"),
        }
    }
}

/// Side effects the driver must carry out after a transition
#[derive(Debug)]
pub enum SessionCommand {
    /// Replace any pending countdown with one firing after this long
    ScheduleCountdown(Duration),
    CancelCountdown,
    ExecuteMint(MintRequest),
}

/// Fixed parameters of a session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub candy_machine_id: Pubkey,
    pub treasury: Pubkey,
    /// Start time shown before the first fetch, and used when the candy
    /// machine has no go-live date of its own
    pub configured_start_time: Option<DateTime<Utc>>,
}

/// Read-only copy of everything the presentation layer may show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub wallet: Option<Pubkey>,
    pub event: Option<EventState>,
    pub start_time: Option<DateTime<Utc>>,
    pub balance_lamports: Option<u64>,
    pub alert: AlertState,
    pub last_attempt: Option<MintAttempt>,
}

pub struct SessionController<L> {
    settings: SessionSettings,
    ledger: Arc<L>,
    reader: StateReader<L>,
    executor: MintExecutor<L>,
    clock: Arc<dyn Clock>,

    wallet: Option<WalletSigner>,
    state: SessionState,
    event: Option<EventState>,
    start_time: Option<DateTime<Utc>>,
    balance_lamports: Option<u64>,
    alert: AlertState,
    sold_out_latched: bool,
    last_attempt: Option<MintAttempt>,
    /// Set from `ExecuteMint` until its `MintFinished`, whatever the state does meanwhile
    mint_in_flight: bool,
    /// Wallet attached while `Minting`; applied once the mint finishes
    pending_wallet: Option<WalletSigner>,
}

impl<L: LedgerClient> SessionController<L> {
    pub fn new(
        settings: SessionSettings,
        ledger: Arc<L>,
        config: MintConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            start_time: settings.configured_start_time,
            settings,
            reader: StateReader::new(ledger.clone()),
            executor: MintExecutor::new(ledger.clone(), config).with_clock(clock.clone()),
            ledger,
            clock,
            wallet: None,
            state: SessionState::Disconnected,
            event: None,
            balance_lamports: None,
            alert: AlertState::default(),
            sold_out_latched: false,
            last_attempt: None,
            mint_in_flight: false,
            pending_wallet: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn alert(&self) -> &AlertState {
        &self.alert
    }

    pub fn executor(&self) -> &MintExecutor<L> {
        &self.executor
    }

    /// Whether an `ExecuteMint` has been issued and its result not yet handled
    pub fn mint_in_flight(&self) -> bool {
        self.mint_in_flight
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            wallet: self.wallet.as_ref().map(|wallet| wallet.pubkey()),
            event: self.event.clone(),
            start_time: self.start_time,
            balance_lamports: self.balance_lamports,
            alert: self.alert.clone(),
            last_attempt: self.last_attempt.clone(),
        }
    }

    /// Apply one event. This is the only place session state changes.
    pub async fn handle(&mut self, event: SessionEvent) -> Option<SessionCommand> {
        debug!("Session in {:?} handling {:?}", self.state, event);

        match event {
            SessionEvent::WalletAttached(wallet) => self.on_wallet_attached(wallet).await,
            SessionEvent::WalletDetached => self.on_wallet_detached(),
            SessionEvent::CountdownElapsed => {
                self.on_countdown_elapsed();
                None
            }
            SessionEvent::MintRequested => self.on_mint_requested(),
            SessionEvent::MintFinished(result) => self.on_mint_finished(result).await,
            SessionEvent::RefreshRequested => self.on_refresh().await,
            SessionEvent::AlertDismissed => {
                self.alert.dismiss();
                None
            }
        }
    }

    async fn on_wallet_attached(&mut self, wallet: WalletSigner) -> Option<SessionCommand> {
        if self.state == SessionState::Minting {
            info!(
                "Wallet {} attached during a mint; switching once it finishes",
                wallet.pubkey()
            );
            self.pending_wallet = Some(wallet);
            return None;
        }

        info!("Wallet {} attached", wallet.pubkey());
        self.wallet = Some(wallet);
        self.event = None;
        self.state = if self.sold_out_latched {
            SessionState::SoldOut
        } else {
            SessionState::ConnectedIdle
        };

        self.refresh_balance().await;
        self.refresh_event_state().await
    }

    fn on_wallet_detached(&mut self) -> Option<SessionCommand> {
        if self.state == SessionState::Minting {
            warn!("Wallet detached during a mint; its result will not be reported");
        }

        self.pending_wallet = None;
        self.wallet = None;
        self.event = None;
        self.balance_lamports = None;
        self.start_time = self.settings.configured_start_time;
        self.state = SessionState::Disconnected;
        Some(SessionCommand::CancelCountdown)
    }

    fn on_countdown_elapsed(&mut self) {
        if self.state == SessionState::CountingDown {
            self.activate();
        } else {
            debug!("Countdown elapse ignored in {:?}", self.state);
        }
    }

    fn on_mint_requested(&mut self) -> Option<SessionCommand> {
        if self.state != SessionState::Active {
            debug!("Mint request ignored in {:?}", self.state);
            return None;
        }
        if self.mint_in_flight {
            debug!("Mint request ignored; an earlier attempt is still pending");
            return None;
        }

        let (wallet, event) = match (&self.wallet, &self.event) {
            (Some(wallet), Some(event)) => (wallet.clone(), event),
            _ => return None,
        };

        let request = MintRequest {
            candy_machine_id: self.settings.candy_machine_id,
            candy_machine: event.candy_machine.clone(),
            buyer: wallet,
            treasury: self.settings.treasury,
        };

        info!("Minting from candy machine {}", request.candy_machine_id);
        self.state = SessionState::Minting;
        self.mint_in_flight = true;
        Some(SessionCommand::ExecuteMint(request))
    }

    async fn on_mint_finished(
        &mut self,
        result: MintResult<MintAttempt>,
    ) -> Option<SessionCommand> {
        self.mint_in_flight = false;

        if self.state != SessionState::Minting {
            warn!("Mint result arrived in {:?}; not reported", self.state);
            if let Ok(attempt) = result {
                self.last_attempt = Some(attempt);
            }
            self.refresh_balance().await;
            return None;
        }

        match result {
            Ok(attempt) => {
                match &attempt.status {
                    MintStatus::Confirmed => {
                        self.alert.show(MINT_SUCCEEDED_MESSAGE, AlertSeverity::Success);
                    }
                    MintStatus::Failed(FailureReason::Ledger(err)) => {
                        self.apply_failure(MintFailure::from_transaction_error(err));
                    }
                    MintStatus::Failed(FailureReason::Timeout) | MintStatus::Pending => {
                        self.alert.show(MINT_RETRY_MESSAGE, AlertSeverity::Error);
                    }
                }
                self.last_attempt = Some(attempt);
            }
            Err(err) => {
                warn!("Mint failed before confirmation: {}", err);
                self.apply_failure(MintFailure::from_mint_error(&err));
            }
        }

        self.state = if self.sold_out_latched {
            SessionState::SoldOut
        } else {
            SessionState::Active
        };
        info!("Mint finished; session now {:?}", self.state);

        self.refresh_balance().await;

        match self.pending_wallet.take() {
            Some(wallet) => self.on_wallet_attached(wallet).await,
            None => None,
        }
    }

    fn apply_failure(&mut self, failure: MintFailure) {
        let classification = classify(&failure);
        if classification.latches_sold_out {
            self.sold_out_latched = true;
        }
        self.alert
            .show(classification.outcome.message(), AlertSeverity::Error);
    }

    async fn on_refresh(&mut self) -> Option<SessionCommand> {
        if self.wallet.is_none() {
            debug!("Refresh ignored without a wallet");
            return None;
        }

        self.refresh_balance().await;
        self.refresh_event_state().await
    }

    async fn refresh_balance(&mut self) {
        let Some(wallet) = &self.wallet else {
            return;
        };

        match self.ledger.get_balance(&wallet.pubkey()).await {
            Ok(lamports) => self.balance_lamports = Some(lamports),
            Err(e) => warn!("Failed to refresh balance: {}", e),
        }
    }

    async fn refresh_event_state(&mut self) -> Option<SessionCommand> {
        let wallet = self.wallet.as_ref()?.pubkey();

        match self
            .reader
            .fetch(&wallet, &self.settings.candy_machine_id)
            .await
        {
            Ok(event) => self.apply_event_state(event),
            Err(e) => {
                warn!("Failed to read event state: {}", e);
                self.alert
                    .show(STATE_READ_FAILED_MESSAGE, AlertSeverity::Error);
                None
            }
        }
    }

    fn apply_event_state(&mut self, event: EventState) -> Option<SessionCommand> {
        if event.is_sold_out() {
            self.sold_out_latched = true;
        }
        self.start_time = event.start_time.or(self.settings.configured_start_time);
        self.event = Some(event);
        self.settle()
    }

    /// Pick the resting state after fresh event data. Never leaves `SoldOut`,
    /// never interrupts `Minting`, never moves `Active` back to a countdown.
    fn settle(&mut self) -> Option<SessionCommand> {
        match self.state {
            SessionState::Disconnected | SessionState::Minting | SessionState::SoldOut => {
                return None
            }
            SessionState::ConnectedIdle | SessionState::CountingDown | SessionState::Active => {}
        }

        if self.sold_out_latched {
            info!("Candy machine sold out");
            self.state = SessionState::SoldOut;
            return Some(SessionCommand::CancelCountdown);
        }

        if self.state == SessionState::Active {
            return None;
        }

        let Some(start_time) = self.start_time else {
            self.state = SessionState::CountingDown;
            return Some(SessionCommand::CancelCountdown);
        };

        match (start_time - self.clock.now()).to_std() {
            Ok(remaining) if !remaining.is_zero() => {
                self.state = SessionState::CountingDown;
                Some(SessionCommand::ScheduleCountdown(remaining))
            }
            _ => {
                self.activate();
                Some(SessionCommand::CancelCountdown)
            }
        }
    }

    fn activate(&mut self) {
        info!("Minting is live");
        self.state = SessionState::Active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_candy_machine, ManualClock, FakeLedger};
    use crate::{LedgerError, MintError};
    use solana_sdk::{
        instruction::InstructionError, signature::Keypair, signature::Signature,
        transaction::TransactionError,
    };

    const NOW: i64 = 1_700_000_000;

    struct Harness {
        ledger: Arc<FakeLedger>,
        clock: Arc<ManualClock>,
        controller: SessionController<FakeLedger>,
        wallet: Arc<Keypair>,
    }

    fn harness(items_available: u64, items_redeemed: u64, go_live: Option<i64>) -> Harness {
        let ledger = Arc::new(FakeLedger::new());
        let candy_machine_id = Pubkey::new_unique();
        let candy_machine = sample_candy_machine(items_available, items_redeemed, go_live);
        ledger.set_candy_machine(&candy_machine_id, &candy_machine);

        let wallet = Arc::new(Keypair::new());
        ledger.set_balance(&wallet.pubkey(), 5_000_000_000);

        let clock = Arc::new(ManualClock::new(
            DateTime::<Utc>::from_timestamp(NOW, 0).unwrap(),
        ));
        let settings = SessionSettings {
            candy_machine_id,
            treasury: candy_machine.wallet,
            configured_start_time: None,
        };
        let controller =
            SessionController::new(settings, ledger.clone(), MintConfig::default(), clock.clone());

        Harness {
            ledger,
            clock,
            controller,
            wallet,
        }
    }

    impl Harness {
        async fn attach(&mut self) -> Option<SessionCommand> {
            self.controller
                .handle(SessionEvent::WalletAttached(self.wallet.clone()))
                .await
        }

        async fn request_mint(&mut self) -> Option<MintRequest> {
            match self.controller.handle(SessionEvent::MintRequested).await {
                Some(SessionCommand::ExecuteMint(request)) => Some(request),
                _ => None,
            }
        }

        async fn finish(&mut self, result: MintResult<MintAttempt>) {
            self.controller
                .handle(SessionEvent::MintFinished(result))
                .await;
        }
    }

    fn attempt(status: MintStatus) -> MintAttempt {
        MintAttempt {
            status,
            transaction_id: Signature::new_unique(),
            submitted_at: Utc::now(),
            mint: Pubkey::new_unique(),
        }
    }

    fn ledger_failure(code: u32) -> MintStatus {
        MintStatus::Failed(FailureReason::Ledger(TransactionError::InstructionError(
            4,
            InstructionError::Custom(code),
        )))
    }

    #[tokio::test]
    async fn test_starts_disconnected() {
        let h = harness(10, 0, Some(NOW - 60));
        let snapshot = h.controller.snapshot();
        assert_eq!(snapshot.state, SessionState::Disconnected);
        assert_eq!(snapshot.wallet, None);
        assert!(!snapshot.alert.visible);
    }

    #[tokio::test]
    async fn test_attach_after_start_goes_active() {
        let mut h = harness(10, 3, Some(NOW - 60));

        let command = h.attach().await;

        assert!(matches!(command, Some(SessionCommand::CancelCountdown)));
        let snapshot = h.controller.snapshot();
        assert_eq!(snapshot.state, SessionState::Active);
        assert_eq!(snapshot.balance_lamports, Some(5_000_000_000));
        assert_eq!(snapshot.event.unwrap().items_remaining(), 7);
        assert_eq!(snapshot.wallet, Some(h.wallet.pubkey()));
    }

    #[tokio::test]
    async fn test_attach_before_start_schedules_countdown() {
        let mut h = harness(10, 0, Some(NOW + 5));

        let command = h.attach().await;

        match command {
            Some(SessionCommand::ScheduleCountdown(remaining)) => {
                assert_eq!(remaining, Duration::from_secs(5))
            }
            other => panic!("expected countdown, got {:?}", other),
        }
        assert_eq!(h.controller.state(), SessionState::CountingDown);

        h.controller.handle(SessionEvent::CountdownElapsed).await;
        assert_eq!(h.controller.state(), SessionState::Active);

        // A second elapse changes nothing
        h.controller.handle(SessionEvent::CountdownElapsed).await;
        assert_eq!(h.controller.state(), SessionState::Active);
        assert!(!h.controller.alert().visible);
    }

    #[tokio::test]
    async fn test_refresh_after_start_passed_converges_on_active() {
        let mut h = harness(10, 0, Some(NOW + 5));
        h.attach().await;
        assert_eq!(h.controller.state(), SessionState::CountingDown);

        h.clock.advance(chrono::Duration::seconds(10));
        let command = h.controller.handle(SessionEvent::RefreshRequested).await;
        assert!(matches!(command, Some(SessionCommand::CancelCountdown)));
        assert_eq!(h.controller.state(), SessionState::Active);

        // The stale timer firing later is ignored
        h.controller.handle(SessionEvent::CountdownElapsed).await;
        assert_eq!(h.controller.state(), SessionState::Active);
    }

    #[tokio::test]
    async fn test_missing_go_live_waits_without_timer() {
        let mut h = harness(10, 0, None);

        let command = h.attach().await;

        assert!(matches!(command, Some(SessionCommand::CancelCountdown)));
        assert_eq!(h.controller.state(), SessionState::CountingDown);
        assert!(h.request_mint().await.is_none());
    }

    #[tokio::test]
    async fn test_configured_start_used_without_go_live() {
        let mut h = harness(10, 0, None);
        h.controller.settings.configured_start_time =
            DateTime::<Utc>::from_timestamp(NOW - 1, 0);

        h.attach().await;
        assert_eq!(h.controller.state(), SessionState::Active);
    }

    #[tokio::test]
    async fn test_sold_out_on_fetch_rejects_mint() {
        let mut h = harness(10, 10, Some(NOW - 60));

        h.attach().await;

        assert_eq!(h.controller.state(), SessionState::SoldOut);
        assert!(h.request_mint().await.is_none());
        assert_eq!(h.controller.state(), SessionState::SoldOut);
        assert!(!h.controller.alert().visible);
    }

    #[tokio::test]
    async fn test_mint_request_only_from_active() {
        let mut h = harness(10, 0, Some(NOW + 60));
        assert!(h.request_mint().await.is_none());

        h.attach().await;
        assert_eq!(h.controller.state(), SessionState::CountingDown);
        assert!(h.request_mint().await.is_none());
        assert_eq!(h.controller.state(), SessionState::CountingDown);
    }

    #[tokio::test]
    async fn test_second_mint_request_while_minting_is_ignored() {
        let mut h = harness(10, 0, Some(NOW - 60));
        h.attach().await;

        let request = h.request_mint().await.unwrap();
        assert_eq!(request.buyer.pubkey(), h.wallet.pubkey());
        assert_eq!(h.controller.state(), SessionState::Minting);

        let before = h.controller.snapshot();
        assert!(h.request_mint().await.is_none());
        assert_eq!(h.controller.snapshot(), before);
    }

    #[tokio::test]
    async fn test_confirmed_mint_returns_to_active_with_success() {
        let mut h = harness(10, 0, Some(NOW - 60));
        h.attach().await;
        h.request_mint().await.unwrap();
        let reads = h.ledger.balance_reads();
        h.ledger.set_balance(&h.wallet.pubkey(), 2_900_000_000);

        h.finish(Ok(attempt(MintStatus::Confirmed))).await;

        let snapshot = h.controller.snapshot();
        assert_eq!(snapshot.state, SessionState::Active);
        assert_eq!(snapshot.alert.severity, Some(AlertSeverity::Success));
        assert_eq!(snapshot.alert.message, MINT_SUCCEEDED_MESSAGE);
        assert_eq!(snapshot.balance_lamports, Some(2_900_000_000));
        assert_eq!(h.ledger.balance_reads(), reads + 1);
        assert!(snapshot.last_attempt.is_some());
    }

    #[tokio::test]
    async fn test_structured_sold_out_latches() {
        let mut h = harness(10, 0, Some(NOW - 60));
        h.attach().await;
        h.request_mint().await.unwrap();

        h.finish(Ok(attempt(ledger_failure(311)))).await;

        assert_eq!(h.controller.state(), SessionState::SoldOut);
        assert_eq!(h.controller.alert().message, "SOLD OUT!");
        assert_eq!(h.controller.alert().severity, Some(AlertSeverity::Error));

        // Nothing leaves SoldOut, even a refresh reporting supply
        h.controller.handle(SessionEvent::RefreshRequested).await;
        assert_eq!(h.controller.state(), SessionState::SoldOut);
        h.controller.handle(SessionEvent::CountdownElapsed).await;
        assert_eq!(h.controller.state(), SessionState::SoldOut);
        assert!(h.request_mint().await.is_none());

        // Nor does reconnecting
        h.controller.handle(SessionEvent::WalletDetached).await;
        h.attach().await;
        assert_eq!(h.controller.state(), SessionState::SoldOut);
    }

    #[tokio::test]
    async fn test_not_started_returns_to_active() {
        let mut h = harness(10, 0, Some(NOW - 60));
        h.attach().await;
        h.request_mint().await.unwrap();

        h.finish(Err(MintError::Rejected {
            error: TransactionError::InstructionError(4, InstructionError::Custom(312)),
            message: "custom program error: 0x138".to_string(),
        }))
        .await;

        assert_eq!(h.controller.state(), SessionState::Active);
        assert_eq!(
            h.controller.alert().message,
            "Minting period hasn't started yet."
        );
    }

    #[tokio::test]
    async fn test_unstructured_sold_out_does_not_latch() {
        let mut h = harness(10, 0, Some(NOW - 60));
        h.attach().await;
        h.request_mint().await.unwrap();

        h.finish(Err(MintError::Connection(LedgerError::Unavailable(
            "custom program error: 0x137".to_string(),
        ))))
        .await;

        assert_eq!(h.controller.state(), SessionState::Active);
        assert_eq!(h.controller.alert().message, "SOLD OUT!");
        assert!(h.request_mint().await.is_some());
    }

    #[tokio::test]
    async fn test_timeout_returns_to_active_with_retry_alert() {
        let mut h = harness(10, 0, Some(NOW - 60));
        h.attach().await;
        h.request_mint().await.unwrap();
        let reads = h.ledger.balance_reads();

        h.finish(Ok(attempt(MintStatus::Failed(FailureReason::Timeout))))
            .await;

        assert_eq!(h.controller.state(), SessionState::Active);
        assert_eq!(h.controller.alert().severity, Some(AlertSeverity::Error));
        assert_eq!(h.controller.alert().message, MINT_RETRY_MESSAGE);
        assert_eq!(h.ledger.balance_reads(), reads + 1);
    }

    #[tokio::test]
    async fn test_failed_balance_refresh_keeps_last_balance() {
        let mut h = harness(10, 0, Some(NOW - 60));
        h.attach().await;
        h.request_mint().await.unwrap();
        h.ledger.fail_balance_reads("node is behind");

        h.finish(Ok(attempt(ledger_failure(309)))).await;

        let snapshot = h.controller.snapshot();
        assert_eq!(snapshot.state, SessionState::Active);
        assert_eq!(snapshot.balance_lamports, Some(5_000_000_000));
        assert_eq!(
            snapshot.alert.message,
            "Not enough SOL to pay for this minting"
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_connected_idle() {
        let mut h = harness(10, 0, Some(NOW - 60));
        h.ledger.fail_account_reads("connection refused");

        let command = h.attach().await;

        assert!(command.is_none());
        assert_eq!(h.controller.state(), SessionState::ConnectedIdle);
        assert_eq!(h.controller.alert().message, STATE_READ_FAILED_MESSAGE);
        assert!(h.request_mint().await.is_none());

        h.ledger.restore_reads();
        h.controller.handle(SessionEvent::RefreshRequested).await;
        assert_eq!(h.controller.state(), SessionState::Active);
    }

    #[tokio::test]
    async fn test_refresh_during_minting_does_not_interrupt() {
        let mut h = harness(10, 9, Some(NOW - 60));
        h.attach().await;
        h.request_mint().await.unwrap();

        let command = h.controller.handle(SessionEvent::RefreshRequested).await;
        assert!(command.is_none());
        assert_eq!(h.controller.state(), SessionState::Minting);
    }

    #[tokio::test]
    async fn test_mint_request_waits_for_earlier_attempt_after_reconnect() {
        let mut h = harness(10, 0, Some(NOW - 60));
        h.attach().await;
        h.request_mint().await.unwrap();

        h.controller.handle(SessionEvent::WalletDetached).await;
        h.attach().await;
        assert_eq!(h.controller.state(), SessionState::Active);
        assert!(h.controller.mint_in_flight());
        assert!(h.request_mint().await.is_none());

        let late = attempt(MintStatus::Confirmed);
        h.finish(Ok(late.clone())).await;

        assert!(!h.controller.mint_in_flight());
        assert_eq!(h.controller.state(), SessionState::Active);
        assert_eq!(h.controller.snapshot().last_attempt, Some(late));
        assert!(!h.controller.alert().visible);
        assert!(h.request_mint().await.is_some());
    }

    #[tokio::test]
    async fn test_wallet_attached_during_mint_applies_after_result() {
        let mut h = harness(10, 0, Some(NOW - 60));
        h.attach().await;
        h.request_mint().await.unwrap();

        let other: WalletSigner = Arc::new(Keypair::new());
        h.ledger.set_balance(&other.pubkey(), 700_000_000);
        let command = h
            .controller
            .handle(SessionEvent::WalletAttached(other.clone()))
            .await;
        assert!(command.is_none());
        assert_eq!(h.controller.state(), SessionState::Minting);
        assert_eq!(h.controller.snapshot().wallet, Some(h.wallet.pubkey()));

        let command = h
            .controller
            .handle(SessionEvent::MintFinished(Ok(attempt(MintStatus::Confirmed))))
            .await;

        assert!(matches!(command, Some(SessionCommand::CancelCountdown)));
        let snapshot = h.controller.snapshot();
        assert_eq!(snapshot.state, SessionState::Active);
        assert_eq!(snapshot.wallet, Some(other.pubkey()));
        assert_eq!(snapshot.balance_lamports, Some(700_000_000));
        assert_eq!(snapshot.alert.message, MINT_SUCCEEDED_MESSAGE);

        let request = h.request_mint().await.unwrap();
        assert_eq!(request.buyer.pubkey(), other.pubkey());
    }

    #[tokio::test]
    async fn test_detach_during_mint_drops_pending_wallet() {
        let mut h = harness(10, 0, Some(NOW - 60));
        h.attach().await;
        h.request_mint().await.unwrap();

        h.controller
            .handle(SessionEvent::WalletAttached(Arc::new(Keypair::new())))
            .await;
        h.controller.handle(SessionEvent::WalletDetached).await;
        h.finish(Ok(attempt(MintStatus::Confirmed))).await;

        let snapshot = h.controller.snapshot();
        assert_eq!(snapshot.state, SessionState::Disconnected);
        assert_eq!(snapshot.wallet, None);
    }

    #[tokio::test]
    async fn test_detach_clears_wallet_data() {
        let mut h = harness(10, 0, Some(NOW - 60));
        h.attach().await;

        let command = h.controller.handle(SessionEvent::WalletDetached).await;

        assert!(matches!(command, Some(SessionCommand::CancelCountdown)));
        let snapshot = h.controller.snapshot();
        assert_eq!(snapshot.state, SessionState::Disconnected);
        assert_eq!(snapshot.wallet, None);
        assert_eq!(snapshot.event, None);
        assert_eq!(snapshot.balance_lamports, None);
    }

    #[tokio::test]
    async fn test_alert_dismiss_keeps_message() {
        let mut h = harness(10, 0, Some(NOW - 60));
        h.attach().await;
        h.request_mint().await.unwrap();
        h.finish(Ok(attempt(MintStatus::Confirmed))).await;

        h.controller.handle(SessionEvent::AlertDismissed).await;

        assert!(!h.controller.alert().visible);
        assert_eq!(h.controller.alert().message, MINT_SUCCEEDED_MESSAGE);
    }
}
