/*!
# Candy Mint Session

Session core for a candy machine mint front end: reads event state, submits and
confirms mint transactions, classifies failures and drives the session state
machine that decides when a mint may be requested.

## Pieces

- **StateReader**: fetches the candy machine and derives supply and start time
- **MintExecutor**: builds, signs, submits and polls one mint transaction
- **classify**: maps a mint failure to a user outcome (sold out, not started, ...)
- **SessionController**: the state machine; one event in, at most one command out
- **SessionDriver / SessionHandle**: run a controller on tokio with a countdown
  timer and the in-flight mint, publishing snapshots over a `watch` channel

All network access goes through the [`LedgerClient`] trait. [`RpcLedgerClient`]
talks to a Solana RPC node. With the `testing` feature, `testing::FakeLedger`
keeps everything in memory.

## Usage

```rust,no_run
use candy_mint_session::{
    spawn_session, MintConfig, RpcLedgerClient, SessionController, SessionSettings,
    SessionState, SystemClock,
};
use solana_sdk::{pubkey::Pubkey, signature::Keypair};
use std::sync::Arc;

async fn example(candy_machine_id: Pubkey, treasury: Pubkey) {
    let ledger = Arc::new(RpcLedgerClient::new("https://api.devnet.solana.com".to_string()));
    let settings = SessionSettings {
        candy_machine_id,
        treasury,
        configured_start_time: None,
    };
    let controller =
        SessionController::new(settings, ledger, MintConfig::default(), Arc::new(SystemClock));
    let (session, _task) = spawn_session(controller);

    session.attach_wallet(Arc::new(Keypair::new())).unwrap();
    let snapshot = session
        .wait_for(|s| s.state == SessionState::Active)
        .await
        .unwrap();
    println!("{:?}", snapshot.event);
}
```
*/

pub mod classifier;
pub mod clock;
pub mod config;
pub mod controller;
pub mod display;
pub mod driver;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod rpc_ledger;
pub mod state_reader;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use classifier::{
    classify, Classification, MintFailure, UserOutcome, DEFAULT_FAILURE_MESSAGE,
    INSUFFICIENT_FUNDS_MESSAGE, MINT_RETRY_MESSAGE, MINT_SUCCEEDED_MESSAGE,
    NOT_STARTED_MESSAGE, SOLD_OUT_MESSAGE,
};
pub use clock::{Clock, SystemClock};
pub use config::MintConfig;
pub use controller::{
    AlertSeverity, AlertState, SessionCommand, SessionController, SessionEvent,
    SessionSettings, SessionSnapshot, SessionState, STATE_READ_FAILED_MESSAGE,
};
pub use driver::{session_channel, spawn_session, SessionDriver, SessionHandle};
pub use error::{
    LedgerError, LedgerResult, MintError, MintResult, SessionError, SessionResult, StateError,
    StateResult,
};
pub use executor::{
    FailureReason, MintAttempt, MintExecutor, MintRequest, MintStatus, WalletSigner,
};
pub use ledger::{ConfirmationStatus, LedgerClient};
pub use rpc_ledger::RpcLedgerClient;
pub use state_reader::{EventState, StateReader};
