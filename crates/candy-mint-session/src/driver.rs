use crate::{
    LedgerClient, MintAttempt, MintResult, SessionCommand, SessionController, SessionError,
    SessionEvent, SessionResult, SessionSnapshot, WalletSigner,
};
use futures::{future::BoxFuture, FutureExt};
use std::{
    future::pending,
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{sleep, Sleep},
};
use tracing::{debug, info, warn};

type InFlightMint = BoxFuture<'static, MintResult<MintAttempt>>;

/// Owns a [`SessionController`] and feeds it events one at a time: requests from
/// [`SessionHandle`]s, the countdown timer and the in-flight mint. Publishes a
/// snapshot after every event.
pub struct SessionDriver<L> {
    controller: SessionController<L>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    snapshots: watch::Sender<SessionSnapshot>,
    /// Number of handle requests applied so far
    applied: watch::Sender<u64>,
    countdown: Option<Pin<Box<Sleep>>>,
    in_flight: Option<InFlightMint>,
}

/// Cloneable front end to a running session
#[derive(Clone)]
pub struct SessionHandle {
    events: mpsc::UnboundedSender<SessionEvent>,
    snapshots: watch::Receiver<SessionSnapshot>,
    /// Requests sent through any clone of this handle
    sent: Arc<AtomicU64>,
    applied: watch::Receiver<u64>,
}

enum Wake {
    Event(Option<SessionEvent>),
    CountdownElapsed,
    MintFinished(MintResult<MintAttempt>),
}

pub fn session_channel<L>(controller: SessionController<L>) -> (SessionHandle, SessionDriver<L>)
where
    L: LedgerClient + 'static,
{
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
    let (applied_tx, applied_rx) = watch::channel(0);

    let handle = SessionHandle {
        events: event_tx,
        snapshots: snapshot_rx,
        sent: Arc::new(AtomicU64::new(0)),
        applied: applied_rx,
    };
    let driver = SessionDriver {
        controller,
        events: event_rx,
        snapshots: snapshot_tx,
        applied: applied_tx,
        countdown: None,
        in_flight: None,
    };
    (handle, driver)
}

/// Start a driver on the current tokio runtime
pub fn spawn_session<L>(controller: SessionController<L>) -> (SessionHandle, JoinHandle<()>)
where
    L: LedgerClient + 'static,
{
    let (handle, driver) = session_channel(controller);
    let task = tokio::spawn(driver.run());
    (handle, task)
}

impl<L> SessionDriver<L>
where
    L: LedgerClient + 'static,
{
    /// Run until every handle is dropped
    pub async fn run(mut self) {
        info!("Session driver started");

        loop {
            let wake = tokio::select! {
                event = self.events.recv() => Wake::Event(event),
                _ = countdown_elapsed(&mut self.countdown) => Wake::CountdownElapsed,
                result = mint_finished(&mut self.in_flight) => Wake::MintFinished(result),
            };

            let from_handle = matches!(wake, Wake::Event(Some(_)));
            let event = match wake {
                Wake::Event(Some(event)) => event,
                Wake::Event(None) => break,
                Wake::CountdownElapsed => {
                    self.countdown = None;
                    SessionEvent::CountdownElapsed
                }
                Wake::MintFinished(result) => {
                    self.in_flight = None;
                    SessionEvent::MintFinished(result)
                }
            };

            if let Some(command) = self.controller.handle(event).await {
                self.apply(command);
            }
            self.snapshots.send_replace(self.controller.snapshot());
            if from_handle {
                self.applied.send_modify(|applied| *applied += 1);
            }
        }

        info!("Session driver stopped");
    }

    fn apply(&mut self, command: SessionCommand) {
        debug!("Applying {:?}", command);

        match command {
            SessionCommand::ScheduleCountdown(remaining) => {
                self.countdown = Some(Box::pin(sleep(remaining)));
            }
            SessionCommand::CancelCountdown => {
                self.countdown = None;
            }
            SessionCommand::ExecuteMint(request) => {
                if self.in_flight.is_some() {
                    warn!("Mint command dropped; an attempt is already in flight");
                    return;
                }
                let executor = self.controller.executor().clone();
                self.in_flight = Some(async move { executor.mint(&request).await }.boxed());
            }
        }
    }
}

async fn countdown_elapsed(countdown: &mut Option<Pin<Box<Sleep>>>) {
    match countdown {
        Some(timer) => timer.as_mut().await,
        None => pending().await,
    }
}

async fn mint_finished(in_flight: &mut Option<InFlightMint>) -> MintResult<MintAttempt> {
    match in_flight {
        Some(mint) => mint.as_mut().await,
        None => pending().await,
    }
}

impl SessionHandle {
    fn send(&self, event: SessionEvent) -> SessionResult<()> {
        self.events.send(event).map_err(|_| SessionError::Closed)?;
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    pub fn attach_wallet(&self, wallet: WalletSigner) -> SessionResult<()> {
        self.send(SessionEvent::WalletAttached(wallet))
    }

    pub fn detach_wallet(&self) -> SessionResult<()> {
        self.send(SessionEvent::WalletDetached)
    }

    pub fn request_mint(&self) -> SessionResult<()> {
        self.send(SessionEvent::MintRequested)
    }

    pub fn refresh(&self) -> SessionResult<()> {
        self.send(SessionEvent::RefreshRequested)
    }

    pub fn dismiss_alert(&self) -> SessionResult<()> {
        self.send(SessionEvent::AlertDismissed)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until every request sent through this handle or its clones has been
    /// applied, then return the snapshot that followed
    pub async fn sync(&self) -> SessionResult<SessionSnapshot> {
        let target = self.sent.load(Ordering::SeqCst);
        let mut applied = self.applied.clone();
        applied
            .wait_for(|applied| *applied >= target)
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(self.snapshot())
    }

    /// Wait until a published snapshot satisfies `predicate`, starting with the current one
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> SessionResult<SessionSnapshot> {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots
            .wait_for(predicate)
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(snapshot.clone())
    }
}
