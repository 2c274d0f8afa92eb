use crate::commands::{build_controller, load_config, load_keypair, print_snapshot};
use crate::error::CliResult;
use candy_mint_session::{spawn_session, SessionState};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

pub async fn execute(
    config_path: PathBuf,
    keypair_path: PathBuf,
    rpc_url: Option<String>,
    refresh_secs: Option<u64>,
) -> CliResult<()> {
    let config = load_config(&config_path, rpc_url)?;
    let keypair = load_keypair(&keypair_path)?;

    let (session, _driver) = spawn_session(build_controller(&config)?);
    let mut snapshots = session.subscribe();
    session.attach_wallet(Arc::new(keypair))?;

    let mut refresher = interval(Duration::from_secs(refresh_secs.unwrap_or(1).max(1)));
    refresher.set_missed_tick_behavior(MissedTickBehavior::Delay);
    refresher.tick().await;

    println!("👀 Watching candy machine {} (Ctrl-C to stop)", config.candy_machine_id);

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                println!();
                print_snapshot(&snapshot);
                if snapshot.state == SessionState::SoldOut {
                    println!("🚫 SOLD OUT");
                    break;
                }
            }
            _ = refresher.tick(), if refresh_secs.is_some() => {
                session.refresh()?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    session.detach_wallet()?;
    Ok(())
}
