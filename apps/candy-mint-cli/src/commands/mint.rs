use crate::commands::{build_controller, load_config, load_keypair, print_alert, print_snapshot};
use crate::error::{CliError, CliResult};
use candy_mint_session::{
    display::{lamports_to_sol, minted_progress},
    spawn_session, AlertSeverity, SessionState,
};
use solana_sdk::signer::Signer;
use std::{path::PathBuf, sync::Arc};
use tracing::info;

pub async fn execute(
    config_path: PathBuf,
    keypair_path: PathBuf,
    rpc_url: Option<String>,
) -> CliResult<()> {
    println!("🎯 Starting mint...");

    let config = load_config(&config_path, rpc_url)?;
    let keypair = load_keypair(&keypair_path)?;
    println!("🔑 Buyer: {}", keypair.pubkey());

    let (session, _driver) = spawn_session(build_controller(&config)?);
    session.attach_wallet(Arc::new(keypair))?;

    let snapshot = session
        .wait_for(|s| {
            s.wallet.is_some() && (s.state != SessionState::ConnectedIdle || s.alert.visible)
        })
        .await?;
    print_snapshot(&snapshot);

    if snapshot.state == SessionState::ConnectedIdle {
        return Err(CliError::MintFailed(snapshot.alert.message));
    }

    if snapshot.state == SessionState::CountingDown {
        println!("⏳ Waiting for minting to open...");
    }
    let snapshot = session
        .wait_for(|s| matches!(s.state, SessionState::Active | SessionState::SoldOut))
        .await?;

    if snapshot.state == SessionState::SoldOut {
        println!("🚫 SOLD OUT");
        return Err(CliError::MintFailed("candy machine is sold out".to_string()));
    }

    println!("🔨 Submitting mint transaction...");
    session.request_mint()?;
    let snapshot = session.wait_for(|s| s.alert.visible).await?;

    if let Some(attempt) = &snapshot.last_attempt {
        info!("Mint {} created by {}", attempt.mint, attempt.transaction_id);
        println!("   Transaction: {}", attempt.transaction_id);
        println!("   Token mint: {}", attempt.mint);
    }
    print_alert(&snapshot);
    if let Some(balance) = snapshot.balance_lamports {
        println!("💰 Balance: {:.4} SOL", lamports_to_sol(balance));
    }

    // Re-read supply; the dismissal marks when the refresh has been applied
    session.refresh()?;
    session.dismiss_alert()?;
    let refreshed = session.wait_for(|s| !s.alert.visible).await?;
    if let Some(event) = &refreshed.event {
        println!("   Minted: {}", minted_progress(event));
    }

    match snapshot.alert.severity {
        Some(AlertSeverity::Success) => Ok(()),
        _ => Err(CliError::MintFailed(snapshot.alert.message)),
    }
}
