pub mod mint;
pub mod status;
pub mod watch;

use crate::config::LaunchConfig;
use crate::error::{CliError, CliResult};
use candy_mint_session::{
    display::{lamports_to_sol, minted_progress, shorten_address, CountdownParts},
    AlertSeverity, RpcLedgerClient, SessionController, SessionSettings, SessionSnapshot,
    SystemClock,
};
use chrono::Utc;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    signature::{read_keypair_file, Keypair},
};
use std::{path::Path, sync::Arc};

/// Load the launch config, letting `--rpc-url` win over the file
pub fn load_config(config_path: &Path, rpc_url: Option<String>) -> CliResult<LaunchConfig> {
    let mut config = LaunchConfig::load(config_path)?;
    if let Some(rpc_url) = rpc_url {
        config.rpc_url = rpc_url;
    }
    Ok(config)
}

pub fn load_keypair(keypair_path: &Path) -> CliResult<Keypair> {
    read_keypair_file(keypair_path).map_err(|e| CliError::Keypair(e.to_string()))
}

pub fn connect_ledger(config: &LaunchConfig) -> Arc<RpcLedgerClient> {
    let rpc_client =
        RpcClient::new_with_commitment(config.rpc_url.clone(), CommitmentConfig::confirmed());
    Arc::new(RpcLedgerClient::with_config(
        Arc::new(rpc_client),
        &config.mint_config(),
    ))
}

pub fn build_controller(config: &LaunchConfig) -> CliResult<SessionController<RpcLedgerClient>> {
    let settings = SessionSettings {
        candy_machine_id: config.candy_machine_id()?,
        treasury: config.treasury()?,
        configured_start_time: config.start_time()?,
    };

    Ok(SessionController::new(
        settings,
        connect_ledger(config),
        config.mint_config(),
        Arc::new(SystemClock),
    ))
}

pub fn print_snapshot(snapshot: &SessionSnapshot) {
    println!("📊 Session: {:?}", snapshot.state);

    if let Some(wallet) = &snapshot.wallet {
        println!("   Wallet: {}", shorten_address(wallet, 4));
    }
    if let Some(balance) = snapshot.balance_lamports {
        println!("   Balance: {:.4} SOL", lamports_to_sol(balance));
    }
    if let Some(event) = &snapshot.event {
        println!(
            "   Minted: {} ({} remaining)",
            minted_progress(event),
            event.items_remaining()
        );
        println!(
            "   Price: {} SOL",
            lamports_to_sol(event.candy_machine.data.price)
        );
    }
    match snapshot.start_time {
        Some(start_time) => match (start_time - Utc::now()).to_std() {
            Ok(remaining) if !remaining.is_zero() => println!(
                "   Starts in: {} ({})",
                CountdownParts::from_duration(remaining),
                start_time
            ),
            _ => println!("   Started: {}", start_time),
        },
        None => println!("   Start time: not set"),
    }
    if snapshot.alert.visible {
        print_alert(snapshot);
    }
}

pub fn print_alert(snapshot: &SessionSnapshot) {
    let marker = match snapshot.alert.severity {
        Some(AlertSeverity::Success) => "🎉",
        Some(AlertSeverity::Error) => "❌",
        Some(AlertSeverity::Warning) => "⚠️ ",
        Some(AlertSeverity::Info) | None => "ℹ️ ",
    };
    println!("{} {}", marker, snapshot.alert.message);
}
