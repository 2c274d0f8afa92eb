use crate::commands::{connect_ledger, load_config, load_keypair};
use crate::error::CliResult;
use candy_mint_session::{
    display::{lamports_to_sol, minted_progress, shorten_address, CountdownParts},
    LedgerClient, StateReader,
};
use chrono::Utc;
use solana_sdk::signer::Signer;
use std::path::PathBuf;
use tracing::warn;

pub async fn execute(
    config_path: PathBuf,
    keypair_path: PathBuf,
    rpc_url: Option<String>,
) -> CliResult<()> {
    let config = load_config(&config_path, rpc_url)?;
    let candy_machine_id = config.candy_machine_id()?;
    let wallet = load_keypair(&keypair_path)?.pubkey();
    let ledger = connect_ledger(&config);

    println!("🔍 Reading candy machine {}...", candy_machine_id);
    let event = StateReader::new(ledger.clone())
        .fetch(&wallet, &candy_machine_id)
        .await?;

    if let Some(expected) = config.config_account()? {
        if expected != event.candy_machine.config {
            warn!(
                "Configured config account {} does not match on-chain {}",
                expected, event.candy_machine.config
            );
        }
    }

    println!("✅ Candy machine: {}", candy_machine_id);
    println!("   Authority: {}", event.candy_machine.authority);
    println!("   Treasury: {}", event.treasury());
    println!(
        "   Price: {} SOL",
        lamports_to_sol(event.candy_machine.data.price)
    );
    println!(
        "   Minted: {} ({} remaining)",
        minted_progress(&event),
        event.items_remaining()
    );

    match event.start_time.or(config.start_time()?) {
        Some(start_time) => match (start_time - Utc::now()).to_std() {
            Ok(remaining) if !remaining.is_zero() => println!(
                "   Goes live in {} ({})",
                CountdownParts::from_duration(remaining),
                start_time
            ),
            _ => println!("   Live since {}", start_time),
        },
        None => println!("   No go-live date set"),
    }

    if event.is_sold_out() {
        println!("🚫 SOLD OUT");
    }

    match ledger.get_balance(&wallet).await {
        Ok(lamports) => println!(
            "💰 Wallet {}: {:.4} SOL",
            shorten_address(&wallet, 4),
            lamports_to_sol(lamports)
        ),
        Err(e) => warn!("Failed to read wallet balance: {}", e),
    }

    Ok(())
}
