use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;

use error::CliResult;

#[derive(Parser)]
#[command(name = "candy-mint")]
#[command(about = "Candy Mint CLI - Mint from a candy machine on Solana")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show supply, price, start time and wallet balance
    Status {
        /// Launch configuration file
        #[arg(short, long, default_value = "candy-mint.yaml")]
        config: PathBuf,

        /// Wallet keypair file
        #[arg(short, long)]
        keypair: PathBuf,

        /// Solana RPC URL (overrides the configuration file)
        #[arg(short, long)]
        rpc_url: Option<String>,
    },

    /// Wait for go-live if needed, then mint one item
    Mint {
        /// Launch configuration file
        #[arg(short, long, default_value = "candy-mint.yaml")]
        config: PathBuf,

        /// Buyer keypair file
        #[arg(short, long)]
        keypair: PathBuf,

        /// Solana RPC URL (overrides the configuration file)
        #[arg(short, long)]
        rpc_url: Option<String>,
    },

    /// Print every session change until sold out or interrupted
    Watch {
        /// Launch configuration file
        #[arg(short, long, default_value = "candy-mint.yaml")]
        config: PathBuf,

        /// Wallet keypair file
        #[arg(short, long)]
        keypair: PathBuf,

        /// Solana RPC URL (overrides the configuration file)
        #[arg(short, long)]
        rpc_url: Option<String>,

        /// Re-read the candy machine this often (seconds)
        #[arg(long)]
        refresh_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Status {
            config,
            keypair,
            rpc_url,
        } => commands::status::execute(config, keypair, rpc_url).await,

        Commands::Mint {
            config,
            keypair,
            rpc_url,
        } => commands::mint::execute(config, keypair, rpc_url).await,

        Commands::Watch {
            config,
            keypair,
            rpc_url,
            refresh_secs,
        } => commands::watch::execute(config, keypair, rpc_url, refresh_secs).await,
    }
}
