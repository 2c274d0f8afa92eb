use crate::error::{CliError, CliResult};
use candy_mint_session::MintConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::{path::Path, str::FromStr, time::Duration};

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

/// Launch configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Solana RPC URL
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Candy machine account (base58)
    pub candy_machine_id: String,

    /// Candy machine config account (base58), checked against the on-chain value
    pub config: Option<String>,

    /// Wallet receiving mint payments (base58)
    pub treasury: String,

    /// Start time shown until the candy machine is read (Unix timestamp)
    pub start_date: Option<i64>,

    /// Confirmation timeout in milliseconds
    #[serde(default = "default_tx_timeout_ms")]
    pub tx_timeout_ms: u64,
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

fn default_tx_timeout_ms() -> u64 {
    30_000
}

impl LaunchConfig {
    pub fn load(path: &Path) -> CliResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: LaunchConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        self.candy_machine_id()?;
        self.treasury()?;
        self.config_account()?;
        self.start_time()?;
        if self.tx_timeout_ms == 0 {
            return Err(CliError::InvalidConfig(
                "tx_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn candy_machine_id(&self) -> CliResult<Pubkey> {
        parse_pubkey("candy_machine_id", &self.candy_machine_id)
    }

    pub fn treasury(&self) -> CliResult<Pubkey> {
        parse_pubkey("treasury", &self.treasury)
    }

    pub fn config_account(&self) -> CliResult<Option<Pubkey>> {
        self.config
            .as_deref()
            .map(|config| parse_pubkey("config", config))
            .transpose()
    }

    pub fn start_time(&self) -> CliResult<Option<DateTime<Utc>>> {
        self.start_date
            .map(|seconds| {
                DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| {
                    CliError::InvalidConfig(format!("start_date out of range: {}", seconds))
                })
            })
            .transpose()
    }

    pub fn mint_config(&self) -> MintConfig {
        MintConfig::default().with_tx_timeout(Duration::from_millis(self.tx_timeout_ms))
    }
}

fn parse_pubkey(field: &str, value: &str) -> CliResult<Pubkey> {
    Pubkey::from_str(value)
        .map_err(|e| CliError::InvalidConfig(format!("Invalid {} '{}': {}", field, value, e)))
}
