use solana_sdk::commitment_config::CommitmentConfig;
use std::time::Duration;

/// Configuration for mint submission and confirmation polling
#[derive(Debug, Clone)]
pub struct MintConfig {
    /// Commitment a signature status must reach to count as terminal
    pub commitment: CommitmentConfig,

    /// Delay between signature status polls
    pub poll_interval: Duration,

    /// Give up polling after this long; the transaction may still land
    pub tx_timeout: Duration,

    /// Whether to skip preflight simulation on submission
    pub skip_preflight: bool,

    /// Rebroadcast attempts the RPC node may make on our behalf
    pub send_max_retries: Option<usize>,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            commitment: CommitmentConfig::confirmed(),
            poll_interval: Duration::from_millis(500),
            tx_timeout: Duration::from_millis(30_000),
            skip_preflight: false,
            send_max_retries: None,
        }
    }
}

impl MintConfig {
    pub fn with_tx_timeout(mut self, tx_timeout: Duration) -> Self {
        self.tx_timeout = tx_timeout;
        self
    }
}
