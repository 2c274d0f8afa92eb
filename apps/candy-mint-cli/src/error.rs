use candy_mint_session::{SessionError, StateError};
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read keypair: {0}")]
    Keypair(String),

    #[error("Failed to read mint state: {0}")]
    State(#[from] StateError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Mint did not succeed: {0}")]
    MintFailed(String),
}
