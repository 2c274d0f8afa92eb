//! Formatting helpers for whatever renders a session snapshot.

use crate::EventState;
use solana_sdk::{native_token::LAMPORTS_PER_SOL, pubkey::Pubkey};
use std::time::Duration;

/// `"AbCd...WxYz"` for a base58 address
pub fn shorten_address(address: &Pubkey, chars: usize) -> String {
    let address = address.to_string();
    if address.len() <= chars * 2 {
        return address;
    }
    format!("{}...{}", &address[..chars], &address[address.len() - chars..])
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// `"4/10"`: items minted over items available
pub fn minted_progress(event: &EventState) -> String {
    format!(
        "{}/{}",
        event.items_available - event.items_remaining(),
        event.items_available
    )
}

/// Time left until go-live, with days folded into hours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownParts {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl CountdownParts {
    pub fn from_duration(remaining: Duration) -> Self {
        let total = remaining.as_secs();
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }
}

impl std::fmt::Display for CountdownParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} hours, {} minutes, {} seconds",
            self.hours, self.minutes, self.seconds
        )
    }
}
