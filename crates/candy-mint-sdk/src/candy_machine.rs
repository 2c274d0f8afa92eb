use crate::{SdkError, SdkResult};
use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;

pub const CANDY_MACHINE_ACCOUNT_NAME: &str = "CandyMachine";

/// Anchor account discriminator: first 8 bytes of `sha256("account:<Name>")`
pub fn account_discriminator(account_name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("account:{}", account_name).as_bytes());
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&digest[..8]);
    discriminator
}

/// Mint settings stored inside a candy machine account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandyMachineData {
    pub uuid: String,
    /// Price per item, in lamports (or in `token_mint` base units)
    pub price: u64,
    pub items_available: u64,
    /// Unix timestamp (seconds) at which public minting opens
    pub go_live_date: Option<i64>,
}

/// Decoded candy machine account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandyMachineAccount {
    pub authority: Pubkey,
    /// Treasury that receives mint payments
    pub wallet: Pubkey,
    pub token_mint: Option<Pubkey>,
    pub config: Pubkey,
    pub data: CandyMachineData,
    pub items_redeemed: u64,
    pub bump: u8,
}

// On-chain layout. Pubkeys are kept as raw arrays so the layout does not depend
// on which borsh version the pubkey type was built against.
#[derive(BorshSerialize, BorshDeserialize)]
struct RawCandyMachineData {
    uuid: String,
    price: u64,
    items_available: u64,
    go_live_date: Option<i64>,
}

#[derive(BorshSerialize, BorshDeserialize)]
struct RawCandyMachine {
    authority: [u8; 32],
    wallet: [u8; 32],
    token_mint: Option<[u8; 32]>,
    config: [u8; 32],
    data: RawCandyMachineData,
    items_redeemed: u64,
    bump: u8,
}

impl CandyMachineAccount {
    /// Decode raw account data, discriminator included.
    ///
    /// Trailing bytes are ignored; the program over-allocates the account.
    pub fn try_from_account_data(account_data: &[u8]) -> SdkResult<Self> {
        if account_data.len() < 8 {
            return Err(SdkError::InvalidAccountData(
                "Account data too short for discriminator".to_string(),
            ));
        }

        let expected = account_discriminator(CANDY_MACHINE_ACCOUNT_NAME);
        let mut found = [0u8; 8];
        found.copy_from_slice(&account_data[..8]);
        if found != expected {
            return Err(SdkError::DiscriminatorMismatch { expected, found });
        }

        let raw = RawCandyMachine::deserialize(&mut &account_data[8..]).map_err(|e| {
            SdkError::InvalidAccountData(format!("Failed to deserialize candy machine: {}", e))
        })?;

        Ok(Self {
            authority: Pubkey::new_from_array(raw.authority),
            wallet: Pubkey::new_from_array(raw.wallet),
            token_mint: raw.token_mint.map(Pubkey::new_from_array),
            config: Pubkey::new_from_array(raw.config),
            data: CandyMachineData {
                uuid: raw.data.uuid,
                price: raw.data.price,
                items_available: raw.data.items_available,
                go_live_date: raw.data.go_live_date,
            },
            items_redeemed: raw.items_redeemed,
            bump: raw.bump,
        })
    }

    /// Encode back to account data, discriminator included
    pub fn to_account_data(&self) -> SdkResult<Vec<u8>> {
        let raw = RawCandyMachine {
            authority: self.authority.to_bytes(),
            wallet: self.wallet.to_bytes(),
            token_mint: self.token_mint.map(|mint| mint.to_bytes()),
            config: self.config.to_bytes(),
            data: RawCandyMachineData {
                uuid: self.data.uuid.clone(),
                price: self.data.price,
                items_available: self.data.items_available,
                go_live_date: self.data.go_live_date,
            },
            items_redeemed: self.items_redeemed,
            bump: self.bump,
        };

        let mut account_data = account_discriminator(CANDY_MACHINE_ACCOUNT_NAME).to_vec();
        raw.serialize(&mut account_data).map_err(|e| {
            SdkError::InvalidAccountData(format!("Failed to serialize candy machine: {}", e))
        })?;
        Ok(account_data)
    }

    /// Items left to mint; never negative even if the account is inconsistent
    pub fn items_remaining(&self) -> u64 {
        self.data.items_available.saturating_sub(self.items_redeemed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_account() -> CandyMachineAccount {
        CandyMachineAccount {
            authority: Pubkey::new_unique(),
            wallet: Pubkey::new_unique(),
            token_mint: None,
            config: Pubkey::new_unique(),
            data: CandyMachineData {
                uuid: "ABC123".to_string(),
                price: 2_000_000_000,
                items_available: 10,
                go_live_date: Some(1_640_000_000),
            },
            items_redeemed: 4,
            bump: 254,
        }
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let account = sample_account();
        let mut account_data = account.to_account_data().unwrap();
        account_data.extend_from_slice(&[0u8; 64]);

        let decoded = CandyMachineAccount::try_from_account_data(&account_data).unwrap();
        assert_eq!(decoded, account);
        assert_eq!(decoded.items_remaining(), 6);
    }

    #[test]
    fn test_wrong_discriminator_rejected() {
        let mut account_data = sample_account().to_account_data().unwrap();
        account_data[0] ^= 0xff;

        let result = CandyMachineAccount::try_from_account_data(&account_data);
        assert!(matches!(result, Err(SdkError::DiscriminatorMismatch { .. })));
    }

    #[test]
    fn test_short_data_rejected() {
        let result = CandyMachineAccount::try_from_account_data(&[1, 2, 3]);
        assert!(matches!(result, Err(SdkError::InvalidAccountData(_))));

        let mut truncated = sample_account().to_account_data().unwrap();
        truncated.truncate(40);
        let result = CandyMachineAccount::try_from_account_data(&truncated);
        assert!(matches!(result, Err(SdkError::InvalidAccountData(_))));
    }

    #[test]
    fn test_items_remaining_saturates() {
        let mut account = sample_account();
        account.items_redeemed = 12;
        assert_eq!(account.items_remaining(), 0);
    }
}
