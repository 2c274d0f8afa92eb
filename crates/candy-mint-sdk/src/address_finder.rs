use crate::{CANDY_MACHINE_PROGRAM_ID, TOKEN_METADATA_PROGRAM_ID};
use solana_sdk::{pubkey::Pubkey, system_program, sysvar};

pub const METADATA_SEED_PREFIX: &[u8] = b"metadata";
pub const EDITION_SEED_SUFFIX: &[u8] = b"edition";

pub struct AddressFinder {
    pub candy_machine_program_id: Pubkey,
    pub token_metadata_program_id: Pubkey,

    pub associated_token_program_id: Pubkey,
    pub clock_id: Pubkey,
    pub rent_id: Pubkey,
    pub system_program_id: Pubkey,
    pub token_program_id: Pubkey,
}

impl Default for AddressFinder {
    fn default() -> Self {
        Self {
            candy_machine_program_id: CANDY_MACHINE_PROGRAM_ID,
            token_metadata_program_id: TOKEN_METADATA_PROGRAM_ID,
            associated_token_program_id: spl_associated_token_account::id(),
            clock_id: sysvar::clock::id(),
            rent_id: sysvar::rent::id(),
            system_program_id: system_program::id(),
            token_program_id: spl_token::id(),
        }
    }
}

impl AddressFinder {
    /// Metadata PDA owned by the token metadata program
    pub fn find_metadata_address(&self, mint: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[
                METADATA_SEED_PREFIX,
                self.token_metadata_program_id.as_ref(),
                mint.as_ref(),
            ],
            &self.token_metadata_program_id,
        )
    }

    /// Master edition PDA owned by the token metadata program
    pub fn find_master_edition_address(&self, mint: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(
            &[
                METADATA_SEED_PREFIX,
                self.token_metadata_program_id.as_ref(),
                mint.as_ref(),
                EDITION_SEED_SUFFIX,
            ],
            &self.token_metadata_program_id,
        )
    }

    pub fn find_associated_token_address(&self, owner: &Pubkey, mint: &Pubkey) -> Pubkey {
        spl_associated_token_account::get_associated_token_address_with_program_id(
            owner,
            mint,
            &self.token_program_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_and_edition_addresses_differ() {
        let finder = AddressFinder::default();
        let mint = Pubkey::new_unique();

        let (metadata, _) = finder.find_metadata_address(&mint);
        let (edition, _) = finder.find_master_edition_address(&mint);

        assert_ne!(metadata, edition);
        assert_eq!(finder.find_metadata_address(&mint).0, metadata);
        assert!(!metadata.is_on_curve());
        assert!(!edition.is_on_curve());
    }

    #[test]
    fn test_associated_token_address_matches_spl() {
        let finder = AddressFinder::default();
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        assert_eq!(
            finder.find_associated_token_address(&owner, &mint),
            spl_associated_token_account::get_associated_token_address(&owner, &mint)
        );
    }
}
