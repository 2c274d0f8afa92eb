/*!
# Transaction Builders

Builders return unsigned transactions. The caller signs with the payer and the
freshly generated mint keypair, then submits.
*/

use crate::{
    build_mint_nft_ix, build_prepare_token_mint_ixs, AddressFinder, CandyMachineAccount,
    MintAccounts, SdkResult,
};
use solana_sdk::{hash::Hash, message::Message, transaction::Transaction};

/// Build the unsigned "mint one token" transaction: token mint preparation
/// followed by the candy machine `mint_nft` instruction.
pub fn build_mint_one_token_tx(
    candy_machine: &CandyMachineAccount,
    accounts: &MintAccounts,
    mint_rent_lamports: u64,
    recent_blockhash: Hash,
) -> SdkResult<Transaction> {
    build_mint_one_token_tx_with_finder(
        &AddressFinder::default(),
        candy_machine,
        accounts,
        mint_rent_lamports,
        recent_blockhash,
    )
}

pub fn build_mint_one_token_tx_with_finder(
    address_finder: &AddressFinder,
    candy_machine: &CandyMachineAccount,
    accounts: &MintAccounts,
    mint_rent_lamports: u64,
    recent_blockhash: Hash,
) -> SdkResult<Transaction> {
    let mut instructions = build_prepare_token_mint_ixs(
        address_finder,
        &accounts.payer,
        &accounts.mint,
        mint_rent_lamports,
    )?;

    instructions.push(build_mint_nft_ix(address_finder, candy_machine, accounts)?);

    let message =
        Message::new_with_blockhash(&instructions, Some(&accounts.payer), &recent_blockhash);
    Ok(Transaction::new_unsigned(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CandyMachineData;
    use solana_sdk::{
        pubkey::Pubkey,
        signature::{Keypair, Signer},
    };

    #[test]
    fn test_mint_tx_requires_payer_and_mint_signatures() {
        let machine = CandyMachineAccount {
            authority: Pubkey::new_unique(),
            wallet: Pubkey::new_unique(),
            token_mint: None,
            config: Pubkey::new_unique(),
            data: CandyMachineData {
                uuid: "ABC123".to_string(),
                price: 1,
                items_available: 1,
                go_live_date: None,
            },
            items_redeemed: 0,
            bump: 255,
        };
        let payer = Keypair::new();
        let mint = Keypair::new();
        let accounts = MintAccounts {
            candy_machine_id: Pubkey::new_unique(),
            payer: payer.pubkey(),
            treasury: machine.wallet,
            mint: mint.pubkey(),
        };
        let blockhash = Hash::new_unique();

        let mut tx = build_mint_one_token_tx(&machine, &accounts, 1_461_600, blockhash).unwrap();

        assert_eq!(tx.message.instructions.len(), 5);
        assert_eq!(tx.message.header.num_required_signatures, 2);
        assert_eq!(tx.message.account_keys[0], payer.pubkey());
        assert_eq!(tx.message.recent_blockhash, blockhash);

        tx.try_sign(&[&payer, &mint], blockhash).unwrap();
        assert!(tx.is_signed());
    }
}
