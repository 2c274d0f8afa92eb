use crate::{AddressFinder, CandyMachineAccount, SdkError, SdkResult, MINT_ACCOUNT_SPACE};
use sha2::{Digest, Sha256};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_instruction,
};

/// Anchor instruction discriminator: first 8 bytes of `sha256("global:<name>")`
pub fn instruction_sighash(instruction_name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("global:{}", instruction_name).as_bytes());
    let mut sighash = [0u8; 8];
    sighash.copy_from_slice(&digest[..8]);
    sighash
}

/// Addresses a single mint transaction is bound to
#[derive(Debug, Clone, Copy)]
pub struct MintAccounts {
    pub candy_machine_id: Pubkey,
    /// Buyer wallet; pays the price, the fees and the rent
    pub payer: Pubkey,
    /// Receives the mint price; must match the candy machine's wallet
    pub treasury: Pubkey,
    /// Address of the new token mint (a fresh keypair that must co-sign)
    pub mint: Pubkey,
}

/// The candy machine `mint_nft` instruction.
///
/// The payer acts as mint authority and update authority for the new token.
pub fn build_mint_nft_ix(
    address_finder: &AddressFinder,
    candy_machine: &CandyMachineAccount,
    accounts: &MintAccounts,
) -> SdkResult<Instruction> {
    if let Some(token_mint) = candy_machine.token_mint {
        return Err(SdkError::UnsupportedPaymentMint(token_mint.to_string()));
    }

    let MintAccounts {
        candy_machine_id,
        payer,
        treasury,
        mint,
    } = *accounts;
    let (metadata, _) = address_finder.find_metadata_address(&mint);
    let (master_edition, _) = address_finder.find_master_edition_address(&mint);

    let accounts = vec![
        AccountMeta::new_readonly(candy_machine.config, false),
        AccountMeta::new(candy_machine_id, false),
        AccountMeta::new(payer, true),
        AccountMeta::new(treasury, false),
        AccountMeta::new(metadata, false),
        AccountMeta::new(mint, false),
        AccountMeta::new_readonly(payer, true),
        AccountMeta::new_readonly(payer, true),
        AccountMeta::new(master_edition, false),
        AccountMeta::new_readonly(address_finder.token_metadata_program_id, false),
        AccountMeta::new_readonly(address_finder.token_program_id, false),
        AccountMeta::new_readonly(address_finder.system_program_id, false),
        AccountMeta::new_readonly(address_finder.rent_id, false),
        AccountMeta::new_readonly(address_finder.clock_id, false),
    ];

    Ok(Instruction {
        program_id: address_finder.candy_machine_program_id,
        accounts,
        data: instruction_sighash("mint_nft").to_vec(),
    })
}

/// Instructions that prepare a fresh one-of-one token mint owned by `payer`:
/// allocate the mint account, initialize it with 0 decimals, create the payer's
/// associated token account and mint the single token into it.
pub fn build_prepare_token_mint_ixs(
    address_finder: &AddressFinder,
    payer: &Pubkey,
    mint: &Pubkey,
    mint_rent_lamports: u64,
) -> SdkResult<Vec<Instruction>> {
    let token_program_id = address_finder.token_program_id;
    let token_account = address_finder.find_associated_token_address(payer, mint);

    let create_mint_account_ix = system_instruction::create_account(
        payer,
        mint,
        mint_rent_lamports,
        MINT_ACCOUNT_SPACE,
        &token_program_id,
    );

    let initialize_mint_ix =
        spl_token::instruction::initialize_mint(&token_program_id, mint, payer, Some(payer), 0)
            .map_err(|e| {
                SdkError::InstructionBuilder(format!("Failed to build initialize_mint: {}", e))
            })?;

    let create_token_account_ix =
        spl_associated_token_account::instruction::create_associated_token_account(
            payer,
            payer,
            mint,
            &token_program_id,
        );

    let mint_to_ix =
        spl_token::instruction::mint_to(&token_program_id, mint, &token_account, payer, &[], 1)
            .map_err(|e| SdkError::InstructionBuilder(format!("Failed to build mint_to: {}", e)))?;

    Ok(vec![
        create_mint_account_ix,
        initialize_mint_ix,
        create_token_account_ix,
        mint_to_ix,
    ])
}
