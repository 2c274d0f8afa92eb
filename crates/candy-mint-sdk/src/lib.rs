/*!
# Candy Mint SDK

Client-side view of the candy machine (v1) program: the account layout it stores,
the addresses it derives, the error codes it raises, and builders for the single
"mint one token" transaction.

Nothing in this crate talks to an RPC node. Callers provide blockhashes, rent
figures and signers; the builders only assemble instructions and messages.

## Usage

```rust
use candy_mint_sdk::{build_mint_one_token_tx, CandyMachineAccount, MintAccounts};
use solana_sdk::{hash::Hash, pubkey::Pubkey};

# fn example(candy_machine: &CandyMachineAccount) -> candy_mint_sdk::SdkResult<()> {
let accounts = MintAccounts {
    candy_machine_id: Pubkey::new_unique(),
    payer: Pubkey::new_unique(),
    treasury: candy_machine.wallet,
    mint: Pubkey::new_unique(),
};
let tx = build_mint_one_token_tx(candy_machine, &accounts, 1_461_600, Hash::default())?;
assert_eq!(tx.message.instructions.len(), 5);
# Ok(())
# }
```
*/

mod address_finder;
mod candy_machine;
mod errors;
mod instruction_builders;
mod transaction_builders;

pub use address_finder::AddressFinder;
pub use candy_machine::{
    account_discriminator, CandyMachineAccount, CandyMachineData, CANDY_MACHINE_ACCOUNT_NAME,
};
pub use errors::{CandyMachineError, SdkError, SdkResult};
pub use instruction_builders::*;
pub use transaction_builders::*;

use solana_sdk::{pubkey, pubkey::Pubkey};

/// Candy machine (v1) program
pub const CANDY_MACHINE_PROGRAM_ID: Pubkey = pubkey!("cndyAnrLdpjq1Ssp1z8xxDsB8dxe7u4HL5Nxi2K5WXZ");

/// Token metadata program
pub const TOKEN_METADATA_PROGRAM_ID: Pubkey =
    pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

/// Size of an SPL token mint account
pub const MINT_ACCOUNT_SPACE: u64 = 82;
