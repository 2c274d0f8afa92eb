use thiserror::Error;

pub type SdkResult<T> = Result<T, SdkError>;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),

    #[error("Account discriminator mismatch: expected {expected:?}, found {found:?}")]
    DiscriminatorMismatch { expected: [u8; 8], found: [u8; 8] },

    #[error("Candy machine charges in SPL token {0}, only SOL-priced machines are supported")]
    UnsupportedPaymentMint(String),

    #[error("Instruction building failed: {0}")]
    InstructionBuilder(String),
}

/// Custom errors raised by the candy machine program.
///
/// Anchor numbers these from 300, so a `custom program error: 0x137` in a
/// transaction log is `CandyMachineEmpty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CandyMachineError {
    IncorrectOwner = 300,
    Uninitialized = 301,
    MintMismatch = 302,
    IndexGreaterThanLength = 303,
    ConfigMustHaveAtleastOneEntry = 304,
    NumericalOverflowError = 305,
    TooManyCreators = 306,
    UuidMustBeExactly6Length = 307,
    NotEnoughTokens = 308,
    NotEnoughSol = 309,
    TokenTransferFailed = 310,
    CandyMachineEmpty = 311,
    CandyMachineNotLiveYet = 312,
    ConfigLineMismatch = 313,
}

impl CandyMachineError {
    pub fn from_code(code: u32) -> Option<Self> {
        use CandyMachineError::*;
        let error = match code {
            300 => IncorrectOwner,
            301 => Uninitialized,
            302 => MintMismatch,
            303 => IndexGreaterThanLength,
            304 => ConfigMustHaveAtleastOneEntry,
            305 => NumericalOverflowError,
            306 => TooManyCreators,
            307 => UuidMustBeExactly6Length,
            308 => NotEnoughTokens,
            309 => NotEnoughSol,
            310 => TokenTransferFailed,
            311 => CandyMachineEmpty,
            312 => CandyMachineNotLiveYet,
            313 => ConfigLineMismatch,
            _ => return None,
        };
        Some(error)
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    /// Message the program attaches to the error in its IDL
    pub fn message(self) -> &'static str {
        use CandyMachineError::*;
        match self {
            IncorrectOwner => "Account does not have correct owner!",
            Uninitialized => "Account is not initialized!",
            MintMismatch => "Mint Mismatch!",
            IndexGreaterThanLength => "Index greater than length!",
            ConfigMustHaveAtleastOneEntry => "Config must have atleast one entry!",
            NumericalOverflowError => "Numerical overflow error!",
            TooManyCreators => {
                "Can only provide up to 4 creators to candy machine (because candy machine is one)!"
            }
            UuidMustBeExactly6Length => "Uuid must be exactly of 6 length",
            NotEnoughTokens => "Not enough tokens to pay for this minting",
            NotEnoughSol => "Not enough SOL to pay for this minting",
            TokenTransferFailed => "Token transfer failed",
            CandyMachineEmpty => "Candy machine is empty!",
            CandyMachineNotLiveYet => "Candy machine is not live yet!",
            ConfigLineMismatch => {
                "Number of config lines must be at least number of items available"
            }
        }
    }
}
