use anchor_lang::prelude::*;

#[error_code]
pub enum CustomErrorCode {
    #[msg("Caller lacks the capability required for this action")]
    Unauthorized = 1,
    #[msg("Invalid setting value")]
    InvalidValue = 2,
    #[msg("Action is not allowed in the current appchain state")]
    InvalidState = 3,
    #[msg("Lifecycle transition requirements are not met")]
    PreconditionNotMet = 4,
    #[msg("Unknown validator")]
    UnknownValidator = 5,
    #[msg("Validator is already registered")]
    DuplicateValidator = 6,
    #[msg("Amount is below the minimum deposit")]
    BelowMinimumDeposit = 7,
    #[msg("Insufficient stake for this decrease")]
    InsufficientStake = 8,
    #[msg("Validator count exceeds the upper limit")]
    ValidatorCountExceeded = 9,
    #[msg("Validator cannot be delegated to")]
    ValidatorNotDelegable = 10,
    #[msg("Too many validators delegated")]
    TooManyDelegations = 11,
    #[msg("Malformed staking intent")]
    MalformedIntent = 12,
    #[msg("Index out of range")]
    IndexOutOfRange = 13,

    #[msg("Unknown delegator")]
    UnknownDelegator = 14,
    #[msg("Delegator is already registered to this validator")]
    DuplicateDelegator = 15,
    #[msg("Invalid validator id in appchain")]
    InvalidValidatorIdInAppchain = 16,
    #[msg("Too few validators, cannot unbond any more")]
    TooFewValidators = 17,
    #[msg("Invalid amount")]
    InvalidAmount = 18,
    #[msg("Amount overflow")]
    AmountOverflow = 19,
    #[msg("Asset transfer is paused")]
    AssetTransferPaused = 20,

    #[msg("Invalid mint provided")]
    InvalidMint = 21,
    #[msg("Invalid vault authority")]
    InvalidVaultAuthority = 22,
    #[msg("Invalid token account owner")]
    InvalidTokenOwner = 23,
    #[msg("ProgramData account did not match expected PDA.")]
    InvalidProgramData = 24,
    #[msg("Program has no upgrade authority (set to None).")]
    NoUpgradeAuthority = 25,
    #[msg("Signer is not the upgrade authority.")]
    InvalidUpgradeAuthority = 26,
}
