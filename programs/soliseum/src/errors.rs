use anchor_lang::prelude::*;

#[error_code]
pub enum SoliseumError {
    #[msg("Arena is already initialized")]
    AlreadyInitialized,

    #[msg("Fee must not exceed 1000 bps")]
    FeeOutOfRange,

    #[msg("Oracle threshold must be exactly 2")]
    InvalidThreshold,

    #[msg("Oracle identities must be pairwise distinct")]
    DuplicateOracle,

    #[msg("Arena is not active")]
    NotActive,

    #[msg("Arena is not settled")]
    NotSettled,

    #[msg("Stake amount must be greater than zero")]
    ZeroAmount,

    #[msg("Side must be 0 or 1")]
    InvalidSide,

    #[msg("Cannot switch sides on an existing stake")]
    SideMismatch,

    #[msg("Insufficient funds to cover stake")]
    InsufficientFunds,

    #[msg("Vault balance insufficient for payout")]
    InsufficientVault,

    #[msg("Arithmetic overflow")]
    Overflow,

    #[msg("Fewer than threshold valid oracle signatures were provided")]
    InsufficientSignatures,

    #[msg("The same oracle index signed more than once")]
    DuplicateSigner,

    #[msg("Oracle index out of range")]
    OracleIndexOutOfRange,

    #[msg("An oracle signature failed verification")]
    InvalidSignature,

    #[msg("No stake record exists for this caller in this arena")]
    StakeNotFound,

    #[msg("Caller is not this arena's creator")]
    UnauthorizedCreator,

    #[msg("Reward has already been claimed")]
    AlreadyClaimed,

    #[msg("Unclaimed winning stakes remain")]
    UnclaimedStakesPresent,

    #[msg("Settlement is invalid: the winning side has an empty pool")]
    InvalidSettlement,
}
