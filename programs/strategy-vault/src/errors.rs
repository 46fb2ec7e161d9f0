use anchor_lang::prelude::*;

/// Custom error codes for the Strategy Vault program
///
/// Security: Descriptive error messages without information leakage
#[error_code]
pub enum VaultError {
    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Math overflow occurred during calculation")]
    MathOverflow,

    #[msg("Cannot divide by zero")]
    DivisionByZero,

    #[msg("Invalid token mint - does not match vault asset")]
    InvalidMint,

    #[msg("Invalid token account owner")]
    InvalidOwner,

    #[msg("Unauthorized - caller does not hold the required role")]
    Unauthorized,

    #[msg("Deposit amount below the configured minimum")]
    DepositBelowMinimum,

    #[msg("Deposit amount above the configured maximum")]
    DepositAboveMaximum,

    #[msg("Withdrawal amount below the configured minimum")]
    WithdrawBelowMinimum,

    #[msg("Withdrawal amount above the configured maximum")]
    WithdrawAboveMaximum,

    #[msg("Limit bounds invalid - maximum must not be below minimum")]
    InvalidLimits,

    #[msg("Conversion would mint or burn zero shares")]
    InsufficientShares,

    #[msg("Conversion would credit zero assets")]
    InsufficientAssets,

    #[msg("Insufficient idle assets in the vault")]
    InsufficientIdleAssets,

    #[msg("Insufficient liquidity across idle balance and deallocation order")]
    InsufficientLiquidity,

    #[msg("Fee rate exceeds its cap")]
    FeeTooHigh,

    #[msg("Nonzero fee rate requires a fee recipient")]
    FeeRecipientRequired,

    #[msg("Strategy already exists in registry")]
    StrategyAlreadyExists,

    #[msg("Strategy not found in registry")]
    StrategyNotFound,

    #[msg("Strategy is not active")]
    StrategyNotActive,

    #[msg("Strategy still holds a nonzero allocation")]
    StrategyHasAllocation,

    #[msg("Strategy is present in the deallocation order")]
    StrategyInDeallocationOrder,

    #[msg("Strategy registry is full - maximum strategies reached")]
    RegistryFull,

    #[msg("Strategy name too long - maximum 32 characters")]
    NameTooLong,

    #[msg("Allocation would exceed a strategy limit")]
    AllocationLimitExceeded,

    #[msg("Expected strategy token account was not supplied")]
    MissingStrategyAccount,

    #[msg("Expected recipient token account was not supplied")]
    MissingClaimAccount,

    #[msg("Epoch ordering violated - previous epoch is not processed")]
    EpochOutOfOrder,

    #[msg("Epoch is already processed")]
    EpochAlreadyProcessed,

    #[msg("Epoch is not processed yet")]
    EpochNotProcessed,

    #[msg("Epoch is no longer accepting this operation")]
    EpochNotActive,

    #[msg("No closed epoch is awaiting processing")]
    NoEpochToProcess,

    #[msg("Nothing claimable for the given epochs")]
    NothingToClaim,

    #[msg("No queued redemption request found")]
    RequestNotFound,

    #[msg("Withdrawal queue is full")]
    QueueFull,

    #[msg("Epoch tracking capacity exhausted - claims must drain first")]
    EpochCapacityExceeded,

    #[msg("Upgrade target version is not the immediate successor")]
    InvalidVersion,
}
