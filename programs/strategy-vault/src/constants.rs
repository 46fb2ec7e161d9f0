// Constants for the Strategy Vault program

/// Seed for vault state PDA
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed for share mint PDA
pub const SHARE_MINT_SEED: &[u8] = b"shares";

/// Seed for vault authority PDA
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

/// Seed for strategy registry PDA
pub const STRATEGY_REGISTRY_SEED: &[u8] = b"strategy_registry";

/// Seed for withdrawal queue PDA
pub const WITHDRAWAL_QUEUE_SEED: &[u8] = b"withdrawal_queue";

/// Basis point denominator (100% = 10_000 bps)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Management fee cap: 10% annualized
pub const MAX_MANAGEMENT_FEE_BPS: u16 = 1_000;

/// Performance fee cap: 30% of value above the high-water mark
pub const MAX_PERFORMANCE_FEE_BPS: u16 = 3_000;

/// Seconds in a (non-leap) year, used to prorate the management fee
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Fixed-point scale for per-share prices (9 decimals)
pub const PRICE_SCALE: u64 = 1_000_000_000;

/// Maximum strategies per registry before hitting account size limits
pub const MAX_STRATEGIES: usize = 10;

/// Maximum strategy display-name length
pub const MAX_STRATEGY_NAME_LEN: usize = 32;

/// Hard ceiling on a single strategy's bookkept allocation.
///
/// The reference design bounded allocations to a 120-bit storage slot; here
/// the ceiling is an explicit constant instead of a packing artifact. Callers
/// computing allocation deltas must clamp or reject before writing.
pub const MAX_STRATEGY_ALLOCATION: u64 = 1 << 60;

/// Maximum simultaneously-queued redemption requests across all epochs
pub const MAX_QUEUED_REQUESTS: usize = 64;

/// Maximum tracked (unpruned) epochs in the withdrawal queue
pub const MAX_TRACKED_EPOCHS: usize = 32;

/// Space for VaultState account (8 discriminator + 2 * 32 roles + 3 * 32 mints
/// and recipients + 32 fee recipient + 10 * 8 amounts + 2 * 2 fee bps +
/// 8 timestamp + 2 version + 3 bumps + 128 padding), rounded up
pub const VAULT_STATE_SIZE: usize = 8 + (32 * 6) + (8 * 10) + (2 * 2) + 8 + 2 + 3 + 128;

/// Space for StrategyRegistry (8 discriminator + 32 vault + vec of entries +
/// vec of order keys + 1 bump + 64 padding). Entry: 32 key + 4 + 32 name +
/// 1 status + 4 * 8 amounts.
pub const STRATEGY_REGISTRY_SIZE: usize =
    8 + 32 + 4 + MAX_STRATEGIES * (32 + 4 + MAX_STRATEGY_NAME_LEN + 1 + 32) + 4 + MAX_STRATEGIES * 32 + 1 + 64;

/// Space for WithdrawalQueue (8 discriminator + 32 vault + 8 active epoch +
/// 8 unclaimed + vec of epochs + vec of requests + 1 bump + 64 padding).
/// Epoch entry: 8 id + 8 total + 9 optional price. Request: 32 user +
/// 8 epoch id + 8 shares.
pub const WITHDRAWAL_QUEUE_SIZE: usize =
    8 + 32 + 8 + 8 + 4 + MAX_TRACKED_EPOCHS * (8 + 8 + 9) + 4 + MAX_QUEUED_REQUESTS * (32 + 8 + 8) + 1 + 64;
