use anchor_lang::prelude::*;

/// Event emitted when a new vault is initialized
#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub operator: Pubkey,
    pub asset_mint: Pubkey,
    pub share_mint: Pubkey,
    pub timestamp: i64,
}

/// Event emitted when vault logic/schema moves to a new version
#[event]
pub struct VaultUpgraded {
    pub vault: Pubkey,
    pub from_version: u16,
    pub to_version: u16,
    pub timestamp: i64,
}

/// Event emitted when assets are deposited
#[event]
pub struct Deposited {
    pub vault: Pubkey,
    pub user: Pubkey,
    pub asset_amount: u64,
    pub shares_minted: u64,
    pub total_assets: u64,
    pub total_shares: u64,
    pub timestamp: i64,
}

/// Event emitted when assets are withdrawn synchronously
#[event]
pub struct Withdrawn {
    pub vault: Pubkey,
    pub user: Pubkey,
    pub receiver: Pubkey,
    pub asset_amount: u64,
    pub shares_burned: u64,
    pub total_assets: u64,
    pub total_shares: u64,
    pub timestamp: i64,
}

/// Event emitted at each yield reconciliation
#[event]
pub struct YieldAccrued {
    pub vault: Pubkey,
    pub profit: u64,
    pub loss: u64,
    pub management_fee_assets: u64,
    pub performance_fee_assets: u64,
    pub total_assets: u64,
    pub high_water_mark: u64,
    pub timestamp: i64,
}

/// Event emitted when pending fee shares are minted out
#[event]
pub struct FeesCollected {
    pub vault: Pubkey,
    pub management_fee_shares: u64,
    pub performance_fee_shares: u64,
    pub timestamp: i64,
}

/// Event emitted when a strategy is added to the registry
#[event]
pub struct StrategyAdded {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub name: String,
    pub max_allocation: u64,
    pub timestamp: i64,
}

/// Event emitted when a strategy is removed
#[event]
pub struct StrategyRemoved {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub written_off: u64,
    pub timestamp: i64,
}

/// Event emitted when a strategy toggles between Active and Halted
#[event]
pub struct StrategyStatusToggled {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub active: bool,
    pub timestamp: i64,
}

/// Event emitted when the deallocation order is replaced
#[event]
pub struct DeallocationOrderUpdated {
    pub vault: Pubkey,
    pub order: Vec<Pubkey>,
    pub timestamp: i64,
}

/// Event emitted when a strategy valuation is reported
#[event]
pub struct StrategyReported {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub total_value: u64,
    pub max_withdraw: u64,
    pub timestamp: i64,
}

/// Event emitted per allocation-batch entry
#[event]
pub struct Allocated {
    pub vault: Pubkey,
    pub strategy: Pubkey,
    pub is_deposit: bool,
    pub requested: u64,
    pub actual: u64,
    pub idle_assets: u64,
    pub timestamp: i64,
}

/// Event emitted when fee configuration changes
#[event]
pub struct FeeConfigUpdated {
    pub vault: Pubkey,
    pub management_fee_bps: u16,
    pub performance_fee_bps: u16,
    pub timestamp: i64,
}

/// Event emitted when deposit/withdraw limits change
#[event]
pub struct LimitsUpdated {
    pub vault: Pubkey,
    pub min_deposit_amount: u64,
    pub max_deposit_amount: u64,
    pub min_withdraw_amount: u64,
    pub max_withdraw_amount: u64,
    pub timestamp: i64,
}

/// Event emitted when shares are queued for async redemption
#[event]
pub struct RedeemRequested {
    pub vault: Pubkey,
    pub user: Pubkey,
    pub epoch_id: u64,
    pub shares: u64,
    pub timestamp: i64,
}

/// Event emitted when a queued request is cancelled
#[event]
pub struct RequestCancelled {
    pub vault: Pubkey,
    pub user: Pubkey,
    pub epoch_id: u64,
    pub shares: u64,
    pub timestamp: i64,
}

/// Event emitted when a request is pushed into the next epoch
#[event]
pub struct RequestMoved {
    pub vault: Pubkey,
    pub user: Pubkey,
    pub from_epoch: u64,
    pub to_epoch: u64,
    pub shares: u64,
    pub timestamp: i64,
}

/// Event emitted when the active epoch advances
#[event]
pub struct EpochClosed {
    pub vault: Pubkey,
    pub closed_epoch: u64,
    pub new_active_epoch: u64,
    pub requested_shares: u64,
    pub timestamp: i64,
}

/// Event emitted when a closed epoch is settled at an oracle price
#[event]
pub struct EpochProcessed {
    pub vault: Pubkey,
    pub epoch_id: u64,
    pub share_price: u64,
    pub shares_burned: u64,
    pub assets_earmarked: u64,
    pub timestamp: i64,
}

/// Event emitted when a user claims processed withdrawals
#[event]
pub struct WithdrawalClaimed {
    pub vault: Pubkey,
    pub user: Pubkey,
    pub epoch_ids: Vec<u64>,
    pub assets: u64,
    pub timestamp: i64,
}

/// Event emitted per user paid in an administrative batch claim
#[event]
pub struct BatchWithdrawalClaimed {
    pub vault: Pubkey,
    pub user: Pubkey,
    pub epoch_id: u64,
    pub assets: u64,
    pub timestamp: i64,
}
