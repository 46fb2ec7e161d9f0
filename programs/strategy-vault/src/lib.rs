// Strategy Vault - multi-strategy tokenized vault on Solana
// Deposits pool into shares; assets allocate across a whitelisted strategy
// set; an epoch-based queue settles asynchronous redemptions in batches.

use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod math;
pub mod state;

use instructions::*;

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

#[program]
pub mod strategy_vault {
    use super::*;

    /// Initialize a new vault for a given asset token
    ///
    /// Invoked exactly once by the deploying factory; re-initialization
    /// fails on the account init constraints.
    pub fn initialize(ctx: Context<Initialize>, params: InitializeParams) -> Result<()> {
        instructions::initialize::handler(ctx, params)
    }

    /// Advance the vault to the next schema/logic version
    pub fn upgrade(ctx: Context<Upgrade>, target_version: u16) -> Result<()> {
        instructions::upgrade::handler(ctx, target_version)
    }

    /// Deposit assets into the vault and receive shares
    ///
    /// Accrues yield first, prices at the live share value (floor rounding),
    /// and fails rather than mint zero shares.
    pub fn deposit(ctx: Context<Deposit>, assets: u64) -> Result<()> {
        instructions::deposit::handler(ctx, assets)
    }

    /// Mint an exact number of shares, paying the assets they cost
    /// (ceiling rounding)
    pub fn mint_shares(ctx: Context<MintShares>, shares: u64) -> Result<()> {
        instructions::mint_shares::handler(ctx, shares)
    }

    /// Withdraw an exact amount of assets, burning the shares they cost
    ///
    /// Sources liquidity from the idle balance first, then from strategies
    /// in deallocation order; insufficient total liquidity aborts.
    pub fn withdraw<'info>(
        ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
        assets: u64,
    ) -> Result<()> {
        instructions::withdraw::handler(ctx, assets)
    }

    /// Redeem an exact number of shares for assets (floor rounding)
    pub fn redeem<'info>(
        ctx: Context<'_, '_, 'info, 'info, Redeem<'info>>,
        shares: u64,
    ) -> Result<()> {
        instructions::redeem::handler(ctx, shares)
    }

    /// Reconcile cached total assets against live strategy valuations,
    /// settling management and performance fees
    pub fn accrue_yield(ctx: Context<AccrueYield>) -> Result<()> {
        instructions::accrue_yield::handler(ctx)
    }

    /// Mint accrued fee shares out to the fee recipients
    pub fn collect_fees(ctx: Context<CollectFees>) -> Result<()> {
        instructions::collect_fees::handler(ctx)
    }

    /// Post a strategy's live valuation and withdraw capacity
    pub fn report_strategy(
        ctx: Context<ReportStrategy>,
        strategy: Pubkey,
        total_value: u64,
        max_withdraw: u64,
    ) -> Result<()> {
        instructions::report_strategy::handler(ctx, strategy, total_value, max_withdraw)
    }

    /// Rebalance vault assets across strategies in one batch; the ledger
    /// records actual moved amounts, never requested ones
    pub fn allocate<'info>(
        ctx: Context<'_, '_, 'info, 'info, Allocate<'info>>,
        updates: Vec<AllocationUpdate>,
    ) -> Result<()> {
        instructions::allocate::handler(ctx, updates)
    }

    /// Register a new strategy in the whitelist
    pub fn add_strategy(
        ctx: Context<AddStrategy>,
        name: String,
        max_allocation: u64,
    ) -> Result<()> {
        instructions::add_strategy::handler(ctx, name, max_allocation)
    }

    /// Remove a strategy; Active ones must be drained and out of the
    /// deallocation order, Halted ones are written off
    pub fn remove_strategy(ctx: Context<RemoveStrategy>, strategy: Pubkey) -> Result<()> {
        instructions::remove_strategy::handler(ctx, strategy)
    }

    /// Flip a strategy between Active and Halted
    pub fn toggle_strategy_status(ctx: Context<ToggleStrategy>, strategy: Pubkey) -> Result<()> {
        instructions::toggle_strategy::handler(ctx, strategy)
    }

    /// Replace the withdrawal-sourcing priority wholesale
    pub fn set_deallocation_order(
        ctx: Context<SetDeallocationOrder>,
        order: Vec<Pubkey>,
    ) -> Result<()> {
        instructions::set_deallocation_order::handler(ctx, order)
    }

    /// Update the management fee rate and recipient
    pub fn update_management_fee(
        ctx: Context<UpdateFees>,
        fee_bps: u16,
        recipient: Pubkey,
    ) -> Result<()> {
        instructions::update_fees::update_management_fee(ctx, fee_bps, recipient)
    }

    /// Update the performance fee rate and recipient
    pub fn update_performance_fee(
        ctx: Context<UpdateFees>,
        fee_bps: u16,
        recipient: Pubkey,
    ) -> Result<()> {
        instructions::update_fees::update_performance_fee(ctx, fee_bps, recipient)
    }

    /// Update the deposit bounds
    pub fn update_deposit_limits(ctx: Context<UpdateLimits>, min: u64, max: u64) -> Result<()> {
        instructions::update_limits::update_deposit_limits(ctx, min, max)
    }

    /// Update the withdrawal bounds
    pub fn update_withdraw_limits(ctx: Context<UpdateLimits>, min: u64, max: u64) -> Result<()> {
        instructions::update_limits::update_withdraw_limits(ctx, min, max)
    }

    // ============ Async withdrawal queue ============

    /// Queue shares for redemption against the active epoch
    pub fn request_redeem(ctx: Context<RequestRedeem>, shares: u64) -> Result<()> {
        instructions::request_redeem::handler(ctx, shares)
    }

    /// Cancel a queued request while its epoch is still open
    pub fn cancel_request(ctx: Context<CancelRequest>, epoch_id: u64) -> Result<()> {
        instructions::cancel_request::handler(ctx, epoch_id)
    }

    /// Push the caller's active-epoch request forward by one epoch
    pub fn move_request_to_next_epoch(ctx: Context<MoveRequest>) -> Result<()> {
        instructions::move_request::handler(ctx)
    }

    /// Close the active epoch; fails while the previous one is unprocessed
    pub fn close_epoch(ctx: Context<CloseEpoch>) -> Result<()> {
        instructions::close_epoch::handler(ctx)
    }

    /// Settle the closed epoch at an oracle share price (PRICE_SCALE fixed
    /// point), burning the queued shares and earmarking the payout
    pub fn process_epoch(ctx: Context<ProcessEpoch>, share_price: u64) -> Result<()> {
        instructions::process_epoch::handler(ctx, share_price)
    }

    /// Claim settled withdrawals across processed epochs in one transfer
    pub fn claim_withdrawal(ctx: Context<ClaimWithdrawal>, epoch_ids: Vec<u64>) -> Result<()> {
        instructions::claim_withdrawal::handler(ctx, epoch_ids)
    }

    /// Administrative batch claim for one epoch, skipping zero-balance users
    pub fn claim_users_batch<'info>(
        ctx: Context<'_, '_, 'info, 'info, ClaimUsersBatch<'info>>,
        epoch_id: u64,
        users: Vec<Pubkey>,
    ) -> Result<()> {
        instructions::claim_users_batch::handler(ctx, epoch_id, users)
    }

    // ============ View Functions (CPI composable) ============

    /// Preview shares for a deposit (floor rounding)
    pub fn preview_deposit(ctx: Context<VaultView>, assets: u64) -> Result<()> {
        instructions::view::preview_deposit(ctx, assets)
    }

    /// Preview assets required for a mint (ceiling rounding)
    pub fn preview_mint(ctx: Context<VaultView>, shares: u64) -> Result<()> {
        instructions::view::preview_mint(ctx, shares)
    }

    /// Preview shares to burn for a withdrawal (ceiling rounding)
    pub fn preview_withdraw(ctx: Context<VaultView>, assets: u64) -> Result<()> {
        instructions::view::preview_withdraw(ctx, assets)
    }

    /// Preview assets for a redemption (floor rounding)
    pub fn preview_redeem(ctx: Context<VaultView>, shares: u64) -> Result<()> {
        instructions::view::preview_redeem(ctx, shares)
    }

    /// Convert assets to shares (floor rounding)
    pub fn convert_to_shares(ctx: Context<VaultView>, assets: u64) -> Result<()> {
        instructions::view::convert_to_shares(ctx, assets)
    }

    /// Convert shares to assets (floor rounding)
    pub fn convert_to_assets(ctx: Context<VaultView>, shares: u64) -> Result<()> {
        instructions::view::convert_to_assets(ctx, shares)
    }

    /// Total managed assets as of a fresh accrual
    pub fn total_assets(ctx: Context<VaultView>) -> Result<()> {
        instructions::view::total_assets(ctx)
    }

    /// Per-share price as of a fresh accrual
    pub fn share_price(ctx: Context<VaultView>) -> Result<()> {
        instructions::view::share_price(ctx)
    }

    /// Configured deposit ceiling
    pub fn max_deposit(ctx: Context<VaultView>) -> Result<()> {
        instructions::view::max_deposit(ctx)
    }

    /// Share-denominated deposit ceiling
    pub fn max_mint(ctx: Context<VaultView>) -> Result<()> {
        instructions::view::max_mint(ctx)
    }

    /// Assets the owner can withdraw right now: min(convertible balance,
    /// idle + Active strategies' withdraw capacity)
    pub fn max_withdraw(ctx: Context<VaultViewWithOwner>) -> Result<()> {
        instructions::view::max_withdraw(ctx)
    }

    /// Shares the owner can redeem right now
    pub fn max_redeem(ctx: Context<VaultViewWithOwner>) -> Result<()> {
        instructions::view::max_redeem(ctx)
    }
}
