use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::set_return_data;
use anchor_spl::token::TokenAccount;

use crate::{
    constants::*,
    errors::*,
    math::{self, assets_from_shares, shares_from_assets, Rounding},
    state::*,
};

/// Read-only vault views, CPI-composable via return data
///
/// Every figure is computed over previewed (post-accrual) totals so view
/// calls stay side-effect free while still reflecting unrealized yield and
/// pending fee dilution.
#[derive(Accounts)]
pub struct VaultView<'info> {
    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        seeds = [STRATEGY_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,
}

#[derive(Accounts)]
pub struct VaultViewWithOwner<'info> {
    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        seeds = [STRATEGY_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,

    #[account(
        constraint = owner_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
    )]
    pub owner_share_account: Account<'info, TokenAccount>,
}

fn previewed_totals(view: &VaultView) -> Result<(u64, u64)> {
    let now = Clock::get()?.unix_timestamp;
    view.vault_state
        .preview_totals(view.strategy_registry.total_reported_value()?, now)
}

fn previewed_totals_with_owner(view: &VaultViewWithOwner) -> Result<(u64, u64)> {
    let now = Clock::get()?.unix_timestamp;
    view.vault_state
        .preview_totals(view.strategy_registry.total_reported_value()?, now)
}

fn return_u64(value: u64) {
    set_return_data(&value.to_le_bytes());
}

/// Shares a deposit of `assets` would mint (floor rounding)
pub fn preview_deposit(ctx: Context<VaultView>, assets: u64) -> Result<()> {
    let (supply, total_assets) = previewed_totals(&ctx.accounts)?;
    return_u64(shares_from_assets(assets, supply, total_assets, Rounding::Floor)?);
    Ok(())
}

/// Assets an exact-share mint would cost (ceiling rounding)
pub fn preview_mint(ctx: Context<VaultView>, shares: u64) -> Result<()> {
    let (supply, total_assets) = previewed_totals(&ctx.accounts)?;
    return_u64(assets_from_shares(shares, supply, total_assets, Rounding::Ceiling)?);
    Ok(())
}

/// Shares an exact-asset withdrawal would burn (ceiling rounding)
pub fn preview_withdraw(ctx: Context<VaultView>, assets: u64) -> Result<()> {
    let (supply, total_assets) = previewed_totals(&ctx.accounts)?;
    return_u64(shares_from_assets(assets, supply, total_assets, Rounding::Ceiling)?);
    Ok(())
}

/// Assets a redemption of `shares` would return (floor rounding)
pub fn preview_redeem(ctx: Context<VaultView>, shares: u64) -> Result<()> {
    let (supply, total_assets) = previewed_totals(&ctx.accounts)?;
    return_u64(assets_from_shares(shares, supply, total_assets, Rounding::Floor)?);
    Ok(())
}

/// Canonical asset-to-share conversion (floor rounding)
pub fn convert_to_shares(ctx: Context<VaultView>, assets: u64) -> Result<()> {
    let (supply, total_assets) = previewed_totals(&ctx.accounts)?;
    return_u64(shares_from_assets(assets, supply, total_assets, Rounding::Floor)?);
    Ok(())
}

/// Canonical share-to-asset conversion (floor rounding)
pub fn convert_to_assets(ctx: Context<VaultView>, shares: u64) -> Result<()> {
    let (supply, total_assets) = previewed_totals(&ctx.accounts)?;
    return_u64(assets_from_shares(shares, supply, total_assets, Rounding::Floor)?);
    Ok(())
}

/// Total managed assets as of a fresh accrual
pub fn total_assets(ctx: Context<VaultView>) -> Result<()> {
    let (_, total_assets) = previewed_totals(&ctx.accounts)?;
    return_u64(total_assets);
    Ok(())
}

/// Per-share price (PRICE_SCALE fixed point) as of a fresh accrual
pub fn share_price(ctx: Context<VaultView>) -> Result<()> {
    let (supply, total_assets) = previewed_totals(&ctx.accounts)?;
    return_u64(math::share_price(supply, total_assets)?);
    Ok(())
}

/// Configured deposit ceiling
pub fn max_deposit(ctx: Context<VaultView>) -> Result<()> {
    return_u64(ctx.accounts.vault_state.max_deposit_amount);
    Ok(())
}

/// Share-denominated deposit ceiling
pub fn max_mint(ctx: Context<VaultView>) -> Result<()> {
    let cap = ctx.accounts.vault_state.max_deposit_amount;
    if cap == u64::MAX {
        return_u64(u64::MAX);
        return Ok(());
    }
    let (supply, total_assets) = previewed_totals(&ctx.accounts)?;
    return_u64(shares_from_assets(cap, supply, total_assets, Rounding::Floor)?);
    Ok(())
}

/// Assets the owner can actually withdraw right now: the minimum of their
/// convertible balance and reachable liquidity (idle + Active strategies'
/// withdraw capacity) - not merely their nominal balance.
pub fn max_withdraw(ctx: Context<VaultViewWithOwner>) -> Result<()> {
    let (supply, total_assets) = previewed_totals_with_owner(&ctx.accounts)?;
    let owner_assets = assets_from_shares(
        ctx.accounts.owner_share_account.amount,
        supply,
        total_assets,
        Rounding::Floor,
    )?;
    let liquidity = ctx
        .accounts
        .vault_state
        .idle_assets
        .checked_add(ctx.accounts.strategy_registry.previewed_liquidity()?)
        .ok_or(VaultError::MathOverflow)?;
    return_u64(owner_assets.min(liquidity));
    Ok(())
}

/// Shares the owner can actually redeem right now
pub fn max_redeem(ctx: Context<VaultViewWithOwner>) -> Result<()> {
    let (supply, total_assets) = previewed_totals_with_owner(&ctx.accounts)?;
    let owner_assets = assets_from_shares(
        ctx.accounts.owner_share_account.amount,
        supply,
        total_assets,
        Rounding::Floor,
    )?;
    let liquidity = ctx
        .accounts
        .vault_state
        .idle_assets
        .checked_add(ctx.accounts.strategy_registry.previewed_liquidity()?)
        .ok_or(VaultError::MathOverflow)?;
    return_u64(shares_from_assets(
        owner_assets.min(liquidity),
        supply,
        total_assets,
        Rounding::Floor,
    )?);
    Ok(())
}
