use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Reconcile cached total assets against live strategy valuations and
/// settle fees. Permissionless: anyone may bring the cache current, and
/// every share-price-sensitive entrypoint runs the same settlement first.
#[derive(Accounts)]
pub struct AccrueYield<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [STRATEGY_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
        constraint = strategy_registry.vault == vault_state.key() @ VaultError::InvalidOwner,
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,
}

/// Run one settlement: derive profit/loss, accrue fees, write the new cache,
/// and realize strategy valuations into the allocation ledger.
pub(crate) fn settle(
    vault_state: &mut VaultState,
    registry: &mut StrategyRegistry,
    now: i64,
) -> Result<AccrualOutcome> {
    let outcome = vault_state.preview_accrual(registry.total_reported_value()?, now)?;
    vault_state.apply_accrual(&outcome, now)?;
    registry.realize_valuations();
    Ok(outcome)
}

pub fn handler(ctx: Context<AccrueYield>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let vault_state = &mut ctx.accounts.vault_state;
    let registry = &mut ctx.accounts.strategy_registry;

    let outcome = settle(vault_state, registry, now)?;

    emit!(YieldAccrued {
        vault: vault_state.key(),
        profit: outcome.profit,
        loss: outcome.loss,
        management_fee_assets: outcome.management_fee_assets,
        performance_fee_assets: outcome.performance_fee_assets,
        total_assets: vault_state.cached_total_assets,
        high_water_mark: vault_state.high_water_mark,
        timestamp: now,
    });

    Ok(())
}
