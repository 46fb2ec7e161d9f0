use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

use super::accrue_yield::settle;

/// Fee configuration updates
///
/// Outstanding fees settle at the old rate before the new one applies, so a
/// rate change never reprices an already-elapsed accrual period.
#[derive(Accounts)]
pub struct UpdateFees<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [STRATEGY_REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,
}

pub fn update_management_fee(
    ctx: Context<UpdateFees>,
    fee_bps: u16,
    recipient: Pubkey,
) -> Result<()> {
    // CHECKS
    VaultState::validate_fee_config(fee_bps, MAX_MANAGEMENT_FEE_BPS, &recipient)?;

    let now = Clock::get()?.unix_timestamp;
    let vault_state = &mut ctx.accounts.vault_state;
    let registry = &mut ctx.accounts.strategy_registry;

    settle(vault_state, registry, now)?;

    // EFFECTS
    vault_state.management_fee_bps = fee_bps;
    vault_state.management_fee_recipient = recipient;

    emit!(FeeConfigUpdated {
        vault: vault_state.key(),
        management_fee_bps: vault_state.management_fee_bps,
        performance_fee_bps: vault_state.performance_fee_bps,
        timestamp: now,
    });

    Ok(())
}

pub fn update_performance_fee(
    ctx: Context<UpdateFees>,
    fee_bps: u16,
    recipient: Pubkey,
) -> Result<()> {
    // CHECKS
    VaultState::validate_fee_config(fee_bps, MAX_PERFORMANCE_FEE_BPS, &recipient)?;

    let now = Clock::get()?.unix_timestamp;
    let vault_state = &mut ctx.accounts.vault_state;
    let registry = &mut ctx.accounts.strategy_registry;

    settle(vault_state, registry, now)?;

    // EFFECTS
    vault_state.performance_fee_bps = fee_bps;
    vault_state.performance_fee_recipient = recipient;

    emit!(FeeConfigUpdated {
        vault: vault_state.key(),
        management_fee_bps: vault_state.management_fee_bps,
        performance_fee_bps: vault_state.performance_fee_bps,
        timestamp: now,
    });

    Ok(())
}
