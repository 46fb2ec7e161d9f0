use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Deposit/withdraw bound updates
#[derive(Accounts)]
pub struct UpdateLimits<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,
}

pub fn update_deposit_limits(ctx: Context<UpdateLimits>, min: u64, max: u64) -> Result<()> {
    VaultState::validate_limits(min, max)?;

    let vault_state = &mut ctx.accounts.vault_state;
    vault_state.min_deposit_amount = min;
    vault_state.max_deposit_amount = max;

    emit_limits(vault_state)
}

pub fn update_withdraw_limits(ctx: Context<UpdateLimits>, min: u64, max: u64) -> Result<()> {
    VaultState::validate_limits(min, max)?;

    let vault_state = &mut ctx.accounts.vault_state;
    vault_state.min_withdraw_amount = min;
    vault_state.max_withdraw_amount = max;

    emit_limits(vault_state)
}

fn emit_limits(vault_state: &Account<VaultState>) -> Result<()> {
    emit!(LimitsUpdated {
        vault: vault_state.key(),
        min_deposit_amount: vault_state.min_deposit_amount,
        max_deposit_amount: vault_state.max_deposit_amount,
        min_withdraw_amount: vault_state.min_withdraw_amount,
        max_withdraw_amount: vault_state.max_withdraw_amount,
        timestamp: Clock::get()?.unix_timestamp,
    });
    Ok(())
}
