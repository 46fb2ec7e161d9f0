use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Flip a strategy between Active and Halted
///
/// Halted strategies keep their allocation and valuation but are excluded
/// from new allocation, deallocation, and withdrawal sourcing - a per-
/// strategy emergency stop.
#[derive(Accounts)]
pub struct ToggleStrategy<'info> {
    pub authority: Signer<'info>,

    #[account(
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

pub fn handler(ctx: Context<ToggleStrategy>, strategy: Pubkey) -> Result<()> {
    let registry = &mut ctx.accounts.strategy_registry;
    let active = registry.toggle(&strategy)?;

    emit!(StrategyStatusToggled {
        vault: ctx.accounts.vault_state.key(),
        strategy,
        active,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
