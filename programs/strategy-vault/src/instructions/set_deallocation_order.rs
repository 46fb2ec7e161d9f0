use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Replace the withdrawal-sourcing priority wholesale
///
/// Every entry must reference a currently Active strategy; the previous
/// order is fully overwritten, never merged.
#[derive(Accounts)]
pub struct SetDeallocationOrder<'info> {
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

pub fn handler(ctx: Context<SetDeallocationOrder>, order: Vec<Pubkey>) -> Result<()> {
    let registry = &mut ctx.accounts.strategy_registry;
    registry.set_deallocation_order(order.clone())?;

    emit!(DeallocationOrderUpdated {
        vault: ctx.accounts.vault_state.key(),
        order,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
