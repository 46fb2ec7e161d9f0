use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Remove a strategy from the registry
///
/// Active strategies must be fully deallocated and out of the deallocation
/// order first. Halted strategies may be force-removed; their stranded
/// allocation is written off the cache as a realized loss.
#[derive(Accounts)]
pub struct RemoveStrategy<'info> {
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

pub fn handler(ctx: Context<RemoveStrategy>, strategy: Pubkey) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;
    let registry = &mut ctx.accounts.strategy_registry;

    // EFFECTS
    let written_off = registry.remove(&strategy)?;
    if written_off > 0 {
        vault_state.record_write_off(written_off)?;
    }

    emit!(StrategyRemoved {
        vault: vault_state.key(),
        strategy,
        written_off,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
