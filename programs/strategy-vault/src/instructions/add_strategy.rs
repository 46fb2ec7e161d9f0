use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::{constants::*, errors::*, events::*, state::*};

/// Register a new strategy in the whitelist
///
/// The strategy is identified by its funding account, which must already be
/// a token account of the vault's asset owned by the vault authority PDA,
/// so allocated funds always remain pullable.
#[derive(Accounts)]
pub struct AddStrategy<'info> {
    /// Vault authority - only they can manage the strategy set
    #[account(mut)]
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

    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// The strategy's funding account
    #[account(
        constraint = strategy_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = strategy_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub strategy_token_account: Account<'info, TokenAccount>,
}

pub fn handler(ctx: Context<AddStrategy>, name: String, max_allocation: u64) -> Result<()> {
    let registry = &mut ctx.accounts.strategy_registry;
    let strategy = ctx.accounts.strategy_token_account.key();

    // EFFECTS: zero allocation, Active status
    registry.add(strategy, name.clone(), max_allocation)?;

    emit!(StrategyAdded {
        vault: ctx.accounts.vault_state.key(),
        strategy,
        name,
        max_allocation,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
