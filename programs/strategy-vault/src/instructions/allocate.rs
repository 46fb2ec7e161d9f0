use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::{constants::*, errors::*, events::*, state::*};

use super::{accrue_yield::settle, load_strategy_token_account};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug)]
pub struct AllocationUpdate {
    /// Strategy funding account the entry targets
    pub strategy: Pubkey,
    /// true pushes idle assets into the strategy; false pulls back
    pub is_deposit: bool,
    pub amount: u64,
}

/// Rebalance vault assets across strategies in one batch
///
/// The ledger records the actual moved amount after clamping to the idle
/// balance, the strategy's own allocation cap, the global allocation
/// ceiling, and (on pulls) the strategy's withdraw capacity - never the
/// requested amount. Remaining accounts carry the strategy funding accounts
/// the batch touches.
#[derive(Accounts)]
pub struct Allocate<'info> {
    /// Vault operator - only they can rebalance
    #[account(mut)]
    pub operator: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = operator @ VaultError::Unauthorized,
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

    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Allocate<'info>>,
    updates: Vec<AllocationUpdate>,
) -> Result<()> {
    require!(!updates.is_empty(), VaultError::ZeroAmount);

    let now = Clock::get()?.unix_timestamp;
    let vault_state = &mut ctx.accounts.vault_state;
    let registry = &mut ctx.accounts.strategy_registry;

    // Price the rebalance off reconciled valuations
    settle(vault_state, registry, now)?;

    let asset_mint_key = vault_state.asset_mint;
    let authority_bump = vault_state.authority_bump;
    let authority_seeds: &[&[u8]] = &[
        VAULT_AUTHORITY_SEED,
        asset_mint_key.as_ref(),
        &[authority_bump],
    ];
    let signer_seeds = &[&authority_seeds[..]];

    let vault_key = vault_state.key();

    for update in &updates {
        require!(update.amount > 0, VaultError::ZeroAmount);

        let strategy_account = load_strategy_token_account(
            ctx.remaining_accounts,
            &update.strategy,
            &asset_mint_key,
            ctx.accounts.vault_authority.key,
        )?;

        let actual = if update.is_deposit {
            let vault_state = &mut ctx.accounts.vault_state;
            let registry = &mut ctx.accounts.strategy_registry;

            // CHECKS: clamp to idle balance and allocation limits
            require!(vault_state.idle_assets > 0, VaultError::InsufficientIdleAssets);
            let actual = registry.clamp_allocation(
                &update.strategy,
                update.amount,
                vault_state.idle_assets,
            )?;
            require!(actual > 0, VaultError::AllocationLimitExceeded);

            // EFFECTS
            registry.record_allocation(&update.strategy, actual)?;
            vault_state.record_allocation_shift(true, actual)?;

            // INTERACTIONS: push idle assets into the strategy
            let push_ctx = CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.vault_token_account.to_account_info(),
                    to: strategy_account.to_account_info(),
                    authority: ctx.accounts.vault_authority.to_account_info(),
                },
                signer_seeds,
            );
            token::transfer(push_ctx, actual)?;
            actual
        } else {
            let vault_state = &mut ctx.accounts.vault_state;
            let registry = &mut ctx.accounts.strategy_registry;

            // CHECKS: clamp to allocation and withdraw capacity
            let actual = registry.clamp_deallocation(&update.strategy, update.amount)?;
            require!(actual > 0, VaultError::InsufficientLiquidity);

            // EFFECTS
            registry.record_deallocation(&update.strategy, actual)?;
            vault_state.record_allocation_shift(false, actual)?;

            // INTERACTIONS: pull assets back into the idle balance
            let pull_ctx = CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: strategy_account.to_account_info(),
                    to: ctx.accounts.vault_token_account.to_account_info(),
                    authority: ctx.accounts.vault_authority.to_account_info(),
                },
                signer_seeds,
            );
            token::transfer(pull_ctx, actual)?;
            actual
        };

        emit!(Allocated {
            vault: vault_key,
            strategy: update.strategy,
            is_deposit: update.is_deposit,
            requested: update.amount,
            actual,
            idle_assets: ctx.accounts.vault_state.idle_assets,
            timestamp: now,
        });
    }

    Ok(())
}
