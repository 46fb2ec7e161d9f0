use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount, Transfer};

use crate::{constants::*, errors::*, events::*, state::*};

use super::{accrue_yield::settle, load_strategy_token_account};

/// Withdraw an exact amount of assets, burning whatever shares they cost.
///
/// Liquidity is sourced from the idle balance first; any shortfall is pulled
/// from strategies in deallocation order. Remaining accounts must carry the
/// strategy funding accounts the pull plan touches. Insufficient total
/// liquidity aborts the whole operation - there is no partial fulfillment.
#[derive(Accounts)]
pub struct Withdraw<'info> {
    /// Share owner; burns come out of their share account
    #[account(mut)]
    pub user: Signer<'info>,

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
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,

    #[account(
        address = vault_state.asset_mint,
    )]
    pub asset_mint: Account<'info, Mint>,

    #[account(
        mut,
        address = vault_state.share_mint,
    )]
    pub share_mint: Account<'info, Mint>,

    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = user_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
        constraint = user_share_account.owner == user.key() @ VaultError::InvalidOwner,
    )]
    pub user_share_account: Account<'info, TokenAccount>,

    /// Destination for the withdrawn assets; any account of the right mint
    #[account(
        mut,
        constraint = receiver_asset_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
    )]
    pub receiver_asset_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
    assets: u64,
) -> Result<()> {
    // CHECKS
    require!(assets > 0, VaultError::ZeroAmount);

    let now = Clock::get()?.unix_timestamp;
    let vault_state = &mut ctx.accounts.vault_state;
    let registry = &mut ctx.accounts.strategy_registry;

    settle(vault_state, registry, now)?;
    vault_state.check_withdraw_bounds(assets)?;

    // Ceiling rounding: the user burns at least the fair share count
    let shares_owed = vault_state.shares_for_withdraw(assets)?;
    require!(
        ctx.accounts.user_share_account.amount >= shares_owed,
        VaultError::InsufficientShares
    );

    // Idle first; the deallocation order covers any shortfall or the whole
    // operation fails
    let shortfall = assets.saturating_sub(vault_state.idle_assets);
    let plan = if shortfall > 0 {
        registry.withdrawal_plan(shortfall)?
    } else {
        Vec::new()
    };

    // EFFECTS: Update ledgers BEFORE external calls
    for (strategy, pull) in &plan {
        registry.record_deallocation(strategy, *pull)?;
        vault_state.record_allocation_shift(false, *pull)?;
    }
    vault_state.record_withdrawal(assets, shares_owed)?;

    // INTERACTIONS
    let asset_mint_key = vault_state.asset_mint;
    let authority_bump = vault_state.authority_bump;
    let authority_seeds: &[&[u8]] = &[
        VAULT_AUTHORITY_SEED,
        asset_mint_key.as_ref(),
        &[authority_bump],
    ];
    let signer_seeds = &[&authority_seeds[..]];

    // Pull planned liquidity back from strategies
    for (strategy, pull) in &plan {
        let strategy_account = load_strategy_token_account(
            ctx.remaining_accounts,
            strategy,
            &asset_mint_key,
            ctx.accounts.vault_authority.key,
        )?;
        let pull_ctx = CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: strategy_account.to_account_info(),
                to: ctx.accounts.vault_token_account.to_account_info(),
                authority: ctx.accounts.vault_authority.to_account_info(),
            },
            signer_seeds,
        );
        token::transfer(pull_ctx, *pull)?;
    }

    // Burn the owner's shares
    let burn_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        Burn {
            mint: ctx.accounts.share_mint.to_account_info(),
            from: ctx.accounts.user_share_account.to_account_info(),
            authority: ctx.accounts.user.to_account_info(),
        },
    );
    token::burn(burn_ctx, shares_owed)?;

    // Pay out the assets
    let payout_ctx = CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.vault_token_account.to_account_info(),
            to: ctx.accounts.receiver_asset_account.to_account_info(),
            authority: ctx.accounts.vault_authority.to_account_info(),
        },
        signer_seeds,
    );
    token::transfer(payout_ctx, assets)?;

    let vault_state = &ctx.accounts.vault_state;
    emit!(Withdrawn {
        vault: vault_state.key(),
        user: ctx.accounts.user.key(),
        receiver: ctx.accounts.receiver_asset_account.key(),
        asset_amount: assets,
        shares_burned: shares_owed,
        total_assets: vault_state.cached_total_assets,
        total_shares: vault_state.total_shares,
        timestamp: now,
    });

    Ok(())
}
