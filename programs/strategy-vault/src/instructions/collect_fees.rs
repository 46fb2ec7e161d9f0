use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount};

use crate::{constants::*, errors::*, events::*, state::*};

/// Mint accrued fee shares out to the fee recipients
///
/// Fees accrue as virtual shares inside `total_shares` at every settlement;
/// this permissionless instruction catches the SPL mint supply up.
#[derive(Accounts)]
pub struct CollectFees<'info> {
    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

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

    /// Share account of the management-fee recipient
    #[account(
        mut,
        constraint = management_fee_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
    )]
    pub management_fee_share_account: Account<'info, TokenAccount>,

    /// Share account of the performance-fee recipient
    #[account(
        mut,
        constraint = performance_fee_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
    )]
    pub performance_fee_share_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<CollectFees>) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;

    // EFFECTS: drain the pending counters before any CPI
    let (management_shares, performance_shares) = vault_state.collect_pending_fees();

    let asset_mint_key = vault_state.asset_mint;
    let authority_bump = vault_state.authority_bump;
    let authority_seeds: &[&[u8]] = &[
        VAULT_AUTHORITY_SEED,
        asset_mint_key.as_ref(),
        &[authority_bump],
    ];
    let signer_seeds = &[&authority_seeds[..]];

    // INTERACTIONS: mint to each recipient that has something pending
    if management_shares > 0 {
        require_keys_eq!(
            ctx.accounts.management_fee_share_account.owner,
            ctx.accounts.vault_state.management_fee_recipient,
            VaultError::InvalidOwner
        );
        let mint_ctx = CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            MintTo {
                mint: ctx.accounts.share_mint.to_account_info(),
                to: ctx.accounts.management_fee_share_account.to_account_info(),
                authority: ctx.accounts.vault_authority.to_account_info(),
            },
            signer_seeds,
        );
        token::mint_to(mint_ctx, management_shares)?;
    }

    if performance_shares > 0 {
        require_keys_eq!(
            ctx.accounts.performance_fee_share_account.owner,
            ctx.accounts.vault_state.performance_fee_recipient,
            VaultError::InvalidOwner
        );
        let mint_ctx = CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            MintTo {
                mint: ctx.accounts.share_mint.to_account_info(),
                to: ctx.accounts.performance_fee_share_account.to_account_info(),
                authority: ctx.accounts.vault_authority.to_account_info(),
            },
            signer_seeds,
        );
        token::mint_to(mint_ctx, performance_shares)?;
    }

    emit!(FeesCollected {
        vault: ctx.accounts.vault_state.key(),
        management_fee_shares: management_shares,
        performance_fee_shares: performance_shares,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
