use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::{constants::*, errors::*, events::*, state::*};

/// Queue shares for asynchronous redemption against the active epoch
///
/// The shares move into the vault's own share account and sit in escrow
/// until the epoch is processed (burn) or the request is cancelled.
#[derive(Accounts)]
pub struct RequestRedeem<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [WITHDRAWAL_QUEUE_SEED, vault_state.key().as_ref()],
        bump = withdrawal_queue.bump,
    )]
    pub withdrawal_queue: Account<'info, WithdrawalQueue>,

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

    /// Vault's share escrow for queued requests
    #[account(
        mut,
        constraint = vault_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
        constraint = vault_share_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_share_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<RequestRedeem>, shares: u64) -> Result<()> {
    // CHECKS
    require!(
        ctx.accounts.user_share_account.amount >= shares,
        VaultError::InsufficientShares
    );

    let queue = &mut ctx.accounts.withdrawal_queue;

    // EFFECTS
    let epoch_id = queue.queue_request(ctx.accounts.user.key(), shares)?;

    // INTERACTIONS: move the shares into escrow
    let transfer_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.user_share_account.to_account_info(),
            to: ctx.accounts.vault_share_account.to_account_info(),
            authority: ctx.accounts.user.to_account_info(),
        },
    );
    token::transfer(transfer_ctx, shares)?;

    emit!(RedeemRequested {
        vault: ctx.accounts.vault_state.key(),
        user: ctx.accounts.user.key(),
        epoch_id,
        shares,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
