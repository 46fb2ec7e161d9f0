use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount};

use crate::{constants::*, errors::*, events::*, state::*};

/// Settle the closed epoch at an oracle-supplied share price
///
/// The vault's live token balance must cover this epoch's payout plus every
/// still-unclaimed earlier epoch, and the bookkept idle balance must cover
/// the payout so allocated funds are never silently earmarked. The queued
/// shares burn out of escrow; the assets move into the unclaimed pool.
#[derive(Accounts)]
pub struct ProcessEpoch<'info> {
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
        seeds = [WITHDRAWAL_QUEUE_SEED, vault_state.key().as_ref()],
        bump = withdrawal_queue.bump,
    )]
    pub withdrawal_queue: Account<'info, WithdrawalQueue>,

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

    /// Escrow holding the queued shares to burn
    #[account(
        mut,
        constraint = vault_share_account.mint == vault_state.share_mint @ VaultError::InvalidMint,
        constraint = vault_share_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_share_account: Account<'info, TokenAccount>,

    #[account(
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<ProcessEpoch>, share_price: u64) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;
    let queue = &mut ctx.accounts.withdrawal_queue;

    // EFFECTS: ordering + solvency checks live in the queue; the vault
    // ledger releases the earmarked assets and the burned supply
    let settlement = queue.process_epoch(share_price, ctx.accounts.vault_token_account.amount)?;
    if settlement.shares_burned > 0 || settlement.assets_earmarked > 0 {
        vault_state.record_epoch_settlement(settlement.assets_earmarked, settlement.shares_burned)?;
    }

    // INTERACTIONS: burn the escrowed shares
    if settlement.shares_burned > 0 {
        let asset_mint_key = vault_state.asset_mint;
        let authority_bump = vault_state.authority_bump;
        let authority_seeds: &[&[u8]] = &[
            VAULT_AUTHORITY_SEED,
            asset_mint_key.as_ref(),
            &[authority_bump],
        ];
        let signer_seeds = &[&authority_seeds[..]];

        let burn_ctx = CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.share_mint.to_account_info(),
                from: ctx.accounts.vault_share_account.to_account_info(),
                authority: ctx.accounts.vault_authority.to_account_info(),
            },
            signer_seeds,
        );
        token::burn(burn_ctx, settlement.shares_burned)?;
    }

    emit!(EpochProcessed {
        vault: ctx.accounts.vault_state.key(),
        epoch_id: settlement.epoch_id,
        share_price,
        shares_burned: settlement.shares_burned,
        assets_earmarked: settlement.assets_earmarked,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
