use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::{constants::*, errors::*, events::*, state::*};

/// Administrative batch claim for one processed epoch across many users
///
/// Zero-balance users are skipped rather than failing the whole batch - the
/// operator-facing counterpart of the strict single-user claim path.
/// Remaining accounts carry one asset token account per paid user.
#[derive(Accounts)]
pub struct ClaimUsersBatch<'info> {
    pub operator: Signer<'info>,

    #[account(
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

/// Find a user's asset token account among the remaining accounts
fn find_user_asset_account<'info>(
    remaining: &'info [AccountInfo<'info>],
    user: &Pubkey,
    asset_mint: &Pubkey,
) -> Result<Account<'info, TokenAccount>> {
    for info in remaining {
        if let Ok(account) = Account::<TokenAccount>::try_from(info) {
            if account.owner == *user && account.mint == *asset_mint {
                return Ok(account);
            }
        }
    }
    err!(VaultError::MissingClaimAccount)
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, ClaimUsersBatch<'info>>,
    epoch_id: u64,
    users: Vec<Pubkey>,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let asset_mint_key = ctx.accounts.vault_state.asset_mint;
    let authority_bump = ctx.accounts.vault_state.authority_bump;
    let authority_seeds: &[&[u8]] = &[
        VAULT_AUTHORITY_SEED,
        asset_mint_key.as_ref(),
        &[authority_bump],
    ];
    let signer_seeds = &[&authority_seeds[..]];

    let vault_key = ctx.accounts.vault_state.key();

    for user in &users {
        // EFFECTS: zero-balance users come back as 0 and are skipped
        let owed = ctx
            .accounts
            .withdrawal_queue
            .claim_for_user(user, epoch_id)?;
        if owed == 0 {
            continue;
        }

        // INTERACTIONS
        let user_account = find_user_asset_account(ctx.remaining_accounts, user, &asset_mint_key)?;
        let transfer_ctx = CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.vault_token_account.to_account_info(),
                to: user_account.to_account_info(),
                authority: ctx.accounts.vault_authority.to_account_info(),
            },
            signer_seeds,
        );
        token::transfer(transfer_ctx, owed)?;

        emit!(BatchWithdrawalClaimed {
            vault: vault_key,
            user: *user,
            epoch_id,
            assets: owed,
            timestamp: now,
        });
    }

    Ok(())
}
