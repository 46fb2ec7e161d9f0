use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Push the caller's active-epoch request forward by exactly one epoch
///
/// The shares stay in escrow; only the bucket changes. The target bucket
/// goes live when the current epoch closes, so the caller skips exactly one
/// processing round.
#[derive(Accounts)]
pub struct MoveRequest<'info> {
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
}

pub fn handler(ctx: Context<MoveRequest>) -> Result<()> {
    let queue = &mut ctx.accounts.withdrawal_queue;
    let (from_epoch, to_epoch, shares) =
        queue.move_request_to_next_epoch(&ctx.accounts.user.key())?;

    emit!(RequestMoved {
        vault: ctx.accounts.vault_state.key(),
        user: ctx.accounts.user.key(),
        from_epoch,
        to_epoch,
        shares,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
