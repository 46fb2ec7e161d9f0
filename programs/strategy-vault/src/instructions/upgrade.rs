use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, events::*, state::*};

/// Move the vault to a new schema/logic version
///
/// The factory invokes this after swapping program logic. Versions advance
/// one step at a time; re-running with the same target fails the gate, so
/// migrations are idempotency-protected.
#[derive(Accounts)]
pub struct Upgrade<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref()],
        bump = vault_state.bump,
        has_one = authority @ VaultError::Unauthorized,
    )]
    pub vault_state: Account<'info, VaultState>,
}

pub fn handler(ctx: Context<Upgrade>, target_version: u16) -> Result<()> {
    let vault_state = &mut ctx.accounts.vault_state;

    // CHECKS: only the immediate successor version is a legal migration
    require!(
        target_version == vault_state.version + 1,
        VaultError::InvalidVersion
    );

    let from_version = vault_state.version;

    // EFFECTS: per-version state migrations run here before the version
    // advances; v1 state needs no transformation.
    vault_state.version = target_version;

    emit!(VaultUpgraded {
        vault: vault_state.key(),
        from_version,
        to_version: target_version,
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
