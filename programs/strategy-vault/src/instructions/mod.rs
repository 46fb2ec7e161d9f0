use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::errors::VaultError;

pub mod accrue_yield;
pub mod add_strategy;
pub mod allocate;
pub mod cancel_request;
pub mod claim_users_batch;
pub mod claim_withdrawal;
pub mod close_epoch;
pub mod collect_fees;
pub mod deposit;
pub mod initialize;
pub mod mint_shares;
pub mod move_request;
pub mod process_epoch;
pub mod redeem;
pub mod remove_strategy;
pub mod report_strategy;
pub mod request_redeem;
pub mod set_deallocation_order;
pub mod toggle_strategy;
pub mod update_fees;
pub mod update_limits;
pub mod upgrade;
pub mod view;
pub mod withdraw;

pub use accrue_yield::*;
pub use add_strategy::*;
pub use allocate::*;
pub use cancel_request::*;
pub use claim_users_batch::*;
pub use claim_withdrawal::*;
pub use close_epoch::*;
pub use collect_fees::*;
pub use deposit::*;
pub use initialize::*;
pub use mint_shares::*;
pub use move_request::*;
pub use process_epoch::*;
pub use redeem::*;
pub use remove_strategy::*;
pub use report_strategy::*;
pub use request_redeem::*;
pub use set_deallocation_order::*;
pub use toggle_strategy::*;
pub use update_fees::*;
pub use update_limits::*;
pub use upgrade::*;
pub use view::*;
pub use withdraw::*;

/// Locate a strategy funding account among the remaining accounts and
/// validate it: correct mint, owned by the vault authority PDA.
///
/// Strategy funding accounts are passed as remaining accounts because both
/// allocation batches and withdrawal sourcing touch a caller-determined
/// subset of strategies.
pub(crate) fn load_strategy_token_account<'info>(
    remaining: &'info [AccountInfo<'info>],
    strategy: &Pubkey,
    asset_mint: &Pubkey,
    vault_authority: &Pubkey,
) -> Result<Account<'info, TokenAccount>> {
    let info = remaining
        .iter()
        .find(|a| a.key == strategy)
        .ok_or(VaultError::MissingStrategyAccount)?;

    let account = Account::<TokenAccount>::try_from(info)?;
    require_keys_eq!(account.mint, *asset_mint, VaultError::InvalidMint);
    require_keys_eq!(account.owner, *vault_authority, VaultError::InvalidOwner);
    Ok(account)
}
