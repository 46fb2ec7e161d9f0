use anchor_lang::prelude::*;

use crate::constants::{MAX_QUEUED_REQUESTS, MAX_TRACKED_EPOCHS, PRICE_SCALE};
use crate::errors::VaultError;
use crate::math::{mul_div, Rounding};

/// Epoch-bucketed asynchronous withdrawal queue
///
/// Redemption requests accumulate against the active epoch; the operator
/// closes it, settles it at an oracle share price, and users claim the
/// resulting assets. At most one epoch is ever closed-but-unprocessed.
#[account]
pub struct WithdrawalQueue {
    /// Vault this queue belongs to
    pub vault: Pubkey,

    /// The latest, request-accepting epoch; starts at 1
    pub active_epoch_id: u64,

    /// Assets earmarked by processed epochs and not yet claimed
    pub unclaimed_assets: u64,

    /// Tracked epochs; fully claimed processed epochs are pruned at close
    pub epochs: Vec<EpochEntry>,

    /// Queued per-user redemption requests; zeroed entries removed on claim
    pub requests: Vec<QueuedRequest>,

    /// Bump seed for PDA
    pub bump: u8,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpochEntry {
    pub id: u64,

    /// Sum of all pending redemption requests in this epoch
    pub total_requested_shares: u64,

    /// Some(price) once processed; Some(0) is a valid settled-at-zero price
    pub price_per_share: Option<u64>,
}

impl EpochEntry {
    pub fn is_processed(&self) -> bool {
        self.price_per_share.is_some()
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueuedRequest {
    pub user: Pubkey,
    pub epoch_id: u64,
    pub shares: u64,
}

/// Result of settling one epoch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpochSettlement {
    pub epoch_id: u64,
    pub shares_burned: u64,
    pub assets_earmarked: u64,
}

impl WithdrawalQueue {
    pub fn epoch(&self, id: u64) -> Option<&EpochEntry> {
        self.epochs.iter().find(|e| e.id == id)
    }

    fn epoch_mut(&mut self, id: u64) -> Option<&mut EpochEntry> {
        self.epochs.iter_mut().find(|e| e.id == id)
    }

    fn ensure_epoch(&mut self, id: u64) -> Result<&mut EpochEntry> {
        if let Some(index) = self.epochs.iter().position(|e| e.id == id) {
            return Ok(&mut self.epochs[index]);
        }
        require!(
            self.epochs.len() < MAX_TRACKED_EPOCHS,
            VaultError::EpochCapacityExceeded
        );
        self.epochs.push(EpochEntry {
            id,
            total_requested_shares: 0,
            price_per_share: None,
        });
        let index = self.epochs.len() - 1;
        Ok(&mut self.epochs[index])
    }

    fn request_index(&self, user: &Pubkey, epoch_id: u64) -> Option<usize> {
        self.requests
            .iter()
            .position(|r| r.user == *user && r.epoch_id == epoch_id)
    }

    pub fn requested_shares(&self, user: &Pubkey, epoch_id: u64) -> u64 {
        self.request_index(user, epoch_id)
            .map(|i| self.requests[i].shares)
            .unwrap_or(0)
    }

    /// An epoch older than the active one that is gone from tracking was
    /// processed and fully claimed before being pruned.
    fn is_settled(&self, epoch_id: u64) -> bool {
        match self.epoch(epoch_id) {
            Some(entry) => entry.is_processed(),
            None => epoch_id < self.active_epoch_id,
        }
    }

    /// Queue `shares` against the active epoch, merging with any existing
    /// request from the same user.
    pub fn queue_request(&mut self, user: Pubkey, shares: u64) -> Result<u64> {
        require!(shares > 0, VaultError::ZeroAmount);
        let epoch_id = self.active_epoch_id;
        self.add_to_epoch(user, epoch_id, shares)?;
        Ok(epoch_id)
    }

    fn add_to_epoch(&mut self, user: Pubkey, epoch_id: u64, shares: u64) -> Result<()> {
        let entry = self.ensure_epoch(epoch_id)?;
        entry.total_requested_shares = entry
            .total_requested_shares
            .checked_add(shares)
            .ok_or(VaultError::MathOverflow)?;

        match self.request_index(&user, epoch_id) {
            Some(i) => {
                self.requests[i].shares = self.requests[i]
                    .shares
                    .checked_add(shares)
                    .ok_or(VaultError::MathOverflow)?;
            }
            None => {
                require!(
                    self.requests.len() < MAX_QUEUED_REQUESTS,
                    VaultError::QueueFull
                );
                self.requests.push(QueuedRequest { user, epoch_id, shares });
            }
        }
        Ok(())
    }

    /// Cancel a queued request. Only valid while the epoch has not been
    /// closed, i.e. it is the active epoch or a future bucket created by
    /// move_request_to_next_epoch. Returns the shares to hand back.
    pub fn cancel_request(&mut self, user: &Pubkey, epoch_id: u64) -> Result<u64> {
        require!(epoch_id >= self.active_epoch_id, VaultError::EpochNotActive);

        let index = self
            .request_index(user, epoch_id)
            .ok_or(VaultError::RequestNotFound)?;
        let shares = self.requests[index].shares;
        self.requests.remove(index);

        let entry = self
            .epoch_mut(epoch_id)
            .ok_or(VaultError::RequestNotFound)?;
        entry.total_requested_shares = entry
            .total_requested_shares
            .checked_sub(shares)
            .ok_or(VaultError::MathOverflow)?;
        Ok(shares)
    }

    /// Shift the user's entire active-epoch request forward by exactly one
    /// epoch; the target bucket goes live at the next close. Returns
    /// (from_epoch, to_epoch, shares).
    pub fn move_request_to_next_epoch(&mut self, user: &Pubkey) -> Result<(u64, u64, u64)> {
        let from = self.active_epoch_id;
        let to = from.checked_add(1).ok_or(VaultError::MathOverflow)?;

        let shares = self.cancel_request(user, from)?;
        self.add_to_epoch(*user, to, shares)?;
        Ok((from, to, shares))
    }

    /// Advance the active epoch pointer. Fails unless the previous epoch is
    /// already processed (or this is the very first epoch) - at most one
    /// epoch may be closed-and-unprocessed at a time. Prunes fully claimed
    /// processed epochs. Returns (closed_epoch, requested_shares, new_active).
    pub fn close_epoch(&mut self) -> Result<(u64, u64, u64)> {
        let closing = self.active_epoch_id;
        if closing > 1 {
            require!(self.is_settled(closing - 1), VaultError::EpochOutOfOrder);
        }

        let requested = self
            .epoch(closing)
            .map(|e| e.total_requested_shares)
            .unwrap_or(0);

        // Keep processed epochs only while claims are outstanding
        let active = self.active_epoch_id;
        let requests = &self.requests;
        self.epochs.retain(|e| {
            !e.is_processed() || e.id >= active || requests.iter().any(|r| r.epoch_id == e.id)
        });

        let new_active = closing.checked_add(1).ok_or(VaultError::MathOverflow)?;
        self.ensure_epoch(new_active)?;
        self.active_epoch_id = new_active;
        Ok((closing, requested, new_active))
    }

    /// Settle the closed epoch at an oracle share price (PRICE_SCALE fixed
    /// point). `available_assets` is the vault's live token balance; it must
    /// cover this epoch plus every still-unclaimed earlier epoch. A
    /// zero-request epoch settles the same way so the carry-over solvency
    /// check is never skipped.
    pub fn process_epoch(&mut self, price: u64, available_assets: u64) -> Result<EpochSettlement> {
        require!(self.active_epoch_id > 1, VaultError::NoEpochToProcess);
        let target = self.active_epoch_id - 1;

        let entry = self
            .epoch(target)
            .ok_or(VaultError::EpochAlreadyProcessed)?;
        require!(!entry.is_processed(), VaultError::EpochAlreadyProcessed);
        if target > 1 {
            require!(self.is_settled(target - 1), VaultError::EpochOutOfOrder);
        }

        let requested = entry.total_requested_shares;
        let needed = mul_div(requested, price, PRICE_SCALE, Rounding::Floor)?;
        let obligations = needed
            .checked_add(self.unclaimed_assets)
            .ok_or(VaultError::MathOverflow)?;
        require!(available_assets >= obligations, VaultError::InsufficientLiquidity);

        let entry = self
            .epoch_mut(target)
            .ok_or(VaultError::EpochAlreadyProcessed)?;
        entry.price_per_share = Some(price);
        self.unclaimed_assets = obligations;

        Ok(EpochSettlement {
            epoch_id: target,
            shares_burned: requested,
            assets_earmarked: needed,
        })
    }

    /// Sum and zero the user's claims across the given processed epochs.
    /// A zero total is an error on this path (single-user clarity); the
    /// batch path tolerates it instead.
    pub fn claim(&mut self, user: &Pubkey, epoch_ids: &[u64]) -> Result<u64> {
        let mut total = 0u64;
        for &epoch_id in epoch_ids {
            total = total
                .checked_add(self.claim_in_epoch(user, epoch_id)?)
                .ok_or(VaultError::MathOverflow)?;
        }
        require!(total > 0, VaultError::NothingToClaim);

        self.unclaimed_assets = self
            .unclaimed_assets
            .checked_sub(total)
            .ok_or(VaultError::InsufficientAssets)?;
        Ok(total)
    }

    /// Batch variant for one user within one epoch: zero-balance users yield
    /// Ok(0) so an administrative sweep can skip them without failing.
    pub fn claim_for_user(&mut self, user: &Pubkey, epoch_id: u64) -> Result<u64> {
        let owed = self.claim_in_epoch(user, epoch_id)?;
        self.unclaimed_assets = self
            .unclaimed_assets
            .checked_sub(owed)
            .ok_or(VaultError::InsufficientAssets)?;
        Ok(owed)
    }

    fn claim_in_epoch(&mut self, user: &Pubkey, epoch_id: u64) -> Result<u64> {
        require!(epoch_id < self.active_epoch_id, VaultError::EpochNotProcessed);

        let price = match self.epoch(epoch_id) {
            Some(entry) => entry
                .price_per_share
                .ok_or(VaultError::EpochNotProcessed)?,
            // Pruned: processed and fully claimed, nothing left for anyone
            None => return Ok(0),
        };

        let Some(index) = self.request_index(user, epoch_id) else {
            return Ok(0);
        };
        let shares = self.requests[index].shares;
        self.requests.remove(index);

        mul_div(shares, price, PRICE_SCALE, Rounding::Floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_queue() -> WithdrawalQueue {
        WithdrawalQueue {
            vault: Pubkey::new_unique(),
            active_epoch_id: 1,
            unclaimed_assets: 0,
            epochs: vec![EpochEntry {
                id: 1,
                total_requested_shares: 0,
                price_per_share: None,
            }],
            requests: Vec::new(),
            bump: 255,
        }
    }

    #[test]
    fn test_requests_merge_per_user_per_epoch() {
        let mut queue = fresh_queue();
        let user = Pubkey::new_unique();

        queue.queue_request(user, 100).unwrap();
        queue.queue_request(user, 50).unwrap();
        assert_eq!(queue.requested_shares(&user, 1), 150);
        assert_eq!(queue.epoch(1).unwrap().total_requested_shares, 150);
        assert_eq!(queue.requests.len(), 1);
    }

    #[test]
    fn test_cancel_only_before_close() {
        let mut queue = fresh_queue();
        let user = Pubkey::new_unique();
        queue.queue_request(user, 100).unwrap();

        queue.close_epoch().unwrap();
        let err = queue.cancel_request(&user, 1).unwrap_err();
        assert_eq!(err, VaultError::EpochNotActive.into());

        queue.queue_request(user, 40).unwrap();
        assert_eq!(queue.cancel_request(&user, 2).unwrap(), 40);
        assert_eq!(queue.epoch(2).unwrap().total_requested_shares, 0);
    }

    #[test]
    fn test_first_close_needs_no_prior_epoch() {
        let mut queue = fresh_queue();
        let (closed, requested, active) = queue.close_epoch().unwrap();
        assert_eq!((closed, requested, active), (1, 0, 2));
    }

    #[test]
    fn test_close_blocks_while_previous_unprocessed() {
        let mut queue = fresh_queue();
        queue.close_epoch().unwrap();

        // Epoch 1 is closed but unprocessed: cannot close epoch 2
        let err = queue.close_epoch().unwrap_err();
        assert_eq!(err, VaultError::EpochOutOfOrder.into());

        queue.process_epoch(PRICE_SCALE, 0).unwrap();
        queue.close_epoch().unwrap();
        assert_eq!(queue.active_epoch_id, 3);
    }

    #[test]
    fn test_process_requires_closed_epoch_and_no_double_process() {
        let mut queue = fresh_queue();
        let err = queue.process_epoch(PRICE_SCALE, 0).unwrap_err();
        assert_eq!(err, VaultError::NoEpochToProcess.into());

        queue.close_epoch().unwrap();
        queue.process_epoch(PRICE_SCALE, 0).unwrap();
        let err = queue.process_epoch(PRICE_SCALE, 0).unwrap_err();
        assert_eq!(err, VaultError::EpochAlreadyProcessed.into());
    }

    #[test]
    fn test_process_checks_carryover_solvency() {
        let mut queue = fresh_queue();
        let user = Pubkey::new_unique();
        queue.queue_request(user, 100).unwrap();
        queue.close_epoch().unwrap();

        // 100 shares at 2.0 need 200 assets
        let err = queue.process_epoch(2 * PRICE_SCALE, 199).unwrap_err();
        assert_eq!(err, VaultError::InsufficientLiquidity.into());

        let settlement = queue.process_epoch(2 * PRICE_SCALE, 200).unwrap();
        assert_eq!(settlement.shares_burned, 100);
        assert_eq!(settlement.assets_earmarked, 200);
        assert_eq!(queue.unclaimed_assets, 200);

        // The next, empty epoch still has to cover the unclaimed 200
        queue.close_epoch().unwrap();
        let err = queue.process_epoch(PRICE_SCALE, 199).unwrap_err();
        assert_eq!(err, VaultError::InsufficientLiquidity.into());
        let settlement = queue.process_epoch(PRICE_SCALE, 200).unwrap();
        assert_eq!(settlement.shares_burned, 0);
        assert_eq!(settlement.assets_earmarked, 0);
    }

    #[test]
    fn test_claim_pays_at_epoch_price_and_only_once() {
        let mut queue = fresh_queue();
        let user = Pubkey::new_unique();
        queue.queue_request(user, 100).unwrap();
        queue.close_epoch().unwrap();
        queue.process_epoch(3 * PRICE_SCALE / 2, 1_000).unwrap();

        assert_eq!(queue.claim(&user, &[1]).unwrap(), 150);
        assert_eq!(queue.unclaimed_assets, 0);

        // Second claim finds nothing
        let err = queue.claim(&user, &[1]).unwrap_err();
        assert_eq!(err, VaultError::NothingToClaim.into());
    }

    #[test]
    fn test_claim_rejects_unprocessed_epochs() {
        let mut queue = fresh_queue();
        let user = Pubkey::new_unique();
        queue.queue_request(user, 100).unwrap();

        let err = queue.claim(&user, &[1]).unwrap_err();
        assert_eq!(err, VaultError::EpochNotProcessed.into());

        queue.close_epoch().unwrap();
        let err = queue.claim(&user, &[1]).unwrap_err();
        assert_eq!(err, VaultError::EpochNotProcessed.into());
    }

    #[test]
    fn test_claim_sums_across_epochs() {
        let mut queue = fresh_queue();
        let user = Pubkey::new_unique();

        queue.queue_request(user, 100).unwrap();
        queue.close_epoch().unwrap();
        queue.process_epoch(PRICE_SCALE, 100).unwrap();

        queue.queue_request(user, 60).unwrap();
        queue.close_epoch().unwrap();
        queue.process_epoch(2 * PRICE_SCALE, 1_000).unwrap();

        assert_eq!(queue.claim(&user, &[1, 2]).unwrap(), 100 + 120);
        assert_eq!(queue.unclaimed_assets, 0);
    }

    #[test]
    fn test_batch_claim_skips_zero_balance_users() {
        let mut queue = fresh_queue();
        let requester = Pubkey::new_unique();
        let stranger = Pubkey::new_unique();

        queue.queue_request(requester, 100).unwrap();
        queue.close_epoch().unwrap();
        queue.process_epoch(PRICE_SCALE, 100).unwrap();

        assert_eq!(queue.claim_for_user(&stranger, 1).unwrap(), 0);
        assert_eq!(queue.claim_for_user(&requester, 1).unwrap(), 100);
        assert_eq!(queue.claim_for_user(&requester, 1).unwrap(), 0);
    }

    #[test]
    fn test_move_request_skips_one_processing_round() {
        let mut queue = fresh_queue();
        let user = Pubkey::new_unique();
        queue.queue_request(user, 100).unwrap();

        let (from, to, shares) = queue.move_request_to_next_epoch(&user).unwrap();
        assert_eq!((from, to, shares), (1, 2, 100));
        assert_eq!(queue.epoch(1).unwrap().total_requested_shares, 0);
        assert_eq!(queue.epoch(2).unwrap().total_requested_shares, 100);

        // Epoch 1 settles empty; the moved request rides epoch 2
        queue.close_epoch().unwrap();
        queue.process_epoch(PRICE_SCALE, 0).unwrap();
        queue.close_epoch().unwrap();
        queue.process_epoch(PRICE_SCALE, 100).unwrap();
        assert_eq!(queue.claim(&user, &[2]).unwrap(), 100);
    }

    #[test]
    fn test_claimed_epochs_are_pruned_at_close() {
        let mut queue = fresh_queue();
        let user = Pubkey::new_unique();
        queue.queue_request(user, 10).unwrap();
        queue.close_epoch().unwrap();
        queue.process_epoch(PRICE_SCALE, 10).unwrap();
        queue.claim(&user, &[1]).unwrap();

        queue.close_epoch().unwrap();
        assert!(queue.epoch(1).is_none());
        // Pruned epochs still count as settled for ordering purposes
        assert!(queue.is_settled(1));
    }

    #[test]
    fn test_settled_at_zero_price_is_still_processed() {
        let mut queue = fresh_queue();
        let user = Pubkey::new_unique();
        queue.queue_request(user, 100).unwrap();
        queue.close_epoch().unwrap();
        queue.process_epoch(0, 0).unwrap();

        assert!(queue.epoch(1).unwrap().is_processed());
        // Settled at zero: shares burn for nothing, claim finds nothing
        let err = queue.claim(&user, &[1]).unwrap_err();
        assert_eq!(err, VaultError::NothingToClaim.into());
    }
}
