use anchor_lang::prelude::*;

use crate::constants::{MAX_STRATEGIES, MAX_STRATEGY_ALLOCATION, MAX_STRATEGY_NAME_LEN};
use crate::errors::VaultError;

/// Registry of yield strategies a vault may allocate into
///
/// Architecture: on-chain whitelist with per-strategy bookkeeping
/// - Authority adds/removes/toggles strategies via instructions
/// - Tracks bookkept allocation and oracle-reported live valuation per entry
/// - Holds the deallocation order used to source withdrawal liquidity
#[account]
pub struct StrategyRegistry {
    /// Vault this registry belongs to
    pub vault: Pubkey,

    /// Registered strategies; removal deletes the entry
    pub strategies: Vec<StrategyEntry>,

    /// Withdrawal-sourcing priority; rebuilt wholesale on each update
    pub deallocation_order: Vec<Pubkey>,

    /// Bump seed for PDA
    pub bump: u8,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyStatus {
    /// Eligible for allocation, deallocation, and the deallocation order
    Active,
    /// Excluded from new allocation/deallocation; retains its allocation
    Halted,
}

/// Individual strategy entry
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct StrategyEntry {
    /// Strategy funding account (token account owned by the vault authority)
    pub key: Pubkey,

    /// Human-readable name (e.g., "Marinade", "Kamino")
    pub name: String,

    pub status: StrategyStatus,

    /// Vault's bookkept allocation; never exceeds MAX_STRATEGY_ALLOCATION
    pub allocated: u64,

    /// Last oracle-reported live valuation
    pub reported_value: u64,

    /// Strategy-side cap on total allocation
    pub max_allocation: u64,

    /// Strategy-side cap on what can be pulled back right now
    pub max_withdraw: u64,
}

impl StrategyEntry {
    pub fn is_active(&self) -> bool {
        self.status == StrategyStatus::Active
    }

    /// Liquidity this strategy can contribute to a withdrawal right now
    pub fn withdrawable(&self) -> u64 {
        self.allocated.min(self.max_withdraw)
    }
}

impl StrategyRegistry {
    pub fn entry(&self, key: &Pubkey) -> Option<&StrategyEntry> {
        self.strategies.iter().find(|s| s.key == *key)
    }

    pub fn entry_mut(&mut self, key: &Pubkey) -> Option<&mut StrategyEntry> {
        self.strategies.iter_mut().find(|s| s.key == *key)
    }

    pub fn is_in_deallocation_order(&self, key: &Pubkey) -> bool {
        self.deallocation_order.contains(key)
    }

    /// Register a new strategy with zero allocation and Active status
    pub fn add(&mut self, key: Pubkey, name: String, max_allocation: u64) -> Result<()> {
        require!(name.len() <= MAX_STRATEGY_NAME_LEN, VaultError::NameTooLong);
        require!(self.entry(&key).is_none(), VaultError::StrategyAlreadyExists);
        require!(self.strategies.len() < MAX_STRATEGIES, VaultError::RegistryFull);

        self.strategies.push(StrategyEntry {
            key,
            name,
            status: StrategyStatus::Active,
            allocated: 0,
            reported_value: 0,
            max_allocation: max_allocation.min(MAX_STRATEGY_ALLOCATION),
            max_withdraw: u64::MAX,
        });
        Ok(())
    }

    /// Delete a strategy entry.
    ///
    /// Active strategies must be fully deallocated and absent from the
    /// deallocation order. Halted strategies may be force-removed; their
    /// stranded allocation is returned for write-off against the cache.
    pub fn remove(&mut self, key: &Pubkey) -> Result<u64> {
        let entry = self.entry(key).ok_or(VaultError::StrategyNotFound)?;

        let written_off = match entry.status {
            StrategyStatus::Active => {
                require!(entry.allocated == 0, VaultError::StrategyHasAllocation);
                require!(
                    !self.is_in_deallocation_order(key),
                    VaultError::StrategyInDeallocationOrder
                );
                0
            }
            StrategyStatus::Halted => entry.allocated,
        };

        self.strategies.retain(|s| s.key != *key);
        self.deallocation_order.retain(|k| k != key);
        Ok(written_off)
    }

    /// Flip Active <-> Halted; returns whether the strategy is now active
    pub fn toggle(&mut self, key: &Pubkey) -> Result<bool> {
        let entry = self.entry_mut(key).ok_or(VaultError::StrategyNotFound)?;
        entry.status = match entry.status {
            StrategyStatus::Active => StrategyStatus::Halted,
            StrategyStatus::Halted => StrategyStatus::Active,
        };
        Ok(entry.is_active())
    }

    /// Replace the deallocation order wholesale. Every entry must reference
    /// a currently Active strategy, with no duplicates.
    pub fn set_deallocation_order(&mut self, order: Vec<Pubkey>) -> Result<()> {
        for (i, key) in order.iter().enumerate() {
            let entry = self.entry(key).ok_or(VaultError::StrategyNotFound)?;
            require!(entry.is_active(), VaultError::StrategyNotActive);
            require!(
                !order[..i].contains(key),
                VaultError::StrategyAlreadyExists
            );
        }
        self.deallocation_order = order;
        Ok(())
    }

    /// Record an oracle valuation report
    pub fn report(&mut self, key: &Pubkey, total_value: u64, max_withdraw: u64) -> Result<()> {
        let entry = self.entry_mut(key).ok_or(VaultError::StrategyNotFound)?;
        entry.reported_value = total_value;
        entry.max_withdraw = max_withdraw;
        Ok(())
    }

    /// Sum of live valuations across all registered strategies
    pub fn total_reported_value(&self) -> Result<u64> {
        self.strategies.iter().try_fold(0u64, |acc, s| {
            acc.checked_add(s.reported_value)
                .ok_or_else(|| error!(VaultError::MathOverflow))
        })
    }

    /// Sum of bookkept allocations across all registered strategies
    pub fn total_allocated(&self) -> Result<u64> {
        self.strategies.iter().try_fold(0u64, |acc, s| {
            acc.checked_add(s.allocated)
                .ok_or_else(|| error!(VaultError::MathOverflow))
        })
    }

    /// Realize live valuations into the allocation ledger (yield accrual):
    /// each entry's allocation becomes its reported value, clamped to the
    /// allocation ceiling.
    pub fn realize_valuations(&mut self) {
        for entry in self.strategies.iter_mut() {
            entry.allocated = entry.reported_value.min(MAX_STRATEGY_ALLOCATION);
        }
    }

    /// Liquidity Active strategies would offer after the next accrual
    /// realizes reported valuations; used by side-effect-free view paths.
    pub fn previewed_liquidity(&self) -> Result<u64> {
        self.strategies
            .iter()
            .filter(|s| s.is_active())
            .try_fold(0u64, |acc, s| {
                let withdrawable = s
                    .reported_value
                    .min(MAX_STRATEGY_ALLOCATION)
                    .min(s.max_withdraw);
                acc.checked_add(withdrawable)
                    .ok_or_else(|| error!(VaultError::MathOverflow))
            })
    }

    /// Plan strategy pulls covering `shortfall`, walking the deallocation
    /// order. Halted entries are skipped. Insufficient total liquidity is a
    /// hard failure, not a partial plan.
    pub fn withdrawal_plan(&self, shortfall: u64) -> Result<Vec<(Pubkey, u64)>> {
        let mut remaining = shortfall;
        let mut plan = Vec::new();

        for key in &self.deallocation_order {
            if remaining == 0 {
                break;
            }
            let entry = match self.entry(key) {
                Some(e) if e.is_active() => e,
                _ => continue,
            };
            let pull = remaining.min(entry.withdrawable());
            if pull > 0 {
                plan.push((*key, pull));
                remaining -= pull;
            }
        }

        require!(remaining == 0, VaultError::InsufficientLiquidity);
        Ok(plan)
    }

    /// Clamp a requested push into a strategy to what its limits admit.
    /// Returns the actual amount the ledger will record.
    pub fn clamp_allocation(&self, key: &Pubkey, requested: u64, idle: u64) -> Result<u64> {
        let entry = self.entry(key).ok_or(VaultError::StrategyNotFound)?;
        require!(entry.is_active(), VaultError::StrategyNotActive);

        let ceiling = MAX_STRATEGY_ALLOCATION.min(entry.max_allocation);
        let headroom = ceiling.saturating_sub(entry.allocated);
        Ok(requested.min(idle).min(headroom))
    }

    /// Clamp a requested pull out of a strategy to what its limits admit.
    pub fn clamp_deallocation(&self, key: &Pubkey, requested: u64) -> Result<u64> {
        let entry = self.entry(key).ok_or(VaultError::StrategyNotFound)?;
        require!(entry.is_active(), VaultError::StrategyNotActive);
        Ok(requested.min(entry.withdrawable()))
    }

    /// Record an executed push of `actual` assets into the strategy
    pub fn record_allocation(&mut self, key: &Pubkey, actual: u64) -> Result<()> {
        let entry = self.entry_mut(key).ok_or(VaultError::StrategyNotFound)?;
        let allocated = entry
            .allocated
            .checked_add(actual)
            .ok_or(VaultError::MathOverflow)?;
        require!(
            allocated <= MAX_STRATEGY_ALLOCATION && allocated <= entry.max_allocation,
            VaultError::AllocationLimitExceeded
        );
        entry.allocated = allocated;
        entry.reported_value = entry
            .reported_value
            .checked_add(actual)
            .ok_or(VaultError::MathOverflow)?;
        Ok(())
    }

    /// Record an executed pull of `actual` assets out of the strategy
    pub fn record_deallocation(&mut self, key: &Pubkey, actual: u64) -> Result<()> {
        let entry = self.entry_mut(key).ok_or(VaultError::StrategyNotFound)?;
        entry.allocated = entry
            .allocated
            .checked_sub(actual)
            .ok_or(VaultError::InsufficientAssets)?;
        entry.reported_value = entry.reported_value.saturating_sub(actual);
        entry.max_withdraw = entry.max_withdraw.saturating_sub(actual);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(keys: &[Pubkey]) -> StrategyRegistry {
        let mut registry = StrategyRegistry {
            vault: Pubkey::new_unique(),
            strategies: Vec::new(),
            deallocation_order: Vec::new(),
            bump: 255,
        };
        for key in keys {
            registry.add(*key, "test".to_string(), u64::MAX).unwrap();
        }
        registry
    }

    #[test]
    fn test_add_rejects_duplicates_and_overflow() {
        let key = Pubkey::new_unique();
        let mut registry = registry_with(&[key]);

        let err = registry.add(key, "again".to_string(), u64::MAX).unwrap_err();
        assert_eq!(err, VaultError::StrategyAlreadyExists.into());

        for _ in 0..(MAX_STRATEGIES - 1) {
            registry
                .add(Pubkey::new_unique(), "s".to_string(), u64::MAX)
                .unwrap();
        }
        let err = registry
            .add(Pubkey::new_unique(), "s".to_string(), u64::MAX)
            .unwrap_err();
        assert_eq!(err, VaultError::RegistryFull.into());
    }

    #[test]
    fn test_remove_gating() {
        let key = Pubkey::new_unique();
        let mut registry = registry_with(&[key]);
        registry.set_deallocation_order(vec![key]).unwrap();
        registry.entry_mut(&key).unwrap().allocated = 100;

        // Active with allocation: refused
        let err = registry.remove(&key).unwrap_err();
        assert_eq!(err, VaultError::StrategyHasAllocation.into());

        // Allocation drained, still in the order: refused
        registry.entry_mut(&key).unwrap().allocated = 0;
        let err = registry.remove(&key).unwrap_err();
        assert_eq!(err, VaultError::StrategyInDeallocationOrder.into());

        // Out of the order: removal succeeds
        registry.set_deallocation_order(vec![]).unwrap();
        assert_eq!(registry.remove(&key).unwrap(), 0);
        assert!(registry.entry(&key).is_none());
    }

    #[test]
    fn test_halted_removal_writes_off_allocation() {
        let key = Pubkey::new_unique();
        let mut registry = registry_with(&[key]);
        registry.entry_mut(&key).unwrap().allocated = 250;
        registry.toggle(&key).unwrap();

        assert_eq!(registry.remove(&key).unwrap(), 250);
        assert!(registry.strategies.is_empty());
    }

    #[test]
    fn test_deallocation_order_requires_active_strategies() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let mut registry = registry_with(&[a, b]);

        registry.toggle(&b).unwrap();
        let err = registry.set_deallocation_order(vec![a, b]).unwrap_err();
        assert_eq!(err, VaultError::StrategyNotActive.into());

        let err = registry.set_deallocation_order(vec![a, a]).unwrap_err();
        assert_eq!(err, VaultError::StrategyAlreadyExists.into());

        // Wholesale replacement, not a merge
        registry.set_deallocation_order(vec![a]).unwrap();
        assert_eq!(registry.deallocation_order, vec![a]);
        registry.set_deallocation_order(vec![]).unwrap();
        assert!(registry.deallocation_order.is_empty());
    }

    #[test]
    fn test_withdrawal_plan_walks_order_and_skips_halted() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let c = Pubkey::new_unique();
        let mut registry = registry_with(&[a, b, c]);
        registry.set_deallocation_order(vec![a, b, c]).unwrap();
        registry.entry_mut(&a).unwrap().allocated = 100;
        registry.entry_mut(&b).unwrap().allocated = 100;
        registry.entry_mut(&c).unwrap().allocated = 100;
        registry.toggle(&b).unwrap();

        let plan = registry.withdrawal_plan(150).unwrap();
        assert_eq!(plan, vec![(a, 100), (c, 50)]);

        let err = registry.withdrawal_plan(250).unwrap_err();
        assert_eq!(err, VaultError::InsufficientLiquidity.into());
    }

    #[test]
    fn test_withdrawal_plan_respects_max_withdraw() {
        let a = Pubkey::new_unique();
        let mut registry = registry_with(&[a]);
        registry.set_deallocation_order(vec![a]).unwrap();
        let entry = registry.entry_mut(&a).unwrap();
        entry.allocated = 500;
        entry.max_withdraw = 120;

        assert_eq!(registry.withdrawal_plan(100).unwrap(), vec![(a, 100)]);
        let err = registry.withdrawal_plan(200).unwrap_err();
        assert_eq!(err, VaultError::InsufficientLiquidity.into());
    }

    #[test]
    fn test_allocation_clamping_and_ceiling() {
        let a = Pubkey::new_unique();
        let mut registry = registry_with(&[a]);
        registry.entry_mut(&a).unwrap().max_allocation = 300;

        // Clamped by idle balance
        assert_eq!(registry.clamp_allocation(&a, 500, 200).unwrap(), 200);
        // Clamped by the strategy cap
        assert_eq!(registry.clamp_allocation(&a, 500, 1_000).unwrap(), 300);

        registry.record_allocation(&a, 300).unwrap();
        assert_eq!(registry.clamp_allocation(&a, 500, 1_000).unwrap(), 0);

        // Direct over-cap writes are refused outright
        let err = registry.record_allocation(&a, 1).unwrap_err();
        assert_eq!(err, VaultError::AllocationLimitExceeded.into());
    }

    #[test]
    fn test_global_allocation_ceiling() {
        let a = Pubkey::new_unique();
        let mut registry = registry_with(&[a]);

        let clamped = registry
            .clamp_allocation(&a, u64::MAX, u64::MAX)
            .unwrap();
        assert_eq!(clamped, MAX_STRATEGY_ALLOCATION);
    }

    #[test]
    fn test_realize_valuations_moves_allocations_to_reported() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let mut registry = registry_with(&[a, b]);
        registry.entry_mut(&a).unwrap().allocated = 100;
        registry.entry_mut(&a).unwrap().reported_value = 130;
        registry.entry_mut(&b).unwrap().allocated = 100;
        registry.entry_mut(&b).unwrap().reported_value = 80;

        registry.realize_valuations();
        assert_eq!(registry.entry(&a).unwrap().allocated, 130);
        assert_eq!(registry.entry(&b).unwrap().allocated, 80);
        assert_eq!(registry.total_allocated().unwrap(), 210);
    }

    #[test]
    fn test_halted_strategies_still_count_toward_totals() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let mut registry = registry_with(&[a, b]);
        registry.report(&a, 100, u64::MAX).unwrap();
        registry.report(&b, 60, u64::MAX).unwrap();
        registry.realize_valuations();
        registry.toggle(&b).unwrap();

        assert_eq!(registry.total_allocated().unwrap(), 160);
        // ...but not toward reachable liquidity
        assert_eq!(registry.previewed_liquidity().unwrap(), 100);
    }
}
