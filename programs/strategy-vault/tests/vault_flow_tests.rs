//! State-machine tests for the vault accounting core
//!
//! These exercise the pure accounting layer (vault ledger, strategy
//! registry, withdrawal queue) through the same transitions the instruction
//! handlers perform, covering the solvency, conservation, rounding, and
//! epoch-ordering properties the design guarantees.

use anchor_lang::prelude::*;

use strategy_vault::constants::*;
use strategy_vault::errors::VaultError;
use strategy_vault::math::{assets_from_shares, shares_from_assets, Rounding};
use strategy_vault::state::*;

fn new_vault() -> VaultState {
    VaultState {
        authority: Pubkey::new_unique(),
        operator: Pubkey::new_unique(),
        asset_mint: Pubkey::new_unique(),
        share_mint: Pubkey::new_unique(),
        management_fee_recipient: Pubkey::new_unique(),
        performance_fee_recipient: Pubkey::new_unique(),
        total_shares: 0,
        cached_total_assets: 0,
        idle_assets: 0,
        min_deposit_amount: 0,
        max_deposit_amount: u64::MAX,
        min_withdraw_amount: 0,
        max_withdraw_amount: u64::MAX,
        pending_management_fee_shares: 0,
        pending_performance_fee_shares: 0,
        high_water_mark: PRICE_SCALE,
        management_fee_bps: 0,
        performance_fee_bps: 0,
        last_fee_accrual: 0,
        version: 1,
        bump: 254,
        share_bump: 254,
        authority_bump: 254,
        _reserved: [0; 128],
    }
}

fn new_registry() -> StrategyRegistry {
    StrategyRegistry {
        vault: Pubkey::new_unique(),
        strategies: Vec::new(),
        deallocation_order: Vec::new(),
        bump: 254,
    }
}

fn new_queue() -> WithdrawalQueue {
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
        bump: 254,
    }
}

/// One yield/fee settlement, exactly as every pricing entrypoint runs it
fn settle(vault: &mut VaultState, registry: &mut StrategyRegistry, now: i64) {
    let outcome = vault
        .preview_accrual(registry.total_reported_value().unwrap(), now)
        .unwrap();
    vault.apply_accrual(&outcome, now).unwrap();
    registry.realize_valuations();
}

fn deposit(vault: &mut VaultState, registry: &mut StrategyRegistry, assets: u64) -> u64 {
    settle(vault, registry, 0);
    let shares = vault.shares_for_deposit(assets).unwrap();
    vault.record_deposit(assets, shares).unwrap();
    shares
}

/// Redeem with idle-first liquidity sourcing, as the redeem handler does
fn redeem(vault: &mut VaultState, registry: &mut StrategyRegistry, shares: u64) -> u64 {
    settle(vault, registry, 0);
    let assets = vault.assets_for_redeem(shares).unwrap();

    let shortfall = assets.saturating_sub(vault.idle_assets);
    if shortfall > 0 {
        for (strategy, pull) in registry.withdrawal_plan(shortfall).unwrap() {
            registry.record_deallocation(&strategy, pull).unwrap();
            vault.record_allocation_shift(false, pull).unwrap();
        }
    }
    vault.record_withdrawal(assets, shares).unwrap();
    assets
}

fn allocate(vault: &mut VaultState, registry: &mut StrategyRegistry, strategy: &Pubkey, amount: u64) {
    settle(vault, registry, 0);
    let actual = registry
        .clamp_allocation(strategy, amount, vault.idle_assets)
        .unwrap();
    assert_eq!(actual, amount, "test allocations should never clamp");
    registry.record_allocation(strategy, actual).unwrap();
    vault.record_allocation_shift(true, actual).unwrap();
}

fn assert_conservation(vault: &VaultState, registry: &StrategyRegistry) {
    assert_eq!(
        vault.cached_total_assets,
        vault.idle_assets + registry.total_allocated().unwrap(),
        "cached total must equal idle + allocations"
    );
}

fn assert_solvency(vault: &VaultState) {
    let all_out = assets_from_shares(
        vault.total_shares,
        vault.total_shares,
        vault.cached_total_assets,
        Rounding::Floor,
    )
    .unwrap();
    assert!(
        vault.cached_total_assets >= all_out,
        "vault must cover a full redemption of all outstanding shares"
    );
}

// ============================================================
// Standard vault scenarios
// ============================================================

#[test]
fn test_genesis_deposit_mints_one_to_one() {
    let mut vault = new_vault();
    let mut registry = new_registry();

    let shares = deposit(&mut vault, &mut registry, 1000);
    assert_eq!(shares, 1000);
    assert_eq!(vault.total_shares, 1000);
    assert_eq!(vault.cached_total_assets, 1000);
    assert_conservation(&vault, &registry);
    assert_solvency(&vault);
}

#[test]
fn test_withdrawal_drains_idle_before_strategies() {
    let mut vault = new_vault();
    let mut registry = new_registry();
    let strategy = Pubkey::new_unique();
    registry.add(strategy, "prime".to_string(), u64::MAX).unwrap();
    registry.set_deallocation_order(vec![strategy]).unwrap();

    deposit(&mut vault, &mut registry, 1000);
    allocate(&mut vault, &mut registry, &strategy, 300);
    assert_eq!(vault.idle_assets, 700);

    // 350 is covered by idle alone: no strategy deallocation
    settle(&mut vault, &mut registry, 0);
    let shares = vault.shares_for_withdraw(350).unwrap();
    let shortfall = 350u64.saturating_sub(vault.idle_assets);
    assert_eq!(shortfall, 0, "idle must cover this withdrawal");
    vault.record_withdrawal(350, shares).unwrap();

    assert_eq!(vault.idle_assets, 350);
    assert_eq!(registry.entry(&strategy).unwrap().allocated, 300);
    assert_conservation(&vault, &registry);
}

#[test]
fn test_profit_split_pro_rata_on_redeem() {
    let mut vault = new_vault();
    let mut registry = new_registry();
    let strategy = Pubkey::new_unique();
    registry.add(strategy, "prime".to_string(), u64::MAX).unwrap();
    registry.set_deallocation_order(vec![strategy]).unwrap();

    let shares_a = deposit(&mut vault, &mut registry, 1000);
    let shares_b = deposit(&mut vault, &mut registry, 1000);
    assert_eq!((shares_a, shares_b), (1000, 1000));

    allocate(&mut vault, &mut registry, &strategy, 1000);
    // The strategy gained 80
    registry.report(&strategy, 1080, u64::MAX).unwrap();

    let assets = redeem(&mut vault, &mut registry, shares_a);
    assert!(
        (1038..=1040).contains(&assets),
        "a 50% holder of +80 yield should get ~1040, got {assets}"
    );
    assert_conservation(&vault, &registry);
    assert_solvency(&vault);
}

#[test]
fn test_loss_split_pro_rata_on_redeem() {
    let mut vault = new_vault();
    let mut registry = new_registry();
    let strategy = Pubkey::new_unique();
    registry.add(strategy, "prime".to_string(), u64::MAX).unwrap();
    registry.set_deallocation_order(vec![strategy]).unwrap();

    let shares_a = deposit(&mut vault, &mut registry, 1000);
    deposit(&mut vault, &mut registry, 1000);

    allocate(&mut vault, &mut registry, &strategy, 1000);
    // The strategy lost 40
    registry.report(&strategy, 960, u64::MAX).unwrap();

    let assets = redeem(&mut vault, &mut registry, shares_a);
    assert!(
        (978..=980).contains(&assets),
        "a 50% holder of -40 loss should get ~980, got {assets}"
    );
    assert_conservation(&vault, &registry);
    assert_solvency(&vault);
}

#[test]
fn test_round_trip_never_profits_through_rebalancing() {
    let mut vault = new_vault();
    let mut registry = new_registry();
    let strategy = Pubkey::new_unique();
    registry.add(strategy, "prime".to_string(), u64::MAX).unwrap();
    registry.set_deallocation_order(vec![strategy]).unwrap();

    deposit(&mut vault, &mut registry, 5_000);
    let shares = deposit(&mut vault, &mut registry, 777);

    // Rebalance between the deposit and the redemption
    allocate(&mut vault, &mut registry, &strategy, 4_000);

    let back = redeem(&mut vault, &mut registry, shares);
    assert!(back <= 777, "round trip must favor the vault, got {back}");
    assert!(777 - back <= 2, "round trip discrepancy too large: {back}");
    assert_conservation(&vault, &registry);
}

#[test]
fn test_max_redeem_reflects_liquidity_not_balance() {
    let mut vault = new_vault();
    let mut registry = new_registry();
    let strategy = Pubkey::new_unique();
    registry.add(strategy, "locked".to_string(), u64::MAX).unwrap();
    registry.set_deallocation_order(vec![strategy]).unwrap();

    let user_shares = deposit(&mut vault, &mut registry, 1_000);
    allocate(&mut vault, &mut registry, &strategy, 800);
    // The strategy only honors 100 of withdrawals right now
    registry.report(&strategy, 800, 100).unwrap();
    settle(&mut vault, &mut registry, 0);

    let owner_assets = assets_from_shares(
        user_shares,
        vault.total_shares,
        vault.cached_total_assets,
        Rounding::Floor,
    )
    .unwrap();
    let liquidity = vault.idle_assets + registry.previewed_liquidity().unwrap();
    assert_eq!(liquidity, 200 + 100);

    let max_redeem = shares_from_assets(
        owner_assets.min(liquidity),
        vault.total_shares,
        vault.cached_total_assets,
        Rounding::Floor,
    )
    .unwrap();
    assert!(max_redeem < user_shares, "illiquidity must cap redemption");

    // And the cap is accurate: redeeming up to it succeeds...
    let assets = redeem(&mut vault, &mut registry, max_redeem);
    assert!(assets <= 300);
    assert_conservation(&vault, &registry);
}

#[test]
fn test_insufficient_liquidity_is_a_hard_failure() {
    let mut vault = new_vault();
    let mut registry = new_registry();
    let strategy = Pubkey::new_unique();
    registry.add(strategy, "locked".to_string(), u64::MAX).unwrap();
    registry.set_deallocation_order(vec![strategy]).unwrap();

    deposit(&mut vault, &mut registry, 1_000);
    allocate(&mut vault, &mut registry, &strategy, 900);
    registry.report(&strategy, 900, 50).unwrap();
    settle(&mut vault, &mut registry, 0);

    // idle 100 + withdrawable 50 cannot cover 200
    let err = registry.withdrawal_plan(100).unwrap_err();
    assert_eq!(err, VaultError::InsufficientLiquidity.into());
}

#[test]
fn test_management_fee_dilutes_holders_over_time() {
    let mut vault = new_vault();
    let mut registry = new_registry();
    vault.management_fee_bps = 200; // 2% annualized

    deposit(&mut vault, &mut registry, 1_000_000);
    let supply_before = vault.total_shares;

    settle(&mut vault, &mut registry, SECONDS_PER_YEAR as i64);

    assert!(vault.total_shares > supply_before, "fee shares must accrue");
    assert!(vault.pending_management_fee_shares > 0);
    assert_eq!(vault.cached_total_assets, 1_000_000);
    assert_eq!(vault.last_fee_accrual, SECONDS_PER_YEAR as i64);
    assert_solvency(&vault);

    let (management, performance) = vault.collect_pending_fees();
    assert!(management > 0);
    assert_eq!(performance, 0);
    assert_eq!(vault.pending_management_fee_shares, 0);
}

#[test]
fn test_performance_fee_rides_the_high_water_mark() {
    let mut vault = new_vault();
    let mut registry = new_registry();
    let strategy = Pubkey::new_unique();
    registry.add(strategy, "prime".to_string(), u64::MAX).unwrap();
    vault.performance_fee_bps = 1_000; // 10%

    deposit(&mut vault, &mut registry, 1_000_000);
    allocate(&mut vault, &mut registry, &strategy, 1_000_000);

    // +10% yield: the mark rises and a fee accrues
    registry.report(&strategy, 1_100_000, u64::MAX).unwrap();
    settle(&mut vault, &mut registry, 10);
    let mark = vault.high_water_mark;
    assert!(mark > PRICE_SCALE);
    let accrued = vault.pending_performance_fee_shares;
    assert!(accrued > 0);

    // Value drops below the mark and recovers partway: no second charge
    registry.report(&strategy, 1_000_000, u64::MAX).unwrap();
    settle(&mut vault, &mut registry, 20);
    registry.report(&strategy, 1_050_000, u64::MAX).unwrap();
    settle(&mut vault, &mut registry, 30);

    assert_eq!(vault.high_water_mark, mark, "mark never decreases");
    assert_eq!(
        vault.pending_performance_fee_shares, accrued,
        "no fee below the previous high"
    );
}

#[test]
fn test_strategy_removal_gating_end_to_end() {
    let mut vault = new_vault();
    let mut registry = new_registry();
    let strategy = Pubkey::new_unique();
    registry.add(strategy, "prime".to_string(), u64::MAX).unwrap();
    registry.set_deallocation_order(vec![strategy]).unwrap();

    deposit(&mut vault, &mut registry, 1_000);
    allocate(&mut vault, &mut registry, &strategy, 400);

    // Nonzero allocation and present in the order: removal must fail
    let err = registry.remove(&strategy).unwrap_err();
    assert_eq!(err, VaultError::StrategyHasAllocation.into());

    // Deallocate to zero, drop from the order: removal succeeds
    let pull = registry.clamp_deallocation(&strategy, 400).unwrap();
    registry.record_deallocation(&strategy, pull).unwrap();
    vault.record_allocation_shift(false, pull).unwrap();
    let err = registry.remove(&strategy).unwrap_err();
    assert_eq!(err, VaultError::StrategyInDeallocationOrder.into());

    registry.set_deallocation_order(vec![]).unwrap();
    assert_eq!(registry.remove(&strategy).unwrap(), 0);
    assert_conservation(&vault, &registry);
}

#[test]
fn test_halted_removal_realizes_the_loss() {
    let mut vault = new_vault();
    let mut registry = new_registry();
    let strategy = Pubkey::new_unique();
    registry.add(strategy, "rogue".to_string(), u64::MAX).unwrap();

    deposit(&mut vault, &mut registry, 1_000);
    allocate(&mut vault, &mut registry, &strategy, 400);
    registry.toggle(&strategy).unwrap();

    let written_off = registry.remove(&strategy).unwrap();
    assert_eq!(written_off, 400);
    vault.record_write_off(written_off).unwrap();

    assert_eq!(vault.cached_total_assets, 600);
    assert_conservation(&vault, &registry);
    assert_solvency(&vault);
}

// ============================================================
// Async withdrawal queue scenarios
// ============================================================

#[test]
fn test_epoch_lifecycle_with_claim() {
    let mut vault = new_vault();
    let mut registry = new_registry();
    let mut queue = new_queue();
    let user = Pubkey::new_unique();

    let shares = deposit(&mut vault, &mut registry, 1_000);

    // Epoch 1 closes empty (the very first epoch needs no predecessor) and
    // settles as a no-op
    queue.close_epoch().unwrap();
    let settlement = queue.process_epoch(PRICE_SCALE, vault.idle_assets).unwrap();
    assert_eq!(settlement.shares_burned, 0);

    // 100 shares queue into epoch 2
    queue.queue_request(user, 100).unwrap();
    queue.close_epoch().unwrap();
    let settlement = queue.process_epoch(PRICE_SCALE, vault.idle_assets).unwrap();
    assert_eq!(settlement.epoch_id, 2);
    assert_eq!(settlement.shares_burned, 100);
    assert_eq!(settlement.assets_earmarked, 100);
    vault
        .record_epoch_settlement(settlement.assets_earmarked, settlement.shares_burned)
        .unwrap();

    assert_eq!(vault.total_shares, shares - 100);
    assert_eq!(vault.cached_total_assets, 900);
    assert_conservation(&vault, &registry);

    // Claim pays shares * price once, then finds nothing
    assert_eq!(queue.claim(&user, &[2]).unwrap(), 100);
    let err = queue.claim(&user, &[2]).unwrap_err();
    assert_eq!(err, VaultError::NothingToClaim.into());
}

#[test]
fn test_epoch_ordering_is_strict() {
    let mut queue = new_queue();

    queue.close_epoch().unwrap();
    // Epoch 1 is closed-unprocessed: closing epoch 2 violates ordering
    let err = queue.close_epoch().unwrap_err();
    assert_eq!(err, VaultError::EpochOutOfOrder.into());

    queue.process_epoch(PRICE_SCALE, 0).unwrap();
    queue.close_epoch().unwrap();

    // Double-processing is refused
    queue.process_epoch(PRICE_SCALE, 0).unwrap();
    let err = queue.process_epoch(PRICE_SCALE, 0).unwrap_err();
    assert_eq!(err, VaultError::EpochAlreadyProcessed.into());
}

#[test]
fn test_processing_at_depressed_price_keeps_surplus_for_holders() {
    let mut vault = new_vault();
    let mut registry = new_registry();
    let mut queue = new_queue();
    let user = Pubkey::new_unique();

    deposit(&mut vault, &mut registry, 1_000);

    queue.queue_request(user, 200).unwrap();
    queue.close_epoch().unwrap();

    // The oracle settles this epoch at 0.5
    let settlement = queue.process_epoch(PRICE_SCALE / 2, vault.idle_assets).unwrap();
    assert_eq!(settlement.assets_earmarked, 100);
    vault
        .record_epoch_settlement(settlement.assets_earmarked, settlement.shares_burned)
        .unwrap();

    // 200 shares burned for 100 assets: remaining holders got richer
    assert_eq!(vault.total_shares, 800);
    assert_eq!(vault.cached_total_assets, 900);
    assert_solvency(&vault);
    assert_eq!(queue.claim(&user, &[1]).unwrap(), 100);
}

#[test]
fn test_unclaimed_carryover_blocks_insolvent_processing() {
    let mut queue = new_queue();
    let user_a = Pubkey::new_unique();
    let user_b = Pubkey::new_unique();

    queue.queue_request(user_a, 300).unwrap();
    queue.close_epoch().unwrap();
    queue.process_epoch(PRICE_SCALE, 1_000).unwrap();
    assert_eq!(queue.unclaimed_assets, 300);

    // User A has not claimed; epoch 2's payout must fit on top
    queue.queue_request(user_b, 800).unwrap();
    queue.close_epoch().unwrap();
    let err = queue.process_epoch(PRICE_SCALE, 1_000).unwrap_err();
    assert_eq!(err, VaultError::InsufficientLiquidity.into());

    let settlement = queue.process_epoch(PRICE_SCALE, 1_100).unwrap();
    assert_eq!(settlement.assets_earmarked, 800);
    assert_eq!(queue.unclaimed_assets, 1_100);
}

#[test]
fn test_cancel_and_move_interplay() {
    let mut queue = new_queue();
    let user = Pubkey::new_unique();

    queue.queue_request(user, 100).unwrap();
    let (from, to, moved) = queue.move_request_to_next_epoch(&user).unwrap();
    assert_eq!((from, to, moved), (1, 2, 100));

    // The moved request is still cancellable: its bucket is not closed
    assert_eq!(queue.cancel_request(&user, 2).unwrap(), 100);
    let err = queue.cancel_request(&user, 2).unwrap_err();
    assert_eq!(err, VaultError::RequestNotFound.into());

    // Nothing left to move either
    let err = queue.move_request_to_next_epoch(&user).unwrap_err();
    assert_eq!(err, VaultError::RequestNotFound.into());
}

#[test]
fn test_batch_claim_tolerates_empty_users_single_claim_does_not() {
    let mut queue = new_queue();
    let requester = Pubkey::new_unique();
    let bystander = Pubkey::new_unique();

    queue.queue_request(requester, 500).unwrap();
    queue.close_epoch().unwrap();
    queue.process_epoch(PRICE_SCALE, 500).unwrap();

    // Batch path: the bystander is skipped, the requester is paid
    assert_eq!(queue.claim_for_user(&bystander, 1).unwrap(), 0);
    assert_eq!(queue.claim_for_user(&requester, 1).unwrap(), 500);

    // Single-claim path: an empty claim is an error
    let err = queue.claim(&bystander, &[1]).unwrap_err();
    assert_eq!(err, VaultError::NothingToClaim.into());
}
