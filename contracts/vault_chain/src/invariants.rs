#![allow(dead_code)]

extern crate std;

use crate::types::{Account, AssetEntry, AssetId};

/// INV-1: the native entry exists exactly once and sits at index 0.
pub fn assert_native_first(account: &Account) {
    let first = account
        .entries
        .get(0)
        .expect("INV-1 violated: account has no entries");
    assert_eq!(
        first.asset,
        AssetId::Native,
        "INV-1 violated: entry 0 is {:?}, not the native asset",
        first.asset
    );
    let natives = account
        .entries
        .iter()
        .filter(|e| e.asset == AssetId::Native)
        .count();
    assert_eq!(natives, 1, "INV-1 violated: {} native entries", natives);
}

/// INV-2: asset identifiers are unique within an account.
pub fn assert_unique_assets(account: &Account) {
    let assets: std::vec::Vec<AssetId> = account.entries.iter().map(|e| e.asset).collect();
    for (i, a) in assets.iter().enumerate() {
        for b in assets.iter().skip(i + 1) {
            assert_ne!(a, b, "INV-2 violated: {:?} registered twice", a);
        }
    }
}

/// INV-3: funds are never negative and never below the limit after a
/// successful withdrawal.
pub fn assert_funds_non_negative(entry: &AssetEntry) {
    assert!(
        entry.funds >= 0,
        "INV-3 violated: {:?} has negative funds ({})",
        entry.asset,
        entry.funds
    );
}

pub fn assert_withdrawal_respects_limit(after: &AssetEntry) {
    assert!(
        after.funds >= after.limit,
        "INV-3 violated: {:?} left with {} below limit {}",
        after.asset,
        after.funds,
        after.limit
    );
}

/// INV-4: goal and limit never change once the entry exists.
pub fn assert_rules_unchanged(original: &AssetEntry, current: &AssetEntry) {
    assert_eq!(original.asset, current.asset, "INV-4 violated: asset changed");
    assert_eq!(original.goal, current.goal, "INV-4 violated: goal changed");
    assert_eq!(original.limit, current.limit, "INV-4 violated: limit changed");
}

/// INV-5: `goal_reached` is set whenever funds have met the goal and never
/// reverts once set.
pub fn assert_goal_flag_transition(before: &AssetEntry, after: &AssetEntry) {
    if before.goal_reached {
        assert!(after.goal_reached, "INV-5 violated: goal_reached reverted");
    }
    if after.funds >= after.goal {
        assert!(
            after.goal_reached,
            "INV-5 violated: funds {} >= goal {} but flag unset",
            after.funds,
            after.goal
        );
    }
}

/// Deposit invariant: funds increase by exactly `amount`.
pub fn assert_deposit_invariant(funds_before: i128, funds_after: i128, amount: i128) {
    assert_eq!(
        funds_after,
        funds_before + amount,
        "deposit invariant broken: {} + {} != {}",
        funds_before,
        amount,
        funds_after
    );
}

/// Run every stateless account invariant.
pub fn assert_all_account_invariants(account: &Account) {
    assert_native_first(account);
    assert_unique_assets(account);
    for entry in account.entries.iter() {
        assert_funds_non_negative(&entry);
        assert!(entry.goal > 0, "goal must be positive for {:?}", entry.asset);
        assert!(entry.limit > 0, "limit must be positive for {:?}", entry.asset);
    }
}
