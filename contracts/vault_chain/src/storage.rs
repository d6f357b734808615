//! # Storage
//!
//! Typed helpers over the two Soroban storage tiers used by VaultChain.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key             | Type      | Description                              |
//! |-----------------|-----------|------------------------------------------|
//! | `Admin`         | `Address` | May collect creation fees                |
//! | `NativeToken`   | `Address` | Token contract backing `AssetId::Native` |
//! | `Fee`           | `i128`    | Account creation fee                     |
//! | `CollectedFees` | `i128`    | Creation fees held and not yet collected |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key              | Type      | Description             |
//! |------------------|-----------|-------------------------|
//! | `Account(owner)` | `Account` | One savings account     |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, Address, Env};

use crate::types::Account;
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Fee collector (Instance).
    Admin,
    /// Native asset token contract (Instance).
    NativeToken,
    /// Account creation fee (Instance).
    Fee,
    /// Uncollected creation fees (Instance).
    CollectedFees,
    /// Savings account keyed by owner (Persistent).
    Account(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

/// Write the one-time configuration.
pub fn init_config(env: &Env, admin: &Address, native_token: &Address, fee: i128) {
    let store = env.storage().instance();
    store.set(&DataKey::Admin, admin);
    store.set(&DataKey::NativeToken, native_token);
    store.set(&DataKey::Fee, &fee);
    store.set(&DataKey::CollectedFees, &0i128);
    bump_instance(env);
}

pub fn get_admin(env: &Env) -> Result<Address, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)
}

pub fn get_native_token(env: &Env) -> Result<Address, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::NativeToken)
        .ok_or(Error::NotInitialized)
}

pub fn get_fee(env: &Env) -> Result<i128, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Fee)
        .ok_or(Error::NotInitialized)
}

pub fn get_collected_fees(env: &Env) -> i128 {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::CollectedFees)
        .unwrap_or(0)
}

pub fn set_collected_fees(env: &Env, amount: i128) {
    env.storage()
        .instance()
        .set(&DataKey::CollectedFees, &amount);
    bump_instance(env);
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

pub fn has_account(env: &Env, owner: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Account(owner.clone()))
}

/// Load the account for `owner`.
pub fn load_account(env: &Env, owner: &Address) -> Result<Account, Error> {
    let key = DataKey::Account(owner.clone());
    let account: Account = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::AccountDoesNotExist)?;
    bump_persistent(env, &key);
    Ok(account)
}

pub fn save_account(env: &Env, account: &Account) {
    let key = DataKey::Account(account.owner.clone());
    env.storage().persistent().set(&key, account);
    bump_persistent(env, &key);
}
