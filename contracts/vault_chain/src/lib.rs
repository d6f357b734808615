//! # VaultChain Contract
//!
//! A per-owner, multi-asset savings ledger. Every owner opens one account,
//! registers token assets next to the native asset, and moves funds in and
//! out under two rules per asset:
//!
//! * **goal**: a target balance; the deposit that first reaches it emits
//!   `GoalReached` exactly once.
//! * **limit**: a floor; withdrawals that would leave less than `limit`
//!   behind are refused.
//!
//! | Phase        | Entry Point(s)                                   |
//! |--------------|--------------------------------------------------|
//! | Bootstrap    | [`VaultChain::init`]                             |
//! | Accounts     | [`VaultChain::create_account`], [`VaultChain::add_coin`] |
//! | Funds        | [`VaultChain::deposit`], [`VaultChain::withdraw`] |
//! | Fees         | [`VaultChain::collect_fees`]                     |
//! | Queries      | `get_account_details`, `get_entry`, `has_account`, `get_fee`, `get_native_token`, `get_collected_fees` |
//!
//! ## Architecture
//!
//! Balance rules live on [`AssetEntry`] and [`Account`] in `types`.
//! Storage access is delegated to `storage` and event publication to
//! [`events`]. This file holds the entry points: authorization, validation
//! order and the calls into the token contracts.
//!
//! Each invocation runs as one host transaction, so a failed token transfer
//! discards every write made earlier in the same call.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, log, token, Address, Env};

pub mod events;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;

pub use types::{Account, AssetEntry, AssetId};

/// Ledger failures.
///
/// Codes start at 100 so that errors raised by token contracts during a
/// transfer never decode as one of these.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AmountValueZero       = 100,
    ValueLessThanFee      = 101,
    TokenAddressZero      = 102,
    CoinAlreadyAdded      = 103,
    AccountDoesNotExist   = 104,
    CoinNotAdded          = 105,
    NotEnoughFunds        = 106,
    LimitReached          = 107,
    AccountAlreadyExists  = 108,
    AlreadyInitialized    = 109,
    NotInitialized        = 110,
    InvalidAmount         = 111,
    AmountOverflow        = 112,
}

#[contract]
pub struct VaultChain;

#[contractimpl]
impl VaultChain {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Configure the vault. Must be called exactly once after deployment.
    ///
    /// - `admin` collects creation fees and must sign the transaction.
    /// - `native_token` is the token contract backing [`AssetId::Native`].
    /// - `fee` is the creation fee charged in the native asset.
    pub fn init(env: Env, admin: Address, native_token: Address, fee: i128) -> Result<(), Error> {
        admin.require_auth();

        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        if fee < 0 {
            return Err(Error::InvalidAmount);
        }

        storage::init_config(&env, &admin, &native_token, fee);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Account lifecycle
    // ─────────────────────────────────────────────────────────

    /// Open the caller's account, paying the creation fee in the native asset.
    ///
    /// The whole `payment` is pulled from `owner` and kept as collected fees.
    /// The account starts with a single native entry holding zero funds.
    pub fn create_account(
        env: Env,
        owner: Address,
        goal: i128,
        limit: i128,
        payment: i128,
    ) -> Result<(), Error> {
        owner.require_auth();

        let fee = storage::get_fee(&env)?;
        require_positive(goal, limit)?;
        if payment < fee {
            return Err(Error::ValueLessThanFee);
        }
        if storage::has_account(&env, &owner) {
            return Err(Error::AccountAlreadyExists);
        }

        if payment > 0 {
            let collected = storage::get_collected_fees(&env)
                .checked_add(payment)
                .ok_or(Error::AmountOverflow)?;
            let native = storage::get_native_token(&env)?;
            token::Client::new(&env, &native).transfer(
                &owner,
                &env.current_contract_address(),
                &payment,
            );
            storage::set_collected_fees(&env, collected);
        }

        let account = Account::open(&env, owner.clone(), goal, limit);
        storage::save_account(&env, &account);

        events::emit_account_created(&env, owner);
        Ok(())
    }

    /// Register a token asset on the caller's account.
    ///
    /// The native asset contract and the vault's own address are refused:
    /// the first is already tracked at index 0, the second can never hold
    /// a balance on the owner's behalf.
    pub fn add_coin(
        env: Env,
        owner: Address,
        token: Address,
        goal: i128,
        limit: i128,
    ) -> Result<(), Error> {
        owner.require_auth();

        let mut account = storage::load_account(&env, &owner)?;
        require_positive(goal, limit)?;

        let native = storage::get_native_token(&env)?;
        if token == native || token == env.current_contract_address() {
            return Err(Error::TokenAddressZero);
        }

        let asset = AssetId::Token(token);
        account.register(AssetEntry::new(asset.clone(), goal, limit))?;
        storage::save_account(&env, &account);

        events::emit_coin_created(&env, owner, asset, goal, limit);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Deposits and withdrawals
    // ─────────────────────────────────────────────────────────

    /// Move `amount` of `asset` from `owner` into the vault.
    ///
    /// Funds are credited only after the token transfer succeeded. Returns the
    /// updated entry.
    pub fn deposit(
        env: Env,
        owner: Address,
        asset: AssetId,
        amount: i128,
    ) -> Result<AssetEntry, Error> {
        owner.require_auth();

        let mut account = storage::load_account(&env, &owner)?;
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        let (index, mut entry) = account.entry(&asset)?;
        let goal_reached_now = entry.credit(amount)?;

        let token_id = token_address(&env, &asset)?;
        token::Client::new(&env, &token_id).transfer(
            &owner,
            &env.current_contract_address(),
            &amount,
        );

        account.replace(index, entry.clone());
        storage::save_account(&env, &account);

        events::emit_deposited_funds(&env, owner.clone(), asset.clone(), amount);
        if goal_reached_now {
            log!(&env, "goal reached", owner, entry.funds);
            events::emit_goal_reached(&env, owner, asset, entry.funds);
        }
        Ok(entry)
    }

    /// Move `amount` of `asset` from the vault back to `owner`.
    ///
    /// Fails with `NotEnoughFunds` on an empty entry and with `LimitReached`
    /// when less than the entry's `limit` would remain. Returns the updated
    /// entry.
    pub fn withdraw(
        env: Env,
        owner: Address,
        asset: AssetId,
        amount: i128,
    ) -> Result<AssetEntry, Error> {
        owner.require_auth();

        let mut account = storage::load_account(&env, &owner)?;
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        let (index, mut entry) = account.entry(&asset)?;
        entry.debit(amount)?;
        let token_id = token_address(&env, &asset)?;

        account.replace(index, entry.clone());
        storage::save_account(&env, &account);

        token::Client::new(&env, &token_id).transfer(
            &env.current_contract_address(),
            &owner,
            &amount,
        );

        events::emit_withdrawed_funds(&env, owner, asset, amount);
        Ok(entry)
    }

    // ─────────────────────────────────────────────────────────
    // Fees
    // ─────────────────────────────────────────────────────────

    /// Send every uncollected creation fee to `to`. Admin only.
    ///
    /// Returns the amount sent; zero when nothing was pending.
    pub fn collect_fees(env: Env, to: Address) -> Result<i128, Error> {
        let admin = storage::get_admin(&env)?;
        admin.require_auth();

        let amount = storage::get_collected_fees(&env);
        if amount == 0 {
            return Ok(0);
        }

        storage::set_collected_fees(&env, 0);
        let native = storage::get_native_token(&env)?;
        token::Client::new(&env, &native).transfer(&env.current_contract_address(), &to, &amount);

        log!(&env, "fees collected", to, amount);
        events::emit_fees_collected(&env, to, amount);
        Ok(amount)
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    /// Full account of `owner`: entries in registration order, native first.
    pub fn get_account_details(env: Env, owner: Address) -> Result<Account, Error> {
        storage::load_account(&env, &owner)
    }

    pub fn get_entry(env: Env, owner: Address, asset: AssetId) -> Result<AssetEntry, Error> {
        let account = storage::load_account(&env, &owner)?;
        let (_, entry) = account.entry(&asset)?;
        Ok(entry)
    }

    pub fn has_account(env: Env, owner: Address) -> bool {
        storage::has_account(&env, &owner)
    }

    pub fn get_fee(env: Env) -> Result<i128, Error> {
        storage::get_fee(&env)
    }

    pub fn get_native_token(env: Env) -> Result<Address, Error> {
        storage::get_native_token(&env)
    }

    pub fn get_collected_fees(env: Env) -> i128 {
        storage::get_collected_fees(&env)
    }
}

fn require_positive(goal: i128, limit: i128) -> Result<(), Error> {
    if goal <= 0 || limit <= 0 {
        return Err(Error::AmountValueZero);
    }
    Ok(())
}

/// Token contract that moves `asset`.
fn token_address(env: &Env, asset: &AssetId) -> Result<Address, Error> {
    match asset {
        AssetId::Native => storage::get_native_token(env),
        AssetId::Token(address) => Ok(address.clone()),
    }
}
