//! # Types
//!
//! Shared data structures of the VaultChain ledger.
//!
//! ## Account layout
//!
//! An [`Account`] is a single persistent ledger entry holding an ordered list
//! of [`AssetEntry`] values:
//!
//! ```text
//! entries[0]  AssetId::Native         created together with the account
//! entries[1]  AssetId::Token(addr_a)  first add_coin
//! entries[2]  AssetId::Token(addr_b)  second add_coin
//! ...
//! ```
//!
//! Asset identifiers are unique within an account. `goal` and `limit` are
//! written once when the entry is created; only `funds` and `goal_reached`
//! change afterwards.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::Error;

/// Identifies the asset an entry tracks.
///
/// `Native` is the reserved handle for the network's native currency. Its
/// token contract is configured at `init`, so it never collides with a
/// registered `Token`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AssetId {
    Native,
    Token(Address),
}

/// Balance and savings rules for one asset inside an account.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssetEntry {
    /// Which asset this entry tracks.
    pub asset: AssetId,
    /// Units currently held in custody for the owner.
    pub funds: i128,
    /// Target balance; its first crossing is announced once.
    pub goal: i128,
    /// Minimum balance a withdrawal must leave behind.
    pub limit: i128,
    /// Set the first time `funds >= goal`. Never cleared.
    pub goal_reached: bool,
}

impl AssetEntry {
    pub fn new(asset: AssetId, goal: i128, limit: i128) -> Self {
        AssetEntry {
            asset,
            funds: 0,
            goal,
            limit,
            goal_reached: false,
        }
    }

    /// Credit `amount` to the entry.
    ///
    /// Returns `true` when this credit is the one that first brings `funds`
    /// up to `goal`.
    pub fn credit(&mut self, amount: i128) -> Result<bool, Error> {
        self.funds = self
            .funds
            .checked_add(amount)
            .ok_or(Error::AmountOverflow)?;

        if !self.goal_reached && self.funds >= self.goal {
            self.goal_reached = true;
            return Ok(true);
        }
        Ok(false)
    }

    /// Debit `amount` from the entry, keeping at least `limit` behind.
    pub fn debit(&mut self, amount: i128) -> Result<(), Error> {
        if self.funds == 0 {
            return Err(Error::NotEnoughFunds);
        }
        // funds and amount are both positive here, so this cannot underflow.
        let remaining = self.funds - amount;
        if remaining < self.limit {
            return Err(Error::LimitReached);
        }
        self.funds = remaining;
        Ok(())
    }
}

/// One owner's savings account.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Account {
    /// Address that created the account; fixed for its lifetime.
    pub owner: Address,
    /// Registered assets in registration order, native first.
    pub entries: Vec<AssetEntry>,
}

impl Account {
    /// Open an account whose only entry is the native asset.
    pub fn open(env: &Env, owner: Address, goal: i128, limit: i128) -> Self {
        let mut entries = Vec::new(env);
        entries.push_back(AssetEntry::new(AssetId::Native, goal, limit));
        Account { owner, entries }
    }

    /// Position of `asset` in `entries`, if registered.
    pub fn position(&self, asset: &AssetId) -> Option<u32> {
        self.entries.iter().position(|e| &e.asset == asset).map(|i| i as u32)
    }

    /// Append a token entry. Rejects assets that are already registered.
    pub fn register(&mut self, entry: AssetEntry) -> Result<(), Error> {
        if self.position(&entry.asset).is_some() {
            return Err(Error::CoinAlreadyAdded);
        }
        self.entries.push_back(entry);
        Ok(())
    }

    /// Look up the entry for `asset` together with its index.
    pub fn entry(&self, asset: &AssetId) -> Result<(u32, AssetEntry), Error> {
        let index = self.position(asset).ok_or(Error::CoinNotAdded)?;
        let entry = self.entries.get(index).ok_or(Error::CoinNotAdded)?;
        Ok((index, entry))
    }

    /// Write back an entry previously obtained from [`Account::entry`].
    pub fn replace(&mut self, index: u32, entry: AssetEntry) {
        self.entries.set(index, entry);
    }
}
