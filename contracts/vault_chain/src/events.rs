//! # Events
//!
//! Every notification is published with a two-element topic
//! `(symbol, address)` and a `#[contracttype]` struct as data, so off-chain
//! consumers can filter by owner without decoding the payload.
//!
//! | Topic       | Data                |
//! |-------------|---------------------|
//! | `created`   | [`AccountCreated`]  |
//! | `coin_add`  | [`CoinCreated`]     |
//! | `deposit`   | [`DepositedFunds`]  |
//! | `goal`      | [`GoalReached`]     |
//! | `withdraw`  | [`WithdrawedFunds`] |
//! | `fees`      | [`FeesCollected`]   |

use soroban_sdk::{contracttype, symbol_short, Address, Env};

use crate::types::AssetId;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountCreated {
    pub owner: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CoinCreated {
    pub owner: Address,
    pub asset: AssetId,
    pub goal: i128,
    pub limit: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositedFunds {
    pub owner: Address,
    pub asset: AssetId,
    pub amount: i128,
}

/// Emitted once per entry, by the deposit that first lifts `funds` to `goal`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GoalReached {
    pub owner: Address,
    pub asset: AssetId,
    pub funds: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawedFunds {
    pub owner: Address,
    pub asset: AssetId,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeesCollected {
    pub to: Address,
    pub amount: i128,
}

pub fn emit_account_created(env: &Env, owner: Address) {
    let topics = (symbol_short!("created"), owner.clone());
    env.events().publish(topics, AccountCreated { owner });
}

pub fn emit_coin_created(env: &Env, owner: Address, asset: AssetId, goal: i128, limit: i128) {
    let topics = (symbol_short!("coin_add"), owner.clone());
    env.events().publish(
        topics,
        CoinCreated {
            owner,
            asset,
            goal,
            limit,
        },
    );
}

pub fn emit_deposited_funds(env: &Env, owner: Address, asset: AssetId, amount: i128) {
    let topics = (symbol_short!("deposit"), owner.clone());
    env.events().publish(
        topics,
        DepositedFunds {
            owner,
            asset,
            amount,
        },
    );
}

pub fn emit_goal_reached(env: &Env, owner: Address, asset: AssetId, funds: i128) {
    let topics = (symbol_short!("goal"), owner.clone());
    env.events().publish(
        topics,
        GoalReached {
            owner,
            asset,
            funds,
        },
    );
}

pub fn emit_withdrawed_funds(env: &Env, owner: Address, asset: AssetId, amount: i128) {
    let topics = (symbol_short!("withdraw"), owner.clone());
    env.events().publish(
        topics,
        WithdrawedFunds {
            owner,
            asset,
            amount,
        },
    );
}

pub fn emit_fees_collected(env: &Env, to: Address, amount: i128) {
    let topics = (symbol_short!("fees"), to.clone());
    env.events().publish(topics, FeesCollected { to, amount });
}
