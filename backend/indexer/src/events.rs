//! Canonical event types emitted by the VaultChain contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/vault_chain/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the VaultChain contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// An owner opened an account (`created` topic).
    AccountCreated,
    /// A token asset was registered on an account (`coin_add` topic).
    CoinCreated,
    /// Funds were deposited (`deposit` topic).
    DepositedFunds,
    /// An asset entry reached its goal for the first time (`goal` topic).
    GoalReached,
    /// Funds were withdrawn (`withdraw` topic).
    WithdrawedFunds,
    /// The admin collected creation fees (`fees` topic).
    FeesCollected,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "created" => Self::AccountCreated,
            "coin_add" => Self::CoinCreated,
            "deposit" => Self::DepositedFunds,
            "goal" => Self::GoalReached,
            "withdraw" => Self::WithdrawedFunds,
            "fees" => Self::FeesCollected,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountCreated => "account_created",
            Self::CoinCreated => "coin_created",
            Self::DepositedFunds => "deposited_funds",
            Self::GoalReached => "goal_reached",
            Self::WithdrawedFunds => "withdrawed_funds",
            Self::FeesCollected => "fees_collected",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`EventKind::as_str`].
    pub fn from_stored(s: &str) -> Self {
        match s {
            "account_created" => Self::AccountCreated,
            "coin_created" => Self::CoinCreated,
            "deposited_funds" => Self::DepositedFunds,
            "goal_reached" => Self::GoalReached,
            "withdrawed_funds" => Self::WithdrawedFunds,
            "fees_collected" => Self::FeesCollected,
            _ => Self::Unknown,
        }
    }
}

/// Asset label stored for the native asset.
pub const NATIVE_ASSET: &str = "native";

/// A fully decoded vault event, ready to be stored in the database.
///
/// `owner` holds the account owner, or the fee recipient for
/// `fees_collected`. `amount` holds the deposited/withdrawn amount, the
/// balance for `goal_reached`, the goal for `coin_created` and the fee total
/// for `fees_collected`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultEvent {
    pub event_id: String,
    pub event_type: String,
    pub owner: Option<String>,
    pub asset: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub owner: Option<String>,
    pub asset: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}
