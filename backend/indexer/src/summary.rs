//! Account summary projection - folds an owner's indexed events into
//! per-asset balances.
//!
//! The projection only sees what the contract announced, so it tracks net
//! movements (`deposited - withdrawn`) rather than querying the chain.

use serde::Serialize;

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, EventRecord, NATIVE_ASSET};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetSummary {
    pub asset: String,
    /// Registration goal, when the `coin_created` event was indexed.
    pub goal: Option<i128>,
    pub deposited: i128,
    pub withdrawn: i128,
    pub balance: i128,
    pub goal_reached: bool,
    pub deposits: u32,
    pub withdrawals: u32,
}

impl AssetSummary {
    fn new(asset: &str) -> Self {
        AssetSummary {
            asset: asset.to_string(),
            goal: None,
            deposited: 0,
            withdrawn: 0,
            balance: 0,
            goal_reached: false,
            deposits: 0,
            withdrawals: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub owner: String,
    pub created_at_ledger: Option<i64>,
    /// Assets in the order they first appeared; native first once the
    /// account creation is indexed.
    pub assets: Vec<AssetSummary>,
}

impl AccountSummary {
    /// Build the summary from events ordered by ledger.
    pub fn from_events(owner: &str, events: &[EventRecord]) -> Result<Self> {
        let mut summary = AccountSummary {
            owner: owner.to_string(),
            created_at_ledger: None,
            assets: Vec::new(),
        };

        for ev in events {
            let kind = EventKind::from_stored(&ev.event_type);
            let asset = ev.asset.as_deref().unwrap_or(NATIVE_ASSET);
            match kind {
                EventKind::AccountCreated => {
                    summary.created_at_ledger = Some(ev.ledger);
                    summary.asset_mut(NATIVE_ASSET);
                }
                EventKind::CoinCreated => {
                    let goal = parse_amount(ev)?;
                    summary.asset_mut(asset).goal = Some(goal);
                }
                EventKind::DepositedFunds => {
                    let amount = parse_amount(ev)?;
                    let entry = summary.asset_mut(asset);
                    let err = || overflow(owner, asset);
                    entry.deposited = entry.deposited.checked_add(amount).ok_or_else(err)?;
                    entry.balance = entry.balance.checked_add(amount).ok_or_else(err)?;
                    entry.deposits = entry.deposits.saturating_add(1);
                }
                EventKind::WithdrawedFunds => {
                    let amount = parse_amount(ev)?;
                    let entry = summary.asset_mut(asset);
                    let err = || overflow(owner, asset);
                    entry.withdrawn = entry.withdrawn.checked_add(amount).ok_or_else(err)?;
                    entry.balance = entry.balance.checked_sub(amount).ok_or_else(err)?;
                    entry.withdrawals = entry.withdrawals.saturating_add(1);
                }
                EventKind::GoalReached => summary.asset_mut(asset).goal_reached = true,
                // Fee collections are addressed to the recipient, not an account.
                EventKind::FeesCollected | EventKind::Unknown => {}
            }
        }

        Ok(summary)
    }

    fn asset_mut(&mut self, asset: &str) -> &mut AssetSummary {
        let index = match self.assets.iter().position(|a| a.asset == asset) {
            Some(index) => index,
            None => {
                self.assets.push(AssetSummary::new(asset));
                self.assets.len() - 1
            }
        };
        &mut self.assets[index]
    }
}

fn overflow(owner: &str, asset: &str) -> IndexerError {
    IndexerError::AmountOverflow {
        owner: owner.to_string(),
        asset: asset.to_string(),
    }
}

fn parse_amount(ev: &EventRecord) -> Result<i128> {
    let raw = ev.amount.as_deref().unwrap_or_default();
    raw.parse().map_err(|_| IndexerError::InvalidAmount {
        event_id: ev.event_id.clone(),
        value: raw.to_string(),
    })
}
