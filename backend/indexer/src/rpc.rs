//! Soroban RPC client — polls `getEvents` and decodes VaultChain events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.
//! * Only JSON-RPC codes -32600 / -32601 abort the poll.
//!
//! ## Decoding
//!
//! `getEvents` returns topics and data as base64 `ScVal` XDR. They are
//! decoded with `stellar-xdr` and flattened into JSON before the vault
//! fields are read.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use stellar_xdr::curr::{Limits, ReadXdr, ScVal};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, VaultEvent, NATIVE_ASSET};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    fn is_hard(&self) -> bool {
        self.code == -32600 || self.code == -32601
    }
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    /// Topic list, each entry a base64 `ScVal` XDR string
    pub topic: Vec<String>,
    /// Event data, a base64 `ScVal` XDR string
    pub value: String,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
}

/// Doubling delay between retries, capped at [`MAX_BACKOFF_SECS`].
struct Backoff {
    secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Backoff {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    async fn wait(&mut self) {
        tokio::time::sleep(Duration::from_secs(self.secs)).await;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
    }
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// One page of `getEvents` output.
#[derive(Debug)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

/// Fetch a page of events from the RPC.
///
/// * `start_ledger` — the ledger sequence to scan from (inclusive).
/// * `cursor`       — optional opaque pagination cursor from a previous response.
/// * `limit`        — maximum number of events to return.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventPage> {
    let mut backoff = Backoff::new();
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });

    loop {
        let resp = match client.post(rpc_url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed (will retry in {}s): {e}", backoff.secs);
                backoff.wait().await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC (will retry in {}s)", backoff.secs);
            backoff.wait().await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;

        if let Some(err) = body.error {
            if err.is_hard() {
                return Err(IndexerError::EventParse(format!(
                    "RPC hard error {}: {}",
                    err.code, err.message
                )));
            }
            warn!(
                "RPC soft error (will retry in {}s): {} {}",
                backoff.secs, err.code, err.message
            );
            backoff.wait().await;
            continue;
        }

        let result = body.result.ok_or_else(|| {
            IndexerError::EventParse("Empty result from getEvents".to_string())
        })?;

        debug!(
            "Fetched {} events (latest_ledger={:?})",
            result.events.len(),
            result.latest_ledger
        );

        return Ok(EventPage {
            events: result.events,
            cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`VaultEvent`] structs.
///
/// Events from failed contract calls are dropped: the host rolled their
/// effects back. Events whose XDR cannot be decoded are logged and skipped.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<VaultEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call != Some(false))
        .filter_map(|e| match decode_single(e, contract_id) {
            Ok(ev) => ev,
            Err(err) => {
                warn!("Skipping undecodable event {:?}: {err}", e.id);
                None
            }
        })
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Result<Option<VaultEvent>> {
    let Some(first_topic) = raw.topic.first() else {
        return Ok(None);
    };
    let kind = match decode_scval(first_topic)? {
        Value::String(symbol) => EventKind::from_topic(&symbol),
        _ => EventKind::Unknown,
    };

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let data = decode_scval(&raw.value)?;

    // topic[1] is the owner (or the fee recipient).
    let owner = match raw.topic.get(1) {
        Some(topic) => decode_scval(topic)?.as_str().map(String::from),
        None => None,
    }
    .or_else(|| extract_field(&data, &["owner", "to"]));

    let (asset, amount) = decode_data(&data, kind);

    let event_id = raw.id.clone().unwrap_or_else(|| {
        format!(
            "{}:{}:{}:{}:{}",
            ledger,
            raw.tx_hash.as_deref().unwrap_or("-"),
            kind.as_str(),
            owner.as_deref().unwrap_or("-"),
            amount.as_deref().unwrap_or("-"),
        )
    });

    Ok(Some(VaultEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        owner,
        asset,
        amount,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    }))
}

/// Decode a base64 `ScVal` and flatten it into plain JSON.
fn decode_scval(raw: &str) -> Result<Value> {
    let val = ScVal::from_xdr_base64(raw, Limits::none())?;
    Ok(scval_to_json(&val))
}

/// Symbols, strings and addresses become JSON strings, 64/128-bit integers
/// become decimal strings, vectors become arrays and maps with symbol keys
/// become objects. Anything else the vault never emits maps to `null`.
fn scval_to_json(val: &ScVal) -> Value {
    match val {
        ScVal::Bool(b) => Value::Bool(*b),
        ScVal::U32(n) => json!(n),
        ScVal::I32(n) => json!(n),
        ScVal::U64(n) => Value::String(n.to_string()),
        ScVal::I64(n) => Value::String(n.to_string()),
        ScVal::U128(parts) => {
            Value::String((((parts.hi as u128) << 64) | parts.lo as u128).to_string())
        }
        ScVal::I128(parts) => {
            Value::String((((parts.hi as i128) << 64) | parts.lo as i128).to_string())
        }
        ScVal::Symbol(sym) => Value::String(sym.0.to_utf8_string_lossy()),
        ScVal::String(s) => Value::String(s.0.to_utf8_string_lossy()),
        ScVal::Address(addr) => Value::String(addr.to_string()),
        ScVal::Vec(Some(items)) => Value::Array(items.0.iter().map(scval_to_json).collect()),
        ScVal::Map(Some(entries)) => Value::Object(
            entries
                .0
                .iter()
                .map(|entry| {
                    let key = match scval_to_json(&entry.key) {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (key, scval_to_json(&entry.val))
                })
                .collect(),
        ),
        _ => Value::Null,
    }
}

/// Pull `(asset, amount)` out of the event data object.
fn decode_data(value: &Value, kind: EventKind) -> (Option<String>, Option<String>) {
    let asset = || value.get("asset").and_then(decode_asset);
    match kind {
        EventKind::AccountCreated => (Some(NATIVE_ASSET.to_string()), None),
        EventKind::CoinCreated => (asset(), extract_field(value, &["goal"])),
        EventKind::DepositedFunds | EventKind::WithdrawedFunds => {
            (asset(), extract_field(value, &["amount"]))
        }
        EventKind::GoalReached => (asset(), extract_field(value, &["funds"])),
        EventKind::FeesCollected => {
            (Some(NATIVE_ASSET.to_string()), extract_field(value, &["amount"]))
        }
        EventKind::Unknown => (None, None),
    }
}

/// Decode an `AssetId` value: `["Native"]` or `["Token", "<contract>"]`.
fn decode_asset(value: &Value) -> Option<String> {
    match value.as_array()?.as_slice() {
        [tag] if tag.as_str() == Some("Native") => Some(NATIVE_ASSET.to_string()),
        [tag, address] if tag.as_str() == Some("Token") => address.as_str().map(String::from),
        _ => None,
    }
}

fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
