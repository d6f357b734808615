//! Long-running background task that polls the Soroban RPC and writes
//! decoded vault events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio::sync::watch;
use tracing::{error, info};

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::rpc;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Poll until `shutdown` flips to `true`.
pub async fn run(state: Arc<IndexerState>, mut shutdown: watch::Receiver<bool>) {
    info!("Indexer starting — contract: {}", state.config.contract_id);

    // Load the cursor from the DB; fall back to config start_ledger.
    let last_ledger = db::get_last_ledger(&state.pool).await.unwrap_or(0);
    let mut cursor = db::get_cursor_string(&state.pool).await.unwrap_or(None);
    let mut current_ledger = if last_ledger > 0 {
        last_ledger as u32
    } else {
        state.config.start_ledger
    };

    info!("Resuming from ledger {current_ledger}");

    loop {
        match poll_once(&state, current_ledger, cursor.as_deref()).await {
            Ok((next_ledger, next_cursor)) => {
                current_ledger = next_ledger;
                cursor = next_cursor;
            }
            Err(e) => error!("Indexer poll error: {e}"),
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)) => {}
            _ = shutdown.changed() => {
                info!("Indexer stopping at ledger {current_ledger}");
                return;
            }
        }
    }
}

/// Perform a single poll iteration.
///
/// Returns `(next_start_ledger, next_cursor)`.
async fn poll_once(
    state: &IndexerState,
    start_ledger: u32,
    cursor: Option<&str>,
) -> Result<(u32, Option<String>)> {
    let config = &state.config;
    let page = rpc::fetch_events(
        &state.client,
        &config.rpc_url,
        &config.contract_id,
        start_ledger,
        cursor,
        config.events_per_page,
    )
    .await?;

    if !page.events.is_empty() {
        let decoded = rpc::decode_events(&page.events, &config.contract_id);
        let inserted = db::insert_events(&state.pool, &decoded).await?;
        info!(
            "Polled {} raw events → {} new records stored",
            page.events.len(),
            inserted
        );
    }

    let next_ledger = next_start_ledger(start_ledger, page.latest_ledger);

    // Persist cursor so restarts are deterministic.
    db::save_cursor(&state.pool, next_ledger as i64, page.cursor.as_deref()).await?;

    Ok((next_ledger, page.cursor))
}

/// The scan start never moves backwards, even if the RPC reports an older
/// latest ledger than the one already reached.
fn next_start_ledger(start_ledger: u32, latest_ledger: Option<u64>) -> u32 {
    latest_ledger
        .map(|l| (l.min(u32::MAX as u64) as u32).max(start_ledger))
        .unwrap_or(start_ledger)
}
