//! Database layer — migrations, queries, and cursor management.

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::errors::Result;
use crate::events::{EventRecord, VaultEvent};

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    // Every connection to an in-memory database opens a fresh, empty one.
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Read the last-seen ledger from the cursor row.
/// Returns `0` when no cursor has been persisted yet.
pub async fn get_last_ledger(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_ledger FROM indexer_cursor WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

/// Persist the last-seen ledger (and optionally a pagination cursor string).
pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

/// Read back the raw cursor string (used to resume pagination mid-ledger).
pub async fn get_cursor_string(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(v,)| v))
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of decoded events inside one transaction. Events whose
/// `event_id` is already stored are ignored, which keeps re-polling a ledger
/// range harmless.
pub async fn insert_events(pool: &SqlitePool, events: &[VaultEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_id, event_type, owner, asset, amount, ledger, timestamp, contract_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&ev.event_id)
        .bind(&ev.event_type)
        .bind(&ev.owner)
        .bind(&ev.asset)
        .bind(&ev.amount)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(&ev.tx_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        count += rows_affected as usize;
    }
    tx.commit().await?;
    Ok(count)
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Fetch all events for a given account owner, ordered by ledger ascending.
pub async fn get_events_for_owner(pool: &SqlitePool, owner: &str) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_id, event_type, owner, asset, amount, ledger, timestamp,
               contract_id, tx_hash, created_at
        FROM   events
        WHERE  owner = ?1
        ORDER  BY ledger ASC, id ASC
        "#,
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch all events, ordered by ledger ascending.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, event_id, event_type, owner, asset, amount, ledger, timestamp,
               contract_id, tx_hash, created_at
        FROM   events
        ORDER  BY ledger ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn event(event_id: &str, kind: &str, owner: &str, amount: &str, ledger: i64) -> VaultEvent {
        VaultEvent {
            event_id: event_id.to_string(),
            event_type: kind.to_string(),
            owner: Some(owner.to_string()),
            asset: Some("native".to_string()),
            amount: Some(amount.to_string()),
            ledger,
            timestamp: 1_704_067_200 + ledger,
            contract_id: "CVAULT".to_string(),
            tx_hash: Some(format!("TX{ledger}")),
        }
    }

    #[tokio::test]
    async fn cursor_starts_at_zero_and_persists() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        assert_eq!(get_last_ledger(&pool).await.unwrap(), 0);
        assert_eq!(get_cursor_string(&pool).await.unwrap(), None);

        save_cursor(&pool, 4242, Some("0004242-0000000001")).await.unwrap();
        assert_eq!(get_last_ledger(&pool).await.unwrap(), 4242);
        assert_eq!(
            get_cursor_string(&pool).await.unwrap().as_deref(),
            Some("0004242-0000000001")
        );
    }

    #[tokio::test]
    async fn duplicate_events_are_ignored() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        let batch = vec![
            event("e1", "account_created", "GOWNER", "0", 10),
            event("e2", "deposited_funds", "GOWNER", "500", 11),
        ];

        assert_eq!(insert_events(&pool, &batch).await.unwrap(), 2);
        assert_eq!(insert_events(&pool, &batch).await.unwrap(), 0);
        assert_eq!(get_all_events(&pool).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn events_are_filtered_by_owner_in_ledger_order() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        let batch = vec![
            event("e3", "deposited_funds", "GALICE", "300", 30),
            event("e1", "account_created", "GALICE", "0", 10),
            event("e2", "account_created", "GBOB", "0", 20),
        ];
        insert_events(&pool, &batch).await.unwrap();

        let alice = get_events_for_owner(&pool, "GALICE").await.unwrap();
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].event_type, "account_created");
        assert_eq!(alice[1].amount.as_deref(), Some("300"));
        assert!(get_events_for_owner(&pool, "GCAROL").await.unwrap().is_empty());
    }
}
