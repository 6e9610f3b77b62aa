//! Pool construction and schema bootstrap. The schema is small enough to
//! live here as plain DDL; every statement is idempotent, so bootstrap can
//! run on every start.

use std::time::Duration;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::debug;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS events (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        scope           TEXT    NOT NULL,
        content_hash    TEXT    NOT NULL,
        fetched_at      TEXT    NOT NULL,
        event_time_text TEXT,
        event_day       INTEGER,
        category        TEXT    NOT NULL,
        attack_type     TEXT,
        actor_name      TEXT,
        actor_kingdom   TEXT,
        target_name     TEXT,
        target_kingdom  TEXT,
        outcome         TEXT,
        acres           INTEGER,
        summary         TEXT    NOT NULL,
        UNIQUE(scope, content_hash)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_events_scope_day ON events(scope, event_day)",
    "CREATE INDEX IF NOT EXISTS idx_events_scope_category ON events(scope, category)",
    r#"
    CREATE TABLE IF NOT EXISTS kingdom_snapshots (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        scope         TEXT    NOT NULL,
        kingdom       TEXT    NOT NULL,
        name          TEXT    NOT NULL,
        fetched_at    TEXT    NOT NULL,
        land          INTEGER,
        networth      INTEGER,
        honor         INTEGER,
        avg_land      INTEGER,
        avg_networth  INTEGER,
        land_rank     INTEGER,
        networth_rank INTEGER,
        honor_rank    INTEGER,
        provinces     INTEGER,
        stance        TEXT,
        fingerprint   TEXT    NOT NULL,
        UNIQUE(scope, kingdom, fingerprint)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_kingdom_snapshots_series
     ON kingdom_snapshots(scope, kingdom, fetched_at)",
    r#"
    CREATE TABLE IF NOT EXISTS province_snapshots (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        scope       TEXT    NOT NULL,
        kingdom     TEXT    NOT NULL,
        province    TEXT    NOT NULL,
        fetched_at  TEXT    NOT NULL,
        slot        INTEGER,
        race        TEXT,
        land        INTEGER,
        networth    INTEGER,
        nwpa        REAL,
        nobility    TEXT,
        fingerprint TEXT    NOT NULL,
        UNIQUE(scope, kingdom, province, fingerprint)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_province_snapshots_series
     ON province_snapshots(scope, kingdom, fetched_at)",
];

/// Open (creating if missing) the database file behind all stores.
pub async fn open_pool(database_path: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(database_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Create any missing tables and indexes. Safe to run on every start.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    debug!("schema ready");
    Ok(())
}
