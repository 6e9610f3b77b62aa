//! SnapshotStore: kingdom and province snapshot series backed by SQLite.
//!
//! Rows are append-only and fingerprinted: a retried fetch that reproduces
//! an already-stored capture is a no-op, while every genuinely new capture
//! appends. Trends read the series in fetch order.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;

use warroom_common::{KingdomSnapshot, ProvinceSnapshot};

use crate::events::InsertOutcome;

// ---------------------------------------------------------------------------
// SnapshotStore
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct SnapshotStore {
    pool: SqlitePool,
}

impl SnapshotStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert one kingdom capture unless an identical one (same fetch, same
    /// headline stats) is already stored.
    pub async fn insert_kingdom(&self, snapshot: &KingdomSnapshot) -> Result<InsertOutcome> {
        let fingerprint = kingdom_fingerprint(snapshot);
        let result = sqlx::query(
            r#"
            INSERT INTO kingdom_snapshots (
                scope, kingdom, name, fetched_at, land, networth, honor,
                avg_land, avg_networth, land_rank, networth_rank, honor_rank,
                provinces, stance, fingerprint
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ON CONFLICT(scope, kingdom, fingerprint) DO NOTHING
            "#,
        )
        .bind(&snapshot.scope)
        .bind(&snapshot.kingdom)
        .bind(&snapshot.name)
        .bind(snapshot.fetched_at)
        .bind(snapshot.land)
        .bind(snapshot.networth)
        .bind(snapshot.honor)
        .bind(snapshot.avg_land)
        .bind(snapshot.avg_networth)
        .bind(snapshot.land_rank)
        .bind(snapshot.networth_rank)
        .bind(snapshot.honor_rank)
        .bind(snapshot.provinces)
        .bind(&snapshot.stance)
        .bind(fingerprint)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::AlreadyPresent)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    /// Insert province captures, skipping ones already stored. Returns how
    /// many were new.
    pub async fn insert_provinces(&self, snapshots: &[ProvinceSnapshot]) -> Result<usize> {
        let mut inserted = 0;
        for snapshot in snapshots {
            let fingerprint = province_fingerprint(snapshot);
            let result = sqlx::query(
                r#"
                INSERT INTO province_snapshots (
                    scope, kingdom, province, fetched_at, slot, race, land,
                    networth, nwpa, nobility, fingerprint
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                ON CONFLICT(scope, kingdom, province, fingerprint) DO NOTHING
                "#,
            )
            .bind(&snapshot.scope)
            .bind(&snapshot.kingdom)
            .bind(&snapshot.province)
            .bind(snapshot.fetched_at)
            .bind(snapshot.slot)
            .bind(&snapshot.race)
            .bind(snapshot.land)
            .bind(snapshot.networth)
            .bind(snapshot.nwpa)
            .bind(&snapshot.nobility)
            .bind(fingerprint)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() > 0 {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    /// Full capture series for one kingdom, oldest first.
    pub async fn kingdom_trend(&self, scope: &str, kingdom: &str) -> Result<Vec<KingdomSnapshot>> {
        let rows = sqlx::query_as::<_, KingdomRow>(
            r#"
            SELECT scope, kingdom, name, fetched_at, land, networth, honor,
                   avg_land, avg_networth, land_rank, networth_rank, honor_rank,
                   provinces, stance
            FROM kingdom_snapshots
            WHERE scope = ?1 AND kingdom = ?2
            ORDER BY fetched_at, id
            "#,
        )
        .bind(scope)
        .bind(kingdom)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|row| row.0).collect())
    }

    /// Latest capture per kingdom in the scope, ordered by coordinate.
    pub async fn latest_kingdoms(&self, scope: &str) -> Result<Vec<KingdomSnapshot>> {
        let rows = sqlx::query_as::<_, KingdomRow>(
            r#"
            SELECT scope, kingdom, name, fetched_at, land, networth, honor,
                   avg_land, avg_networth, land_rank, networth_rank, honor_rank,
                   provinces, stance
            FROM kingdom_snapshots
            WHERE scope = ?1
            ORDER BY kingdom, fetched_at DESC, id DESC
            "#,
        )
        .bind(scope)
        .fetch_all(&self.pool)
        .await?;

        let mut latest: Vec<KingdomSnapshot> = Vec::new();
        for row in rows {
            if latest.last().map(|snap| snap.kingdom.as_str()) != Some(row.0.kingdom.as_str()) {
                latest.push(row.0);
            }
        }
        Ok(latest)
    }

    /// Capture-count per kingdom coordinate, largest first. Feeds home
    /// kingdom inference.
    pub async fn kingdom_row_counts(&self, scope: &str) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT kingdom, COUNT(*) AS captures
            FROM kingdom_snapshots
            WHERE scope = ?1
            GROUP BY kingdom
            ORDER BY captures DESC, kingdom
            "#,
        )
        .bind(scope)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Capture series for one province, oldest first.
    pub async fn province_timeline(
        &self,
        scope: &str,
        kingdom: &str,
        province: &str,
    ) -> Result<Vec<ProvinceSnapshot>> {
        let rows = sqlx::query_as::<_, ProvinceRow>(
            r#"
            SELECT scope, kingdom, province, fetched_at, slot, race, land,
                   networth, nwpa, nobility
            FROM province_snapshots
            WHERE scope = ?1 AND kingdom = ?2 AND province = ?3 COLLATE NOCASE
            ORDER BY fetched_at, id
            "#,
        )
        .bind(scope)
        .bind(kingdom)
        .bind(province)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|row| row.0).collect())
    }

    /// Province roster for one kingdom at one capture time, slot order.
    pub async fn provinces_at(
        &self,
        scope: &str,
        kingdom: &str,
        fetched_at: DateTime<Utc>,
    ) -> Result<Vec<ProvinceSnapshot>> {
        let rows = sqlx::query_as::<_, ProvinceRow>(
            r#"
            SELECT scope, kingdom, province, fetched_at, slot, race, land,
                   networth, nwpa, nobility
            FROM province_snapshots
            WHERE scope = ?1 AND kingdom = ?2 AND fetched_at = ?3
            ORDER BY slot, province
            "#,
        )
        .bind(scope)
        .bind(kingdom)
        .bind(fetched_at)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|row| row.0).collect())
    }

    /// Drop every snapshot row for a scope. Destructive; operator resets
    /// only.
    pub async fn reset_scope(&self, scope: &str) -> Result<u64> {
        let kingdoms = sqlx::query("DELETE FROM kingdom_snapshots WHERE scope = ?1")
            .bind(scope)
            .execute(&self.pool)
            .await?;
        let provinces = sqlx::query("DELETE FROM province_snapshots WHERE scope = ?1")
            .bind(scope)
            .execute(&self.pool)
            .await?;
        Ok(kingdoms.rows_affected() + provinces.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Fingerprints
// ---------------------------------------------------------------------------

fn opt_i64(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn sha256_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

fn kingdom_fingerprint(snapshot: &KingdomSnapshot) -> String {
    sha256_text(&format!(
        "{}|{}|{}|{}|{}|{}",
        snapshot.fetched_at.to_rfc3339(),
        snapshot.kingdom,
        opt_i64(snapshot.land),
        opt_i64(snapshot.networth),
        opt_i64(snapshot.honor),
        snapshot.stance.as_deref().unwrap_or("-"),
    ))
}

fn province_fingerprint(snapshot: &ProvinceSnapshot) -> String {
    sha256_text(&format!(
        "{}|{}|{}|{}|{}|{}",
        snapshot.fetched_at.to_rfc3339(),
        snapshot.kingdom,
        opt_i64(snapshot.slot),
        snapshot.province,
        opt_i64(snapshot.land),
        opt_i64(snapshot.networth),
    ))
}

// ---------------------------------------------------------------------------
// sqlx::FromRow for stored snapshots
// ---------------------------------------------------------------------------

struct KingdomRow(KingdomSnapshot);

impl<'r> sqlx::FromRow<'r, SqliteRow> for KingdomRow {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(KingdomRow(KingdomSnapshot {
            scope: row.try_get("scope")?,
            kingdom: row.try_get("kingdom")?,
            name: row.try_get("name")?,
            fetched_at: row.try_get("fetched_at")?,
            land: row.try_get("land")?,
            networth: row.try_get("networth")?,
            honor: row.try_get("honor")?,
            avg_land: row.try_get("avg_land")?,
            avg_networth: row.try_get("avg_networth")?,
            land_rank: row.try_get("land_rank")?,
            networth_rank: row.try_get("networth_rank")?,
            honor_rank: row.try_get("honor_rank")?,
            provinces: row.try_get("provinces")?,
            stance: row.try_get("stance")?,
        }))
    }
}

struct ProvinceRow(ProvinceSnapshot);

impl<'r> sqlx::FromRow<'r, SqliteRow> for ProvinceRow {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(ProvinceRow(ProvinceSnapshot {
            scope: row.try_get("scope")?,
            kingdom: row.try_get("kingdom")?,
            province: row.try_get("province")?,
            fetched_at: row.try_get("fetched_at")?,
            slot: row.try_get("slot")?,
            race: row.try_get("race")?,
            land: row.try_get("land")?,
            networth: row.try_get("networth")?,
            nwpa: row.try_get("nwpa")?,
            nobility: row.try_get("nobility")?,
        }))
    }
}
