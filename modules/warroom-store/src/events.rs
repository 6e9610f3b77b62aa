//! EventStore: append-only report log backed by SQLite.
//!
//! `(scope, content_hash)` is the identity. Re-inserting a known event is a
//! no-op success, which makes page replays and overlapping cycles safe by
//! construction. Rows are never updated or deleted outside `reset_scope`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use typed_builder::TypedBuilder;

use warroom_common::{AttackType, EventCategory, EventDay, NewsEvent, Outcome, Party};

// ---------------------------------------------------------------------------
// Filter & outcomes
// ---------------------------------------------------------------------------

/// What `insert_if_absent` reports for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyPresent,
}

/// Query shape for the event log. Scope is mandatory; everything else
/// narrows. `entity` is a case-insensitive substring match against either
/// party name; `focus` pins an exact (actor, target) pair, directional.
#[derive(Debug, Clone, TypedBuilder)]
pub struct EventFilter {
    #[builder(setter(into))]
    pub scope: String,
    #[builder(default, setter(strip_option))]
    pub day_from: Option<EventDay>,
    #[builder(default, setter(strip_option))]
    pub day_to: Option<EventDay>,
    #[builder(default, setter(strip_option))]
    pub category: Option<EventCategory>,
    #[builder(default, setter(strip_option, into))]
    pub entity: Option<String>,
    #[builder(default, setter(strip_option))]
    pub focus: Option<(String, String)>,
}

impl EventFilter {
    /// Everything stored for one scope.
    pub fn for_scope(scope: &str) -> EventFilter {
        EventFilter::builder().scope(scope).build()
    }
}

// ---------------------------------------------------------------------------
// EventStore
// ---------------------------------------------------------------------------

/// Append-only report log. The single source of truth for rollups.
#[derive(Clone)]
pub struct EventStore {
    pool: SqlitePool,
}

impl EventStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert one event unless its `(scope, content_hash)` is already known.
    /// Atomic per event; concurrent readers never observe a partial row.
    pub async fn insert_if_absent(&self, event: &NewsEvent) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO events (
                scope, content_hash, fetched_at, event_time_text, event_day,
                category, attack_type, actor_name, actor_kingdom,
                target_name, target_kingdom, outcome, acres, summary
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            ON CONFLICT(scope, content_hash) DO NOTHING
            "#,
        )
        .bind(&event.scope)
        .bind(&event.content_hash)
        .bind(event.fetched_at)
        .bind(&event.event_time_text)
        .bind(event.event_day.map(|day| day.ordinal()))
        .bind(event.category.as_str())
        .bind(event.attack_type.map(|t| t.as_str()))
        .bind(event.actor.as_ref().map(|p| p.name.as_str()))
        .bind(event.actor.as_ref().and_then(|p| p.kingdom.as_deref()))
        .bind(event.target.as_ref().map(|p| p.name.as_str()))
        .bind(event.target.as_ref().and_then(|p| p.kingdom.as_deref()))
        .bind(event.outcome.map(|o| o.as_str()))
        .bind(event.acres)
        .bind(&event.summary)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::AlreadyPresent)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    /// Query events under a filter, ordered by `(event_day, fetched_at,
    /// content_hash)` ascending with day-less events last. The order is
    /// total, so repeated calls over unchanged data are byte-identical.
    pub async fn query(&self, filter: &EventFilter) -> Result<Vec<NewsEvent>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT scope, content_hash, fetched_at, event_time_text, event_day, \
             category, attack_type, actor_name, actor_kingdom, target_name, \
             target_kingdom, outcome, acres, summary \
             FROM events WHERE scope = ",
        );
        qb.push_bind(filter.scope.as_str());

        if let Some(day) = filter.day_from {
            qb.push(" AND event_day >= ").push_bind(day.ordinal());
        }
        if let Some(day) = filter.day_to {
            qb.push(" AND event_day <= ").push_bind(day.ordinal());
        }
        if let Some(category) = filter.category {
            qb.push(" AND category = ").push_bind(category.as_str());
        }
        if let Some(entity) = &filter.entity {
            // LIKE metacharacters in the needle are literal text, not
            // wildcards.
            let escaped = entity
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            let needle = format!("%{escaped}%");
            qb.push(" AND (actor_name LIKE ").push_bind(needle.clone());
            qb.push(" ESCAPE '\\' OR target_name LIKE ").push_bind(needle);
            qb.push(" ESCAPE '\\')");
        }
        if let Some((actor, target)) = &filter.focus {
            qb.push(" AND actor_name = ").push_bind(actor.as_str());
            qb.push(" COLLATE NOCASE AND target_name = ")
                .push_bind(target.as_str());
            qb.push(" COLLATE NOCASE");
        }

        qb.push(" ORDER BY event_day IS NULL, event_day, fetched_at, content_hash");

        let rows = qb
            .build_query_as::<EventRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|row| row.0).collect())
    }

    /// Drop every event for a scope. Destructive; exists for operator resets
    /// only.
    pub async fn reset_scope(&self, scope: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM events WHERE scope = ?1")
            .bind(scope)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// sqlx::FromRow for stored events
// ---------------------------------------------------------------------------

struct EventRow(NewsEvent);

fn party_from_columns(name: Option<String>, kingdom: Option<String>) -> Option<Party> {
    name.map(|name| Party { name, kingdom })
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for EventRow {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        use sqlx::Row;

        let fetched_at: DateTime<Utc> = row.try_get("fetched_at")?;
        let event_day: Option<i64> = row.try_get("event_day")?;
        let category: String = row.try_get("category")?;
        let attack_type: Option<String> = row.try_get("attack_type")?;
        let outcome: Option<String> = row.try_get("outcome")?;

        Ok(EventRow(NewsEvent {
            scope: row.try_get("scope")?,
            content_hash: row.try_get("content_hash")?,
            fetched_at,
            event_time_text: row.try_get("event_time_text")?,
            event_day: event_day.and_then(EventDay::from_ordinal),
            category: EventCategory::parse(&category),
            attack_type: attack_type.map(|t| AttackType::parse(&t)),
            actor: party_from_columns(
                row.try_get("actor_name")?,
                row.try_get("actor_kingdom")?,
            ),
            target: party_from_columns(
                row.try_get("target_name")?,
                row.try_get("target_kingdom")?,
            ),
            outcome: outcome.map(|o| Outcome::parse(&o)),
            acres: row.try_get("acres")?,
            summary: row.try_get("summary")?,
        }))
    }
}
