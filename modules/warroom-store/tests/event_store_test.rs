//! Integration tests for EventStore over an in-memory SQLite pool.

use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use warroom_common::{AttackType, EventCategory, EventDay, NewsEvent, Outcome, Party};
use warroom_store::{init_schema, EventFilter, EventStore, InsertOutcome};

async fn test_store() -> EventStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();
    EventStore::new(pool)
}

fn fetch_time(second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, second).unwrap()
}

fn make_event(
    scope: &str,
    hash: &str,
    day: Option<EventDay>,
    category: EventCategory,
) -> NewsEvent {
    NewsEvent {
        scope: scope.to_string(),
        content_hash: hash.to_string(),
        fetched_at: fetch_time(0),
        event_time_text: day.map(|d| d.to_string()),
        event_day: day,
        category,
        attack_type: None,
        actor: Some(Party {
            name: "Gold Rush".to_string(),
            kingdom: Some("1:4".to_string()),
        }),
        target: Some(Party {
            name: "Maelstrom".to_string(),
            kingdom: Some("2:7".to_string()),
        }),
        outcome: Some(Outcome::Success),
        acres: Some(100),
        summary: format!("report {hash}"),
    }
}

// =========================================================================
// Round trips and idempotency
// =========================================================================

#[tokio::test]
async fn insert_then_query_round_trips_every_field() {
    let store = test_store().await;

    let mut event = make_event("genesis", "h1", Some(EventDay::new(4, 1, 12)), EventCategory::Attack);
    event.attack_type = Some(AttackType::Raze);
    event.outcome = Some(Outcome::Failed);

    assert_eq!(
        store.insert_if_absent(&event).await.unwrap(),
        InsertOutcome::Inserted
    );

    let stored = store.query(&EventFilter::for_scope("genesis")).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], event);
}

#[tokio::test]
async fn duplicate_insert_is_a_no_op() {
    let store = test_store().await;
    let event = make_event("genesis", "h1", Some(EventDay::new(4, 1, 12)), EventCategory::Attack);

    assert_eq!(
        store.insert_if_absent(&event).await.unwrap(),
        InsertOutcome::Inserted
    );
    assert_eq!(
        store.insert_if_absent(&event).await.unwrap(),
        InsertOutcome::AlreadyPresent
    );

    let stored = store.query(&EventFilter::for_scope("genesis")).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn same_hash_in_different_scopes_stays_separate() {
    let store = test_store().await;
    let a = make_event("genesis", "h1", None, EventCategory::Other);
    let b = make_event("exodus", "h1", None, EventCategory::Other);

    assert_eq!(store.insert_if_absent(&a).await.unwrap(), InsertOutcome::Inserted);
    assert_eq!(store.insert_if_absent(&b).await.unwrap(), InsertOutcome::Inserted);

    assert_eq!(store.query(&EventFilter::for_scope("genesis")).await.unwrap().len(), 1);
    assert_eq!(store.query(&EventFilter::for_scope("exodus")).await.unwrap().len(), 1);
}

#[tokio::test]
async fn optional_fields_round_trip_as_none() {
    let store = test_store().await;
    let mut event = make_event("genesis", "bare", None, EventCategory::Other);
    event.actor = None;
    event.target = None;
    event.outcome = None;
    event.acres = None;
    event.event_time_text = None;

    store.insert_if_absent(&event).await.unwrap();

    let stored = store.query(&EventFilter::for_scope("genesis")).await.unwrap();
    assert_eq!(stored[0], event);
}

// =========================================================================
// Ordering
// =========================================================================

#[tokio::test]
async fn query_orders_by_day_then_fetch_time_then_hash() {
    let store = test_store().await;

    // Inserted deliberately out of order.
    let mut late_day = make_event("genesis", "d2", Some(EventDay::new(4, 2, 1)), EventCategory::Attack);
    late_day.fetched_at = fetch_time(1);
    let mut early_day = make_event("genesis", "d1", Some(EventDay::new(4, 1, 9)), EventCategory::Attack);
    early_day.fetched_at = fetch_time(9);
    let dayless = make_event("genesis", "d0", None, EventCategory::Other);

    // Same day, distinguished by fetch time.
    let mut same_day_later_fetch =
        make_event("genesis", "d3", Some(EventDay::new(4, 2, 1)), EventCategory::Aid);
    same_day_later_fetch.fetched_at = fetch_time(30);

    store.insert_if_absent(&dayless).await.unwrap();
    store.insert_if_absent(&same_day_later_fetch).await.unwrap();
    store.insert_if_absent(&late_day).await.unwrap();
    store.insert_if_absent(&early_day).await.unwrap();

    let stored = store.query(&EventFilter::for_scope("genesis")).await.unwrap();
    let hashes: Vec<&str> = stored.iter().map(|e| e.content_hash.as_str()).collect();
    assert_eq!(hashes, vec!["d1", "d2", "d3", "d0"]);
}

#[tokio::test]
async fn equal_day_and_fetch_time_tie_break_on_hash() {
    let store = test_store().await;
    let day = Some(EventDay::new(4, 3, 3));

    let b = make_event("genesis", "bb", day, EventCategory::Attack);
    let a = make_event("genesis", "aa", day, EventCategory::Attack);
    store.insert_if_absent(&b).await.unwrap();
    store.insert_if_absent(&a).await.unwrap();

    let stored = store.query(&EventFilter::for_scope("genesis")).await.unwrap();
    let hashes: Vec<&str> = stored.iter().map(|e| e.content_hash.as_str()).collect();
    assert_eq!(hashes, vec!["aa", "bb"]);
}

#[tokio::test]
async fn repeated_queries_return_identical_order() {
    let store = test_store().await;
    for (i, day) in [None, Some(EventDay::new(4, 1, 2)), Some(EventDay::new(4, 1, 1))]
        .into_iter()
        .enumerate()
    {
        let event = make_event("genesis", &format!("h{i}"), day, EventCategory::Attack);
        store.insert_if_absent(&event).await.unwrap();
    }

    let first = store.query(&EventFilter::for_scope("genesis")).await.unwrap();
    let second = store.query(&EventFilter::for_scope("genesis")).await.unwrap();
    assert_eq!(first, second);
}

// =========================================================================
// Filters
// =========================================================================

#[tokio::test]
async fn day_range_filter_is_inclusive() {
    let store = test_store().await;
    for (hash, day) in [
        ("h1", EventDay::new(4, 1, 1)),
        ("h2", EventDay::new(4, 1, 2)),
        ("h3", EventDay::new(4, 1, 3)),
        ("h4", EventDay::new(4, 1, 4)),
    ] {
        store
            .insert_if_absent(&make_event("genesis", hash, Some(day), EventCategory::Attack))
            .await
            .unwrap();
    }

    let filter = EventFilter::builder()
        .scope("genesis")
        .day_from(EventDay::new(4, 1, 2))
        .day_to(EventDay::new(4, 1, 3))
        .build();
    let stored = store.query(&filter).await.unwrap();
    let hashes: Vec<&str> = stored.iter().map(|e| e.content_hash.as_str()).collect();
    assert_eq!(hashes, vec!["h2", "h3"]);
}

#[tokio::test]
async fn day_range_excludes_dayless_events() {
    let store = test_store().await;
    store
        .insert_if_absent(&make_event("genesis", "dated", Some(EventDay::new(4, 1, 2)), EventCategory::Attack))
        .await
        .unwrap();
    store
        .insert_if_absent(&make_event("genesis", "dayless", None, EventCategory::Attack))
        .await
        .unwrap();

    let filter = EventFilter::builder()
        .scope("genesis")
        .day_from(EventDay::new(4, 1, 1))
        .build();
    let stored = store.query(&filter).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].content_hash, "dated");
}

#[tokio::test]
async fn category_filter_narrows() {
    let store = test_store().await;
    store
        .insert_if_absent(&make_event("genesis", "h1", None, EventCategory::Attack))
        .await
        .unwrap();
    store
        .insert_if_absent(&make_event("genesis", "h2", None, EventCategory::Aid))
        .await
        .unwrap();

    let filter = EventFilter::builder()
        .scope("genesis")
        .category(EventCategory::Aid)
        .build();
    let stored = store.query(&filter).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].category, EventCategory::Aid);
}

#[tokio::test]
async fn entity_filter_matches_either_party_case_insensitively() {
    let store = test_store().await;
    store
        .insert_if_absent(&make_event("genesis", "h1", None, EventCategory::Attack))
        .await
        .unwrap();

    for needle in ["maelstrom", "GOLD", "old ru"] {
        let filter = EventFilter::builder()
            .scope("genesis")
            .entity(needle)
            .build();
        let stored = store.query(&filter).await.unwrap();
        assert_eq!(stored.len(), 1, "entity needle {needle:?} should match");
    }

    let filter = EventFilter::builder()
        .scope("genesis")
        .entity("stormwatch")
        .build();
    assert!(store.query(&filter).await.unwrap().is_empty());
}

#[tokio::test]
async fn entity_filter_treats_like_wildcards_as_literal_text() {
    let store = test_store().await;
    let mut event = make_event("genesis", "h1", None, EventCategory::Attack);
    event.actor = Some(Party {
        name: "The 100% War_Band".to_string(),
        kingdom: Some("1:4".to_string()),
    });
    store.insert_if_absent(&event).await.unwrap();

    // Literal matches against the stored name still work.
    for needle in ["100%", "War_Band", "100% War"] {
        let filter = EventFilter::builder().scope("genesis").entity(needle).build();
        assert_eq!(
            store.query(&filter).await.unwrap().len(),
            1,
            "literal needle {needle:?} should match"
        );
    }

    // Needles that would only match via % or _ wildcards match nothing.
    for needle in ["1%Band", "War_Bond", "M_elstrom"] {
        let filter = EventFilter::builder().scope("genesis").entity(needle).build();
        assert!(
            store.query(&filter).await.unwrap().is_empty(),
            "needle {needle:?} must not wildcard-match"
        );
    }
}

#[tokio::test]
async fn focus_pair_is_directional() {
    let store = test_store().await;
    // Gold Rush -> Maelstrom
    store
        .insert_if_absent(&make_event("genesis", "h1", None, EventCategory::Attack))
        .await
        .unwrap();

    let forward = EventFilter::builder()
        .scope("genesis")
        .focus(("gold rush".to_string(), "maelstrom".to_string()))
        .build();
    assert_eq!(store.query(&forward).await.unwrap().len(), 1);

    let reversed = EventFilter::builder()
        .scope("genesis")
        .focus(("maelstrom".to_string(), "gold rush".to_string()))
        .build();
    assert!(store.query(&reversed).await.unwrap().is_empty());
}

// =========================================================================
// Maintenance
// =========================================================================

#[tokio::test]
async fn reset_scope_removes_only_that_scope() {
    let store = test_store().await;
    store
        .insert_if_absent(&make_event("genesis", "h1", None, EventCategory::Attack))
        .await
        .unwrap();
    store
        .insert_if_absent(&make_event("exodus", "h2", None, EventCategory::Attack))
        .await
        .unwrap();

    let removed = store.reset_scope("genesis").await.unwrap();
    assert_eq!(removed, 1);

    assert!(store.query(&EventFilter::for_scope("genesis")).await.unwrap().is_empty());
    assert_eq!(store.query(&EventFilter::for_scope("exodus")).await.unwrap().len(), 1);
}
