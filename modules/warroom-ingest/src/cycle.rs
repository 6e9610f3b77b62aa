//! The harvest cycle: walk the feed newest-first, parse every block, insert
//! each event if absent, stop early once a whole page is already known, then
//! capture a kingdom snapshot when configured. One cycle at a time per
//! harvester; an overlapping tick is skipped, not queued.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use warroom_common::WarRoomError;
use warroom_parser::{parse_kingdom_page, parse_page};
use warroom_store::{EventStore, InsertOutcome, SnapshotStore};

use crate::cursor::PageWalk;
use crate::fetch::{FeedFetcher, FetchError};
use crate::status::IngestStatus;

/// Counters from one harvest cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    pub pages_fetched: u32,
    pub blocks_parsed: u32,
    pub events_inserted: u32,
    pub duplicates_skipped: u32,
    pub kingdom_snapshots: u32,
    pub province_snapshots: u32,
}

impl std::fmt::Display for CycleStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Harvest Cycle Complete ===")?;
        writeln!(f, "Pages fetched:      {}", self.pages_fetched)?;
        writeln!(f, "Blocks parsed:      {}", self.blocks_parsed)?;
        writeln!(f, "Events inserted:    {}", self.events_inserted)?;
        writeln!(f, "Duplicates skipped: {}", self.duplicates_skipped)?;
        writeln!(f, "Kingdom snapshots:  {}", self.kingdom_snapshots)?;
        writeln!(f, "Province snapshots: {}", self.province_snapshots)?;
        Ok(())
    }
}

/// The sole writer for a scope. Drives fetch, parse, and insert.
pub struct Harvester {
    fetcher: Box<dyn FeedFetcher>,
    events: EventStore,
    snapshots: SnapshotStore,
    status: Arc<IngestStatus>,
    scope: String,
    max_pages: u32,
    cycle_timeout: Duration,
    cycle_lock: Mutex<()>,
}

impl Harvester {
    pub fn new(
        fetcher: Box<dyn FeedFetcher>,
        pool: SqlitePool,
        status: Arc<IngestStatus>,
        scope: impl Into<String>,
        max_pages: u32,
        cycle_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            events: EventStore::new(pool.clone()),
            snapshots: SnapshotStore::new(pool),
            status,
            scope: scope.into(),
            max_pages,
            cycle_timeout,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Run one harvest cycle. Returns `CycleConflict` when a cycle is
    /// already in flight for this scope. A failed cycle keeps everything it
    /// inserted before failing; the next cycle resumes from the feed head.
    pub async fn run_cycle(&self) -> Result<CycleStats, WarRoomError> {
        let Ok(_guard) = self.cycle_lock.try_lock() else {
            return Err(WarRoomError::CycleConflict(self.scope.clone()));
        };

        let run_id = Uuid::new_v4();
        self.status.begin_cycle(Utc::now());
        info!(scope = self.scope.as_str(), %run_id, "harvest cycle starting");

        let mut stats = CycleStats::default();
        let outcome = match tokio::time::timeout(
            self.cycle_timeout,
            self.cycle_inner(&mut stats),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(WarRoomError::Fetch(format!(
                "cycle deadline exceeded after {}s",
                self.cycle_timeout.as_secs()
            ))),
        };

        match outcome {
            Ok(()) => {
                self.status
                    .record_success(stats.blocks_parsed as u64, Utc::now());
                info!(
                    scope = self.scope.as_str(),
                    %run_id,
                    pages = stats.pages_fetched,
                    inserted = stats.events_inserted,
                    duplicates = stats.duplicates_skipped,
                    "harvest cycle complete"
                );
                info!("{stats}");
                Ok(stats)
            }
            Err(err) => {
                self.status
                    .record_failure(&err.to_string(), stats.blocks_parsed as u64, Utc::now());
                warn!(
                    scope = self.scope.as_str(),
                    %run_id,
                    inserted = stats.events_inserted,
                    error = %err,
                    "harvest cycle failed, committed events retained"
                );
                Err(err)
            }
        }
    }

    async fn cycle_inner(&self, stats: &mut CycleStats) -> Result<(), WarRoomError> {
        let mut walk = PageWalk::new(self.fetcher.as_ref(), &self.scope, self.max_pages);

        loop {
            let page = match walk.next_page().await {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(err) => {
                    stats.pages_fetched = walk.pages_fetched();
                    return Err(wrap_fetch(err));
                }
            };
            stats.pages_fetched = walk.pages_fetched();

            let fetched_at = Utc::now();
            let parsed = parse_page(&page.raw_text);
            let had_blocks = !parsed.is_empty();
            let mut inserted_this_page = 0u32;

            for block in parsed {
                stats.blocks_parsed += 1;
                let event = block.into_event(&self.scope, fetched_at);
                match self.events.insert_if_absent(&event).await? {
                    InsertOutcome::Inserted => {
                        inserted_this_page += 1;
                        stats.events_inserted += 1;
                    }
                    InsertOutcome::AlreadyPresent => stats.duplicates_skipped += 1,
                }
            }

            // The feed is newest-first, so a page with no new events means
            // every older page is known too.
            if had_blocks && inserted_this_page == 0 {
                break;
            }
        }

        if let Some(page_text) = self
            .fetcher
            .fetch_kingdom_page(&self.scope)
            .await
            .map_err(wrap_fetch)?
        {
            if let Some(parsed) = parse_kingdom_page(&page_text) {
                let (kingdom, provinces) = parsed.into_snapshots(&self.scope, Utc::now());
                if self.snapshots.insert_kingdom(&kingdom).await? == InsertOutcome::Inserted {
                    stats.kingdom_snapshots += 1;
                }
                stats.province_snapshots += self.snapshots.insert_provinces(&provinces).await? as u32;
            } else {
                warn!(scope = self.scope.as_str(), "kingdom page did not parse, skipping snapshot");
            }
        }

        Ok(())
    }
}

fn wrap_fetch(err: FetchError) -> WarRoomError {
    match err {
        FetchError::Transient(msg) => WarRoomError::Fetch(msg),
        FetchError::Auth(msg) => WarRoomError::Auth(msg),
    }
}
