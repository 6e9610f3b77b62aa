//! Ingest health cell. One owned, mutex-guarded struct; writers hold the
//! lock only to flip fields, never across an await, so `snapshot()` can be
//! called from any reader at any moment without waiting on a cycle.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub enabled: bool,
    pub running: bool,
    pub iterations: u64,
    pub last_started_time: Option<DateTime<Utc>>,
    pub last_success_time: Option<DateTime<Utc>>,
    pub last_duration_ms: Option<i64>,
    pub last_error: Option<String>,
    pub last_parsed_event_count: u64,
}

/// Shared status cell. Cheap to clone a snapshot out of; resets on restart.
pub struct IngestStatus {
    inner: Mutex<StatusSnapshot>,
}

impl IngestStatus {
    pub fn new(enabled: bool) -> Self {
        Self {
            inner: Mutex::new(StatusSnapshot {
                enabled,
                ..StatusSnapshot::default()
            }),
        }
    }

    pub fn begin_cycle(&self, now: DateTime<Utc>) {
        let mut status = self.inner.lock().unwrap();
        status.running = true;
        status.iterations += 1;
        status.last_started_time = Some(now);
    }

    pub fn record_success(&self, parsed_count: u64, now: DateTime<Utc>) {
        let mut status = self.inner.lock().unwrap();
        status.running = false;
        status.last_success_time = Some(now);
        status.last_duration_ms = status
            .last_started_time
            .map(|started| (now - started).num_milliseconds());
        status.last_error = None;
        status.last_parsed_event_count = parsed_count;
    }

    /// A failed cycle still reports how far it got: events committed before
    /// the failure are durable and the count reflects them.
    pub fn record_failure(&self, error: &str, parsed_count: u64, now: DateTime<Utc>) {
        let mut status = self.inner.lock().unwrap();
        status.running = false;
        status.last_duration_ms = status
            .last_started_time
            .map(|started| (now - started).num_milliseconds());
        status.last_error = Some(error.to_string());
        status.last_parsed_event_count = parsed_count;
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.inner.lock().unwrap().clone()
    }
}
