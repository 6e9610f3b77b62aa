//! Durable storage for the war room: the append-only event log and the
//! kingdom/province snapshot series, both in a single SQLite file. Writers
//! insert-if-absent; readers never see a half-written row.

pub mod db;
pub mod events;
pub mod snapshots;

pub use db::{init_schema, open_pool};
pub use events::{EventFilter, EventStore, InsertOutcome};
pub use snapshots::SnapshotStore;
