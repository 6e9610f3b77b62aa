//! Feed ingestion: the fetcher trait and its reqwest implementation, the
//! bounded page cursor, the harvest cycle runner, and the status cell the
//! rest of the system reads ingest health from.

pub mod cursor;
pub mod cycle;
pub mod fetch;
pub mod status;

pub use cursor::PageWalk;
pub use cycle::{CycleStats, Harvester};
pub use fetch::{FeedFetcher, FeedPage, FetchError, HttpFeedFetcher};
pub use status::{IngestStatus, StatusSnapshot};
