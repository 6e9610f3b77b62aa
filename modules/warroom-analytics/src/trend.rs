//! Kingdom trend series: snapshot-derived land, net worth, and honor over
//! time, for one kingdom or two side by side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warroom_common::KingdomSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub fetched_at: DateTime<Utc>,
    pub land: Option<i64>,
    pub networth: Option<i64>,
    pub honor: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub kingdom: String,
    pub name: String,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KingdomCompare {
    pub left: TrendSeries,
    pub right: TrendSeries,
}

/// Project a snapshot series (already in fetch order) into trend points.
/// An empty series yields an empty trend with the coordinate echoed back.
pub fn build_trend(kingdom: &str, snapshots: &[KingdomSnapshot]) -> TrendSeries {
    TrendSeries {
        kingdom: kingdom.to_string(),
        name: snapshots
            .last()
            .map(|snap| snap.name.clone())
            .unwrap_or_default(),
        points: snapshots
            .iter()
            .map(|snap| TrendPoint {
                fetched_at: snap.fetched_at,
                land: snap.land,
                networth: snap.networth,
                honor: snap.honor,
            })
            .collect(),
    }
}

/// Two kingdoms side by side. Either side may be empty; the consumer plots
/// what exists.
pub fn build_compare(
    left_kingdom: &str,
    left_snapshots: &[KingdomSnapshot],
    right_kingdom: &str,
    right_snapshots: &[KingdomSnapshot],
) -> KingdomCompare {
    KingdomCompare {
        left: build_trend(left_kingdom, left_snapshots),
        right: build_trend(right_kingdom, right_snapshots),
    }
}
