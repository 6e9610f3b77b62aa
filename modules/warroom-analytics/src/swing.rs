//! Territory and net-worth swings for the home kingdom, plus the opponent
//! pressure board. Land swing reads the event log; NW swing reads the
//! kingdom snapshot series, one row per day with a delta against the nearest
//! earlier snapshot day, never interpolated.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use warroom_common::{EventCategory, EventDay, KingdomSnapshot, NewsEvent, Outcome};
use warroom_parser::{attack, effective_land_impact};

use crate::view::enrich;
use crate::wars::{in_home_war, WarRow};

/// Pick the home kingdom for a scope. An explicit override always wins;
/// otherwise the coordinate with the most snapshot captures (the collector
/// only snapshots its own kingdom), and as a last resort the coordinate
/// mentioned most across attack and aid parties. Ties break on the
/// coordinate string so the answer is stable.
pub fn infer_home_kingdom(
    events: &[NewsEvent],
    snapshot_counts: &[(String, i64)],
    override_kingdom: Option<&str>,
) -> Option<String> {
    if let Some(coord) = override_kingdom {
        if !coord.is_empty() {
            return Some(coord.to_string());
        }
    }

    if let Some((coord, _)) = snapshot_counts.first() {
        return Some(coord.clone());
    }

    let mut mentions: BTreeMap<&str, u32> = BTreeMap::new();
    for event in events {
        if !matches!(event.category, EventCategory::Attack | EventCategory::Aid) {
            continue;
        }
        for coord in [event.actor_kingdom(), event.target_kingdom()].into_iter().flatten() {
            *mentions.entry(coord).or_default() += 1;
        }
    }
    mentions
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(coord, _)| coord.to_string())
}

// ---------------------------------------------------------------------------
// Land swing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandSwingRow {
    pub day: EventDay,
    pub gained: i64,
    pub lost: i64,
    pub net: i64,
}

/// Per-day acres the home kingdom gained and lost through successful
/// attacks. Gains count only acres that actually transferred; losses count
/// the effective impact, with the war-Raze correction applied.
pub fn build_land_swing(
    events: &[NewsEvent],
    home_kingdom: Option<&str>,
    wars: &[WarRow],
) -> Vec<LandSwingRow> {
    let Some(home) = home_kingdom else {
        return Vec::new();
    };

    let mut by_day: BTreeMap<EventDay, (i64, i64)> = BTreeMap::new();
    for event in events {
        if event.category != EventCategory::Attack
            || event.outcome != Some(Outcome::Success)
        {
            continue;
        }
        let Some(day) = event.event_day else {
            continue;
        };
        let view = enrich(event);
        let actor_kingdom = view.event.actor_kingdom();
        let target_kingdom = view.event.target_kingdom();
        let war_context = in_home_war(
            Some(day),
            actor_kingdom,
            target_kingdom,
            Some(home),
            wars,
        );
        let attack_type = view
            .event
            .attack_type
            .unwrap_or_else(|| attack::classify_attack_type(&view.event.summary));
        let impact = effective_land_impact(
            view.acres_transfer,
            view.target_loss_acres,
            attack_type,
            war_context,
        );
        if impact <= 0 {
            continue;
        }

        if actor_kingdom == Some(home) && target_kingdom.is_some_and(|t| t != home) {
            if view.acres_transfer > 0 {
                by_day.entry(day).or_insert((0, 0)).0 += view.acres_transfer;
            }
        } else if target_kingdom == Some(home) && actor_kingdom.is_some_and(|a| a != home) {
            by_day.entry(day).or_insert((0, 0)).1 += impact;
        }
    }

    by_day
        .into_iter()
        .map(|(day, (gained, lost))| LandSwingRow {
            day,
            gained,
            lost,
            net: gained - lost,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Net-worth swing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NwSwingRow {
    pub day: NaiveDate,
    pub networth: i64,
    pub delta_networth: i64,
    pub land: i64,
    pub delta_land: i64,
}

/// Per-day totals from the latest snapshot on each calendar day, with deltas
/// against the previous day that has a snapshot. Days without captures
/// produce no row; the first row's deltas are zero.
pub fn build_nw_swing(snapshots: &[KingdomSnapshot]) -> Vec<NwSwingRow> {
    let mut daily: BTreeMap<NaiveDate, &KingdomSnapshot> = BTreeMap::new();
    for snapshot in snapshots {
        let kept = daily.entry(snapshot.fetched_at.date_naive()).or_insert(snapshot);
        if snapshot.fetched_at >= kept.fetched_at {
            *kept = snapshot;
        }
    }

    let mut rows = Vec::with_capacity(daily.len());
    let mut prev: Option<(i64, i64)> = None;
    for (day, snapshot) in daily {
        let networth = snapshot.networth.unwrap_or(0);
        let land = snapshot.land.unwrap_or(0);
        let (delta_networth, delta_land) = match prev {
            Some((prev_nw, prev_land)) => (networth - prev_nw, land - prev_land),
            None => (0, 0),
        };
        prev = Some((networth, land));
        rows.push(NwSwingRow {
            day,
            networth,
            delta_networth,
            land,
            delta_land,
        });
    }
    rows
}

// ---------------------------------------------------------------------------
// Opponent pressure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentRow {
    pub kingdom: String,
    pub hits_for: u32,
    pub hits_against: u32,
    pub acres_for: i64,
    pub acres_against: i64,
    pub net: i64,
}

/// Per-opponent exchange totals across every attack touching the home
/// kingdom. Busiest opponents first.
pub fn build_opponent_pressure(
    events: &[NewsEvent],
    home_kingdom: Option<&str>,
    wars: &[WarRow],
) -> Vec<OpponentRow> {
    let Some(home) = home_kingdom else {
        return Vec::new();
    };

    let mut pressure: BTreeMap<String, OpponentRow> = BTreeMap::new();

    for event in events {
        if event.category != EventCategory::Attack {
            continue;
        }
        let view = enrich(event);
        let actor_kingdom = view.event.actor_kingdom().map(str::to_string);
        let target_kingdom = view.event.target_kingdom().map(str::to_string);
        let war_context = in_home_war(
            view.event.event_day,
            actor_kingdom.as_deref(),
            target_kingdom.as_deref(),
            Some(home),
            wars,
        );
        let attack_type = view
            .event
            .attack_type
            .unwrap_or_else(|| attack::classify_attack_type(&view.event.summary));
        let impact = effective_land_impact(
            view.acres_transfer,
            view.target_loss_acres,
            attack_type,
            war_context,
        );
        let success = view.event.outcome == Some(Outcome::Success);

        if actor_kingdom.as_deref() == Some(home) {
            if let Some(opponent) = target_kingdom.as_deref().filter(|t| *t != home) {
                let row = pressure.entry(opponent.to_string()).or_insert_with(|| OpponentRow {
                    kingdom: opponent.to_string(),
                    hits_for: 0,
                    hits_against: 0,
                    acres_for: 0,
                    acres_against: 0,
                    net: 0,
                });
                row.hits_for += 1;
                if success && impact > 0 {
                    row.acres_for += impact;
                }
            }
        }
        if target_kingdom.as_deref() == Some(home) {
            if let Some(opponent) = actor_kingdom.as_deref().filter(|a| *a != home) {
                let row = pressure.entry(opponent.to_string()).or_insert_with(|| OpponentRow {
                    kingdom: opponent.to_string(),
                    hits_for: 0,
                    hits_against: 0,
                    acres_for: 0,
                    acres_against: 0,
                    net: 0,
                });
                row.hits_against += 1;
                if success && impact > 0 {
                    row.acres_against += impact;
                }
            }
        }
    }

    let mut rows: Vec<OpponentRow> = pressure
        .into_values()
        .map(|mut row| {
            row.net = row.acres_for - row.acres_against;
            row
        })
        .collect();
    rows.sort_by(|a, b| {
        let activity_a = a.hits_for + a.hits_against;
        let activity_b = b.hits_for + b.hits_against;
        activity_b
            .cmp(&activity_a)
            .then_with(|| b.net.abs().cmp(&a.net.abs()))
            .then_with(|| a.kingdom.cmp(&b.kingdom))
    });
    rows
}
