//! Replay timeline: one row per in-game day with that day's attack and
//! operation exchange for the home kingdom, plus running sums so a consumer
//! can scrub through the scope and see cumulative state at any day.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use warroom_common::{EventCategory, EventDay, NewsEvent, Outcome};
use warroom_parser::{attack, classify_op_kind, effective_land_impact, operation_impact_points, OpKind};

use crate::view::enrich;
use crate::wars::{in_home_war, WarRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRow {
    pub day: EventDay,
    pub attack_events: u32,
    pub home_hits: u32,
    pub enemy_hits: u32,
    pub home_land_gained: i64,
    pub home_land_lost: i64,
    pub home_land_net: i64,
    pub op_damage_done: f64,
    pub op_damage_taken: f64,
    pub op_net_damage: f64,
    pub cumulative_land_net: i64,
    pub cumulative_op_net_damage: f64,
}

impl ReplayRow {
    fn new(day: EventDay) -> ReplayRow {
        ReplayRow {
            day,
            attack_events: 0,
            home_hits: 0,
            enemy_hits: 0,
            home_land_gained: 0,
            home_land_lost: 0,
            home_land_net: 0,
            op_damage_done: 0.0,
            op_damage_taken: 0.0,
            op_net_damage: 0.0,
            cumulative_land_net: 0,
            cumulative_op_net_damage: 0.0,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Operation disruption score: the report's own damage figure when present,
/// its gain otherwise, and the per-operation weight table as a last resort.
fn op_points(view: &crate::view::EventView, kind: OpKind) -> f64 {
    if kind != OpKind::Hostile {
        return 0.0;
    }
    if let Some(damage) = view.op_damage.filter(|d| *d > 0) {
        return damage as f64;
    }
    if let Some(gain) = view.op_gain.filter(|g| *g > 0) {
        return gain as f64;
    }
    match &view.op_name {
        Some(name) => operation_impact_points(name, view.event.outcome, kind),
        None => 0.0,
    }
}

/// Build the day-indexed replay for a scope. Undated events are skipped:
/// a replay is scrubbed by in-game day and a row with no day has no place on
/// the axis. Without a home kingdom the attack counts still populate, but
/// the directional figures stay zero.
pub fn build_replay(
    events: &[NewsEvent],
    home_kingdom: Option<&str>,
    wars: &[WarRow],
) -> Vec<ReplayRow> {
    let mut day_map: BTreeMap<EventDay, ReplayRow> = BTreeMap::new();

    for event in events {
        let Some(day) = event.event_day else {
            continue;
        };

        match event.category {
            EventCategory::Attack => {
                let row = day_map.entry(day).or_insert_with(|| ReplayRow::new(day));
                row.attack_events += 1;

                let Some(home) = home_kingdom else {
                    continue;
                };
                if event.outcome != Some(Outcome::Success) {
                    continue;
                }

                let view = enrich(event);
                let actor_kingdom = view.event.actor_kingdom();
                let target_kingdom = view.event.target_kingdom();
                let war_context =
                    in_home_war(Some(day), actor_kingdom, target_kingdom, Some(home), wars);
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

                let row = day_map.entry(day).or_insert_with(|| ReplayRow::new(day));
                if actor_kingdom == Some(home) && target_kingdom.is_some_and(|t| t != home) {
                    row.home_hits += 1;
                    row.home_land_gained += impact;
                } else if target_kingdom == Some(home)
                    && actor_kingdom.is_some_and(|a| a != home)
                {
                    row.enemy_hits += 1;
                    row.home_land_lost += impact;
                }
            }
            EventCategory::Thievery | EventCategory::Magic => {
                let Some(home) = home_kingdom else {
                    continue;
                };
                let view = enrich(event);
                let actor_name = view.actor_name().unwrap_or("-");
                let target_name = view.target_name().unwrap_or("-");
                let kind = match &view.op_name {
                    Some(name) => classify_op_kind(name, actor_name, target_name),
                    None => continue,
                };
                let points = op_points(&view, kind);
                if points <= 0.0 {
                    continue;
                }

                let actor_kingdom = view.event.actor_kingdom();
                let target_kingdom = view.event.target_kingdom();
                let row = day_map.entry(day).or_insert_with(|| ReplayRow::new(day));
                if actor_kingdom == Some(home) && target_kingdom.is_some_and(|t| t != home) {
                    row.op_damage_done += points;
                } else if target_kingdom == Some(home)
                    && actor_kingdom.is_some_and(|a| a != home)
                {
                    row.op_damage_taken += points;
                }
            }
            _ => {}
        }
    }

    let mut cumulative_land = 0i64;
    let mut cumulative_op = 0.0f64;
    day_map
        .into_values()
        .map(|mut row| {
            row.home_land_net = row.home_land_gained - row.home_land_lost;
            row.op_damage_done = round2(row.op_damage_done);
            row.op_damage_taken = round2(row.op_damage_taken);
            row.op_net_damage = round2(row.op_damage_done - row.op_damage_taken);
            cumulative_land += row.home_land_net;
            cumulative_op = round2(cumulative_op + row.op_net_damage);
            row.cumulative_land_net = cumulative_land;
            row.cumulative_op_net_damage = cumulative_op;
            row
        })
        .collect()
}
