//! Fact drill-down: every headline number a consumer displays can be traced
//! back to the rows and events that produced it. Unknown keys return an
//! empty detail with the default summary, never an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use warroom_common::{EventCategory, NewsEvent, Outcome};

use crate::swing::{build_land_swing, build_opponent_pressure};
use crate::view::{enrich, EventView};
use crate::wars::WarRow;

const MAX_DETAIL_EVENTS: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactDetail {
    pub title: String,
    pub summary: String,
    pub rows: Vec<FactRow>,
    pub events: Vec<EventView>,
}

impl FactDetail {
    fn empty() -> FactDetail {
        FactDetail {
            title: "Fact Detail".to_string(),
            summary: "No detail available for this selection.".to_string(),
            rows: Vec::new(),
            events: Vec::new(),
        }
    }
}

fn row(label: impl Into<String>, value: impl ToString) -> FactRow {
    FactRow {
        label: label.into(),
        value: value.to_string(),
    }
}

/// Resolve one metric key (plus optional sub-key) to its provenance.
pub fn build_fact_detail(
    fact: &str,
    sub_key: Option<&str>,
    events: &[NewsEvent],
    home_kingdom: Option<&str>,
    wars: &[WarRow],
) -> FactDetail {
    match fact.trim().to_ascii_lowercase().as_str() {
        "total_events" => total_events_detail(events),
        "attack_success" => attack_success_detail(events),
        "home_net" => home_net_detail(events, home_kingdom, wars),
        "aid_shipments" => aid_shipments_detail(events),
        "wars" => wars_detail(wars),
        "war" => sub_key
            .map(|id| war_detail(id, wars))
            .unwrap_or_else(FactDetail::empty),
        "opponent" => sub_key
            .map(|coord| opponent_detail(coord, events, home_kingdom, wars))
            .unwrap_or_else(FactDetail::empty),
        _ => FactDetail::empty(),
    }
}

fn total_events_detail(events: &[NewsEvent]) -> FactDetail {
    let mut counts: BTreeMap<&'static str, u32> = BTreeMap::new();
    for event in events {
        *counts.entry(event.category.as_str()).or_default() += 1;
    }
    let mut rows: Vec<(&str, u32)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    FactDetail {
        title: "Total Events".to_string(),
        summary: format!("Parsed events in scope: {}.", events.len()),
        rows: rows.into_iter().map(|(label, count)| row(label, count)).collect(),
        events: Vec::new(),
    }
}

fn attack_success_detail(events: &[NewsEvent]) -> FactDetail {
    let attacks: Vec<&NewsEvent> = events
        .iter()
        .filter(|event| event.category == EventCategory::Attack)
        .collect();
    let successful = attacks
        .iter()
        .filter(|event| event.outcome == Some(Outcome::Success))
        .count();
    let failed = attacks
        .iter()
        .filter(|event| event.outcome == Some(Outcome::Failed))
        .count();
    let decided = successful + failed;
    let rate = if decided > 0 {
        (successful as f64 / decided as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    FactDetail {
        title: "Attack Success".to_string(),
        summary: format!("Success rate {rate}% ({successful} successful / {failed} failed)."),
        rows: vec![
            row("Successful Hits", successful),
            row("Failed Hits", failed),
            row("Total Attack Events", attacks.len()),
        ],
        events: attacks
            .into_iter()
            .filter(|event| event.outcome == Some(Outcome::Failed))
            .take(MAX_DETAIL_EVENTS)
            .map(enrich)
            .collect(),
    }
}

fn home_net_detail(
    events: &[NewsEvent],
    home_kingdom: Option<&str>,
    wars: &[WarRow],
) -> FactDetail {
    let swing = build_land_swing(events, home_kingdom, wars);
    let gained: i64 = swing.iter().map(|row| row.gained).sum();
    let lost: i64 = swing.iter().map(|row| row.lost).sum();
    let net = gained - lost;

    FactDetail {
        title: "Home Net Acres".to_string(),
        summary: format!("Home net is {net} (gained {gained} / lost {lost})."),
        rows: vec![row("Gained", gained), row("Lost", lost), row("Net", net)],
        events: Vec::new(),
    }
}

fn aid_shipments_detail(events: &[NewsEvent]) -> FactDetail {
    let mut flows: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    let mut shipments = 0u32;
    for event in events {
        if event.category != EventCategory::Aid {
            continue;
        }
        shipments += 1;
        if let Some(actor) = &event.actor {
            flows.entry(actor.to_string()).or_default().0 += 1;
        }
        if let Some(target) = &event.target {
            flows.entry(target.to_string()).or_default().1 += 1;
        }
    }
    let mut top: Vec<(String, (u32, u32))> = flows.into_iter().collect();
    top.sort_by(|a, b| {
        let total_a = a.1 .0 + a.1 .1;
        let total_b = b.1 .0 + b.1 .1;
        total_b
            .cmp(&total_a)
            .then_with(|| b.1 .0.cmp(&a.1 .0))
            .then_with(|| a.0.cmp(&b.0))
    });

    FactDetail {
        title: "Aid Shipments".to_string(),
        summary: format!("Total aid events in scope: {shipments}."),
        rows: top
            .into_iter()
            .take(12)
            .map(|(party, (sent, received))| row(party, format!("out {sent} / in {received}")))
            .collect(),
        events: Vec::new(),
    }
}

fn wars_detail(wars: &[WarRow]) -> FactDetail {
    let active = wars.iter().filter(|war| war.active).count();
    let completed = wars.len() - active;
    let victories = wars
        .iter()
        .filter(|war| war.result == warroom_parser::WarResult::Victory)
        .count();
    let failures = wars
        .iter()
        .filter(|war| war.result == warroom_parser::WarResult::Failed)
        .count();

    FactDetail {
        title: "War Summary".to_string(),
        summary: format!(
            "{active} active / {completed} completed. Victories {victories} / failures {failures}."
        ),
        rows: wars
            .iter()
            .map(|war| {
                row(
                    war.label(),
                    format!(
                        "hits {}:{} acres {}:{}",
                        war.hits_for, war.hits_against, war.acres_for, war.acres_against
                    ),
                )
            })
            .collect(),
        events: Vec::new(),
    }
}

fn war_detail(war_id: &str, wars: &[WarRow]) -> FactDetail {
    let Some(war) = wars.iter().find(|war| war.war_id.to_string() == war_id) else {
        return FactDetail::empty();
    };

    FactDetail {
        title: format!("War Detail: {}", war.opponent_name),
        summary: format!(
            "{} to {} [{}]. Hits {}:{} / Acres {}:{}.",
            war.start_day_text,
            war.end_day_text.as_deref().unwrap_or("-"),
            war.result,
            war.hits_for,
            war.hits_against,
            war.acres_for,
            war.acres_against,
        ),
        rows: vec![
            row(
                "Opponent Kingdom",
                war.opponent_kingdom.as_deref().unwrap_or("-"),
            ),
            row(
                "Post-war Expires",
                war.postwar_expires.as_deref().unwrap_or("-"),
            ),
            row(
                "Post-war Ended",
                war.postwar_end_day.as_deref().unwrap_or("-"),
            ),
            row("Net Acres", war.net_acres),
        ],
        events: Vec::new(),
    }
}

fn opponent_detail(
    coord: &str,
    events: &[NewsEvent],
    home_kingdom: Option<&str>,
    wars: &[WarRow],
) -> FactDetail {
    let pressure = build_opponent_pressure(events, home_kingdom, wars);
    let Some(opponent) = pressure.iter().find(|row| row.kingdom == coord) else {
        return FactDetail::empty();
    };

    FactDetail {
        title: format!("Opponent Pressure: {coord}"),
        summary: format!(
            "Hits {} for / {} against. Acres {} for / {} against (net {}).",
            opponent.hits_for,
            opponent.hits_against,
            opponent.acres_for,
            opponent.acres_against,
            opponent.net,
        ),
        rows: vec![
            row("Hits For", opponent.hits_for),
            row("Hits Against", opponent.hits_against),
            row("Acres For", opponent.acres_for),
            row("Acres Against", opponent.acres_against),
            row("Net", opponent.net),
        ],
        events: events
            .iter()
            .filter(|event| {
                event.category == EventCategory::Attack
                    && (event.actor_kingdom() == Some(coord)
                        || event.target_kingdom() == Some(coord))
            })
            .take(MAX_DETAIL_EVENTS)
            .map(enrich)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::line_event;
    use crate::wars::build_wars;

    fn sample() -> (Vec<NewsEvent>, Vec<WarRow>) {
        let events = vec![
            line_event("w1", "We have declared WAR on Stormwatch (2:7)!", Some((4, 1, 1))),
            line_event(
                "a1",
                "3 - Gold Rush (1:4) captured 120 acres of land from 5 - Maelstrom (2:7).",
                Some((4, 1, 2)),
            ),
            line_event(
                "a2",
                "5 - Maelstrom (2:7) attempted an invasion of 3 - Gold Rush (1:4), but was repelled.",
                Some((4, 1, 3)),
            ),
            line_event(
                "d1",
                "2 - Claim Jumper (1:4) has sent an aid shipment to 3 - Gold Rush (1:4).",
                Some((4, 1, 3)),
            ),
        ];
        let wars = build_wars(&events, Some("1:4"));
        (events, wars)
    }

    #[test]
    fn test_total_events_breaks_down_categories() {
        let (events, _) = sample();
        let detail = build_fact_detail("total_events", None, &events, Some("1:4"), &[]);
        assert_eq!(detail.summary, "Parsed events in scope: 4.");
        assert_eq!(detail.rows[0].label, "attack");
        assert_eq!(detail.rows[0].value, "2");
    }

    #[test]
    fn test_attack_success_lists_failed_events() {
        let (events, _) = sample();
        let detail = build_fact_detail("attack_success", None, &events, None, &[]);
        assert!(detail.summary.starts_with("Success rate 50%"));
        assert_eq!(detail.events.len(), 1);
        assert_eq!(detail.events[0].event.outcome, Some(Outcome::Failed));
    }

    #[test]
    fn test_home_net_matches_land_swing() {
        let (events, wars) = sample();
        let detail = build_fact_detail("home_net", None, &events, Some("1:4"), &wars);
        assert_eq!(detail.rows[0].value, "120");
        assert_eq!(detail.rows[2].value, "120");
    }

    #[test]
    fn test_war_detail_by_id() {
        let (events, wars) = sample();
        let detail = build_fact_detail("war", Some("1"), &events, Some("1:4"), &wars);
        assert_eq!(detail.title, "War Detail: Stormwatch");
        assert_eq!(detail.rows[0].value, "2:7");
    }

    #[test]
    fn test_opponent_detail_includes_its_attacks() {
        let (events, wars) = sample();
        let detail = build_fact_detail("opponent", Some("2:7"), &events, Some("1:4"), &wars);
        assert_eq!(detail.events.len(), 2);
        assert_eq!(detail.rows[0].value, "1");
    }

    #[test]
    fn test_unknown_fact_key_is_empty_not_an_error() {
        let (events, wars) = sample();
        let detail = build_fact_detail("mystery", None, &events, Some("1:4"), &wars);
        assert_eq!(detail.summary, "No detail available for this selection.");
        assert!(detail.rows.is_empty());

        let missing = build_fact_detail("war", Some("42"), &events, Some("1:4"), &wars);
        assert!(missing.rows.is_empty());
    }
}
