//! War ledger. Diplomacy banners open and close wars; attack events inside
//! a war's day window tally hits and acres for each side. A Raze inside a
//! war burns buildings without moving land, so its acres count zero there.

use serde::{Deserialize, Serialize};
use warroom_common::{EventCategory, EventDay, NewsEvent, Outcome, Party};
use warroom_parser::war::{self, WarEventKind, WarResult};
use warroom_parser::{attack, effective_land_impact};

use crate::view::{enrich, EventView};

/// One war on the ledger, opponent and running tallies included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarRow {
    pub war_id: u32,
    pub opponent_name: String,
    pub opponent_kingdom: Option<String>,
    pub start_day: Option<EventDay>,
    pub start_day_text: String,
    pub end_day: Option<EventDay>,
    pub end_day_text: Option<String>,
    pub result: WarResult,
    pub active: bool,
    pub postwar_expires: Option<String>,
    pub postwar_end_day: Option<String>,
    pub hits_for: u32,
    pub hits_against: u32,
    pub acres_for: i64,
    pub acres_against: i64,
    pub net_acres: i64,
}

impl WarRow {
    /// One-line label used by detail views.
    pub fn label(&self) -> String {
        format!(
            "{} -> {} vs {} ({}) [{}]",
            self.start_day_text,
            self.end_day_text.as_deref().unwrap_or("-"),
            self.opponent_name,
            self.opponent_kingdom.as_deref().unwrap_or("?"),
            self.result,
        )
    }
}

/// Whether a dated event falls inside a war's open window. Wars without a
/// dated start never match; an open war matches everything from its start on.
pub fn day_in_war(day: Option<EventDay>, row: &WarRow) -> bool {
    let (Some(day), Some(start)) = (day, row.start_day) else {
        return false;
    };
    if day < start {
        return false;
    }
    match row.end_day {
        Some(end) => day <= end,
        None => true,
    }
}

/// Whether an attack between these kingdoms, on this day, happened inside a
/// war the home kingdom was fighting.
pub fn in_home_war(
    day: Option<EventDay>,
    actor_kingdom: Option<&str>,
    target_kingdom: Option<&str>,
    home_kingdom: Option<&str>,
    wars: &[WarRow],
) -> bool {
    let Some(home) = home_kingdom else {
        return false;
    };
    let opponent = match (actor_kingdom, target_kingdom) {
        (Some(actor), Some(target)) if actor == home && target != home => target,
        (Some(actor), Some(target)) if target == home && actor != home => actor,
        _ => return false,
    };
    wars.iter().any(|row| {
        row.opponent_kingdom.as_deref() == Some(opponent) && day_in_war(day, row)
    })
}

/// Fold the scope's events into the war ledger. Declarations open wars,
/// ending banners close the matching open war (by opponent kingdom, then
/// name, then most recent), post-war banners annotate the last closed war.
/// With a home kingdom known, attack events inside each window tally hits
/// and effective acres per side.
pub fn build_wars(events: &[NewsEvent], home_kingdom: Option<&str>) -> Vec<WarRow> {
    let mut wars: Vec<WarRow> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut war_seq = 0u32;

    // Banner phrasing does not always carry a diplomacy keyword (post-war
    // notices in particular), so every summary is probed.
    for event in events {
        let Some(kind) = war::classify_war_event(&event.summary) else {
            continue;
        };

        match kind {
            WarEventKind::Declare => {
                war_seq += 1;
                let opponent_raw = war::extract_war_opponent(&event.summary);
                let opponent = opponent_raw.as_deref().and_then(Party::from_raw);
                wars.push(WarRow {
                    war_id: war_seq,
                    opponent_name: opponent
                        .as_ref()
                        .map(|p| p.name.clone())
                        .or(opponent_raw)
                        .unwrap_or_else(|| "Unknown Kingdom".to_string()),
                    opponent_kingdom: opponent.and_then(|p| p.kingdom),
                    start_day: event.event_day,
                    start_day_text: event
                        .event_time_text
                        .clone()
                        .unwrap_or_else(|| "-".to_string()),
                    end_day: None,
                    end_day_text: None,
                    result: WarResult::Active,
                    active: true,
                    postwar_expires: None,
                    postwar_end_day: None,
                    hits_for: 0,
                    hits_against: 0,
                    acres_for: 0,
                    acres_against: 0,
                    net_acres: 0,
                });
                open.push(wars.len() - 1);
            }
            WarEventKind::End => {
                let opponent_raw = war::extract_war_opponent(&event.summary);
                let opponent = opponent_raw.as_deref().and_then(Party::from_raw);
                let opponent_kingdom = opponent.as_ref().and_then(|p| p.kingdom.clone());
                let opponent_name = opponent.map(|p| p.name);

                let Some(idx) = find_open_war(&wars, &open, &opponent_kingdom, &opponent_name)
                else {
                    continue;
                };
                let row = &mut wars[idx];
                row.end_day = event.event_day;
                row.end_day_text = event.event_time_text.clone();
                row.result = war::classify_war_result(&event.summary);
                row.active = false;
                open.retain(|&i| i != idx);
            }
            WarEventKind::PostwarStart => {
                let Some(expiry) = war::postwar_expiry(&event.summary) else {
                    continue;
                };
                if let Some(row) = wars
                    .iter_mut()
                    .rev()
                    .find(|row| !row.active && row.postwar_expires.is_none())
                {
                    row.postwar_expires = Some(expiry);
                }
            }
            WarEventKind::PostwarEnd => {
                if let Some(row) = wars
                    .iter_mut()
                    .rev()
                    .find(|row| row.postwar_expires.is_some() && row.postwar_end_day.is_none())
                {
                    row.postwar_end_day = event.event_time_text.clone();
                }
            }
        }
    }

    if let Some(home) = home_kingdom {
        let attack_views: Vec<EventView> = events
            .iter()
            .filter(|event| event.category == EventCategory::Attack)
            .map(enrich)
            .collect();

        for row in &mut wars {
            let Some(opponent) = row.opponent_kingdom.clone() else {
                continue;
            };
            for view in &attack_views {
                if !day_in_war(view.event.event_day, row) {
                    continue;
                }
                let attack_type = view
                    .event
                    .attack_type
                    .unwrap_or_else(|| attack::classify_attack_type(&view.event.summary));
                let impact = effective_land_impact(
                    view.acres_transfer,
                    view.target_loss_acres,
                    attack_type,
                    true,
                );
                let actor_kingdom = view.event.actor_kingdom();
                let target_kingdom = view.event.target_kingdom();
                let success = view.event.outcome == Some(Outcome::Success);

                if actor_kingdom == Some(home) && target_kingdom == Some(opponent.as_str()) {
                    row.hits_for += 1;
                    if success && impact > 0 {
                        row.acres_for += impact;
                    }
                } else if actor_kingdom == Some(opponent.as_str()) && target_kingdom == Some(home)
                {
                    row.hits_against += 1;
                    if success && impact > 0 {
                        row.acres_against += impact;
                    }
                }
            }
            row.net_acres = row.acres_for - row.acres_against;
        }
    }

    // Most recent war first; undated declarations sink to the bottom.
    wars.sort_by(|a, b| {
        b.start_day
            .cmp(&a.start_day)
            .then_with(|| b.war_id.cmp(&a.war_id))
    });
    wars
}

fn find_open_war(
    wars: &[WarRow],
    open: &[usize],
    opponent_kingdom: &Option<String>,
    opponent_name: &Option<String>,
) -> Option<usize> {
    for &idx in open.iter().rev() {
        if let Some(coord) = opponent_kingdom {
            if wars[idx].opponent_kingdom.as_deref() == Some(coord.as_str()) {
                return Some(idx);
            }
        }
        if let Some(name) = opponent_name {
            if wars[idx].opponent_name.eq_ignore_ascii_case(name) {
                return Some(idx);
            }
        }
    }
    open.last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::line_event;

    #[test]
    fn test_declare_and_end_close_one_war() {
        let events = vec![
            line_event("w1", "We have declared WAR on Stormwatch (2:7)!", Some((4, 1, 2))),
            line_event(
                "w2",
                "We have won the war with Stormwatch (2:7)!",
                Some((4, 1, 20)),
            ),
        ];
        let wars = build_wars(&events, None);
        assert_eq!(wars.len(), 1);
        assert_eq!(wars[0].opponent_name, "Stormwatch");
        assert_eq!(wars[0].opponent_kingdom.as_deref(), Some("2:7"));
        assert_eq!(wars[0].result, WarResult::Victory);
        assert!(!wars[0].active);
        assert_eq!(wars[0].end_day, Some(EventDay::new(4, 1, 20)));
    }

    #[test]
    fn test_undeclared_end_is_ignored() {
        let events = vec![line_event(
            "w1",
            "The war with Stormwatch (2:7) has finally ended.",
            Some((4, 1, 20)),
        )];
        assert!(build_wars(&events, None).is_empty());
    }

    #[test]
    fn test_war_tallies_hits_and_acres_per_side() {
        let events = vec![
            line_event("w1", "We have declared WAR on Stormwatch (2:7)!", Some((4, 1, 2))),
            line_event(
                "a1",
                "3 - Gold Rush (1:4) captured 120 acres of land from 5 - Maelstrom (2:7).",
                Some((4, 1, 5)),
            ),
            line_event(
                "a2",
                "5 - Maelstrom (2:7) captured 30 acres of land from 3 - Gold Rush (1:4).",
                Some((4, 1, 6)),
            ),
            // Outside the window: before the declaration.
            line_event(
                "a3",
                "3 - Gold Rush (1:4) captured 999 acres of land from 5 - Maelstrom (2:7).",
                Some((4, 1, 1)),
            ),
        ];
        let wars = build_wars(&events, Some("1:4"));
        assert_eq!(wars.len(), 1);
        assert_eq!(wars[0].hits_for, 1);
        assert_eq!(wars[0].hits_against, 1);
        assert_eq!(wars[0].acres_for, 120);
        assert_eq!(wars[0].acres_against, 30);
        assert_eq!(wars[0].net_acres, 90);
    }

    #[test]
    fn test_war_raze_counts_zero_acres() {
        let events = vec![
            line_event("w1", "We have declared WAR on Stormwatch (2:7)!", Some((4, 1, 2))),
            line_event(
                "a1",
                "3 - Gold Rush (1:4) invaded 5 - Maelstrom (2:7) and razed 150 acres of land.",
                Some((4, 1, 5)),
            ),
        ];
        let wars = build_wars(&events, Some("1:4"));
        assert_eq!(wars[0].hits_for, 1);
        assert_eq!(wars[0].acres_for, 0);
    }

    #[test]
    fn test_postwar_banners_annotate_last_closed_war() {
        let events = vec![
            line_event("w1", "We have declared WAR on Stormwatch (2:7)!", Some((4, 1, 2))),
            line_event(
                "w2",
                "We have won the war with Stormwatch (2:7)!",
                Some((4, 1, 20)),
            ),
            line_event(
                "w3",
                "Our kingdom is now in a post-war period which will expire on February 2 of YR4.",
                Some((4, 1, 21)),
            ),
            line_event("w4", "Our post-war period has ended!", Some((4, 2, 2))),
        ];
        let wars = build_wars(&events, None);
        assert_eq!(wars[0].postwar_expires.as_deref(), Some("February 2 of YR4"));
        assert_eq!(wars[0].postwar_end_day.as_deref(), Some("February 2 of YR4"));
    }

    #[test]
    fn test_in_home_war_requires_home_side() {
        let events = vec![line_event(
            "w1",
            "We have declared WAR on Stormwatch (2:7)!",
            Some((4, 1, 2)),
        )];
        let wars = build_wars(&events, Some("1:4"));
        let day = Some(EventDay::new(4, 1, 5));

        assert!(in_home_war(day, Some("1:4"), Some("2:7"), Some("1:4"), &wars));
        assert!(in_home_war(day, Some("2:7"), Some("1:4"), Some("1:4"), &wars));
        // Neither side is home.
        assert!(!in_home_war(day, Some("3:3"), Some("2:7"), Some("1:4"), &wars));
        // Undated events never match a window.
        assert!(!in_home_war(None, Some("1:4"), Some("2:7"), Some("1:4"), &wars));
    }
}
