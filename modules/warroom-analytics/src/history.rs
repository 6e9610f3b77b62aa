//! Per-province history: every event the province sent or received, with
//! the role computed relative to that province, and aggregate counters over
//! the same set. Role is a view concept; nothing here is stored.

use serde::{Deserialize, Serialize};
use warroom_common::{AttackType, EventCategory, NewsEvent, Outcome};

use crate::view::{enrich, EventView};
use crate::wars::{in_home_war, WarRow};

/// How an event relates to the queried province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Sent,
    Received,
    Both,
}

/// Aggregate counters over one province's history. "Ops" unions the attack,
/// thievery, and magic categories; the attack counters stay category-pure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceStats {
    pub attacks_sent: u32,
    pub attacks_received: u32,
    pub aid_sent: u32,
    pub aid_received: u32,
    pub thievery_sent: u32,
    pub thievery_received: u32,
    pub magic_sent: u32,
    pub magic_received: u32,
    pub ops_sent: u32,
    pub ops_received: u32,
    pub gains: i64,
    pub losses: i64,
    pub net: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub view: EventView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceHistory {
    pub province: String,
    pub kingdom: Option<String>,
    pub stats: ProvinceStats,
    pub events: Vec<HistoryEntry>,
}

fn name_matches(party_name: Option<&str>, needle: &str) -> bool {
    party_name.is_some_and(|name| name.eq_ignore_ascii_case(needle))
}

fn kingdom_conflicts(party_kingdom: Option<&str>, wanted: Option<&str>) -> bool {
    match (party_kingdom, wanted) {
        (Some(actual), Some(wanted)) => actual != wanted,
        _ => false,
    }
}

/// Collect the history of one province by name, optionally pinned to a
/// kingdom coordinate (a name alone can collide across kingdoms). Unknown
/// provinces yield an empty history, not an error. Events keep the store's
/// query order.
pub fn build_province_history(
    province: &str,
    kingdom: Option<&str>,
    events: &[NewsEvent],
    home_kingdom: Option<&str>,
    wars: &[WarRow],
) -> ProvinceHistory {
    let needle = province.trim();
    let mut stats = ProvinceStats::default();
    let mut entries: Vec<HistoryEntry> = Vec::new();
    let mut resolved_kingdom = kingdom.map(str::to_string);

    for event in events {
        let mut actor_match = name_matches(
            event.actor.as_ref().map(|p| p.name.as_str()),
            needle,
        );
        let mut target_match = name_matches(
            event.target.as_ref().map(|p| p.name.as_str()),
            needle,
        );
        if actor_match && kingdom_conflicts(event.actor_kingdom(), kingdom) {
            actor_match = false;
        }
        if target_match && kingdom_conflicts(event.target_kingdom(), kingdom) {
            target_match = false;
        }
        if !actor_match && !target_match {
            continue;
        }

        if resolved_kingdom.is_none() {
            resolved_kingdom = if actor_match {
                event.actor_kingdom().map(str::to_string)
            } else {
                event.target_kingdom().map(str::to_string)
            };
        }

        let view = enrich(event);
        let war_context = in_home_war(
            event.event_day,
            event.actor_kingdom(),
            event.target_kingdom(),
            home_kingdom,
            wars,
        );
        let is_war_raze = war_context && event.attack_type == Some(AttackType::Raze);
        let success = event.outcome == Some(Outcome::Success);

        match event.category {
            EventCategory::Attack => {
                if actor_match {
                    stats.attacks_sent += 1;
                    if success && !is_war_raze && view.acres_transfer > 0 {
                        stats.gains += view.acres_transfer;
                    }
                }
                if target_match {
                    stats.attacks_received += 1;
                    if success && !is_war_raze {
                        let loss = if view.target_loss_acres > 0 {
                            view.target_loss_acres
                        } else {
                            event.acres.unwrap_or(0)
                        };
                        stats.losses += loss;
                    }
                }
            }
            EventCategory::Aid => {
                if actor_match {
                    stats.aid_sent += 1;
                }
                if target_match {
                    stats.aid_received += 1;
                }
            }
            EventCategory::Thievery => {
                if actor_match {
                    stats.thievery_sent += 1;
                }
                if target_match {
                    stats.thievery_received += 1;
                }
            }
            EventCategory::Magic => {
                if actor_match {
                    stats.magic_sent += 1;
                }
                if target_match {
                    stats.magic_received += 1;
                }
            }
            _ => {}
        }

        let role = match (actor_match, target_match) {
            (true, true) => Role::Both,
            (true, false) => Role::Sent,
            _ => Role::Received,
        };
        entries.push(HistoryEntry { role, view });
    }

    stats.ops_sent = stats.attacks_sent + stats.thievery_sent + stats.magic_sent;
    stats.ops_received = stats.attacks_received + stats.thievery_received + stats.magic_received;
    stats.net = stats.gains - stats.losses;

    ProvinceHistory {
        province: needle.to_string(),
        kingdom: resolved_kingdom,
        stats,
        events: entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::line_event;
    use crate::wars::build_wars;

    fn sample_events() -> Vec<NewsEvent> {
        vec![
            line_event(
                "a1",
                "3 - Gold Rush (1:4) captured 120 acres of land from 5 - Maelstrom (2:7).",
                Some((4, 1, 2)),
            ),
            line_event(
                "a2",
                "5 - Maelstrom (2:7) captured 40 acres of land from 3 - Gold Rush (1:4).",
                Some((4, 1, 3)),
            ),
            line_event(
                "d1",
                "2 - Claim Jumper (1:4) has sent an aid shipment to 3 - Gold Rush (1:4).",
                Some((4, 1, 3)),
            ),
            line_event(
                "o1",
                "[IntelSite] 3 - Gold Rush (1:4) used Fireball on 5 - Maelstrom (2:7). Result: success. Damage: 800.",
                Some((4, 1, 4)),
            ),
        ]
    }

    #[test]
    fn test_history_counts_roles_and_acres() {
        let history = build_province_history("Gold Rush", None, &sample_events(), None, &[]);

        assert_eq!(history.kingdom.as_deref(), Some("1:4"));
        assert_eq!(history.events.len(), 4);
        assert_eq!(history.events[0].role, Role::Sent);
        assert_eq!(history.events[1].role, Role::Received);

        let stats = history.stats;
        assert_eq!(stats.attacks_sent, 1);
        assert_eq!(stats.attacks_received, 1);
        assert_eq!(stats.aid_received, 1);
        assert_eq!(stats.magic_sent, 1);
        assert_eq!(stats.gains, 120);
        assert_eq!(stats.losses, 40);
        assert_eq!(stats.net, 80);
    }

    #[test]
    fn test_ops_union_spans_attack_thievery_magic() {
        let stats = build_province_history("Gold Rush", None, &sample_events(), None, &[]).stats;
        assert_eq!(stats.ops_sent, stats.attacks_sent + stats.thievery_sent + stats.magic_sent);
        assert_eq!(stats.ops_sent, 2);
        assert_eq!(stats.ops_received, 1);
    }

    #[test]
    fn test_kingdom_pin_excludes_namesakes() {
        let history =
            build_province_history("Gold Rush", Some("9:9"), &sample_events(), None, &[]);
        assert!(history.events.is_empty());
        assert_eq!(history.stats, ProvinceStats::default());
    }

    #[test]
    fn test_unknown_province_yields_empty_history() {
        let history = build_province_history("Nowhere", None, &sample_events(), None, &[]);
        assert!(history.events.is_empty());
        assert_eq!(history.kingdom, None);
    }

    #[test]
    fn test_war_raze_does_not_count_as_loss() {
        let mut events = vec![line_event(
            "w1",
            "We have declared WAR on Stormwatch (2:7)!",
            Some((4, 1, 1)),
        )];
        events.push(line_event(
            "a1",
            "5 - Maelstrom (2:7) invaded 3 - Gold Rush (1:4) and razed 150 acres of land.",
            Some((4, 1, 2)),
        ));
        let wars = build_wars(&events, Some("1:4"));

        let in_war =
            build_province_history("Gold Rush", None, &events, Some("1:4"), &wars).stats;
        assert_eq!(in_war.attacks_received, 1);
        assert_eq!(in_war.losses, 0);

        let peacetime = build_province_history("Gold Rush", None, &events, None, &[]).stats;
        assert_eq!(peacetime.losses, 150);
    }
}
