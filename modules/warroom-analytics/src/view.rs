//! Event enrichment. Stored rows keep the normalized summary; the detail
//! figures an operator drills into (transfer vs loss acres, op gain/damage)
//! are re-derived from that summary on demand, so the log never needs a
//! schema change when a new figure becomes interesting.

use serde::{Deserialize, Serialize};
use warroom_common::{EventCategory, NewsEvent, Outcome};
use warroom_parser::{attack, ops};

/// A stored event plus the per-category figures its summary carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventView {
    pub event: NewsEvent,
    /// Acres that changed hands (attacks only).
    pub acres_transfer: i64,
    /// Acres the target lost, whether transferred or destroyed.
    pub target_loss_acres: i64,
    pub op_name: Option<String>,
    pub op_gain: Option<i64>,
    pub op_damage: Option<i64>,
    pub op_duration_ticks: Option<i64>,
}

impl EventView {
    pub fn actor_name(&self) -> Option<&str> {
        self.event.actor.as_ref().map(|p| p.name.as_str())
    }

    pub fn target_name(&self) -> Option<&str> {
        self.event.target.as_ref().map(|p| p.name.as_str())
    }

    pub fn is_successful_attack(&self) -> bool {
        self.event.category == EventCategory::Attack
            && self.event.outcome == Some(Outcome::Success)
    }
}

/// Re-read the summary of one stored event. Total: a summary that matches no
/// template yields a view with zeroed attack figures and no op fields.
pub fn enrich(event: &NewsEvent) -> EventView {
    let mut view = EventView {
        event: event.clone(),
        acres_transfer: 0,
        target_loss_acres: 0,
        op_name: None,
        op_gain: None,
        op_damage: None,
        op_duration_ticks: None,
    };

    match event.category {
        EventCategory::Attack => {
            let report = attack::parse_attack(&event.summary);
            view.acres_transfer = report.acres_transfer;
            view.target_loss_acres = report.target_loss_acres;
        }
        EventCategory::Thievery | EventCategory::Magic => {
            let report = ops::parse_op(&event.summary);
            view.op_name = report.op_name;
            view.op_gain = report.gain;
            view.op_damage = report.damage;
            view.op_duration_ticks = report.duration_ticks;
        }
        _ => {}
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::make_event;
    use warroom_common::AttackType;

    #[test]
    fn test_enrich_attack_recovers_raze_split() {
        let mut event = make_event("h1", EventCategory::Attack, None, None, Some((4, 1, 2)));
        event.summary = "3 - Gold Rush (1:4) razed 200 acres of 5 - Maelstrom.".to_string();
        event.attack_type = Some(AttackType::Raze);

        let view = enrich(&event);
        assert_eq!(view.acres_transfer, 0);
        assert_eq!(view.target_loss_acres, 200);
        assert_eq!(view.op_name, None);
    }

    #[test]
    fn test_enrich_op_recovers_figures() {
        let mut event = make_event("h2", EventCategory::Thievery, None, None, Some((4, 1, 2)));
        event.summary =
            "[IntelSite] 3 - Gold Rush (1:4) used Rob the Vaults on 5 - Maelstrom (2:7). Result: success. Gain: 52,140."
                .to_string();

        let view = enrich(&event);
        assert_eq!(view.op_name.as_deref(), Some("Rob the Vaults"));
        assert_eq!(view.op_gain, Some(52_140));
        assert_eq!(view.acres_transfer, 0);
    }

    #[test]
    fn test_enrich_other_category_is_bare() {
        let event = make_event("h3", EventCategory::Other, None, None, None);
        let view = enrich(&event);
        assert_eq!(view.acres_transfer, 0);
        assert_eq!(view.op_gain, None);
    }
}
