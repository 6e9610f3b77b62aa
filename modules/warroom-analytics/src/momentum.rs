//! Momentum: per-day, per-category event counts. Sparse: days and
//! categories with no events produce no row; consumers fill gaps with zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use warroom_common::{EventCategory, EventDay, NewsEvent};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MomentumRow {
    pub day: EventDay,
    pub category: EventCategory,
    pub count: u32,
}

/// Count events by `(day, category)`. Undated events stay out of the rollup.
/// Rows come back sorted by day, then category name, so repeated runs over
/// the same data are byte-identical.
pub fn build_momentum(events: &[NewsEvent]) -> Vec<MomentumRow> {
    let mut counts: BTreeMap<(EventDay, &'static str), (EventCategory, u32)> = BTreeMap::new();
    for event in events {
        let Some(day) = event.event_day else {
            continue;
        };
        counts
            .entry((day, event.category.as_str()))
            .and_modify(|(_, count)| *count += 1)
            .or_insert((event.category, 1));
    }

    counts
        .into_iter()
        .map(|((day, _), (category, count))| MomentumRow {
            day,
            category,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::make_event;

    #[test]
    fn test_momentum_groups_by_day_and_category() {
        let events = vec![
            make_event("h1", EventCategory::Attack, None, None, Some((4, 1, 2))),
            make_event("h2", EventCategory::Attack, None, None, Some((4, 1, 2))),
            make_event("h3", EventCategory::Aid, None, None, Some((4, 1, 2))),
            make_event("h4", EventCategory::Attack, None, None, Some((4, 1, 3))),
        ];
        let rows = build_momentum(&events);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            MomentumRow {
                day: EventDay::new(4, 1, 2),
                category: EventCategory::Aid,
                count: 1,
            }
        );
        assert_eq!(rows[1].category, EventCategory::Attack);
        assert_eq!(rows[1].count, 2);
        assert_eq!(rows[2].day, EventDay::new(4, 1, 3));
    }

    #[test]
    fn test_momentum_skips_undated_events() {
        let events = vec![
            make_event("h1", EventCategory::Attack, None, None, None),
            make_event("h2", EventCategory::Attack, None, None, Some((4, 1, 2))),
        ];
        let rows = build_momentum(&events);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 1);
    }

    #[test]
    fn test_momentum_is_order_stable() {
        let mut events = vec![
            make_event("h1", EventCategory::Magic, None, None, Some((4, 1, 2))),
            make_event("h2", EventCategory::Attack, None, None, Some((4, 1, 1))),
            make_event("h3", EventCategory::Thievery, None, None, Some((4, 1, 2))),
        ];
        let forward = build_momentum(&events);
        events.reverse();
        assert_eq!(build_momentum(&events), forward);
    }
}
