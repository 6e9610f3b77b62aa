//! Report block parsing: one normalized feed line in, one structured event
//! out. Parsing is total. A block that matches nothing still becomes an
//! `other` event with its hash and summary intact, so a feed page never
//! loses rows to phrasing drift.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use warroom_common::{AttackType, EventCategory, EventDay, NewsEvent, Outcome, Party};

use crate::{attack, matchers, ops, text};

// The in-game day prefix, e.g. "January 12 of YR4 ". Case-sensitive: the
// feed always capitalizes month names, and loose matching would eat report
// bodies that merely mention a month.
static TIME_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<time>(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d+\s+of\s+YR\d+)\s+(?P<rest>.+)$",
    )
    .unwrap()
});

/// One parsed report block, not yet bound to a scope or fetch time.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvent {
    pub content_hash: String,
    pub event_time_text: Option<String>,
    pub event_day: Option<EventDay>,
    pub category: EventCategory,
    pub attack_type: Option<AttackType>,
    pub actor: Option<Party>,
    pub target: Option<Party>,
    pub outcome: Option<Outcome>,
    pub acres: Option<i64>,
    pub summary: String,
}

impl ParsedEvent {
    /// Bind the block to the scope it was fetched for and the wall-clock
    /// fetch time.
    pub fn into_event(self, scope: &str, fetched_at: DateTime<Utc>) -> NewsEvent {
        NewsEvent {
            scope: scope.to_string(),
            content_hash: self.content_hash,
            fetched_at,
            event_time_text: self.event_time_text,
            event_day: self.event_day,
            category: self.category,
            attack_type: self.attack_type,
            actor: self.actor,
            target: self.target,
            outcome: self.outcome,
            acres: self.acres,
            summary: self.summary,
        }
    }
}

/// Parse a whole feed page: one event per non-empty line. Repeated lines
/// produce repeated events; collapsing duplicates is the store's job, keyed
/// by content hash.
pub fn parse_page(page: &str) -> Vec<ParsedEvent> {
    page.lines()
        .map(text::normalize_line)
        .filter(|line| !line.is_empty())
        .map(|line| parse_block(&line))
        .collect()
}

/// Parse one report block.
pub fn parse_block(raw: &str) -> ParsedEvent {
    let line = text::normalize_line(raw);
    let content_hash = text::content_hash(&line);

    let (event_time_text, body) = match TIME_PREFIX_RE.captures(&line) {
        Some(caps) => (Some(caps["time"].to_string()), caps["rest"].to_string()),
        None => (None, line.clone()),
    };
    let event_day = event_time_text.as_deref().and_then(EventDay::parse);

    let category = matchers::classify(&body);

    let mut attack_type = None;
    let mut outcome = None;
    let mut acres = None;
    let mut actor_raw: Option<String> = None;
    let mut target_raw: Option<String> = None;

    match category {
        EventCategory::Attack => {
            let report = attack::parse_attack(&body);
            // Stored impact is the peacetime reading; war-aware corrections
            // happen downstream where the war ledger is known.
            let impact = attack::effective_land_impact(
                report.acres_transfer,
                report.target_loss_acres,
                report.attack_type,
                false,
            );
            attack_type = Some(report.attack_type);
            outcome = Some(report.outcome);
            acres = (impact > 0).then_some(impact);
            actor_raw = report.actor_raw;
            target_raw = report.target_raw;
        }
        EventCategory::Aid => {
            if let Some(caps) = matchers::AID_RE.captures(&body) {
                actor_raw = Some(caps["actor"].to_string());
                target_raw = Some(caps["target"].to_string());
            }
        }
        EventCategory::Thievery | EventCategory::Magic => {
            let report = ops::parse_op(&body);
            outcome = report.outcome;
            actor_raw = report.actor_raw;
            target_raw = report.target_raw;
        }
        _ => {}
    }

    // Blocks whose category carries no party capture of its own still often
    // name two provinces in the standard slot-coordinate form.
    if actor_raw.is_none() && target_raw.is_none() {
        if let Some(caps) = matchers::PARTY_PAIR_RE.captures(&body) {
            actor_raw = Some(caps["actor"].to_string());
            target_raw = Some(caps["target"].to_string());
        }
    }

    ParsedEvent {
        content_hash,
        event_time_text,
        event_day,
        category,
        attack_type,
        actor: actor_raw.as_deref().and_then(Party::from_raw),
        target: target_raw.as_deref().and_then(Party::from_raw),
        outcome,
        acres,
        summary: body,
    }
}
