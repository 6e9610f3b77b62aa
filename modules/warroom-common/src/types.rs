use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

// --- Categories ---

/// Fixed classification for a kingdom news report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Attack,
    Aid,
    Diplomacy,
    Dragon,
    Thievery,
    Magic,
    Other,
}

impl EventCategory {
    pub const ALL: [EventCategory; 7] = [
        EventCategory::Attack,
        EventCategory::Aid,
        EventCategory::Diplomacy,
        EventCategory::Dragon,
        EventCategory::Thievery,
        EventCategory::Magic,
        EventCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Attack => "attack",
            EventCategory::Aid => "aid",
            EventCategory::Diplomacy => "diplomacy",
            EventCategory::Dragon => "dragon",
            EventCategory::Thievery => "thievery",
            EventCategory::Magic => "magic",
            EventCategory::Other => "other",
        }
    }

    /// Total parse: anything unrecognized lands in `Other`, matching the
    /// parser's never-drop policy on the read side.
    pub fn parse(s: &str) -> EventCategory {
        match s.trim().to_ascii_lowercase().as_str() {
            "attack" => EventCategory::Attack,
            "aid" => EventCategory::Aid,
            "diplomacy" => EventCategory::Diplomacy,
            "dragon" => EventCategory::Dragon,
            "thievery" => EventCategory::Thievery,
            "magic" => EventCategory::Magic,
            _ => EventCategory::Other,
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Attack sub-classification, derived from the report's phrasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    TraditionalMarch,
    Ambush,
    Raze,
    Massacre,
    Plunder,
    Learn,
    Conquest,
    Other,
}

impl AttackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttackType::TraditionalMarch => "traditional_march",
            AttackType::Ambush => "ambush",
            AttackType::Raze => "raze",
            AttackType::Massacre => "massacre",
            AttackType::Plunder => "plunder",
            AttackType::Learn => "learn",
            AttackType::Conquest => "conquest",
            AttackType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> AttackType {
        match s.trim().to_ascii_lowercase().as_str() {
            "traditional_march" => AttackType::TraditionalMarch,
            "ambush" => AttackType::Ambush,
            "raze" => AttackType::Raze,
            "massacre" => AttackType::Massacre,
            "plunder" => AttackType::Plunder,
            "learn" => AttackType::Learn,
            "conquest" => AttackType::Conquest,
            _ => AttackType::Other,
        }
    }

    /// Human label used in summaries and detail views.
    pub fn label(&self) -> &'static str {
        match self {
            AttackType::TraditionalMarch => "Traditional March",
            AttackType::Ambush => "Ambush",
            AttackType::Raze => "Raze",
            AttackType::Massacre => "Massacre",
            AttackType::Plunder => "Plunder",
            AttackType::Learn => "Learn",
            AttackType::Conquest => "Conquest",
            AttackType::Other => "Other",
        }
    }
}

impl fmt::Display for AttackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failed,
    Partial,
    Unknown,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failed => "failed",
            Outcome::Partial => "partial",
            Outcome::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Outcome {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Outcome::Success,
            "failed" => Outcome::Failed,
            "partial" => Outcome::Partial,
            _ => Outcome::Unknown,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// --- Event days ---

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

static EVENT_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(January|February|March|April|May|June|July|August|September|October|November|December)\s+(\d+)\s+of\s+YR(\d+)$",
    )
    .unwrap()
});

/// The feed's own calendar ordinal: "<Month> <day> of YR<year>".
///
/// Ordering is derived from the field order, so day keys sort
/// chronologically. Persisted as a single integer (`ordinal`) so SQLite can
/// sort day-bucketed queries without re-parsing labels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EventDay {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl EventDay {
    pub fn new(year: u16, month: u8, day: u8) -> EventDay {
        EventDay { year, month, day }
    }

    /// Parse the feed's time label. Unrecognized labels yield `None`; such
    /// events stay out of day-bucketed rollups but are kept in raw history.
    pub fn parse(text: &str) -> Option<EventDay> {
        let caps = EVENT_DAY_RE.captures(text.trim())?;
        let month = MONTH_NAMES
            .iter()
            .position(|name| *name == &caps[1])
            .map(|idx| idx as u8 + 1)?;
        let day: u8 = caps[2].parse().ok()?;
        let year: u16 = caps[3].parse().ok()?;
        Some(EventDay { year, month, day })
    }

    /// Sortable integer form, `year * 10_000 + month * 100 + day`.
    pub fn ordinal(&self) -> i64 {
        self.year as i64 * 10_000 + self.month as i64 * 100 + self.day as i64
    }

    pub fn from_ordinal(ordinal: i64) -> Option<EventDay> {
        if ordinal <= 0 {
            return None;
        }
        let year = ordinal / 10_000;
        let month = (ordinal / 100) % 100;
        let day = ordinal % 100;
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return None;
        }
        Some(EventDay {
            year: year as u16,
            month: month as u8,
            day: day as u8,
        })
    }
}

impl fmt::Display for EventDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let month = (self.month as usize)
            .checked_sub(1)
            .and_then(|index| MONTH_NAMES.get(index))
            .copied()
            .unwrap_or("Unknown");
        write!(f, "{} {} of YR{}", month, self.day, self.year)
    }
}

// --- Parties ---

static LEADING_SLOT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\s*-\s*").unwrap());
static KINGDOM_COORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*(\d+:\d+)\s*\)").unwrap());

/// A reporting or affected party: province name plus its kingdom coordinate
/// when one was mentioned. Feed mentions look like `"3 - Maelstrom (1:4)"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub kingdom: Option<String>,
}

impl Party {
    /// Normalize a raw party mention: strip the leading slot number, pull
    /// out the `(N:N)` coordinate, collapse whitespace. Returns `None` when
    /// nothing usable remains. Partial extraction is valid; a missing party
    /// never invalidates the event.
    pub fn from_raw(raw: &str) -> Option<Party> {
        let trimmed = raw.trim().trim_end_matches('.');
        if trimmed.is_empty() {
            return None;
        }

        let kingdom = KINGDOM_COORD_RE
            .captures(trimmed)
            .map(|caps| caps[1].to_string());

        let without_slot = LEADING_SLOT_RE.replace(trimmed, "");
        let without_coord = KINGDOM_COORD_RE.replace_all(&without_slot, "");
        let name = without_coord
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .trim_matches(|c: char| c == '-' || c.is_whitespace())
            .to_string();

        if name.is_empty() {
            return None;
        }
        Some(Party { name, kingdom })
    }

    /// Extract just the kingdom coordinate from a raw mention.
    pub fn kingdom_of(raw: &str) -> Option<String> {
        KINGDOM_COORD_RE
            .captures(raw)
            .map(|caps| caps[1].to_string())
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kingdom {
            Some(coord) => write!(f, "{} ({})", self.name, coord),
            None => write!(f, "{}", self.name),
        }
    }
}

// --- Events ---

/// One immutable reported happening. `(scope, content_hash)` is the identity:
/// re-fetching a page that reproduces a stored event is a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsEvent {
    pub scope: String,
    pub content_hash: String,
    pub fetched_at: DateTime<Utc>,
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

impl NewsEvent {
    pub fn actor_kingdom(&self) -> Option<&str> {
        self.actor.as_ref().and_then(|p| p.kingdom.as_deref())
    }

    pub fn target_kingdom(&self) -> Option<&str> {
        self.target.as_ref().and_then(|p| p.kingdom.as_deref())
    }
}

// --- Snapshots ---

/// Point-in-time capture of one kingdom's headline stats, keyed by
/// `(scope, kingdom, fetched_at)`. Append-only; swings are computed from
/// consecutive-snapshot deltas, independent of the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KingdomSnapshot {
    pub scope: String,
    pub kingdom: String,
    pub name: String,
    pub fetched_at: DateTime<Utc>,
    pub land: Option<i64>,
    pub networth: Option<i64>,
    pub honor: Option<i64>,
    pub avg_land: Option<i64>,
    pub avg_networth: Option<i64>,
    pub land_rank: Option<i64>,
    pub networth_rank: Option<i64>,
    pub honor_rank: Option<i64>,
    pub provinces: Option<i64>,
    pub stance: Option<String>,
}

/// Per-province row from the same kingdom page capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvinceSnapshot {
    pub scope: String,
    pub kingdom: String,
    pub province: String,
    pub fetched_at: DateTime<Utc>,
    pub slot: Option<i64>,
    pub race: Option<String>,
    pub land: Option<i64>,
    pub networth: Option<i64>,
    pub nwpa: Option<f64>,
    pub nobility: Option<String>,
}
