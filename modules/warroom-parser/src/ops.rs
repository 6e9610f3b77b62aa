//! Operation report extraction. `[IntelSite]` rows carry the operation name,
//! a `Result:` verdict, and optional `Gain:`/`Damage:`/`Duration:` figures.
//! The support/intel/hostile taxonomy and the per-operation weights behind
//! impact scoring live here as well.

use std::sync::LazyLock;

use regex::Regex;
use warroom_common::{EventCategory, Outcome};

use crate::text;

static INTEL_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\[IntelSite\]\s+(?P<actor>.+?)\s+used\s+(?P<op>.+?)(?:\s+on\s+(?P<target>.+?))?\.\s+Result:",
    )
    .unwrap()
});
static RESULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Result:\s*(success|failed|partial|unknown)").unwrap()
});
static GAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Gain:\s*(?P<value>[-\d,]+)").unwrap());
static DAMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Damage:\s*(?P<value>[-\d,]+)").unwrap());
static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Duration:\s*(?P<value>\d+)\s*ticks?").unwrap());

/// Operation names whose presence marks a thievery report; everything else
/// under the intel banner is sorcery.
const THIEVERY_OP_TOKENS: &[&str] = &[
    "spy",
    "survey",
    "infiltrate",
    "rob",
    "kidnap",
    "bribe",
    "night strike",
    "incite",
];

/// Self-cast operations that never target an enemy.
const SUPPORT_OP_NAMES: &[&str] = &[
    "minor protection",
    "greater protection",
    "magic shield",
    "fertile lands",
    "inspire army",
    "fanaticism",
    "bloodlust",
    "patriotism",
    "town watch",
    "quick feet",
    "aggression",
    "war spoils",
    "nature's blessing",
    "builders boon",
    "fountain of knowledge",
    "love and peace",
    "mystic aura",
    "reflect magic",
    "animate dead",
    "ghost workers",
    "miner's mystique",
    "mind focus",
    "mist",
    "revelation",
    "mage's fury",
    "guile",
    "invisibility",
];

/// Reconnaissance operations: they gather information rather than do damage.
const INTEL_OP_TOKENS: &[&str] = &[
    "spy",
    "survey",
    "crystal ball",
    "revelation",
    "shadow light",
    "illuminate shadows",
    "infiltrate",
];

/// Baseline disruption score per hostile operation; unlisted operations
/// score 5.0.
const OP_IMPACT_WEIGHTS: &[(&str, f64)] = &[
    ("night strike", 12.0),
    ("propaganda", 12.0),
    ("arson", 10.0),
    ("greater arson", 12.0),
    ("assassinate thieves", 11.0),
    ("assassinate wizards", 11.0),
    ("kidnap", 8.0),
    ("rob the vaults", 8.0),
    ("rob the towers", 6.0),
    ("incite riots", 7.0),
    ("bribe generals", 8.0),
    ("bribe thieves", 7.0),
    ("fireball", 9.0),
    ("meteor showers", 10.0),
    ("nightmare", 13.0),
    ("land lust", 10.0),
    ("tornadoes", 10.0),
    ("greed", 7.0),
    ("pitfalls", 6.0),
    ("vermin", 6.0),
    ("wrath", 8.0),
];

/// How an operation relates to the kingdom that ran it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Hostile,
    Support,
    Intel,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Hostile => "hostile",
            OpKind::Support => "support",
            OpKind::Intel => "intel",
        }
    }
}

/// Structured reading of one operation report. Fields stay `None` when the
/// corresponding fragment is absent from the text.
#[derive(Debug, Clone, PartialEq)]
pub struct OpReport {
    pub op_name: Option<String>,
    pub actor_raw: Option<String>,
    pub target_raw: Option<String>,
    pub outcome: Option<Outcome>,
    pub gain: Option<i64>,
    pub damage: Option<i64>,
    pub duration_ticks: Option<i64>,
}

/// Canonical lookup key for an operation name.
pub fn operation_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Category implied by a structured operation report, when the block carries
/// one. Thievery when the op name reads like guild work, sorcery otherwise.
pub fn intel_category(body: &str) -> Option<EventCategory> {
    let caps = INTEL_LINE_RE.captures(body)?;
    let op_key = operation_key(&caps["op"]);
    if THIEVERY_OP_TOKENS.iter().any(|token| op_key.contains(token)) {
        Some(EventCategory::Thievery)
    } else {
        Some(EventCategory::Magic)
    }
}

/// Pull whatever structured fragments the report carries. Total: a summary
/// with none of them yields an all-`None` report.
pub fn parse_op(summary: &str) -> OpReport {
    let mut report = OpReport {
        op_name: None,
        actor_raw: None,
        target_raw: None,
        outcome: None,
        gain: None,
        damage: None,
        duration_ticks: None,
    };

    if let Some(caps) = INTEL_LINE_RE.captures(summary) {
        report.op_name = Some(caps["op"].trim().to_string());
        report.actor_raw = Some(caps["actor"].trim().to_string());
        report.target_raw = caps
            .name("target")
            .map(|m| m.as_str().trim().to_string());
    }
    if let Some(caps) = RESULT_RE.captures(summary) {
        report.outcome = Some(Outcome::parse(&caps[1]));
    }
    if let Some(caps) = GAIN_RE.captures(summary) {
        report.gain = text::parse_number(&caps["value"]);
    }
    if let Some(caps) = DAMAGE_RE.captures(summary) {
        report.damage = text::parse_number(&caps["value"]);
    }
    if let Some(caps) = DURATION_RE.captures(summary) {
        report.duration_ticks = caps["value"].parse().ok();
    }
    report
}

/// Classify who an operation was really aimed at. Self-casts and known
/// blessings are support, reconnaissance is intel, the rest is hostile.
pub fn classify_op_kind(op_name: &str, actor: &str, target: &str) -> OpKind {
    let op_key = operation_key(op_name);
    let actor_key = operation_key(actor);
    let target_key = operation_key(target);

    if !actor_key.is_empty() && actor_key == target_key {
        return OpKind::Support;
    }
    if SUPPORT_OP_NAMES.contains(&op_key.as_str()) {
        return OpKind::Support;
    }
    if INTEL_OP_TOKENS.iter().any(|token| op_key.contains(token)) {
        return OpKind::Intel;
    }
    OpKind::Hostile
}

fn outcome_multiplier(outcome: Option<Outcome>) -> f64 {
    match outcome {
        Some(Outcome::Success) => 1.0,
        Some(Outcome::Partial) => 0.5,
        _ => 0.0,
    }
}

/// Disruption score for one operation. Only hostile operations score; the
/// weight is scaled by how well the operation landed.
pub fn operation_impact_points(op_name: &str, outcome: Option<Outcome>, kind: OpKind) -> f64 {
    if kind != OpKind::Hostile {
        return 0.0;
    }
    let key = operation_key(op_name);
    let base = OP_IMPACT_WEIGHTS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, weight)| *weight)
        .unwrap_or(5.0);
    (base * outcome_multiplier(outcome) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_op_full_report() {
        let report = parse_op(
            "[IntelSite] 3 - Gold Rush (1:4) used Rob the Vaults on 5 - Maelstrom (2:7). Result: success. Gain: 52,140.",
        );
        assert_eq!(report.op_name.as_deref(), Some("Rob the Vaults"));
        assert_eq!(report.actor_raw.as_deref(), Some("3 - Gold Rush (1:4)"));
        assert_eq!(report.target_raw.as_deref(), Some("5 - Maelstrom (2:7)"));
        assert_eq!(report.outcome, Some(Outcome::Success));
        assert_eq!(report.gain, Some(52_140));
        assert_eq!(report.damage, None);
    }

    #[test]
    fn test_parse_op_untargeted_support() {
        let report =
            parse_op("[IntelSite] 3 - Gold Rush (1:4) used Minor Protection. Result: success. Duration: 12 ticks.");
        assert_eq!(report.op_name.as_deref(), Some("Minor Protection"));
        assert_eq!(report.target_raw, None);
        assert_eq!(report.duration_ticks, Some(12));
    }

    #[test]
    fn test_parse_op_damage_figure() {
        let report = parse_op(
            "[IntelSite] Gold Rush used Fireball on Maelstrom. Result: partial. Damage: 1,204.",
        );
        assert_eq!(report.outcome, Some(Outcome::Partial));
        assert_eq!(report.damage, Some(1_204));
    }

    #[test]
    fn test_parse_op_plain_text_yields_nothing() {
        let report = parse_op("Unknown thieves stole 40,000 bushels from our granaries.");
        assert_eq!(report.op_name, None);
        assert_eq!(report.outcome, None);
        assert_eq!(report.gain, None);
    }

    #[test]
    fn test_intel_category_splits_guild_from_sorcery() {
        assert_eq!(
            intel_category("[IntelSite] A used Night Strike on B. Result: success."),
            Some(EventCategory::Thievery)
        );
        assert_eq!(
            intel_category("[IntelSite] A used Meteor Showers on B. Result: failed."),
            Some(EventCategory::Magic)
        );
        assert_eq!(intel_category("No structured header here."), None);
    }

    #[test]
    fn test_classify_op_kind() {
        assert_eq!(classify_op_kind("Fireball", "Gold Rush", "Maelstrom"), OpKind::Hostile);
        assert_eq!(classify_op_kind("Fireball", "Gold Rush", "Gold Rush"), OpKind::Support);
        assert_eq!(classify_op_kind("Minor Protection", "Gold Rush", ""), OpKind::Support);
        assert_eq!(classify_op_kind("Crystal Ball", "Gold Rush", "Maelstrom"), OpKind::Intel);
    }

    #[test]
    fn test_operation_impact_points() {
        assert_eq!(
            operation_impact_points("Nightmare", Some(Outcome::Success), OpKind::Hostile),
            13.0
        );
        assert_eq!(
            operation_impact_points("Nightmare", Some(Outcome::Partial), OpKind::Hostile),
            6.5
        );
        assert_eq!(
            operation_impact_points("Nightmare", Some(Outcome::Failed), OpKind::Hostile),
            0.0
        );
        // Unlisted operations fall back to the default weight.
        assert_eq!(
            operation_impact_points("Mystery Op", Some(Outcome::Success), OpKind::Hostile),
            5.0
        );
        assert_eq!(
            operation_impact_points("Fireball", Some(Outcome::Success), OpKind::Support),
            0.0
        );
    }
}
