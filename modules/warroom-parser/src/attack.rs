//! Attack report extraction. Summaries are matched against a fixed cascade
//! of anchored templates, most specific first; anything that misses every
//! template still yields a report with an unknown outcome so the block is
//! recorded rather than dropped.

use std::sync::LazyLock;

use regex::Regex;
use warroom_common::{AttackType, Outcome};

// --- success templates (acres change hands) ---

static CAPTURED_FROM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<actor>.+?) captured (?P<acres>\d+) acres of land from (?P<target>.+?)\.?$")
        .unwrap()
});
static INVADED_CAPTURED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<actor>.+?) invaded (?P<target>.+?) and captured (?P<acres>\d+) acres of land\.?$")
        .unwrap()
});
static AMBUSH_TOOK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<actor>.+?) ambushed armies from (?P<target>.+?) and took (?P<acres>\d+) acres of land\.?$")
        .unwrap()
});
static RECAPTURED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<actor>.+?) recaptured (?P<acres>\d+) acres of land from (?P<target>.+?)\.?$")
        .unwrap()
});

// --- raze templates (buildings burn, no transfer) ---

static RAZED_TARGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<actor>.+?) razed (?P<acres>\d+) acres of (?P<target>\d+\s*-\s*.+?)\.?$")
        .unwrap()
});
static INVADED_RAZED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<actor>.+?) invaded (?P<target>.+?) and razed (?P<acres>\d+) acres of land\.?$")
        .unwrap()
});

// --- failed templates ---

static REPELLED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<actor>.+?) attempted an invasion of (?P<target>.+?), but was repelled\.?$")
        .unwrap()
});
static ATTEMPTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<actor>.+?) attempted to invade (?P<target>.+?)\.?$").unwrap()
});

// --- success templates with no acre figure ---

static INVADED_PILLAGED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<actor>.+?) invaded and pillaged (?P<target>.+?)\.?$").unwrap()
});
static ATTACKED_PILLAGED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<actor>.+?) attacked and pillaged the lands of (?P<target>.+?)\.?$")
        .unwrap()
});
static LEARNED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<actor>.+?) learned (?P<target>.+?)\.?$").unwrap()
});

/// Structured reading of one attack summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackReport {
    pub outcome: Outcome,
    pub attack_type: AttackType,
    /// Acres that changed hands (gained by the actor).
    pub acres_transfer: i64,
    /// Acres the target lost, whether transferred or destroyed.
    pub target_loss_acres: i64,
    pub actor_raw: Option<String>,
    pub target_raw: Option<String>,
}

impl AttackReport {
    fn unmatched(attack_type: AttackType) -> Self {
        AttackReport {
            outcome: Outcome::Unknown,
            attack_type,
            acres_transfer: 0,
            target_loss_acres: 0,
            actor_raw: None,
            target_raw: None,
        }
    }
}

/// Classify the attack sub-type from its phrasing, first hit wins.
pub fn classify_attack_type(summary: &str) -> AttackType {
    let lower = summary.trim().to_lowercase();

    if lower.contains("ambushed armies from") || lower.contains("recaptured") {
        return AttackType::Ambush;
    }
    if lower.contains("massacre") {
        return AttackType::Massacre;
    }
    if lower.contains("learned") || lower.contains("learn attack") {
        return AttackType::Learn;
    }
    if lower.contains("plundered") || lower.contains("pillaged") {
        return AttackType::Plunder;
    }
    if lower.contains("razed") {
        return AttackType::Raze;
    }
    if lower.contains("conquest") || lower.contains("conquered") {
        return AttackType::Conquest;
    }
    if lower.contains("captured") || lower.contains("invaded") {
        return AttackType::TraditionalMarch;
    }
    AttackType::Other
}

/// Land change attributable to one attack. In a war, razes destroy buildings
/// without moving acres, so their impact is zero.
pub fn effective_land_impact(
    acres_transfer: i64,
    target_loss_acres: i64,
    attack_type: AttackType,
    in_war: bool,
) -> i64 {
    if in_war && attack_type == AttackType::Raze {
        return 0;
    }
    if acres_transfer > 0 {
        acres_transfer
    } else {
        target_loss_acres
    }
}

fn acres_of(caps: &regex::Captures<'_>) -> i64 {
    caps["acres"].parse().unwrap_or(0)
}

fn raw_parties(caps: &regex::Captures<'_>) -> (Option<String>, Option<String>) {
    (
        Some(caps["actor"].to_string()),
        Some(caps["target"].to_string()),
    )
}

/// Parse one attack summary. Total: never fails, the fallback report has an
/// unknown outcome and no parties.
pub fn parse_attack(summary: &str) -> AttackReport {
    let text = summary.trim();
    let attack_type = classify_attack_type(text);

    for re in [&CAPTURED_FROM_RE, &INVADED_CAPTURED_RE, &AMBUSH_TOOK_RE, &RECAPTURED_RE] {
        if let Some(caps) = re.captures(text) {
            let acres = acres_of(&caps);
            let (actor_raw, target_raw) = raw_parties(&caps);
            return AttackReport {
                outcome: Outcome::Success,
                attack_type,
                acres_transfer: acres,
                target_loss_acres: acres,
                actor_raw,
                target_raw,
            };
        }
    }

    for re in [&RAZED_TARGET_RE, &INVADED_RAZED_RE] {
        if let Some(caps) = re.captures(text) {
            let acres = acres_of(&caps);
            let (actor_raw, target_raw) = raw_parties(&caps);
            return AttackReport {
                outcome: Outcome::Success,
                attack_type,
                acres_transfer: 0,
                target_loss_acres: acres,
                actor_raw,
                target_raw,
            };
        }
    }

    for re in [&REPELLED_RE, &ATTEMPTED_RE] {
        if let Some(caps) = re.captures(text) {
            let (actor_raw, target_raw) = raw_parties(&caps);
            return AttackReport {
                outcome: Outcome::Failed,
                attack_type,
                acres_transfer: 0,
                target_loss_acres: 0,
                actor_raw,
                target_raw,
            };
        }
    }

    for re in [&INVADED_PILLAGED_RE, &ATTACKED_PILLAGED_RE, &LEARNED_RE] {
        if let Some(caps) = re.captures(text) {
            let (actor_raw, target_raw) = raw_parties(&caps);
            return AttackReport {
                outcome: Outcome::Success,
                attack_type,
                acres_transfer: 0,
                target_loss_acres: 0,
                actor_raw,
                target_raw,
            };
        }
    }

    AttackReport::unmatched(attack_type)
}
