//! War banner lines: declarations, endings, and the post-war window. These
//! blocks come through the feed as diplomacy and drive the war ledger.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static DECLARE_RES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)^We have declared WAR on (?P<opponent>.+?)!$").unwrap(),
        Regex::new(r"(?i)^(?P<opponent>.+?) has declared WAR on us!?$").unwrap(),
    ]
});

// End-of-war phrasing varies with the outcome, so these are searched rather
// than anchored.
static END_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)withdrawn from war with (?P<opponent>.+?)(?:\.|!|$)").unwrap(),
        Regex::new(r"(?i)won the war with (?P<opponent>.+?)(?:\.|!|$)").unwrap(),
        Regex::new(r"(?i)war with (?P<opponent>.+?)(?: has finally ended| has ended|\.|!|$)")
            .unwrap(),
    ]
});

static POSTWAR_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^Our kingdom is now in a post-war period which will expire on (?P<expiry>.+?)\.$")
        .unwrap()
});
static POSTWAR_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Our post-war period has ended!?$").unwrap());

/// What a war banner line announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarEventKind {
    Declare,
    End,
    PostwarStart,
    PostwarEnd,
}

/// How a war on the ledger finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarResult {
    Active,
    Victory,
    Failed,
    Peace,
    Ended,
}

impl WarResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarResult::Active => "active",
            WarResult::Victory => "victory",
            WarResult::Failed => "failed",
            WarResult::Peace => "peace",
            WarResult::Ended => "ended",
        }
    }
}

impl fmt::Display for WarResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognize a war banner line, if the block is one.
pub fn classify_war_event(summary: &str) -> Option<WarEventKind> {
    let text = summary.trim();
    if POSTWAR_START_RE.is_match(text) {
        return Some(WarEventKind::PostwarStart);
    }
    if POSTWAR_END_RE.is_match(text) {
        return Some(WarEventKind::PostwarEnd);
    }

    let lower = text.to_lowercase();
    if lower.contains("declared war") {
        return Some(WarEventKind::Declare);
    }
    if lower.contains("withdrawn from war")
        || lower.contains("won the war")
        || (lower.contains("war with")
            && (lower.contains("has ended") || lower.contains("has finally ended")))
    {
        return Some(WarEventKind::End);
    }
    None
}

/// Opponent named by a declaration or ending line.
pub fn extract_war_opponent(summary: &str) -> Option<String> {
    let text = summary.trim();

    for re in DECLARE_RES.iter() {
        if let Some(caps) = re.captures(text) {
            return Some(caps["opponent"].trim().to_string());
        }
    }
    for re in END_RES.iter() {
        if let Some(caps) = re.captures(text) {
            return Some(caps["opponent"].trim().to_string());
        }
    }
    None
}

/// Read the result off an ending line. Phrasing that names no winner still
/// closes the war as plainly ended.
pub fn classify_war_result(summary: &str) -> WarResult {
    let lower = summary.to_lowercase();

    if lower.contains("failed war")
        || lower.contains("unable to achieve victory")
        || lower.contains("withdrawn from war")
    {
        return WarResult::Failed;
    }
    if lower.contains("won the war") || lower.contains("achieved victory") {
        return WarResult::Victory;
    }
    if lower.contains("mutual peace") || lower.contains("ended in peace") {
        return WarResult::Peace;
    }
    WarResult::Ended
}

/// In-game day the post-war window expires on, from its start banner.
pub fn postwar_expiry(summary: &str) -> Option<String> {
    POSTWAR_START_RE
        .captures(summary.trim())
        .map(|caps| caps["expiry"].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_declarations() {
        assert_eq!(
            classify_war_event("We have declared WAR on Stormwatch (2:7)!"),
            Some(WarEventKind::Declare)
        );
        assert_eq!(
            classify_war_event("Stormwatch (2:7) has declared WAR on us!"),
            Some(WarEventKind::Declare)
        );
    }

    #[test]
    fn test_classify_endings() {
        assert_eq!(
            classify_war_event("Our kingdom has withdrawn from war with Stormwatch (2:7)."),
            Some(WarEventKind::End)
        );
        assert_eq!(
            classify_war_event("We have won the war with Stormwatch (2:7)!"),
            Some(WarEventKind::End)
        );
        assert_eq!(
            classify_war_event("The war with Stormwatch (2:7) has finally ended."),
            Some(WarEventKind::End)
        );
    }

    #[test]
    fn test_classify_postwar_window() {
        assert_eq!(
            classify_war_event("Our kingdom is now in a post-war period which will expire on February 12 of YR3."),
            Some(WarEventKind::PostwarStart)
        );
        assert_eq!(
            classify_war_event("Our post-war period has ended!"),
            Some(WarEventKind::PostwarEnd)
        );
    }

    #[test]
    fn test_non_war_lines_are_ignored() {
        assert_eq!(classify_war_event("3 - Gold Rush (1:4) captured 120 acres of land from 5 - Maelstrom (2:7)."), None);
        assert_eq!(classify_war_event("A dragon has been launched!"), None);
    }

    #[test]
    fn test_extract_opponent() {
        assert_eq!(
            extract_war_opponent("We have declared WAR on Stormwatch (2:7)!").as_deref(),
            Some("Stormwatch (2:7)")
        );
        assert_eq!(
            extract_war_opponent("Our kingdom has withdrawn from war with Stormwatch (2:7).").as_deref(),
            Some("Stormwatch (2:7)")
        );
        assert_eq!(extract_war_opponent("Our post-war period has ended!"), None);
    }

    #[test]
    fn test_classify_result() {
        assert_eq!(
            classify_war_result("Our kingdom has withdrawn from war with Stormwatch (2:7)."),
            WarResult::Failed
        );
        assert_eq!(
            classify_war_result("We have won the war with Stormwatch (2:7)!"),
            WarResult::Victory
        );
        assert_eq!(
            classify_war_result("The war ended in peace after long talks."),
            WarResult::Peace
        );
        assert_eq!(
            classify_war_result("The war with Stormwatch (2:7) has finally ended."),
            WarResult::Ended
        );
    }

    #[test]
    fn test_postwar_expiry_day() {
        assert_eq!(
            postwar_expiry("Our kingdom is now in a post-war period which will expire on February 12 of YR3.")
                .as_deref(),
            Some("February 12 of YR3")
        );
        assert_eq!(postwar_expiry("Our post-war period has ended!"), None);
    }
}
