//! Kingdom page parsing. The page arrives as text: a heading naming the
//! kingdom, labelled stat lines, and one pipe-separated row per province.
//! Everything beyond the heading is optional; absent stats stay `None`
//! rather than zero.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use warroom_common::{KingdomSnapshot, ProvinceSnapshot};

use crate::text;

static KINGDOM_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)The kingdom of\s+(?P<name>.+?)\s*\(\s*(?P<coord>\d+:\d+)\s*\)").unwrap()
});
static NETWORTH_TOTAL_AVG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([\d,]+)\s*gc(?:\s*\(avg:\s*([\d,]+)\s*gc\))?").unwrap()
});
static LAND_TOTAL_AVG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([\d,]+)\s*acres(?:\s*\(avg:\s*([\d,]+)\s*acres\))?").unwrap()
});
static RANK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s+of\s+\d+").unwrap());
static SLOT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\s*-\s*(.+)$").unwrap());

/// Structured reading of one kingdom page.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedKingdomPage {
    pub kingdom: String,
    pub name: String,
    pub provinces_count: Option<i64>,
    pub stance: Option<String>,
    pub land: Option<i64>,
    pub avg_land: Option<i64>,
    pub networth: Option<i64>,
    pub avg_networth: Option<i64>,
    pub honor: Option<i64>,
    pub land_rank: Option<i64>,
    pub networth_rank: Option<i64>,
    pub honor_rank: Option<i64>,
    pub province_rows: Vec<ParsedProvinceRow>,
}

/// One province row off the kingdom page.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedProvinceRow {
    pub slot: i64,
    pub name: String,
    pub race: Option<String>,
    pub land: Option<i64>,
    pub networth: Option<i64>,
    pub nwpa: Option<f64>,
    pub nobility: Option<String>,
}

impl ParsedKingdomPage {
    /// Bind the page to a scope and fetch time, producing the rows the
    /// snapshot store persists.
    pub fn into_snapshots(
        self,
        scope: &str,
        fetched_at: DateTime<Utc>,
    ) -> (KingdomSnapshot, Vec<ProvinceSnapshot>) {
        let provinces = self
            .province_rows
            .into_iter()
            .map(|row| ProvinceSnapshot {
                scope: scope.to_string(),
                kingdom: self.kingdom.clone(),
                province: row.name,
                fetched_at,
                slot: Some(row.slot),
                race: row.race,
                land: row.land,
                networth: row.networth,
                nwpa: row.nwpa,
                nobility: row.nobility,
            })
            .collect();

        let kingdom = KingdomSnapshot {
            scope: scope.to_string(),
            kingdom: self.kingdom,
            name: self.name,
            fetched_at,
            land: self.land,
            networth: self.networth,
            honor: self.honor,
            avg_land: self.avg_land,
            avg_networth: self.avg_networth,
            land_rank: self.land_rank,
            networth_rank: self.networth_rank,
            honor_rank: self.honor_rank,
            provinces: self.provinces_count,
            stance: self.stance,
        };
        (kingdom, provinces)
    }
}

fn parse_rank(value: &str) -> Option<i64> {
    RANK_RE
        .captures(value)
        .and_then(|caps| caps[1].parse().ok())
}

fn parse_float(value: &str) -> Option<f64> {
    value.trim().replace(',', "").parse().ok()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "-" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// Province names carry status markers on the page: (M) monarch, (S) steward,
// * online. They are presentation, not identity.
fn strip_name_markers(name: &str) -> String {
    let mut cleaned = name.replace('*', " ");
    for marker in ["(M)", "(m)", "(S)", "(s)"] {
        cleaned = cleaned.replace(marker, " ");
    }
    text::normalize_line(&cleaned)
}

fn parse_province_row(line: &str) -> Option<ParsedProvinceRow> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    if fields.len() < 6 {
        return None;
    }

    let slot_caps = SLOT_NAME_RE.captures(fields[0])?;
    let slot: i64 = slot_caps[1].parse().ok()?;
    let name = strip_name_markers(&slot_caps[2]);
    if name.is_empty() || name == "-" {
        return None;
    }

    Some(ParsedProvinceRow {
        slot,
        name,
        race: non_empty(fields[1]),
        land: text::parse_number(fields[2]),
        networth: text::parse_number(fields[3]),
        nwpa: parse_float(fields[4]),
        nobility: non_empty(fields[5]),
    })
}

/// Parse a kingdom page. `None` when no kingdom heading is present, which
/// marks the page as something else entirely.
pub fn parse_kingdom_page(page: &str) -> Option<ParsedKingdomPage> {
    let heading = KINGDOM_HEADING_RE.captures(page)?;
    let mut parsed = ParsedKingdomPage {
        kingdom: heading["coord"].to_string(),
        name: text::normalize_line(&heading["name"]),
        provinces_count: None,
        stance: None,
        land: None,
        avg_land: None,
        networth: None,
        avg_networth: None,
        honor: None,
        land_rank: None,
        networth_rank: None,
        honor_rank: None,
        province_rows: Vec::new(),
    };

    for raw_line in page.lines() {
        let line = text::normalize_line(raw_line);
        if line.is_empty() {
            continue;
        }

        if line.contains('|') {
            if let Some(row) = parse_province_row(&line) {
                parsed.province_rows.push(row);
            }
            continue;
        }

        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match label.trim().to_lowercase().as_str() {
            "total provinces" => parsed.provinces_count = text::parse_number(value),
            "stance" => parsed.stance = non_empty(value),
            "total networth" => {
                if let Some(caps) = NETWORTH_TOTAL_AVG_RE.captures(value) {
                    parsed.networth = text::parse_number(&caps[1]);
                    parsed.avg_networth = caps.get(2).and_then(|m| text::parse_number(m.as_str()));
                }
            }
            "net worth rank" | "networth rank" => parsed.networth_rank = parse_rank(value),
            "total land" => {
                if let Some(caps) = LAND_TOTAL_AVG_RE.captures(value) {
                    parsed.land = text::parse_number(&caps[1]);
                    parsed.avg_land = caps.get(2).and_then(|m| text::parse_number(m.as_str()));
                }
            }
            "land rank" => parsed.land_rank = parse_rank(value),
            "total honor" => parsed.honor = text::parse_number(value),
            "honor rank" => parsed.honor_rank = parse_rank(value),
            _ => {}
        }
    }

    Some(parsed)
}
