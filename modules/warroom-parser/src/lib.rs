//! Pure free-text parsing for the kingdom news feed: block segmentation,
//! ordered category matching, per-category field extraction, and content
//! hashing. Everything here is deterministic and re-runnable: the same page
//! text always yields the same events.

pub mod attack;
pub mod matchers;
pub mod news;
pub mod ops;
pub mod snapshot;
pub mod text;
pub mod war;

pub use attack::{effective_land_impact, parse_attack, AttackReport};
pub use news::{parse_block, parse_page, ParsedEvent};
pub use ops::{classify_op_kind, operation_impact_points, parse_op, OpKind, OpReport};
pub use snapshot::{parse_kingdom_page, ParsedKingdomPage, ParsedProvinceRow};
pub use text::{content_hash, normalize_line, parse_number};
pub use war::{
    classify_war_event, classify_war_result, extract_war_opponent, postwar_expiry, WarEventKind,
    WarResult,
};
