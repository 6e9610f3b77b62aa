//! Derived rollups over the stored event log and kingdom snapshots. Every
//! builder here is a pure function over pre-queried rows, so the same inputs
//! always reproduce the same output and nothing in this crate touches the
//! database or the network.

pub mod facts;
pub mod history;
pub mod momentum;
pub mod replay;
pub mod swing;
pub mod trend;
pub mod view;
pub mod wars;

pub use facts::{build_fact_detail, FactDetail, FactRow};
pub use history::{build_province_history, HistoryEntry, ProvinceHistory, ProvinceStats, Role};
pub use momentum::{build_momentum, MomentumRow};
pub use replay::{build_replay, ReplayRow};
pub use swing::{
    build_land_swing, build_nw_swing, build_opponent_pressure, infer_home_kingdom, LandSwingRow,
    NwSwingRow, OpponentRow,
};
pub use trend::{build_compare, build_trend, KingdomCompare, TrendPoint, TrendSeries};
pub use view::{enrich, EventView};
pub use wars::{build_wars, day_in_war, in_home_war, WarRow};
