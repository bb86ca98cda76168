//! Offline report rendering: the entity prominence report and the
//! chronological beat book. Everything here works from already
//! extracted data, no model calls.

pub mod chronology;
pub mod entity_report;
pub mod prominence;

pub use chronology::{
    DEFAULT_TOP_N, Granularity, Period, bucket_by_period, normalize_author, render_chronicle,
};
pub use entity_report::render_entity_report;
pub use prominence::{
    DEFAULT_THRESHOLD_PERCENT, Ranked, RankedEntity, bucket_by_qualifier, prominence_threshold,
    rank,
};
