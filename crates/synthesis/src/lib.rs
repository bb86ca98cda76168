//! Corpus-level synthesis: batch prose summaries reduced level by
//! level into a bounded set, then assembled into a reporter-facing
//! coverage guide.

pub mod guide;
pub mod metadata;
pub mod prompt;
pub mod reducer;

pub use guide::{
    DEFAULT_GUIDE_BATCH_SIZE, Followup, GuideBuilder, GuideConfig, GuideOutcome, StorySelection,
    render_batch_summaries,
};
pub use metadata::{MetadataDigest, analyze};
pub use reducer::{DEFAULT_FAN_IN, OracleSynthesizer, PartialSummary, Reducer, Synthesizer};
