pub mod dates;
pub mod filter;
pub mod io;
pub mod meta;
pub mod sample;
pub mod story;
pub mod text;

pub use dates::{CalendarFacts, Season, calendar_facts, parse_story_date};
pub use filter::{ExcludeReason, FilterConfig, FilterOutcome};
pub use io::{load_corpus, parse_corpus, read_json, write_json_pretty};
pub use sample::{DEFAULT_SAMPLE_SEED, sample_stories};
pub use story::Story;
