//! Per-story annotation: a two-call oracle pass (structured entities,
//! then a quote-preserving summary) plus single-label topic
//! classification. The runner persists after every story and resumes
//! from its own output file.

pub mod classify;
pub mod prompt;
pub mod runner;
pub mod schema;

pub use classify::{ClassifyConfig, TOPICS, TopicClassifier, build_topic_prompt, choose_topic};
pub use runner::{
    AnnotateRunner, DEFAULT_SAMPLE_TARGET, RunSummary, RunnerConfig,
};
pub use schema::{AnnotatedStory, StoryAnnotations};
