//! Single-label topic assignment. One short model call per story maps
//! it onto a fixed topic list; anything the model fumbles lands on
//! "Other" rather than aborting the run.

use std::sync::Arc;
use std::time::Duration;

use corpus::Story;
use oracle::{Oracle, OracleOutcome};
use serde_json::Value;
use tracing::{info, warn};

pub const TOPICS: &[&str] = &[
    "Education",
    "Health",
    "Police & Crime",
    "Local government",
    "Judiciary",
    "Public Safety",
    "Election",
    "Chesapeake",
    "Food",
    "Community Events & Culture",
    "Movies & Shows",
    "Sports",
    "Religion",
    "Obituaries",
    "Other",
];

pub const DEFAULT_CLASSIFY_DELAY: Duration = Duration::from_millis(600);

const CONTENT_PREVIEW_CHARS: usize = 600;

#[derive(Debug, Clone)]
pub struct ClassifyConfig {
    /// Pause between model calls.
    pub delay: Duration,
    /// Assign "Other" everywhere without calling the model.
    pub dry_run: bool,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_CLASSIFY_DELAY,
            dry_run: false,
        }
    }
}

pub fn build_topic_prompt(story: &Story) -> String {
    let title = if story.title.is_empty() {
        story
            .extra
            .get("headline")
            .and_then(Value::as_str)
            .unwrap_or("")
    } else {
        &story.title
    };
    let content = if story.content.is_empty() {
        story
            .extra
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or("")
    } else {
        &story.content
    };
    let preview = match content.char_indices().nth(CONTENT_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &content[..idx]),
        None => content.to_string(),
    };
    format!(
        "Assign this news story to exactly ONE topic from the following list:\n\
         {topics}\n\n\
         Choose the topic that best represents what the story is primarily about.\n\
         Return ONLY the topic name (no explanation, no punctuation).\n\n\
         Title: {title}\n\n\
         Content (short): {preview}\n",
        topics = TOPICS.join(", "),
    )
}

/// Map a model answer onto the canonical topic list, tolerating quotes,
/// trailing punctuation, or a short explanation around the name.
/// Unrecognized answers land on "Other".
pub fn choose_topic(response: &str) -> &'static str {
    let cleaned = response.trim().trim_matches(|c| c == '"' || c == '\'');
    let lower = cleaned.to_lowercase();

    for topic in TOPICS {
        if lower == topic.to_lowercase() {
            return topic;
        }
    }
    for topic in TOPICS {
        if lower.contains(&topic.to_lowercase()) {
            return topic;
        }
    }
    let tokens: Vec<String> = cleaned
        .split_whitespace()
        .map(|tok| {
            tok.trim_matches(|c| matches!(c, '.' | ',' | '"' | '\''))
                .to_lowercase()
        })
        .collect();
    for topic in TOPICS {
        for word in topic.to_lowercase().split_whitespace() {
            if tokens.iter().any(|tok| tok == word) {
                return topic;
            }
        }
    }
    "Other"
}

pub struct TopicClassifier {
    oracle: Arc<dyn Oracle>,
    config: ClassifyConfig,
}

impl TopicClassifier {
    pub fn new(oracle: Arc<dyn Oracle>, config: ClassifyConfig) -> Self {
        Self { oracle, config }
    }

    /// Assign a topic to every story in place, under a `topic` key.
    pub async fn run(&self, stories: &mut [Story]) {
        let total = stories.len();
        for (i, story) in stories.iter_mut().enumerate() {
            let topic = if self.config.dry_run {
                "Other"
            } else {
                match self.oracle.invoke(&build_topic_prompt(story)).await {
                    OracleOutcome::Completed { stdout } => choose_topic(&stdout),
                    failed => {
                        if let Some(failure) = failed.failure() {
                            warn!(story = i + 1, error = %failure, "topic call failed, assigning Other");
                        }
                        "Other"
                    }
                }
            };
            story
                .extra
                .insert("topic".to_string(), Value::String(topic.to_string()));
            info!("[{}/{}] {} -> {}", i + 1, total, story.short_title(60), topic);
            tokio::time::sleep(self.config.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle::testing::ScriptedOracle;

    fn quick_config() -> ClassifyConfig {
        ClassifyConfig {
            delay: Duration::ZERO,
            dry_run: false,
        }
    }

    #[test]
    fn test_exact_match_ignores_case_and_quotes() {
        assert_eq!(choose_topic("Sports"), "Sports");
        assert_eq!(choose_topic("  sports \n"), "Sports");
        assert_eq!(choose_topic("\"Education\""), "Education");
        assert_eq!(choose_topic("'police & crime'"), "Police & Crime");
    }

    #[test]
    fn test_topic_embedded_in_longer_answer() {
        assert_eq!(
            choose_topic("This story is about Local government in Easton."),
            "Local government"
        );
        assert_eq!(choose_topic("Topic: Judiciary."), "Judiciary");
    }

    #[test]
    fn test_single_word_fallback() {
        assert_eq!(choose_topic("The topic is crime."), "Police & Crime");
        assert_eq!(choose_topic("Community events happening"), "Community Events & Culture");
    }

    #[test]
    fn test_unrecognized_answer_lands_on_other() {
        assert_eq!(choose_topic("I am not sure about this one"), "Other");
        assert_eq!(choose_topic(""), "Other");
    }

    #[test]
    fn test_prompt_truncates_long_content() {
        let story = Story::new("Long read", "x".repeat(700));
        let prompt = build_topic_prompt(&story);
        assert!(prompt.contains(&format!("{}...", "x".repeat(600))));
        assert!(!prompt.contains(&"x".repeat(601)));
    }

    #[test]
    fn test_prompt_falls_back_to_headline_and_summary() {
        let mut story = Story::new("", "");
        story.extra.insert(
            "headline".to_string(),
            Value::String("Backup headline".to_string()),
        );
        story.extra.insert(
            "summary".to_string(),
            Value::String("Backup body".to_string()),
        );
        let prompt = build_topic_prompt(&story);
        assert!(prompt.contains("Title: Backup headline"));
        assert!(prompt.contains("Content (short): Backup body"));
    }

    #[tokio::test]
    async fn test_run_assigns_topics_in_order() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .with_response("Sports")
                .with_response("nonsense answer"),
        );
        let mut stories = vec![
            Story::new("Game recap", "The team won."),
            Story::new("Mystery", "Unclear."),
        ];
        TopicClassifier::new(oracle.clone(), quick_config())
            .run(&mut stories)
            .await;

        assert_eq!(oracle.call_count(), 2);
        assert_eq!(stories[0].extra.get("topic").unwrap(), "Sports");
        assert_eq!(stories[1].extra.get("topic").unwrap(), "Other");
    }

    #[tokio::test]
    async fn test_failed_call_assigns_other() {
        let oracle = Arc::new(
            ScriptedOracle::new().with_outcome(OracleOutcome::TimedOut { timeout_secs: 90 }),
        );
        let mut stories = vec![Story::new("A", "text")];
        TopicClassifier::new(oracle, quick_config())
            .run(&mut stories)
            .await;
        assert_eq!(stories[0].extra.get("topic").unwrap(), "Other");
    }

    #[tokio::test]
    async fn test_dry_run_never_calls_the_model() {
        let oracle = Arc::new(ScriptedOracle::new());
        let mut stories = vec![Story::new("A", "text"), Story::new("B", "text")];
        let config = ClassifyConfig {
            dry_run: true,
            ..quick_config()
        };
        TopicClassifier::new(oracle.clone(), config)
            .run(&mut stories)
            .await;

        assert_eq!(oracle.call_count(), 0);
        assert_eq!(stories[0].extra.get("topic").unwrap(), "Other");
        assert_eq!(stories[1].extra.get("topic").unwrap(), "Other");
    }
}
