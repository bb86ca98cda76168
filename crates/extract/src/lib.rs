pub mod prompt;
pub mod schema;

pub use schema::{BatchEntities, EventMention, IndividualMention, PlaceMention};

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, ensure};
use oracle::{ExtractionFailure, Oracle, interpret_response};
use tracing::{info, warn};

use corpus::Story;

pub const DEFAULT_BATCH_SIZE: usize = 20;

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub batch_size: usize,
    /// When set, each batch's raw entities are dumped here as
    /// `debug_entities_batch_NNN.json`.
    pub debug_dir: Option<PathBuf>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            debug_dir: None,
        }
    }
}

/// Result of one batch. A batch that times out, crashes, or answers
/// with unusable text still produces an outcome, with empty entities
/// and the failure recorded, so one bad batch never sinks a run.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub batch_num: usize,
    pub entities: BatchEntities,
    pub failure: Option<ExtractionFailure>,
}

pub struct BatchExtractor {
    oracle: Arc<dyn Oracle>,
    config: ExtractorConfig,
}

impl BatchExtractor {
    pub fn new(oracle: Arc<dyn Oracle>, config: ExtractorConfig) -> Self {
        Self { oracle, config }
    }

    /// Run extraction over the whole corpus in batches, in corpus
    /// order. Batch numbering is 1-based to match the debug dumps.
    pub async fn run(&self, stories: &[Story]) -> Result<Vec<BatchOutcome>> {
        ensure!(self.config.batch_size > 0, "batch size must be at least 1");

        let total_batches = stories.len().div_ceil(self.config.batch_size);
        let mut outcomes = Vec::with_capacity(total_batches);

        for (idx, batch) in stories.chunks(self.config.batch_size).enumerate() {
            let batch_num = idx + 1;
            info!(
                batch_num,
                total_batches,
                stories = batch.len(),
                "extracting entities from batch"
            );
            let outcome = self.extract_batch(batch, batch_num).await?;

            if let Some(dir) = &self.config.debug_dir {
                let path = dir.join(format!("debug_entities_batch_{:03}.json", batch_num));
                corpus::write_json_pretty(&path, &outcome.entities).await?;
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    async fn extract_batch(&self, batch: &[Story], batch_num: usize) -> Result<BatchOutcome> {
        let prompt = prompt::build_batch_prompt(batch)?;
        let outcome = self.oracle.invoke(&prompt).await;

        match interpret_response::<BatchEntities>(outcome) {
            Ok(entities) => Ok(BatchOutcome {
                batch_num,
                entities,
                failure: None,
            }),
            Err(failure) => {
                warn!(batch_num, error = %failure, "batch extraction failed");
                Ok(BatchOutcome {
                    batch_num,
                    entities: BatchEntities::default(),
                    failure: Some(failure),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oracle::OracleOutcome;
    use oracle::testing::ScriptedOracle;

    fn stories(n: usize) -> Vec<Story> {
        (0..n)
            .map(|i| Story::new(format!("story-{i}"), format!("content {i}")))
            .collect()
    }

    fn extractor(oracle: ScriptedOracle, batch_size: usize) -> (BatchExtractor, Arc<ScriptedOracle>) {
        let oracle = Arc::new(oracle);
        let extractor = BatchExtractor::new(
            oracle.clone(),
            ExtractorConfig {
                batch_size,
                debug_dir: None,
            },
        );
        (extractor, oracle)
    }

    #[tokio::test]
    async fn test_batches_partition_the_corpus_in_order() {
        let oracle = ScriptedOracle::new()
            .with_default_response(r#"{"individuals": [], "events": [], "places": []}"#);
        let (extractor, oracle) = extractor(oracle, 20);

        let outcomes = extractor.run(&stories(45)).await.unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(oracle.call_count(), 3);

        let prompts = oracle.prompts();
        assert!(prompts[0].contains("these 20 news stories"));
        assert!(prompts[0].contains("story-0"));
        assert!(prompts[1].contains("story-20"));
        assert!(prompts[2].contains("these 5 news stories"));
        assert!(prompts[2].contains("story-44"));
        assert_eq!(outcomes[2].batch_num, 3);
    }

    #[tokio::test]
    async fn test_parsed_entities_flow_through() {
        let oracle = ScriptedOracle::new().with_response(
            r#"{"individuals": [{"name": "Jane Doe", "title": "Mayor", "story_titles": ["story-0"]}]}"#,
        );
        let (extractor, _) = extractor(oracle, 20);

        let outcomes = extractor.run(&stories(1)).await.unwrap();
        assert!(outcomes[0].failure.is_none());
        assert_eq!(outcomes[0].entities.individuals[0].name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_fenced_response_is_recovered() {
        let oracle = ScriptedOracle::new()
            .with_response("Here you go:\n```json\n{\"places\": [{\"location\": \"Easton\"}]}\n```");
        let (extractor, _) = extractor(oracle, 20);

        let outcomes = extractor.run(&stories(1)).await.unwrap();
        assert!(outcomes[0].failure.is_none());
        assert_eq!(outcomes[0].entities.places[0].location, "Easton");
    }

    #[tokio::test]
    async fn test_failed_batch_records_marker_and_run_continues() {
        let oracle = ScriptedOracle::new()
            .with_outcome(OracleOutcome::TimedOut { timeout_secs: 90 })
            .with_response(r#"{"events": [{"event": "Fire"}]}"#);
        let (extractor, oracle) = extractor(oracle, 1);

        let outcomes = extractor.run(&stories(2)).await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            outcomes[0].failure,
            Some(ExtractionFailure::Timeout { timeout_secs: 90 })
        );
        assert!(outcomes[0].entities.is_empty());
        assert!(outcomes[1].failure.is_none());
        assert_eq!(outcomes[1].entities.events[0].event, "Fire");
        assert_eq!(oracle.call_count(), 2);
    }

    #[tokio::test]
    async fn test_wrong_shape_records_parse_failure() {
        let oracle = ScriptedOracle::new().with_response(r#"{"individuals": "not a list"}"#);
        let (extractor, _) = extractor(oracle, 20);

        let outcomes = extractor.run(&stories(1)).await.unwrap();
        match &outcomes[0].failure {
            Some(ExtractionFailure::Parse { reason }) => {
                assert!(
                    reason.contains("does not match the expected shape"),
                    "unexpected reason: {reason}"
                )
            }
            other => panic!("expected parse failure, got {:?}", other),
        }
        assert!(outcomes[0].entities.is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_response_records_parse_failure() {
        let oracle = ScriptedOracle::new().with_response("I could not find any entities, sorry!");
        let (extractor, _) = extractor(oracle, 20);

        let outcomes = extractor.run(&stories(1)).await.unwrap();
        assert!(matches!(
            outcomes[0].failure,
            Some(ExtractionFailure::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_debug_dir_gets_per_batch_dumps() {
        let dir = tempfile::tempdir().unwrap();
        let oracle = Arc::new(
            ScriptedOracle::new()
                .with_default_response(r#"{"individuals": [{"name": "Jane Doe"}]}"#),
        );
        let extractor = BatchExtractor::new(
            oracle,
            ExtractorConfig {
                batch_size: 2,
                debug_dir: Some(dir.path().to_path_buf()),
            },
        );

        extractor.run(&stories(3)).await.unwrap();
        assert!(dir.path().join("debug_entities_batch_001.json").exists());
        assert!(dir.path().join("debug_entities_batch_002.json").exists());

        let dumped: BatchEntities = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("debug_entities_batch_001.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(dumped.individuals[0].name, "Jane Doe");
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_rejected() {
        let oracle = Arc::new(ScriptedOracle::new());
        let extractor = BatchExtractor::new(
            oracle,
            ExtractorConfig {
                batch_size: 0,
                debug_dir: None,
            },
        );
        assert!(extractor.run(&stories(3)).await.is_err());
    }
}
