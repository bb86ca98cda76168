use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use corpus::{FilterConfig, Story};
use oracle::{Oracle, OracleOutcome, interpret_response};
use tracing::{debug, info, warn};

use crate::prompt;
use crate::schema::{AnnotatedStory, StoryAnnotations};

pub const DEFAULT_SAMPLE_TARGET: usize = 300;
pub const DEFAULT_STORY_DELAY: Duration = Duration::from_secs(4);
pub const DEFAULT_INTER_CALL_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub filter: FilterConfig,
    /// Downsample the filtered work list to this many stories.
    pub sample_target: Option<usize>,
    pub sample_seed: u64,
    /// Truncate the work list after sampling, for quick test runs.
    pub limit: Option<usize>,
    /// Annotate only, without the second summarization call.
    pub skip_summary: bool,
    /// Pause between the two model calls for one story.
    pub inter_call_delay: Duration,
    /// Pause after each story, successful or not.
    pub story_delay: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            sample_target: Some(DEFAULT_SAMPLE_TARGET),
            sample_seed: corpus::DEFAULT_SAMPLE_SEED,
            limit: None,
            skip_summary: false,
            inter_call_delay: DEFAULT_INTER_CALL_DELAY,
            story_delay: DEFAULT_STORY_DELAY,
        }
    }
}

/// What one run did, over both newly processed stories and records
/// carried over from previous runs.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total_input: usize,
    pub filtered_out: usize,
    pub work_list_len: usize,
    pub already_processed: usize,
    pub processed_this_run: usize,
    pub skipped_no_content: usize,
    pub total_in_output: usize,
    pub successful_annotations: usize,
    pub summaries_generated: usize,
    /// Primary theme counts over the whole output, most common first.
    pub theme_breakdown: Vec<(String, usize)>,
    /// Season counts in calendar order, then unknown.
    pub season_breakdown: Vec<(String, usize)>,
    pub errors: Vec<String>,
}

/// Drives per-story annotation over a work list while surviving
/// interruption. The output file is rewritten after every story, so a
/// crash loses at most the story in flight; the next run picks up
/// right behind the last persisted record.
pub struct AnnotateRunner {
    oracle: Arc<dyn Oracle>,
    config: RunnerConfig,
}

impl AnnotateRunner {
    pub fn new(oracle: Arc<dyn Oracle>, config: RunnerConfig) -> Self {
        Self { oracle, config }
    }

    pub async fn run(&self, input: &Path, output: &Path) -> Result<RunSummary> {
        let all_stories = corpus::load_corpus(input).await?;
        let total_input = all_stories.len();

        let filtered = self.config.filter.apply(all_stories);
        let filtered_out = filtered.excluded.len();
        for excluded in &filtered.excluded {
            debug!(title = %excluded.title, reason = %excluded.reason, "excluded story");
        }

        let mut work_list = filtered.kept;
        if let Some(target) = self.config.sample_target {
            if work_list.len() > target {
                info!(target, available = work_list.len(), "sampling work list");
                work_list = corpus::sample_stories(work_list, target, self.config.sample_seed);
            }
        }
        if let Some(limit) = self.config.limit {
            if limit < work_list.len() {
                info!(limit, "truncating work list");
                work_list.truncate(limit);
            }
        }
        let work_list_len = work_list.len();

        let mut appended: Vec<AnnotatedStory> = if tokio::fs::try_exists(output)
            .await
            .with_context(|| format!("Failed to check for {}", output.display()))?
        {
            let previous: Vec<AnnotatedStory> = corpus::read_json(output).await?;
            info!(count = previous.len(), "resuming from existing output");
            previous
        } else {
            Vec::new()
        };
        let persisted_count = appended.len();

        let mut matched = 0usize;
        let mut skipped_no_content = 0usize;
        let mut processed_this_run = 0usize;
        let mut summaries_generated = 0usize;
        let mut errors: Vec<String> = Vec::new();

        for (i, story) in work_list.into_iter().enumerate() {
            // Persisted records cover a prefix of the content-bearing
            // work list. Walk past that prefix, checking that the work
            // list has not shifted underneath the output file.
            if matched < persisted_count {
                if !story.has_content() {
                    skipped_no_content += 1;
                    continue;
                }
                ensure!(
                    appended[matched].title == story.title,
                    "existing output {} does not line up with the current work list \
                     (record {} holds '{}', the work list has '{}'); the input, filter, \
                     sample, or seed changed since that file was written. Delete it to \
                     start over.",
                    output.display(),
                    matched,
                    appended[matched].title,
                    story.title,
                );
                matched += 1;
                continue;
            }

            info!("[{}/{}] {}", i + 1, work_list_len, story.short_title(70));

            if !story.has_content() {
                warn!(title = %story.title, "story has no content, skipping");
                skipped_no_content += 1;
                continue;
            }

            let record = self
                .annotate_story(story, i, &mut errors, &mut summaries_generated)
                .await;
            appended.push(record);
            // Crash-safety boundary: the story only counts as done once
            // the whole collection is back on disk.
            corpus::write_json_pretty(output, &appended).await?;
            processed_this_run += 1;

            tokio::time::sleep(self.config.story_delay).await;
        }

        ensure!(
            matched == persisted_count,
            "existing output {} holds {} records but the current work list accounts \
             for only {}; the input, filter, sample, or seed changed since that file \
             was written. Delete it to start over.",
            output.display(),
            persisted_count,
            matched,
        );

        info!(
            processed_this_run,
            total = appended.len(),
            errors = errors.len(),
            "annotation run complete"
        );

        Ok(build_summary(
            &appended,
            total_input,
            filtered_out,
            work_list_len,
            persisted_count,
            processed_this_run,
            skipped_no_content,
            summaries_generated,
            errors,
        ))
    }

    async fn annotate_story(
        &self,
        story: Story,
        index: usize,
        errors: &mut Vec<String>,
        summaries_generated: &mut usize,
    ) -> AnnotatedStory {
        let title = story.title.clone();
        let content = story.content.clone();
        let mut record = AnnotatedStory::from_story(story);

        let annotation_prompt = prompt::build_annotation_prompt(&title, &content);
        let outcome = self.oracle.invoke(&annotation_prompt).await;
        match interpret_response::<StoryAnnotations>(outcome) {
            Ok(annotations) => {
                info!(
                    people = annotations.people.len(),
                    places = annotations.places.len(),
                    organizations = annotations.organizations.len(),
                    theme = annotations.primary_theme.as_deref().unwrap_or("none"),
                    "annotated story"
                );
                record.annotations = annotations;
            }
            Err(failure) => {
                warn!(error = %failure, "entity extraction failed");
                errors.push(format!("Story {}: {}", index + 1, failure));
                record.extraction_error = Some(failure);
            }
        }

        if !self.config.skip_summary {
            tokio::time::sleep(self.config.inter_call_delay).await;
            let summary_prompt = prompt::build_summary_prompt(&title, &content);
            match self.oracle.invoke(&summary_prompt).await {
                OracleOutcome::Completed { stdout } => {
                    let summary = strip_code_fence(&stdout);
                    if summary.is_empty() {
                        warn!("model returned an empty summary");
                        record.summary_error = Some("empty summary response".to_string());
                    } else {
                        record.content = summary.to_string();
                        *summaries_generated += 1;
                    }
                }
                // Failure keeps the original content in place.
                failed => {
                    if let Some(failure) = failed.failure() {
                        warn!(error = %failure, "summarization failed");
                        record.summary_error = Some(failure.to_string());
                    }
                }
            }
        }

        record
    }
}

#[allow(clippy::too_many_arguments)]
fn build_summary(
    appended: &[AnnotatedStory],
    total_input: usize,
    filtered_out: usize,
    work_list_len: usize,
    already_processed: usize,
    processed_this_run: usize,
    skipped_no_content: usize,
    summaries_generated: usize,
    errors: Vec<String>,
) -> RunSummary {
    let successful_annotations = appended
        .iter()
        .filter(|record| record.annotation_succeeded())
        .count();

    let theme_breakdown = corpus::meta::frequency(appended.iter().map(|record| {
        record
            .annotations
            .primary_theme
            .clone()
            .unwrap_or_else(|| "unknown".to_string())
    }));

    let mut season_counts: HashMap<&str, usize> = HashMap::new();
    for record in appended {
        let label = record.season.map(|s| s.as_str()).unwrap_or("unknown");
        *season_counts.entry(label).or_default() += 1;
    }
    let season_breakdown = ["winter", "spring", "summer", "fall", "unknown"]
        .iter()
        .filter_map(|label| {
            season_counts
                .get(label)
                .map(|&count| (label.to_string(), count))
        })
        .collect();

    RunSummary {
        total_input,
        filtered_out,
        work_list_len,
        already_processed,
        processed_this_run,
        skipped_no_content,
        total_in_output: appended.len(),
        successful_annotations,
        summaries_generated,
        theme_breakdown,
        season_breakdown,
        errors,
    }
}

/// Strip a surrounding markdown fence from a plain-text answer.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some((_, body)) = rest.split_once('\n') else {
        return trimmed;
    };
    let body = body.trim_end();
    match body.strip_suffix("```") {
        Some(stripped) => stripped.trim_end(),
        None => body,
    }
}
