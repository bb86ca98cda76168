use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail, ensure};
use corpus::Story;
use corpus::text::title_case;
use oracle::{Oracle, OracleOutcome, interpret_response};
use serde::Deserialize;
use tracing::{info, warn};

use crate::metadata::{self, MetadataDigest};
use crate::prompt;
use crate::reducer::{DEFAULT_FAN_IN, OracleSynthesizer, PartialSummary, Reducer};

pub const DEFAULT_GUIDE_BATCH_SIZE: usize = 30;

const SELECTION_SAMPLE: usize = 50;
const MAX_EXAMPLES: usize = 6;
const MAX_FOLLOWUPS: usize = 5;
const RECENT_WINDOW: usize = 30;

#[derive(Debug, Clone)]
pub struct GuideConfig {
    pub batch_size: usize,
    pub fan_in: usize,
    /// Beat name woven into the prompts and the document title.
    pub topic: String,
    /// Operator-supplied background text for the final prompt.
    pub context: Option<String>,
    /// Directory for per-batch summary dumps.
    pub debug_dir: Option<PathBuf>,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_GUIDE_BATCH_SIZE,
            fan_in: DEFAULT_FAN_IN,
            topic: "this beat".to_string(),
            context: None,
            debug_dir: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SelectionResponse {
    #[serde(default)]
    selections: Vec<StorySelection>,
}

/// One representative story picked by the model, with the sample index
/// it refers to.
#[derive(Debug, Clone, Deserialize)]
pub struct StorySelection {
    pub idx: usize,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
struct FollowupResponse {
    #[serde(default)]
    followups: Vec<Followup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Followup {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub angle: String,
    #[serde(default)]
    pub why: String,
}

#[derive(Debug)]
pub struct GuideOutcome {
    pub markdown: String,
    pub batch_count: usize,
    pub errors: Vec<String>,
}

/// Assembles the coverage guide: batch prose summaries, hierarchical
/// consolidation, metadata digest, representative stories, follow-up
/// angles, and the final synthesis call.
pub struct GuideBuilder {
    oracle: Arc<dyn Oracle>,
    config: GuideConfig,
}

impl GuideBuilder {
    pub fn new(oracle: Arc<dyn Oracle>, config: GuideConfig) -> Self {
        Self { oracle, config }
    }

    pub async fn build(&self, stories: &[Story]) -> Result<GuideOutcome> {
        let digest = metadata::analyze(stories);
        let mut errors = Vec::new();

        let leaves = self.summarize_batches(stories, &mut errors).await?;
        let batch_count = leaves.len();

        let selections = self.select_representatives(stories, &mut errors).await?;
        let followups = self.identify_followups(stories, &mut errors).await?;

        let label = if leaves.len() > self.config.fan_in {
            "SECTION"
        } else {
            "BATCH"
        };
        let reducer = Reducer::new(self.config.fan_in)?;
        let synthesizer = OracleSynthesizer::new(self.oracle.clone());
        let reduced = reducer.reduce(leaves, &synthesizer).await;
        let combined = prompt::join_labeled(&reduced, label);

        info!("generating the final guide");
        let guide_prompt = prompt::build_guide_prompt(
            &digest,
            &combined,
            &self.config.topic,
            self.config.context.as_deref(),
        );
        let body = match self.oracle.invoke(&guide_prompt).await {
            OracleOutcome::Completed { stdout } if !stdout.trim().is_empty() => stdout,
            outcome => {
                let detail = outcome
                    .failure()
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "empty guide response".to_string());
                bail!("guide synthesis failed: {}", detail);
            }
        };

        let mut markdown = format!("# Beat Book: {}\n\n", title_case(&self.config.topic));
        markdown.push_str(&body);
        markdown.push_str(&render_examples(stories, &selections));
        markdown.push_str(&render_followups(&followups));

        Ok(GuideOutcome {
            markdown,
            batch_count,
            errors,
        })
    }

    /// First pass: one prose summary per contiguous batch. A failed
    /// batch degrades to a plain title listing so later levels still
    /// see which stories it covered.
    pub async fn summarize_batches(
        &self,
        stories: &[Story],
        errors: &mut Vec<String>,
    ) -> Result<Vec<PartialSummary>> {
        ensure!(self.config.batch_size > 0, "batch size must be positive");
        let total_batches = stories.len().div_ceil(self.config.batch_size);
        let mut leaves = Vec::with_capacity(total_batches);

        for (index, batch) in stories.chunks(self.config.batch_size).enumerate() {
            let batch_num = index + 1;
            info!(
                batch = batch_num,
                total = total_batches,
                stories = batch.len(),
                "summarizing batch"
            );
            let prompt_text = prompt::build_batch_summary_prompt(batch, &self.config.topic)?;
            let leaf = match self.oracle.invoke(&prompt_text).await {
                OracleOutcome::Completed { stdout } if !stdout.trim().is_empty() => {
                    PartialSummary::leaf(index, stdout)
                }
                outcome => {
                    let detail = outcome
                        .failure()
                        .map(|f| f.to_string())
                        .unwrap_or_else(|| "empty summary response".to_string());
                    warn!(batch = batch_num, error = %detail, "batch summary failed");
                    errors.push(format!("Batch {}: {}", batch_num, detail));
                    let titles = batch
                        .iter()
                        .map(|s| format!("- {}", s.title))
                        .collect::<Vec<_>>()
                        .join("\n");
                    PartialSummary {
                        level: 0,
                        position: index,
                        text: format!("Stories in this batch (summary unavailable):\n{}", titles),
                        degraded: true,
                    }
                }
            };
            if let Some(dir) = &self.config.debug_dir {
                let path = dir.join(format!("debug_batch_{:03}.md", batch_num));
                tokio::fs::write(&path, &leaf.text)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            leaves.push(leaf);
        }
        Ok(leaves)
    }

    async fn select_representatives(
        &self,
        stories: &[Story],
        errors: &mut Vec<String>,
    ) -> Result<Vec<StorySelection>> {
        let sample = &stories[..stories.len().min(SELECTION_SAMPLE)];
        let prompt_text = prompt::build_selection_prompt(sample, stories.len())?;
        info!("selecting representative stories");
        let outcome = self.oracle.invoke(&prompt_text).await;
        let mut selections = match interpret_response::<SelectionResponse>(outcome) {
            Ok(response) => response.selections,
            Err(failure) => {
                warn!(error = %failure, "story selection failed, falling back to the first few");
                errors.push(format!("Story selection: {}", failure));
                (0..stories.len().min(5))
                    .map(|idx| StorySelection {
                        idx,
                        kind: "example".to_string(),
                        reason: "Representative story".to_string(),
                    })
                    .collect()
            }
        };
        selections.retain(|sel| sel.idx < sample.len());
        selections.truncate(MAX_EXAMPLES);
        Ok(selections)
    }

    async fn identify_followups(
        &self,
        stories: &[Story],
        errors: &mut Vec<String>,
    ) -> Result<Vec<Followup>> {
        let mut recent: Vec<&Story> = stories.iter().collect();
        recent.sort_by(|a, b| {
            b.date
                .as_deref()
                .unwrap_or("")
                .cmp(a.date.as_deref().unwrap_or(""))
        });
        recent.truncate(RECENT_WINDOW);

        let prompt_text = prompt::build_followup_prompt(&recent)?;
        info!("identifying follow-up opportunities");
        let outcome = self.oracle.invoke(&prompt_text).await;
        let mut followups = match interpret_response::<FollowupResponse>(outcome) {
            Ok(response) => response.followups,
            Err(failure) => {
                warn!(error = %failure, "follow-up identification failed");
                errors.push(format!("Follow-up identification: {}", failure));
                Vec::new()
            }
        };
        followups.truncate(MAX_FOLLOWUPS);
        Ok(followups)
    }
}

/// Render leaf summaries alone, for runs stopped before final synthesis.
pub fn render_batch_summaries(leaves: &[PartialSummary]) -> String {
    let mut out = String::new();
    for (i, leaf) in leaves.iter().enumerate() {
        out.push_str(&format!("\n\n## Batch {}\n\n{}\n", i + 1, leaf.text));
    }
    out
}

fn render_examples(stories: &[Story], selections: &[StorySelection]) -> String {
    let mut out = String::from("\n\n## Story Examples\n\n");
    out.push_str("Here are a few pieces that show the range of coverage on this beat:\n\n");
    for sel in selections {
        let Some(story) = stories.get(sel.idx) else {
            continue;
        };
        let kind = if sel.kind.is_empty() {
            "Example".to_string()
        } else {
            title_case(&sel.kind)
        };
        out.push_str(&format!("### {}: \"{}\"\n", kind, story.title));
        out.push_str(&format!(
            "*{}*\n\n",
            story.date.as_deref().unwrap_or("Date unknown")
        ));
        let reason = if sel.reason.is_empty() {
            "Representative of coverage"
        } else {
            &sel.reason
        };
        out.push_str(&format!("**Why it's a good example:** {}\n\n", reason));
    }
    out
}

fn render_followups(followups: &[Followup]) -> String {
    let mut out = String::from("\n\n## Potential Follow-Ups\n\n");
    out.push_str(
        "*Note: This dataset may be outdated. These angles might have been covered already \
         or circumstances may have changed. Always check for recent updates before pursuing.*\n\n",
    );
    if followups.is_empty() {
        out.push_str("No specific follow-ups identified from this dataset.\n");
        return out;
    }
    for (i, followup) in followups.iter().enumerate() {
        let title = if followup.title.is_empty() {
            "Untitled"
        } else {
            &followup.title
        };
        let angle = if followup.angle.is_empty() {
            "Follow-up opportunity"
        } else {
            &followup.angle
        };
        let why = if followup.why.is_empty() {
            "Needs update"
        } else {
            &followup.why
        };
        out.push_str(&format!("{}. **{}**\n", i + 1, title));
        out.push_str(&format!("   - Angle: {}\n", angle));
        out.push_str(&format!("   - Why: {}\n\n", why));
    }
    out
}
