use std::sync::Arc;

use anyhow::{Result, ensure};
use async_trait::async_trait;
use oracle::{Oracle, OracleOutcome};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::prompt;

pub const DEFAULT_FAN_IN: usize = 5;

/// One node of the reduction tree. Leaves sit at level 0; each level
/// above combines up to `fan_in` nodes into one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialSummary {
    pub level: u32,
    pub position: usize,
    pub text: String,
    /// Set when synthesis failed and `text` is the raw concatenated
    /// group rather than a model-written summary.
    pub degraded: bool,
}

impl PartialSummary {
    pub fn leaf(position: usize, text: impl Into<String>) -> Self {
        Self {
            level: 0,
            position,
            text: text.into(),
            degraded: false,
        }
    }
}

/// Seam for the one-group-to-one-summary call, so reduction logic is
/// testable without a model.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, group: &[PartialSummary]) -> OracleOutcome;
}

/// Synthesizer backed by the real oracle.
pub struct OracleSynthesizer {
    oracle: Arc<dyn Oracle>,
}

impl OracleSynthesizer {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }
}

#[async_trait]
impl Synthesizer for OracleSynthesizer {
    async fn synthesize(&self, group: &[PartialSummary]) -> OracleOutcome {
        self.oracle
            .invoke(&prompt::build_consolidation_prompt(group))
            .await
    }
}

pub struct Reducer {
    fan_in: usize,
}

impl Reducer {
    /// A fan-in below 2 cannot shrink the sequence and would loop
    /// forever, so it is rejected up front.
    pub fn new(fan_in: usize) -> Result<Self> {
        ensure!(fan_in >= 2, "fan-in must be at least 2, got {}", fan_in);
        Ok(Self { fan_in })
    }

    /// Collapse `leaves` level by level until at most `fan_in` summaries
    /// remain. A failed synthesis call degrades its group to the
    /// concatenated raw text, so the tree always terminates.
    pub async fn reduce(
        &self,
        leaves: Vec<PartialSummary>,
        synthesizer: &dyn Synthesizer,
    ) -> Vec<PartialSummary> {
        let mut current = leaves;
        let mut level: u32 = 0;
        while current.len() > self.fan_in {
            level += 1;
            info!(level, count = current.len(), "consolidating summaries");
            let mut next = Vec::with_capacity(current.len().div_ceil(self.fan_in));
            for (position, group) in current.chunks(self.fan_in).enumerate() {
                next.push(combine(group, level, position, synthesizer).await);
            }
            current = next;
        }
        current
    }
}

async fn combine(
    group: &[PartialSummary],
    level: u32,
    position: usize,
    synthesizer: &dyn Synthesizer,
) -> PartialSummary {
    match synthesizer.synthesize(group).await {
        OracleOutcome::Completed { stdout } if !stdout.trim().is_empty() => PartialSummary {
            level,
            position,
            text: stdout,
            degraded: false,
        },
        outcome => {
            match outcome.failure() {
                Some(failure) => warn!(
                    level, position, error = %failure,
                    "synthesis failed, passing the group through unsynthesized"
                ),
                None => warn!(
                    level, position,
                    "synthesis returned empty output, passing the group through unsynthesized"
                ),
            }
            PartialSummary {
                level,
                position,
                text: group
                    .iter()
                    .map(|s| s.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n\n---\n\n"),
                degraded: true,
            }
        }
    }
}
