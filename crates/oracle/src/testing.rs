//! Scripted oracle for tests. Stages are generic over [`Oracle`], so
//! suites queue canned outcomes and then assert on call counts and
//! captured prompts instead of shelling out to a real model.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::client::Oracle;
use crate::outcome::OracleOutcome;

#[derive(Default)]
pub struct ScriptedOracle {
    script: Mutex<VecDeque<OracleOutcome>>,
    default_outcome: Mutex<Option<OracleOutcome>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful completion with the given stdout.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.with_outcome(OracleOutcome::completed(text))
    }

    pub fn with_outcome(self, outcome: OracleOutcome) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(outcome);
        }
        self
    }

    /// Outcome to repeat once the queue is exhausted. Without one, an
    /// exhausted script answers with a process failure.
    pub fn with_default_response(self, text: impl Into<String>) -> Self {
        if let Ok(mut default_outcome) = self.default_outcome.lock() {
            *default_outcome = Some(OracleOutcome::completed(text));
        }
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn invoke(&self, prompt: &str) -> OracleOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        if let Ok(mut script) = self.script.lock() {
            if let Some(outcome) = script.pop_front() {
                return outcome;
            }
        }
        if let Ok(default_outcome) = self.default_outcome.lock() {
            if let Some(outcome) = default_outcome.as_ref() {
                return outcome.clone();
            }
        }
        OracleOutcome::Failed {
            exit_code: None,
            detail: "scripted oracle exhausted".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_plays_in_order() {
        let oracle = ScriptedOracle::new()
            .with_response("first")
            .with_outcome(OracleOutcome::TimedOut { timeout_secs: 90 })
            .with_response("third");

        assert_eq!(oracle.invoke("a").await, OracleOutcome::completed("first"));
        assert_eq!(
            oracle.invoke("b").await,
            OracleOutcome::TimedOut { timeout_secs: 90 }
        );
        assert_eq!(oracle.invoke("c").await, OracleOutcome::completed("third"));
        assert_eq!(oracle.call_count(), 3);
        assert_eq!(oracle.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_exhausted_script_fails() {
        let oracle = ScriptedOracle::new();
        assert!(matches!(
            oracle.invoke("x").await,
            OracleOutcome::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn test_default_response_repeats() {
        let oracle = ScriptedOracle::new().with_default_response("{\"ok\": true}");
        for _ in 0..5 {
            assert_eq!(
                oracle.invoke("x").await,
                OracleOutcome::completed("{\"ok\": true}")
            );
        }
        assert_eq!(oracle.call_count(), 5);
    }
}
