use std::fmt;

use serde::{Deserialize, Serialize};

/// Everything a model invocation can come back with. The adapter owns
/// the process boundary, so callers never see a raised error from it,
/// only one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleOutcome {
    /// The process exited successfully; `stdout` is its trimmed output.
    Completed { stdout: String },
    /// The process outlived its deadline and was killed.
    TimedOut { timeout_secs: u64 },
    /// The process could not be started, or exited with a failure.
    Failed {
        exit_code: Option<i32>,
        detail: String,
    },
}

impl OracleOutcome {
    pub fn completed(stdout: impl Into<String>) -> Self {
        OracleOutcome::Completed {
            stdout: stdout.into(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, OracleOutcome::Completed { .. })
    }

    /// The failure marker for a non-completed outcome, suitable for
    /// recording on an output record.
    pub fn failure(&self) -> Option<ExtractionFailure> {
        match self {
            OracleOutcome::Completed { .. } => None,
            OracleOutcome::TimedOut { timeout_secs } => Some(ExtractionFailure::Timeout {
                timeout_secs: *timeout_secs,
            }),
            OracleOutcome::Failed { exit_code, detail } => Some(ExtractionFailure::Process {
                exit_code: *exit_code,
                detail: detail.clone(),
            }),
        }
    }
}

/// Serializable marker explaining why a record carries no model output.
/// These land in output files next to the untouched input fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionFailure {
    Timeout { timeout_secs: u64 },
    Process {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
        detail: String,
    },
    Parse { reason: String },
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionFailure::Timeout { timeout_secs } => {
                write!(f, "model timeout after {}s", timeout_secs)
            }
            ExtractionFailure::Process {
                exit_code: Some(code),
                detail,
            } => write!(f, "model process failed (exit {}): {}", code, detail),
            ExtractionFailure::Process {
                exit_code: None,
                detail,
            } => write!(f, "model process failed: {}", detail),
            ExtractionFailure::Parse { reason } => write!(f, "response parse error: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_marker_for_timeout() {
        let outcome = OracleOutcome::TimedOut { timeout_secs: 90 };
        assert_eq!(
            outcome.failure(),
            Some(ExtractionFailure::Timeout { timeout_secs: 90 })
        );
    }

    #[test]
    fn test_completed_has_no_failure_marker() {
        assert!(OracleOutcome::completed("ok").failure().is_none());
    }

    #[test]
    fn test_failure_serialization_is_tagged() {
        let marker = ExtractionFailure::Parse {
            reason: "no JSON found".to_string(),
        };
        let json = serde_json::to_value(&marker).unwrap();
        assert_eq!(json["kind"], "parse");
        assert_eq!(json["reason"], "no JSON found");
    }

    #[test]
    fn test_process_failure_display() {
        let marker = ExtractionFailure::Process {
            exit_code: Some(2),
            detail: "no such model".to_string(),
        };
        assert_eq!(
            marker.to_string(),
            "model process failed (exit 2): no such model"
        );
    }
}
