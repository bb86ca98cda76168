use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::outcome::{ExtractionFailure, OracleOutcome};

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").unwrap());

const EXCERPT_CHARS: usize = 500;

/// Which recovery strategy produced the value. Logged so that drifting
/// model output habits show up in the run logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// The whole response was valid JSON.
    Direct,
    /// JSON lived inside a markdown code fence.
    FencedBlock,
    /// A balanced object was carved out of surrounding prose.
    BraceScan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed {
        value: Value,
        strategy: ParseStrategy,
    },
    Unparseable {
        reason: String,
        excerpt: String,
    },
}

impl ParseOutcome {
    pub fn failure(&self) -> Option<ExtractionFailure> {
        match self {
            ParseOutcome::Parsed { .. } => None,
            ParseOutcome::Unparseable { reason, excerpt } => Some(ExtractionFailure::Parse {
                reason: format!("{}; response starts: {}", reason, excerpt),
            }),
        }
    }

    #[cfg(test)]
    pub fn value(self) -> Option<Value> {
        match self {
            ParseOutcome::Parsed { value, .. } => Some(value),
            ParseOutcome::Unparseable { .. } => None,
        }
    }
}

/// Recover JSON from raw model output. Models wrap answers in prose or
/// markdown fences often enough that three attempts are made in order:
/// parse the whole response, parse the first fenced block, then scan
/// for the first balanced top-level object. Never panics on any input.
pub fn recover_json(raw: &str) -> ParseOutcome {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ParseOutcome::Unparseable {
            reason: "empty response".to_string(),
            excerpt: String::new(),
        };
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return ParseOutcome::Parsed {
            value,
            strategy: ParseStrategy::Direct,
        };
    }

    if let Some(caps) = FENCED_BLOCK.captures(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(caps[1].trim()) {
            return ParseOutcome::Parsed {
                value,
                strategy: ParseStrategy::FencedBlock,
            };
        }
    }

    let mut search_from = 0;
    while let Some(rel) = trimmed[search_from..].find('{') {
        let start = search_from + rel;
        if let Some(candidate) = balanced_object(trimmed, start) {
            if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                return ParseOutcome::Parsed {
                    value,
                    strategy: ParseStrategy::BraceScan,
                };
            }
        }
        search_from = start + 1;
    }

    ParseOutcome::Unparseable {
        reason: "no parseable JSON object in response".to_string(),
        excerpt: excerpt(trimmed),
    }
}

/// Drive an invocation outcome all the way to a typed record: recover
/// JSON from the raw text, then decode it. Any miss along the way
/// comes back as the failure marker to record on the affected item.
pub fn interpret_response<T: DeserializeOwned>(
    outcome: OracleOutcome,
) -> Result<T, ExtractionFailure> {
    match outcome {
        OracleOutcome::Completed { stdout } => match recover_json(&stdout) {
            ParseOutcome::Parsed { value, strategy } => {
                debug!(?strategy, "recovered JSON from response");
                serde_json::from_value(value).map_err(|err| ExtractionFailure::Parse {
                    reason: format!("response JSON does not match the expected shape: {}", err),
                })
            }
            ParseOutcome::Unparseable { reason, excerpt } => Err(ExtractionFailure::Parse {
                reason: format!("{}; response starts: {}", reason, excerpt),
            }),
        },
        OracleOutcome::TimedOut { timeout_secs } => {
            Err(ExtractionFailure::Timeout { timeout_secs })
        }
        OracleOutcome::Failed { exit_code, detail } => {
            Err(ExtractionFailure::Process { exit_code, detail })
        }
    }
}

/// Slice out a balanced `{...}` span starting at `start`, tracking
/// string literals and escapes so braces inside strings do not count.
/// `start` must sit on a `{` byte.
fn balanced_object(raw: &str, start: usize) -> Option<&str> {
    let bytes = raw.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn excerpt(raw: &str) -> String {
    match raw.char_indices().nth(EXCERPT_CHARS) {
        Some((idx, _)) => format!("{}...", &raw[..idx]),
        None => raw.to_string(),
    }
}
