use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::outcome::OracleOutcome;

pub const DEFAULT_TIMEOUT_SECS: u64 = 90;

const MAX_DETAIL_CHARS: usize = 500;

/// Bound captured stderr so a chatty tool cannot flood logs or output
/// records.
fn truncate_detail(raw: &str) -> String {
    match raw.char_indices().nth(MAX_DETAIL_CHARS) {
        Some((idx, _)) => format!("{}...", &raw[..idx]),
        None => raw.to_string(),
    }
}

/// Anything that can answer a prompt. The production implementation
/// shells out to a model CLI; tests substitute a scripted double.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn invoke(&self, prompt: &str) -> OracleOutcome;
}

/// How to reach the model command-line tool.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Executable name or path.
    pub command: String,
    /// Arguments placed before the prompt is piped on stdin.
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl OracleConfig {
    /// Config for the `llm` CLI with a `-m <model>` selector.
    pub fn llm(model: impl Into<String>) -> Self {
        Self {
            command: "llm".to_string(),
            args: vec!["-m".to_string(), model.into()],
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Config for the `llm` CLI relying on whatever default model the
    /// tool itself is configured with.
    pub fn llm_default() -> Self {
        Self {
            command: "llm".to_string(),
            args: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Subprocess-backed oracle. Each call spawns a fresh process, feeds
/// the prompt on stdin, and enforces the configured deadline. Whatever
/// happens to the process comes back as an `OracleOutcome`.
pub struct CliOracle {
    config: OracleConfig,
}

impl CliOracle {
    pub fn new(config: OracleConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Oracle for CliOracle {
    async fn invoke(&self, prompt: &str) -> OracleOutcome {
        let mut command = Command::new(&self.config.command);
        command
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on timeout must also reap the child.
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                warn!(command = %self.config.command, error = %err, "failed to spawn model process");
                return OracleOutcome::Failed {
                    exit_code: None,
                    detail: format!("failed to spawn '{}': {}", self.config.command, err),
                };
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            // A child that exits without reading stdin surfaces through
            // its exit status, not through this write.
            if let Err(err) = stdin.write_all(prompt.as_bytes()).await {
                debug!(error = %err, "model process closed stdin early");
            }
        }

        let timeout_secs = self.config.timeout.as_secs();
        match tokio::time::timeout(self.config.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                if output.status.success() {
                    OracleOutcome::Completed {
                        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
                    }
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    let stderr = stderr.trim();
                    OracleOutcome::Failed {
                        exit_code: output.status.code(),
                        detail: if stderr.is_empty() {
                            "process exited with failure".to_string()
                        } else {
                            truncate_detail(stderr)
                        },
                    }
                }
            }
            Ok(Err(err)) => OracleOutcome::Failed {
                exit_code: None,
                detail: format!("process error: {}", err),
            },
            Err(_) => {
                warn!(timeout_secs, "model process timed out");
                OracleOutcome::TimedOut { timeout_secs }
            }
        }
    }
}
