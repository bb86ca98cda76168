pub mod annotate;
pub mod chronicle;
pub mod classify;
pub mod entities;
pub mod guide;

use std::sync::Arc;
use std::time::Duration;

use oracle::{CliOracle, Oracle, OracleConfig};

/// Subprocess oracle for a command. Without a model selector the `llm`
/// CLI answers with its own configured default model.
pub(crate) fn build_oracle(model: Option<&str>, timeout_secs: u64) -> Arc<dyn Oracle> {
    let config = match model {
        Some(model) => OracleConfig::llm(model),
        None => OracleConfig::llm_default(),
    }
    .with_timeout(Duration::from_secs(timeout_secs));
    Arc::new(CliOracle::new(config))
}
