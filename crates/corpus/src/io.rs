use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::story::Story;

/// Parse an already-loaded corpus document. Accepts either a bare list
/// of stories or an object wrapping the list under a `stories` or
/// `articles` key.
pub fn parse_corpus(value: Value) -> Result<Vec<Story>> {
    let list = match value {
        Value::Array(_) => value,
        Value::Object(ref map) => match map.get("stories").or_else(|| map.get("articles")) {
            Some(inner @ Value::Array(_)) => inner.clone(),
            Some(_) => bail!("corpus 'stories'/'articles' key does not hold a list"),
            None => bail!(
                "corpus JSON structure not recognized: expected a list of stories \
                 or an object with a 'stories' or 'articles' key"
            ),
        },
        _ => bail!("corpus JSON structure not recognized: expected a list or an object"),
    };
    serde_json::from_value(list).context("Failed to decode corpus entries as story records")
}

/// Load a corpus file from disk.
pub async fn load_corpus(path: &Path) -> Result<Vec<Story>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read corpus file {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))?;
    let stories = parse_corpus(value)?;
    info!(count = stories.len(), path = %path.display(), "loaded corpus");
    Ok(stories)
}

/// Read any JSON file into a typed value.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {} as JSON", path.display()))
}

/// Write a value as pretty JSON via a sibling temp file and rename, so
/// a crash mid-write never leaves a truncated file at `path`.
pub async fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let payload =
        serde_json::to_vec_pretty(value).context("Failed to serialize value to JSON")?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid output path {}", path.display()))?;
    let tmp = path.with_file_name(format!("{file_name}.tmp"));
    tokio::fs::write(&tmp, &payload)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to move {} into place", tmp.display()))?;
    Ok(())
}
