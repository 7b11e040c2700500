use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::timeout;

use crate::schema::RunMetadata;
use crate::utils::METADATA_FILENAME;

/// Timeout for blocking JSON serialization
const BLOCKING_SERIALIZATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Write `metadata` as pretty JSON to `<output_dir>/metadata.json`
///
/// An existing file from a previous run is replaced.
pub async fn save_metadata(metadata: &RunMetadata, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(METADATA_FILENAME);

    let metadata = metadata.clone();
    let blocking_task = tokio::task::spawn_blocking(move || serde_json::to_string_pretty(&metadata));

    let json_str = match timeout(BLOCKING_SERIALIZATION_TIMEOUT, blocking_task).await {
        Ok(Ok(result)) => result.context("Failed to serialize run metadata")?,
        Ok(Err(e)) => return Err(anyhow::anyhow!("JSON serialization task panicked: {e}")),
        Err(_) => {
            log::warn!("JSON serialization timeout (timeout: {BLOCKING_SERIALIZATION_TIMEOUT:?})");
            return Err(anyhow::anyhow!(
                "JSON serialization timed out after {BLOCKING_SERIALIZATION_TIMEOUT:?}"
            ));
        }
    };

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    tokio::fs::write(&path, json_str)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

/// Read back a previously saved summary
pub async fn load_metadata(path: &Path) -> Result<RunMetadata> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Malformed metadata in {}", path.display()))
}
