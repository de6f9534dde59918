//! Async loading and saving of the dataset JSON and the roster/group CSVs

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shorts_core::{Dataset, GroupRecord, RosterRecord};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
            info!("📁 Created directory: {}", parent.display());
        }
    }
    Ok(())
}

pub async fn load_dataset(path: &Path) -> Result<Dataset> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Cannot read dataset {}", path.display()))?;
    let dataset = Dataset::from_json_str(&content)
        .with_context(|| format!("Invalid dataset JSON in {}", path.display()))?;

    debug!("📁 Loaded {} groups from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Like [`load_dataset`], but a missing or unreadable file yields an empty dataset
pub async fn load_dataset_or_empty(path: &Path) -> Dataset {
    if !path.exists() {
        return Dataset::new();
    }

    match load_dataset(path).await {
        Ok(dataset) => dataset,
        Err(e) => {
            warn!("Starting from an empty dataset: {:#}", e);
            Dataset::new()
        }
    }
}

pub async fn save_dataset(path: &Path, dataset: &Dataset) -> Result<()> {
    ensure_parent(path).await?;
    let content = dataset.to_json_string()?;
    fs::write(path, content)
        .await
        .with_context(|| format!("Cannot write dataset {}", path.display()))?;

    debug!("💾 Wrote {} groups to {}", dataset.len(), path.display());
    Ok(())
}

/// Merge `update` into the dataset stored at `path`. Groups in `update`
/// replace stored groups of the same name.
pub async fn merge_into_file(path: &Path, update: Dataset) -> Result<Dataset> {
    let mut stored = load_dataset_or_empty(path).await;
    stored.merge(update);
    save_dataset(path, &stored).await?;
    Ok(stored)
}

pub async fn load_roster(path: &Path) -> Result<Vec<RosterRecord>> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("Cannot read roster {}", path.display()))?;
    let rows = RosterRecord::from_reader(bytes.as_slice())
        .with_context(|| format!("Invalid roster CSV in {}", path.display()))?;

    debug!("📁 Loaded {} roster rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub async fn load_groups(path: &Path) -> Result<Vec<GroupRecord>> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("Cannot read group CSV {}", path.display()))?;
    let groups = GroupRecord::from_reader(bytes.as_slice())
        .with_context(|| format!("Invalid group CSV in {}", path.display()))?;

    debug!("📁 Loaded {} groups from {}", groups.len(), path.display());
    Ok(groups)
}

pub async fn save_groups(path: &Path, groups: &[GroupRecord]) -> Result<()> {
    ensure_parent(path).await?;
    let mut buffer = Vec::new();
    GroupRecord::write_all(groups, &mut buffer)?;
    fs::write(path, buffer)
        .await
        .with_context(|| format!("Cannot write group CSV {}", path.display()))?;
    Ok(())
}

pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

pub async fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path).await?;
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)
        .await
        .with_context(|| format!("Cannot write {}", path.display()))?;
    Ok(())
}
