// Quiz progress store
//
// Daily correct/total counters persisted as a single JSON object in
// quiz_progress.json, keyed by ISO date.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayProgress {
    pub correct: u32,
    pub total: u32,
}

/// Dates sort lexically, so a BTreeMap keeps them chronological.
pub type ProgressMap = BTreeMap<String, DayProgress>;

/// Body of `POST /api/quiz/progress`. Every field is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgressUpdate {
    pub date: Option<String>,
    pub correct: Option<u32>,
    pub total: Option<u32>,
}

impl ProgressUpdate {
    /// `None` when any field is missing or the date is blank.
    pub fn into_entry(self) -> Option<(String, DayProgress)> {
        let date = self.date.filter(|d| !d.trim().is_empty())?;
        Some((
            date,
            DayProgress {
                correct: self.correct?,
                total: self.total?,
            },
        ))
    }
}

pub struct ProgressStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<ProgressMap> {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_map(&path))
            .await
            .context("Progress read task failed")?
    }

    /// Record one day's counters, replacing any earlier entry for that date.
    pub async fn record(&self, date: String, progress: DayProgress) -> Result<()> {
        let _guard = self.lock.lock().await;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let mut map = read_map(&path)?;
            map.insert(date, progress);
            write_map(&path, &map)
        })
        .await
        .context("Progress write task failed")?
    }
}

// Blocking file helpers; callers run them on the blocking pool.

fn ensure_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    if !path.exists() {
        fs::write(path, "{}").with_context(|| format!("Failed to create {}", path.display()))?;
    }
    Ok(())
}

fn read_map(path: &Path) -> Result<ProgressMap> {
    ensure_file(path)?;
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read progress from {}", path.display()))?;

    match serde_json::from_str(&contents) {
        Ok(map) => Ok(map),
        Err(e) => {
            tracing::warn!("Ignoring unreadable progress file {}: {}", path.display(), e);
            Ok(ProgressMap::new())
        }
    }
}

fn write_map(path: &Path, map: &ProgressMap) -> Result<()> {
    ensure_file(path)?;
    let json = serde_json::to_string_pretty(map).context("Failed to serialize progress")?;
    fs::write(path, json).with_context(|| format!("Failed to save progress to {}", path.display()))
}
