// File-backed QueueStore Implementation

use async_trait::async_trait;
use formsync_core::domain::SaveJob;
use formsync_core::error::{AppError, Result};
use formsync_core::port::QueueStore;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Durable queue store backed by one JSON snapshot file.
///
/// A missing file reads as an empty queue; a present-but-unparsable file is
/// a storage error (how that is handled is the queue's read policy). Writes
/// go to a sibling temp file and rename over the snapshot, so a crashed
/// write never leaves a torn record behind.
pub struct FileQueueStore {
    path: PathBuf,
}

impl FileQueueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl QueueStore for FileQueueStore {
    async fn load(&self) -> Result<Vec<SaveJob>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No queue snapshot yet, reading as empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to read queue snapshot {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&raw).map_err(|e| {
            AppError::Storage(format!(
                "Queue snapshot {} is unparsable: {}",
                self.path.display(),
                e
            ))
        })
    }

    async fn store(&self, jobs: &[SaveJob]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::Storage(format!(
                        "Failed to create queue directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let raw = serde_json::to_string(jobs)?;
        let temp = self.temp_path();

        tokio::fs::write(&temp, raw).await.map_err(|e| {
            AppError::Storage(format!("Failed to write {}: {}", temp.display(), e))
        })?;
        tokio::fs::rename(&temp, &self.path).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to replace queue snapshot {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!(path = %self.path.display(), jobs = jobs.len(), "Persisted queue snapshot");
        Ok(())
    }
}
