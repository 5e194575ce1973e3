//! Recommendation feedback kept in a pretty-printed JSON array file.

use async_trait::async_trait;
use smartdine_model::FeedbackEntry;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::{BackendError, FeedbackStore};

/// File-backed feedback log. A missing file reads as empty and is created
/// on the first write.
pub struct JsonFeedbackStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within the process.
    write_lock: Mutex<()>,
}

impl JsonFeedbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<FeedbackEntry>, BackendError> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if json.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&json)
            .map_err(|e| BackendError::Parse(format!("{}: {}", self.path.display(), e)))
    }
}

#[async_trait]
impl FeedbackStore for JsonFeedbackStore {
    async fn record(&self, entry: &FeedbackEntry) -> Result<(), BackendError> {
        let _guard = self.write_lock.lock().await;

        // A corrupt file is an error rather than silently overwritten.
        let mut entries = self.read_all().await?;
        entries.push(entry.clone());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&entries).map_err(|e| BackendError::Parse(e.to_string()))?;
        tokio::fs::write(&self.path, json).await?;

        tracing::info!(
            id = %entry.id,
            restaurant_id = %entry.restaurant_id,
            liked = entry.liked,
            "Feedback saved"
        );
        Ok(())
    }

    async fn entries(&self) -> Result<Vec<FeedbackEntry>, BackendError> {
        self.read_all().await
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn entry(id: &str, restaurant_id: &str, liked: bool) -> FeedbackEntry {
        FeedbackEntry {
            id: id.to_string(),
            restaurant_id: restaurant_id.to_string(),
            liked,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_records_append_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFeedbackStore::new(dir.path().join("data").join("feedback.json"));
        assert!(store.entries().await.unwrap().is_empty());

        let first = entry("f1", "r001", true);
        let second = entry("f2", "r002", false);
        store.record(&first).await.unwrap();
        store.record(&second).await.unwrap();

        assert_eq!(store.entries().await.unwrap(), vec![first, second]);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"restaurantId\": \"r002\""));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback.json");
        std::fs::write(&path, "{ not a list").unwrap();

        let store = JsonFeedbackStore::new(&path);
        let result = store.record(&entry("f1", "r001", true)).await;
        assert!(matches!(result, Err(BackendError::Parse(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not a list");
    }
}
