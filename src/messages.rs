use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MessageError {
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Timestamp format for `sent_at`. Fixed-width local time without an
/// offset, so lexicographic comparison matches chronological order.
const SENT_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub name: String,
    pub email: String,
    pub nachricht: String,
    pub sent_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredMessage {
    pub id: String,
    #[serde(flatten)]
    pub record: MessageRecord,
}

/// Flat-file contact message store: one JSON file per record, named by
/// an MD5 hash of the submission timestamp. Records are immutable once
/// written; deletion only happens out of band.
pub struct MessageStore {
    dir: PathBuf,
}

impl MessageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Persists a submission and returns its file id. Collisions would
    /// need two submissions in the same microsecond; at human submission
    /// rates that is negligible and not adversarially hardened.
    pub async fn save(
        &self,
        name: &str,
        email: &str,
        nachricht: &str,
    ) -> Result<String, MessageError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let sent_at = Local::now().format(SENT_AT_FORMAT).to_string();
        let id = format!("{:x}", md5::compute(sent_at.as_bytes()));

        let record = MessageRecord {
            name: name.to_string(),
            email: email.to_string(),
            nachricht: nachricht.to_string(),
            sent_at,
        };

        let json = serde_json::to_string_pretty(&record)?;
        tokio::fs::write(self.dir.join(format!("{}.json", id)), json).await?;

        Ok(id)
    }

    /// All stored messages, newest first. Unreadable files are skipped
    /// with a warning so one corrupt record cannot break the listing.
    pub async fn list(&self) -> Result<Vec<StoredMessage>, MessageError> {
        let mut messages = Vec::new();

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(messages),
            Err(err) => return Err(err.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            match read_record(&path).await {
                Ok(record) => {
                    let id = path
                        .file_stem()
                        .and_then(|stem| stem.to_str())
                        .unwrap_or_default()
                        .to_string();
                    messages.push(StoredMessage { id, record });
                }
                Err(err) => {
                    tracing::warn!("skipping unreadable message file {}: {}", path.display(), err);
                }
            }
        }

        // sent_at is fixed-width local time, so string order is date order.
        messages.sort_by(|a, b| b.record.sent_at.cmp(&a.record.sent_at));
        Ok(messages)
    }
}

async fn read_record(path: &Path) -> Result<MessageRecord, MessageError> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_save_then_list_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = MessageStore::new(dir.path());

        let before = Local::now().format(SENT_AT_FORMAT).to_string();
        let id = store.save("A", "a@x.com", "hi").await.unwrap();

        let messages = store.list().await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, id);
        assert_eq!(messages[0].record.name, "A");
        assert_eq!(messages[0].record.email, "a@x.com");
        assert_eq!(messages[0].record.nachricht, "hi");
        assert!(messages[0].record.sent_at >= before);
    }

    #[tokio::test]
    async fn test_two_saves_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = MessageStore::new(dir.path());

        let first = store.save("A", "a@x.com", "erste").await.unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
        let second = store.save("B", "b@x.com", "zweite").await.unwrap();

        assert_ne!(first, second);

        let messages = store.list().await.unwrap();
        assert_eq!(messages.len(), 2);
        // Newest first.
        assert_eq!(messages[0].record.name, "B");
        assert_eq!(messages[1].record.name, "A");
    }

    #[tokio::test]
    async fn test_unreadable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = MessageStore::new(dir.path());

        store.save("A", "a@x.com", "hi").await.unwrap();
        std::fs::write(dir.path().join("kaputt.json"), "not json").unwrap();
        std::fs::write(dir.path().join("notizen.txt"), "ignored").unwrap();

        let messages = store.list().await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].record.name, "A");
    }

    #[tokio::test]
    async fn test_list_without_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MessageStore::new(dir.path().join("nie-angelegt"));
        assert!(store.list().await.unwrap().is_empty());
    }
}
