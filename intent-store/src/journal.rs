//! Durable audit journal implementations.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::StoreResult;
use crate::audit::AuditEvent;

/// Append-only sink for audit events. No operation rewrites or truncates a
/// journal.
#[async_trait]
pub trait AuditJournal: Send + Sync {
    /// Appends an event.
    async fn append(&self, event: &AuditEvent) -> StoreResult<()>;

    /// Returns the most recent `limit` events, ordered oldest to newest.
    async fn tail(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;
}

/// File-backed journal writing newline-delimited JSON entries.
pub struct FileAuditJournal {
    path: PathBuf,
    file: Mutex<fs::File>,
}

impl FileAuditJournal {
    /// Opens (or creates) a journal file at the provided path.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors encountered while preparing the file.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Returns the underlying path of the journal file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditJournal for FileAuditJournal {
    async fn append(&self, event: &AuditEvent) -> StoreResult<()> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        let mut guard = self.file.lock().await;
        guard.write_all(&line).await?;
        guard.flush().await?;
        Ok(())
    }

    async fn tail(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        // Appends hold this lock for the whole line.
        let _guard = self.file.lock().await;
        let data = fs::read(&self.path).await?;

        let mut events = data
            .split(|byte| *byte == b'\n')
            .filter(|chunk| !chunk.is_empty())
            .map(serde_json::from_slice::<AuditEvent>)
            .collect::<Result<Vec<_>, _>>()?;

        let skip = events.len().saturating_sub(limit);
        Ok(events.split_off(skip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditEventKind;
    use serde_json::json;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("intentcore-audit-{}.ndjson", Uuid::new_v4()));
        path
    }

    #[tokio::test]
    async fn append_and_tail_keep_order() {
        let path = temp_path();
        let journal = FileAuditJournal::open(&path).await.unwrap();

        for step in 1..=3 {
            let event = AuditEvent::new(AuditEventKind::GovernanceEnforced, json!({"step": step}));
            journal.append(&event).await.unwrap();
        }

        let tail = journal.tail(2).await.unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].payload(), &json!({"step": 2}));
        assert_eq!(tail[1].payload(), &json!({"step": 3}));
        assert!(journal.tail(0).await.unwrap().is_empty());

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn reopening_appends_to_existing_entries() {
        let path = temp_path();
        {
            let journal = FileAuditJournal::open(&path).await.unwrap();
            journal
                .append(&AuditEvent::new(AuditEventKind::ExtractionCompleted, json!({})))
                .await
                .unwrap();
        }

        let journal = FileAuditJournal::open(&path).await.unwrap();
        journal
            .append(&AuditEvent::new(AuditEventKind::ReviewRequested, json!({})))
            .await
            .unwrap();

        let events = journal.tail(10).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind(), AuditEventKind::ExtractionCompleted);
        assert_eq!(events[1].kind(), AuditEventKind::ReviewRequested);

        let _ = std::fs::remove_file(path);
    }
}
