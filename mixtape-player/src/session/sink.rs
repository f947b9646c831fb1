//! Analytics sink contract and bundled sinks
//!
//! The accumulator only needs an asynchronous "record session" call. Durability, ordering
//! and deduplication are the sink's concern: records may arrive out of order relative to
//! session start times.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::{Error, Result};

/// Immutable listening record handed to the sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub user_id: i64,
    /// Navigation identity of the item (local id, or origin id for remote items)
    pub song_id: String,
    pub song_title: String,
    pub artist_name: String,
    /// Time spent playing, always at least one second
    pub listening_duration_ms: u64,
}

/// Durable destination for session records
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record_session(&self, record: SessionRecord) -> Result<()>;
}

/// Sink that only logs records
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl AnalyticsSink for LogSink {
    async fn record_session(&self, record: SessionRecord) -> Result<()> {
        info!(
            user_id = record.user_id,
            song_id = %record.song_id,
            title = %record.song_title,
            listened_ms = record.listening_duration_ms,
            "Listening session recorded"
        );
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord<'a> {
    recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    record: &'a SessionRecord,
}

/// Append-only JSON lines file, one record per line
///
/// Each line carries the sink's own `recordedAt` timestamp alongside the record.
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every record in the file
    pub async fn read_all(&self) -> Result<Vec<SessionRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(Error::from))
            .collect()
    }
}

#[async_trait]
impl AnalyticsSink for JsonLinesSink {
    async fn record_session(&self, record: SessionRecord) -> Result<()> {
        let mut line = serde_json::to_string(&StoredRecord {
            recorded_at: mixtape_common::time::now(),
            record: &record,
        })?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| Error::Sink(format!("open {}: {}", self.path.display(), e)))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
