//! Test helper modules for mixtape-player integration tests
//!
//! Provides reusable test infrastructure components:
//! - Queue item builders
//! - RecordingSink: captures session records in memory
//! - FailingSink / GatedSink: sink failure and slow-sink injection

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mixtape_player::playback::{LocalTrack, QueueItem, RemoteTrack};
use mixtape_player::session::{AnalyticsSink, SessionRecord};
use mixtape_player::{Error, Result};
use tokio::sync::Semaphore;

pub fn local_item(id: i64) -> QueueItem {
    QueueItem::Local(LocalTrack {
        id,
        title: format!("Local Song {id}"),
        artist: format!("Artist {id}"),
        local_audio_path: PathBuf::from(format!("/music/{id}.flac")),
        local_artwork_path: Some(PathBuf::from(format!("/music/{id}.jpg"))),
        duration_ms: 200_000,
        liked: false,
    })
}

pub fn remote_item(id: &str, origin_local_id: Option<i64>, duration: &str) -> QueueItem {
    QueueItem::Remote(RemoteTrack {
        id: id.to_string(),
        title: format!("Remote Song {id}"),
        artist: "Remote Artist".to_string(),
        remote_artwork_url: format!("https://cdn.example/art/{id}.jpg"),
        remote_audio_url: format!("https://cdn.example/audio/{id}.mp3"),
        duration_formatted: duration.to_string(),
        origin_local_id,
    })
}

/// Queue of `len` local items with ids `0..len`
pub fn local_queue(len: usize) -> Vec<QueueItem> {
    (0..len as i64).map(local_item).collect()
}

/// Mixed queue: local, remote with origin, remote without origin, repeating
pub fn mixed_queue(len: usize) -> Vec<QueueItem> {
    (0..len)
        .map(|n| match n % 3 {
            0 => local_item(n as i64),
            1 => remote_item(&format!("r{n}"), Some(1_000 + n as i64), "2:30"),
            _ => remote_item(&format!("r{n}"), None, "4:05"),
        })
        .collect()
}

/// Sink that keeps every record in memory
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<Vec<SessionRecord>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn records(&self) -> Vec<SessionRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalyticsSink for RecordingSink {
    async fn record_session(&self, record: SessionRecord) -> Result<()> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}

/// Sink that rejects every record
#[derive(Default)]
pub struct FailingSink {
    attempts: Mutex<usize>,
}

impl FailingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl AnalyticsSink for FailingSink {
    async fn record_session(&self, _record: SessionRecord) -> Result<()> {
        *self.attempts.lock().unwrap() += 1;
        Err(Error::Sink("analytics store unavailable".to_string()))
    }
}

/// Sink that holds every record until `open()` is called
pub struct GatedSink {
    gate: Semaphore,
    inner: RecordingSink,
}

impl GatedSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            inner: RecordingSink::default(),
        })
    }

    pub fn open(&self) {
        self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
    }

    pub fn records(&self) -> Vec<SessionRecord> {
        self.inner.records()
    }
}

#[async_trait]
impl AnalyticsSink for GatedSink {
    async fn record_session(&self, record: SessionRecord) -> Result<()> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| Error::Sink(e.to_string()))?;
        self.inner.record_session(record).await
    }
}
