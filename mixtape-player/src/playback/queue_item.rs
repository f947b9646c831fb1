//! Queue items
//!
//! A [`QueueItem`] is an immutable value. When underlying data changes (a like toggled
//! elsewhere, refreshed metadata) the whole item is replaced, see
//! [`QueueController::replace_item`](super::QueueController::replace_item).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix applied to remote items' queue keys so they never collide with local ids
pub const REMOTE_KEY_PREFIX: &str = "remote_";

/// Track stored on the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalTrack {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub local_audio_path: PathBuf,
    #[serde(default)]
    pub local_artwork_path: Option<PathBuf>,
    pub duration_ms: u64,
    #[serde(default)]
    pub liked: bool,
}

/// Track streamed from a remote catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTrack {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub remote_artwork_url: String,
    pub remote_audio_url: String,
    /// Duration as reported by the remote catalog, `"mm:ss"`
    pub duration_formatted: String,
    /// Id of the local track this remote entry was derived from, if any
    #[serde(default)]
    pub origin_local_id: Option<i64>,
}

/// Something playable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueueItem {
    Local(LocalTrack),
    Remote(RemoteTrack),
}

/// Where the playback engine should read audio from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSource<'a> {
    File(&'a Path),
    Url(&'a str),
}

impl QueueItem {
    pub fn title(&self) -> &str {
        match self {
            QueueItem::Local(track) => &track.title,
            QueueItem::Remote(track) => &track.title,
        }
    }

    pub fn artist(&self) -> &str {
        match self {
            QueueItem::Local(track) => &track.artist,
            QueueItem::Remote(track) => &track.artist,
        }
    }

    /// Duration in milliseconds
    ///
    /// The only place item duration is derived: stored value for local tracks, parsed
    /// `"mm:ss"` string for remote tracks.
    pub fn duration_ms(&self) -> u64 {
        match self {
            QueueItem::Local(track) => track.duration_ms,
            QueueItem::Remote(track) => parse_duration_ms(&track.duration_formatted),
        }
    }

    /// Queue-internal identity, unique within a queue snapshot
    ///
    /// Built from the variant and the item's own id: local items use their native id,
    /// remote items their remote id behind [`REMOTE_KEY_PREFIX`]. The origin id is never
    /// part of the key; several remote streams may share one origin.
    pub fn queue_key(&self) -> String {
        match self {
            QueueItem::Local(track) => track.id.to_string(),
            QueueItem::Remote(track) => format!("{REMOTE_KEY_PREFIX}{}", track.id),
        }
    }

    /// Identity used to route to detail views and to label analytics records
    ///
    /// Local items use their native id. Remote items use their origin id when present,
    /// otherwise the remote id, with no prefix.
    pub fn navigation_id(&self) -> String {
        match self {
            QueueItem::Local(track) => track.id.to_string(),
            QueueItem::Remote(track) => match track.origin_local_id {
                Some(origin) => origin.to_string(),
                None => track.id.clone(),
            },
        }
    }

    pub fn audio_source(&self) -> AudioSource<'_> {
        match self {
            QueueItem::Local(track) => AudioSource::File(&track.local_audio_path),
            QueueItem::Remote(track) => AudioSource::Url(&track.remote_audio_url),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, QueueItem::Remote(_))
    }
}

/// Parse a `"mm:ss"` duration into milliseconds
///
/// Non-numeric or missing components count as zero, so `"bad:ss"` and `""` both yield 0.
pub fn parse_duration_ms(formatted: &str) -> u64 {
    let mut parts = formatted.split(':');
    let minutes = parse_component(parts.next());
    let seconds = parse_component(parts.next());
    minutes
        .saturating_mul(60_000)
        .saturating_add(seconds.saturating_mul(1_000))
}

fn parse_component(part: Option<&str>) -> u64 {
    part.and_then(|p| p.trim().parse::<u64>().ok()).unwrap_or(0)
}
