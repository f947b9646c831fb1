//! Playback-related type definitions
//!
//! Supporting types shared between the queue controller and event consumers.

use serde::{Deserialize, Serialize};

/// Where the current queue was started from
///
/// Provenance tag only. Navigation never depends on it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackContext {
    #[default]
    None,
    Library,
    RecentlyPlayed,
    NewSongs,
    TopSongs,
    Recommendation,
}

impl std::fmt::Display for PlaybackContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackContext::None => write!(f, "none"),
            PlaybackContext::Library => write!(f, "library"),
            PlaybackContext::RecentlyPlayed => write!(f, "recently_played"),
            PlaybackContext::NewSongs => write!(f, "new_songs"),
            PlaybackContext::TopSongs => write!(f, "top_songs"),
            PlaybackContext::Recommendation => write!(f, "recommendation"),
        }
    }
}

impl std::str::FromStr for PlaybackContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(PlaybackContext::None),
            "library" => Ok(PlaybackContext::Library),
            "recently_played" => Ok(PlaybackContext::RecentlyPlayed),
            "new_songs" => Ok(PlaybackContext::NewSongs),
            "top_songs" => Ok(PlaybackContext::TopSongs),
            "recommendation" => Ok(PlaybackContext::Recommendation),
            other => Err(format!("unknown playback context: {other}")),
        }
    }
}

/// What last changed the playback position
///
/// Lets observers tell an explicit user seek apart from a periodic engine report.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PositionSource {
    /// Position was reset (new item started, or player stopped)
    #[default]
    Reset,
    /// Explicit user scrub
    UserSeek,
    /// Periodic heartbeat from the playback engine
    EngineReport,
}
