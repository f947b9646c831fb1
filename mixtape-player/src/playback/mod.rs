//! Playback queue control

pub mod controller;
pub mod queue_item;
pub mod state;

pub use controller::{navigation_id, QueueController};
pub use queue_item::{parse_duration_ms, AudioSource, LocalTrack, QueueItem, RemoteTrack};
pub use state::{PlaybackContext, PlaybackState, PositionSource};
