//! Playback state snapshot
//!
//! Owned exclusively by the [`QueueController`](super::QueueController) and published to
//! observers as an immutable `Arc<PlaybackState>` after every mutation.

use super::queue_item::QueueItem;
use serde::Serialize;

// Re-export context types from mixtape-common
pub use mixtape_common::events::{PlaybackContext, PositionSource};

/// Snapshot of everything the controller knows about "what is playing now"
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaybackState {
    /// Ordered queue (may be empty)
    pub queue: Vec<QueueItem>,

    /// Index into `queue`; meaningful only when the queue is non-empty
    pub current_index: usize,

    /// `queue[current_index]` whenever the queue is non-empty, else `None`
    pub current_item: Option<QueueItem>,

    pub is_playing: bool,

    pub position_ms: u64,

    pub duration_ms: u64,

    /// Provenance of the queue
    pub context: PlaybackContext,

    /// What last moved `position_ms`
    pub position_source: PositionSource,
}

impl PlaybackState {
    /// Fraction of the item played, in `[0.0, 1.0]`
    ///
    /// Zero when the duration is unknown. Position past the end clamps to 1.0.
    pub fn progress(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.position_ms as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
    }

    /// Position clamped to the item duration
    pub fn clamped_position_ms(&self) -> u64 {
        self.position_ms.min(self.duration_ms)
    }

    pub fn has_queue(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Whether the item with this navigation id is the current item and playing
    pub fn is_item_playing(&self, navigation_id: &str) -> bool {
        self.is_playing
            && self
                .current_item
                .as_ref()
                .is_some_and(|item| item.navigation_id() == navigation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_stopped() {
        let state = PlaybackState::default();
        assert!(!state.has_queue());
        assert!(state.current_item.is_none());
        assert!(!state.is_playing);
        assert_eq!(state.position_ms, 0);
        assert_eq!(state.duration_ms, 0);
        assert_eq!(state.context, PlaybackContext::None);
        assert_eq!(state.position_source, PositionSource::Reset);
    }

    #[test]
    fn test_progress_zero_without_duration() {
        let state = PlaybackState {
            position_ms: 5_000,
            ..Default::default()
        };
        assert_eq!(state.progress(), 0.0);
    }

    #[test]
    fn test_progress_and_clamping() {
        let mut state = PlaybackState {
            position_ms: 30_000,
            duration_ms: 120_000,
            ..Default::default()
        };
        assert!((state.progress() - 0.25).abs() < f64::EPSILON);

        state.position_ms = 150_000;
        assert_eq!(state.progress(), 1.0);
        assert_eq!(state.clamped_position_ms(), 120_000);
    }
}
