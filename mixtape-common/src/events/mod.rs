//! Event types for the Mixtape event system
//!
//! Provides shared event definitions and the EventBus used by the player crates.

mod auth_types;
mod playback_types;

pub use auth_types::TokenOutcome;
pub use playback_types::{PlaybackContext, PositionSource};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Mixtape event types
///
/// Events are broadcast via EventBus and can be serialized for external transmission.
/// All events use this central enum so that consumers match exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// Queue replaced by `play_queue`
    QueueReplaced {
        /// Number of items in the new queue
        len: usize,
        /// Where the queue was started from
        context: PlaybackContext,
        timestamp: DateTime<Utc>,
    },

    /// An item became the current item and started playing
    ItemStarted {
        /// Queue-internal identity of the item
        queue_key: String,
        /// Identity exposed to navigation collaborators
        navigation_id: String,
        /// Index within the queue
        index: usize,
        /// Derived duration in milliseconds
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// Transport flipped between playing and paused
    PlaybackToggled {
        is_playing: bool,
        timestamp: DateTime<Utc>,
    },

    /// Explicit user seek
    ///
    /// Engine position heartbeats never produce this event.
    Seeked {
        from_ms: u64,
        to_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// A queue entry was swapped for an updated copy
    ItemReplaced {
        queue_key: String,
        /// Whether the replaced entry is the current item
        is_current: bool,
        timestamp: DateTime<Utc>,
    },

    /// Controller reset to its initial configuration
    PlaybackStopped { timestamp: DateTime<Utc> },

    /// Listening session opened
    SessionStarted {
        session_id: Uuid,
        song_id: String,
        user_id: i64,
        timestamp: DateTime<Utc>,
    },

    /// Listening session ended and its record was handed to the analytics sink
    SessionFlushed {
        session_id: Uuid,
        song_id: String,
        listening_duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// Listening session ended below the minimum duration; no record emitted
    SessionDropped {
        session_id: Uuid,
        song_id: String,
        listening_duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// Analytics sink reported a failure while recording a session
    SessionSinkFailed {
        session_id: Uuid,
        song_id: String,
        error: String,
        timestamp: DateTime<Utc>,
    },

    /// Token lifecycle check finished
    TokenCheckCompleted {
        outcome: TokenOutcome,
        timestamp: DateTime<Utc>,
    },
}

impl PlayerEvent {
    /// Event type name as used in the serialized `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            PlayerEvent::QueueReplaced { .. } => "QueueReplaced",
            PlayerEvent::ItemStarted { .. } => "ItemStarted",
            PlayerEvent::PlaybackToggled { .. } => "PlaybackToggled",
            PlayerEvent::Seeked { .. } => "Seeked",
            PlayerEvent::ItemReplaced { .. } => "ItemReplaced",
            PlayerEvent::PlaybackStopped { .. } => "PlaybackStopped",
            PlayerEvent::SessionStarted { .. } => "SessionStarted",
            PlayerEvent::SessionFlushed { .. } => "SessionFlushed",
            PlayerEvent::SessionDropped { .. } => "SessionDropped",
            PlayerEvent::SessionSinkFailed { .. } => "SessionSinkFailed",
            PlayerEvent::TokenCheckCompleted { .. } => "TokenCheckCompleted",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use mixtape_common::events::{EventBus, PlayerEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(PlayerEvent::PlaybackToggled {
///     is_playing: false,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// `capacity` is the number of events buffered per subscriber before the oldest are
    /// dropped for that subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PlayerEvent,
    ) -> Result<usize, broadcast::error::SendError<PlayerEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toggled(is_playing: bool) -> PlayerEvent {
        PlayerEvent::PlaybackToggled {
            is_playing,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_emit_without_subscribers_fails() {
        let bus = EventBus::new(10);
        assert!(bus.emit(toggled(true)).is_err());
        // Lossy variant must not panic either
        bus.emit_lossy(toggled(true));
    }

    #[tokio::test]
    async fn test_subscribers_receive_events_in_order() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.emit(toggled(false)).unwrap();
        bus.emit(toggled(true)).unwrap();

        match rx.recv().await.unwrap() {
            PlayerEvent::PlaybackToggled { is_playing, .. } => assert!(!is_playing),
            other => panic!("unexpected event {other:?}"),
        }
        match rx.recv().await.unwrap() {
            PlayerEvent::PlaybackToggled { is_playing, .. } => assert!(is_playing),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let bus = EventBus::new(0);
        assert_eq!(bus.capacity(), 1);
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = PlayerEvent::Seeked {
            from_ms: 1_000,
            to_ms: 42_000,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Seeked");
        assert_eq!(json["to_ms"], 42_000);
        assert_eq!(event.event_type(), "Seeked");

        let back: PlayerEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
