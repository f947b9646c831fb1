//! Playback queue controller
//!
//! Single source of truth for "what is playing now" and queue navigation.
//!
//! Every command is total: an empty queue or an out-of-range index degrades to a no-op
//! rather than an error. After each mutation the full [`PlaybackState`] is published as a
//! fresh `Arc` through a `tokio::sync::watch` channel, so observers only ever see complete
//! snapshots.

use std::sync::Arc;

use mixtape_common::events::{EventBus, PlayerEvent};
use mixtape_common::time;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::queue_item::QueueItem;
use super::state::{PlaybackContext, PlaybackState, PositionSource};
use crate::error::{Error, Result};

/// Owns the queue, the current index, transport state and position
pub struct QueueController {
    state: PlaybackState,
    tx: watch::Sender<Arc<PlaybackState>>,
    event_bus: Option<EventBus>,
}

impl QueueController {
    /// Create a controller in the stopped, empty configuration
    pub fn new() -> Self {
        let state = PlaybackState::default();
        let (tx, _) = watch::channel(Arc::new(state.clone()));
        Self {
            state,
            tx,
            event_bus: None,
        }
    }

    /// Create a controller that also reports discrete transitions on `event_bus`
    pub fn with_event_bus(event_bus: EventBus) -> Self {
        let mut controller = Self::new();
        controller.event_bus = Some(event_bus);
        controller
    }

    /// Subscribe to state snapshots
    ///
    /// The receiver immediately holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<PlaybackState>> {
        self.tx.subscribe()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<PlaybackState> {
        self.tx.borrow().clone()
    }

    /// Borrow the live state
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    // ========================================
    // Commands
    // ========================================

    /// Replace the queue and start playing `items[start_index]`
    ///
    /// An empty `items` clears playback under the new context. A non-empty `items` with
    /// `start_index` out of range is ignored and the previous queue stays in place.
    pub fn play_queue(&mut self, items: Vec<QueueItem>, start_index: usize, context: PlaybackContext) {
        if !items.is_empty() && start_index >= items.len() {
            warn!(
                start_index,
                len = items.len(),
                "play_queue start index out of range, ignoring"
            );
            return;
        }

        debug!(len = items.len(), start_index, %context, "Replacing queue");
        let len = items.len();
        self.state = PlaybackState {
            queue: items,
            current_index: 0,
            context,
            ..Default::default()
        };
        self.emit(PlayerEvent::QueueReplaced {
            len,
            context,
            timestamp: time::now(),
        });

        if len == 0 {
            self.publish();
            return;
        }

        self.state.current_index = start_index;
        self.start_current();
    }

    /// Start playing `item`
    ///
    /// If an entry with the same queue key is already queued, playback moves to it.
    /// Otherwise the queue is replaced by this single item.
    pub fn play_item(&mut self, item: QueueItem) {
        let key = item.queue_key();
        match self.state.queue.iter().position(|queued| queued.queue_key() == key) {
            Some(index) => {
                self.state.queue[index] = item;
                self.state.current_index = index;
            }
            None => {
                debug!(queue_key = %key, "Item not in queue, starting single-item queue");
                self.state.queue = vec![item];
                self.state.current_index = 0;
                self.state.context = PlaybackContext::None;
            }
        }
        self.start_current();
    }

    /// Advance with wraparound
    pub fn next(&mut self) {
        let len = self.state.queue.len();
        if len == 0 {
            debug!("next() on empty queue ignored");
            return;
        }
        self.state.current_index = (self.state.current_index + 1) % len;
        self.start_current();
    }

    /// Retreat with wraparound
    pub fn previous(&mut self) {
        let len = self.state.queue.len();
        if len == 0 {
            debug!("previous() on empty queue ignored");
            return;
        }
        self.state.current_index = (self.state.current_index + len - 1) % len;
        self.start_current();
    }

    /// Jump to `index`, ignoring out-of-range targets
    pub fn jump_to(&mut self, index: usize) {
        if let Err(e) = self.try_jump_to(index) {
            debug!(error = %e, "jump_to ignored");
        }
    }

    /// Jump to `index`, reporting out-of-range targets
    pub fn try_jump_to(&mut self, index: usize) -> Result<()> {
        let len = self.state.queue.len();
        if index >= len {
            return Err(Error::InvalidNavigation { index, len });
        }
        self.state.current_index = index;
        self.start_current();
        Ok(())
    }

    /// Flip between playing and paused without touching position
    ///
    /// Ignored when nothing is loaded.
    pub fn toggle_play_pause(&mut self) {
        if self.state.current_item.is_none() {
            debug!("toggle_play_pause() without current item ignored");
            return;
        }
        self.set_playing(!self.state.is_playing);
    }

    pub fn pause(&mut self) {
        if self.state.current_item.is_some() && self.state.is_playing {
            self.set_playing(false);
        }
    }

    pub fn resume(&mut self) {
        if self.state.current_item.is_some() && !self.state.is_playing {
            self.set_playing(true);
        }
    }

    /// Explicit user seek
    pub fn seek_to(&mut self, position_ms: u64) {
        if self.state.current_item.is_none() {
            debug!(position_ms, "seek_to() without current item ignored");
            return;
        }
        let from_ms = self.state.position_ms;
        self.state.position_ms = position_ms;
        self.state.position_source = PositionSource::UserSeek;
        self.emit(PlayerEvent::Seeked {
            from_ms,
            to_ms: position_ms,
            timestamp: time::now(),
        });
        self.publish();
    }

    /// Periodic position report from the playback engine
    ///
    /// Same state effect as [`seek_to`](Self::seek_to) but tagged as a heartbeat and never
    /// announced on the event bus.
    pub fn update_progress(&mut self, position_ms: u64) {
        if self.state.current_item.is_none() {
            return;
        }
        self.state.position_ms = position_ms;
        self.state.position_source = PositionSource::EngineReport;
        self.publish();
    }

    /// Swap a queued item for an updated copy with the same queue key
    ///
    /// Index, position and transport state are untouched. Returns whether an entry matched.
    pub fn replace_item(&mut self, item: QueueItem) -> bool {
        let key = item.queue_key();
        let Some(index) = self.state.queue.iter().position(|queued| queued.queue_key() == key)
        else {
            debug!(queue_key = %key, "replace_item() found no matching entry");
            return false;
        };

        let is_current = index == self.state.current_index && self.state.current_item.is_some();
        if is_current {
            self.state.duration_ms = item.duration_ms();
            self.state.current_item = Some(item.clone());
        }
        self.state.queue[index] = item;
        self.emit(PlayerEvent::ItemReplaced {
            queue_key: key,
            is_current,
            timestamp: time::now(),
        });
        self.publish();
        true
    }

    /// Reset to the empty, stopped configuration
    pub fn stop(&mut self) {
        debug!("Stopping playback, clearing queue");
        self.state = PlaybackState::default();
        self.emit(PlayerEvent::PlaybackStopped {
            timestamp: time::now(),
        });
        self.publish();
    }

    // ========================================
    // Queries
    // ========================================

    /// Whether the item with this navigation id is current and playing
    pub fn is_item_playing(&self, navigation_id: &str) -> bool {
        self.state.is_item_playing(navigation_id)
    }

    pub fn has_queue(&self) -> bool {
        self.state.has_queue()
    }

    pub fn current_item(&self) -> Option<&QueueItem> {
        self.state.current_item.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn position_ms(&self) -> u64 {
        self.state.position_ms
    }

    // ========================================
    // Internals
    // ========================================

    /// Load `queue[current_index]` as the current item and start it from zero
    fn start_current(&mut self) {
        let index = self.state.current_index;
        let Some(item) = self.state.queue.get(index).cloned() else {
            return;
        };

        self.state.duration_ms = item.duration_ms();
        self.state.position_ms = 0;
        self.state.position_source = PositionSource::Reset;
        self.state.is_playing = true;

        debug!(
            index,
            navigation_id = %item.navigation_id(),
            duration_ms = self.state.duration_ms,
            "Item started"
        );
        let event = PlayerEvent::ItemStarted {
            queue_key: item.queue_key(),
            navigation_id: item.navigation_id(),
            index,
            duration_ms: self.state.duration_ms,
            timestamp: time::now(),
        };
        self.state.current_item = Some(item);
        // Subscribers reacting to the event must already see the new snapshot
        self.publish();
        self.emit(event);
    }

    fn set_playing(&mut self, is_playing: bool) {
        self.state.is_playing = is_playing;
        self.emit(PlayerEvent::PlaybackToggled {
            is_playing,
            timestamp: time::now(),
        });
        self.publish();
    }

    fn publish(&self) {
        self.tx.send_replace(Arc::new(self.state.clone()));
    }

    fn emit(&self, event: PlayerEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(event);
        }
    }
}

impl Default for QueueController {
    fn default() -> Self {
        Self::new()
    }
}

/// Navigation identity of `item` (remote prefix stripped)
pub fn navigation_id(item: &QueueItem) -> String {
    item.navigation_id()
}
