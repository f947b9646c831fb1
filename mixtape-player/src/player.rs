//! Player coordinator
//!
//! Owns one [`QueueController`] and one [`SessionAccumulator`] for a player lifecycle and
//! drives both from a single command surface. The accumulator never watches the
//! controller; every session transition here is an explicit call made after the
//! controller command it belongs to.
//!
//! A command the controller ignored (no snapshot published) leaves the session alone.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::playback::{PlaybackContext, PlaybackState, QueueController, QueueItem};
use crate::session::{SessionAccumulator, SessionPhase, SessionRecord};

pub struct Player {
    controller: QueueController,
    accumulator: SessionAccumulator,
    user_id: i64,
}

impl Player {
    pub fn new(controller: QueueController, accumulator: SessionAccumulator, user_id: i64) -> Self {
        Self {
            controller,
            accumulator,
            user_id,
        }
    }

    pub fn controller(&self) -> &QueueController {
        &self.controller
    }

    pub fn accumulator(&self) -> &SessionAccumulator {
        &self.accumulator
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<PlaybackState>> {
        self.controller.subscribe()
    }

    pub fn snapshot(&self) -> Arc<PlaybackState> {
        self.controller.snapshot()
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Change the user; applies from the next session
    pub fn set_user(&mut self, user_id: i64) {
        self.user_id = user_id;
    }

    // ========================================
    // Navigation
    // ========================================

    pub fn play_queue(&mut self, items: Vec<QueueItem>, start_index: usize, context: PlaybackContext) {
        let before = self.controller.snapshot();
        self.controller.play_queue(items, start_index, context);
        if self.unchanged_since(&before) {
            return;
        }
        if self.controller.current_item().is_some() {
            self.accumulator.on_song_skipped();
            self.start_session_for_current();
        } else {
            self.accumulator.on_playback_stopped();
        }
    }

    pub fn play_item(&mut self, item: QueueItem) {
        self.controller.play_item(item);
        self.accumulator.on_song_skipped();
        self.start_session_for_current();
    }

    pub fn next(&mut self) {
        self.navigate(QueueController::next);
    }

    pub fn previous(&mut self) {
        self.navigate(QueueController::previous);
    }

    pub fn jump_to(&mut self, index: usize) {
        self.navigate(|controller| controller.jump_to(index));
    }

    /// The playback engine finished the current item; advance with wraparound
    pub fn complete_current(&mut self) -> Option<SessionRecord> {
        if !self.controller.has_queue() {
            return None;
        }
        let record = self.accumulator.on_song_completed();
        self.controller.next();
        self.start_session_for_current();
        record
    }

    // ========================================
    // Transport
    // ========================================

    pub fn toggle_play_pause(&mut self) {
        let before = self.controller.snapshot();
        self.controller.toggle_play_pause();
        if !self.unchanged_since(&before) {
            self.sync_session_with_transport();
        }
    }

    pub fn pause(&mut self) {
        self.controller.pause();
        self.sync_session_with_transport();
    }

    pub fn resume(&mut self) {
        self.controller.resume();
        self.sync_session_with_transport();
    }

    /// Explicit user seek: reported to the accumulator as an observability hook only
    pub fn seek_to(&mut self, position_ms: u64) {
        let from_ms = self.controller.position_ms();
        let before = self.controller.snapshot();
        self.controller.seek_to(position_ms);
        if !self.unchanged_since(&before) {
            self.accumulator.on_seek(from_ms, position_ms);
        }
    }

    /// Engine heartbeat; never reaches the accumulator
    pub fn update_progress(&mut self, position_ms: u64) {
        self.controller.update_progress(position_ms);
    }

    pub fn replace_item(&mut self, item: QueueItem) -> bool {
        self.controller.replace_item(item)
    }

    /// End the session, then reset the controller
    pub fn stop(&mut self) -> Option<SessionRecord> {
        let record = self.accumulator.on_playback_stopped();
        self.controller.stop();
        record
    }

    /// Stop and wait until every dispatched record reached the sink
    pub async fn shutdown(&mut self) {
        self.stop();
        self.accumulator.flush_pending().await;
    }

    // ========================================
    // Internals
    // ========================================

    fn navigate(&mut self, command: impl FnOnce(&mut QueueController)) {
        let before = self.controller.snapshot();
        command(&mut self.controller);
        if self.unchanged_since(&before) {
            return;
        }
        self.accumulator.on_song_skipped();
        self.start_session_for_current();
    }

    fn start_session_for_current(&mut self) {
        if let Some(item) = self.controller.current_item().cloned() {
            self.accumulator.start_session(item, self.user_id);
        }
    }

    fn sync_session_with_transport(&mut self) {
        match (self.controller.is_playing(), self.accumulator.phase()) {
            (true, SessionPhase::Paused) => self.accumulator.resume_session(),
            (true, SessionPhase::Idle) => self.start_session_for_current(),
            (false, SessionPhase::Running) => self.accumulator.pause_session(),
            (true, SessionPhase::Running) | (false, SessionPhase::Paused) | (false, SessionPhase::Idle) => {
                debug!("Session already matches transport state");
            }
        }
    }

    fn unchanged_since(&self, before: &Arc<PlaybackState>) -> bool {
        Arc::ptr_eq(before, &self.controller.snapshot())
    }
}
