//! Listening session accumulator
//!
//! Converts transport transitions into measured listening time for one item at a time.
//!
//! Phases:
//! - `Idle`: no session open
//! - `Running`: a segment timer is open
//! - `Paused`: time frozen, item retained
//!
//! The accumulator is driven by explicit calls and never observes the queue controller.
//! When a session ends with at least [`MIN_SESSION_MS`] of playing time, a
//! [`SessionRecord`] is handed to the [`AnalyticsSink`] on a detached task. Sink failures
//! are logged and never reach the caller, and the session is cleared either way.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use mixtape_common::events::{EventBus, PlayerEvent};
use mixtape_common::time::{self, duration_to_millis};
use mixtape_common::{Clock, SystemClock};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::sink::{AnalyticsSink, SessionRecord};
use crate::playback::QueueItem;

/// Sessions shorter than this are treated as noise and not recorded
pub const MIN_SESSION_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Running,
    Paused,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "idle"),
            SessionPhase::Running => write!(f, "running"),
            SessionPhase::Paused => write!(f, "paused"),
        }
    }
}

/// Why a session ended (logging only)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEndReason {
    Completed,
    Skipped,
    Stopped,
    /// A new session was started while this one was open
    Superseded,
    Ended,
}

impl std::fmt::Display for SessionEndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEndReason::Completed => write!(f, "completed"),
            SessionEndReason::Skipped => write!(f, "skipped"),
            SessionEndReason::Stopped => write!(f, "stopped"),
            SessionEndReason::Superseded => write!(f, "superseded"),
            SessionEndReason::Ended => write!(f, "ended"),
        }
    }
}

/// The single open session
#[derive(Debug, Clone)]
pub struct ListeningSession {
    /// Correlation id for logs and events
    pub session_id: Uuid,
    pub item: QueueItem,
    pub user_id: i64,
    pub started_at: DateTime<Utc>,
    /// Start of the open segment; `None` while paused
    pub segment_started_at: Option<Instant>,
    /// Time folded in from closed segments
    pub accumulated: Duration,
}

impl ListeningSession {
    pub fn phase(&self) -> SessionPhase {
        match self.segment_started_at {
            Some(_) => SessionPhase::Running,
            None => SessionPhase::Paused,
        }
    }

    /// Close the open segment (if any) into `accumulated`
    fn fold_segment(&mut self, now: Instant) {
        if let Some(start) = self.segment_started_at.take() {
            self.accumulated += now.saturating_duration_since(start);
        }
    }

    fn elapsed(&self, now: Instant) -> Duration {
        match self.segment_started_at {
            Some(start) => self.accumulated + now.saturating_duration_since(start),
            None => self.accumulated,
        }
    }
}

pub struct SessionAccumulator {
    session: Option<ListeningSession>,
    sink: Arc<dyn AnalyticsSink>,
    clock: Arc<dyn Clock>,
    event_bus: Option<EventBus>,
    /// Runtime current at construction; sink tasks are spawned here
    runtime: Option<Handle>,
    pending: Vec<JoinHandle<()>>,
}

impl SessionAccumulator {
    /// Accumulator measuring against the system monotonic clock
    pub fn new(sink: Arc<dyn AnalyticsSink>) -> Self {
        Self::with_clock(sink, Arc::new(SystemClock))
    }

    /// Accumulator measuring against `clock`
    ///
    /// Captures the current tokio runtime, if any, so sessions ended from plain threads
    /// still reach the sink. Use [`with_runtime`](Self::with_runtime) when building outside
    /// a runtime.
    pub fn with_clock(sink: Arc<dyn AnalyticsSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            session: None,
            sink,
            clock,
            event_bus: None,
            runtime: Handle::try_current().ok(),
            pending: Vec::new(),
        }
    }

    /// Spawn sink tasks on `runtime`
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Also report session lifecycle on `event_bus`
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    // ========================================
    // Transitions
    // ========================================

    /// Open a session for `item`, ending any session already open
    pub fn start_session(&mut self, item: QueueItem, user_id: i64) {
        if self.session.is_some() {
            self.finish(SessionEndReason::Superseded);
        }

        let session = ListeningSession {
            session_id: Uuid::new_v4(),
            item,
            user_id,
            started_at: time::now(),
            segment_started_at: Some(self.clock.now()),
            accumulated: Duration::ZERO,
        };
        debug!(
            session_id = %session.session_id,
            song_id = %session.item.navigation_id(),
            user_id,
            "Listening session started"
        );
        self.emit(PlayerEvent::SessionStarted {
            session_id: session.session_id,
            song_id: session.item.navigation_id(),
            user_id,
            timestamp: session.started_at,
        });
        self.session = Some(session);
    }

    /// Freeze the running segment. No-op unless running.
    pub fn pause_session(&mut self) {
        if self.phase() != SessionPhase::Running {
            debug!(phase = %self.phase(), "pause_session() ignored");
            return;
        }
        let now = self.clock.now();
        if let Some(session) = self.session.as_mut() {
            session.fold_segment(now);
            debug!(
                session_id = %session.session_id,
                accumulated_ms = duration_to_millis(session.accumulated),
                "Listening session paused"
            );
        }
    }

    /// Open a new segment. No-op unless paused.
    pub fn resume_session(&mut self) {
        if self.phase() != SessionPhase::Paused {
            debug!(phase = %self.phase(), "resume_session() ignored");
            return;
        }
        let now = self.clock.now();
        if let Some(session) = self.session.as_mut() {
            session.segment_started_at = Some(now);
            debug!(session_id = %session.session_id, "Listening session resumed");
        }
    }

    /// End the open session, dispatching a record if it reached the minimum duration
    ///
    /// Returns the record handed to the sink. `None` when no session was open, the session
    /// was below the minimum, or no runtime was available to run the sink. Dispatch never
    /// blocks the caller.
    pub fn end_current_session(&mut self) -> Option<SessionRecord> {
        self.finish(SessionEndReason::Ended)
    }

    pub fn on_song_completed(&mut self) -> Option<SessionRecord> {
        self.finish(SessionEndReason::Completed)
    }

    pub fn on_song_skipped(&mut self) -> Option<SessionRecord> {
        self.finish(SessionEndReason::Skipped)
    }

    pub fn on_playback_stopped(&mut self) -> Option<SessionRecord> {
        self.finish(SessionEndReason::Stopped)
    }

    /// Scrub within the current item
    ///
    /// Observability hook only: never ends, fragments or re-times the session.
    pub fn on_seek(&self, from_ms: u64, to_ms: u64) {
        match &self.session {
            Some(session) => debug!(
                session_id = %session.session_id,
                from_ms,
                to_ms,
                "Seek within listening session"
            ),
            None => debug!(from_ms, to_ms, "Seek with no listening session"),
        }
    }

    // ========================================
    // Queries
    // ========================================

    pub fn phase(&self) -> SessionPhase {
        self.session
            .as_ref()
            .map_or(SessionPhase::Idle, ListeningSession::phase)
    }

    pub fn current_session(&self) -> Option<&ListeningSession> {
        self.session.as_ref()
    }

    /// Time folded from closed segments, excluding any open segment
    pub fn accumulated_ms(&self) -> u64 {
        self.session
            .as_ref()
            .map_or(0, |session| duration_to_millis(session.accumulated))
    }

    /// Total playing time so far, including the open segment
    pub fn listened_ms(&self) -> u64 {
        let now = self.clock.now();
        self.session
            .as_ref()
            .map_or(0, |session| duration_to_millis(session.elapsed(now)))
    }

    /// Number of dispatched records whose sink call has not completed yet
    pub fn pending_flushes(&self) -> usize {
        self.pending.iter().filter(|handle| !handle.is_finished()).count()
    }

    /// Wait for every dispatched record to reach the sink
    ///
    /// For shutdown paths; normal operation never waits on the sink.
    pub async fn flush_pending(&mut self) {
        for handle in std::mem::take(&mut self.pending) {
            if let Err(e) = handle.await {
                warn!(error = %e, "Session record task did not complete");
            }
        }
    }

    // ========================================
    // Internals
    // ========================================

    fn finish(&mut self, reason: SessionEndReason) -> Option<SessionRecord> {
        let Some(mut session) = self.session.take() else {
            debug!(%reason, "No listening session to end");
            return None;
        };

        session.fold_segment(self.clock.now());
        let listened_ms = duration_to_millis(session.accumulated);
        let song_id = session.item.navigation_id();

        if listened_ms < MIN_SESSION_MS {
            debug!(
                session_id = %session.session_id,
                song_id = %song_id,
                listened_ms,
                %reason,
                "Listening session below minimum, dropped"
            );
            self.emit(PlayerEvent::SessionDropped {
                session_id: session.session_id,
                song_id,
                listening_duration_ms: listened_ms,
                timestamp: time::now(),
            });
            return None;
        }

        let record = SessionRecord {
            user_id: session.user_id,
            song_id,
            song_title: session.item.title().to_string(),
            artist_name: session.item.artist().to_string(),
            listening_duration_ms: listened_ms,
        };
        info!(
            session_id = %session.session_id,
            song_id = %record.song_id,
            listened_ms,
            %reason,
            "Listening session ended"
        );
        self.dispatch(session.session_id, record.clone()).then_some(record)
    }

    /// Hand `record` to the sink on a detached task; false if it could not be spawned
    fn dispatch(&mut self, session_id: Uuid, record: SessionRecord) -> bool {
        self.pending.retain(|handle| !handle.is_finished());

        let Some(runtime) = self
            .runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
        else {
            error!(
                session_id = %session_id,
                song_id = %record.song_id,
                "No async runtime available, session record lost"
            );
            self.emit(PlayerEvent::SessionSinkFailed {
                session_id,
                song_id: record.song_id,
                error: "no async runtime".to_string(),
                timestamp: time::now(),
            });
            return false;
        };

        self.emit(PlayerEvent::SessionFlushed {
            session_id,
            song_id: record.song_id.clone(),
            listening_duration_ms: record.listening_duration_ms,
            timestamp: time::now(),
        });

        let sink = Arc::clone(&self.sink);
        let event_bus = self.event_bus.clone();
        self.pending.push(runtime.spawn(async move {
            let song_id = record.song_id.clone();
            if let Err(e) = sink.record_session(record).await {
                error!(session_id = %session_id, song_id = %song_id, error = %e, "Failed to record listening session");
                if let Some(bus) = event_bus {
                    bus.emit_lossy(PlayerEvent::SessionSinkFailed {
                        session_id,
                        song_id,
                        error: e.to_string(),
                        timestamp: time::now(),
                    });
                }
            }
        }));
        true
    }

    fn emit(&self, event: PlayerEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(event);
        }
    }
}
