//! Listening-session analytics

pub mod accumulator;
pub mod sink;

pub use accumulator::{ListeningSession, SessionAccumulator, SessionEndReason, SessionPhase, MIN_SESSION_MS};
pub use sink::{AnalyticsSink, JsonLinesSink, LogSink, SessionRecord};
