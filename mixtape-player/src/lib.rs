//! # Mixtape Player Library (mixtape-player)
//!
//! Playback queue controller and listening-session analytics.
//!
//! **Purpose:** Track what is currently playing, navigate an ordered queue of local and
//! remote items, and measure real listening time across pause/resume/seek/skip so that
//! accurate session records reach an analytics sink.
//!
//! **Architecture:** The [`playback::QueueController`] publishes immutable
//! [`playback::PlaybackState`] snapshots; the [`session::SessionAccumulator`] is driven by
//! explicit calls and never observes the controller directly. [`player::Player`] is the
//! caller that drives both. [`auth::TokenLifecycleManager`] runs independently.

pub mod auth;
pub mod command;
pub mod config;
pub mod error;
pub mod playback;
pub mod player;
pub mod session;

pub use error::{Error, Result};
pub use player::Player;
