//! # Mixtape Common Library
//!
//! Shared code for the Mixtape player crates including:
//! - Error types
//! - Event types (PlayerEvent enum) and the EventBus
//! - Clock abstraction and timestamp helpers
//! - Configuration file resolution and loading

pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
pub use time::{Clock, ManualClock, SystemClock};
