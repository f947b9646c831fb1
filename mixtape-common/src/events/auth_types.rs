//! Authentication lifecycle type definitions

use serde::{Deserialize, Serialize};

/// Result of one token lifecycle check
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum TokenOutcome {
    /// Token still valid, refreshed, or no user is signed in
    Success,
    /// Refresh was rejected; the user must sign in again
    Failure,
    /// Transient problem; try again later
    Retry,
}

impl std::fmt::Display for TokenOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenOutcome::Success => write!(f, "Success"),
            TokenOutcome::Failure => write!(f, "Failure"),
            TokenOutcome::Retry => write!(f, "Retry"),
        }
    }
}
