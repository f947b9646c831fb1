//! Authentication token lifecycle

pub mod lifecycle;
pub mod store;

pub use lifecycle::{RefreshError, TokenLifecycleConfig, TokenLifecycleManager, TokenRefresher};
pub use mixtape_common::events::TokenOutcome;
pub use store::{AuthStore, InMemoryAuthStore, TokenPair};
