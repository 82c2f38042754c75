//! Client-side implementation for Paper Cricket matches.
//!
//! [`MatchSession`] is the entry point for a match view. It owns a
//! [`ConnectionManager`] for the WebSocket channel, a
//! [`MatchState`](papercricket_core::MatchState) for reconciliation and
//! history, and an [`OutcomeOverlay`] for the transient ball result.
//! [`ApiClient`] covers the REST calls used before a match starts.

pub mod api;
pub mod config;
pub mod connection;
pub mod credential;
mod error;
pub mod overlay;
pub mod session;

pub use api::{ApiClient, ApiError, MatchSummary, TokenPair, UserProfile, normalize_match_code};
pub use config::{ClientConfig, ConfigError};
pub use connection::{ConnectionEvent, ConnectionManager};
pub use credential::{Credential, CredentialError};
pub use error::{ClientError, ConnectionError};
pub use overlay::{OutcomeOverlay, Overlay, OverlayKind};
pub use session::{MatchSession, SessionUpdate};
