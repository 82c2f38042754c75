//! Core types and match-state logic for Paper Cricket clients.
//!
//! This crate has no I/O. It provides the wire types, the rules for deciding
//! what the local player may do, and the pipeline that turns a stream of
//! server snapshots into a ball-by-ball history with exactly one outcome per
//! resolved ball. Ball resolution itself happens on the server.

pub mod history;
mod message;
pub mod reconcile;
mod snapshot;
pub mod state;
mod symbol;
pub mod turn;
pub mod view;

pub use history::{BallHistory, BattingTotal, HistoryEntry, Over, OverBall, Role};
pub use message::{Action, ClientMessage, MessageError, ServerMessage};
pub use reconcile::{BallOutcome, FirstSnapshotPolicy, Reconciler, reconcile};
pub use snapshot::{
    BALLS_PER_OVER, BallPosition, BallRecord, MatchSnapshot, MatchStatus, SnapshotError,
};
pub use state::{Applied, MatchState};
pub use symbol::{Symbol, SymbolParseError};
pub use turn::TurnAction;
pub use view::ViewMode;

/// Connection lifecycle state.
///
/// Moves strictly forward. A closed or errored connection is replaced, never
/// reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Not yet started.
    Idle,
    /// Handshake in progress.
    Connecting,
    /// Exchanging messages.
    Open,
    /// Closed by either side.
    Closed,
    /// Failed to open, or dropped by a transport error.
    Errored,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Errored)
    }

    /// Whether moving to `next` keeps the lifecycle linear.
    pub fn can_advance_to(&self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Idle, Connecting)
                | (Connecting, Open)
                | (Connecting, Errored)
                | (Connecting, Closed)
                | (Open, Closed)
                | (Open, Errored)
        )
    }
}
