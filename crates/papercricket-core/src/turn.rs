//! Deciding whether the local player may act, and how.

use crate::{Action, MatchSnapshot, MatchStatus};

/// What the local player may do on the current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnAction {
    /// Local player is batting and it is their turn.
    Bat,
    /// Local player is bowling and it is their turn.
    Bowl,
    /// Nothing to send: someone else's turn, spectating, or not in play.
    Wait,
}

impl TurnAction {
    /// The outbound action to use, if any.
    pub fn action(&self) -> Option<Action> {
        match self {
            Self::Bat => Some(Action::Bat),
            Self::Bowl => Some(Action::Bowl),
            Self::Wait => None,
        }
    }

    pub fn is_actionable(&self) -> bool {
        !matches!(self, Self::Wait)
    }
}

/// Resolve the local player's action for a snapshot.
///
/// Total: every (snapshot, username) pair maps to exactly one variant.
pub fn resolve(snapshot: &MatchSnapshot, username: &str) -> TurnAction {
    if snapshot.status != MatchStatus::Ongoing {
        return TurnAction::Wait;
    }
    if snapshot.turn.as_deref() != Some(username) {
        return TurnAction::Wait;
    }
    if snapshot.batting_player == username {
        TurnAction::Bat
    } else if snapshot.bowling_player == username {
        TurnAction::Bowl
    } else {
        TurnAction::Wait
    }
}
