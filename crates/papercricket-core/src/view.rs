//! Coarse view mode derived from match status.

use crate::{MatchSnapshot, MatchStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewMode {
    Lobby,
    Active,
    Completed,
}

/// Select the view mode for the latest snapshot, if any.
pub fn mode(snapshot: Option<&MatchSnapshot>) -> ViewMode {
    match snapshot.map(|s| s.status) {
        None | Some(MatchStatus::Waiting) => ViewMode::Lobby,
        Some(MatchStatus::Ongoing) => ViewMode::Active,
        Some(MatchStatus::Completed) => ViewMode::Completed,
    }
}
