//! Per-match client state.
//!
//! [`MatchState`] applies parsed server messages one at a time: snapshots go
//! through the [`Reconciler`], resolved balls are appended to the
//! [`BallHistory`], info text is logged and server errors become a pending
//! notice until dismissed.

use crate::history::BallHistory;
use crate::reconcile::{BallOutcome, FirstSnapshotPolicy, Reconciler};
use crate::turn::{self, TurnAction};
use crate::view::{self, ViewMode};
use crate::{MatchSnapshot, ServerMessage};
use std::collections::VecDeque;

/// Default number of info lines kept.
pub const DEFAULT_INFO_LOG_LIMIT: usize = 50;

/// What applying one message changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Applied {
    /// A new ball was resolved by this message.
    pub outcome: Option<BallOutcome>,
    /// The latest snapshot was replaced.
    pub snapshot_changed: bool,
    /// Info text added to the log.
    pub info: Option<String>,
    /// A server error to show the player.
    pub notice: Option<String>,
}

#[derive(Debug)]
pub struct MatchState {
    reconciler: Reconciler,
    history: BallHistory,
    info_log: VecDeque<String>,
    info_log_limit: usize,
    notice: Option<String>,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new(FirstSnapshotPolicy::default(), DEFAULT_INFO_LOG_LIMIT)
    }
}

impl MatchState {
    pub fn new(policy: FirstSnapshotPolicy, info_log_limit: usize) -> Self {
        Self {
            reconciler: Reconciler::new(policy),
            history: BallHistory::new(),
            info_log: VecDeque::new(),
            info_log_limit: info_log_limit.max(1),
            notice: None,
        }
    }

    /// Apply one inbound message.
    pub fn apply(&mut self, message: ServerMessage) -> Applied {
        let mut applied = Applied::default();
        match message {
            ServerMessage::StateUpdate(snapshot) => {
                if let Err(e) = snapshot.validate() {
                    tracing::warn!("match {} snapshot: {}", snapshot.match_code, e);
                }
                applied.snapshot_changed = self.reconciler.latest() != Some(&snapshot);
                if let Some(outcome) = self.reconciler.accept(snapshot) {
                    self.history.push(outcome.clone());
                    applied.outcome = Some(outcome);
                }
            }
            ServerMessage::Info(text) => {
                tracing::info!("server: {}", text);
                if self.info_log.len() == self.info_log_limit {
                    self.info_log.pop_front();
                }
                self.info_log.push_back(text.clone());
                applied.info = Some(text);
            }
            ServerMessage::Error(text) => {
                tracing::warn!("server error: {}", text);
                self.notice = Some(text.clone());
                applied.notice = Some(text);
            }
        }
        applied
    }

    /// Record a frame that could not be parsed. Shown like a server error.
    pub fn malformed(&mut self, reason: &str) -> Applied {
        tracing::warn!("malformed message: {}", reason);
        let text = format!("Malformed message from server: {}", reason);
        self.notice = Some(text.clone());
        Applied {
            notice: Some(text),
            ..Applied::default()
        }
    }

    pub fn snapshot(&self) -> Option<&MatchSnapshot> {
        self.reconciler.latest()
    }

    pub fn history(&self) -> &BallHistory {
        &self.history
    }

    pub fn info_log(&self) -> impl Iterator<Item = &str> {
        self.info_log.iter().map(String::as_str)
    }

    /// The pending notice, if the player has not dismissed it.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn view_mode(&self) -> ViewMode {
        view::mode(self.snapshot())
    }

    pub fn turn_action(&self, username: &str) -> TurnAction {
        match self.snapshot() {
            Some(snapshot) => turn::resolve(snapshot, username),
            None => TurnAction::Wait,
        }
    }

    pub fn is_my_turn(&self, username: &str) -> bool {
        self.turn_action(username).is_actionable()
    }
}
