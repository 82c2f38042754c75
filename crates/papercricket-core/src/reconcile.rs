//! Snapshot reconciliation.
//!
//! Each inbound snapshot replaces the previous one. A [`BallOutcome`] is
//! emitted only when the snapshot moves the match to a new ball position and
//! carries the ball that got it there, so duplicate or replayed snapshots
//! never produce a second event for the same ball.

use crate::{BallPosition, BallRecord, MatchSnapshot};
use serde::{Deserialize, Serialize};

/// Whether the first snapshot of a connection may emit an event.
///
/// The server repeats the latest ball on every snapshot, so a snapshot
/// received right after connecting usually describes a ball the player has
/// already seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstSnapshotPolicy {
    /// Treat the first snapshot's ball as already seen.
    #[default]
    Suppress,
    /// Emit for the first snapshot's ball, if it has one.
    Emit,
}

/// A newly resolved ball.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BallOutcome {
    pub position: BallPosition,
    pub batting_player: String,
    pub bowling_player: String,
    pub ball: BallRecord,
}

impl BallOutcome {
    fn from_snapshot(snapshot: &MatchSnapshot, ball: &BallRecord) -> Self {
        Self {
            position: snapshot.position(),
            batting_player: snapshot.batting_player.clone(),
            bowling_player: snapshot.bowling_player.clone(),
            ball: ball.clone(),
        }
    }

    pub fn is_wicket(&self) -> bool {
        self.ball.is_wicket
    }

    pub fn runs(&self) -> u32 {
        self.ball.credited_runs()
    }
}

/// Decide whether `next` resolves a new ball relative to `previous`.
///
/// The server is authoritative, so the accepted snapshot is always `next`,
/// even when it looks older than `previous`. Only the event is decided here.
pub fn reconcile(
    previous: Option<&MatchSnapshot>,
    next: &MatchSnapshot,
    policy: FirstSnapshotPolicy,
) -> Option<BallOutcome> {
    outcome_after(previous.map(MatchSnapshot::position), next, policy)
}

fn outcome_after(
    seen: Option<BallPosition>,
    next: &MatchSnapshot,
    policy: FirstSnapshotPolicy,
) -> Option<BallOutcome> {
    let ball = next.last_ball.as_ref()?;
    let is_new = match seen {
        Some(seen) => next.position() > seen,
        None => policy == FirstSnapshotPolicy::Emit,
    };
    is_new.then(|| BallOutcome::from_snapshot(next, ball))
}

/// Stateful reconciler for one connection.
///
/// Compares every snapshot against the furthest ball position seen so far,
/// so a stale snapshot followed by a fresh copy of an earlier one cannot
/// replay an event.
#[derive(Debug, Default)]
pub struct Reconciler {
    policy: FirstSnapshotPolicy,
    latest: Option<MatchSnapshot>,
    furthest: Option<BallPosition>,
}

impl Reconciler {
    pub fn new(policy: FirstSnapshotPolicy) -> Self {
        Self {
            policy,
            latest: None,
            furthest: None,
        }
    }

    pub fn policy(&self) -> FirstSnapshotPolicy {
        self.policy
    }

    /// The most recently accepted snapshot.
    pub fn latest(&self) -> Option<&MatchSnapshot> {
        self.latest.as_ref()
    }

    /// Accept `next` as the latest snapshot and return the ball it resolved,
    /// if any. `next` replaces the latest snapshot unconditionally.
    pub fn accept(&mut self, next: MatchSnapshot) -> Option<BallOutcome> {
        if let Some(previous) = &self.latest {
            if next.status < previous.status {
                tracing::warn!(
                    "match {} status went back from {} to {}",
                    next.match_code,
                    previous.status.as_str(),
                    next.status.as_str()
                );
            }
            if next.position() < previous.position() {
                tracing::warn!(
                    "match {} ball position went back from {:?} to {:?}",
                    next.match_code,
                    previous.position(),
                    next.position()
                );
            }
        }

        let outcome = outcome_after(self.furthest, &next, self.policy);
        if let Some(outcome) = &outcome {
            tracing::debug!(
                "ball {}.{} resolved: {}",
                outcome.position.inning,
                outcome.position.balls_played,
                outcome.ball
            );
        }

        let position = next.position();
        self.furthest = Some(match self.furthest {
            Some(furthest) => furthest.max(position),
            None => position,
        });
        self.latest = Some(next);
        outcome
    }
}
