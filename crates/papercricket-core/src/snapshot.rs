//! Authoritative match state as pushed by the server.

use crate::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Balls in one over.
pub const BALLS_PER_OVER: u32 = 6;

/// Match lifecycle. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Created, waiting for the second player.
    Waiting,
    /// Both players present, balls being played.
    Ongoing,
    /// Match decided.
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
        }
    }
}

/// The structured outcome of one resolved ball.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallRecord {
    pub bowler_choice: Symbol,
    pub batsman_choice: Symbol,
    /// Zero when the ball took a wicket.
    pub runs_scored: u32,
    pub is_wicket: bool,
}

impl BallRecord {
    pub fn runs(bowler_choice: Symbol, batsman_choice: Symbol, runs_scored: u32) -> Self {
        Self {
            bowler_choice,
            batsman_choice,
            runs_scored,
            is_wicket: false,
        }
    }

    pub fn wicket(bowler_choice: Symbol, batsman_choice: Symbol) -> Self {
        Self {
            bowler_choice,
            batsman_choice,
            runs_scored: 0,
            is_wicket: true,
        }
    }

    /// Runs credited to the batsman. A wicket never carries runs, whatever
    /// the wire said.
    pub fn credited_runs(&self) -> u32 {
        if self.is_wicket { 0 } else { self.runs_scored }
    }

    /// Short result text, e.g. `OUT!` or `2 runs`.
    pub fn result_text(&self) -> String {
        match (self.is_wicket, self.runs_scored) {
            (true, _) => "OUT!".to_string(),
            (false, 1) => "1 run".to_string(),
            (false, n) => format!("{} runs", n),
        }
    }
}

impl fmt::Display for BallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bowler: {}, Batsman: {} → {}",
            self.bowler_choice,
            self.batsman_choice,
            self.result_text()
        )
    }
}

/// Where a ball sits in the match. Orders by inning, then by ball count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BallPosition {
    pub inning: u32,
    pub balls_played: u32,
}

/// Full match state received on every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub match_code: String,
    pub status: MatchStatus,
    pub current_inning: u32,
    pub total_overs: u32,
    pub batting_player: String,
    pub bowling_player: String,
    #[serde(default)]
    pub turn: Option<String>,
    pub score: u32,
    pub wickets: u32,
    pub balls_played: u32,
    #[serde(default)]
    pub target: Option<u32>,
    #[serde(default)]
    pub last_ball: Option<BallRecord>,
    #[serde(default)]
    pub winner: Option<String>,
}

impl MatchSnapshot {
    pub fn position(&self) -> BallPosition {
        BallPosition {
            inning: self.current_inning,
            balls_played: self.balls_played,
        }
    }

    /// Overs bowled in the current inning, e.g. `2.3`.
    pub fn overs_display(&self) -> String {
        format!(
            "{}.{}",
            self.balls_played / BALLS_PER_OVER,
            self.balls_played % BALLS_PER_OVER
        )
    }

    pub fn total_balls(&self) -> u32 {
        self.total_overs * BALLS_PER_OVER
    }

    pub fn balls_remaining(&self) -> u32 {
        self.total_balls().saturating_sub(self.balls_played)
    }

    /// Runs still needed by the chasing side, once a target is set.
    pub fn runs_needed(&self) -> Option<u32> {
        self.target.map(|target| target.saturating_sub(self.score))
    }

    /// Runs needed per remaining ball.
    pub fn required_rate(&self) -> Option<f64> {
        let needed = self.runs_needed()?;
        match self.balls_remaining() {
            0 => None,
            balls => Some(f64::from(needed) / f64::from(balls)),
        }
    }

    pub fn is_participant(&self, username: &str) -> bool {
        self.batting_player == username || self.bowling_player == username
    }

    /// Headline for a finished match.
    pub fn result_text(&self) -> Option<String> {
        if self.status != MatchStatus::Completed {
            return None;
        }
        Some(match &self.winner {
            Some(winner) => format!("{} wins!", winner),
            None => "It's a tie!".to_string(),
        })
    }

    /// Check the structural invariants the server is expected to hold.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.batting_player == self.bowling_player {
            return Err(SnapshotError::SamePlayerBothRoles(self.batting_player.clone()));
        }
        if let Some(turn) = &self.turn
            && !self.is_participant(turn)
        {
            return Err(SnapshotError::TurnNotParticipant(turn.clone()));
        }
        if let Some(ball) = &self.last_ball
            && ball.is_wicket
            && ball.runs_scored > 0
        {
            return Err(SnapshotError::WicketWithRuns(ball.runs_scored));
        }
        Ok(())
    }
}

/// A snapshot that breaks a structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("{0} is both batting and bowling")]
    SamePlayerBothRoles(String),
    #[error("turn belongs to {0}, who is neither batting nor bowling")]
    TurnNotParticipant(String),
    #[error("wicket ball reports {0} runs")]
    WicketWithRuns(u32),
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// An ongoing first-inning snapshot with alice batting and on strike.
    pub(crate) fn snapshot(balls_played: u32) -> MatchSnapshot {
        MatchSnapshot {
            match_code: "ABC123".to_string(),
            status: MatchStatus::Ongoing,
            current_inning: 1,
            total_overs: 2,
            batting_player: "alice".to_string(),
            bowling_player: "bob".to_string(),
            turn: Some("alice".to_string()),
            score: 0,
            wickets: 0,
            balls_played,
            target: None,
            last_ball: None,
            winner: None,
        }
    }

    #[test]
    fn parses_wire_payload() {
        let json = r#"{
            "match_code": "QWE987",
            "status": "ongoing",
            "current_inning": 2,
            "batting_player": "bob",
            "bowling_player": "alice",
            "turn": null,
            "score": 7,
            "wickets": 1,
            "balls_played": 4,
            "total_overs": 1,
            "target": 12,
            "winner": null,
            "last_ball": {"bowler_choice": "A", "batsman_choice": "D", "runs_scored": 4, "is_wicket": false}
        }"#;
        let snap: MatchSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.status, MatchStatus::Ongoing);
        assert_eq!(snap.turn, None);
        assert_eq!(snap.target, Some(12));
        assert_eq!(
            snap.last_ball,
            Some(BallRecord::runs(Symbol::A, Symbol::D, 4))
        );
    }

    #[test]
    fn display_text() {
        let runs = BallRecord::runs(Symbol::A, Symbol::B, 2);
        assert_eq!(runs.to_string(), "Bowler: A, Batsman: B → 2 runs");

        let single = BallRecord::runs(Symbol::B, Symbol::A, 1);
        assert_eq!(single.to_string(), "Bowler: B, Batsman: A → 1 run");

        let out = BallRecord::wicket(Symbol::C, Symbol::C);
        assert_eq!(out.to_string(), "Bowler: C, Batsman: C → OUT!");
    }

    #[test]
    fn scoreboard_values() {
        let mut snap = snapshot(8);
        snap.current_inning = 2;
        snap.score = 10;
        snap.target = Some(15);
        assert_eq!(snap.overs_display(), "1.2");
        assert_eq!(snap.balls_remaining(), 4);
        assert_eq!(snap.runs_needed(), Some(5));
        assert_eq!(snap.required_rate(), Some(1.25));

        snap.score = 20;
        assert_eq!(snap.runs_needed(), Some(0));

        snap.balls_played = 12;
        assert_eq!(snap.required_rate(), None);
    }

    #[test]
    fn result_text_only_when_completed() {
        let mut snap = snapshot(3);
        assert_eq!(snap.result_text(), None);

        snap.status = MatchStatus::Completed;
        assert_eq!(snap.result_text().as_deref(), Some("It's a tie!"));

        snap.winner = Some("bob".to_string());
        assert_eq!(snap.result_text().as_deref(), Some("bob wins!"));
    }

    #[test]
    fn validate_catches_bad_turn() {
        let mut snap = snapshot(0);
        assert!(snap.validate().is_ok());

        snap.turn = Some("mallory".to_string());
        assert_eq!(
            snap.validate(),
            Err(SnapshotError::TurnNotParticipant("mallory".to_string()))
        );

        snap.turn = None;
        snap.bowling_player = "alice".to_string();
        assert!(matches!(
            snap.validate(),
            Err(SnapshotError::SamePlayerBothRoles(_))
        ));
    }

    #[test]
    fn positions_order_by_inning_first() {
        let mut first = snapshot(6);
        let mut second = snapshot(1);
        second.current_inning = 2;
        assert!(second.position() > first.position());

        first.balls_played = 2;
        assert!(snapshot(3).position() > first.position());
    }
}
