//! Ball-by-ball history.
//!
//! The structured entries are the record. Log lines, over groupings and
//! running totals are all computed from them on demand.

use crate::BallOutcome;
use crate::snapshot::BALLS_PER_OVER;

/// The role a player held on a ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Batting,
    Bowling,
}

/// One resolved ball, numbered in arrival order from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub number: usize,
    pub outcome: BallOutcome,
}

impl HistoryEntry {
    pub fn player(&self, role: Role) -> &str {
        match role {
            Role::Batting => &self.outcome.batting_player,
            Role::Bowling => &self.outcome.bowling_player,
        }
    }

    /// `Bowler: A, Batsman: B → 2 runs`
    pub fn text(&self) -> String {
        self.outcome.ball.to_string()
    }

    /// `Ball 3: Bowler: A, Batsman: B → 2 runs`
    pub fn log_line(&self) -> String {
        format!("Ball {}: {}", self.number, self.text())
    }
}

/// A ball inside an over grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverBall<'a> {
    pub entry: &'a HistoryEntry,
    /// Player's running total after this ball. For the batting role this is
    /// runs scored and stops moving at the first wicket; for bowling it is
    /// runs conceded.
    pub running_total: u32,
    /// This ball closed the batting player's running total.
    pub terminal: bool,
}

/// Up to six consecutive balls for one player in one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Over<'a> {
    /// 1-based over number.
    pub number: usize,
    pub balls: Vec<OverBall<'a>>,
}

impl Over<'_> {
    pub fn runs(&self) -> u32 {
        self.balls.iter().map(|b| b.entry.outcome.runs()).sum()
    }

    pub fn wickets(&self) -> usize {
        self.balls
            .iter()
            .filter(|b| b.entry.outcome.is_wicket())
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.balls.len() == BALLS_PER_OVER as usize
    }
}

/// A player's batting record up to their first dismissal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BattingTotal {
    pub runs: u32,
    pub balls_faced: usize,
    /// History number of the ball that dismissed the player.
    pub dismissed_by: Option<usize>,
}

impl BattingTotal {
    pub fn is_out(&self) -> bool {
        self.dismissed_by.is_some()
    }
}

/// Append-only ordered record of resolved balls for one session.
#[derive(Debug, Clone, Default)]
pub struct BallHistory {
    entries: Vec<HistoryEntry>,
}

impl BallHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolved ball.
    pub fn push(&mut self, outcome: BallOutcome) -> &HistoryEntry {
        let number = self.entries.len() + 1;
        self.entries.push(HistoryEntry { number, outcome });
        &self.entries[number - 1]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// The last `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> &[HistoryEntry] {
        let start = self.entries.len().saturating_sub(limit);
        &self.entries[start..]
    }

    /// Log lines for every entry.
    pub fn display_lines(&self) -> Vec<String> {
        self.entries.iter().map(HistoryEntry::log_line).collect()
    }

    /// Log lines for the last `limit` entries.
    pub fn recent_lines(&self, limit: usize) -> Vec<String> {
        self.recent(limit).iter().map(HistoryEntry::log_line).collect()
    }

    /// Group a player's balls in `role` into overs of six.
    pub fn overs(&self, player: &str, role: Role) -> Vec<Over<'_>> {
        let mut running_total = 0;
        let mut closed = false;
        let balls: Vec<OverBall<'_>> = self
            .entries
            .iter()
            .filter(|entry| entry.player(role) == player)
            .map(|entry| {
                let mut terminal = false;
                match role {
                    Role::Batting if !closed => {
                        running_total += entry.outcome.runs();
                        if entry.outcome.is_wicket() {
                            closed = true;
                            terminal = true;
                        }
                    }
                    Role::Batting => {}
                    Role::Bowling => running_total += entry.outcome.runs(),
                }
                OverBall {
                    entry,
                    running_total,
                    terminal,
                }
            })
            .collect();

        balls
            .chunks(BALLS_PER_OVER as usize)
            .enumerate()
            .map(|(i, chunk)| Over {
                number: i + 1,
                balls: chunk.to_vec(),
            })
            .collect()
    }

    /// Runs scored by `player` up to and including their first dismissal.
    pub fn batting_total(&self, player: &str) -> BattingTotal {
        let mut total = BattingTotal::default();
        for entry in self
            .entries
            .iter()
            .filter(|entry| entry.player(Role::Batting) == player)
        {
            total.balls_faced += 1;
            total.runs += entry.outcome.runs();
            if entry.outcome.is_wicket() {
                total.dismissed_by = Some(entry.number);
                break;
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BallPosition, BallRecord, Symbol};

    fn outcome(balls_played: u32, batting: &str, bowling: &str, ball: BallRecord) -> BallOutcome {
        BallOutcome {
            position: BallPosition {
                inning: 1,
                balls_played,
            },
            batting_player: batting.to_string(),
            bowling_player: bowling.to_string(),
            ball,
        }
    }

    fn runs(n: u32) -> BallRecord {
        let batsman = match n {
            1 => Symbol::A,
            2 => Symbol::B,
            3 => Symbol::C,
            4 => Symbol::D,
            _ => Symbol::E,
        };
        BallRecord::runs(Symbol::G, batsman, n)
    }

    #[test]
    fn appends_in_arrival_order() {
        let mut history = BallHistory::new();
        history.push(outcome(1, "alice", "bob", runs(2)));
        history.push(outcome(2, "alice", "bob", BallRecord::wicket(Symbol::C, Symbol::C)));

        assert_eq!(history.len(), 2);
        assert_eq!(
            history.display_lines(),
            vec![
                "Ball 1: Bowler: G, Batsman: B → 2 runs".to_string(),
                "Ball 2: Bowler: C, Batsman: C → OUT!".to_string(),
            ]
        );
        assert_eq!(history.entries()[1].text(), "Bowler: C, Batsman: C → OUT!");
    }

    #[test]
    fn recent_caps_view_not_record() {
        let mut history = BallHistory::new();
        for i in 1..=10 {
            history.push(outcome(i, "alice", "bob", runs(1)));
        }
        let recent = history.recent(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].number, 8);
        assert_eq!(history.recent_lines(1), vec!["Ball 10: Bowler: G, Batsman: A → 1 run"]);
        assert_eq!(history.len(), 10);
        assert_eq!(history.recent(50).len(), 10);
    }

    #[test]
    fn groups_overs_by_role() {
        let mut history = BallHistory::new();
        for i in 1..=8 {
            history.push(outcome(i, "alice", "bob", runs(1)));
        }
        for i in 1..=2 {
            history.push(outcome(i, "bob", "alice", runs(4)));
        }

        let alice_batting = history.overs("alice", Role::Batting);
        assert_eq!(alice_batting.len(), 2);
        assert!(alice_batting[0].is_complete());
        assert_eq!(alice_batting[0].runs(), 6);
        assert_eq!(alice_batting[1].number, 2);
        assert_eq!(alice_batting[1].balls.len(), 2);
        assert_eq!(alice_batting[1].balls[1].running_total, 8);

        let alice_bowling = history.overs("alice", Role::Bowling);
        assert_eq!(alice_bowling.len(), 1);
        assert_eq!(alice_bowling[0].runs(), 8);

        assert!(history.overs("carol", Role::Batting).is_empty());
    }

    #[test]
    fn wicket_closes_batting_total() {
        let mut history = BallHistory::new();
        history.push(outcome(1, "alice", "bob", runs(3)));
        history.push(outcome(2, "alice", "bob", BallRecord::wicket(Symbol::C, Symbol::C)));
        history.push(outcome(3, "alice", "bob", runs(6)));

        let total = history.batting_total("alice");
        assert_eq!(total.runs, 3);
        assert_eq!(total.balls_faced, 2);
        assert_eq!(total.dismissed_by, Some(2));
        assert!(total.is_out());

        let overs = history.overs("alice", Role::Batting);
        let balls = &overs[0].balls;
        assert!(!balls[0].terminal);
        assert!(balls[1].terminal);
        assert_eq!(balls[1].running_total, 3);
        assert_eq!(balls[2].running_total, 3);
        assert_eq!(overs[0].wickets(), 1);
    }

    #[test]
    fn not_out_total() {
        let mut history = BallHistory::new();
        history.push(outcome(1, "alice", "bob", runs(2)));
        let total = history.batting_total("alice");
        assert_eq!(total.runs, 2);
        assert!(!total.is_out());
        assert_eq!(history.batting_total("bob"), BattingTotal::default());
    }
}
