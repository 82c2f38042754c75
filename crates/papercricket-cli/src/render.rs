//! Plain-text rendering of session updates.

use papercricket_client::{MatchSession, SessionUpdate};
use papercricket_core::{MatchSnapshot, Role, TurnAction, ViewMode};

pub fn update(session: &MatchSession, update: &SessionUpdate) {
    match update {
        SessionUpdate::Connected => println!("Connected to match {}.", session.match_id()),
        SessionUpdate::Applied(applied) => {
            if let Some(notice) = &applied.notice {
                println!("! {}  (type `ok` to dismiss)", notice);
            }
            if let Some(info) = &applied.info {
                println!("Info: {}", info);
            }
            if applied.outcome.is_some()
                && let Some(entry) = session.state().history().last()
            {
                println!("{}", entry.log_line());
                if let Some(overlay) = session.overlay() {
                    println!("*** {} ***", overlay.text);
                }
            }
            if applied.snapshot_changed
                && let Some(snapshot) = session.snapshot()
            {
                scoreboard(session, snapshot);
            }
        }
        SessionUpdate::Disconnected { reason, state } => match reason {
            Some(reason) => println!("Disconnected ({:?}): {}", state, reason),
            None => println!("Disconnected ({:?}).", state),
        },
    }
}

fn scoreboard(session: &MatchSession, snapshot: &MatchSnapshot) {
    match session.view_mode() {
        ViewMode::Lobby => {
            println!(
                "Waiting for an opponent. Match code: {}",
                snapshot.match_code
            );
        }
        ViewMode::Active => {
            println!(
                "Inning {} | {} batting, {} bowling | {}/{} in {} of {} overs",
                snapshot.current_inning,
                snapshot.batting_player,
                snapshot.bowling_player,
                snapshot.score,
                snapshot.wickets,
                snapshot.overs_display(),
                snapshot.total_overs
            );
            if let Some(needed) = snapshot.runs_needed() {
                println!(
                    "Target {}: need {} from {} balls",
                    snapshot.target.unwrap_or_default(),
                    needed,
                    snapshot.balls_remaining()
                );
            }
            match session.turn_action() {
                TurnAction::Bat => println!("Your turn to bat. Pick a letter A-G."),
                TurnAction::Bowl => println!("Your turn to bowl. Pick a letter A-G."),
                TurnAction::Wait => match &snapshot.turn {
                    Some(turn) => println!("Waiting for {}...", turn),
                    None => println!("Waiting..."),
                },
            }
        }
        ViewMode::Completed => {
            println!(
                "Match over! {}",
                snapshot.result_text().unwrap_or_default()
            );
        }
    }
}

pub fn overs(session: &MatchSession, player: &str, role: Role) {
    let history = session.state().history();
    let overs = history.overs(player, role);
    if overs.is_empty() {
        return;
    }
    let label = match role {
        Role::Batting => "batting",
        Role::Bowling => "bowling",
    };
    println!("{} {}:", player, label);
    for over in &overs {
        let balls: Vec<String> = over
            .balls
            .iter()
            .map(|b| {
                let mark = if b.terminal { " (out)" } else { "" };
                format!("{}{}", b.entry.outcome.ball.result_text(), mark)
            })
            .collect();
        println!("  Over {}: {} | {} runs", over.number, balls.join(", "), over.runs());
    }
    if role == Role::Batting {
        let total = history.batting_total(player);
        let status = if total.is_out() { "out" } else { "not out" };
        println!("  Total: {} ({} balls, {})", total.runs, total.balls_faced, status);
    }
}
