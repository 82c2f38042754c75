//! Interactive match loop.

use crate::render;
use papercricket_client::{
    ClientConfig, Credential, MatchSession, SessionUpdate, normalize_match_code,
};
use papercricket_core::{Role, Symbol};
use tokio::io::{AsyncBufReadExt, BufReader};

/// A line typed by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Choice(Symbol),
    Log,
    Overs,
    Dismiss,
    Quit,
    Unknown,
}

fn parse_input(line: &str) -> Input {
    match line.trim().to_ascii_lowercase().as_str() {
        "log" => Input::Log,
        "overs" => Input::Overs,
        "ok" => Input::Dismiss,
        "quit" | "exit" => Input::Quit,
        other => other.parse().map(Input::Choice).unwrap_or(Input::Unknown),
    }
}

pub async fn run(
    config: &ClientConfig,
    match_id: &str,
    credential: Credential,
) -> anyhow::Result<()> {
    let match_id = normalize_match_code(match_id);
    let mut session = MatchSession::open(config, &match_id, credential)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let result = play(&mut session, &mut lines).await;
    tracing::info!("Leaving match {}", match_id);
    session.close().await;
    result
}

async fn play<R>(
    session: &mut MatchSession,
    lines: &mut tokio::io::Lines<R>,
) -> anyhow::Result<()>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    loop {
        tokio::select! {
            update = session.next_update() => {
                let Some(update) = update else { break };
                render::update(session, &update);
                if let SessionUpdate::Disconnected { .. } = update {
                    println!("Connection ended. Run `play` again to reconnect.");
                    break;
                }
            }

            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Input::Choice(symbol) => match session.submit(symbol) {
                        Some(action) => println!("Sent {} ({})", symbol, action.as_str()),
                        None => println!("Not your turn."),
                    },
                    Input::Log => {
                        for line in session.state().history().display_lines() {
                            println!("{}", line);
                        }
                    }
                    Input::Overs => {
                        let username = session.username().to_string();
                        render::overs(session, &username, Role::Batting);
                        render::overs(session, &username, Role::Bowling);
                    }
                    Input::Dismiss => {
                        session.dismiss_notice();
                    }
                    Input::Quit => break,
                    Input::Unknown => println!("Type a letter A-G, log, overs, ok or quit."),
                }
            }
        }
    }
    Ok(())
}
