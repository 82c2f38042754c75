//! Protocol messages.
//!
//! Inbound frames are one JSON object each: a tagged state update, a tagged
//! info message, or a bare `{"error": ...}` object. Outbound frames carry a
//! single move.

use crate::{MatchSnapshot, Symbol};
use serde::{Deserialize, Serialize};

/// Which side of the ball a move is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Bat,
    Bowl,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bat => "bat",
            Self::Bowl => "bowl",
        }
    }
}

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMessage {
    pub action: Action,
    pub choice: Symbol,
}

impl ClientMessage {
    pub fn new(action: Action, choice: Symbol) -> Self {
        Self { action, choice }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Fresh authoritative state.
    StateUpdate(MatchSnapshot),
    /// Informational text for the log.
    Info(String),
    /// Rejection of something the client sent.
    Error(String),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedMessage {
    GameStateUpdate { payload: MatchSnapshot },
    InfoMessage { message: String },
}

impl ServerMessage {
    /// Parse one inbound text frame.
    pub fn parse(text: &str) -> Result<Self, MessageError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let object = value.as_object().ok_or(MessageError::NotAnObject)?;

        if let Some(error) = object.get("error") {
            return Ok(match error {
                serde_json::Value::String(s) => ServerMessage::Error(s.clone()),
                other => ServerMessage::Error(other.to_string()),
            });
        }

        if !object.contains_key("type") {
            return Err(MessageError::MissingType);
        }

        Ok(match serde_json::from_value::<TaggedMessage>(value)? {
            TaggedMessage::GameStateUpdate { payload } => ServerMessage::StateUpdate(payload),
            TaggedMessage::InfoMessage { message } => ServerMessage::Info(message),
        })
    }
}

/// An inbound frame that did not match the protocol.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("invalid message JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message is not a JSON object")]
    NotAnObject,
    #[error("message has neither a type nor an error field")]
    MissingType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchStatus;

    #[test]
    fn parse_state_update() {
        let text = r#"{"type": "game_state_update", "payload": {
            "match_code": "ABC123", "status": "waiting", "current_inning": 1,
            "total_overs": 2, "batting_player": "alice", "bowling_player": "bob",
            "turn": "bob", "score": 0, "wickets": 0, "balls_played": 0
        }}"#;
        match ServerMessage::parse(text).unwrap() {
            ServerMessage::StateUpdate(snap) => {
                assert_eq!(snap.status, MatchStatus::Waiting);
                assert_eq!(snap.last_ball, None);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn parse_info_and_error() {
        let info = ServerMessage::parse(r#"{"type": "info_message", "message": "bob joined"}"#);
        assert_eq!(info.unwrap(), ServerMessage::Info("bob joined".to_string()));

        let error = ServerMessage::parse(r#"{"error": "Not your turn."}"#);
        assert_eq!(error.unwrap(), ServerMessage::Error("Not your turn.".to_string()));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(matches!(
            ServerMessage::parse("not json"),
            Err(MessageError::Json(_))
        ));
        assert!(matches!(
            ServerMessage::parse("[1, 2]"),
            Err(MessageError::NotAnObject)
        ));
        assert!(matches!(
            ServerMessage::parse(r#"{"payload": {}}"#),
            Err(MessageError::MissingType)
        ));
        assert!(matches!(
            ServerMessage::parse(r#"{"type": "game_state_update", "payload": {"score": 1}}"#),
            Err(MessageError::Json(_))
        ));
        assert!(ServerMessage::parse(r#"{"type": "chat"}"#).is_err());
    }

    #[test]
    fn encode_move() {
        let msg = ClientMessage::new(Action::Bowl, Symbol::F);
        assert_eq!(msg.to_json().unwrap(), r#"{"action":"bowl","choice":"F"}"#);
    }
}
