//! Match connection.
//!
//! [`ConnectionManager`] owns one WebSocket connection for one match. A
//! background task runs the handshake and then multiplexes outgoing moves
//! and incoming frames with `tokio::select!`. Lifecycle changes and raw
//! frames are delivered in order on the event channel returned by
//! [`ConnectionManager::open`].
//!
//! There is no reconnection. Once the connection is closed or errored the
//! owner must open a new manager.

use crate::credential::Credential;
use crate::error::ConnectionError;
use futures_util::{SinkExt, StreamExt};
use papercricket_core::{Action, ClientMessage, ConnectionState, Symbol};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

/// How long [`ConnectionManager::close`] waits for the task to finish.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Signals emitted by the connection task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Handshake completed; moves may be sent.
    Connected,
    /// A text frame from the server, unparsed.
    MessageReceived(String),
    /// A frame that is not part of the protocol.
    ProtocolError(String),
    /// The connection ended. Always the last event.
    Disconnected { reason: Option<String> },
}

enum Command {
    Send(String),
    Close,
}

/// Build the channel address for a match.
///
/// The credential travels as a query parameter; there is no separate
/// handshake message.
pub fn game_url(
    server_url: &str,
    match_id: &str,
    credential: &Credential,
) -> Result<String, ConnectionError> {
    if !(server_url.starts_with("ws://") || server_url.starts_with("wss://")) {
        return Err(ConnectionError::InvalidServerUrl(server_url.to_string()));
    }
    if match_id.is_empty() || !match_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConnectionError::InvalidMatchId(match_id.to_string()));
    }
    Ok(format!(
        "{}/ws/game/{}/?token={}",
        server_url.trim_end_matches('/'),
        match_id,
        credential.token()
    ))
}

/// Handle to the connection task for one match.
pub struct ConnectionManager {
    match_id: String,
    state: Arc<watch::Sender<ConnectionState>>,
    cmd_tx: mpsc::UnboundedSender<Command>,
    task: Option<JoinHandle<()>>,
}

impl ConnectionManager {
    /// Start connecting to `match_id` and return the handle plus the event
    /// receiver.
    ///
    /// Must be called from within a tokio runtime. Address problems are
    /// reported here; handshake failures arrive as a
    /// [`ConnectionEvent::Disconnected`] with the state set to
    /// [`ConnectionState::Errored`].
    pub fn open(
        server_url: &str,
        match_id: &str,
        credential: &Credential,
        event_capacity: usize,
    ) -> Result<(Self, mpsc::Receiver<ConnectionEvent>), ConnectionError> {
        let url = game_url(server_url, match_id, credential)?;

        let (state_tx, _) = watch::channel(ConnectionState::Idle);
        let state = Arc::new(state_tx);
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(event_capacity.max(1));

        tracing::info!("Connecting to match {} as {}", match_id, credential.username());
        let task = tokio::spawn(run(url, state.clone(), cmd_rx, event_tx));

        let manager = Self {
            match_id: match_id.to_string(),
            state,
            cmd_tx,
            task: Some(task),
        };
        Ok((manager, event_rx))
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Send a move. Does nothing unless the connection is open.
    pub fn send(&self, action: Action, choice: Symbol) {
        let state = self.state();
        if !state.is_open() {
            tracing::debug!(
                "dropping {} {} for match {}: connection is {:?}",
                action.as_str(),
                choice,
                self.match_id,
                state
            );
            return;
        }
        match ClientMessage::new(action, choice).to_json() {
            Ok(json) => {
                let _ = self.cmd_tx.send(Command::Send(json));
            }
            Err(e) => tracing::error!("failed to encode move: {}", e),
        }
    }

    /// Close the connection and wait for the task to stop.
    pub async fn close(&mut self) {
        let _ = self.cmd_tx.send(Command::Close);

        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(CLOSE_TIMEOUT, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!("connection task failed: {}", e),
                Err(_) => {
                    tracing::warn!("connection task did not stop in time; aborting");
                    task.abort();
                }
            }
        }
        advance(&self.state, ConnectionState::Closed);
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("match_id", &self.match_id)
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Move the lifecycle forward. Backward or repeated moves are ignored.
fn advance(state: &watch::Sender<ConnectionState>, next: ConnectionState) {
    state.send_if_modified(|current| {
        if current.can_advance_to(next) {
            tracing::debug!("connection {:?} -> {:?}", current, next);
            *current = next;
            true
        } else {
            false
        }
    });
}

/// Waits for room on the channel; returns at once if the receiver is closed.
async fn emit(event_tx: &mpsc::Sender<ConnectionEvent>, event: ConnectionEvent) {
    if event_tx.send(event).await.is_err() {
        tracing::debug!("event receiver dropped");
    }
}

async fn run(
    url: String,
    state: Arc<watch::Sender<ConnectionState>>,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: mpsc::Sender<ConnectionEvent>,
) {
    advance(&state, ConnectionState::Connecting);

    let ws = tokio::select! {
        result = tokio_tungstenite::connect_async(url.as_str()) => match result {
            Ok((ws, _response)) => ws,
            Err(e) => {
                tracing::warn!("Connection failed: {}", e);
                advance(&state, ConnectionState::Errored);
                emit(&event_tx, ConnectionEvent::Disconnected { reason: Some(e.to_string()) }).await;
                return;
            }
        },
        _ = cmd_rx.recv() => {
            advance(&state, ConnectionState::Closed);
            emit(&event_tx, ConnectionEvent::Disconnected {
                reason: Some("closed before connecting".to_string()),
            }).await;
            return;
        }
    };

    advance(&state, ConnectionState::Open);
    tracing::info!("Connected");
    emit(&event_tx, ConnectionEvent::Connected).await;

    let (mut sink, mut stream) = ws.split();

    let (end, reason) = loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(Command::Send(json)) => {
                    tracing::debug!("-> {}", json);
                    if let Err(e) = sink.send(Message::Text(json.into())).await {
                        break (ConnectionState::Errored, Some(format!("send failed: {}", e)));
                    }
                }
                Some(Command::Close) | None => {
                    let _ = sink.send(Message::Close(None)).await;
                    break (ConnectionState::Closed, None);
                }
            },

            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    tracing::debug!("<- {}", text.as_str());
                    emit(&event_tx, ConnectionEvent::MessageReceived(text.as_str().to_string())).await;
                }
                Some(Ok(Message::Binary(data))) => {
                    tracing::warn!("Unexpected binary frame ({} bytes)", data.len());
                    emit(&event_tx, ConnectionEvent::ProtocolError(
                        format!("unexpected binary frame ({} bytes)", data.len()),
                    )).await;
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.reason.as_str().to_string())
                        .filter(|r| !r.is_empty());
                    break (ConnectionState::Closed, reason);
                }
                // Ping and pong are answered by tungstenite.
                Some(Ok(_)) => {}
                Some(Err(e)) => break (ConnectionState::Errored, Some(e.to_string())),
                None => break (ConnectionState::Closed, None),
            }
        }
    };

    match &reason {
        Some(reason) => tracing::info!("Disconnected: {}", reason),
        None => tracing::info!("Disconnected"),
    }
    advance(&state, end);
    emit(&event_tx, ConnectionEvent::Disconnected { reason }).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential::new("alice", "tok.en-1").unwrap()
    }

    #[test]
    fn url_embeds_match_and_token() {
        let url = game_url("ws://127.0.0.1:8000/", "ABC123", &credential()).unwrap();
        assert_eq!(url, "ws://127.0.0.1:8000/ws/game/ABC123/?token=tok.en-1");
    }

    #[test]
    fn url_rejects_bad_input() {
        assert_eq!(
            game_url("http://host", "ABC123", &credential()),
            Err(ConnectionError::InvalidServerUrl("http://host".to_string()))
        );
        assert_eq!(
            game_url("ws://host", "../x", &credential()),
            Err(ConnectionError::InvalidMatchId("../x".to_string()))
        );
        assert!(game_url("ws://host", "", &credential()).is_err());
    }

    #[tokio::test]
    async fn unreachable_server_errors_and_ignores_sends() {
        // Bind then drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (manager, mut events) =
            ConnectionManager::open(&format!("ws://{}", addr), "ABC123", &credential(), 8)
                .unwrap();
        manager.send(Action::Bat, Symbol::A);

        match events.recv().await {
            Some(ConnectionEvent::Disconnected { reason }) => assert!(reason.is_some()),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(manager.state(), ConnectionState::Errored);
        assert_eq!(events.recv().await, None);

        manager.send(Action::Bat, Symbol::A);
        assert_eq!(manager.state(), ConnectionState::Errored);
    }

    #[tokio::test]
    async fn state_watchers_see_the_terminal_state() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (manager, _events) =
            ConnectionManager::open(&format!("ws://{}", addr), "ABC123", &credential(), 8)
                .unwrap();
        let mut watcher = manager.subscribe_state();
        let state = *watcher.wait_for(|s| s.is_terminal()).await.unwrap();
        assert_eq!(state, ConnectionState::Errored);
    }

    #[tokio::test]
    async fn secure_url_starts_a_tls_handshake() {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (_manager, mut events) =
            ConnectionManager::open(&format!("wss://{}", addr), "ABC123", &credential(), 8)
                .unwrap();

        let (mut stream, _) = listener.accept().await.unwrap();
        let mut first = [0u8; 1];
        stream.read_exact(&mut first).await.unwrap();
        // TLS handshake record.
        assert_eq!(first[0], 0x16);
        drop(stream);

        match events.recv().await {
            Some(ConnectionEvent::Disconnected { reason }) => {
                let reason = reason.unwrap();
                assert!(!reason.contains("TLS support not compiled in"), "{}", reason);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
