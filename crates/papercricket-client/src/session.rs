//! One match view: connection, state pipeline and overlay together.
//!
//! Events are taken from the connection one at a time and fully applied
//! before the next is read. Closing the session closes the connection and
//! cancels the overlay timer; dropping it aborts both.

use crate::config::ClientConfig;
use crate::connection::{ConnectionEvent, ConnectionManager};
use crate::credential::Credential;
use crate::error::ClientError;
use crate::overlay::{OutcomeOverlay, Overlay};
use papercricket_core::{
    Action, Applied, ConnectionState, MatchSnapshot, MatchState, ServerMessage, Symbol,
    TurnAction, ViewMode,
};
use tokio::sync::{mpsc, watch};

/// What handling one connection event produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Connected,
    Applied(Applied),
    Disconnected {
        reason: Option<String>,
        state: ConnectionState,
    },
}

#[derive(Debug)]
pub struct MatchSession {
    credential: Credential,
    connection: ConnectionManager,
    events: mpsc::Receiver<ConnectionEvent>,
    state: MatchState,
    overlay: OutcomeOverlay,
    history_view_limit: usize,
}

impl MatchSession {
    /// Open the connection for `match_id` and set up an empty match state.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(
        config: &ClientConfig,
        match_id: &str,
        credential: Credential,
    ) -> Result<Self, ClientError> {
        let (connection, events) = ConnectionManager::open(
            &config.server_url,
            match_id,
            &credential,
            config.event_capacity,
        )?;
        Ok(Self {
            credential,
            connection,
            events,
            state: MatchState::new(config.first_snapshot, config.info_log_limit),
            overlay: OutcomeOverlay::new(config.overlay_duration()),
            history_view_limit: config.history_view_limit,
        })
    }

    /// Wait for the next connection event and apply it.
    ///
    /// Returns `None` once the connection has ended and every event has
    /// been handled.
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        let event = self.events.recv().await?;
        Some(self.handle_event(event))
    }

    /// Apply one connection event.
    pub fn handle_event(&mut self, event: ConnectionEvent) -> SessionUpdate {
        match event {
            ConnectionEvent::Connected => SessionUpdate::Connected,
            ConnectionEvent::MessageReceived(raw) => {
                let applied = match ServerMessage::parse(&raw) {
                    Ok(message) => self.state.apply(message),
                    Err(e) => self.state.malformed(&e.to_string()),
                };
                if let Some(outcome) = &applied.outcome {
                    self.overlay.show(outcome);
                }
                SessionUpdate::Applied(applied)
            }
            ConnectionEvent::ProtocolError(message) => {
                SessionUpdate::Applied(self.state.malformed(&message))
            }
            ConnectionEvent::Disconnected { reason } => SessionUpdate::Disconnected {
                reason,
                state: self.connection.state(),
            },
        }
    }

    /// Send `choice` if it is the local player's turn.
    ///
    /// Returns the action sent, or `None` when there was nothing to do.
    pub fn submit(&self, choice: Symbol) -> Option<Action> {
        let action = self.turn_action().action()?;
        if !self.connection.state().is_open() {
            tracing::debug!("not sending {}: connection is not open", choice);
            return None;
        }
        tracing::info!("{} plays {} ({})", self.credential.username(), choice, action.as_str());
        self.connection.send(action, choice);
        Some(action)
    }

    pub fn username(&self) -> &str {
        self.credential.username()
    }

    pub fn match_id(&self) -> &str {
        self.connection.match_id()
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn snapshot(&self) -> Option<&MatchSnapshot> {
        self.state.snapshot()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.state.view_mode()
    }

    pub fn turn_action(&self) -> TurnAction {
        self.state.turn_action(self.credential.username())
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn dismiss_notice(&mut self) -> Option<String> {
        self.state.dismiss_notice()
    }

    pub fn overlay(&self) -> Option<Overlay> {
        self.overlay.current()
    }

    pub fn subscribe_overlay(&self) -> watch::Receiver<Option<Overlay>> {
        self.overlay.subscribe()
    }

    /// Log lines for the most recent balls, capped by configuration.
    pub fn recent_log(&self) -> Vec<String> {
        self.state.history().recent_lines(self.history_view_limit)
    }

    /// Close the connection and cancel the overlay.
    ///
    /// Events not yet handled are discarded. The event channel is closed
    /// first so a task blocked on a full channel can still see the close.
    pub async fn close(&mut self) {
        self.overlay.cancel();
        self.events.close();
        self.connection.close().await;
        // Drain what the task emitted on the way out.
        while let Ok(event) = self.events.try_recv() {
            tracing::debug!("discarding {:?} after close", event);
        }
    }
}
