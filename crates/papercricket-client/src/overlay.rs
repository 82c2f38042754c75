//! Transient "ball result" overlay.
//!
//! At most one overlay is visible. Showing a new one replaces the current
//! overlay and restarts the expiry timer instead of queueing behind it.

use papercricket_core::BallOutcome;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Wicket,
    Runs(u32),
}

/// The overlay currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    /// Increments with every overlay shown.
    pub id: u64,
    pub text: String,
    pub kind: OverlayKind,
}

impl Overlay {
    fn for_outcome(id: u64, outcome: &BallOutcome) -> Self {
        let (text, kind) = if outcome.is_wicket() {
            ("OUT!".to_string(), OverlayKind::Wicket)
        } else {
            (
                format!("{}!", outcome.ball.result_text()),
                OverlayKind::Runs(outcome.runs()),
            )
        };
        Self { id, text, kind }
    }

    pub fn is_wicket(&self) -> bool {
        self.kind == OverlayKind::Wicket
    }
}

/// Shows one overlay per ball outcome for a fixed duration.
pub struct OutcomeOverlay {
    duration: Duration,
    visible: Arc<watch::Sender<Option<Overlay>>>,
    next_id: u64,
    expiry: Option<JoinHandle<()>>,
}

impl OutcomeOverlay {
    pub fn new(duration: Duration) -> Self {
        let (visible, _) = watch::channel(None);
        Self {
            duration,
            visible: Arc::new(visible),
            next_id: 1,
            expiry: None,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Show the overlay for `outcome`, replacing any visible one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn show(&mut self, outcome: &BallOutcome) {
        if let Some(expiry) = self.expiry.take() {
            expiry.abort();
        }

        let overlay = Overlay::for_outcome(self.next_id, outcome);
        self.next_id += 1;
        let id = overlay.id;
        tracing::debug!("overlay {} shown: {}", id, overlay.text);
        self.visible.send_replace(Some(overlay));

        let visible = self.visible.clone();
        let duration = self.duration;
        self.expiry = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            // Only clear the overlay this timer was started for.
            visible.send_if_modified(|current| {
                if current.as_ref().is_some_and(|o| o.id == id) {
                    *current = None;
                    true
                } else {
                    false
                }
            });
        }));
    }

    pub fn current(&self) -> Option<Overlay> {
        self.visible.borrow().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Overlay>> {
        self.visible.subscribe()
    }

    /// Hide any overlay and cancel its timer.
    pub fn cancel(&mut self) {
        if let Some(expiry) = self.expiry.take() {
            expiry.abort();
        }
        self.visible.send_replace(None);
    }
}

impl std::fmt::Debug for OutcomeOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeOverlay")
            .field("duration", &self.duration)
            .field("current", &self.current())
            .finish()
    }
}

impl Drop for OutcomeOverlay {
    fn drop(&mut self) {
        if let Some(expiry) = self.expiry.take() {
            expiry.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papercricket_core::{BallPosition, BallRecord, Symbol};
    use tokio::time::{Instant, sleep_until};

    fn outcome(ball: BallRecord) -> BallOutcome {
        BallOutcome {
            position: BallPosition {
                inning: 1,
                balls_played: 1,
            },
            batting_player: "alice".to_string(),
            bowling_player: "bob".to_string(),
            ball,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn expires_after_duration() {
        let start = Instant::now();
        let mut overlay = OutcomeOverlay::new(Duration::from_millis(2000));
        overlay.show(&outcome(BallRecord::runs(Symbol::A, Symbol::B, 2)));

        let shown = overlay.current().unwrap();
        assert_eq!(shown.text, "2 runs!");
        assert_eq!(shown.kind, OverlayKind::Runs(2));

        sleep_until(start + Duration::from_millis(1999)).await;
        assert!(overlay.is_visible());

        sleep_until(start + Duration::from_millis(2001)).await;
        assert!(!overlay.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn second_outcome_resets_timer() {
        let start = Instant::now();
        let mut overlay = OutcomeOverlay::new(Duration::from_millis(2000));
        let mut rx = overlay.subscribe();

        // Record every change so a hide-then-show in between is caught.
        let watcher = tokio::spawn(async move {
            let mut hidden_at = Vec::new();
            while rx.changed().await.is_ok() {
                if rx.borrow_and_update().is_none() {
                    hidden_at.push(Instant::now() - start);
                }
            }
            hidden_at
        });

        overlay.show(&outcome(BallRecord::runs(Symbol::A, Symbol::B, 2)));
        sleep_until(start + Duration::from_millis(500)).await;
        overlay.show(&outcome(BallRecord::wicket(Symbol::C, Symbol::C)));

        sleep_until(start + Duration::from_millis(2100)).await;
        let current = overlay.current().unwrap();
        assert!(current.is_wicket());
        assert_eq!(current.text, "OUT!");

        sleep_until(start + Duration::from_millis(2499)).await;
        assert!(overlay.is_visible());

        sleep_until(start + Duration::from_millis(2501)).await;
        assert!(!overlay.is_visible());

        drop(overlay);
        let hidden_at = watcher.await.unwrap();
        assert_eq!(hidden_at.len(), 1);
        assert!(hidden_at[0] >= Duration::from_millis(2500));
        assert!(hidden_at[0] < Duration::from_millis(2501));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_pending_timer() {
        let start = Instant::now();
        let mut overlay = OutcomeOverlay::new(Duration::from_millis(2000));
        overlay.show(&outcome(BallRecord::runs(Symbol::D, Symbol::E, 6)));
        overlay.cancel();
        assert!(!overlay.is_visible());

        let mut rx = overlay.subscribe();
        sleep_until(start + Duration::from_millis(3000)).await;
        assert!(!rx.has_changed().unwrap());
    }
}
