//! Shared session state
//!
//! Thread-safe state shared by the workflow components. Session, history,
//! and view sit behind separate RwLocks: a history fetch may overlap a
//! running prediction without contention. Locks are never held across an
//! await point.

use tokio::sync::{broadcast, RwLock};

use visage_common::events::{EventBus, SessionEvent};

use crate::models::{AnalysisPhase, AnalysisSession, HistoryList, PhaseTransition};

/// Top-level view the embedding UI is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Upload/review/save workflow
    #[default]
    Analyzer,
    /// Saved analyses list
    History,
}

/// Shared state accessible by all components
///
/// Uses RwLock for concurrent read access with rare writes
pub struct SharedSession {
    /// The analysis session state machine
    pub session: RwLock<AnalysisSession>,

    /// Cached history of saved analyses
    pub history: RwLock<HistoryList>,

    /// Currently shown view
    pub view: RwLock<View>,

    /// Event broadcaster for the embedding view layer
    pub event_bus: EventBus,
}

impl SharedSession {
    /// Create new shared state with an idle session
    pub fn new() -> Self {
        Self {
            session: RwLock::new(AnalysisSession::new()),
            history: RwLock::new(HistoryList::new()),
            view: RwLock::new(View::default()),
            event_bus: EventBus::default(),
        }
    }

    /// Broadcast an event to all listeners
    pub fn emit_event(&self, event: SessionEvent) {
        // No receivers is OK; the engine runs headless in tests
        self.event_bus.emit_lossy(event);
    }

    /// Subscribe to the event stream
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_bus.subscribe()
    }

    /// Broadcast a phase transition and log it
    pub fn emit_transition(&self, transition: &PhaseTransition) {
        tracing::debug!(
            session_id = %transition.session_id,
            old_phase = %transition.old_phase,
            new_phase = %transition.new_phase,
            "Session phase changed"
        );
        self.emit_event(SessionEvent::PhaseChanged {
            session_id: transition.session_id,
            old_phase: transition.old_phase.to_string(),
            new_phase: transition.new_phase.to_string(),
            timestamp: transition.transitioned_at,
        });
    }

    /// Current session phase
    pub async fn phase(&self) -> AnalysisPhase {
        self.session.read().await.phase
    }

    /// Snapshot of the session state
    pub async fn snapshot_session(&self) -> AnalysisSession {
        self.session.read().await.clone()
    }

    /// Snapshot of the history cache
    pub async fn snapshot_history(&self) -> HistoryList {
        self.history.read().await.clone()
    }

    /// Currently shown view
    pub async fn current_view(&self) -> View {
        *self.view.read().await
    }
}

impl Default for SharedSession {
    fn default() -> Self {
        Self::new()
    }
}
