//! Session orchestration
//!
//! Builds the shared state, the API client, and the four workflow
//! components, and owns the analyzer/history view switch. Switching to
//! the history view kicks off one background reload; re-asserting the
//! already-current view does not, and switching away never cancels a
//! fetch already in flight.

use std::sync::Arc;

use tokio::sync::broadcast;
use visage_common::events::SessionEvent;

use crate::api::AnalysisApi;
use crate::config::Config;
use crate::models::{AnalysisSession, HistoryList};
use crate::state::{SharedSession, View};
use crate::workflow::{
    Analyzer, ConfirmDelete, CorrectionWorkflow, PersistenceController, UploadSession,
};

/// Composition root of the session engine
pub struct SessionOrchestrator {
    state: Arc<SharedSession>,
    upload: UploadSession,
    analyzer: Analyzer,
    correction: CorrectionWorkflow,
    persistence: Arc<PersistenceController>,
}

impl SessionOrchestrator {
    /// Build the engine from resolved configuration
    ///
    /// `confirm` is the deletion confirmation gate, typically backed by
    /// the embedding UI's dialog.
    pub fn new(config: &Config, confirm: Arc<dyn ConfirmDelete>) -> Self {
        let state = Arc::new(SharedSession::new());
        let api = Arc::new(AnalysisApi::new(config));

        let upload = UploadSession::new(Arc::clone(&state), config);
        let analyzer = Analyzer::new(Arc::clone(&state), Arc::clone(&api));
        let correction = CorrectionWorkflow::new(Arc::clone(&state));
        let persistence = Arc::new(PersistenceController::new(
            Arc::clone(&state),
            api,
            confirm,
        ));

        Self {
            state,
            upload,
            analyzer,
            correction,
            persistence,
        }
    }

    /// Image selection component
    pub fn upload(&self) -> &UploadSession {
        &self.upload
    }

    /// Prediction component
    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Manual correction component
    pub fn correction(&self) -> &CorrectionWorkflow {
        &self.correction
    }

    /// Persistence component
    pub fn persistence(&self) -> &PersistenceController {
        &self.persistence
    }

    /// Shared state handle
    pub fn state(&self) -> &Arc<SharedSession> {
        &self.state
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.state.subscribe_events()
    }

    /// Snapshot of the session state
    pub async fn session(&self) -> AnalysisSession {
        self.state.snapshot_session().await
    }

    /// Snapshot of the history cache
    pub async fn history(&self) -> HistoryList {
        self.state.snapshot_history().await
    }

    /// Currently shown view
    pub async fn current_view(&self) -> View {
        self.state.current_view().await
    }

    /// Switch the top-level view
    ///
    /// Entering the history view spawns one background reload. Asserting
    /// the view that is already current changes nothing.
    pub async fn switch_view(&self, view: View) {
        {
            let mut current = self.state.view.write().await;
            if *current == view {
                return;
            }
            *current = view;
        }
        tracing::info!(view = ?view, "View switched");

        if view == View::History {
            let persistence = Arc::clone(&self.persistence);
            tokio::spawn(async move {
                if let Err(e) = persistence.load_history().await {
                    tracing::error!("Background history load failed: {}", e);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalysisPhase;

    fn orchestrator() -> SessionOrchestrator {
        SessionOrchestrator::new(&Config::default(), Arc::new(|_: i64| true))
    }

    #[tokio::test]
    async fn test_starts_idle_on_analyzer_view() {
        let orch = orchestrator();
        assert_eq!(orch.current_view().await, View::Analyzer);
        assert_eq!(orch.session().await.phase, AnalysisPhase::Idle);
        assert!(orch.history().await.entries.is_empty());
    }

    #[tokio::test]
    async fn test_switch_view_changes_current_view() {
        let orch = orchestrator();
        orch.switch_view(View::History).await;
        assert_eq!(orch.current_view().await, View::History);
        orch.switch_view(View::Analyzer).await;
        assert_eq!(orch.current_view().await, View::Analyzer);
    }

    #[tokio::test]
    async fn test_reasserting_current_view_is_a_no_op() {
        let orch = orchestrator();
        orch.switch_view(View::Analyzer).await;
        assert_eq!(orch.current_view().await, View::Analyzer);
    }

    // That entering the history view triggers exactly one reload is
    // covered by the integration tests, where a server counts requests.
}
