//! Saving analyses and reconciling the history list
//!
//! Save is gated on a settled review: never while a prediction or save is
//! in flight, never while an edit is open. A failed save returns the
//! session to Reviewing with the result and overrides intact, so retry is
//! one click away. The history cache follows the server: wholesale
//! replacement on load, local removal only after a confirmed delete.

use std::sync::Arc;

use visage_common::events::SessionEvent;
use visage_common::{Error, Result};

use crate::api::AnalysisApi;
use crate::models::AnalysisPhase;
use crate::state::SharedSession;

/// Confirmation gate for destructive operations
///
/// Stands in for the UI's confirm dialog. Deletion asks here first and
/// sends no request when declined.
pub trait ConfirmDelete: Send + Sync {
    fn confirm_delete(&self, analysis_id: i64) -> bool;
}

impl<F> ConfirmDelete for F
where
    F: Fn(i64) -> bool + Send + Sync,
{
    fn confirm_delete(&self, analysis_id: i64) -> bool {
        self(analysis_id)
    }
}

/// Persistence component
pub struct PersistenceController {
    state: Arc<SharedSession>,
    api: Arc<AnalysisApi>,
    confirm: Arc<dyn ConfirmDelete>,
}

impl PersistenceController {
    pub fn new(
        state: Arc<SharedSession>,
        api: Arc<AnalysisApi>,
        confirm: Arc<dyn ConfirmDelete>,
    ) -> Self {
        Self {
            state,
            api,
            confirm,
        }
    }

    /// Persist the reviewed analysis, overrides included
    ///
    /// Requires the Reviewing phase. Calling again after a successful
    /// save returns the same analysis id without a second request. On
    /// failure the session returns to Reviewing and the error goes to
    /// the caller; nothing reviewed is lost.
    pub async fn save(&self) -> Result<i64> {
        let (session_id, image, overrides) = {
            let mut session = self.state.session.write().await;

            if session.phase.is_editing() {
                return Err(Error::InvalidState(
                    "finish editing before saving".to_string(),
                ));
            }
            if session.phase.is_busy() {
                return Err(Error::InvalidState(
                    "an operation is already in progress".to_string(),
                ));
            }
            if session.phase == AnalysisPhase::Saved {
                if let Some(analysis_id) = session.saved_analysis_id {
                    return Ok(analysis_id);
                }
                return Err(Error::Internal("saved session lost its id".to_string()));
            }
            if session.phase != AnalysisPhase::Reviewing {
                return Err(Error::InvalidState(format!(
                    "nothing to save while {}",
                    session.phase
                )));
            }
            let Some(image) = session.image.clone() else {
                return Err(Error::InvalidState("no image to save".to_string()));
            };

            let transition = session.transition_to(AnalysisPhase::Saving);
            let session_id = session.session_id;
            let overrides = session.overrides.clone();
            drop(session);
            self.state.emit_transition(&transition);
            (session_id, image, overrides)
        };

        tracing::info!(
            session_id = %session_id,
            overrides = overrides.len(),
            "Saving analysis"
        );

        let outcome = self.api.save(&image, &overrides).await;

        let mut session = self.state.session.write().await;
        if session.session_id != session_id {
            tracing::debug!(
                stale_session_id = %session_id,
                "Discarding save response for a reset session"
            );
            return Err(Error::InvalidState(
                "session was reset during save".to_string(),
            ));
        }

        match outcome {
            Ok(analysis_id) => {
                session.saved_analysis_id = Some(analysis_id);
                let transition = session.transition_to(AnalysisPhase::Saved);
                drop(session);
                tracing::info!(
                    session_id = %session_id,
                    analysis_id,
                    "Analysis saved"
                );
                self.state.emit_transition(&transition);
                self.state.emit_event(SessionEvent::AnalysisSaved {
                    session_id,
                    analysis_id,
                    timestamp: chrono::Utc::now(),
                });
                Ok(analysis_id)
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Save failed");
                let transition = session.transition_to(AnalysisPhase::Reviewing);
                drop(session);
                self.state.emit_transition(&transition);
                Err(e)
            }
        }
    }

    /// Discard the session and start over
    ///
    /// Valid from any phase. The fresh session id makes any in-flight
    /// response for the old session undeliverable.
    pub async fn reset(&self) {
        let transition = self.state.session.write().await.reset();
        tracing::info!(
            old_session_id = %transition.session_id,
            "Session reset"
        );
        self.state.emit_transition(&transition);
    }

    /// Reload the history list from the service
    ///
    /// Replaces the cache wholesale on success. On failure the previous
    /// entries stay visible and the error lands in the list's banner.
    pub async fn load_history(&self) -> Result<()> {
        self.state.history.write().await.begin_load();

        match self.api.list_analyses().await {
            Ok(entries) => {
                let entry_count = entries.len();
                self.state.history.write().await.apply_loaded(entries);
                tracing::info!(entry_count, "History refreshed");
                self.state.emit_event(SessionEvent::HistoryRefreshed {
                    entry_count,
                    timestamp: chrono::Utc::now(),
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "History load failed");
                self.state
                    .history
                    .write()
                    .await
                    .apply_load_failure(e.user_message());
                Err(e)
            }
        }
    }

    /// Delete one saved analysis after confirmation
    ///
    /// Returns `Ok(false)` without any request when the confirmation gate
    /// declines. The cached entry is removed only once the server has
    /// confirmed the deletion; a failed delete leaves the list unchanged
    /// with the error in the banner.
    pub async fn delete_entry(&self, analysis_id: i64) -> Result<bool> {
        if !self.confirm.confirm_delete(analysis_id) {
            tracing::debug!(analysis_id, "Deletion declined");
            return Ok(false);
        }

        match self.api.delete_analysis(analysis_id).await {
            Ok(()) => {
                self.state.history.write().await.remove_entry(analysis_id);
                tracing::info!(analysis_id, "Analysis deleted");
                self.state.emit_event(SessionEvent::HistoryEntryDeleted {
                    analysis_id,
                    timestamp: chrono::Utc::now(),
                });
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(analysis_id, error = %e, "Delete failed");
                self.state.history.write().await.error = Some(e.user_message().to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{AnalysisSession, SelectedImage};
    use visage_common::api::{AttributeScore, PredictionResult};
    use visage_common::AttributeKey;

    fn controller(confirm: Arc<dyn ConfirmDelete>) -> (Arc<SharedSession>, PersistenceController) {
        let state = Arc::new(SharedSession::new());
        let api = Arc::new(AnalysisApi::new(&Config::default()));
        let persistence = PersistenceController::new(Arc::clone(&state), api, confirm);
        (state, persistence)
    }

    async fn enter_review(state: &SharedSession) {
        let mut session = state.session.write().await;
        session.image = Some(SelectedImage::new("face.jpg", "image/jpeg", vec![1]));
        session.result = Some(PredictionResult {
            sex: AttributeScore::new("Mujer", 92),
            eyes: AttributeScore::new("Café", 88),
            race: AttributeScore::new("Hispano", 81),
            hair: AttributeScore::new("Negro", 45),
        });
        session.transition_to(AnalysisPhase::Reviewing);
    }

    // Save round trips against a live server are in tests/; these cover
    // the local gates, which send nothing.

    #[tokio::test]
    async fn test_save_while_editing_is_rejected_locally() {
        let (state, persistence) = controller(Arc::new(|_: i64| true));
        enter_review(&state).await;
        state
            .session
            .write()
            .await
            .transition_to(AnalysisPhase::EditingField(AttributeKey::Hair));

        let result = persistence.save().await;
        assert!(matches!(result, Err(Error::InvalidState(_))));
        assert_eq!(
            state.phase().await,
            AnalysisPhase::EditingField(AttributeKey::Hair)
        );
    }

    #[tokio::test]
    async fn test_save_before_review_is_rejected() {
        let (state, persistence) = controller(Arc::new(|_: i64| true));
        assert!(matches!(
            persistence.save().await,
            Err(Error::InvalidState(_))
        ));
        assert_eq!(state.phase().await, AnalysisPhase::Idle);
    }

    #[tokio::test]
    async fn test_save_is_rejected_in_every_non_reviewing_phase() {
        for phase in [
            AnalysisPhase::Idle,
            AnalysisPhase::FileSelected,
            AnalysisPhase::Predicting,
            AnalysisPhase::Saving,
            AnalysisPhase::Failed,
        ] {
            let (state, persistence) = controller(Arc::new(|_: i64| true));
            enter_review(&state).await;
            state.session.write().await.transition_to(phase);

            let result = persistence.save().await;
            assert!(matches!(result, Err(Error::InvalidState(_))), "{}", phase);
            assert_eq!(state.phase().await, phase);
        }
    }

    #[tokio::test]
    async fn test_second_save_returns_same_id_without_request() {
        let (state, persistence) = controller(Arc::new(|_: i64| true));
        {
            let mut session = state.session.write().await;
            *session = AnalysisSession::new();
            session.saved_analysis_id = Some(17);
            session.transition_to(AnalysisPhase::Saved);
        }
        // The dummy endpoint would fail any real request; Ok proves none was sent
        assert_eq!(persistence.save().await.unwrap(), 17);
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle_with_fresh_identity() {
        let (state, persistence) = controller(Arc::new(|_: i64| true));
        enter_review(&state).await;
        let old_id = state.snapshot_session().await.session_id;

        persistence.reset().await;

        let session = state.snapshot_session().await;
        assert_eq!(session.phase, AnalysisPhase::Idle);
        assert_ne!(session.session_id, old_id);
        assert!(session.image.is_none());
        assert!(session.result.is_none());
    }

    #[tokio::test]
    async fn test_declined_delete_sends_nothing_and_keeps_list() {
        let (state, persistence) = controller(Arc::new(|_: i64| false));
        // The dummy endpoint would fail any real request; Ok(false) proves none was sent
        let deleted = persistence.delete_entry(5).await.unwrap();
        assert!(!deleted);
        assert!(state.snapshot_history().await.error.is_none());
    }
}
