//! Prediction submission
//!
//! Drives the session through Predicting and into Reviewing or Failed.
//! The session lock is released for the duration of the network call; a
//! reset issued meanwhile replaces the session id, and the response for
//! the old id is dropped when it lands.

use std::sync::Arc;

use visage_common::{Error, Result};

use crate::api::AnalysisApi;
use crate::models::AnalysisPhase;
use crate::state::SharedSession;

/// Message shown when analysis is requested without a selection
pub const NO_IMAGE_MESSAGE: &str = "select an image first";

/// Prediction component
pub struct Analyzer {
    state: Arc<SharedSession>,
    api: Arc<AnalysisApi>,
}

impl Analyzer {
    pub fn new(state: Arc<SharedSession>, api: Arc<AnalysisApi>) -> Self {
        Self { state, api }
    }

    /// Submit the selected image for prediction
    ///
    /// Allowed from FileSelected, and from Failed while the image is
    /// retained (retry without re-uploading). One request at a time: a
    /// second submit while Predicting or Saving is rejected unchanged.
    /// On failure the session moves to Failed but keeps the image.
    pub async fn submit(&self) -> Result<()> {
        let (session_id, image) = {
            let mut session = self.state.session.write().await;

            if session.phase.is_busy() {
                return Err(Error::InvalidState(
                    "an operation is already in progress".to_string(),
                ));
            }
            if session.phase.is_editing() {
                return Err(Error::InvalidState(
                    "finish editing before analyzing".to_string(),
                ));
            }
            let Some(image) = session.image.clone() else {
                return Err(Error::Validation(NO_IMAGE_MESSAGE.to_string()));
            };
            if !matches!(
                session.phase,
                AnalysisPhase::FileSelected | AnalysisPhase::Failed
            ) {
                return Err(Error::InvalidState(format!(
                    "cannot analyze while {}",
                    session.phase
                )));
            }

            let transition = session.transition_to(AnalysisPhase::Predicting);
            let session_id = session.session_id;
            drop(session);
            self.state.emit_transition(&transition);
            (session_id, image)
        };

        tracing::info!(
            session_id = %session_id,
            file = %image.file_name,
            "Submitting image for analysis"
        );

        let outcome = self.api.predict(&image).await;

        let mut session = self.state.session.write().await;
        if session.session_id != session_id {
            tracing::debug!(
                stale_session_id = %session_id,
                "Discarding prediction for a reset session"
            );
            return Err(Error::InvalidState(
                "session was reset during analysis".to_string(),
            ));
        }

        match outcome {
            Ok(result) => {
                let flagged = result.flagged_keys();
                tracing::info!(
                    session_id = %session_id,
                    flagged = flagged.len(),
                    "Prediction received"
                );
                session.result = Some(result);
                let transition = session.transition_to(AnalysisPhase::Reviewing);
                drop(session);
                self.state.emit_transition(&transition);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Prediction failed");
                let transition = session.fail(e.user_message());
                drop(session);
                self.state.emit_transition(&transition);
                Err(e)
            }
        }
    }
}
