//! Manual override workflow
//!
//! Review-time corrections: open an edit on one attribute, adjust the
//! draft, then commit it against the attribute's catalog choices or cancel.
//! Only the committed map ever reaches the service; the draft is local to
//! the edit and dies with it.

use std::sync::Arc;

use visage_common::catalog::is_valid_choice;
use visage_common::events::SessionEvent;
use visage_common::{AttributeKey, Error, Result};

use crate::models::AnalysisPhase;
use crate::state::SharedSession;

/// Manual correction component
pub struct CorrectionWorkflow {
    state: Arc<SharedSession>,
}

impl CorrectionWorkflow {
    pub fn new(state: Arc<SharedSession>) -> Self {
        Self { state }
    }

    /// Open an edit on one attribute
    ///
    /// Only available while reviewing. The draft starts from the value
    /// currently standing (committed override if present, else the
    /// prediction), so re-opening an edited attribute is non-destructive.
    pub async fn begin_edit(&self, key: AttributeKey) -> Result<()> {
        let mut session = self.state.session.write().await;

        if session.phase != AnalysisPhase::Reviewing {
            return Err(Error::InvalidState(format!(
                "editing is only available while reviewing, not {}",
                session.phase
            )));
        }
        let Some(seed) = session.effective_value(key).map(str::to_string) else {
            return Err(Error::InvalidState("no prediction to edit".to_string()));
        };

        let transition = session.transition_to(AnalysisPhase::EditingField(key));
        session.edit_draft = Some(seed);
        drop(session);
        self.state.emit_transition(&transition);
        Ok(())
    }

    /// Replace the draft value of the open edit
    pub async fn set_draft(&self, key: AttributeKey, value: impl Into<String>) -> Result<()> {
        let mut session = self.state.session.write().await;

        if session.phase != AnalysisPhase::EditingField(key) {
            return Err(Error::InvalidState(format!(
                "no open edit for {}",
                key
            )));
        }
        session.edit_draft = Some(value.into());
        Ok(())
    }

    /// Commit the open edit as a manual override
    ///
    /// The draft must be non-empty and one of the attribute's catalog
    /// choices; otherwise the edit stays open and nothing is written.
    pub async fn commit_edit(&self, key: AttributeKey) -> Result<()> {
        let mut session = self.state.session.write().await;

        if session.phase != AnalysisPhase::EditingField(key) {
            return Err(Error::InvalidState(format!(
                "no open edit for {}",
                key
            )));
        }
        let draft = session.edit_draft.clone().unwrap_or_default();
        if draft.is_empty() {
            return Err(Error::Validation(
                "select a value before confirming".to_string(),
            ));
        }
        if !is_valid_choice(key, &draft) {
            return Err(Error::Validation(format!(
                "'{}' is not a legal value for {}",
                draft, key
            )));
        }

        session.overrides.insert(key, draft.clone());
        let transition = session.transition_to(AnalysisPhase::Reviewing);
        let session_id = session.session_id;
        drop(session);

        tracing::info!(
            session_id = %session_id,
            attribute = %key,
            value = %draft,
            "Manual override committed"
        );
        self.state.emit_transition(&transition);
        self.state.emit_event(SessionEvent::OverrideCommitted {
            session_id,
            attribute: key,
            value: draft,
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    /// Close the open edit without committing
    pub async fn cancel_edit(&self) -> Result<()> {
        let mut session = self.state.session.write().await;

        if !session.phase.is_editing() {
            return Err(Error::InvalidState("no open edit".to_string()));
        }
        let transition = session.transition_to(AnalysisPhase::Reviewing);
        drop(session);
        self.state.emit_transition(&transition);
        Ok(())
    }

    /// Attributes of the current prediction flagged for review
    pub async fn flagged_keys(&self) -> Vec<AttributeKey> {
        let session = self.state.session.read().await;
        session
            .result
            .as_ref()
            .map(|result| result.flagged_keys())
            .unwrap_or_default()
    }

    /// The value currently standing for an attribute
    pub async fn effective_value(&self, key: AttributeKey) -> Option<String> {
        let session = self.state.session.read().await;
        session.effective_value(key).map(str::to_string)
    }
}
