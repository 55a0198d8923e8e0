//! Analysis session state machine
//!
//! One session covers one image from selection through save:
//! Idle → FileSelected → Predicting → Reviewing → (EditingField ⇄ Reviewing)
//! → Saving → Saved, with Failed reachable from the fallible steps. The
//! phase enum replaces the ad-hoc boolean flags this workflow is usually
//! built from; exactly one phase holds at any time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use visage_common::api::PredictionResult;
use visage_common::AttributeKey;

/// Workflow phase of an analysis session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisPhase {
    /// No image selected yet
    Idle,
    /// Image selected and validated, not yet submitted
    FileSelected,
    /// Predict request in flight
    Predicting,
    /// Prediction available for review and override
    Reviewing,
    /// One attribute's value is being edited
    EditingField(AttributeKey),
    /// Save request in flight
    Saving,
    /// Analysis persisted by the service
    Saved,
    /// Last operation failed; message in the session
    Failed,
}

impl AnalysisPhase {
    /// Whether a network operation is in flight
    ///
    /// Busy phases reject new user actions instead of queueing them.
    pub fn is_busy(&self) -> bool {
        matches!(self, AnalysisPhase::Predicting | AnalysisPhase::Saving)
    }

    /// Whether an attribute edit is open
    pub fn is_editing(&self) -> bool {
        matches!(self, AnalysisPhase::EditingField(_))
    }
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisPhase::Idle => write!(f, "Idle"),
            AnalysisPhase::FileSelected => write!(f, "FileSelected"),
            AnalysisPhase::Predicting => write!(f, "Predicting"),
            AnalysisPhase::Reviewing => write!(f, "Reviewing"),
            AnalysisPhase::EditingField(key) => write!(f, "EditingField({})", key),
            AnalysisPhase::Saving => write!(f, "Saving"),
            AnalysisPhase::Saved => write!(f, "Saved"),
            AnalysisPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// Phase transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub session_id: Uuid,
    pub old_phase: AnalysisPhase,
    pub new_phase: AnalysisPhase,
    pub transitioned_at: DateTime<Utc>,
}

/// A selected image awaiting or undergoing analysis
#[derive(Debug, Clone)]
pub struct SelectedImage {
    /// Original file name, for display and logging
    pub file_name: String,
    /// Declared media type (`image/jpeg`, `image/png`, ...)
    pub media_type: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
    /// Data-URI preview, rendered asynchronously after selection
    pub preview: Option<String>,
}

impl SelectedImage {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
            preview: None,
        }
    }
}

/// Analysis session (in-memory state)
///
/// Single source of truth for one analysis attempt. All phase changes go
/// through [`transition_to`](Self::transition_to) so the side invariants
/// hold: `error_message` only in `Failed`, `edit_draft` only while editing.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    /// Unique session identifier, regenerated on reset
    pub session_id: Uuid,

    /// Current workflow phase
    pub phase: AnalysisPhase,

    /// Selected image, kept across prediction failures for retry
    pub image: Option<SelectedImage>,

    /// Prediction under review, if one arrived
    pub result: Option<PredictionResult>,

    /// Committed manual overrides
    pub overrides: BTreeMap<AttributeKey, String>,

    /// In-progress edit value, present only while editing
    pub edit_draft: Option<String>,

    /// Failure message, present only in the Failed phase
    pub error_message: Option<String>,

    /// Server-assigned id once the analysis is saved
    pub saved_analysis_id: Option<i64>,

    /// Session start time
    pub started_at: DateTime<Utc>,

    /// Monotonic id of the current image selection, for preview staleness
    selection_seq: u64,
}

impl AnalysisSession {
    /// Create a new idle session
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            phase: AnalysisPhase::Idle,
            image: None,
            result: None,
            overrides: BTreeMap::new(),
            edit_draft: None,
            error_message: None,
            saved_analysis_id: None,
            started_at: Utc::now(),
            selection_seq: 0,
        }
    }

    /// Transition to a new phase
    ///
    /// Records the transition and maintains the phase-bound fields:
    /// leaving Failed drops the error message, leaving an edit drops the
    /// draft. Legality of the transition is the caller's concern.
    pub fn transition_to(&mut self, new_phase: AnalysisPhase) -> PhaseTransition {
        let transition = PhaseTransition {
            session_id: self.session_id,
            old_phase: self.phase,
            new_phase,
            transitioned_at: Utc::now(),
        };
        self.phase = new_phase;

        if new_phase != AnalysisPhase::Failed {
            self.error_message = None;
        }
        if !new_phase.is_editing() {
            self.edit_draft = None;
        }

        transition
    }

    /// Transition to Failed with a message
    pub fn fail(&mut self, message: impl Into<String>) -> PhaseTransition {
        let transition = self.transition_to(AnalysisPhase::Failed);
        self.error_message = Some(message.into());
        transition
    }

    /// Reset to a pristine session
    ///
    /// Discards everything and assigns a fresh session id. The returned
    /// transition carries the old id: in-flight responses for it no longer
    /// match and are dropped on arrival.
    pub fn reset(&mut self) -> PhaseTransition {
        let transition = PhaseTransition {
            session_id: self.session_id,
            old_phase: self.phase,
            new_phase: AnalysisPhase::Idle,
            transitioned_at: Utc::now(),
        };
        *self = AnalysisSession::new();
        transition
    }

    /// Clear per-attempt state when a new image replaces the old one
    ///
    /// The selection itself is stored by the caller; this drops the stale
    /// prediction, overrides, draft, error, and saved id.
    pub fn clear_for_new_selection(&mut self) {
        self.result = None;
        self.overrides.clear();
        self.edit_draft = None;
        self.error_message = None;
        self.saved_analysis_id = None;
    }

    /// Bump and return the selection sequence for a new image selection
    pub fn next_selection_seq(&mut self) -> u64 {
        self.selection_seq += 1;
        self.selection_seq
    }

    /// Current selection sequence
    pub fn selection_seq(&self) -> u64 {
        self.selection_seq
    }

    /// The value currently standing for an attribute
    ///
    /// Committed override if present, otherwise the predicted value.
    /// `None` before a prediction arrives.
    pub fn effective_value(&self, key: AttributeKey) -> Option<&str> {
        if let Some(value) = self.overrides.get(&key) {
            return Some(value.as_str());
        }
        self.result.as_ref().map(|r| r.score(key).value.as_str())
    }

    /// Whether any manual override has been committed
    pub fn has_overrides(&self) -> bool {
        !self.overrides.is_empty()
    }
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}
