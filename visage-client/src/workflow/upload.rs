//! Image selection and validation
//!
//! Accepts a new image whenever no operation is in flight, clears the
//! previous attempt's state, and renders the preview off the hot path.
//! A selection made while a preview is still encoding supersedes it; the
//! stale preview is discarded when it finishes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::sync::Arc;

use visage_common::events::SessionEvent;
use visage_common::{Error, Result};

use crate::config::Config;
use crate::models::{AnalysisPhase, SelectedImage};
use crate::state::SharedSession;

/// Message shown when a selection is not an image
pub const INVALID_IMAGE_MESSAGE: &str = "not a valid image";

/// Image selection component
pub struct UploadSession {
    state: Arc<SharedSession>,
    max_upload_bytes: usize,
}

impl UploadSession {
    pub fn new(state: Arc<SharedSession>, config: &Config) -> Self {
        Self {
            state,
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// Select an image for analysis
    ///
    /// Replaces any previous selection and clears the prior attempt's
    /// prediction, overrides, and saved id. Rejected without any state
    /// change while a prediction, save, or edit is in progress. A
    /// non-image selection moves the session to Failed; the previous
    /// selection stays in place for the failure message to refer to.
    pub async fn select_file(&self, image: SelectedImage) -> Result<()> {
        let mut session = self.state.session.write().await;

        if session.phase.is_busy() || session.phase.is_editing() {
            return Err(Error::InvalidState(format!(
                "cannot change the image while {}",
                session.phase
            )));
        }

        if !image.media_type.starts_with("image/") {
            tracing::warn!(
                session_id = %session.session_id,
                file = %image.file_name,
                media_type = %image.media_type,
                "Rejected non-image selection"
            );
            let transition = session.fail(INVALID_IMAGE_MESSAGE);
            drop(session);
            self.state.emit_transition(&transition);
            return Err(Error::Validation(INVALID_IMAGE_MESSAGE.to_string()));
        }

        if image.bytes.len() > self.max_upload_bytes {
            return Err(Error::Validation(format!(
                "image is {} bytes, over the {} byte limit",
                image.bytes.len(),
                self.max_upload_bytes
            )));
        }

        let seq = session.next_selection_seq();
        session.clear_for_new_selection();
        tracing::info!(
            session_id = %session.session_id,
            file = %image.file_name,
            size_bytes = image.bytes.len(),
            "Image selected"
        );
        session.image = Some(image);
        let transition = session.transition_to(AnalysisPhase::FileSelected);
        drop(session);

        self.state.emit_transition(&transition);
        self.spawn_preview_encode(seq);
        Ok(())
    }

    /// Select the first of several offered files
    ///
    /// Drag-and-drop and file pickers can hand over several files at once;
    /// only the first is taken.
    pub async fn select_first(&self, mut files: Vec<SelectedImage>) -> Result<()> {
        if files.is_empty() {
            return Err(Error::Validation("no file provided".to_string()));
        }
        let first = files.swap_remove(0);
        if !files.is_empty() {
            tracing::debug!("Ignoring {} extra files in selection", files.len());
        }
        self.select_file(first).await
    }

    /// Render the data-URI preview without blocking the selection
    ///
    /// The sequence number pins the preview to the selection it was
    /// started for; a newer selection makes this one a no-op.
    fn spawn_preview_encode(&self, seq: u64) {
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let source = {
                let session = state.session.read().await;
                if session.selection_seq() != seq {
                    return;
                }
                session
                    .image
                    .as_ref()
                    .map(|image| (image.media_type.clone(), image.bytes.clone()))
            };
            let Some((media_type, bytes)) = source else {
                return;
            };

            let preview = format!("data:{};base64,{}", media_type, STANDARD.encode(&bytes));

            let mut session = state.session.write().await;
            if session.selection_seq() != seq {
                tracing::debug!(
                    session_id = %session.session_id,
                    "Discarding preview for a superseded selection"
                );
                return;
            }
            let session_id = session.session_id;
            if let Some(image) = session.image.as_mut() {
                image.preview = Some(preview);
                state.emit_event(SessionEvent::PreviewReady {
                    session_id,
                    file_name: image.file_name.clone(),
                    timestamp: chrono::Utc::now(),
                });
            }
        });
    }
}
