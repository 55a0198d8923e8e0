//! Workflow components for the analysis session
//!
//! Each component owns one slice of the workflow and shares the session
//! through [`SharedSession`](crate::state::SharedSession):
//! - [`UploadSession`]: image selection and validation
//! - [`Analyzer`]: prediction submission
//! - [`CorrectionWorkflow`]: manual overrides
//! - [`PersistenceController`]: save, reset, history reconciliation
//! - [`SessionOrchestrator`]: composition and view switching

pub mod analyzer;
pub mod correction;
pub mod orchestrator;
pub mod persistence;
pub mod upload;

pub use analyzer::Analyzer;
pub use correction::CorrectionWorkflow;
pub use orchestrator::SessionOrchestrator;
pub use persistence::{ConfirmDelete, PersistenceController};
pub use upload::UploadSession;
