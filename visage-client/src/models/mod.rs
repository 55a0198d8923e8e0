//! Data models for the Visage session engine
//!
//! - Analysis session state machine (phase enum, transitions)
//! - History cache of saved analyses

pub mod history;
pub mod session;

pub use history::HistoryList;
pub use session::{AnalysisPhase, AnalysisSession, PhaseTransition, SelectedImage};
