//! # Visage Client
//!
//! Client-side session engine for facial attribute analysis. Drives one
//! image from selection through prediction, confidence-gated manual
//! correction, and persistence, and keeps a reconciled cache of saved
//! analyses. The visual layer is the embedding application's; this crate
//! owns the state machine, the HTTP calls, and nothing it draws.
//!
//! Typical wiring:
//!
//! ```no_run
//! use std::sync::Arc;
//! use visage_client::config::{Config, ConfigOverrides};
//! use visage_client::workflow::SessionOrchestrator;
//!
//! # fn main() -> visage_common::Result<()> {
//! let config = Config::from_overrides(ConfigOverrides::default())?;
//! visage_client::logging::init(&config.logging)?;
//! let engine = SessionOrchestrator::new(&config, Arc::new(|_: i64| true));
//! let _events = engine.subscribe();
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod logging;
pub mod models;
pub mod state;
pub mod workflow;

pub use crate::api::AnalysisApi;
pub use crate::config::{Config, ConfigOverrides};
pub use crate::models::{AnalysisPhase, AnalysisSession, HistoryList, SelectedImage};
pub use crate::state::{SharedSession, View};
pub use crate::workflow::{ConfirmDelete, SessionOrchestrator};
