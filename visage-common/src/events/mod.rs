//! Event types for the Visage session engine
//!
//! Provides the shared event definitions and EventBus the workflow
//! components emit on. Events are notifications for an embedding view
//! layer; no core logic depends on anyone listening.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::catalog::AttributeKey;

/// Session event types
///
/// Events are broadcast via [`EventBus`] and serialize with a `type` tag so
/// a view layer can forward them (SSE, IPC) without re-encoding.
///
/// Phases travel as strings: the phase enum lives with the session model in
/// the client crate and events only report it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// The session moved between workflow phases
    PhaseChanged {
        /// Session UUID
        session_id: Uuid,
        /// Phase before the transition
        old_phase: String,
        /// Phase after the transition
        new_phase: String,
        /// When the transition happened
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The preview encoding for the selected image finished
    PreviewReady {
        /// Session UUID
        session_id: Uuid,
        /// File name of the selection the preview belongs to
        file_name: String,
        /// When the preview became available
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A manual override was committed for one attribute
    OverrideCommitted {
        /// Session UUID
        session_id: Uuid,
        /// Attribute the override applies to
        attribute: AttributeKey,
        /// Committed value
        value: String,
        /// When the override was committed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The analysis was persisted by the service
    AnalysisSaved {
        /// Session UUID
        session_id: Uuid,
        /// Server-assigned analysis id
        analysis_id: i64,
        /// When the save completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The history list was reloaded from the service
    HistoryRefreshed {
        /// Number of entries in the refreshed list
        entry_count: usize,
        /// When the refresh completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A saved analysis was deleted after server confirmation
    HistoryEntryDeleted {
        /// Server-assigned analysis id that was removed
        analysis_id: i64,
        /// When the deletion completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl SessionEvent {
    /// Event name for logging and routing
    pub fn event_name(&self) -> &'static str {
        match self {
            SessionEvent::PhaseChanged { .. } => "PhaseChanged",
            SessionEvent::PreviewReady { .. } => "PreviewReady",
            SessionEvent::OverrideCommitted { .. } => "OverrideCommitted",
            SessionEvent::AnalysisSaved { .. } => "AnalysisSaved",
            SessionEvent::HistoryRefreshed { .. } => "HistoryRefreshed",
            SessionEvent::HistoryEntryDeleted { .. } => "HistoryEntryDeleted",
        }
    }
}

/// Broadcast bus for session events
///
/// Wraps a tokio broadcast channel. Subscribers receive events emitted
/// after they subscribe; slow subscribers lose the oldest buffered events.
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use visage_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        debug!("Event bus initialized with capacity {}", capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` otherwise.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: SessionEvent,
    ) -> Result<usize, broadcast::error::SendError<SessionEvent>> {
        let name = event.event_name();
        let result = self.tx.send(event);
        if let Ok(count) = result {
            debug!("Broadcast {} to {} subscribers", name, count);
        }
        result
    }

    /// Emit an event, ignoring whether anyone is listening
    ///
    /// The workflow components use this: the engine runs the same with or
    /// without an attached view.
    pub fn emit_lossy(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    /// Default capacity suits an interactive session (a few events per
    /// user action)
    fn default() -> Self {
        Self::new(256)
    }
}
