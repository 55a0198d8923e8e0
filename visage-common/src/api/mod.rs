//! API types for the classifier service
//!
//! Request/response shapes for the four HTTP endpoints. The response
//! envelope (`success` plus payload or `error`) is decoded from the body
//! regardless of HTTP status; the service reports failures inside it.

pub mod types;

pub use types::{
    AnalysesResponse, AttributeScore, HistoryEntry, PredictResponse, PredictionResult,
    SaveResponse, StatusResponse,
};
