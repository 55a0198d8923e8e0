//! HTTP client for the classifier service

pub mod client;

pub use client::{AnalysisApi, CONNECTION_ERROR_MESSAGE};
