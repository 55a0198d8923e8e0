//! # Visage Common Library
//!
//! Shared code for the Visage analysis client including:
//! - Attribute catalog (keys, labels, legal choice sets)
//! - Confidence policy
//! - API request/response types for the classifier service
//! - Event types (SessionEvent enum) and EventBus

pub mod api;
pub mod catalog;
pub mod confidence;
pub mod error;
pub mod events;

pub use catalog::AttributeKey;
pub use error::{Error, Result};
