//! Classifier service API client
//!
//! Four endpoints: POST /predict, POST /save, GET /analyses,
//! DELETE /analyses/{id}. The service answers every request with a JSON
//! envelope and reports failures inside it, so bodies are decoded without
//! checking the HTTP status first. Transport problems and unparseable
//! bodies collapse to one generic connection error; raw reqwest detail
//! goes to the log only.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::collections::BTreeMap;

use visage_common::api::{
    AnalysesResponse, HistoryEntry, PredictResponse, PredictionResult, SaveResponse,
    StatusResponse,
};
use visage_common::{AttributeKey, Error, Result};

use crate::config::Config;
use crate::models::SelectedImage;

/// Message surfaced for transport failures and unparseable responses
pub const CONNECTION_ERROR_MESSAGE: &str = "could not reach the analysis service";

/// Classifier service client
pub struct AnalysisApi {
    /// HTTP client with configured timeouts
    client: Client,
    /// Base URL of the service, no trailing slash
    base_url: String,
}

impl AnalysisApi {
    /// Create a new client from resolved configuration
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be built (should not happen with
    /// valid config)
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(concat!("visage-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.service_url.clone(),
        }
    }

    /// Submit an image for attribute prediction
    ///
    /// # Errors
    /// Returns `Error::Server` with the service's message when it reports
    /// failure, `Error::Connection` for transport problems or bodies that
    /// are not the documented envelope.
    pub async fn predict(&self, image: &SelectedImage) -> Result<PredictionResult> {
        let form = Form::new().part("image", image_part(image)?);

        tracing::debug!(
            "Submitting image for prediction: file={}, size={} bytes",
            image.file_name,
            image.bytes.len()
        );

        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(connection_error)?;

        let envelope: PredictResponse = response.json().await.map_err(connection_error)?;
        envelope.into_result()
    }

    /// Persist an analysis, with manual overrides when any were committed
    ///
    /// The `manual_values` field is only present when `overrides` is
    /// non-empty, matching what the service expects.
    pub async fn save(
        &self,
        image: &SelectedImage,
        overrides: &BTreeMap<AttributeKey, String>,
    ) -> Result<i64> {
        let mut form = Form::new().part("image", image_part(image)?);
        if !overrides.is_empty() {
            let manual_values = serde_json::to_string(overrides)
                .map_err(|e| Error::Internal(format!("Failed to encode overrides: {}", e)))?;
            form = form.text("manual_values", manual_values);
        }

        tracing::debug!(
            "Saving analysis: file={}, overrides={}",
            image.file_name,
            overrides.len()
        );

        let response = self
            .client
            .post(format!("{}/save", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(connection_error)?;

        let envelope: SaveResponse = response.json().await.map_err(connection_error)?;
        envelope.into_result()
    }

    /// Fetch all saved analyses
    pub async fn list_analyses(&self) -> Result<Vec<HistoryEntry>> {
        let response = self
            .client
            .get(format!("{}/analyses", self.base_url))
            .send()
            .await
            .map_err(connection_error)?;

        let envelope: AnalysesResponse = response.json().await.map_err(connection_error)?;
        let entries = envelope.into_result()?;
        tracing::debug!("Fetched {} saved analyses", entries.len());
        Ok(entries)
    }

    /// Delete one saved analysis
    pub async fn delete_analysis(&self, analysis_id: i64) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/analyses/{}", self.base_url, analysis_id))
            .send()
            .await
            .map_err(connection_error)?;

        let envelope: StatusResponse = response.json().await.map_err(connection_error)?;
        envelope.into_result()
    }
}

/// Build the multipart image part with file name and media type
fn image_part(image: &SelectedImage) -> Result<Part> {
    Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.media_type)
        .map_err(|e| Error::Validation(format!("invalid media type '{}': {}", image.media_type, e)))
}

fn connection_error(e: reqwest::Error) -> Error {
    tracing::warn!("Analysis service request failed: {}", e);
    Error::Connection(CONNECTION_ERROR_MESSAGE.to_string())
}
