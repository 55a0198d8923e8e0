//! Wire types shared between the client and the classifier service

use serde::{Deserialize, Serialize};

use crate::catalog::AttributeKey;
use crate::confidence::is_low_confidence;
use crate::error::{Error, Result};

/// One predicted value with its confidence score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeScore {
    /// Predicted value (one of the attribute's catalog choices)
    pub value: String,
    /// Model confidence, percent (0-100)
    pub confidence: u8,
}

impl AttributeScore {
    pub fn new(value: impl Into<String>, confidence: u8) -> Self {
        Self {
            value: value.into(),
            confidence,
        }
    }

    /// Whether this score falls below the review threshold
    pub fn is_low_confidence(&self) -> bool {
        is_low_confidence(self.confidence)
    }
}

/// Complete prediction for one image
///
/// One score per attribute, never partial. Serializes to the wire mapping
/// `{"sex": {...}, "eyes": {...}, "race": {...}, "hair": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub sex: AttributeScore,
    pub eyes: AttributeScore,
    pub race: AttributeScore,
    pub hair: AttributeScore,
}

impl PredictionResult {
    /// Score for one attribute
    pub fn score(&self, key: AttributeKey) -> &AttributeScore {
        match key {
            AttributeKey::Sex => &self.sex,
            AttributeKey::Eyes => &self.eyes,
            AttributeKey::Race => &self.race,
            AttributeKey::Hair => &self.hair,
        }
    }

    /// Iterate scores in display order
    pub fn iter(&self) -> impl Iterator<Item = (AttributeKey, &AttributeScore)> {
        AttributeKey::ALL.iter().map(move |key| (*key, self.score(*key)))
    }

    /// Keys whose confidence falls below the review threshold
    pub fn flagged_keys(&self) -> Vec<AttributeKey> {
        AttributeKey::ALL
            .iter()
            .copied()
            .filter(|key| self.score(*key).is_low_confidence())
            .collect()
    }

    /// Whether any attribute falls below the review threshold
    pub fn has_low_confidence(&self) -> bool {
        self.iter().any(|(_, score)| score.is_low_confidence())
    }

    /// Mean confidence across the four attributes, percent
    pub fn average_confidence(&self) -> f64 {
        let total: u32 = self.iter().map(|(_, score)| score.confidence as u32).sum();
        total as f64 / AttributeKey::ALL.len() as f64
    }
}

/// One saved analysis as returned by GET /analyses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Server-assigned analysis id
    pub id: i64,
    /// Where the stored image can be fetched from
    pub image_url: String,
    /// When the analysis was saved
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Final attribute values (manual overrides already applied server-side)
    pub attributes: PredictionResult,
    /// Mean confidence across the four attributes, percent
    pub average_confidence: f64,
    /// Whether any attribute was below the review threshold
    pub has_low_confidence: bool,
}

/// Response envelope for POST /predict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PredictionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictResponse {
    /// Unwrap the envelope into the prediction or the service's error
    pub fn into_result(self) -> Result<PredictionResult> {
        envelope(self.success, self.data, self.error)
    }
}

/// Response envelope for POST /save
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveResponse {
    /// Unwrap the envelope into the new analysis id or the service's error
    pub fn into_result(self) -> Result<i64> {
        envelope(self.success, self.analysis_id, self.error)
    }
}

/// Response envelope for GET /analyses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysesResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<HistoryEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysesResponse {
    /// Unwrap the envelope into the saved analyses or the service's error
    pub fn into_result(self) -> Result<Vec<HistoryEntry>> {
        envelope(self.success, self.data, self.error)
    }
}

/// Response envelope for DELETE /analyses/{id} (no payload)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusResponse {
    /// Unwrap the envelope, keeping only success or the service's error
    pub fn into_result(self) -> Result<()> {
        envelope(self.success, Some(()), self.error)
    }
}

fn envelope<T>(success: bool, payload: Option<T>, error: Option<String>) -> Result<T> {
    if !success {
        return Err(Error::Server(
            error.unwrap_or_else(|| "analysis service reported an error".to_string()),
        ));
    }
    payload.ok_or_else(|| {
        Error::Connection("malformed response from the analysis service".to_string())
    })
}
