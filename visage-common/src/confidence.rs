//! Confidence policy for predicted attributes
//!
//! One threshold, one predicate. Review flagging, manual-override gating,
//! and history summaries all call through here so the policy cannot drift
//! between surfaces.

/// Confidence scores at or above this value are trusted as-is (percent)
pub const LOW_CONFIDENCE_THRESHOLD: u8 = 70;

/// Whether a confidence score is low enough to flag for manual review
///
/// Strictly below the threshold: a score of exactly 70 is not flagged.
pub fn is_low_confidence(confidence: u8) -> bool {
    confidence < LOW_CONFIDENCE_THRESHOLD
}
