//! Attribute catalog for facial analysis
//!
//! Defines the four predicted attributes, their display labels, and the
//! closed set of legal values for each. Manual overrides are validated
//! against these choice sets; the catalog is the single place they live.

use serde::{Deserialize, Serialize};

/// Keys of the four predicted facial attributes
///
/// Serialized forms match the classifier service's wire keys
/// (`sex`, `eyes`, `race`, `hair`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKey {
    /// Biological sex presentation
    Sex,
    /// Eye color
    Eyes,
    /// Ethnicity
    Race,
    /// Hair color
    Hair,
}

impl AttributeKey {
    /// All attribute keys in display order
    pub const ALL: [AttributeKey; 4] = [
        AttributeKey::Sex,
        AttributeKey::Eyes,
        AttributeKey::Race,
        AttributeKey::Hair,
    ];

    /// Wire/key string for this attribute (lowercase)
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKey::Sex => "sex",
            AttributeKey::Eyes => "eyes",
            AttributeKey::Race => "race",
            AttributeKey::Hair => "hair",
        }
    }

    /// Parse a wire key string
    ///
    /// Accepts the canonical lowercase keys only.
    pub fn from_str_opt(s: &str) -> Option<AttributeKey> {
        match s {
            "sex" => Some(AttributeKey::Sex),
            "eyes" => Some(AttributeKey::Eyes),
            "race" => Some(AttributeKey::Race),
            "hair" => Some(AttributeKey::Hair),
            _ => None,
        }
    }

    /// Human-readable display label for this attribute
    pub fn label(&self) -> &'static str {
        match self {
            AttributeKey::Sex => "Sexo",
            AttributeKey::Eyes => "Ojos",
            AttributeKey::Race => "Etnia",
            AttributeKey::Hair => "Cabello",
        }
    }

    /// Legal values for this attribute
    ///
    /// Manual overrides must come from this set. Predictions from the
    /// service are expected to fall in it as well, but are not rejected
    /// if the model vocabulary drifts.
    pub fn choices(&self) -> &'static [&'static str] {
        match self {
            AttributeKey::Sex => &["Hombre", "Mujer"],
            AttributeKey::Eyes => &["Café", "Azul", "Verde", "Gris", "Avellana"],
            AttributeKey::Race => &["Blanco", "Negro", "Hispano", "Asiático", "Árabe", "Indio"],
            AttributeKey::Hair => &["Negro", "Castaño", "Rubio", "Rojo", "Gris", "Blanco"],
        }
    }
}

impl std::fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Check whether `value` is a legal choice for `key`
///
/// Comparison is exact (case- and accent-sensitive): the choice sets are
/// canonical strings, not free text.
pub fn is_valid_choice(key: AttributeKey, value: &str) -> bool {
    key.choices().contains(&value)
}
