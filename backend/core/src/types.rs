use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The physical quantity a product record asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    Width,
    Depth,
    Height,
    ItemWeight,
    MaximumWeightRecommendation,
    Voltage,
    Wattage,
    ItemVolume,
}

impl AttributeType {
    pub const ALL: [AttributeType; 8] = [
        AttributeType::Width,
        AttributeType::Depth,
        AttributeType::Height,
        AttributeType::ItemWeight,
        AttributeType::MaximumWeightRecommendation,
        AttributeType::Voltage,
        AttributeType::Wattage,
        AttributeType::ItemVolume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::Width => "width",
            AttributeType::Depth => "depth",
            AttributeType::Height => "height",
            AttributeType::ItemWeight => "item_weight",
            AttributeType::MaximumWeightRecommendation => "maximum_weight_recommendation",
            AttributeType::Voltage => "voltage",
            AttributeType::Wattage => "wattage",
            AttributeType::ItemVolume => "item_volume",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an entity name is not one of the known attribute types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown attribute type: {0}")]
pub struct UnknownAttribute(pub String);

impl FromStr for AttributeType {
    type Err = UnknownAttribute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AttributeType::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAttribute(s.to_string()))
    }
}

/// The `entity_name` column of an input row.
///
/// Names outside the fixed attribute set are kept verbatim so they can be
/// written back to the audit stream unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityName {
    Known(AttributeType),
    Unknown(String),
}

impl EntityName {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<AttributeType>() {
            Ok(attr) => EntityName::Known(attr),
            Err(_) => EntityName::Unknown(raw.to_string()),
        }
    }

    pub fn attribute(&self) -> Option<AttributeType> {
        match self {
            EntityName::Known(attr) => Some(*attr),
            EntityName::Unknown(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntityName::Known(attr) => attr.as_str(),
            EntityName::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the input dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    /// Opaque row identifier, preserved verbatim through to every output.
    pub index: String,
    pub image_link: String,
    pub group_id: String,
    pub entity_name: EntityName,
}

impl InputRecord {
    pub fn new(
        index: impl Into<String>,
        image_link: impl Into<String>,
        group_id: impl Into<String>,
        entity_name: &str,
    ) -> Self {
        Self {
            index: index.into(),
            image_link: image_link.into(),
            group_id: group_id.into(),
            entity_name: EntityName::parse(entity_name),
        }
    }
}

/// What to do with an input row that is missing required fields or cannot
/// be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedRowPolicy {
    /// Process the row with whatever it has; missing fields become empty and
    /// the row ends up with a fallback prediction.
    #[default]
    Fallback,
    /// Log and drop the row.
    Skip,
    /// Abort the run.
    Fail,
}

impl FromStr for MalformedRowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fallback" => Ok(Self::Fallback),
            "skip" => Ok(Self::Skip),
            "fail" => Ok(Self::Fail),
            other => Err(format!("unknown malformed-row policy '{other}' (expected fallback, skip or fail)")),
        }
    }
}

/// A number/unit pair found in recognized text, before it is checked
/// against the permitted units.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementCandidate {
    pub value: f64,
    /// Unit token exactly as it appeared in the text.
    pub unit: String,
}

/// An accepted measurement, ready to be written as `"<value> <unit>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMeasurement {
    pub formatted_value: String,
    pub canonical_unit: String,
}

impl fmt::Display for ResolvedMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.formatted_value, self.canonical_unit)
    }
}

/// Why a row fell back to a default prediction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// No text could be obtained for the image.
    NoText(String),
    /// Text was obtained but held no permitted number/unit pair.
    NoMeasurement,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::NoText(why) => write!(f, "no text: {why}"),
            UnresolvedReason::NoMeasurement => f.write_str("no permitted measurement in text"),
        }
    }
}

/// Result of processing a single input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingOutcome {
    Resolved(ResolvedMeasurement),
    Unresolved {
        fallback: String,
        reason: UnresolvedReason,
    },
}

impl ProcessingOutcome {
    /// The value written to the predictions stream.
    pub fn prediction(&self) -> String {
        match self {
            ProcessingOutcome::Resolved(m) => m.to_string(),
            ProcessingOutcome::Unresolved { fallback, .. } => fallback.clone(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ProcessingOutcome::Resolved(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_names_round_trip() {
        for attr in AttributeType::ALL {
            assert_eq!(attr.as_str().parse::<AttributeType>().unwrap(), attr);
        }
    }

    #[test]
    fn unknown_entity_is_kept_verbatim() {
        let name = EntityName::parse("Colour");
        assert_eq!(name, EntityName::Unknown("Colour".to_string()));
        assert_eq!(name.attribute(), None);
        assert_eq!(name.to_string(), "Colour");
    }

    #[test]
    fn entity_names_are_case_sensitive() {
        assert!(matches!(EntityName::parse("Width"), EntityName::Unknown(_)));
        assert_eq!(
            EntityName::parse("item_weight").attribute(),
            Some(AttributeType::ItemWeight)
        );
    }

    #[test]
    fn malformed_policy_parses() {
        assert_eq!("skip".parse::<MalformedRowPolicy>(), Ok(MalformedRowPolicy::Skip));
        assert_eq!("FAIL".parse::<MalformedRowPolicy>(), Ok(MalformedRowPolicy::Fail));
        assert!("drop".parse::<MalformedRowPolicy>().is_err());
        assert_eq!(MalformedRowPolicy::default(), MalformedRowPolicy::Fallback);
    }

    #[test]
    fn outcome_prediction_text() {
        let resolved = ProcessingOutcome::Resolved(ResolvedMeasurement {
            formatted_value: "15.5".to_string(),
            canonical_unit: "centimetre".to_string(),
        });
        assert_eq!(resolved.prediction(), "15.5 centimetre");
        assert!(resolved.is_resolved());

        let unresolved = ProcessingOutcome::Unresolved {
            fallback: "220 volt".to_string(),
            reason: UnresolvedReason::NoMeasurement,
        };
        assert_eq!(unresolved.prediction(), "220 volt");
        assert!(!unresolved.is_resolved());
    }
}
