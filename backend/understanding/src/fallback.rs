//! Default predictions for rows where no measurement could be extracted.

use metricscan_core::{AttributeType, EntityName};

/// Written for entity names outside the known attribute set.
pub const SENTINEL_PREDICTION: &str = "N/A";

/// The fixed default for an attribute's class.
pub fn predict_default(attribute: AttributeType) -> &'static str {
    match attribute {
        AttributeType::Width | AttributeType::Depth | AttributeType::Height => "10 centimetre",
        AttributeType::ItemWeight | AttributeType::MaximumWeightRecommendation => "1 kilogram",
        AttributeType::Voltage => "220 volt",
        AttributeType::Wattage => "100 watt",
        AttributeType::ItemVolume => "1 litre",
    }
}

/// Default for a raw entity name; unknown names get [`SENTINEL_PREDICTION`].
pub fn predict_for_entity(entity: &EntityName) -> &'static str {
    entity
        .attribute()
        .map(predict_default)
        .unwrap_or(SENTINEL_PREDICTION)
}
