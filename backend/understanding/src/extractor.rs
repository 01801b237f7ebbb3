//! Measurement extractor: finds the first number/unit pair in recognized text
//! whose unit is permitted for the requested attribute.

use std::sync::Arc;

use metricscan_core::{AttributeType, MeasurementCandidate, ResolvedMeasurement};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::vocabulary::UnitVocabulary;

/// A decimal number, optional whitespace, then a run of letters.
static MEASUREMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*([a-zA-Z]+)").expect("measurement pattern is valid")
});

/// Scans text left to right and accepts the first permitted candidate.
#[derive(Debug, Clone)]
pub struct MeasurementExtractor {
    vocabulary: Arc<UnitVocabulary>,
}

impl MeasurementExtractor {
    pub fn new(vocabulary: Arc<UnitVocabulary>) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &UnitVocabulary {
        &self.vocabulary
    }

    /// Every number/unit pair in `text`, in order of appearance.
    pub fn candidates<'t>(&self, text: &'t str) -> impl Iterator<Item = MeasurementCandidate> + 't {
        MEASUREMENT_RE.captures_iter(text).filter_map(|caps| {
            let value = caps[1].parse::<f64>().ok()?;
            Some(MeasurementCandidate {
                value,
                unit: caps[2].to_string(),
            })
        })
    }

    /// The first candidate whose canonical unit is permitted for `attribute`.
    pub fn extract(&self, text: &str, attribute: AttributeType) -> Option<ResolvedMeasurement> {
        for candidate in self.candidates(text) {
            let surface = candidate.unit.to_lowercase();
            let canonical = self.vocabulary.canonicalize(&surface);
            if self.vocabulary.is_permitted(attribute, canonical) {
                return Some(ResolvedMeasurement {
                    formatted_value: format_value(candidate.value),
                    canonical_unit: canonical.to_string(),
                });
            }
            trace!(unit = %candidate.unit, %attribute, "Skipping candidate with unpermitted unit");
        }
        None
    }
}

/// Two decimal places, then trailing zeros and a dangling point removed.
pub fn format_value(value: f64) -> String {
    let fixed = format!("{value:.2}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> MeasurementExtractor {
        MeasurementExtractor::new(Arc::new(UnitVocabulary::standard()))
    }

    fn extract(text: &str, attribute: AttributeType) -> Option<String> {
        extractor().extract(text, attribute).map(|m| m.to_string())
    }

    #[test]
    fn resolves_width_in_centimetres() {
        assert_eq!(
            extract("Size: 15.5 cm approx", AttributeType::Width).as_deref(),
            Some("15.5 centimetre")
        );
    }

    #[test]
    fn resolves_weight_in_pounds() {
        assert_eq!(
            extract("Net Wt 2 lbs", AttributeType::ItemWeight).as_deref(),
            Some("2 pound")
        );
    }

    #[test]
    fn unrelated_text_yields_nothing() {
        assert_eq!(extract("random unrelated text", AttributeType::Voltage), None);
    }

    #[test]
    fn first_permitted_pair_wins() {
        assert_eq!(extract("3 ft 9 in", AttributeType::Depth).as_deref(), Some("3 foot"));
    }

    #[test]
    fn skips_unpermitted_pair_before_valid_one() {
        assert_eq!(
            extract("Pack of 4 pcs, 12 V battery", AttributeType::Voltage).as_deref(),
            Some("12 volt")
        );
        // Permitted for another attribute is still unpermitted here.
        assert_eq!(
            extract("500 ml bottle, 60 W", AttributeType::Wattage).as_deref(),
            Some("60 watt")
        );
    }

    #[test]
    fn unit_token_is_lower_cased_before_lookup() {
        assert_eq!(
            extract("Load 5KG", AttributeType::MaximumWeightRecommendation).as_deref(),
            Some("5 kilogram")
        );
        assert_eq!(extract("2 L", AttributeType::ItemVolume).as_deref(), Some("2 litre"));
        assert_eq!(extract("250 mL", AttributeType::ItemVolume).as_deref(), Some("250 millilitre"));
    }

    #[test]
    fn canonical_names_match_directly() {
        assert_eq!(
            extract("approx 30 centimetre long", AttributeType::Height).as_deref(),
            Some("30 centimetre")
        );
    }

    #[test]
    fn empty_and_blank_text() {
        assert_eq!(extract("", AttributeType::Width), None);
        assert_eq!(extract("   \n\t", AttributeType::Width), None);
    }

    #[test]
    fn glued_letters_are_one_token() {
        // "cmx" is not a known unit, so the pair is skipped.
        assert_eq!(extract("10cmx", AttributeType::Width), None);
    }

    #[test]
    fn candidates_keep_surface_form_and_order() {
        let found: Vec<_> = extractor().candidates("1.5 Kg and 20cm").collect();
        assert_eq!(
            found,
            vec![
                MeasurementCandidate { value: 1.5, unit: "Kg".to_string() },
                MeasurementCandidate { value: 20.0, unit: "cm".to_string() },
            ]
        );
    }

    #[test]
    fn formatting_strips_zeros_and_point() {
        assert_eq!(format_value(10.0), "10");
        assert_eq!(format_value(10.5), "10.5");
        assert_eq!(format_value(10.25), "10.25");
        assert_eq!(format_value(100.0), "100");
        assert_eq!(format_value(0.004), "0");
        assert_eq!(format_value(2.999), "3");
    }

    #[test]
    fn formatted_values_never_end_in_zero_decimal_or_point() {
        for text in ["10.00 cm", "10.50 cm", "7.10 cm", "120 cm", "0.5 cm"] {
            let m = extractor().extract(text, AttributeType::Width).unwrap();
            assert!(!m.formatted_value.ends_with('.'), "{text}");
            if m.formatted_value.contains('.') {
                assert!(!m.formatted_value.ends_with('0'), "{text}");
            }
        }
    }
}
