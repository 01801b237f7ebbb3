//! `metricscan extract`: run extraction on literal text, no image involved.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use metricscan_core::EntityName;
use metricscan_understanding::{predict_for_entity, MeasurementExtractor, UnitVocabulary};

use crate::terminal_output::{dim, render_table, Column};

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Attribute to look for, e.g. `item_weight`
    #[arg(short, long)]
    pub entity: String,
    /// Text as it would come out of OCR
    pub text: String,
}

/// What `extract` found in one piece of text.
#[derive(Debug, PartialEq)]
pub struct ExtractReport {
    /// Every (value, raw unit, canonical unit, accepted) quadruple seen.
    pub candidates: Vec<(String, String, String, bool)>,
    pub prediction: String,
    pub resolved: bool,
}

pub fn extract(extractor: &MeasurementExtractor, entity: &str, text: &str) -> ExtractReport {
    let entity = EntityName::parse(entity);
    let vocabulary = extractor.vocabulary();
    let attribute = entity.attribute();

    let candidates = extractor
        .candidates(text)
        .map(|c| {
            let lowered = c.unit.to_lowercase();
            let canonical = vocabulary.canonicalize(&lowered).to_string();
            let accepted = attribute.is_some_and(|a| vocabulary.is_permitted(a, &canonical));
            (metricscan_understanding::format_value(c.value), c.unit, canonical, accepted)
        })
        .collect();

    match attribute.and_then(|a| extractor.extract(text, a)) {
        Some(m) => ExtractReport { candidates, prediction: m.to_string(), resolved: true },
        None => ExtractReport {
            candidates,
            prediction: predict_for_entity(&entity).to_string(),
            resolved: false,
        },
    }
}

pub fn run(args: ExtractArgs) -> Result<()> {
    let extractor = MeasurementExtractor::new(Arc::new(UnitVocabulary::standard()));
    let report = extract(&extractor, &args.entity, &args.text);

    if !report.candidates.is_empty() {
        let rows: Vec<_> = report
            .candidates
            .iter()
            .map(|(value, unit, canonical, accepted)| {
                vec![
                    value.clone(),
                    unit.clone(),
                    canonical.clone(),
                    if *accepted { "yes".to_string() } else { dim("no") },
                ]
            })
            .collect();
        let columns = [
            Column::right("Value"),
            Column::left("Unit"),
            Column::left("Canonical"),
            Column::left("Permitted"),
        ];
        print!("{}", render_table(&columns, &rows));
    }

    if report.resolved {
        println!("{}", report.prediction);
    } else {
        println!("{} {}", report.prediction, dim("(fallback)"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> MeasurementExtractor {
        MeasurementExtractor::new(Arc::new(UnitVocabulary::standard()))
    }

    #[test]
    fn reports_first_permitted_candidate() {
        let report = extract(&extractor(), "item_weight", "Box 30 cm, Net Wt 2 lbs");
        assert!(report.resolved);
        assert_eq!(report.prediction, "2 pound");
        assert_eq!(report.candidates.len(), 2);
        assert!(!report.candidates[0].3);
        assert_eq!(report.candidates[1], ("2".into(), "lbs".into(), "pound".into(), true));
    }

    #[test]
    fn falls_back_without_match() {
        let report = extract(&extractor(), "voltage", "nothing here");
        assert!(!report.resolved);
        assert_eq!(report.prediction, "220 volt");
        assert!(report.candidates.is_empty());
    }

    #[test]
    fn unknown_entity_gives_sentinel() {
        let report = extract(&extractor(), "colour", "12 cm");
        assert_eq!(report.prediction, "N/A");
        assert!(!report.candidates[0].3);
    }
}
