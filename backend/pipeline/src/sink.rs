//! Prediction and audit output streams.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;
use metricscan_core::{InputRecord, MetricScanError};

pub const PREDICTION_COLUMNS: [&str; 2] = ["index", "prediction"];
pub const AUDIT_COLUMNS: [&str; 4] = ["index", "image_link", "group_id", "entity_name"];

fn output_err(e: impl std::fmt::Display) -> MetricScanError {
    MetricScanError::Output(e.to_string())
}

/// The two CSV writers a run produces. Headers are written on creation, so
/// even an empty run leaves well-formed files behind.
pub struct OutputSinks<P: Write, A: Write> {
    predictions: Writer<P>,
    audit: Writer<A>,
}

impl OutputSinks<File, File> {
    pub fn create(predictions: &Path, audit: &Path) -> Result<Self, MetricScanError> {
        let open = |path: &Path| {
            File::create(path).map_err(|e| {
                MetricScanError::Output(format!("failed to create {}: {e}", path.display()))
            })
        };
        Self::new(open(predictions)?, open(audit)?)
    }
}

impl<P: Write, A: Write> OutputSinks<P, A> {
    pub fn new(predictions: P, audit: A) -> Result<Self, MetricScanError> {
        let mut predictions = Writer::from_writer(predictions);
        let mut audit = Writer::from_writer(audit);
        predictions.write_record(PREDICTION_COLUMNS).map_err(output_err)?;
        audit.write_record(AUDIT_COLUMNS).map_err(output_err)?;
        Ok(Self { predictions, audit })
    }

    pub fn write_prediction(&mut self, index: &str, prediction: &str) -> Result<(), MetricScanError> {
        self.predictions.write_record([index, prediction]).map_err(output_err)
    }

    pub fn write_audit(&mut self, record: &InputRecord) -> Result<(), MetricScanError> {
        self.audit
            .write_record([
                record.index.as_str(),
                record.image_link.as_str(),
                record.group_id.as_str(),
                record.entity_name.as_str(),
            ])
            .map_err(output_err)
    }

    /// Push buffered rows to the underlying writers.
    pub fn flush(&mut self) -> Result<(), MetricScanError> {
        self.predictions.flush()?;
        self.audit.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writers.
    pub fn into_inner(self) -> Result<(P, A), MetricScanError> {
        let predictions = self.predictions.into_inner().map_err(output_err)?;
        let audit = self.audit.into_inner().map_err(output_err)?;
        Ok((predictions, audit))
    }
}
