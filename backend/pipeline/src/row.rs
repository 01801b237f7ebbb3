use std::sync::Arc;
use std::time::Duration;

use metricscan_core::{
    AcquisitionError, InputRecord, ProcessingOutcome, TextAcquirer, UnresolvedReason,
};
use metricscan_understanding::{predict_for_entity, MeasurementExtractor};
use tracing::{debug, warn};

/// Turns one input record into exactly one outcome.
///
/// Acquisition failures never escape: they become `Unresolved` outcomes with
/// the attribute's fallback prediction.
pub struct RowProcessor {
    acquirer: Arc<dyn TextAcquirer>,
    extractor: MeasurementExtractor,
    row_timeout: Option<Duration>,
}

impl RowProcessor {
    pub fn new(acquirer: Arc<dyn TextAcquirer>, extractor: MeasurementExtractor) -> Self {
        Self { acquirer, extractor, row_timeout: None }
    }

    /// Bound each acquisition call; a call that runs over counts as a failure.
    pub fn with_row_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.row_timeout = timeout;
        self
    }

    pub async fn process(&self, record: &InputRecord) -> ProcessingOutcome {
        let text = match self.acquire_text(&record.image_link).await {
            Ok(text) => text,
            Err(e) => {
                warn!(index = %record.index, error = %e, "Failed to extract text from image");
                return self.fallback(record, UnresolvedReason::NoText(e.to_string()));
            }
        };

        let measurement = record
            .entity_name
            .attribute()
            .and_then(|attr| self.extractor.extract(&text, attr));

        match measurement {
            Some(m) => ProcessingOutcome::Resolved(m),
            None => {
                debug!(
                    index = %record.index,
                    entity = %record.entity_name,
                    text = %text,
                    "No valid measurement found"
                );
                self.fallback(record, UnresolvedReason::NoMeasurement)
            }
        }
    }

    async fn acquire_text(&self, image_link: &str) -> Result<String, AcquisitionError> {
        if image_link.is_empty() {
            return Err(AcquisitionError::Fetch("row has no image link".to_string()));
        }

        let text = match self.row_timeout {
            Some(limit) => tokio::time::timeout(limit, self.acquirer.acquire(image_link))
                .await
                .map_err(|_| AcquisitionError::Timeout(limit))??,
            None => self.acquirer.acquire(image_link).await?,
        };

        if text.trim().is_empty() {
            return Err(AcquisitionError::EmptyText);
        }
        Ok(text)
    }

    fn fallback(&self, record: &InputRecord, reason: UnresolvedReason) -> ProcessingOutcome {
        ProcessingOutcome::Unresolved {
            fallback: predict_for_entity(&record.entity_name).to_string(),
            reason,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use metricscan_understanding::UnitVocabulary;

    use super::*;

    /// Serves canned text per link; unknown links fail to fetch.
    pub(crate) struct CannedAcquirer {
        pages: HashMap<String, Result<String, AcquisitionError>>,
        pub(crate) calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl CannedAcquirer {
        pub(crate) fn new(pages: &[(&str, Result<&str, AcquisitionError>)]) -> Self {
            let pages = pages
                .iter()
                .map(|(link, page)| (link.to_string(), page.clone().map(str::to_string)))
                .collect();
            Self { pages, calls: AtomicUsize::new(0), delay: None }
        }

        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl TextAcquirer for CannedAcquirer {
        fn name(&self) -> &str {
            "canned"
        }

        async fn acquire(&self, image_link: &str) -> Result<String, AcquisitionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.pages
                .get(image_link)
                .cloned()
                .unwrap_or_else(|| Err(AcquisitionError::Fetch("HTTP 404 Not Found".to_string())))
        }
    }

    pub(crate) fn processor(acquirer: Arc<CannedAcquirer>) -> RowProcessor {
        let extractor = MeasurementExtractor::new(Arc::new(UnitVocabulary::standard()));
        RowProcessor::new(acquirer, extractor)
    }

    #[tokio::test]
    async fn resolves_from_text() {
        let acquirer = Arc::new(CannedAcquirer::new(&[("a.jpg", Ok("Size: 15.5 cm approx"))]));
        let outcome = processor(acquirer.clone())
            .process(&InputRecord::new("1", "a.jpg", "g", "width"))
            .await;
        assert_eq!(outcome.prediction(), "15.5 centimetre");
        assert!(outcome.is_resolved());
        assert_eq!(acquirer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn extraction_miss_falls_back() {
        let acquirer = Arc::new(CannedAcquirer::new(&[("b.jpg", Ok("random unrelated text"))]));
        let outcome = processor(acquirer)
            .process(&InputRecord::new("2", "b.jpg", "g", "voltage"))
            .await;
        assert_eq!(
            outcome,
            ProcessingOutcome::Unresolved {
                fallback: "220 volt".to_string(),
                reason: UnresolvedReason::NoMeasurement,
            }
        );
    }

    #[tokio::test]
    async fn acquisition_failure_falls_back() {
        let acquirer = Arc::new(CannedAcquirer::new(&[]));
        let outcome = processor(acquirer)
            .process(&InputRecord::new("3", "gone.jpg", "g", "item_volume"))
            .await;
        match outcome {
            ProcessingOutcome::Unresolved { fallback, reason: UnresolvedReason::NoText(why) } => {
                assert_eq!(fallback, "1 litre");
                assert!(why.contains("404"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_text_counts_as_no_text() {
        let acquirer = Arc::new(CannedAcquirer::new(&[("c.jpg", Ok("   "))]));
        let outcome = processor(acquirer)
            .process(&InputRecord::new("4", "c.jpg", "g", "wattage"))
            .await;
        assert_eq!(
            outcome,
            ProcessingOutcome::Unresolved {
                fallback: "100 watt".to_string(),
                reason: UnresolvedReason::NoText(AcquisitionError::EmptyText.to_string()),
            }
        );
    }

    #[tokio::test]
    async fn empty_link_skips_acquisition() {
        let acquirer = Arc::new(CannedAcquirer::new(&[]));
        let outcome = processor(acquirer.clone())
            .process(&InputRecord::new("5", "", "g", "depth"))
            .await;
        assert_eq!(outcome.prediction(), "10 centimetre");
        assert_eq!(acquirer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_entity_gets_sentinel() {
        let acquirer = Arc::new(CannedAcquirer::new(&[("d.jpg", Ok("12 cm"))]));
        let outcome = processor(acquirer)
            .process(&InputRecord::new("6", "d.jpg", "g", "colour"))
            .await;
        assert_eq!(outcome.prediction(), "N/A");
        assert!(!outcome.is_resolved());
    }

    #[tokio::test]
    async fn slow_acquisition_times_out() {
        let acquirer = Arc::new(
            CannedAcquirer::new(&[("e.jpg", Ok("5 kg"))]).with_delay(Duration::from_millis(200)),
        );
        let outcome = processor(acquirer)
            .with_row_timeout(Some(Duration::from_millis(20)))
            .process(&InputRecord::new("7", "e.jpg", "g", "item_weight"))
            .await;
        match &outcome {
            ProcessingOutcome::Unresolved { reason: UnresolvedReason::NoText(reason), .. } => {
                assert_eq!(reason, "acquisition timed out after 20ms");
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(outcome.prediction(), "1 kilogram");
    }
}
