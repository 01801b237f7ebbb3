pub mod error;
pub mod traits;
pub mod types;

pub use error::MetricScanError;
pub use traits::{AcquisitionError, TextAcquirer};
pub use types::{
    AttributeType, EntityName, InputRecord, MalformedRowPolicy, MeasurementCandidate, ProcessingOutcome,
    ResolvedMeasurement, UnknownAttribute, UnresolvedReason,
};
