pub mod acquire;
pub mod extractor;
pub mod fallback;
pub mod ocr;
pub mod vision;
pub mod vocabulary;

pub use acquire::{sniff_image_mime, ImageTextAcquirer};
pub use extractor::{format_value, MeasurementExtractor};
pub use fallback::{predict_default, predict_for_entity, SENTINEL_PREDICTION};
pub use ocr::{join_fragments, OcrBackend};
pub use vision::{transcribe_image, VisionProvider};
pub use vocabulary::UnitVocabulary;
