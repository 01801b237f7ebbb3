use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Why text could not be obtained for an image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquisitionError {
    #[error("image fetch failed: {0}")]
    Fetch(String),

    #[error("image decode failed: {0}")]
    Decode(String),

    #[error("text recognition failed: {0}")]
    Recognition(String),

    #[error("recognition returned no text")]
    EmptyText,

    #[error("acquisition timed out after {0:?}")]
    Timeout(Duration),
}

/// Turns an image reference into the text recognized inside it.
///
/// Implementations return every recognized fragment joined into one string.
/// Failures are reported as values; callers decide how to recover.
#[async_trait]
pub trait TextAcquirer: Send + Sync {
    /// Short name used in logs (e.g., "tesseract", "openai").
    fn name(&self) -> &str;

    async fn acquire(&self, image_link: &str) -> Result<String, AcquisitionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl TextAcquirer for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn acquire(&self, image_link: &str) -> Result<String, AcquisitionError> {
            if image_link.is_empty() {
                return Err(AcquisitionError::EmptyText);
            }
            Ok(image_link.to_string())
        }
    }

    #[tokio::test]
    async fn acquirer_is_object_safe() {
        let acquirer: Box<dyn TextAcquirer> = Box::new(Echo);
        assert_eq!(acquirer.acquire("12 cm").await.unwrap(), "12 cm");
        assert_eq!(acquirer.acquire("").await, Err(AcquisitionError::EmptyText));
    }

    #[test]
    fn errors_render_reason() {
        let err = AcquisitionError::Fetch("404 Not Found".to_string());
        assert_eq!(err.to_string(), "image fetch failed: 404 Not Found");
        assert_eq!(
            AcquisitionError::Timeout(Duration::from_secs(5)).to_string(),
            "acquisition timed out after 5s"
        );
        assert_eq!(
            AcquisitionError::Timeout(Duration::from_millis(250)).to_string(),
            "acquisition timed out after 250ms"
        );
    }
}
