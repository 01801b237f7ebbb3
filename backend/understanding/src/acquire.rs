//! Image text acquisition: fetch an image, sniff its type, run OCR.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use metricscan_core::{AcquisitionError, TextAcquirer};
use tracing::debug;

use crate::ocr::{join_fragments, OcrBackend};

/// Fetches images over HTTP(S) (or from disk for plain paths and `file://`
/// links) and hands the bytes to an OCR backend.
pub struct ImageTextAcquirer {
    client: reqwest::Client,
    backend: OcrBackend,
}

impl ImageTextAcquirer {
    pub fn new(backend: OcrBackend, fetch_timeout: Duration) -> Result<Self, AcquisitionError> {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .user_agent(concat!("metricscan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AcquisitionError::Fetch(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, backend })
    }

    async fn fetch(&self, image_link: &str) -> Result<Vec<u8>, AcquisitionError> {
        if image_link.starts_with("http://") || image_link.starts_with("https://") {
            let resp = self
                .client
                .get(image_link)
                .send()
                .await
                .map_err(|e| AcquisitionError::Fetch(e.to_string()))?;
            let status = resp.status();
            if !status.is_success() {
                return Err(AcquisitionError::Fetch(format!("HTTP {status}")));
            }
            let bytes = resp
                .bytes()
                .await
                .map_err(|e| AcquisitionError::Fetch(e.to_string()))?;
            return Ok(bytes.to_vec());
        }

        let path = image_link.strip_prefix("file://").unwrap_or(image_link);
        tokio::fs::read(Path::new(path))
            .await
            .map_err(|e| AcquisitionError::Fetch(format!("{path}: {e}")))
    }
}

#[async_trait]
impl TextAcquirer for ImageTextAcquirer {
    fn name(&self) -> &str {
        self.backend.name()
    }

    async fn acquire(&self, image_link: &str) -> Result<String, AcquisitionError> {
        let bytes = self.fetch(image_link).await?;
        if bytes.is_empty() {
            return Err(AcquisitionError::Decode("empty image body".to_string()));
        }
        let mime = sniff_image_mime(&bytes)
            .ok_or_else(|| AcquisitionError::Decode("unrecognized image format".to_string()))?;
        debug!(link = %image_link, mime, bytes = bytes.len(), "Fetched image");

        let raw = self
            .backend
            .recognize(&self.client, &bytes, mime)
            .await
            .map_err(|e| AcquisitionError::Recognition(e.to_string()))?;

        let text = join_fragments(&raw);
        if text.is_empty() {
            return Err(AcquisitionError::EmptyText);
        }
        Ok(text)
    }
}

/// Detect an image MIME type from its leading magic bytes.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("image/png"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        [b'B', b'M', ..] => Some("image/bmp"),
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => Some("image/tiff"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    #[test]
    fn sniffs_common_formats() {
        assert_eq!(sniff_image_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_image_mime(PNG_HEADER), Some("image/png"));
        assert_eq!(sniff_image_mime(b"GIF89a...."), Some("image/gif"));
        assert_eq!(sniff_image_mime(b"RIFF\x10\x00\x00\x00WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_image_mime(b"<html>"), None);
        assert_eq!(sniff_image_mime(b""), None);
    }

    fn acquirer() -> ImageTextAcquirer {
        let backend = OcrBackend::Tesseract {
            binary: "metricscan-no-such-ocr-binary".to_string(),
            languages: "eng".to_string(),
        };
        ImageTextAcquirer::new(backend, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn missing_local_file_is_fetch_error() {
        let result = acquirer().acquire("/definitely/not/here.jpg").await;
        assert!(matches!(result, Err(AcquisitionError::Fetch(_))));
    }

    #[tokio::test]
    async fn non_image_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.jpg");
        std::fs::write(&path, b"<html>not an image</html>").unwrap();
        let link = format!("file://{}", path.display());
        let result = acquirer().acquire(&link).await;
        assert!(matches!(result, Err(AcquisitionError::Decode(_))));
    }

    #[tokio::test]
    async fn recognizer_failure_is_recognition_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.png");
        std::fs::write(&path, PNG_HEADER).unwrap();
        let result = acquirer().acquire(path.to_str().unwrap()).await;
        assert!(matches!(result, Err(AcquisitionError::Recognition(_))));
    }
}
