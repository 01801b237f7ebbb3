//! Optical Character Recognition (OCR)
//!
//! Bridges Tesseract or LLM Vision endpoints to read the text printed on a
//! product image.

use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::vision::{transcribe_image, VisionProvider};

/// Where recognition happens.
#[derive(Debug, Clone)]
pub enum OcrBackend {
    /// Local `tesseract` binary, image on stdin, text on stdout.
    Tesseract { binary: String, languages: String },
    /// Remote vision model.
    Vision(VisionProvider),
}

impl OcrBackend {
    pub fn tesseract() -> Self {
        Self::Tesseract { binary: "tesseract".to_string(), languages: "eng".to_string() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tesseract { .. } => "tesseract",
            Self::Vision(provider) => provider.name(),
        }
    }

    /// Run recognition and return the raw recognized text.
    pub async fn recognize(
        &self,
        client: &reqwest::Client,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<String> {
        match self {
            Self::Tesseract { binary, languages } => {
                run_tesseract(binary, languages, image_bytes).await
            }
            Self::Vision(provider) => transcribe_image(client, provider, image_bytes, mime_type).await,
        }
    }
}

async fn run_tesseract(binary: &str, languages: &str, image_bytes: &[u8]) -> Result<String> {
    debug!(binary, languages, bytes = image_bytes.len(), "Running tesseract");
    let mut child = Command::new(binary)
        .args(["stdin", "stdout", "-l", languages])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to spawn {binary}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(image_bytes).await.context("Failed to write image to tesseract")?;
    }

    let output = child.wait_with_output().await?;
    if !output.status.success() {
        bail!(
            "tesseract exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Collapse recognized fragments (lines, blocks) into one space-separated string.
pub fn join_fragments(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
