//! Vision transcription: read the text printed in an image using a vision LLM.
//!
//! Used as an OCR backend when no local Tesseract install is available.

use anyhow::{bail, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::debug;

const TRANSCRIBE_PROMPT: &str = "Transcribe every piece of text visible in this product image, \
including numbers and their units exactly as printed. Output only the text, separated by spaces.";

/// Supported vision providers.
#[derive(Debug, Clone)]
pub enum VisionProvider {
    OpenAI { api_key: String, model: String },
    Gemini { api_key: String, model: String },
}

impl VisionProvider {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::OpenAI { api_key: api_key.into(), model: "gpt-4o".to_string() }
    }
    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self::Gemini { api_key: api_key.into(), model: "gemini-2.0-flash".to_string() }
    }

    /// Override the model name.
    pub fn with_model(self, model: impl Into<String>) -> Self {
        match self {
            Self::OpenAI { api_key, .. } => Self::OpenAI { api_key, model: model.into() },
            Self::Gemini { api_key, .. } => Self::Gemini { api_key, model: model.into() },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAI { .. } => "openai",
            Self::Gemini { .. } => "gemini",
        }
    }
}

/// Transcribe the text in an image from raw bytes.
pub async fn transcribe_image(
    client: &reqwest::Client,
    provider: &VisionProvider,
    image_bytes: &[u8],
    mime_type: &str,
) -> Result<String> {
    let b64 = STANDARD.encode(image_bytes);
    match provider {
        VisionProvider::OpenAI { api_key, model } => {
            transcribe_via_openai(client, api_key, model, &b64, mime_type).await
        }
        VisionProvider::Gemini { api_key, model } => {
            transcribe_via_gemini(client, api_key, model, &b64, mime_type).await
        }
    }
}

async fn transcribe_via_openai(
    client: &reqwest::Client, api_key: &str, model: &str, b64: &str, mime_type: &str,
) -> Result<String> {
    debug!(model, "Transcribing image via OpenAI");
    let body = serde_json::json!({
        "model": model,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": TRANSCRIBE_PROMPT },
                { "type": "image_url",
                  "image_url": { "url": format!("data:{};base64,{}", mime_type, b64) } }
            ]
        }],
        "max_tokens": 512,
        "temperature": 0
    });
    let resp = client
        .post("https://api.openai.com/v1/chat/completions")
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await?;
    if !resp.status().is_success() {
        bail!("OpenAI vision error: {}", resp.text().await.unwrap_or_default());
    }
    let json: serde_json::Value = resp.json().await?;
    Ok(json["choices"][0]["message"]["content"]
        .as_str()
        .unwrap_or("")
        .to_string())
}

async fn transcribe_via_gemini(
    client: &reqwest::Client, api_key: &str, model: &str, b64: &str, mime_type: &str,
) -> Result<String> {
    debug!(model, "Transcribing image via Gemini");
    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
        model, api_key
    );
    let body = serde_json::json!({
        "contents": [{ "parts": [
            { "text": TRANSCRIBE_PROMPT },
            { "inlineData": { "mimeType": mime_type, "data": b64 } }
        ]}]
    });
    let resp = client.post(&url).json(&body).send().await?;
    if !resp.status().is_success() {
        bail!("Gemini vision error: {}", resp.text().await.unwrap_or_default());
    }
    let json: serde_json::Value = resp.json().await?;
    Ok(json["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .unwrap_or("")
        .to_string())
}
