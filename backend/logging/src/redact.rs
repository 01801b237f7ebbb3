//! Log Redaction Layer
//!
//! Scrubs API keys, bearer tokens and signed-URL credentials from strings
//! prior to logging. Image links from product catalogues are frequently
//! pre-signed, so every link goes through here before it is logged.

use once_cell::sync::Lazy;
use regex::Regex;

static API_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9_\-]{20,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});

/// Query parameters that carry credentials.
static SECRET_PARAM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([?&](?:key|api_key|apikey|token|access_token|signature|sig|x-amz-signature|x-amz-credential|x-amz-security-token)=)[^&#\s]+").unwrap()
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]");
    SECRET_PARAM_RE
        .replace_all(&redacted, "${1}[REDACTED]")
        .into_owned()
}
