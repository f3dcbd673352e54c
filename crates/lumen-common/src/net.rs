//! Fetch utilities for external layer content.
//!
//! Provides blocking retrieval for the three accepted source kinds (see
//! [`crate::source`]). Remote requests use a shared `reqwest` blocking client
//! per call; `data:` URIs are decoded in place; local paths are read from
//! disk relative to an optional base directory.

use std::path::PathBuf;
use std::time::Duration;

use base64::Engine;

use crate::source::{SourceKind, classify_source, resolve_local_path};

/// User-Agent header sent with all remote requests.
const USER_AGENT: &str = concat!("lumen/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Errors produced while fetching external content.
///
/// Errors are `Clone` so that a failed fetch can be memoized and handed to
/// every layer that references the same source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The source reference was empty.
    #[error("no source given")]
    Empty,
    /// The source uses a scheme that is never fetched.
    #[error("unsupported source scheme in '{0}'")]
    UnsupportedScheme(String),
    /// Remote fetching is disabled by [`FetchOptions::allow_remote`].
    #[error("remote fetch disabled for '{0}'")]
    RemoteDisabled(String),
    /// Transport-level failure (DNS, connect, timeout, TLS).
    #[error("request failed: {0}")]
    Network(String),
    /// The server answered with a non-success status.
    #[error("HTTP error: {0}")]
    Status(u16),
    /// A local file could not be read.
    #[error("failed to read '{path}': {message}")]
    Io {
        /// The resolved path.
        path: String,
        /// The underlying I/O error message.
        message: String,
    },
    /// A `data:` URI was malformed.
    #[error("invalid data URL: {0}")]
    DataUrl(String),
    /// Fetched bytes were not valid UTF-8 where text was required.
    #[error("content is not valid UTF-8")]
    NotUtf8,
}

/// Options controlling how external content is fetched.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Request timeout for remote fetches.
    pub timeout: Duration,
    /// User-Agent header for remote fetches.
    pub user_agent: String,
    /// When false, `http(s)` sources fail with [`FetchError::RemoteDisabled`].
    pub allow_remote: bool,
    /// Base directory for relative local paths.
    pub base_dir: Option<PathBuf>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: TIMEOUT,
            user_agent: USER_AGENT.to_string(),
            allow_remote: true,
            base_dir: None,
        }
    }
}

/// A parsed `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl<'a> {
    /// Media type, e.g. `image/svg+xml`. Empty when omitted.
    pub media_type: &'a str,
    /// Whether the payload is base64 encoded.
    pub base64: bool,
    /// The raw payload after the comma.
    pub payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Split a `data:` URL into its parts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::DataUrl`] if the prefix or the comma is missing.
    pub fn parse(raw: &'a str) -> Result<Self, FetchError> {
        let rest = raw
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("data:"))
            .map(|_| &raw[5..])
            .ok_or_else(|| FetchError::DataUrl("missing 'data:' prefix".to_string()))?;

        let (metadata, payload) = rest
            .split_once(',')
            .ok_or_else(|| FetchError::DataUrl("missing comma".to_string()))?;

        let base64 = metadata.to_ascii_lowercase().ends_with(";base64");
        let media_type = metadata.split(';').next().unwrap_or_default();

        Ok(Self {
            media_type,
            base64,
            payload,
        })
    }

    /// Decode the payload into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::DataUrl`] if base64 or percent decoding fails.
    pub fn decode(&self) -> Result<Vec<u8>, FetchError> {
        if self.base64 {
            let compact: String = self
                .payload
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            base64::engine::general_purpose::STANDARD
                .decode(compact)
                .map_err(|e| FetchError::DataUrl(format!("base64 decode error: {e}")))
        } else {
            percent_decode(self.payload)
        }
    }
}

/// Percent-decode a `data:` payload (`%3C` → `<`).
fn percent_decode(input: &str) -> Result<Vec<u8>, FetchError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input
                .get(i + 1..i + 3)
                .ok_or_else(|| FetchError::DataUrl("truncated percent escape".to_string()))?;
            let byte = u8::from_str_radix(hex, 16)
                .map_err(|_| FetchError::DataUrl(format!("invalid percent escape '%{hex}'")))?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

/// Encode bytes as a base64 `data:` URI.
#[must_use]
pub fn to_data_url(media_type: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{media_type};base64,{encoded}")
}

/// Fetch a source reference and return its raw bytes.
///
/// # Errors
///
/// Returns a [`FetchError`] describing why the content is unusable.
pub fn fetch_bytes(src: &str, options: &FetchOptions) -> Result<Vec<u8>, FetchError> {
    let src = src.trim();
    match classify_source(src) {
        SourceKind::Empty => Err(FetchError::Empty),
        SourceKind::Rejected => Err(FetchError::UnsupportedScheme(src.to_string())),
        SourceKind::Data => DataUrl::parse(src)?.decode(),
        SourceKind::Remote => fetch_remote(src, options),
        SourceKind::Local => {
            let path = resolve_local_path(src, options.base_dir.as_deref());
            std::fs::read(&path).map_err(|e| FetchError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        }
    }
}

/// Fetch a source reference and return its body as text.
///
/// # Errors
///
/// Returns a [`FetchError`] if the fetch fails or the body is not UTF-8.
pub fn fetch_text(src: &str, options: &FetchOptions) -> Result<String, FetchError> {
    let bytes = fetch_bytes(src, options)?;
    String::from_utf8(bytes).map_err(|_| FetchError::NotUtf8)
}

fn fetch_remote(url: &str, options: &FetchOptions) -> Result<Vec<u8>, FetchError> {
    if !options.allow_remote {
        return Err(FetchError::RemoteDisabled(url.to_string()));
    }

    tracing::debug!(url, "fetching remote content");

    let client = reqwest::blocking::Client::builder()
        .timeout(options.timeout)
        .build()
        .map_err(|e| FetchError::Network(format!("failed to create HTTP client: {e}")))?;

    let response = client
        .get(url)
        .header("User-Agent", options.user_agent.as_str())
        .send()
        .map_err(|e| FetchError::Network(e.to_string()))?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status().as_u16()));
    }

    response
        .bytes()
        .map(|b| b.to_vec())
        .map_err(|e| FetchError::Network(format!("failed to read response body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("%3Csvg%3E").unwrap(), b"<svg>".to_vec());
        assert!(percent_decode("%G1").is_err());
        assert!(percent_decode("%4").is_err());
    }
}
