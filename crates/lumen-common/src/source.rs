//! Classification of content source references.
//!
//! Image, video poster, and vector-source layers name their content with a
//! single string. Only three shapes are accepted: an inline `data:` URI, a
//! remote `http(s)` URL, or a local filesystem path. Everything else
//! (`javascript:`, `ftp:`, `file:` ...) is rejected before any I/O happens.

use std::path::{Path, PathBuf};

/// The kind of a content source reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Inline `data:` URI.
    Data,
    /// `http://` or `https://` URL.
    Remote,
    /// Filesystem path (absolute or relative, no scheme).
    Local,
    /// Empty reference.
    Empty,
    /// Any other scheme. Never fetched.
    Rejected,
}

impl SourceKind {
    /// Whether content of this kind may be fetched at all.
    #[must_use]
    pub const fn is_fetchable(self) -> bool {
        matches!(self, Self::Data | Self::Remote | Self::Local)
    }
}

/// Classify a source reference.
///
/// A single ASCII letter before `:` is treated as a Windows drive letter,
/// not a scheme.
#[must_use]
pub fn classify_source(src: &str) -> SourceKind {
    let src = src.trim();
    if src.is_empty() {
        return SourceKind::Empty;
    }

    let lower = src.to_ascii_lowercase();
    if lower.starts_with("data:") {
        return SourceKind::Data;
    }
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return SourceKind::Remote;
    }

    match scheme_of(src) {
        Some(scheme) if scheme.len() > 1 => SourceKind::Rejected,
        _ => SourceKind::Local,
    }
}

/// Extract a URL scheme (`scheme:` prefix) if the string has one.
fn scheme_of(src: &str) -> Option<&str> {
    let (scheme, _) = src.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    chars
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .then_some(scheme)
}

/// Resolve a local path against an optional base directory.
///
/// Absolute paths are returned unchanged.
#[must_use]
pub fn resolve_local_path(src: &str, base_dir: Option<&Path>) -> PathBuf {
    let path = Path::new(src.trim());
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}
