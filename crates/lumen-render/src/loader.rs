//! Content loading: fetch, detect format, decode, and memoize.
//!
//! Loading is split into three steps:
//!
//! 1. **Fetch**: [`lumen_common::fetch_bytes`] handles `data:` URIs,
//!    `http(s)` URLs, and local paths, and rejects everything else.
//! 2. **Detect**: [`detect_format`] tells SVG from raster using the
//!    extension, the data-URI MIME type, and magic bytes.
//! 3. **Decode**: raster headers are read with the `image` crate. Vector
//!    documents are parsed by [`crate::vector::parse_document`].
//!
//! Results are memoized per source string in a [`FetchCache`]. A key is
//! loaded at most once, and concurrent callers for the same key wait on
//! the single in-flight load.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use lumen_common::net::to_data_url;
use lumen_common::{FetchError, FetchOptions, fetch_bytes, fetch_text};
use tracing::debug;

use crate::vector::{VectorDocument, parse_document};

/// Why content could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The bytes could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The bytes are not a decodable image.
    #[error("could not decode image: {0}")]
    Decode(String),
    /// The text is not a usable SVG document.
    #[error("could not parse vector document: {0}")]
    Parse(String),
}

/// Detected image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// SVG document.
    Svg,
    /// Raster image (PNG, JPEG, GIF, WebP, ...).
    Raster,
}

/// Strip query string and fragment so the path can be checked for an
/// extension.
#[must_use]
pub fn strip_url_decorations(src: &str) -> &str {
    let without_fragment = src.split_once('#').map_or(src, |(b, _)| b);
    without_fragment
        .split_once('?')
        .map_or(without_fragment, |(b, _)| b)
}

/// Detect whether `bytes` are SVG or raster.
///
/// Checks, in order: a `.svg` extension, a `data:image/svg` prefix, then an
/// `<?xml` / `<svg` prefix in the first 256 non-whitespace bytes. Anything
/// else is raster.
#[must_use]
pub fn detect_format(src: &str, bytes: &[u8]) -> ImageFormat {
    if !src.starts_with("data:")
        && Path::new(strip_url_decorations(src))
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
    {
        return ImageFormat::Svg;
    }
    if src.starts_with("data:image/svg") {
        return ImageFormat::Svg;
    }
    let head: Vec<u8> = bytes
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take(256)
        .copied()
        .collect();
    if head.starts_with(b"<?xml") || head.starts_with(b"<svg") {
        return ImageFormat::Svg;
    }
    ImageFormat::Raster
}

/// A fetched image with its intrinsic size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// MIME type, e.g. `image/png`.
    pub media_type: String,
    /// Raw bytes as fetched.
    pub bytes: Vec<u8>,
    /// Intrinsic width.
    pub width: u32,
    /// Intrinsic height.
    pub height: u32,
}

impl ImageAsset {
    /// The bytes as a base64 `data:` URI.
    #[must_use]
    pub fn data_url(&self) -> String {
        to_data_url(&self.media_type, &self.bytes)
    }
}

/// Identify and size fetched image bytes.
///
/// # Errors
///
/// [`LoadError::Decode`] when the bytes are neither a readable raster
/// header nor an SVG document.
pub fn decode_image(src: &str, bytes: Vec<u8>) -> Result<ImageAsset, LoadError> {
    match detect_format(src, &bytes) {
        ImageFormat::Svg => {
            let text = std::str::from_utf8(&bytes)
                .map_err(|_| LoadError::Fetch(FetchError::NotUtf8))?;
            let document = parse_document(text)?;
            Ok(ImageAsset {
                media_type: "image/svg+xml".to_string(),
                width: document.view_box.width.round().max(1.0) as u32,
                height: document.view_box.height.round().max(1.0) as u32,
                bytes,
            })
        }
        ImageFormat::Raster => {
            let reader = image::ImageReader::new(Cursor::new(&bytes))
                .with_guessed_format()
                .map_err(|e| LoadError::Decode(e.to_string()))?;
            let format = reader
                .format()
                .ok_or_else(|| LoadError::Decode("unrecognized image format".to_string()))?;
            let (width, height) = reader
                .into_dimensions()
                .map_err(|e| LoadError::Decode(e.to_string()))?;
            Ok(ImageAsset {
                media_type: format.to_mime_type().to_string(),
                bytes,
                width,
                height,
            })
        }
    }
}

/// Fetch and identify an image.
///
/// # Errors
///
/// Any fetch or decode failure.
pub fn load_image(src: &str, options: &FetchOptions) -> Result<ImageAsset, LoadError> {
    let bytes = fetch_bytes(src, options)?;
    decode_image(src, bytes)
}

/// Fetch and parse a vector document.
///
/// # Errors
///
/// Any fetch or parse failure.
pub fn load_vector(src: &str, options: &FetchOptions) -> Result<VectorDocument, LoadError> {
    let text = fetch_text(src, options)?;
    parse_document(&text)
}

type Slot<T> = Arc<OnceLock<Result<Arc<T>, LoadError>>>;

/// Memoizing cache keyed by source string.
///
/// Safe for concurrent use: the map lock is held only to find or create a
/// key's slot, and the slot's `OnceLock` runs the loader at most once.
#[derive(Debug)]
pub struct FetchCache<T> {
    slots: Mutex<HashMap<String, Slot<T>>>,
}

impl<T> Default for FetchCache<T> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> FetchCache<T> {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &str) -> Slot<T> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key.to_string()).or_default())
    }

    /// Return the cached result for `key`, running `load` if this is the
    /// first request.
    ///
    /// # Errors
    ///
    /// The (memoized) load error.
    pub fn get_or_load<F>(&self, key: &str, load: F) -> Result<Arc<T>, LoadError>
    where
        F: FnOnce() -> Result<T, LoadError>,
    {
        let slot = self.slot(key);
        slot.get_or_init(|| {
            debug!(target: "lumen::loader", key = %abbreviate(key), "loading");
            load().map(Arc::new)
        })
        .clone()
    }

    /// The finished result for `key`, if any.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<Result<Arc<T>, LoadError>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).and_then(|slot| slot.get().cloned())
    }

    /// Forget `key` so the next request loads it again.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(key).is_some()
    }

    /// Forget everything.
    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of keys (finished or in flight).
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// No keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shorten data URIs for logging.
#[must_use]
pub fn abbreviate(src: &str) -> String {
    if src.len() > 64 {
        let cut = (0..=48).rev().find(|&i| src.is_char_boundary(i)).unwrap_or(0);
        format!("{}…", &src[..cut])
    } else {
        src.to_string()
    }
}

/// The state of a piece of external content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentState<T> {
    /// Requested but not finished; render a loading placeholder.
    Loading,
    /// Available.
    Ready(Arc<T>),
    /// Failed; render an error placeholder.
    Failed(LoadError),
}

impl<T> From<Result<Arc<T>, LoadError>> for ContentState<T> {
    fn from(result: Result<Arc<T>, LoadError>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(error) => Self::Failed(error),
        }
    }
}

/// Both content caches, shared between a content source and its workers.
#[derive(Debug, Default)]
pub struct ContentCaches {
    /// Images by source.
    pub images: FetchCache<ImageAsset>,
    /// Vector documents by source.
    pub vectors: FetchCache<VectorDocument>,
}

impl ContentCaches {
    /// Drop a source from both caches.
    pub fn invalidate(&self, src: &str) -> bool {
        let images = self.images.invalidate(src);
        let vectors = self.vectors.invalidate(src);
        images || vectors
    }
}

/// Where renderers get external content from.
///
/// The static target resolves everything before returning; the interactive
/// target answers [`ContentState::Loading`] and finishes in the background.
pub trait ContentSource {
    /// Image content for `src`.
    fn image(&self, src: &str) -> ContentState<ImageAsset>;

    /// Vector document for `src`.
    fn vector(&self, src: &str) -> ContentState<VectorDocument>;
}

/// A [`ContentSource`] that loads synchronously on first request.
#[derive(Debug, Clone, Default)]
pub struct BlockingContent {
    options: FetchOptions,
    caches: Arc<ContentCaches>,
}

impl BlockingContent {
    /// A source with its own caches.
    #[must_use]
    pub fn new(options: FetchOptions) -> Self {
        Self {
            options,
            caches: Arc::default(),
        }
    }

    /// A source sharing existing caches.
    #[must_use]
    pub const fn with_caches(options: FetchOptions, caches: Arc<ContentCaches>) -> Self {
        Self { options, caches }
    }

    /// The underlying caches.
    #[must_use]
    pub const fn caches(&self) -> &Arc<ContentCaches> {
        &self.caches
    }
}

impl ContentSource for BlockingContent {
    fn image(&self, src: &str) -> ContentState<ImageAsset> {
        self.caches
            .images
            .get_or_load(src, || load_image(src, &self.options))
            .into()
    }

    fn vector(&self, src: &str) -> ContentState<VectorDocument> {
        self.caches
            .vectors
            .get_or_load(src, || load_vector(src, &self.options))
            .into()
    }
}
