//! PNG rasterization through `resvg`.

use tracing::debug;

use crate::export::SvgExport;

/// Why an export could not be rasterized.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    /// The markup was rejected by the SVG parser.
    #[error("invalid SVG: {0}")]
    Svg(String),
    /// The scale factor is not a positive finite number.
    #[error("invalid scale {0}")]
    InvalidScale(f32),
    /// The output size is zero or too large for a pixmap.
    #[error("cannot allocate a {width}x{height} pixmap")]
    Size {
        /// Output width in pixels.
        width: u32,
        /// Output height in pixels.
        height: u32,
    },
    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Render an export to PNG bytes at `scale` times its canvas size. System
/// fonts are loaded for text layers.
///
/// # Errors
///
/// See [`ExportError`].
pub fn rasterize(export: &SvgExport, scale: f32) -> Result<Vec<u8>, ExportError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(ExportError::InvalidScale(scale));
    }

    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(&export.markup, &options)
        .map_err(|e| ExportError::Svg(e.to_string()))?;

    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;
    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(ExportError::Size { width, height })?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    debug!(target: "lumen::export", width, height, "rasterized");

    pixmap
        .encode_png()
        .map_err(|e| ExportError::Encode(e.to_string()))
}
