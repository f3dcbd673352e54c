//! Static render target for Lumen.
//!
//! [`export_svg`] renders a [`lumen_model::Design`] into a standalone SVG
//! document: one `<defs>` section holding every interned resource, the
//! canvas background, then the layers in z-order. [`rasterize`] turns that
//! markup into PNG bytes with `resvg`.
//!
//! External content is loaded synchronously, so the output never contains
//! a "loading" placeholder; sources that cannot be fetched render their
//! error placeholder instead.

pub mod document;
pub mod export;
pub mod raster;

pub use document::{SvgDocument, escape_attr, escape_text};
pub use export::{ExportOptions, SvgExport, export_svg, export_with};
pub use raster::{ExportError, rasterize};
