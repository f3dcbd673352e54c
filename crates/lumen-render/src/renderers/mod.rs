//! Built-in type renderers.

mod group;
mod image;
mod media;
pub mod placeholder;
mod shape;
mod text;
mod vector;

pub use group::GroupRenderer;
pub use image::ImageRenderer;
pub use media::MediaRenderer;
pub use shape::ShapeRenderer;
pub use text::TextRenderer;
pub use vector::VectorRenderer;

use crate::registry::TypeRenderer;

/// One renderer per built-in layer type.
#[must_use]
pub fn defaults() -> Vec<Box<dyn TypeRenderer>> {
    vec![
        Box::new(TextRenderer),
        Box::new(ShapeRenderer),
        Box::new(ImageRenderer),
        Box::new(VectorRenderer),
        Box::new(GroupRenderer),
        Box::new(MediaRenderer),
    ]
}
