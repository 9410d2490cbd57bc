// text drawing, kept simple:
// - glyph metrics come precomputed alongside a prebuilt atlas image
// - every frame the whole string is laid out again into textured quads
// - one vertex buffer, one draw call

pub mod glyph_table;
pub mod pipeline;
pub mod text_builder;
pub mod text_renderer;

pub use glyph_table::{GlyphError, GlyphMetric, GlyphTable};
pub use text_builder::{NewlineX, QuadBatch, RightEdge, TextBuilder, TextVertex};
pub use text_renderer::TextRenderer;
