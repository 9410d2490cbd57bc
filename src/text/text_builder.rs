use nalgebra::Point2;

use crate::{geometry::Geometry, plain::Plain};

use super::glyph_table::{GlyphError, GlyphTable};

/// Vertical pen advance for a newline, in atlas pixels.
pub const DEFAULT_LINE_HEIGHT: f32 = 38.0;
/// The atlas was rasterised at twice the display size (16px == 12pt).
pub const DEFAULT_SCALE: f32 = 0.5;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
}

unsafe impl Plain for TextVertex {}

/// How the right edge of a glyph quad is placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RightEdge {
    /// `pen.x + width`, ignoring the glyph's x offset.
    #[default]
    PenPlusWidth,
    /// `pen.x + x_offset + width`, the same offset as the left edge.
    OffsetPlusWidth,
}

/// Where the pen goes horizontally after a newline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NewlineX {
    /// Column 0, whatever the origin.
    #[default]
    Zero,
    /// The origin's x, so every line starts under the first one.
    Origin,
}

/// Two triangles per glyph, laid out as a flat vertex list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuadBatch {
    pub vertices: Vec<TextVertex>,
}

impl QuadBatch {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl Geometry for QuadBatch {
    fn contents(&self) -> &[u8] {
        self.vertices.as_bytes()
    }

    fn length(&self) -> u32 {
        self.vertices.len() as u32
    }
}

/// Turns text into a [QuadBatch] using a fixed glyph table.
///
/// ```
/// # use tx::text::{glyph_table::GlyphTable, text_builder::TextBuilder};
/// # use nalgebra::point;
/// let table = GlyphTable::from_rows(&[('A' as u32, [10, 20, 8, 12, 1, 2, 9])]).unwrap();
/// let batch = TextBuilder::new(&table, 512.0).build("A", point![0.0, 0.0]).unwrap();
/// assert_eq!(batch.vertices.len(), 6);
/// ```
#[derive(Clone, Debug)]
pub struct TextBuilder<'a> {
    table: &'a GlyphTable,
    atlas_dimension: f32,
    scale: f32,
    line_height: f32,
    right_edge: RightEdge,
    newline_x: NewlineX,
}

impl<'a> TextBuilder<'a> {
    pub fn new(table: &'a GlyphTable, atlas_dimension: f32) -> Self {
        Self {
            table,
            atlas_dimension,
            scale: DEFAULT_SCALE,
            line_height: DEFAULT_LINE_HEIGHT,
            right_edge: RightEdge::default(),
            newline_x: NewlineX::default(),
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }

    pub fn with_right_edge(mut self, right_edge: RightEdge) -> Self {
        self.right_edge = right_edge;
        self
    }

    pub fn with_newline_x(mut self, newline_x: NewlineX) -> Self {
        self.newline_x = newline_x;
        self
    }

    pub fn build(&self, text: &str, origin: Point2<f32>) -> Result<QuadBatch, GlyphError> {
        let glyph_count = text.chars().filter(|c| *c != '\n').count();
        let mut vertices = Vec::with_capacity(glyph_count * 6);
        let mut pen = origin;

        for character in text.chars() {
            if character == '\n' {
                pen.x = match self.newline_x {
                    NewlineX::Zero => 0.0,
                    NewlineX::Origin => origin.x,
                };
                pen.y += self.line_height;
                continue;
            }

            let m = self.table.lookup(character as u32)?;
            let (atlas_x, atlas_y) = (m.atlas_x as f32, m.atlas_y as f32);
            let (w, h) = (m.width as f32, m.height as f32);
            let (x_offset, y_offset) = (m.x_offset as f32, m.y_offset as f32);

            // screen coords, y grows downwards so y1 is the bottom edge
            let rat = self.scale;
            let x1 = rat * (pen.x + x_offset);
            let y1 = rat * (pen.y + y_offset + h);
            let x2 = match self.right_edge {
                RightEdge::PenPlusWidth => rat * (pen.x + w),
                RightEdge::OffsetPlusWidth => rat * (pen.x + x_offset + w),
            };
            let y2 = rat * (pen.y + y_offset);

            // texture coords
            let d = self.atlas_dimension;
            let u1 = atlas_x / d;
            let v1 = (atlas_y + h) / d;
            let u2 = (atlas_x + w) / d;
            let v2 = atlas_y / d;

            let vertex = |x, y, u, v| TextVertex {
                pos: [x, y],
                uv: [u, v],
            };
            vertices.extend_from_slice(&[
                vertex(x1, y1, u1, v1),
                vertex(x2, y1, u2, v1),
                vertex(x2, y2, u2, v2),
                vertex(x1, y1, u1, v1),
                vertex(x2, y2, u2, v2),
                vertex(x1, y2, u1, v2),
            ]);

            pen.x += m.x_advance as f32;
        }

        Ok(QuadBatch { vertices })
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use nalgebra::point;
    use test_log::test;

    use super::*;

    fn table() -> GlyphTable {
        GlyphTable::from_rows(&[
            ('A' as u32, [10, 20, 8, 12, 1, 2, 9]),
            ('B' as u32, [30, 40, 6, 10, 2, 3, 7]),
            (' ' as u32, [0, 0, 0, 0, 0, 0, 19]),
            ('.' as u32, [100, 0, 2, 2, 0, 0, 0]),
        ])
        .unwrap()
    }

    // left edge of each quad, converted back into pen space
    fn pens(batch: &QuadBatch, table: &GlyphTable, text: &str) -> Vec<(f32, f32)> {
        text.chars()
            .filter(|c| *c != '\n')
            .zip(batch.vertices.chunks(6))
            .map(|(c, quad)| {
                let m = table.lookup(c as u32).unwrap();
                (
                    quad[0].pos[0] / DEFAULT_SCALE - m.x_offset as f32,
                    quad[2].pos[1] / DEFAULT_SCALE - m.y_offset as f32,
                )
            })
            .collect()
    }

    #[test]
    fn single_glyph() {
        let table = table();
        let batch = TextBuilder::new(&table, 512.0)
            .build("A", point![0.0, 0.0])
            .unwrap();

        assert_eq!(batch.vertices.len(), 6);
        assert_eq!(
            batch.vertices[0],
            TextVertex {
                pos: [0.5, 7.0],
                uv: [0.01953125, 0.0625],
            }
        );
        // x2 = 0.5 * (0 + 8), y2 = 0.5 * (0 + 2)
        assert_eq!(batch.vertices[2].pos, [4.0, 1.0]);
        assert_eq!(batch.vertices[2].uv, [18.0 / 512.0, 20.0 / 512.0]);
    }

    #[test]
    fn quad_corners_form_two_triangles() {
        let table = table();
        let batch = TextBuilder::new(&table, 512.0)
            .build("A", point![0.0, 0.0])
            .unwrap();
        let q = &batch.vertices;

        assert_eq!(q[0], q[3]);
        assert_eq!(q[2], q[4]);
        // the fourth corner only appears in the second triangle
        assert_eq!(q[5].pos, [q[0].pos[0], q[2].pos[1]]);
        assert_eq!(q[5].uv, [q[0].uv[0], q[2].uv[1]]);
        assert_eq!(q[1].pos, [q[2].pos[0], q[0].pos[1]]);
        assert_eq!(q[1].uv, [q[2].uv[0], q[0].uv[1]]);
    }

    #[test]
    fn right_edge_can_include_offset() {
        let table = table();
        let batch = TextBuilder::new(&table, 512.0)
            .with_right_edge(RightEdge::OffsetPlusWidth)
            .build("A", point![0.0, 0.0])
            .unwrap();

        assert_eq!(batch.vertices[1].pos[0], 4.5);
        assert_eq!(batch.vertices[0].pos[0], 0.5);
    }

    #[test]
    fn scale_multiplies_positions_only() {
        let table = table();
        let batch = TextBuilder::new(&table, 512.0)
            .with_scale(1.0)
            .build("AB", point![0.0, 0.0])
            .unwrap();

        assert_eq!(batch.vertices[0].pos, [1.0, 14.0]);
        assert_eq!(batch.vertices[0].uv, [10.0 / 512.0, 32.0 / 512.0]);
        // B starts one advance of A along
        assert_eq!(batch.vertices[6].pos, [11.0, 13.0]);
    }

    #[test]
    fn empty_text() {
        let table = table();
        let batch = TextBuilder::new(&table, 512.0)
            .build("", point![0.0, 0.0])
            .unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.length(), 0);
        assert!(batch.contents().is_empty());
    }

    #[test]
    fn six_vertices_per_visible_character() {
        let table = table();
        let builder = TextBuilder::new(&table, 512.0);
        for text in ["A", "AB", "A\nB", "\n\n", "A B.\n\nBA ", "AAAAAAAAAA"] {
            let batch = builder.build(text, point![3.0, 4.0]).unwrap();
            let visible = text.chars().filter(|c| *c != '\n').count();
            assert_eq!(batch.vertices.len(), 6 * visible, "{text:?}");
            assert_eq!(batch.contents().len(), 6 * visible * 16);
        }
    }

    #[test]
    fn newline_moves_pen_down_and_back() {
        let table = table();
        let text = "AB\nB";
        let batch = TextBuilder::new(&table, 512.0)
            .build(text, point![0.0, 0.0])
            .unwrap();

        assert_eq!(batch.vertices.len(), 18);
        assert_eq!(
            pens(&batch, &table, text),
            vec![(0.0, 0.0), (9.0, 0.0), (0.0, 38.0)]
        );
    }

    #[test]
    fn newline_returns_to_column_zero() {
        let table = table();
        let text = "A\nA";
        let batch = TextBuilder::new(&table, 512.0)
            .build(text, point![6.0, 0.0])
            .unwrap();

        assert_eq!(pens(&batch, &table, text), vec![(6.0, 0.0), (0.0, 38.0)]);
        // 0.5 * (0 + x_offset)
        assert_eq!(batch.vertices[6].pos[0], 0.5);
    }

    #[test]
    fn newline_can_return_to_origin_column() {
        let table = table();
        let text = "A\nA\n\nA";
        let batch = TextBuilder::new(&table, 512.0)
            .with_newline_x(NewlineX::Origin)
            .with_line_height(10.0)
            .build(text, point![6.0, 2.0])
            .unwrap();

        assert_eq!(
            pens(&batch, &table, text),
            vec![(6.0, 2.0), (6.0, 12.0), (6.0, 32.0)]
        );
    }

    #[test]
    fn pen_advances_within_a_line() {
        let table = table();
        let text = "AB .A";
        let batch = TextBuilder::new(&table, 512.0)
            .build(text, point![0.0, 0.0])
            .unwrap();

        let xs = pens(&batch, &table, text)
            .into_iter()
            .map(|(x, _)| x)
            .collect_vec();
        assert_eq!(xs, vec![0.0, 9.0, 16.0, 35.0, 35.0]);
        assert!(xs.iter().tuple_windows().all(|(a, b)| a <= b));
    }

    #[test]
    fn texture_coordinates_stay_in_the_atlas() {
        let table = table();
        let batch = TextBuilder::new(&table, 512.0)
            .build("AB .\nB A", point![100.0, 100.0])
            .unwrap();

        assert!(batch
            .vertices
            .iter()
            .flat_map(|v| v.uv)
            .all(|c| (0.0..=1.0).contains(&c)));
    }

    #[test]
    fn same_input_same_batch() {
        let table = table();
        let builder = TextBuilder::new(&table, 512.0);
        let a = builder.build("AB\nA B", point![1.0, 2.0]).unwrap();
        let b = builder.build("AB\nA B", point![1.0, 2.0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_characters_fail() {
        let table = table();
        let builder = TextBuilder::new(&table, 512.0);
        assert_eq!(
            builder.build("AC", point![0.0, 0.0]),
            Err(GlyphError::Missing { codepoint: 'C' as u32 })
        );
        assert_eq!(
            builder.build("A\u{e9}\u{263a}", point![0.0, 0.0]),
            Err(GlyphError::Missing { codepoint: 0xe9 })
        );
        assert_eq!(
            builder.build("\u{263a}", point![0.0, 0.0]),
            Err(GlyphError::OutOfRange { codepoint: 0x263a })
        );
    }
}
