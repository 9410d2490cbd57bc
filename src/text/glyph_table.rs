use anyhow::{Context, Result};
use thiserror::Error;

/// Number of codepoints the table can address.
pub const GLYPH_COUNT: usize = 256;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum GlyphError {
    #[error("codepoint {codepoint:#x} is outside the glyph table (0..256)")]
    OutOfRange { codepoint: u32 },
    #[error("no glyph defined for codepoint {codepoint:#x}")]
    Missing { codepoint: u32 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FontError {
    #[error("line {line}: missing `{key}`")]
    MissingKey { line: usize, key: &'static str },
    #[error("line {line}: `{key}` is not an integer: {value:?}")]
    BadNumber {
        line: usize,
        key: &'static str,
        value: String,
    },
}

/// Placement of one glyph in the atlas plus its layout metrics, in atlas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphMetric {
    pub atlas_x: i32,
    pub atlas_y: i32,
    pub width: i32,
    pub height: i32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub x_advance: i32,
}

impl GlyphMetric {
    /// Row order matches the precomputed header form of the table:
    /// `[atlas_x, atlas_y, width, height, x_offset, y_offset, x_advance]`.
    pub const fn from_row(row: [i32; 7]) -> Self {
        Self {
            atlas_x: row[0],
            atlas_y: row[1],
            width: row[2],
            height: row[3],
            x_offset: row[4],
            y_offset: row[5],
            x_advance: row[6],
        }
    }
}

// one of these exists per atlas. it's read-only after construction, so the
// builder can hold it by reference for as long as it likes.
#[derive(Clone, Debug)]
pub struct GlyphTable {
    glyphs: [Option<GlyphMetric>; GLYPH_COUNT],
}

impl GlyphTable {
    pub fn from_rows(rows: &[(u32, [i32; 7])]) -> Result<Self, GlyphError> {
        let mut glyphs = [None; GLYPH_COUNT];
        for (codepoint, row) in rows {
            let slot = glyphs
                .get_mut(*codepoint as usize)
                .ok_or(GlyphError::OutOfRange {
                    codepoint: *codepoint,
                })?;
            *slot = Some(GlyphMetric::from_row(*row));
        }
        Ok(Self { glyphs })
    }

    /// Parses the `char` lines of an AngelCode BMFont text file.
    pub fn from_fnt(source: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for (idx, line) in source.lines().enumerate() {
            let mut tokens = line.split_whitespace();
            if tokens.next() != Some("char") {
                continue;
            }
            let pairs = tokens
                .filter_map(|token| token.split_once('='))
                .collect::<Vec<_>>();
            let line = idx + 1;
            let field = |key: &'static str| -> Result<i32, FontError> {
                let (_, value) = pairs
                    .iter()
                    .find(|(k, _)| *k == key)
                    .ok_or(FontError::MissingKey { line, key })?;
                value.parse().map_err(|_| FontError::BadNumber {
                    line,
                    key,
                    value: value.to_string(),
                })
            };
            let id = field("id")?;
            let codepoint = u32::try_from(id).map_err(|_| FontError::BadNumber {
                line,
                key: "id",
                value: id.to_string(),
            })?;
            rows.push((
                codepoint,
                [
                    field("x")?,
                    field("y")?,
                    field("width")?,
                    field("height")?,
                    field("xoffset")?,
                    field("yoffset")?,
                    field("xadvance")?,
                ],
            ));
        }

        let table = Self::from_rows(&rows).context("Couldn't build glyph table")?;
        log::info!("loaded {} glyphs", table.len());
        Ok(table)
    }

    pub fn lookup(&self, codepoint: u32) -> Result<GlyphMetric, GlyphError> {
        self.glyphs
            .get(codepoint as usize)
            .copied()
            .ok_or(GlyphError::OutOfRange { codepoint })?
            .ok_or(GlyphError::Missing { codepoint })
    }

    /// Fails with the first codepoint of `text` that has no glyph.
    pub fn validate(&self, text: &str) -> Result<(), GlyphError> {
        text.chars()
            .filter(|c| *c != '\n')
            .try_for_each(|c| self.lookup(c as u32).map(|_| ()))
    }

    pub fn len(&self) -> usize {
        self.glyphs.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
