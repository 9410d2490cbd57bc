//! Draws a text file (or this file) with a prebuilt glyph atlas.
//!
//! Needs `source_code_pro.png` and `source_code_pro.fnt` in `assets/`, or in the directory
//! named by `TX_ASSETS`. They aren't checked in. To make them, export Source Code Pro
//! (<https://github.com/adobe-fonts/source-code-pro>) from a BMFont compatible tool such as
//! AngelCode BMFont or libGDX Hiero:
//! - text `.fnt` descriptor, one 512x512 png page, rgba
//! - 32px glyphs, which gives the 38px line height the layout assumes
//! - at least the printable ascii range, anything the drawn text contains
//!
//! Run with `cargo run -p text-demo -- [file]`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use nalgebra::{point, Point2};
use tx::{
    render::Render,
    text::{GlyphTable, TextRenderer},
    texture::Texture,
    window::{make_window, AppLoop},
};
use tx_asset::Loader;
use winit::dpi::PhysicalSize;

// drawn when no file is passed on the command line
const OWN_SOURCE: &str = include_str!("main.rs");

struct DemoConfig {
    assets: PathBuf,
    atlas: PathBuf,
    glyphs: PathBuf,
    text: Option<PathBuf>,
}

impl DemoConfig {
    fn from_env() -> Self {
        Self {
            assets: std::env::var_os("TX_ASSETS")
                .map(PathBuf::from)
                .unwrap_or_else(|| "assets".into()),
            atlas: "source_code_pro.png".into(),
            glyphs: "source_code_pro.fnt".into(),
            text: std::env::args_os().nth(1).map(PathBuf::from),
        }
    }
}

struct TextDemo {
    render: Render,
    text_renderer: TextRenderer,
    content: String,
    origin: Point2<f32>,
}

impl TextDemo {
    fn new(render: Render, config: DemoConfig) -> Result<Self> {
        let mut loader = Loader::with_root(&config.assets);
        let table = GlyphTable::from_fnt(loader.load(&config.glyphs)?.as_str()?)?;
        let atlas = Texture::from_path(loader.path(&config.atlas))?;

        let content = match &config.text {
            Some(path) => Loader::new().load(path)?.as_str()?.to_owned(),
            None => OWN_SOURCE.to_owned(),
        };
        table
            .validate(&content)
            .context("Text can't be drawn with this atlas")?;

        let text_renderer = TextRenderer::new(&render.gpu, render.format(), &atlas, table)?;

        Ok(Self {
            render,
            text_renderer,
            content,
            origin: point![0.0, 0.0],
        })
    }
}

impl AppLoop for TextDemo {
    fn draw(&mut self) -> Result<()> {
        let Some(mut frame) = self.render.begin_frame()? else {
            return Ok(());
        };

        self.text_renderer.draw(
            &self.render.gpu,
            &mut frame.encoder,
            &frame.view,
            frame.viewport,
            &self.content,
            self.origin,
        )?;

        self.render.finish_frame(frame);
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.render.resize(size);
    }
}

fn main() -> Result<()> {
    let config = DemoConfig::from_env();

    make_window()
        .with_title("tx")
        .with_size(640, 480)
        .run(|render| TextDemo::new(render, config))
}
