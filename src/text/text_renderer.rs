use anyhow::Result;
use nalgebra::Point2;
use wgpu::{
    util::{BufferInitDescriptor, DeviceExt},
    Buffer, BufferUsages, CommandEncoder, LoadOp, Operations, RenderPassColorAttachment,
    RenderPassDescriptor, RenderPipeline, StoreOp, TextureFormat, TextureView,
};

use crate::{
    bind::Bind,
    camera::{Camera, CameraUniform},
    geometry::Geometry,
    plain::Plain,
    render::{Gpu, Viewport},
    texture::Texture,
};

use super::{
    glyph_table::{GlyphError, GlyphTable},
    pipeline::{text_pipeline, CAMERA_BINDING},
    text_builder::{QuadBatch, TextBuilder, TextVertex},
};

/// The cpu half of a [TextRenderer].
#[derive(Clone, Debug)]
struct Layout {
    table: GlyphTable,
    atlas_dimension: f32,
    // viewport the projection uniform was last written for
    viewport: Option<Viewport>,
}

/// Everything one draw uploads.
#[derive(Debug)]
struct Prepared {
    batch: QuadBatch,
    // only set when the viewport changed since the last draw
    projection: Option<CameraUniform>,
}

impl Layout {
    fn new(table: GlyphTable, atlas_dimension: f32) -> Self {
        Self {
            table,
            atlas_dimension,
            viewport: None,
        }
    }

    fn prepare(
        &mut self,
        viewport: Viewport,
        text: &str,
        origin: Point2<f32>,
    ) -> Result<Prepared, GlyphError> {
        let batch = TextBuilder::new(&self.table, self.atlas_dimension).build(text, origin)?;
        assert_eq!(
            batch.contents().len(),
            batch.length() as usize * std::mem::size_of::<TextVertex>(),
            "quad batch vertex count doesn't match its data"
        );

        if viewport.is_empty() {
            log::debug!(
                "skipping text for a {}x{} viewport",
                viewport.width,
                viewport.height
            );
            return Ok(Prepared {
                batch: QuadBatch::default(),
                projection: None,
            });
        }

        let projection = (self.viewport != Some(viewport))
            .then(|| Camera::screen(viewport.width, viewport.height).uniform());
        self.viewport = Some(viewport);
        Ok(Prepared { batch, projection })
    }
}

/// Owns the gpu objects needed to draw text from one atlas.
pub struct TextRenderer {
    pipeline: RenderPipeline,
    bind: Bind,
    layout: Layout,
    vertex_buffer: Option<Buffer>,
}

impl TextRenderer {
    pub fn new(
        gpu: &Gpu,
        format: TextureFormat,
        atlas: &Texture,
        table: GlyphTable,
    ) -> Result<Self> {
        let (pipeline, bind) = text_pipeline(gpu, format, atlas)?;
        Ok(Self {
            pipeline,
            bind,
            layout: Layout::new(table, atlas.dimension()),
            vertex_buffer: None,
        })
    }

    /// Lays out `text` at `origin` and records a draw of it into `target`.
    /// Returns the number of vertices drawn, 0 for empty text or an empty viewport.
    pub fn draw(
        &mut self,
        gpu: &Gpu,
        encoder: &mut CommandEncoder,
        target: &TextureView,
        viewport: Viewport,
        text: &str,
        origin: Point2<f32>,
    ) -> Result<u32> {
        let Prepared { batch, projection } = self.layout.prepare(viewport, text, origin)?;

        if let Some(uniform) = projection {
            gpu.queue.write_buffer(
                self.bind.resource(CAMERA_BINDING).buffer(),
                0,
                uniform.as_bytes(),
            );
        }

        // the previous frame's buffer stays alive until the gpu is done with it
        self.vertex_buffer = None;
        if batch.is_empty() {
            return Ok(0);
        }

        let vertex_count = batch.length();
        let vertex_buffer = gpu.device.create_buffer_init(&BufferInitDescriptor {
            label: Some("text vertices"),
            contents: batch.contents(),
            usage: BufferUsages::VERTEX,
        });

        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("text"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Load,
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.bind.bg, &[]);
            rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
            rpass.draw(0..vertex_count, 0..1);
            // bindings end with the pass
        }

        log::trace!("drew {} glyphs", vertex_count / 6);
        self.vertex_buffer = Some(vertex_buffer);
        Ok(vertex_count)
    }

    /// Releases the atlas and the projection uniform now rather than when they're dropped.
    ///
    /// Every encoder that recorded a draw with this renderer has to be submitted first,
    /// a submit that uses a destroyed resource fails validation.
    pub fn destroy(self) {
        // dropped, not destroyed, the last draw may still be queued
        drop(self.vertex_buffer);
        self.bind.destroy();
    }
}
