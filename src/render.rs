use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use wgpu::{
    Adapter, Color, CommandEncoder, CommandEncoderDescriptor, Device, DeviceDescriptor, Features,
    Instance, Limits, LoadOp, Operations, PresentMode, Queue, RenderPassColorAttachment,
    RenderPassDescriptor, RequestAdapterOptions, StoreOp, Surface, SurfaceConfiguration,
    SurfaceError, SurfaceTexture, TextureFormat, TextureView, TextureViewDescriptor,
};
use winit::{dpi::PhysicalSize, window::Window};

/// Device and queue, shared by everything that creates gpu resources.
pub struct Gpu {
    pub device: Device,
    pub queue: Queue,
}

impl Gpu {
    /// Requests a device from `adapter`.
    pub fn request(adapter: &Adapter) -> Result<Self> {
        let (device, queue) = pollster::block_on(adapter.request_device(
            &DeviceDescriptor {
                label: None,
                required_features: Features::empty(),
                // text needs very little, so this runs on gl-only machines too
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
            },
            None,
        ))
        .context("Couldn't create device")?;
        Ok(Self { device, queue })
    }

    /// A device without a surface, for offscreen rendering.
    /// Returns `None` when the machine has no usable adapter.
    pub fn headless() -> Result<Option<Self>> {
        let instance = Instance::default();
        let Some(adapter) = pollster::block_on(instance.request_adapter(&RequestAdapterOptions {
            compatible_surface: None,
            ..Default::default()
        })) else {
            return Ok(None);
        };
        Self::request(&adapter).map(Some)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// A zero sized viewport, e.g. a minimised window. Nothing can be drawn into it.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A surface texture being drawn into. Finished with [Render::finish_frame].
pub struct Frame {
    pub encoder: CommandEncoder,
    pub view: TextureView,
    pub viewport: Viewport,
    texture: SurfaceTexture,
}

pub struct Render {
    surface: Surface<'static>,
    config: SurfaceConfiguration,
    pub gpu: Gpu,
}

impl Render {
    pub fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();
        let instance = Instance::default();

        let surface = instance
            .create_surface(window)
            .context("Couldn't create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&RequestAdapterOptions {
            compatible_surface: Some(&surface),
            ..Default::default()
        }))
        .ok_or(anyhow!("No suitable adapter found."))?;
        let info = adapter.get_info();
        log::info!("using {} ({:?})", info.name, info.backend);

        let gpu = Gpu::request(&adapter)?;

        let mut config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or(anyhow!("Surface isn't supported by the adapter."))?;
        config.present_mode = PresentMode::Fifo;
        surface.configure(&gpu.device, &config);
        log::info!("surface format {:?}", config.format);

        Ok(Self {
            surface,
            config,
            gpu,
        })
    }

    pub fn format(&self) -> TextureFormat {
        self.config.format
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.config.width,
            height: self.config.height,
        }
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        log::debug!("resizing surface to {}x{}", size.width, size.height);
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.gpu.device, &self.config);
    }

    /// Acquires the next surface texture and clears it.
    /// Returns `None` when the surface had to be reconfigured; skip the frame.
    pub fn begin_frame(&mut self) -> Result<Option<Frame>> {
        let texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                self.surface.configure(&self.gpu.device, &self.config);
                return Ok(None);
            }
            Err(err) => return Err(err).context("Couldn't acquire surface texture"),
        };

        let view = texture
            .texture
            .create_view(&TextureViewDescriptor::default());
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&CommandEncoderDescriptor::default());

        clear(&mut encoder, &view, Color::BLACK);

        Ok(Some(Frame {
            encoder,
            view,
            viewport: self.viewport(),
            texture,
        }))
    }

    pub fn finish_frame(&self, frame: Frame) {
        self.gpu.queue.submit([frame.encoder.finish()]);
        frame.texture.present();
    }
}

pub fn clear(encoder: &mut CommandEncoder, view: &TextureView, color: Color) {
    // the pass is dropped straight away, all it does is the clear
    encoder.begin_render_pass(&RenderPassDescriptor {
        label: Some("clear"),
        color_attachments: &[Some(RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: Operations {
                load: LoadOp::Clear(color),
                store: StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
}
