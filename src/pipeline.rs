use anyhow::{anyhow, Context, Result};
use wgpu::{
    BindGroupLayout, BlendState, ColorTargetState, ColorWrites, Device, ErrorFilter, Face,
    FragmentState, MultisampleState, PipelineCompilationOptions, PipelineLayoutDescriptor,
    PrimitiveState, PrimitiveTopology, RenderPipeline, RenderPipelineDescriptor,
    ShaderModuleDescriptor, TextureFormat, VertexAttribute, VertexState, VertexStepMode,
};

use crate::bind::VertexBufferEntry;

/// Bundles the creation of a [wgpu::RenderPipeline] and its [wgpu::ShaderModule].
///
/// The shader must expose `vertex` and `fragment` entry points.
/// ```ignore
/// let pipeline = PipelineBuilder::new()
///     .with_shader(include_str!("shaders/text.wgsl"))
///     .with_bind(&bind.bgl)
///     .build(&gpu.device)?;
/// ```
pub struct PipelineBuilder<'a> {
    label: Option<&'a str>,
    bgls: Vec<&'a BindGroupLayout>,
    shader_src: Option<String>,
    primitive_state: PrimitiveState,
    format: TextureFormat,
    blend: Option<BlendState>,
    vertex_entries: Vec<VertexBufferEntry>,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new() -> Self {
        Self {
            label: None,
            bgls: Vec::new(),
            shader_src: None,
            primitive_state: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            format: TextureFormat::Bgra8UnormSrgb,
            blend: Some(BlendState::ALPHA_BLENDING),
            vertex_entries: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_cull_mode(mut self, cull_mode: Option<Face>) -> Self {
        self.primitive_state.cull_mode = cull_mode;
        self
    }

    pub fn with_shader(mut self, shader_src: &str) -> Self {
        self.shader_src = Some(shader_src.into());
        self
    }

    pub fn with_format(mut self, format: TextureFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_bind(mut self, bgl: &'a BindGroupLayout) -> Self {
        self.bgls.push(bgl);
        self
    }

    pub fn with_vb<T>(mut self, step_mode: VertexStepMode, attributes: &[VertexAttribute]) -> Self {
        self.vertex_entries.push(VertexBufferEntry {
            array_stride: std::mem::size_of::<T>() as u64,
            step_mode,
            attributes: attributes.into(),
        });
        self
    }

    /// Shader compilation and pipeline validation errors are returned
    /// instead of going to the device's uncaptured error handler.
    pub fn build(&self, device: &Device) -> Result<RenderPipeline> {
        let shader_src = self
            .shader_src
            .as_deref()
            .ok_or(anyhow!("Shader source should be set."))?;

        device.push_error_scope(ErrorFilter::Validation);

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: self.label,
            bind_group_layouts: &self.bgls,
            push_constant_ranges: &[],
        });

        let module = device.create_shader_module(ShaderModuleDescriptor {
            label: self.label,
            source: wgpu::ShaderSource::Wgsl(shader_src.into()),
        });

        let vbs = self
            .vertex_entries
            .iter()
            .map(|ent| ent.layout())
            .collect::<Vec<_>>();

        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: self.label,
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &module,
                entry_point: "vertex",
                buffers: vbs.as_slice(),
                compilation_options: PipelineCompilationOptions::default(),
            },
            primitive: self.primitive_state,
            depth_stencil: None,
            multisample: MultisampleState::default(),
            fragment: Some(FragmentState {
                module: &module,
                entry_point: "fragment",
                targets: &[Some(ColorTargetState {
                    format: self.format,
                    blend: self.blend,
                    write_mask: ColorWrites::all(),
                })],
                compilation_options: PipelineCompilationOptions::default(),
            }),
            multiview: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(anyhow!("{err}")).context(format!(
                "Couldn't build pipeline {}",
                self.label.unwrap_or("<unnamed>")
            ));
        }
        log::debug!("built pipeline {}", self.label.unwrap_or("<unnamed>"));

        Ok(pipeline)
    }
}

impl Default for PipelineBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}
