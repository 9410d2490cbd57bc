use anyhow::Result;
use wgpu::{
    vertex_attr_array, AddressMode, BufferUsages, FilterMode, RenderPipeline, SamplerBindingType,
    SamplerDescriptor, ShaderStages, TextureFormat, TextureSampleType, TextureUsages,
    TextureViewDimension,
};

use crate::{
    bind::{Bind, BindEntry, BindEntryType},
    camera::CameraUniform,
    pipeline::PipelineBuilder,
    render::Gpu,
    texture::Texture,
};

use super::text_builder::TextVertex;

pub const CAMERA_BINDING: u32 = 0;
pub const ATLAS_BINDING: u32 = 1;

/// Builds the text pipeline and its bind group, and uploads `atlas` into it.
///
/// Group 0 holds the projection uniform, the atlas texture and its sampler.
pub fn text_pipeline(
    gpu: &Gpu,
    format: TextureFormat,
    atlas: &Texture,
) -> Result<(RenderPipeline, Bind)> {
    let bind = Bind::new(
        &[
            // camera
            BindEntry {
                visibility: ShaderStages::VERTEX,
                ty: BindEntryType::BufferUniform {
                    size: std::mem::size_of::<CameraUniform>() as u64,
                    usages: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
                },
                count: None,
            },
            // glyph atlas
            BindEntry {
                visibility: ShaderStages::FRAGMENT,
                ty: BindEntryType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                    view_dimension: TextureViewDimension::D2,
                    format: TextureFormat::Rgba8UnormSrgb,
                    size: atlas.extent(),
                    usage: TextureUsages::COPY_DST | TextureUsages::TEXTURE_BINDING,
                },
                count: None,
            },
            // sampler
            BindEntry {
                visibility: ShaderStages::FRAGMENT,
                ty: BindEntryType::Sampler {
                    binding_type: SamplerBindingType::Filtering,
                    descriptor: SamplerDescriptor {
                        label: Some("glyph atlas"),
                        address_mode_u: AddressMode::ClampToEdge,
                        address_mode_v: AddressMode::ClampToEdge,
                        mag_filter: FilterMode::Linear,
                        min_filter: FilterMode::Linear,
                        ..Default::default()
                    },
                },
                count: None,
            },
        ],
        &gpu.device,
    );

    let (atlas_texture, _) = bind.resource(ATLAS_BINDING).texture_view();
    atlas.write_to(gpu, atlas_texture);

    let pipeline = PipelineBuilder::new()
        .with_label("text")
        .with_format(format)
        .with_cull_mode(None)
        .with_bind(&bind.bgl)
        .with_shader(include_str!("../shaders/text.wgsl"))
        .with_vb::<TextVertex>(
            wgpu::VertexStepMode::Vertex,
            &vertex_attr_array![
                // position + uv
                0 => Float32x4,
            ],
        )
        .build(&gpu.device)?;

    Ok((pipeline, bind))
}
