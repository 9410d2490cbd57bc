use std::num::NonZeroU32;

use itertools::Itertools;
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, Buffer, BufferBinding, BufferDescriptor, BufferUsages, Device, Extent3d,
    Sampler, SamplerBindingType, SamplerDescriptor, ShaderStages, Texture, TextureDescriptor,
    TextureFormat, TextureSampleType, TextureUsages, TextureView, TextureViewDescriptor,
    TextureViewDimension, VertexAttribute, VertexBufferLayout, VertexStepMode,
};

#[derive(Clone, Debug)]
pub enum BindEntryType<'a> {
    BufferUniform {
        size: u64,
        usages: BufferUsages,
    },
    Sampler {
        binding_type: SamplerBindingType,
        descriptor: SamplerDescriptor<'a>,
    },
    Texture {
        sample_type: TextureSampleType,
        view_dimension: TextureViewDimension,
        format: TextureFormat,
        size: Extent3d,
        usage: TextureUsages,
    },
}

#[derive(Debug)]
pub enum BindEntryResource {
    Buffer(Buffer),
    Texture(Texture, TextureView),
    Sampler(Sampler),
}

impl BindEntryResource {
    pub fn buffer(&self) -> &Buffer {
        match self {
            BindEntryResource::Buffer(buffer) => buffer,
            _ => unreachable!(),
        }
    }
    pub fn texture_view(&self) -> (&Texture, &TextureView) {
        match self {
            BindEntryResource::Texture(texture, view) => (texture, view),
            _ => unreachable!(),
        }
    }

    fn binding_resource(&self) -> wgpu::BindingResource {
        match self {
            BindEntryResource::Buffer(buffer) => wgpu::BindingResource::Buffer(BufferBinding {
                buffer,
                offset: 0,
                size: None,
            }),
            BindEntryResource::Texture(_, view) => wgpu::BindingResource::TextureView(view),
            BindEntryResource::Sampler(sampler) => wgpu::BindingResource::Sampler(sampler),
        }
    }

    fn destroy(&self) {
        match self {
            BindEntryResource::Buffer(buffer) => buffer.destroy(),
            BindEntryResource::Texture(texture, _) => texture.destroy(),
            BindEntryResource::Sampler(_) => {}
        }
    }
}

#[derive(Clone, Debug)]
pub struct BindEntry<'a> {
    pub visibility: ShaderStages,
    pub ty: BindEntryType<'a>,
    pub count: Option<NonZeroU32>,
}

impl<'a> BindEntry<'a> {
    pub fn layout_entry(&self, binding: u32) -> BindGroupLayoutEntry {
        BindGroupLayoutEntry {
            binding,
            visibility: self.visibility,
            ty: match &self.ty {
                BindEntryType::BufferUniform { .. } => wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                BindEntryType::Sampler { binding_type, .. } => {
                    wgpu::BindingType::Sampler(*binding_type)
                }
                BindEntryType::Texture {
                    sample_type,
                    view_dimension,
                    ..
                } => wgpu::BindingType::Texture {
                    sample_type: *sample_type,
                    view_dimension: *view_dimension,
                    multisampled: false,
                },
            },
            count: self.count,
        }
    }

    pub fn binding_resource(&self, device: &Device) -> BindEntryResource {
        match &self.ty {
            BindEntryType::BufferUniform { size, usages } => {
                BindEntryResource::Buffer(device.create_buffer(&BufferDescriptor {
                    label: None,
                    size: *size,
                    usage: *usages,
                    mapped_at_creation: false,
                }))
            }
            BindEntryType::Sampler { descriptor, .. } => {
                BindEntryResource::Sampler(device.create_sampler(descriptor))
            }
            BindEntryType::Texture {
                view_dimension,
                format,
                size,
                usage,
                ..
            } => {
                let texture = device.create_texture(&TextureDescriptor {
                    label: None,
                    size: *size,
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: view_dimension.compatible_texture_dimension(),
                    format: *format,
                    usage: *usage,
                    view_formats: &[],
                });
                let view = texture.create_view(&TextureViewDescriptor::default());
                BindEntryResource::Texture(texture, view)
            }
        }
    }
}

/// A bind group together with the resources it was created over.
/// Binding `n` in the layout is `resources[n]`.
#[derive(Debug)]
pub struct Bind {
    pub bg: BindGroup,
    pub bgl: BindGroupLayout,
    pub resources: Vec<BindEntryResource>,
}

impl Bind {
    pub fn new(bind_entries: &[BindEntry], device: &Device) -> Self {
        let layout_entries = bind_entries
            .iter()
            .enumerate()
            .map(|(idx, g)| g.layout_entry(idx as u32))
            .collect_vec();

        let bgl = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: None,
            entries: &layout_entries,
        });
        let resources = bind_entries
            .iter()
            .map(|g| g.binding_resource(device))
            .collect_vec();

        let group_entries = resources
            .iter()
            .enumerate()
            .map(|(idx, resource)| BindGroupEntry {
                binding: idx as u32,
                resource: resource.binding_resource(),
            })
            .collect_vec();
        let bg = device.create_bind_group(&BindGroupDescriptor {
            label: None,
            layout: &bgl,
            entries: &group_entries,
        });

        Self {
            bg,
            bgl,
            resources,
        }
    }

    pub fn resource(&self, binding: u32) -> &BindEntryResource {
        &self.resources[binding as usize]
    }

    /// Frees buffers and textures now instead of when the last reference drops.
    pub fn destroy(self) {
        self.resources.iter().for_each(BindEntryResource::destroy);
    }
}

pub struct VertexBufferEntry {
    pub array_stride: u64,
    pub step_mode: VertexStepMode,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexBufferEntry {
    pub fn layout(&self) -> VertexBufferLayout {
        VertexBufferLayout {
            array_stride: self.array_stride,
            step_mode: self.step_mode,
            attributes: self.attributes.as_slice(),
        }
    }
}
