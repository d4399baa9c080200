use std::mem::size_of;

use bytemuck::{bytes_of, cast_slice, Pod, Zeroable};
use glam::{Mat4, Vec4};
use log::debug;
use wgpu::util::DeviceExt;

use crate::{
    backdrop::{Layer, LayerDescriptor},
    transform_buffer::InstanceRaw,
};

use super::{
    mesh::{Mesh, Vertex},
    render_target::DEPTH_TEXTURE_FORMAT,
};

const DEFAULT_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

// Model matrix columns, then color.
const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    2 => Float32x4,
    3 => Float32x4,
    4 => Float32x4,
    5 => Float32x4,
    6 => Float32x4
];

#[derive(Debug, Copy, Clone, Default, Pod, Zeroable)]
#[repr(C)]
struct Uniforms {
    view_proj: Mat4,
    group: Mat4,
    camera_position: Vec4,
    light_position: Vec4,
    fill_light: Vec4,
    lighting: Vec4,
    tint: Vec4,
}

impl Uniforms {
    fn new(layer: &Layer) -> Self {
        let Layer {
            view_proj,
            camera_position,
            lighting,
            material,
            group,
            ..
        } = layer;

        Self {
            view_proj: *view_proj,
            group: *group,
            camera_position: camera_position.extend(1.),
            light_position: lighting.point_position.extend(1.),
            fill_light: lighting.fill_position.extend(lighting.fill_intensity),
            lighting: Vec4::new(
                lighting.ambient,
                lighting.point_intensity,
                material.roughness,
                material.metalness,
            ),
            tint: material.color.extend(material.emissive),
        }
    }
}

/// Draws one mesh many times, one instance per transform buffer slot.
pub struct InstancedMeshRenderer {
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
    bind_group: wgpu::BindGroup,
    render_pipeline: wgpu::RenderPipeline,
}

impl InstancedMeshRenderer {
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    /// Uploads the layer's uniforms, and its instances when they changed since the last upload.
    pub fn update(&self, queue: &wgpu::Queue, layer: &mut Layer) {
        queue.write_buffer(&self.uniform_buffer, 0, bytes_of(&Uniforms::new(layer)));

        if layer.instances.take_dirty() {
            let instances = layer.instances.raw_instances();
            let count = instances.len().min(self.instance_count as usize);
            queue.write_buffer(&self.instance_buffer, 0, cast_slice(&instances[..count]));
        }
    }

    pub fn draw<'rpass>(&'rpass self, rpass: &mut impl wgpu::util::RenderEncoder<'rpass>) {
        if self.instance_count == 0 {
            return;
        }
        rpass.set_pipeline(&self.render_pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..self.index_count, 0, 0..self.instance_count);
    }
}

pub struct InstancedMeshRendererBuilder<'a> {
    descriptor: &'a LayerDescriptor,
    color_format: Option<wgpu::TextureFormat>,
    depth_format: Option<wgpu::TextureFormat>,
}

impl<'a> InstancedMeshRendererBuilder<'a> {
    pub fn new(descriptor: &'a LayerDescriptor) -> Self {
        Self {
            descriptor,
            color_format: None,
            depth_format: None,
        }
    }

    pub fn color_target_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.color_format = Some(format);
        self
    }

    pub fn depth_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    pub fn build(self, device: &wgpu::Device) -> InstancedMeshRenderer {
        let descriptor = self.descriptor;
        let color_format = self.color_format.unwrap_or(DEFAULT_COLOR_FORMAT);
        let depth_format = self.depth_format.unwrap_or(DEPTH_TEXTURE_FORMAT);

        let mesh = Mesh::from_shape(descriptor.shape);
        debug!(
            "Building instanced layer: {:?}, {} vertices, {} instances",
            descriptor.shape,
            mesh.vertices.len(),
            descriptor.capacity
        );

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instanced Mesh Vertex Buffer"),
            contents: cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instanced Mesh Index Buffer"),
            contents: cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: None,
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(size_of::<Uniforms>() as _),
                },
                count: None,
            }],
        });

        let shader_module = device.create_shader_module(&wgpu::include_wgsl!("instanced.wgsl"));

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: None,
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Instanced Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "vs_main",
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: size_of::<Vertex>() as _,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &VERTEX_ATTRIBUTES,
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: size_of::<InstanceRaw>() as _,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &INSTANCE_ATTRIBUTES,
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "fs_main",
                targets: &[color_format.into()],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        // A zero-sized vertex buffer can't be bound, so keep room for one instance.
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instanced Mesh Instance Buffer"),
            size: (descriptor.capacity.max(1) * size_of::<InstanceRaw>()) as _,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instanced Mesh Uniform Buffer"),
            size: size_of::<Uniforms>() as _,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        InstancedMeshRenderer {
            uniform_buffer,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as _,
            instance_buffer,
            instance_count: descriptor.capacity as _,
            bind_group,
            render_pipeline,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::{
        entity::{Camera, Lighting, Material},
        transform_buffer::TransformBuffer,
    };

    #[test]
    fn uniform_layout_has_no_padding() {
        assert_eq!(size_of::<Uniforms>(), 2 * 64 + 5 * 16);
        assert_eq!(size_of::<InstanceRaw>(), 80);
        assert_eq!(size_of::<Vertex>(), 24);
    }

    #[test]
    fn attributes_follow_instance_layout() {
        let offsets: Vec<_> = INSTANCE_ATTRIBUTES.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 16, 32, 48, 64]);
        assert_eq!(VERTEX_ATTRIBUTES[1].offset, 12);
    }

    #[test]
    fn uniforms_pack_lighting_and_material() {
        let camera = Camera::looking_at_origin(60., 1.);
        let mut instances = TransformBuffer::with_capacity(1);
        let layer = Layer {
            view_proj: camera.view_proj_matrix(),
            camera_position: camera.position,
            lighting: Lighting::FIELD,
            material: Material::CHROME.with_emissive(0.2),
            group: Mat4::IDENTITY,
            instances: &mut instances,
        };
        let uniforms = Uniforms::new(&layer);
        assert_eq!(uniforms.camera_position, Vec4::new(0., 0., 8., 1.));
        assert_eq!(uniforms.lighting, Vec4::new(0.55, 1.0, 0.1, 0.8));
        assert_eq!(uniforms.tint, Vec3::ONE.extend(0.2));
        assert_eq!(uniforms.fill_light.w, 0.);
    }

    #[test]
    fn accent_fill_light_opposes_key_light() {
        let camera = Camera::looking_at_origin(45., 1.);
        let mut instances = TransformBuffer::with_capacity(1);
        let layer = Layer {
            view_proj: camera.view_proj_matrix(),
            camera_position: camera.position,
            lighting: Lighting::ACCENT,
            material: Material::CHROME,
            group: Mat4::IDENTITY,
            instances: &mut instances,
        };
        let uniforms = Uniforms::new(&layer);
        assert_eq!(uniforms.fill_light, Vec4::new(-10., -10., -10., 0.45));
        assert_eq!(
            uniforms.fill_light.truncate(),
            -uniforms.light_position.truncate()
        );
    }
}
