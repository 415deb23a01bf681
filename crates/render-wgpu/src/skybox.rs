use cityview_assets::CubeMap;
use wgpu::util::DeviceExt;

use crate::mesh::upload_texture;
use crate::pipeline::{
    depth_stencil_state, opaque_target, sampler_entry, texture_entry, uniform_buffer,
    uniform_entry,
};
use crate::shaders;
use crate::uniforms::MatrixBlock;

/// Unit cube corners and the 36 indices of its inward-facing triangles.
fn sky_cube() -> ([[f32; 3]; 8], [u16; 36]) {
    let p = 1.0_f32;
    #[rustfmt::skip]
    let corners = [
        [-p, -p, -p], [ p, -p, -p], [ p,  p, -p], [-p,  p, -p],
        [-p, -p,  p], [ p, -p,  p], [ p,  p,  p], [-p,  p,  p],
    ];
    #[rustfmt::skip]
    let indices = [
        0,1,2, 2,3,0,  // -Z
        4,6,5, 6,4,7,  // +Z
        0,3,7, 7,4,0,  // -X
        1,5,6, 6,2,1,  // +X
        3,2,6, 6,7,3,  // +Y
        0,4,5, 5,1,0,  // -Y
    ];
    (corners, indices)
}

pub struct Skybox {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl Skybox {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        cube_map: &CubeMap,
    ) -> Self {
        let layers: Vec<_> = cube_map.faces.iter().collect();
        let texture = upload_texture(device, queue, "skybox_texture", &layers);
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("skybox_view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("skybox_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skybox_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX),
                texture_entry(
                    1,
                    wgpu::TextureSampleType::Float { filterable: true },
                    wgpu::TextureViewDimension::Cube,
                ),
                sampler_entry(2, wgpu::SamplerBindingType::Filtering),
            ],
        });
        let uniform_buffer = uniform_buffer(
            device,
            "skybox_uniforms",
            &MatrixBlock::from(glam::Mat4::IDENTITY),
        );
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skybox_bind_group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skybox_pipeline_layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("skybox_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SKYBOX_SHADER.into()),
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("skybox_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_sky"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_sky"),
                compilation_options: Default::default(),
                targets: &[Some(opaque_target(surface_format))],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            // far-plane fragments must pass against a cleared depth of 1.0
            depth_stencil: Some(depth_stencil_state(wgpu::CompareFunction::LessEqual, false)),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let (corners, indices) = sky_cube();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skybox_vertices"),
            contents: bytemuck::cast_slice(&corners),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skybox_indices"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        tracing::debug!(size = cube_map.size, "skybox uploaded");
        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    pub fn write_view_projection(&self, queue: &wgpu::Queue, view_projection: glam::Mat4) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&MatrixBlock::from(view_projection)),
        );
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
