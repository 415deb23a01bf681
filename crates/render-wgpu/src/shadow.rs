use crate::pipeline::{
    DEPTH_FORMAT, depth_texture, lit_primitive_state, mesh_position_layout, uniform_buffer,
    uniform_entry,
};
use crate::shaders;
use crate::uniforms::MatrixBlock;

/// Off-screen depth target rendered from the directional light.
pub struct ShadowMap {
    pipeline: wgpu::RenderPipeline,
    light_buffer: wgpu::Buffer,
    light_bind_group: wgpu::BindGroup,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    size: u32,
}

impl ShadowMap {
    pub fn new(device: &wgpu::Device, object_layout: &wgpu::BindGroupLayout, size: u32) -> Self {
        let max = device.limits().max_texture_dimension_2d;
        let size = if size > max {
            tracing::warn!(requested = size, max, "shadow map clamped to device limit");
            max
        } else {
            size.max(1)
        };

        let light_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow_light_layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });
        let light_buffer = uniform_buffer(
            device,
            "shadow_light_buffer",
            &MatrixBlock::from(glam::Mat4::IDENTITY),
        );
        let light_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow_light_bind_group"),
            layout: &light_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: light_buffer.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shadow_pipeline_layout"),
            bind_group_layouts: &[&light_layout, object_layout],
            push_constant_ranges: &[],
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("depth_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::DEPTH_SHADER.into()),
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow_pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_depth"),
                compilation_options: Default::default(),
                buffers: &[mesh_position_layout()],
            },
            fragment: None,
            primitive: lit_primitive_state(wgpu::PolygonMode::Fill),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let view = depth_texture(device, "shadow_map", size, size, true);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        tracing::debug!(size, "shadow map created");
        Self {
            pipeline,
            light_buffer,
            light_bind_group,
            view,
            sampler,
            size,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn write_light_space(&self, queue: &wgpu::Queue, light_space: glam::Mat4) {
        queue.write_buffer(
            &self.light_buffer,
            0,
            bytemuck::bytes_of(&MatrixBlock::from(light_space)),
        );
    }

    /// Clear the map and bind the depth pipeline. Object bind groups and
    /// geometry are supplied by the caller.
    pub fn begin<'e>(&self, encoder: &'e mut wgpu::CommandEncoder) -> wgpu::RenderPass<'e> {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("shadow_pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.light_bind_group, &[]);
        pass
    }
}
