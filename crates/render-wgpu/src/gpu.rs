use std::collections::{BTreeMap, HashMap, HashSet};

use cityview_assets::{Material, SceneAssets};
use cityview_common::{FillMode, SceneObject};
use cityview_render::FramePlan;

use crate::diagnostics::ErrorScope;
use crate::mesh::{GpuModel, MaterialFactory};
use crate::pipeline::{
    depth_stencil_state, depth_texture, lit_primitive_state, mesh_position_layout,
    mesh_vertex_layout, opaque_target, sampler_entry, texture_entry, uniform_buffer,
    uniform_entry,
};
use crate::shaders;
use crate::shadow::ShadowMap;
use crate::skybox::Skybox;
use crate::uniforms::{FrameBlock, ObjectBlock};

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("scene assets have no model for {0:?}")]
    MissingModel(SceneObject),
}

/// Per-object uniform buffer and its group 1 bind group.
struct ObjectSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// wgpu backend executing a [`FramePlan`]: shadow pass then main pass, in
/// one command encoder.
pub struct WgpuRenderer {
    scene_pipelines: HashMap<FillMode, wgpu::RenderPipeline>,
    light_cube_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    objects: BTreeMap<SceneObject, ObjectSlot>,
    models: BTreeMap<SceneObject, GpuModel>,
    default_material: wgpu::BindGroup,
    shadow: ShadowMap,
    skybox: Skybox,
    depth_texture: wgpu::TextureView,
    warned_fill_modes: HashSet<FillMode>,
}

/// Polygon modes the device can rasterize the lit scene with.
fn supported_fill_modes(features: wgpu::Features) -> Vec<(FillMode, wgpu::PolygonMode)> {
    let mut modes = vec![(FillMode::Fill, wgpu::PolygonMode::Fill)];
    if features.contains(wgpu::Features::POLYGON_MODE_LINE) {
        modes.push((FillMode::Wireframe, wgpu::PolygonMode::Line));
    }
    if features.contains(wgpu::Features::POLYGON_MODE_POINT) {
        modes.push((FillMode::Points, wgpu::PolygonMode::Point));
    }
    modes
}

/// Optional features worth requesting from an adapter for the fill modes.
pub fn fill_mode_features(adapter: &wgpu::Adapter) -> wgpu::Features {
    adapter.features() & (wgpu::Features::POLYGON_MODE_LINE | wgpu::Features::POLYGON_MODE_POINT)
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        (width, height): (u32, u32),
        shadow_map_size: u32,
        assets: &SceneAssets,
    ) -> Result<Self, RendererError> {
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });
        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                texture_entry(
                    1,
                    wgpu::TextureSampleType::Depth,
                    wgpu::TextureViewDimension::D2,
                ),
                sampler_entry(2, wgpu::SamplerBindingType::Comparison),
            ],
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                texture_entry(
                    1,
                    wgpu::TextureSampleType::Float { filterable: true },
                    wgpu::TextureViewDimension::D2,
                ),
                sampler_entry(2, wgpu::SamplerBindingType::Filtering),
            ],
        });

        let shadow = ShadowMap::new(device, &object_layout, shadow_map_size);

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniforms"),
            size: std::mem::size_of::<FrameBlock>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(shadow.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(shadow.sampler()),
                },
            ],
        });

        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &object_layout, &material_layout],
            push_constant_ranges: &[],
        });
        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });
        let scene_pipelines = supported_fill_modes(device.features())
            .into_iter()
            .map(|(mode, polygon_mode)| {
                let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(&format!("scene_pipeline_{}", mode.name())),
                    layout: Some(&scene_layout),
                    vertex: wgpu::VertexState {
                        module: &scene_shader,
                        entry_point: Some("vs_main"),
                        compilation_options: Default::default(),
                        buffers: &[mesh_vertex_layout()],
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &scene_shader,
                        entry_point: Some("fs_main"),
                        compilation_options: Default::default(),
                        targets: &[Some(opaque_target(surface_format))],
                    }),
                    primitive: lit_primitive_state(polygon_mode),
                    depth_stencil: Some(depth_stencil_state(wgpu::CompareFunction::Less, true)),
                    multisample: Default::default(),
                    multiview: None,
                    cache: None,
                });
                (mode, pipeline)
            })
            .collect::<HashMap<_, _>>();

        let light_cube_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("light_cube_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &object_layout],
            push_constant_ranges: &[],
        });
        let light_cube_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("light_cube_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LIGHT_CUBE_SHADER.into()),
        });
        let light_cube_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("light_cube_pipeline"),
            layout: Some(&light_cube_layout),
            vertex: wgpu::VertexState {
                module: &light_cube_shader,
                entry_point: Some("vs_light"),
                compilation_options: Default::default(),
                buffers: &[mesh_position_layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &light_cube_shader,
                entry_point: Some("fs_light"),
                compilation_options: Default::default(),
                targets: &[Some(opaque_target(surface_format))],
            }),
            primitive: lit_primitive_state(wgpu::PolygonMode::Fill),
            depth_stencil: Some(depth_stencil_state(wgpu::CompareFunction::Less, true)),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let objects = SceneObject::ALL
            .into_iter()
            .filter(|&object| object != SceneObject::Skybox)
            .map(|object| {
                let buffer = uniform_buffer(
                    device,
                    &format!("{}_object", object.name()),
                    &ObjectBlock::default(),
                );
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(object.name()),
                    layout: &object_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                (object, ObjectSlot { buffer, bind_group })
            })
            .collect::<BTreeMap<_, _>>();

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("diffuse_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let factory = MaterialFactory {
            device,
            queue,
            layout: &material_layout,
            sampler: &sampler,
        };
        let default_material = factory.create(&Material::default());

        let mut models = BTreeMap::new();
        for &object in objects.keys() {
            let model = assets
                .model(object)
                .ok_or(RendererError::MissingModel(object))?;
            models.insert(object, GpuModel::upload(device, &factory, model));
        }

        let skybox = Skybox::new(device, queue, surface_format, &assets.skybox);
        let depth_texture = depth_texture(device, "depth_texture", width, height, false);

        tracing::info!(
            fill_modes = scene_pipelines.len(),
            shadow_map = shadow.size(),
            "renderer ready"
        );
        Ok(Self {
            scene_pipelines,
            light_cube_pipeline,
            frame_buffer,
            frame_bind_group,
            objects,
            models,
            default_material,
            shadow,
            skybox,
            depth_texture,
            warned_fill_modes: HashSet::new(),
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = depth_texture(device, "depth_texture", width, height, false);
    }

    /// Resolve `mode` to one the device supports, falling back to fill with
    /// one warning per mode.
    fn resolve_fill_mode(&mut self, mode: FillMode) -> FillMode {
        if self.scene_pipelines.contains_key(&mode) {
            return mode;
        }
        if self.warned_fill_modes.insert(mode) {
            tracing::warn!(
                mode = mode.name(),
                "fill mode unsupported by device, drawing filled"
            );
        }
        FillMode::Fill
    }

    fn write_uniforms(&self, queue: &wgpu::Queue, plan: &FramePlan) {
        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameBlock::from(&plan.uniforms)),
        );
        self.shadow.write_light_space(queue, plan.shadow.light_space);
        // shadow draws share the object buffers; their models match the main draws
        for draw in plan.main.iter().chain(std::iter::once(&plan.light_cube)) {
            if let Some(slot) = self.objects.get(&draw.object) {
                queue.write_buffer(&slot.buffer, 0, bytemuck::bytes_of(&ObjectBlock::from(draw)));
            }
        }
        self.skybox
            .write_view_projection(queue, plan.skybox.view_projection);
    }

    /// Render one frame into `target`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        plan: &FramePlan,
    ) {
        let scope = ErrorScope::push(device);
        self.write_uniforms(queue, plan);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });

        {
            let mut pass = self.shadow.begin(&mut encoder);
            for draw in &plan.shadow.draws {
                let (Some(slot), Some(model)) =
                    (self.objects.get(&draw.object), self.models.get(&draw.object))
                else {
                    continue;
                };
                pass.set_bind_group(1, &slot.bind_group, &[]);
                model.draw_geometry(&mut pass);
            }
        }

        let fill_mode = self.resolve_fill_mode(plan.fill_mode);
        let Some(scene_pipeline) = self.scene_pipelines.get(&fill_mode) else {
            scope.finish();
            return;
        };
        let [r, g, b, a] = plan.clear_color.map(f64::from);
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(scene_pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for draw in &plan.main {
                let (Some(slot), Some(model)) =
                    (self.objects.get(&draw.object), self.models.get(&draw.object))
                else {
                    continue;
                };
                pass.set_bind_group(1, &slot.bind_group, &[]);
                model.draw_textured(&mut pass, 2, &self.default_material);
            }

            let cube = plan.light_cube.object;
            if let (Some(slot), Some(model)) = (self.objects.get(&cube), self.models.get(&cube)) {
                pass.set_pipeline(&self.light_cube_pipeline);
                pass.set_bind_group(0, &self.frame_bind_group, &[]);
                pass.set_bind_group(1, &slot.bind_group, &[]);
                model.draw_geometry(&mut pass);
            }

            self.skybox.draw(&mut pass);
        }

        queue.submit(std::iter::once(encoder.finish()));
        scope.finish();
    }
}
