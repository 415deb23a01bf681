use cityview_assets::{Material, Model, RgbaImage};
use wgpu::util::DeviceExt;

use crate::pipeline::uniform_buffer;
use crate::uniforms::MaterialBlock;

/// Upload an RGBA8 image as a sampled texture with one layer per image.
pub fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    layers: &[&RgbaImage],
) -> wgpu::Texture {
    let (width, height) = layers
        .first()
        .map(|image| (image.width.max(1), image.height.max(1)))
        .unwrap_or((1, 1));
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: layers.len().max(1) as u32,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    for (layer, image) in layers.iter().enumerate() {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: layer as u32,
                },
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
        );
    }
    texture
}

/// Builds material bind groups against the scene pipeline's group 2 layout.
pub struct MaterialFactory<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub layout: &'a wgpu::BindGroupLayout,
    pub sampler: &'a wgpu::Sampler,
}

impl MaterialFactory<'_> {
    pub fn create(&self, material: &Material) -> wgpu::BindGroup {
        let white = RgbaImage::white();
        let image = material.diffuse_texture.as_ref().unwrap_or(&white);
        let texture = upload_texture(
            self.device,
            self.queue,
            &format!("{}_diffuse", material.name),
            &[image],
        );
        let view = texture.create_view(&Default::default());
        let [r, g, b] = material.diffuse;
        let buffer = uniform_buffer(
            self.device,
            &format!("{}_material", material.name),
            &MaterialBlock {
                base_color: [r, g, b, 1.0],
            },
        );
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&material.name),
            layout: self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(self.sampler),
                },
            ],
        })
    }
}

pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    /// Index into [`GpuModel::materials`]; `None` uses the default material.
    pub material: Option<usize>,
}

/// A model resident on the GPU, with one bind group per material.
pub struct GpuModel {
    pub meshes: Vec<GpuMesh>,
    pub materials: Vec<wgpu::BindGroup>,
}

impl GpuModel {
    pub fn upload(device: &wgpu::Device, factory: &MaterialFactory<'_>, model: &Model) -> Self {
        let meshes = model
            .meshes
            .iter()
            .map(|mesh| GpuMesh {
                vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{}_vertices", model.name)),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{}_indices", model.name)),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: mesh.indices.len() as u32,
                material: mesh.material,
            })
            .collect();
        let materials = model.materials.iter().map(|m| factory.create(m)).collect();
        Self { meshes, materials }
    }

    /// Draw every mesh with geometry only; the caller has bound all groups.
    pub fn draw_geometry(&self, pass: &mut wgpu::RenderPass<'_>) {
        for mesh in &self.meshes {
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }

    /// Draw every mesh, binding its material to `group`.
    pub fn draw_textured(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        group: u32,
        default_material: &wgpu::BindGroup,
    ) {
        for mesh in &self.meshes {
            let material = mesh
                .material
                .and_then(|i| self.materials.get(i))
                .unwrap_or(default_material);
            pass.set_bind_group(group, material, &[]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}
