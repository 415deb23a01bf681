use bytemuck::{Pod, Zeroable};

/// Interleaved vertex shared by every lit mesh: position, normal, uv.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Decoded RGBA8 image, rows top to bottom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaImage {
    /// 1x1 white texel, bound when a material has no diffuse map.
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![255; 4],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: [f32; 3],
    pub diffuse_texture: Option<RgbaImage>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".into(),
            diffuse: [0.8, 0.8, 0.8],
            diffuse_texture: None,
        }
    }
}

/// Triangle list drawn with a single material.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Index into [`Model::materials`]; `None` draws with the default material.
    pub material: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

impl Model {
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn index_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len()).sum()
    }

    pub fn material_for(&self, mesh: &Mesh) -> Option<&Material> {
        mesh.material.and_then(|i| self.materials.get(i))
    }
}

/// Six square faces of equal size, in +X, -X, +Y, -Y, +Z, -Z order.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeMap {
    pub size: u32,
    pub faces: [RgbaImage; 6],
}
