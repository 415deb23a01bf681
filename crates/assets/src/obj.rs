use std::collections::HashMap;
use std::path::Path;

use glam::{Vec2, Vec3};

use crate::model::{Material, Mesh, Model, Vertex};
use crate::mtl::parse_mtl;
use crate::texture::load_rgba;
use crate::{AssetError, read_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FaceVertex {
    position: usize,
    texcoord: Option<usize>,
    normal: Option<usize>,
}

#[derive(Debug, Default)]
struct Group {
    material: Option<String>,
    triangles: Vec<[FaceVertex; 3]>,
}

/// Raw OBJ contents with all indices resolved to zero-based positions.
#[derive(Debug, Default)]
pub struct ObjData {
    positions: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    normals: Vec<Vec3>,
    groups: Vec<Group>,
    pub mtllibs: Vec<String>,
}

impl ObjData {
    pub fn triangle_count(&self) -> usize {
        self.groups.iter().map(|g| g.triangles.len()).sum()
    }

    /// Material names referenced by `usemtl`, in first-use order.
    pub fn material_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().filter_map(|g| g.material.as_deref())
    }
}

/// Parse the geometry statements of an OBJ file. Polygons are
/// fan-triangulated; faces sharing a material are merged into one group.
pub fn parse_obj(text: &str, path: &Path) -> Result<ObjData, AssetError> {
    let mut data = ObjData {
        groups: vec![Group::default()],
        ..ObjData::default()
    };
    let mut current = 0;

    for (number, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parse_error = |message: String| AssetError::Parse {
            path: path.to_path_buf(),
            line: number + 1,
            message,
        };
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword {
            "v" => {
                let [x, y, z] = parse_floats::<3>(&mut parts).map_err(parse_error)?;
                data.positions.push(Vec3::new(x, y, z));
            }
            "vt" => {
                let [u, v] = parse_floats::<2>(&mut parts).map_err(parse_error)?;
                data.texcoords.push(Vec2::new(u, v));
            }
            "vn" => {
                let [x, y, z] = parse_floats::<3>(&mut parts).map_err(parse_error)?;
                data.normals.push(Vec3::new(x, y, z));
            }
            "f" => {
                let corners = parts
                    .map(|token| parse_face_vertex(token, &data))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(parse_error)?;
                if corners.len() < 3 {
                    return Err(parse_error(format!(
                        "face needs at least 3 vertices, got {}",
                        corners.len()
                    )));
                }
                let triangles = &mut data.groups[current].triangles;
                for i in 1..corners.len() - 1 {
                    triangles.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            "usemtl" => {
                let name = parts.collect::<Vec<_>>().join(" ");
                current = match data
                    .groups
                    .iter()
                    .position(|g| g.material.as_deref() == Some(name.as_str()))
                {
                    Some(existing) => existing,
                    None => {
                        data.groups.push(Group {
                            material: Some(name),
                            triangles: Vec::new(),
                        });
                        data.groups.len() - 1
                    }
                };
            }
            "mtllib" => data.mtllibs.extend(parts.map(str::to_string)),
            _ => {}
        }
    }

    Ok(data)
}

fn parse_floats<'a, const N: usize>(
    parts: &mut impl Iterator<Item = &'a str>,
) -> Result<[f32; N], String> {
    let mut out = [0.0; N];
    for slot in &mut out {
        let token = parts
            .next()
            .ok_or_else(|| format!("expected {N} numbers"))?;
        *slot = token
            .parse()
            .map_err(|e| format!("bad number {token:?}: {e}"))?;
    }
    Ok(out)
}

fn parse_face_vertex(token: &str, data: &ObjData) -> Result<FaceVertex, String> {
    let mut fields = token.split('/');
    let position = match fields.next() {
        Some(p) if !p.is_empty() => resolve_index(p, data.positions.len())?,
        _ => return Err(format!("face vertex {token:?} has no position")),
    };
    let texcoord = match fields.next() {
        Some(t) if !t.is_empty() => Some(resolve_index(t, data.texcoords.len())?),
        _ => None,
    };
    let normal = match fields.next() {
        Some(n) if !n.is_empty() => Some(resolve_index(n, data.normals.len())?),
        _ => None,
    };
    Ok(FaceVertex {
        position,
        texcoord,
        normal,
    })
}

/// One-based OBJ index, or negative relative to the elements read so far.
fn resolve_index(token: &str, count: usize) -> Result<usize, String> {
    let index: i64 = token
        .parse()
        .map_err(|e| format!("bad index {token:?}: {e}"))?;
    let resolved = match index {
        0 => None,
        i if i > 0 => Some(i - 1),
        i => Some(count as i64 + i),
    };
    match resolved {
        Some(r) if r >= 0 && (r as usize) < count => Ok(r as usize),
        _ => Err(format!("index {index} out of range (have {count})")),
    }
}

/// Area-weighted vertex normals, one per position.
fn smooth_normals(data: &ObjData) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; data.positions.len()];
    for triangle in data.groups.iter().flat_map(|g| &g.triangles) {
        let [a, b, c] = triangle.map(|v| data.positions[v.position]);
        let face = (b - a).cross(c - a);
        for corner in triangle {
            normals[corner.position] += face;
        }
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

/// Turn parsed groups into indexed meshes, deduplicating identical corners.
/// `material_index` maps a `usemtl` name to a slot in the model's materials.
pub fn build_meshes(
    data: &ObjData,
    path: &Path,
    material_index: impl Fn(&str) -> Option<usize>,
) -> Result<Vec<Mesh>, AssetError> {
    let needs_smooth = data
        .groups
        .iter()
        .flat_map(|g| &g.triangles)
        .flatten()
        .any(|v| v.normal.is_none());
    let smooth = if needs_smooth {
        smooth_normals(data)
    } else {
        Vec::new()
    };

    let mut meshes = Vec::new();
    for group in data.groups.iter().filter(|g| !g.triangles.is_empty()) {
        let material = match &group.material {
            Some(name) => Some(material_index(name).ok_or_else(|| {
                AssetError::MissingMaterial {
                    path: path.to_path_buf(),
                    name: name.clone(),
                }
            })?),
            None => None,
        };

        let mut lookup: HashMap<FaceVertex, u32> = HashMap::new();
        let mut vertices = Vec::new();
        let mut indices = Vec::with_capacity(group.triangles.len() * 3);
        for corner in group.triangles.iter().flatten() {
            let index = *lookup.entry(*corner).or_insert_with(|| {
                let normal = match corner.normal {
                    Some(n) => data.normals[n],
                    None => smooth[corner.position],
                };
                let uv = corner
                    .texcoord
                    .map(|t| data.texcoords[t])
                    .unwrap_or(Vec2::ZERO);
                vertices.push(Vertex {
                    position: data.positions[corner.position].to_array(),
                    normal: normal.to_array(),
                    // image rows start at the top
                    uv: [uv.x, 1.0 - uv.y],
                });
                (vertices.len() - 1) as u32
            });
            indices.push(index);
        }

        meshes.push(Mesh {
            vertices,
            indices,
            material,
        });
    }
    Ok(meshes)
}

/// Load an OBJ model with its MTL libraries and diffuse textures. Library
/// and texture paths are resolved relative to the OBJ file.
pub fn load_model(path: &Path) -> Result<Model, AssetError> {
    let data = parse_obj(&read_text(path)?, path)?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));

    let mut materials = Vec::new();
    for library in &data.mtllibs {
        let mtl_path = dir.join(library);
        for def in parse_mtl(&read_text(&mtl_path)?, &mtl_path)? {
            let diffuse_texture = def
                .diffuse_map
                .as_deref()
                .map(|map| load_rgba(&dir.join(map)))
                .transpose()?;
            materials.push(Material {
                name: def.name,
                diffuse: def.diffuse,
                diffuse_texture,
            });
        }
    }

    let meshes = build_meshes(&data, path, |name| {
        materials.iter().position(|m| m.name == name)
    })?;

    let model = Model {
        name: path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        meshes,
        materials,
    };
    tracing::debug!(
        model = %model.name,
        vertices = model.vertex_count(),
        indices = model.index_count(),
        materials = model.materials.len(),
        "model loaded"
    );
    Ok(model)
}
