//! Assets: OBJ/MTL models, diffuse textures and the skybox cube map.
//!
//! Everything is decoded on the CPU at startup; the GPU backend uploads the
//! result once. Any missing or malformed file is a fatal [`AssetError`].
//!
//! # Layout
//! Paths come from an [`AssetManifest`] and are resolved against an assets
//! root directory. MTL libraries and textures are resolved relative to the
//! OBJ file that names them.

mod manifest;
mod model;
mod mtl;
mod obj;
mod texture;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cityview_common::SceneObject;

pub use manifest::AssetManifest;
pub use model::{CubeMap, Material, Mesh, Model, RgbaImage, Vertex};
pub use mtl::{MaterialDef, parse_mtl};
pub use obj::{ObjData, build_meshes, load_model, parse_obj};
pub use texture::{load_cube_map, load_rgba};

/// Errors from asset loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}:{line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("failed to decode image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{}: material {name:?} is not defined by any mtllib", .path.display())]
    MissingMaterial { path: PathBuf, name: String },
    #[error(
        "skybox face {} is {width}x{height}, expected {expected}x{expected}",
        .path.display()
    )]
    SkyboxFaceMismatch {
        path: PathBuf,
        width: u32,
        height: u32,
        expected: u32,
    },
}

pub(crate) fn read_text(path: &Path) -> Result<String, AssetError> {
    std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Every decoded asset the viewer draws.
#[derive(Debug, Clone)]
pub struct SceneAssets {
    pub models: BTreeMap<SceneObject, Model>,
    pub skybox: CubeMap,
}

impl SceneAssets {
    /// Load all models and the skybox named by `manifest` under `root`.
    pub fn load(root: impl AsRef<Path>, manifest: &AssetManifest) -> Result<Self, AssetError> {
        let root = root.as_ref();
        let mut models = BTreeMap::new();
        for (object, path) in manifest.models() {
            models.insert(object, load_model(&root.join(path))?);
        }
        let faces = manifest.skybox.clone().map(|face| root.join(face));
        let skybox = load_cube_map(&faces)?;
        tracing::info!(
            root = %root.display(),
            models = models.len(),
            skybox = skybox.size,
            "scene assets loaded"
        );
        Ok(Self { models, skybox })
    }

    pub fn model(&self, object: SceneObject) -> Option<&Model> {
        self.models.get(&object)
    }
}

pub fn crate_info() -> &'static str {
    "cityview-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn write_scene(root: &Path, manifest: &AssetManifest) {
        for (_, path) in manifest.models() {
            let path = root.join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, TRIANGLE).unwrap();
        }
        for face in &manifest.skybox {
            let path = root.join(face);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            image::RgbaImage::new(2, 2).save(path).unwrap();
        }
    }

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("assets"));
    }

    #[test]
    fn loads_every_manifest_entry() {
        let root = tempfile::tempdir().unwrap();
        let manifest = AssetManifest::default();
        write_scene(root.path(), &manifest);

        let assets = SceneAssets::load(root.path(), &manifest).unwrap();
        assert_eq!(assets.models.len(), 5);
        assert!(assets.model(SceneObject::Skybox).is_none());
        assert_eq!(assets.model(SceneObject::City).unwrap().index_count(), 3);
        assert_eq!(assets.skybox.size, 2);
    }

    #[test]
    fn missing_model_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let manifest = AssetManifest::default();
        write_scene(root.path(), &manifest);
        std::fs::remove_file(root.path().join(&manifest.front_wheels)).unwrap();

        let err = SceneAssets::load(root.path(), &manifest).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
        assert!(err.to_string().contains("frontWheels.obj"));
    }
}
