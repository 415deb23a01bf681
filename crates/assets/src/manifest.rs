use std::path::{Path, PathBuf};

use cityview_common::SceneObject;
use serde::{Deserialize, Serialize};

use crate::AssetError;

/// File locations of every scene asset, relative to an assets root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetManifest {
    pub city: PathBuf,
    pub car_body: PathBuf,
    pub front_wheels: PathBuf,
    pub back_wheels: PathBuf,
    pub light_cube: PathBuf,
    /// Skybox faces in +X, -X, +Y, -Y, +Z, -Z order.
    pub skybox: [PathBuf; 6],
}

impl Default for AssetManifest {
    fn default() -> Self {
        let face = |name: &str| PathBuf::from(format!("textures/skybox/{name}.tga"));
        Self {
            city: "models/city/city.obj".into(),
            car_body: "models/carBody/carBody.obj".into(),
            front_wheels: "models/frontWheels/frontWheels.obj".into(),
            back_wheels: "models/backWheels/backWheels.obj".into(),
            light_cube: "models/cube/cube.obj".into(),
            skybox: [
                face("right"),
                face("left"),
                face("top"),
                face("bottom"),
                face("back"),
                face("front"),
            ],
        }
    }
}

impl AssetManifest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let text = crate::read_text(path)?;
        serde_json::from_str(&text).map_err(|e| AssetError::Parse {
            path: path.to_path_buf(),
            line: e.line(),
            message: e.to_string(),
        })
    }

    /// Model file for `object`; the skybox has no model.
    pub fn model_path(&self, object: SceneObject) -> Option<&Path> {
        let path = match object {
            SceneObject::City => &self.city,
            SceneObject::CarBody => &self.car_body,
            SceneObject::FrontWheels => &self.front_wheels,
            SceneObject::BackWheels => &self.back_wheels,
            SceneObject::LightCube => &self.light_cube,
            SceneObject::Skybox => return None,
        };
        Some(path)
    }

    /// Every object that is drawn from a model file.
    pub fn models(&self) -> impl Iterator<Item = (SceneObject, &Path)> {
        SceneObject::ALL
            .into_iter()
            .filter_map(|object| self.model_path(object).map(|path| (object, path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_layout() {
        let manifest = AssetManifest::default();
        assert_eq!(
            manifest.model_path(SceneObject::CarBody),
            Some(Path::new("models/carBody/carBody.obj"))
        );
        assert_eq!(manifest.model_path(SceneObject::Skybox), None);
        assert_eq!(manifest.skybox[0], Path::new("textures/skybox/right.tga"));
        assert_eq!(manifest.skybox[5], Path::new("textures/skybox/front.tga"));
        assert_eq!(manifest.models().count(), 5);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{ "city": "town/town.obj" }"#).unwrap();
        let manifest = AssetManifest::load(file.path()).unwrap();
        assert_eq!(manifest.city, Path::new("town/town.obj"));
        assert_eq!(manifest.light_cube, Path::new("models/cube/cube.obj"));
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{\n  \"city\": 3\n}").unwrap();
        let err = AssetManifest::load(file.path()).unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 2, .. }));
    }
}
