use std::path::{Path, PathBuf};

use crate::AssetError;
use crate::model::{CubeMap, RgbaImage};

/// Decode any supported image file to RGBA8.
pub fn load_rgba(path: &Path) -> Result<RgbaImage, AssetError> {
    let decoded = image::open(path).map_err(|source| AssetError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    tracing::debug!(path = %path.display(), width, height, "texture decoded");
    Ok(RgbaImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// Load six skybox faces in +X, -X, +Y, -Y, +Z, -Z order. Every face must be
/// square and the same size as the first.
pub fn load_cube_map(faces: &[PathBuf; 6]) -> Result<CubeMap, AssetError> {
    let mut images: [RgbaImage; 6] = Default::default();
    let mut size = None;
    for (slot, path) in images.iter_mut().zip(faces) {
        let face = load_rgba(path)?;
        let expected = *size.get_or_insert(face.width);
        if face.width != expected || face.height != expected {
            return Err(AssetError::SkyboxFaceMismatch {
                path: path.clone(),
                width: face.width,
                height: face.height,
                expected,
            });
        }
        *slot = face;
    }

    Ok(CubeMap {
        size: size.unwrap_or_default(),
        faces: images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_face(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn faces(dir: &Path, sizes: [(u32, u32); 6]) -> [PathBuf; 6] {
        let names = ["right", "left", "top", "bottom", "back", "front"];
        std::array::from_fn(|i| {
            write_face(dir, &format!("{}.png", names[i]), sizes[i].0, sizes[i].1)
        })
    }

    #[test]
    fn decodes_to_rgba8() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_face(dir.path(), "a.png", 3, 2);
        let image = load_rgba(&path).unwrap();
        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.pixels.len(), 3 * 2 * 4);
        assert_eq!(&image.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn cube_map_keeps_face_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths = faces(dir.path(), [(4, 4); 6]);
        let cube = load_cube_map(&paths).unwrap();
        assert_eq!(cube.size, 4);
        assert!(cube.faces.iter().all(|f| f.pixels.len() == 4 * 4 * 4));
    }

    #[test]
    fn mismatched_face_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut sizes = [(4, 4); 6];
        sizes[3] = (8, 8);
        let err = load_cube_map(&faces(dir.path(), sizes)).unwrap_err();
        match err {
            AssetError::SkyboxFaceMismatch { path, width, expected, .. } => {
                assert!(path.ends_with("bottom.png"));
                assert_eq!((width, expected), (8, 4));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_square_face_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_cube_map(&faces(dir.path(), [(4, 2); 6])).unwrap_err();
        assert!(matches!(err, AssetError::SkyboxFaceMismatch { .. }));
    }

    #[test]
    fn missing_image_is_an_image_error() {
        let err = load_rgba(Path::new("/nonexistent/face.tga")).unwrap_err();
        assert!(matches!(err, AssetError::Image { .. }));
    }
}
