use std::path::Path;

use crate::AssetError;

/// Material as declared in an MTL file, before its texture is decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDef {
    pub name: String,
    pub diffuse: [f32; 3],
    /// `map_Kd` file name exactly as written.
    pub diffuse_map: Option<String>,
}

/// Parse the `newmtl`, `Kd` and `map_Kd` statements of an MTL file. Other
/// statements are ignored.
pub fn parse_mtl(text: &str, path: &Path) -> Result<Vec<MaterialDef>, AssetError> {
    let mut materials: Vec<MaterialDef> = Vec::new();

    for (number, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let parse_error = |message: String| AssetError::Parse {
            path: path.to_path_buf(),
            line: number + 1,
            message,
        };

        match keyword {
            "newmtl" => {
                if rest.is_empty() {
                    return Err(parse_error("newmtl without a name".into()));
                }
                materials.push(MaterialDef {
                    name: rest.to_string(),
                    diffuse: [0.8, 0.8, 0.8],
                    diffuse_map: None,
                });
            }
            "Kd" | "map_Kd" => {
                let current = materials
                    .last_mut()
                    .ok_or_else(|| parse_error(format!("{keyword} before newmtl")))?;
                if keyword == "Kd" {
                    current.diffuse = parse_color(rest).map_err(parse_error)?;
                } else {
                    // options such as `-bm 1` precede the file name
                    let file = rest.split_whitespace().last().unwrap_or_default();
                    if file.is_empty() {
                        return Err(parse_error("map_Kd without a file".into()));
                    }
                    current.diffuse_map = Some(file.to_string());
                }
            }
            _ => {}
        }
    }

    Ok(materials)
}

fn parse_color(rest: &str) -> Result<[f32; 3], String> {
    let values: Vec<f32> = rest
        .split_whitespace()
        .map(|v| v.parse::<f32>().map_err(|e| format!("bad Kd component {v:?}: {e}")))
        .collect::<Result<_, _>>()?;
    match values.as_slice() {
        [r, g, b] => Ok([*r, *g, *b]),
        [v] => Ok([*v; 3]),
        _ => Err(format!("Kd expects 1 or 3 components, got {}", values.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CITY_MTL: &str = "\
# exported
newmtl Asphalt
Ns 10.0
Kd 0.2 0.2 0.25
map_Kd textures/asphalt.png

newmtl Glass
Kd 0.9
";

    #[test]
    fn parses_diffuse_colors_and_maps() {
        let mats = parse_mtl(CITY_MTL, Path::new("city.mtl")).unwrap();
        assert_eq!(mats.len(), 2);
        assert_eq!(mats[0].name, "Asphalt");
        assert_eq!(mats[0].diffuse, [0.2, 0.2, 0.25]);
        assert_eq!(mats[0].diffuse_map.as_deref(), Some("textures/asphalt.png"));
        assert_eq!(mats[1].diffuse, [0.9, 0.9, 0.9]);
        assert_eq!(mats[1].diffuse_map, None);
    }

    #[test]
    fn map_options_are_skipped() {
        let mats = parse_mtl("newmtl a\nmap_Kd -s 1 1 1 wall.tga\n", Path::new("a.mtl")).unwrap();
        assert_eq!(mats[0].diffuse_map.as_deref(), Some("wall.tga"));
    }

    #[test]
    fn kd_before_newmtl_reports_line() {
        let err = parse_mtl("\n\nKd 1 1 1\n", Path::new("bad.mtl")).unwrap_err();
        match err {
            AssetError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_color_is_rejected() {
        assert!(parse_mtl("newmtl a\nKd 1 one 1\n", Path::new("a.mtl")).is_err());
        assert!(parse_mtl("newmtl a\nKd 1 1\n", Path::new("a.mtl")).is_err());
    }
}
