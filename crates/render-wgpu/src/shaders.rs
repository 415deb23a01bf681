/// Depth-only shader for the shadow pass. Positions only, no fragment stage.
pub const DEPTH_SHADER: &str = r#"
struct LightSpace {
    matrix: mat4x4<f32>,
};

struct Object {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> light: LightSpace;

@group(1) @binding(0)
var<uniform> object: Object;

@vertex
fn vs_depth(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return light.matrix * object.model * vec4<f32>(position, 1.0);
}
"#;

/// Lit scene shader: directional light with shadows, optional spotlight and
/// exponential-squared fog.
pub const SCENE_SHADER: &str = r#"
struct Frame {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    light_space: mat4x4<f32>,
    light_dir: vec4<f32>,
    light_color: vec4<f32>,
    spot_position: vec4<f32>,
    spot_direction: vec4<f32>,
    spot_color: vec4<f32>,
    fog_color: vec4<f32>,
    // x: fog density, y: fog enabled, z: spotlight enabled
    params: vec4<f32>,
    // x: inner cutoff cosine, y: outer cutoff cosine
    spot_cutoffs: vec4<f32>,
};

struct Object {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
};

struct Material {
    base_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;
@group(0) @binding(1)
var shadow_map: texture_depth_2d;
@group(0) @binding(2)
var shadow_sampler: sampler_comparison;

@group(1) @binding(0)
var<uniform> object: Object;

@group(2) @binding(0)
var<uniform> material: Material;
@group(2) @binding(1)
var diffuse_texture: texture_2d<f32>;
@group(2) @binding(2)
var diffuse_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) eye_position: vec3<f32>,
    @location(1) eye_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) light_space_position: vec4<f32>,
};

const AMBIENT_STRENGTH: f32 = 0.2;
const SPECULAR_STRENGTH: f32 = 0.5;
const SHININESS: f32 = 32.0;
const SHADOW_BIAS: f32 = 0.005;
const SPOT_LINEAR: f32 = 0.09;
const SPOT_QUADRATIC: f32 = 0.032;

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world = object.model * vec4<f32>(vertex.position, 1.0);
    let eye = frame.view * world;
    let normal_matrix = mat3x3<f32>(
        object.normal_matrix[0].xyz,
        object.normal_matrix[1].xyz,
        object.normal_matrix[2].xyz,
    );

    var out: VertexOutput;
    out.clip_position = frame.projection * eye;
    out.eye_position = eye.xyz;
    out.eye_normal = normalize(normal_matrix * vertex.normal);
    out.uv = vertex.uv;
    out.light_space_position = frame.light_space * world;
    return out;
}

// 1.0 when the fragment sees the light, 0.0 when it is occluded. Anything
// outside the light frustum is lit.
fn light_visibility(light_space_position: vec4<f32>) -> f32 {
    let ndc = light_space_position.xyz / light_space_position.w;
    if (ndc.z > 1.0) {
        return 1.0;
    }
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5);
    if (any(uv < vec2<f32>(0.0)) || any(uv > vec2<f32>(1.0))) {
        return 1.0;
    }
    return textureSampleCompareLevel(shadow_map, shadow_sampler, uv, ndc.z - SHADOW_BIAS);
}

// Evaluated in eye space, like the directional term.
fn spotlight(eye_position: vec3<f32>, eye_normal: vec3<f32>) -> vec3<f32> {
    let spot_position = (frame.view * vec4<f32>(frame.spot_position.xyz, 1.0)).xyz;
    let spot_direction = normalize((frame.view * vec4<f32>(frame.spot_direction.xyz, 0.0)).xyz);
    let to_light = spot_position - eye_position;
    let dist = length(to_light);
    let light_dir = to_light / max(dist, 1e-4);
    let theta = dot(light_dir, -spot_direction);
    let inner = frame.spot_cutoffs.x;
    let outer = frame.spot_cutoffs.y;
    let intensity = clamp((theta - outer) / max(inner - outer, 1e-4), 0.0, 1.0);
    let attenuation = 1.0 / (1.0 + SPOT_LINEAR * dist + SPOT_QUADRATIC * dist * dist);
    let diffuse = max(dot(normalize(eye_normal), light_dir), 0.0);
    return frame.spot_color.rgb * diffuse * intensity * attenuation;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(diffuse_texture, diffuse_sampler, in.uv);
    let albedo = texel.rgb * material.base_color.rgb;

    let normal = normalize(in.eye_normal);
    let light_dir = normalize((frame.view * vec4<f32>(frame.light_dir.xyz, 0.0)).xyz);
    let view_dir = normalize(-in.eye_position);
    let light_color = frame.light_color.rgb;

    let ambient = AMBIENT_STRENGTH * light_color;
    let diffuse = max(dot(normal, light_dir), 0.0) * light_color;
    let reflected = reflect(-light_dir, normal);
    let specular = SPECULAR_STRENGTH * pow(max(dot(view_dir, reflected), 0.0), SHININESS) * light_color;

    let visibility = light_visibility(in.light_space_position);
    var color = min((ambient + visibility * diffuse) * albedo + visibility * specular, vec3<f32>(1.0));

    if (frame.params.z > 0.5) {
        color = color + spotlight(in.eye_position, normal) * albedo;
    }

    if (frame.params.y > 0.5) {
        let fog_distance = length(in.eye_position) * frame.params.x;
        let fog_factor = clamp(exp(-(fog_distance * fog_distance)), 0.0, 1.0);
        color = mix(frame.fog_color.rgb, color, vec3<f32>(fog_factor));
    }

    return vec4<f32>(color, 1.0);
}
"#;

/// Unlit indicator cube at the light's position.
pub const LIGHT_CUBE_SHADER: &str = r#"
struct Camera {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
};

struct Object {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<uniform> object: Object;

@vertex
fn vs_light(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return camera.projection * camera.view * object.model * vec4<f32>(position, 1.0);
}

@fragment
fn fs_light() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 1.0, 1.0);
}
"#;

/// Cube-mapped skybox drawn at the far plane.
pub const SKYBOX_SHADER: &str = r#"
struct Sky {
    view_projection: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> sky: Sky;
@group(0) @binding(1)
var sky_texture: texture_cube<f32>;
@group(0) @binding(2)
var sky_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_sky(@location(0) position: vec3<f32>) -> VertexOutput {
    let clip = sky.view_projection * vec4<f32>(position, 1.0);
    var out: VertexOutput;
    // z = w puts every fragment on the far plane
    out.clip_position = clip.xyww;
    out.direction = position;
    return out;
}

@fragment
fn fs_sky(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(sky_texture, sky_sampler, in.direction);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(label: &str, source: &str) -> naga::Module {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|e| panic!("{label}: {}", e.emit_to_string(source)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap_or_else(|e| panic!("{label}: {e:?}"));
        module
    }

    fn entry_points(module: &naga::Module) -> Vec<&str> {
        module.entry_points.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn shaders_validate() {
        let depth = validate("depth", DEPTH_SHADER);
        assert_eq!(entry_points(&depth), ["vs_depth"]);
        let scene = validate("scene", SCENE_SHADER);
        assert_eq!(entry_points(&scene), ["vs_main", "fs_main"]);
        let cube = validate("light cube", LIGHT_CUBE_SHADER);
        assert_eq!(entry_points(&cube), ["vs_light", "fs_light"]);
        let sky = validate("skybox", SKYBOX_SHADER);
        assert_eq!(entry_points(&sky), ["vs_sky", "fs_sky"]);
    }

    #[test]
    fn fragments_outside_the_shadow_map_are_lit() {
        let body = SCENE_SHADER
            .split("fn light_visibility")
            .nth(1)
            .and_then(|rest| rest.split("\nfn ").next())
            .unwrap();
        let bounds = body
            .find("any(uv < vec2<f32>(0.0)) || any(uv > vec2<f32>(1.0))")
            .expect("uv bounds check");
        let sample = body.find("textureSampleCompareLevel").unwrap();
        assert!(bounds < sample);
    }

    #[test]
    fn spotlight_uses_eye_space_normals() {
        assert!(SCENE_SHADER.contains("spotlight(in.eye_position, normal)"));
        assert!(!SCENE_SHADER.contains("world_normal"));
    }
}
