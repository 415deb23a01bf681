use std::path::PathBuf;

use anyhow::Context;
use cityview_assets::{AssetManifest, SceneAssets};
use cityview_common::SceneObject;
use cityview_input::{InputState, Key};
use cityview_render::{DebugTextRenderer, FramePlan, Renderer};
use cityview_scene::{Scene, SceneConfig};
use clap::{Parser, Subcommand};
use glam::Vec2;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cityview-cli", about = "Headless tool for the cityview scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Step the scene with held keys and print the last frame plan
    Simulate {
        /// Number of frames to step
        #[arg(short, long, default_value = "1")]
        frames: u64,
        /// Keys held for every frame, comma separated (e.g. W,N,Y)
        #[arg(long, value_delimiter = ',')]
        hold: Vec<Key>,
        /// Pointer delta applied every frame, as DX,DY pixels
        #[arg(long, value_parser = parse_look, allow_hyphen_values = true)]
        look: Option<Vec2>,
        /// Scene configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Viewport aspect ratio used for the projection
        #[arg(long, default_value = "1.3333334")]
        aspect: f32,
    },
    /// Load the scene assets and print what was found
    Assets {
        /// Root directory the manifest paths are relative to
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Asset manifest (JSON); built-in paths when omitted
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
}

fn parse_look(s: &str) -> Result<Vec2, String> {
    let (dx, dy) = s
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|e| format!("invalid pointer delta {v:?}: {e}"))
    };
    Ok(Vec2::new(parse(dx)?, parse(dy)?))
}

/// Hold `keys` and step the scene `frames` times, feeding `look` as pointer
/// motion before each step.
fn simulate(
    config: SceneConfig,
    keys: &[Key],
    look: Option<Vec2>,
    frames: u64,
) -> anyhow::Result<Scene> {
    let mut scene = Scene::new(config).context("failed to set up scene")?;
    let mut input = InputState::new();
    for &key in keys {
        if let Some(action) = input.set_key(key, true) {
            tracing::debug!(?key, ?action, "edge action has no effect headless");
        }
    }
    for _ in 0..frames {
        if let Some(delta) = look {
            input.add_pointer_delta(delta.x as f64, delta.y as f64);
        }
        scene.step(&mut input);
    }
    Ok(scene)
}

fn print_state(scene: &Scene) {
    let camera = scene.camera();
    let [px, py, pz] = camera.position().to_array();
    let [fx, fy, fz] = camera.front().to_array();
    println!("frames: {}", scene.frame());
    println!("camera position: ({px:.3}, {py:.3}, {pz:.3})");
    println!("camera front: ({fx:.3}, {fy:.3}, {fz:.3})");
    println!("collision: {}", scene.collision.enabled);
    println!(
        "preview: active={} angle={:.1}",
        scene.animation.preview_active, scene.animation.preview_angle
    );
    println!(
        "car: active={} distance={:.3} wheel_angle={:.1}",
        scene.animation.car_active, scene.animation.car_distance, scene.animation.wheel_angle
    );
    println!("light angle: {:.1}", scene.light.angle);
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("cityview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", cityview_common::crate_info());
            println!("input: {}", cityview_input::crate_info());
            println!("scene: {}", cityview_scene::crate_info());
            println!("render: {}", cityview_render::crate_info());
            println!("assets: {}", cityview_assets::crate_info());
            println!("render-wgpu: {}", cityview_render_wgpu::crate_info());
        }
        Commands::Simulate {
            frames,
            hold,
            look,
            config,
            aspect,
        } => {
            let config = match config {
                Some(path) => SceneConfig::load(path)?,
                None => SceneConfig::default(),
            };
            let scene = simulate(config, &hold, look, frames)?;
            print_state(&scene);
            println!();
            let plan = FramePlan::build(&scene, aspect);
            print!("{}", DebugTextRenderer::new().render(&plan));
        }
        Commands::Assets { root, manifest } => {
            let manifest = match manifest {
                Some(path) => AssetManifest::load(path)?,
                None => AssetManifest::default(),
            };
            let assets = SceneAssets::load(&root, &manifest)
                .with_context(|| format!("failed to load assets from {}", root.display()))?;
            for object in SceneObject::ALL {
                let Some(model) = assets.model(object) else {
                    continue;
                };
                println!(
                    "{:<13} meshes={} vertices={} indices={} materials={}",
                    object.name(),
                    model.meshes.len(),
                    model.vertex_count(),
                    model.index_count(),
                    model.materials.len()
                );
            }
            println!(
                "{:<13} faces=6 size={}x{}",
                SceneObject::Skybox.name(),
                assets.skybox.size,
                assets.skybox.size
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_look_pairs() {
        assert_eq!(parse_look("3,-2.5").unwrap(), Vec2::new(3.0, -2.5));
        assert_eq!(parse_look(" 1 , 0 ").unwrap(), Vec2::new(1.0, 0.0));
        assert!(parse_look("3").is_err());
        assert!(parse_look("a,b").is_err());
    }

    #[test]
    fn simulate_holds_keys_every_frame() {
        let scene = simulate(SceneConfig::default(), &[Key::W], None, 10).unwrap();
        let start = SceneConfig::default().camera.position;
        let moved = scene.camera().position().distance(start);
        assert!((moved - 3.0).abs() < 1e-3, "moved {moved}");
        assert_eq!(scene.frame(), 10);
    }

    #[test]
    fn simulate_ignores_edge_keys() {
        let scene = simulate(SceneConfig::default(), &[Key::Escape, Key::F1], None, 2).unwrap();
        assert_eq!(scene.frame(), 2);
        assert_eq!(
            scene.camera().position(),
            SceneConfig::default().camera.position
        );
    }

    #[test]
    fn simulate_applies_look_each_frame() {
        let still = simulate(SceneConfig::default(), &[], None, 3).unwrap();
        let turned = simulate(SceneConfig::default(), &[], Some(Vec2::new(10.0, 0.0)), 3).unwrap();
        assert_ne!(still.camera().front(), turned.camera().front());
    }

    #[test]
    fn cli_parses_simulate() {
        let cli = Cli::parse_from([
            "cityview-cli",
            "simulate",
            "--frames",
            "5",
            "--hold",
            "w,y",
            "--look",
            "-1,2",
        ]);
        let Commands::Simulate {
            frames, hold, look, ..
        } = cli.command
        else {
            panic!("expected simulate");
        };
        assert_eq!(frames, 5);
        assert_eq!(hold, vec![Key::W, Key::Y]);
        assert_eq!(look, Some(Vec2::new(-1.0, 2.0)));
    }
}
