use crate::camera::CameraConfig;
use crate::material::{Color, Material, Scene, SceneTri};
use crate::math::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A ready-to-render scene together with the camera settings it was
/// arranged for.
pub struct SceneDescription {
    pub name: &'static str,
    pub scene: Scene,
    pub camera: CameraConfig,
}

/// Available built-in scene presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ScenePreset {
    /// Three parallel triangles one behind the other: two see-through panes
    /// in front of a reflective back plate.
    Stack,
    /// A single emissive triangle straight ahead of the camera.
    Single,
    /// Two facing mirrors with an emissive triangle between them; exercises
    /// the recursion bound.
    Mirror,
    /// Hundreds of random triangles from a fixed seed, a stress test for the
    /// linear nearest-hit scan.
    Scatter,
}

impl ScenePreset {
    pub fn build(self) -> SceneDescription {
        let desc = match self {
            ScenePreset::Stack => build_stack(),
            ScenePreset::Single => build_single(),
            ScenePreset::Mirror => build_mirror(),
            ScenePreset::Scatter => build_scatter(),
        };
        log::debug!("preset {}: {} triangles", desc.name, desc.scene.len());
        desc
    }
}

/// The demo triangle shape, parallel to the xy plane at depth `z`.
fn pane(z: f64) -> SceneTri {
    SceneTri::new(
        Vec3::new(-7.0, -5.0, z),
        Vec3::new(5.0, -5.0, z),
        Vec3::new(0.0, 5.0, z),
    )
}

fn build_stack() -> SceneDescription {
    let scene = [
        pane(0.0)
            .with_active(Color::new(0.5, 0.5, 0.6))
            .with_transparency(Color::gray(0.6)),
        pane(-5.0)
            .with_active(Color::new(0.0, 1.0, 0.0))
            .with_transparency(Color::gray(0.6)),
        pane(-10.0)
            .with_active(Color::new(0.0, 0.0, 1.0))
            .with_reflection(Color::gray(0.6)),
    ]
    .into_iter()
    .collect();

    SceneDescription {
        name: "Stacked panes",
        scene,
        camera: CameraConfig::default(),
    }
}

fn build_single() -> SceneDescription {
    let scene = std::iter::once(pane(0.0).with_active(Color::new(0.5, 0.5, 0.6))).collect();

    SceneDescription {
        name: "Single triangle",
        scene,
        camera: CameraConfig::default(),
    }
}

fn build_mirror() -> SceneDescription {
    let mut scene = Scene::new();

    let mirror = Material {
        active: Color::new(0.02, 0.02, 0.04),
        reflection: Color::gray(0.85),
        ..Material::default()
    };

    // Two tall mirrors in the planes x = ±8, facing each other.
    for x in [-8.0, 8.0] {
        scene.push(
            SceneTri::new(
                Vec3::new(x, -12.0, 10.0),
                Vec3::new(x, -12.0, -30.0),
                Vec3::new(x, 12.0, -10.0),
            )
            .with_material(mirror),
        );
    }

    // A glowing triangle between them, turned so its sides face the mirrors.
    scene.push(
        SceneTri::new(
            Vec3::new(0.0, -3.0, -4.0),
            Vec3::new(0.0, -3.0, 4.0),
            Vec3::new(0.0, 4.0, 0.0),
        )
        .with_active(Color::new(1.0, 0.35, 0.1)),
    );
    scene.push(
        pane(-18.0)
            .with_active(Color::new(0.1, 0.1, 0.2))
            .with_reflection(Color::gray(0.3)),
    );

    SceneDescription {
        name: "Facing mirrors",
        scene,
        camera: CameraConfig {
            position: Vec3::new(0.0, 0.0, 30.0),
            lat: -0.05,
            ..CameraConfig::default()
        },
    }
}

const SCATTER_SEED: u64 = 0x7417_ACE5;
const SCATTER_COUNT: usize = 300;

fn build_scatter() -> SceneDescription {
    let mut rng = SmallRng::seed_from_u64(SCATTER_SEED);
    let mut scene = Scene::new();

    for _ in 0..SCATTER_COUNT {
        let center = Vec3::new(
            rng.gen_range(-20.0..20.0),
            rng.gen_range(-15.0..15.0),
            rng.gen_range(-40.0..0.0),
        );
        let mut corner = || {
            center
                + Vec3::new(
                    rng.gen_range(-3.0..3.0),
                    rng.gen_range(-3.0..3.0),
                    rng.gen_range(-1.0..1.0),
                )
        };
        let (a, b, c) = (corner(), corner(), corner());

        let active = Color::new(rng.gen(), rng.gen(), rng.gen());
        let mut tri = SceneTri::new(a, b, c).with_active(active * Color::gray(0.8));
        match rng.gen_range(0..10) {
            0 | 1 => tri = tri.with_reflection(Color::gray(rng.gen_range(0.3..0.8))),
            2 => {
                tri = tri
                    .with_transparency(Color::gray(rng.gen_range(0.3..0.7)))
                    .with_refraction(1.5)
            }
            _ => {}
        }
        scene.push(tri);
    }

    SceneDescription {
        name: "Random scatter",
        scene,
        camera: CameraConfig {
            position: Vec3::new(0.0, 0.0, 45.0),
            ..CameraConfig::default()
        },
    }
}
