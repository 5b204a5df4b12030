//! # tritrace
//!
//! A recursive ray tracer over scenes of flat triangles.
//!
//! ## Architecture
//!
//! - **Algebra**: `Vec2`/`Vec3`, planes, lines, half-lines, segments and an
//!   incrementally composable 2D rotation
//! - **Triangles**: each triangle precomputes its surface plane and three
//!   edge planes, so a hit test is one plane crossing plus three sign checks
//! - **Materials**: every triangle carries an emitted (active) color plus
//!   reflectivity and transparency filters
//! - **Rays**: visibility rays recurse through reflection and transmission up
//!   to a fixed depth; photon rays deposit light into a separate map
//! - **Cameras**: a depth-of-field ray tracer that averages a disk of rays per
//!   pixel, and a flat projection camera for quick previews
//! - **Rendering**: row-parallel rendering on `rayon`, PPM export and
//!   terminal display
//!
//! ## Light transport
//!
//! For the nearest triangle hit by a ray, with remaining depth `d`:
//!
//! ```text
//!   C = active + reflection · C(reflected, d−1) + transparency · C(straight on, d−1)
//! ```
//!
//! A miss is black, and so is a ray with no depth left past its own
//! triangle's active color. Color products are per channel.
//!
//! ```
//! use tritrace::{CameraConfig, Color, Scene, SceneTri, Vec3};
//!
//! let scene: Scene = std::iter::once(
//!     SceneTri::new(
//!         Vec3::new(-7.0, -5.0, 0.0),
//!         Vec3::new(5.0, -5.0, 0.0),
//!         Vec3::new(0.0, 5.0, 0.0),
//!     )
//!     .with_active(Color::new(0.5, 0.5, 0.6)),
//! )
//! .collect();
//!
//! let camera = CameraConfig::default().tracer(100, 100);
//! assert_eq!(camera.color_at(&scene, 0, 0), Color::new(0.5, 0.5, 0.6));
//! assert_eq!(camera.color_at(&scene, 1000, 0), Color::BLACK);
//! ```

pub mod camera;
pub mod error;
pub mod geometry;
pub mod material;
pub mod math;
pub mod presets;
pub mod ray;
pub mod renderer;
pub mod triangle;

pub use camera::{CameraConfig, GeoRot, Lens, Pose, ProjectionCamera, RayTracerCamera};
pub use error::{RenderError, Result};
pub use geometry::{Axis3, HalfLine3, Line3, Plane3, Reach, Segment3};
pub use material::{Color, Material, Photon, PhotonMap, Scene, SceneTri, Tri2};
pub use math::{AngleCache, Line2, Rot2, Vec2, Vec3};
pub use ray::{PhotonRay, Ray, RayGroup, ViewRay};
pub use triangle::CrossableTri;
