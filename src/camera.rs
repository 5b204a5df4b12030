use crate::error::{RenderError, Result};
use crate::geometry::{Axis3, Line3, Plane3};
use crate::material::{Color, Scene, Tri2};
use crate::math::{Rot2, Vec2, Vec3};
use crate::ray::RayGroup;
use crate::triangle::CrossableTri;

// ─── Orientation ────────────────────────────────────────────────────────────

/// Longitude, latitude and twist composed into three orthogonal axes.
///
/// Longitude turns around the fixed global vertical axis, latitude around
/// the horizontal axis left by the longitude turn, and twist around the
/// resulting forward direction. With no rotation the axes are
/// x = (1,0,0), y = (0,1,0), z = (0,0,1).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeoRot {
    lon: Rot2,
    lat: Rot2,
    twist: Rot2,
}

const X0: Vec3 = Vec3::unit_x();
const Y0: Vec3 = Vec3::unit_y();
const Z0: Vec3 = Vec3::unit_z();

impl GeoRot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rot_lon(&mut self, r: Rot2) {
        self.lon += r;
    }

    pub fn rot_lat(&mut self, r: Rot2) {
        self.lat += r;
    }

    pub fn rot_twist(&mut self, r: Rot2) {
        self.twist += r;
    }

    /// Horizontal axis.
    pub fn x(&self) -> Vec3 {
        let x1 = Axis3::from_direction(Y0).rot(X0, &self.lon);
        Axis3::from_direction(self.z()).rot(x1, &self.twist)
    }

    /// Vertical axis, `z × x`.
    pub fn y(&self) -> Vec3 {
        self.z().cross(self.x())
    }

    /// Direction axis. Twist does not affect it.
    pub fn z(&self) -> Vec3 {
        let around_y = Axis3::from_direction(Y0);
        let z1 = around_y.rot(Z0, &self.lon);
        let x1 = around_y.rot(X0, &self.lon);
        Axis3::from_direction(x1).rot(z1, &self.lat)
    }
}

// ─── Pose ───────────────────────────────────────────────────────────────────

/// Position and orientation of a camera: horizontal, vertical and forward
/// axes, expected to be mutually orthogonal and roughly unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub horizontal: Vec3,
    pub vertical: Vec3,
    pub forward: Vec3,
}

impl Default for Pose {
    /// At the origin, looking down −z with +y up.
    fn default() -> Self {
        Self::from_rotation(Vec3::zero(), &GeoRot::default())
    }
}

impl Pose {
    /// Horizontal = x, vertical = y, forward = −z of the rotation, so an
    /// unrotated camera looks down the −z axis.
    pub fn from_rotation(position: Vec3, rot: &GeoRot) -> Self {
        Self {
            position,
            horizontal: rot.x(),
            vertical: rot.y(),
            forward: -rot.z(),
        }
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_axes(&mut self, horizontal: Vec3, vertical: Vec3, forward: Vec3) {
        self.horizontal = horizontal;
        self.vertical = vertical;
        self.forward = forward;
    }

    pub fn set_rotation(&mut self, rot: &GeoRot) {
        *self = Self::from_rotation(self.position, rot);
    }

    /// Moves by `horizontal·th + vertical·tv + forward·tf`.
    pub fn step(&mut self, th: f64, tv: f64, tf: f64) {
        self.position += self.horizontal * th;
        self.position += self.vertical * tv;
        self.position += self.forward * tf;
    }
}

// ─── Lens ───────────────────────────────────────────────────────────────────

/// Angle of view and resolution shared by both camera kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lens {
    /// Larger is wider.
    pub aov: f64,
    pub xres: u32,
    pub yres: u32,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            aov: 1.0,
            xres: 0,
            yres: 0,
        }
    }
}

impl Lens {
    pub fn new(aov: f64, xres: u32, yres: u32) -> Self {
        Self { aov, xres, yres }
    }

    #[inline]
    pub fn avg_res(&self) -> f64 {
        (self.xres as f64 + self.yres as f64) / 2.0
    }
}

// ─── Ray tracing camera ─────────────────────────────────────────────────────

/// Renders one pixel at a time by shooting a depth-of-field [`RayGroup`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayTracerCamera {
    pub pose: Pose,
    pub lens: Lens,
    /// Distance at which the image is sharp.
    pub focus_dist: f64,
    /// Radius of the lens disk; larger blurs more away from the focus.
    pub dof: f64,
    /// Rays per unit of `dof` along each lens axis.
    pub density: f64,
}

impl RayTracerCamera {
    /// Focus distance, depth of field and density all start at 1, which
    /// shoots a single ray per pixel.
    pub fn new(pose: Pose, lens: Lens) -> Self {
        Self {
            pose,
            lens,
            focus_dist: 1.0,
            dof: 1.0,
            density: 1.0,
        }
    }

    pub fn with_focus_dist(mut self, focus_dist: f64) -> Self {
        self.focus_dist = focus_dist;
        self
    }

    pub fn with_dof(mut self, dof: f64) -> Self {
        self.dof = dof;
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    /// The focus point for pixel `(x, y)`, where `(0, 0)` lies straight
    /// ahead, x grows along the horizontal axis and y along the vertical one.
    pub fn focus_point(&self, x: i32, y: i32) -> Vec3 {
        let Pose {
            position,
            horizontal,
            vertical,
            forward,
        } = self.pose;
        let pdist = self.lens.aov / self.lens.avg_res();
        position
            + (forward + horizontal * (x as f64 * pdist) + vertical * (y as f64 * pdist))
                * self.focus_dist
    }

    pub fn ray_group(&self, x: i32, y: i32) -> RayGroup {
        RayGroup::new(
            self.pose.position,
            self.focus_point(x, y),
            self.pose.horizontal,
            self.pose.vertical,
            self.dof,
            self.dof / self.density,
        )
    }

    /// Color of pixel `(x, y)`. Pure in the camera, the pixel and the scene,
    /// so pixels may be computed in any order and in parallel.
    pub fn color_at(&self, scene: &Scene, x: i32, y: i32) -> Color {
        self.ray_group(x, y).shoot(scene)
    }

    /// Lens samples per pixel at the current settings.
    pub fn samples_per_pixel(&self) -> usize {
        self.ray_group(0, 0).offsets().len()
    }
}

// ─── Projection camera ──────────────────────────────────────────────────────

/// Flat projection of the scene for an interactive wireframe preview.
///
/// The screen plane sits one forward-length ahead of the camera. Two more
/// planes through the same point, with the vertical and horizontal axes as
/// normals, turn a point on the screen into 2D coordinates. The planes are
/// recomputed whenever the pose changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionCamera {
    pose: Pose,
    lens: Lens,
    screen: Plane3,
    horizontal_plane: Plane3,
    vertical_plane: Plane3,
}

impl ProjectionCamera {
    pub fn new(pose: Pose, lens: Lens) -> Self {
        let mut cam = Self {
            pose,
            lens,
            screen: Plane3::default(),
            horizontal_plane: Plane3::default(),
            vertical_plane: Plane3::default(),
        };
        cam.calc_planes();
        cam
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn lens(&self) -> &Lens {
        &self.lens
    }

    pub fn set_lens(&mut self, lens: Lens) {
        self.lens = lens;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.pose.set_position(position);
        self.calc_planes();
    }

    pub fn set_axes(&mut self, horizontal: Vec3, vertical: Vec3, forward: Vec3) {
        self.pose.set_axes(horizontal, vertical, forward);
        self.calc_planes();
    }

    pub fn set_rotation(&mut self, rot: &GeoRot) {
        self.pose.set_rotation(rot);
        self.calc_planes();
    }

    pub fn step(&mut self, th: f64, tv: f64, tf: f64) {
        self.pose.step(th, tv, tf);
        self.calc_planes();
    }

    /// Every triangle entirely in front of the screen plane, projected and
    /// colored with its own active color. Triangles that straddle the screen
    /// plane are dropped whole rather than clipped.
    pub fn project(&self, scene: &Scene) -> Vec<Tri2> {
        scene
            .iter()
            .filter(|tri| self.is_visible(tri.geometry()))
            .map(|tri| {
                let [a, b, c] = tri.geometry().vertices();
                Tri2::new(
                    self.project_point(a),
                    self.project_point(b),
                    self.project_point(c),
                    tri.active(),
                )
            })
            .collect()
    }

    /// True when all three vertices lie strictly in front of the screen.
    pub fn is_visible(&self, tri: &CrossableTri) -> bool {
        tri.vertices()
            .iter()
            .all(|&v| self.screen.distsign(v) > 0.0)
    }

    /// Screen coordinates of `q`, with the origin straight ahead and y up.
    /// Only meaningful for points in front of the screen plane.
    pub fn project_point(&self, q: Vec3) -> Vec2 {
        let on_screen = Line3::through(self.pose.position, q).cross(&self.screen);
        let aov = self.lens.aov;
        Vec2::new(
            self.vertical_plane.distsign(on_screen) / aov,
            self.horizontal_plane.distsign(on_screen) / aov,
        ) * self.lens.avg_res()
    }

    fn calc_planes(&mut self) {
        let p = self.pose.position + self.pose.forward;
        self.horizontal_plane = Plane3::new(p, self.pose.vertical);
        self.vertical_plane = Plane3::new(p, self.pose.horizontal);
        self.screen = Plane3::new(p, self.pose.forward);
    }
}

// ─── Camera configuration ───────────────────────────────────────────────────

/// Everything needed to build either camera, with the defaults of the
/// interactive viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub position: Vec3,
    pub lon: f64,
    pub lat: f64,
    pub twist: f64,
    pub aov: f64,
    pub focus_dist: f64,
    pub dof: f64,
    pub density: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 40.0),
            lon: 0.0,
            lat: 0.0,
            twist: 0.0,
            aov: 1.0,
            focus_dist: 20.0,
            dof: 1.0,
            density: 1.0,
        }
    }
}

impl CameraConfig {
    /// Absolute angles, each turned once, so no [`AngleCache`] is involved.
    ///
    /// [`AngleCache`]: crate::math::AngleCache
    pub fn rotation(&self) -> GeoRot {
        let mut rot = GeoRot::new();
        rot.rot_lon(Rot2::new(self.lon));
        rot.rot_lat(Rot2::new(self.lat));
        rot.rot_twist(Rot2::new(self.twist));
        rot
    }

    pub fn pose(&self) -> Pose {
        Pose::from_rotation(self.position, &self.rotation())
    }

    /// Rejects settings that make no image: non-positive aov, focus or
    /// density, and a negative depth of field.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("aov", self.aov),
            ("focus distance", self.focus_dist),
            ("density", self.density),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(RenderError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.dof >= 0.0) {
            return Err(RenderError::InvalidConfig(format!(
                "depth of field must not be negative, got {}",
                self.dof
            )));
        }
        Ok(())
    }

    pub fn tracer(&self, width: u32, height: u32) -> RayTracerCamera {
        let cam = RayTracerCamera::new(self.pose(), Lens::new(self.aov, width, height))
            .with_focus_dist(self.focus_dist)
            .with_dof(self.dof)
            .with_density(self.density);
        let samples = cam.samples_per_pixel();
        log::debug!(
            "ray tracer camera at {} facing {}, {samples} lens samples per pixel",
            cam.pose.position,
            cam.pose.forward,
        );
        if self.dof > 0.0 && samples == 1 {
            log::debug!(
                "depth of field {} at density {} samples a single ray; raise the density to blur",
                self.dof,
                self.density
            );
        }
        cam
    }

    pub fn projection(&self, width: u32, height: u32) -> ProjectionCamera {
        ProjectionCamera::new(self.pose(), Lens::new(self.aov, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::SceneTri;
    use crate::math::AngleCache;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-9);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-9);
        assert_abs_diff_eq!(a.z, b.z, epsilon = 1e-9);
    }

    #[test]
    fn unrotated_axes_are_the_global_frame() {
        let rot = GeoRot::new();
        assert_eq!(rot.x(), Vec3::unit_x());
        assert_eq!(rot.y(), Vec3::unit_y());
        assert_eq!(rot.z(), Vec3::unit_z());
    }

    #[test]
    fn longitude_turns_around_the_vertical() {
        let mut rot = GeoRot::new();
        rot.rot_lon(Rot2::new(FRAC_PI_2));
        assert_vec_eq(rot.z(), Vec3::unit_x());
        assert_vec_eq(rot.x(), -Vec3::unit_z());
        assert_vec_eq(rot.y(), Vec3::unit_y());
    }

    #[test]
    fn latitude_tilts_direction_towards_the_vertical() {
        let mut rot = GeoRot::new();
        rot.rot_lat(Rot2::new(FRAC_PI_2));
        assert_vec_eq(rot.z(), -Vec3::unit_y());
        assert_vec_eq(rot.x(), Vec3::unit_x());
    }

    #[test]
    fn twist_leaves_direction_alone() {
        let mut rot = GeoRot::new();
        rot.rot_twist(Rot2::new(FRAC_PI_2));
        assert_vec_eq(rot.z(), Vec3::unit_z());
        assert_vec_eq(rot.x(), Vec3::unit_y());
        assert_vec_eq(rot.y(), -Vec3::unit_x());
    }

    #[test]
    fn composed_rotation_stays_orthonormal() {
        let mut rot = GeoRot::new();
        rot.rot_lon(Rot2::new(0.7));
        rot.rot_lat(Rot2::new(-0.3));
        rot.rot_twist(Rot2::new(1.9));
        let (x, y, z) = (rot.x(), rot.y(), rot.z());
        assert_abs_diff_eq!(x.dot(y), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y.dot(z), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(z.dot(x), 0.0, epsilon = 1e-9);
        for axis in [x, y, z] {
            assert_abs_diff_eq!(axis.len2(), 1.0, epsilon = 1e-9);
        }
        assert_vec_eq(x.cross(y), z);
    }

    #[test]
    fn pose_steps_along_its_axes() {
        let mut pose = Pose::default();
        assert_eq!(pose.forward, -Vec3::unit_z());
        pose.step(1.0, 2.0, 3.0);
        assert_eq!(pose.position, Vec3::new(1.0, 2.0, -3.0));
    }

    #[test]
    fn focus_point_follows_pixel_offsets() {
        let pose = Pose::from_rotation(Vec3::new(0.0, 0.0, 40.0), &GeoRot::new());
        let cam = RayTracerCamera::new(pose, Lens::new(1.0, 100, 100)).with_focus_dist(10.0);
        assert_eq!(cam.focus_point(0, 0), Vec3::new(0.0, 0.0, 30.0));
        assert_vec_eq(cam.focus_point(50, -20), Vec3::new(5.0, -2.0, 30.0));
    }

    #[test]
    fn default_tracer_shoots_one_ray_per_pixel() {
        let cam = RayTracerCamera::new(Pose::default(), Lens::new(1.0, 10, 10));
        assert_eq!(cam.samples_per_pixel(), 1);
        assert!(cam.with_density(4.0).samples_per_pixel() > 1);
    }

    fn looking_down_z() -> ProjectionCamera {
        ProjectionCamera::new(Pose::default(), Lens::new(1.0, 100, 100))
    }

    #[test]
    fn projects_points_through_the_screen_plane() {
        let cam = looking_down_z();
        let p = cam.project_point(Vec3::new(1.0, 2.0, -2.0));
        assert_abs_diff_eq!(p.x, 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn wider_angle_of_view_shrinks_the_projection() {
        let mut cam = looking_down_z();
        cam.set_lens(Lens::new(2.0, 100, 100));
        let p = cam.project_point(Vec3::new(1.0, 2.0, -2.0));
        assert_abs_diff_eq!(p.x, 25.0, epsilon = 1e-9);
    }

    #[test]
    fn straddling_and_behind_triangles_are_dropped() {
        let ahead = SceneTri::new(
            Vec3::new(-1.0, -1.0, -5.0),
            Vec3::new(1.0, -1.0, -5.0),
            Vec3::new(0.0, 1.0, -5.0),
        )
        .with_active(Color::WHITE);
        let straddling = SceneTri::new(
            Vec3::new(-1.0, -1.0, -5.0),
            Vec3::new(1.0, -1.0, -5.0),
            Vec3::new(0.0, 1.0, 5.0),
        );
        let on_screen = SceneTri::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -5.0),
            Vec3::new(0.0, 1.0, -5.0),
        );
        let behind = SceneTri::new(
            Vec3::new(-1.0, -1.0, 5.0),
            Vec3::new(1.0, -1.0, 5.0),
            Vec3::new(0.0, 1.0, 5.0),
        );
        let scene: Scene = [ahead, straddling, on_screen, behind].into_iter().collect();

        let projected = looking_down_z().project(&scene);
        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].color, Color::WHITE);
        assert_abs_diff_eq!(projected[0].c.y, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn moving_the_camera_recomputes_its_planes() {
        let tri = SceneTri::new(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let scene: Scene = [tri].into_iter().collect();
        let mut cam = looking_down_z();
        assert!(cam.project(&scene).is_empty());

        cam.step(0.0, 0.0, -10.0);
        assert_eq!(cam.pose().position, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(cam.project(&scene).len(), 1);

        cam.set_position(Vec3::new(0.0, 0.0, 0.5));
        assert!(cam.project(&scene).is_empty());
    }

    #[test]
    fn turning_the_camera_recomputes_its_planes() {
        let side = SceneTri::new(
            Vec3::new(9.0, -1.0, -1.0),
            Vec3::new(9.0, -1.0, 1.0),
            Vec3::new(9.0, 1.0, 0.0),
        );
        let scene: Scene = [side].into_iter().collect();
        let mut cam = looking_down_z();
        cam.set_position(Vec3::new(0.0, 2.0, 0.0));
        assert!(cam.project(&scene).is_empty());

        let mut rot = GeoRot::new();
        rot.rot_lon(Rot2::new(-FRAC_PI_2));
        cam.set_rotation(&rot);
        assert_eq!(cam.pose().position, Vec3::new(0.0, 2.0, 0.0));
        assert_vec_eq(cam.pose().forward, Vec3::unit_x());
        assert_eq!(cam.project(&scene).len(), 1);

        cam.set_axes(Vec3::unit_x(), Vec3::unit_y(), -Vec3::unit_z());
        assert!(cam.project(&scene).is_empty());
    }

    #[test]
    fn pose_rotation_keeps_position() {
        let mut pose = Pose::default();
        pose.set_position(Vec3::new(1.0, 2.0, 3.0));
        let mut rot = GeoRot::new();
        rot.rot_lat(Rot2::new(0.3));
        pose.set_rotation(&rot);
        assert_eq!(pose.position, Vec3::new(1.0, 2.0, 3.0));
        assert_vec_eq(pose.forward, -rot.z());

        pose.set_axes(Vec3::unit_y(), Vec3::unit_z(), Vec3::unit_x());
        assert_eq!(pose.horizontal, Vec3::unit_y());
        assert_eq!(pose.vertical, Vec3::unit_z());
        assert_eq!(pose.forward, Vec3::unit_x());
        assert_eq!(pose.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn cached_steps_compose_a_longitude_turn() {
        let mut cache = AngleCache::with_common_steps();
        let step = std::f64::consts::PI / 360.0;
        let seeded = cache.len();

        let mut rot = GeoRot::new();
        for _ in 0..180 {
            rot.rot_lon(cache.get(step));
        }
        assert_eq!(cache.len(), seeded);
        assert_vec_eq(rot.z(), Vec3::unit_x());
    }

    #[test]
    fn camera_config_validation() {
        assert!(CameraConfig::default().validate().is_ok());
        let zero_dof = CameraConfig {
            dof: 0.0,
            ..CameraConfig::default()
        };
        assert!(zero_dof.validate().is_ok());

        let bad = [
            CameraConfig {
                aov: 0.0,
                ..CameraConfig::default()
            },
            CameraConfig {
                focus_dist: -1.0,
                ..CameraConfig::default()
            },
            CameraConfig {
                density: f64::NAN,
                ..CameraConfig::default()
            },
            CameraConfig {
                dof: -0.5,
                ..CameraConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(RenderError::InvalidConfig(_))
            ));
        }
    }
}
