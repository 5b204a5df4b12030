//! Rays that scan a [`Scene`] for the nearest triangle and recurse on hits.
//!
//! There is no acceleration structure: every ray, including every bounce,
//! tests every triangle. A [`Ray`] is the shared half-line plus nearest-hit
//! scan; [`ViewRay`] turns hits into color, [`PhotonRay`] turns them into
//! deposits in a [`PhotonMap`], and [`RayGroup`] averages view rays over a
//! lens disk for depth of field.

use crate::geometry::{HalfLine3, Plane3, Reach};
use crate::material::{Color, Photon, PhotonMap, Scene, SceneTri};
use crate::math::Vec3;

/// Recursion budget of a freshly constructed view or photon ray.
pub const DEFAULT_DEPTH: u32 = 8;

// ─── Hit ────────────────────────────────────────────────────────────────────

/// The nearest triangle a ray passes through.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub index: usize,
    pub tri: &'a SceneTri,
    pub point: Vec3,
}

// ─── Ray ────────────────────────────────────────────────────────────────────

/// A half-line that ignores the triangle it starts on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    line: HalfLine3,
    ignore: Option<usize>,
}

impl Ray {
    /// Ray starting at `from` heading through `through`.
    pub fn new(from: Vec3, through: Vec3) -> Self {
        Self {
            line: HalfLine3::through(from, through),
            ignore: None,
        }
    }

    /// Skip triangle `index` during scans, so a bounce does not immediately
    /// re-hit the surface it leaves.
    pub fn ignoring(mut self, index: Option<usize>) -> Self {
        self.ignore = index;
        self
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.line.origin()
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.line.line().direction()
    }

    /// Scans the whole scene for the closest crossed triangle.
    ///
    /// A candidate replaces the current best only when its crossing point is
    /// strictly closer to the origin, so on an exact tie the triangle scanned
    /// first wins.
    pub fn nearest_hit<'s>(&self, scene: &'s Scene) -> Option<Hit<'s>> {
        let origin = self.origin();
        let mut closest: Option<(Hit<'s>, f64)> = None;

        for (index, tri) in scene.iter().enumerate() {
            if self.ignore == Some(index) {
                continue;
            }
            let Some(point) = tri.geometry().crossing(&self.line) else {
                continue;
            };
            let dist2 = origin.dist2(point);
            if let Some((_, best)) = closest {
                if !(dist2 < best) {
                    continue;
                }
            }
            closest = Some((Hit { index, tri, point }, dist2));
        }

        closest.map(|(hit, _)| hit)
    }

    /// Mirror direction off `surface`: the incoming direction minus twice
    /// its component along the normal. The plane's signed distance does the
    /// projection, so the normal need not be unit length.
    pub fn reflected_direction(&self, surface: &Plane3) -> Vec3 {
        let v = self.direction();
        let t = surface.distsign(surface.point() + v);
        v - surface.normal() * (t * 2.0)
    }

    /// Direction of the transmitted ray. Transparency is straight-through:
    /// the refractive index does not bend it.
    pub fn transmitted_direction(&self, _surface: &Plane3) -> Vec3 {
        self.direction()
    }
}

// ─── View ray ───────────────────────────────────────────────────────────────

/// A ray shot from the eye that resolves to the color it sees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRay {
    ray: Ray,
    depth: u32,
}

impl ViewRay {
    pub fn new(from: Vec3, through: Vec3) -> Self {
        Self {
            ray: Ray::new(from, through),
            depth: DEFAULT_DEPTH,
        }
    }

    pub fn ignoring(mut self, index: Option<usize>) -> Self {
        self.ray = self.ray.ignoring(index);
        self
    }

    /// Remaining number of reflection/transmission bounces.
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn ray(&self) -> &Ray {
        &self.ray
    }

    /// The color seen along the ray.
    ///
    /// A miss is black. A hit contributes the triangle's own color, plus, while
    /// depth remains, the reflected and transmitted child rays attenuated by
    /// the triangle's reflectivity and transparency. Black reflectivity or
    /// transparency spawns no child.
    pub fn shoot(&self, scene: &Scene) -> Color {
        let Some(hit) = self.ray.nearest_hit(scene) else {
            return Color::BLACK;
        };

        let mut result = hit.tri.active();
        if self.depth == 0 {
            return result;
        }

        let surface = hit.tri.geometry().surface();
        let reflection = hit.tri.reflection();
        let transparency = hit.tri.transparency();

        if !reflection.is_black() {
            let dir = self.ray.reflected_direction(surface);
            result += self.child(hit, dir).shoot(scene) * reflection;
        }
        if !transparency.is_black() {
            let dir = self.ray.transmitted_direction(surface);
            result += self.child(hit, dir).shoot(scene) * transparency;
        }
        result
    }

    fn child(&self, hit: Hit<'_>, dir: Vec3) -> ViewRay {
        ViewRay::new(hit.point, hit.point + dir)
            .ignoring(Some(hit.index))
            .with_depth(self.depth - 1)
    }
}

// ─── Photon ray ─────────────────────────────────────────────────────────────

/// A ray shot from a light that leaves [`Photon`]s on the triangles it hits.
///
/// Lighting the scene with the deposits is not implemented; the map only
/// records them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotonRay {
    ray: Ray,
    color: Color,
    depth: u32,
}

impl PhotonRay {
    pub fn new(from: Vec3, through: Vec3, color: Color) -> Self {
        Self {
            ray: Ray::new(from, through),
            color,
            depth: DEFAULT_DEPTH,
        }
    }

    pub fn ignoring(mut self, index: Option<usize>) -> Self {
        self.ray = self.ray.ignoring(index);
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Deposits the carried color at the nearest hit, then keeps bouncing
    /// with the color attenuated by the surface while depth remains.
    pub fn shoot(&self, scene: &Scene, photons: &PhotonMap) {
        let Some(hit) = self.ray.nearest_hit(scene) else {
            return;
        };

        photons.deposit(
            hit.index,
            Photon {
                position: hit.point,
                color: self.color,
            },
        );
        if self.depth == 0 {
            return;
        }

        let surface = hit.tri.geometry().surface();
        let reflection = hit.tri.reflection();
        let transparency = hit.tri.transparency();

        if !reflection.is_black() {
            let dir = self.ray.reflected_direction(surface);
            self.child(hit, dir, self.color * reflection)
                .shoot(scene, photons);
        }
        if !transparency.is_black() {
            let dir = self.ray.transmitted_direction(surface);
            self.child(hit, dir, self.color * transparency)
                .shoot(scene, photons);
        }
    }

    fn child(&self, hit: Hit<'_>, dir: Vec3, color: Color) -> PhotonRay {
        PhotonRay::new(hit.point, hit.point + dir, color)
            .ignoring(Some(hit.index))
            .with_depth(self.depth - 1)
    }
}

// ─── Ray group ──────────────────────────────────────────────────────────────

/// View rays fanned out over a lens disk and converging on one focus point.
///
/// Origins sit on a regular grid of spacing `spacing` over the disk of
/// radius `radius` centered on `position`, spanned by the `horizontal` and
/// `vertical` axes. Points on the focus plane stay sharp; everything else
/// blurs in proportion to the disk size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayGroup {
    position: Vec3,
    focus: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    radius: f64,
    spacing: f64,
}

impl RayGroup {
    pub fn new(
        position: Vec3,
        focus: Vec3,
        horizontal: Vec3,
        vertical: Vec3,
        radius: f64,
        spacing: f64,
    ) -> Self {
        Self {
            position,
            focus,
            horizontal,
            vertical,
            radius,
            spacing,
        }
    }

    /// Lens offsets `(x, y)` of the sampled rays: grid points of
    /// `[-r, r) × [-r, r)` with `x² + y² < r²`.
    ///
    /// A disk too small to hold any grid point, or a non-positive spacing,
    /// degenerates to the single central ray of a pinhole camera.
    pub fn offsets(&self) -> Vec<(f64, f64)> {
        let r = self.radius;
        if !(self.spacing > 0.0) || !(r > 0.0) {
            return vec![(0.0, 0.0)];
        }

        let steps = (2.0 * r / self.spacing).ceil() as usize;
        let axis: Vec<f64> = (0..steps)
            .map(|i| -r + i as f64 * self.spacing)
            .take_while(|&v| v < r)
            .collect();

        let mut offsets = Vec::new();
        for &x in &axis {
            for &y in &axis {
                if x * x + y * y < r * r {
                    offsets.push((x, y));
                }
            }
        }
        if offsets.is_empty() {
            offsets.push((0.0, 0.0));
        }
        offsets
    }

    /// The unweighted average color of every sampled ray.
    pub fn shoot(&self, scene: &Scene) -> Color {
        let offsets = self.offsets();
        let mut sum = Color::BLACK;
        for &(x, y) in &offsets {
            let origin = self.position + self.horizontal * x + self.vertical * y;
            sum += ViewRay::new(origin, self.focus).shoot(scene);
        }
        sum / offsets.len() as f64
    }
}
