use crate::math::{Vec2, Vec3};
use crate::triangle::CrossableTri;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul};
use std::sync::{Mutex, PoisonError};

// ─── Color ──────────────────────────────────────────────────────────────────

/// Additive light intensity per channel. `(1, 1, 1)` is nominal white but
/// brighter values are valid; nothing in the engine clamps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    #[inline(always)]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    #[inline(always)]
    pub const fn gray(v: f64) -> Self {
        Self::new(v, v, v)
    }

    #[inline(always)]
    pub fn is_black(self) -> bool {
        self == Self::BLACK
    }

    /// Maps the color to 8-bit RGB for display. Channels up to 1.0 scale
    /// linearly; brighter channels saturate at 255, negative or NaN ones
    /// become 0.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        fn channel(c: f64) -> u8 {
            if c > 1.0 {
                255
            } else if c > 0.0 {
                (c * 255.0) as u8
            } else {
                0
            }
        }
        (channel(self.r), channel(self.g), channel(self.b))
    }

    /// Rec. 709 luma, used by the grayscale terminal output.
    #[inline]
    pub fn luminance(self) -> f64 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({:.3}, {:.3}, {:.3})", self.r, self.g, self.b)
    }
}

impl Add for Color {
    type Output = Self;
    #[inline(always)]
    fn add(self, o: Self) -> Self {
        Self::new(self.r + o.r, self.g + o.g, self.b + o.b)
    }
}

impl AddAssign for Color {
    #[inline(always)]
    fn add_assign(&mut self, o: Self) {
        self.r += o.r;
        self.g += o.g;
        self.b += o.b;
    }
}

/// Channel-wise product, used to attenuate light by a reflectivity or
/// transparency.
impl Mul for Color {
    type Output = Self;
    #[inline(always)]
    fn mul(self, o: Self) -> Self {
        Self::new(self.r * o.r, self.g * o.g, self.b * o.b)
    }
}

/// Darkens the color; dividing by zero yields NaN or infinite channels.
impl Div<f64> for Color {
    type Output = Self;
    #[inline(always)]
    fn div(self, v: f64) -> Self {
        Self::new(self.r / v, self.g / v, self.b / v)
    }
}

// ─── Material ───────────────────────────────────────────────────────────────

/// Optical properties of a scene triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Light the triangle shows by itself when hit directly.
    pub active: Color,
    pub reflection: Color,
    pub transparency: Color,
    /// Refractive index. Stored for callers; transmitted rays are not bent.
    pub refraction: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            active: Color::BLACK,
            reflection: Color::BLACK,
            transparency: Color::BLACK,
            refraction: 1.0,
        }
    }
}

// ─── Scene triangle ─────────────────────────────────────────────────────────

/// A [`CrossableTri`] decorated with a [`Material`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneTri {
    geometry: CrossableTri,
    material: Material,
}

impl SceneTri {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            geometry: CrossableTri::new(a, b, c),
            material: Material::default(),
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_active(mut self, active: Color) -> Self {
        self.material.active = active;
        self
    }

    pub fn with_reflection(mut self, reflection: Color) -> Self {
        self.material.reflection = reflection;
        self
    }

    pub fn with_transparency(mut self, transparency: Color) -> Self {
        self.material.transparency = transparency;
        self
    }

    pub fn with_refraction(mut self, refraction: f64) -> Self {
        self.material.refraction = refraction;
        self
    }

    #[inline]
    pub fn geometry(&self) -> &CrossableTri {
        &self.geometry
    }

    #[inline]
    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    #[inline]
    pub fn active(&self) -> Color {
        self.material.active
    }

    #[inline]
    pub fn reflection(&self) -> Color {
        self.material.reflection
    }

    #[inline]
    pub fn transparency(&self) -> Color {
        self.material.transparency
    }

    #[inline]
    pub fn refraction(&self) -> f64 {
        self.material.refraction
    }
}

// ─── Scene ──────────────────────────────────────────────────────────────────

/// An unordered collection of triangles. A triangle's identity is its index;
/// the scan order is the index order, which only matters for exact ties.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    tris: Vec<SceneTri>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a triangle and returns its index.
    pub fn push(&mut self, tri: SceneTri) -> usize {
        self.tris.push(tri);
        self.tris.len() - 1
    }

    /// Removes a triangle. Indices of later triangles shift down by one, so
    /// a [`PhotonMap`] built for the old scene no longer lines up.
    pub fn remove(&mut self, index: usize) -> Option<SceneTri> {
        (index < self.tris.len()).then(|| self.tris.remove(index))
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&SceneTri> {
        self.tris.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tris.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tris.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, SceneTri> {
        self.tris.iter()
    }
}

impl FromIterator<SceneTri> for Scene {
    fn from_iter<I: IntoIterator<Item = SceneTri>>(iter: I) -> Self {
        Self {
            tris: iter.into_iter().collect(),
        }
    }
}

impl Extend<SceneTri> for Scene {
    fn extend<I: IntoIterator<Item = SceneTri>>(&mut self, iter: I) {
        self.tris.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Scene {
    type Item = &'a SceneTri;
    type IntoIter = std::slice::Iter<'a, SceneTri>;

    fn into_iter(self) -> Self::IntoIter {
        self.tris.iter()
    }
}

// ─── Photons ────────────────────────────────────────────────────────────────

/// Light energy deposited at a point of a triangle by a photon ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Photon {
    pub position: Vec3,
    pub color: Color,
}

/// Per-triangle photon logs, kept apart from the scene.
///
/// Deposits are lighting annotations, not triangle state: the scene stays
/// shared and immutable while photon rays append here through `&self`. Each
/// triangle has its own lock, so concurrent deposits on different triangles
/// do not contend.
#[derive(Debug, Default)]
pub struct PhotonMap {
    slots: Vec<Mutex<Vec<Photon>>>,
}

impl PhotonMap {
    /// An empty map with one slot per triangle of `scene`.
    pub fn for_scene(scene: &Scene) -> Self {
        Self {
            slots: (0..scene.len()).map(|_| Mutex::new(Vec::new())).collect(),
        }
    }

    /// Appends a photon to triangle `index`. Out-of-range indices are ignored.
    pub fn deposit(&self, index: usize, photon: Photon) {
        if let Some(slot) = self.slots.get(index) {
            slot.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(photon);
        }
    }

    /// A snapshot of the photons deposited on triangle `index`.
    pub fn photons(&self, index: usize) -> Vec<Photon> {
        self.slots
            .get(index)
            .map(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
            .unwrap_or_default()
    }

    /// Sum of the colors of photons on triangle `index` that lie strictly
    /// within `radius` of `position`.
    pub fn brightness(&self, index: usize, position: Vec3, radius: f64) -> Color {
        let Some(slot) = self.slots.get(index) else {
            return Color::BLACK;
        };
        let r2 = radius * radius;
        let photons = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let mut result = Color::BLACK;
        for photon in photons.iter() {
            if position.dist2(photon.position) < r2 {
                result += photon.color;
            }
        }
        result
    }

    /// Number of photons deposited across all triangles.
    pub fn total(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    pub fn clear(&self) {
        for slot in &self.slots {
            slot.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// ─── Projected triangle ─────────────────────────────────────────────────────

/// A flat-colored 2D triangle produced by the projection camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tri2 {
    pub a: Vec2,
    pub b: Vec2,
    pub c: Vec2,
    pub color: Color,
}

impl Tri2 {
    pub const fn new(a: Vec2, b: Vec2, c: Vec2, color: Color) -> Self {
        Self { a, b, c, color }
    }

    pub fn vertices(&self) -> [Vec2; 3] {
        [self.a, self.b, self.c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn unit_tri() -> SceneTri {
        SceneTri::new(Vec3::zero(), Vec3::unit_x(), Vec3::unit_y())
    }

    #[test]
    fn color_arithmetic() {
        let a = Color::new(0.5, 0.25, 2.0);
        let b = Color::new(0.5, 2.0, 0.5);
        assert_eq!(a + b, Color::new(1.0, 2.25, 2.5));
        assert_eq!(a * b, Color::new(0.25, 0.5, 1.0));
        assert_eq!(a / 2.0, Color::new(0.25, 0.125, 1.0));
        assert!((Color::BLACK / 0.0).r.is_nan());
    }

    #[test]
    fn equality_compares_matching_channels() {
        assert_ne!(Color::new(0.0, 1.0, 0.0), Color::new(0.0, 0.0, 1.0));
        assert!(Color::default().is_black());
        assert!(!Color::new(0.0, 0.0, 1e-9).is_black());
    }

    #[test]
    fn display_mapping_saturates_bright_channels() {
        assert_eq!(Color::new(0.5, 1.0, 3.0).to_rgb8(), (127, 255, 255));
        assert_eq!(Color::new(-1.0, f64::NAN, 0.0).to_rgb8(), (0, 0, 0));
    }

    #[test]
    fn material_builder_defaults() {
        let tri = unit_tri().with_active(Color::WHITE).with_refraction(1.5);
        assert_eq!(tri.active(), Color::WHITE);
        assert!(tri.reflection().is_black());
        assert!(tri.transparency().is_black());
        assert_eq!(tri.refraction(), 1.5);
        assert_eq!(Material::default().refraction, 1.0);
    }

    #[test]
    fn shared_material_and_in_place_edits() {
        let glass = Material {
            transparency: Color::gray(0.7),
            refraction: 1.5,
            ..Material::default()
        };
        let mut tri = unit_tri().with_material(glass);
        assert_eq!(tri.material(), &glass);
        assert_eq!(tri.transparency(), Color::gray(0.7));

        tri.material_mut().active = Color::new(0.0, 0.2, 0.0);
        tri.material_mut().transparency = Color::BLACK;
        assert_eq!(tri.active(), Color::new(0.0, 0.2, 0.0));
        assert!(tri.transparency().is_black());
        assert_eq!(tri.refraction(), 1.5);
    }

    #[test]
    fn scene_indices() {
        let mut scene = Scene::new();
        assert_eq!(scene.push(unit_tri()), 0);
        assert_eq!(scene.push(unit_tri().with_active(Color::WHITE)), 1);
        assert_eq!(scene.len(), 2);
        assert!(scene.remove(5).is_none());
        let removed = scene.remove(0);
        assert!(removed.is_some());
        assert_eq!(scene.get(0).map(SceneTri::active), Some(Color::WHITE));
    }

    #[test]
    fn photon_brightness_sums_photons_within_radius() {
        let scene: Scene = [unit_tri(), unit_tri()].into_iter().collect();
        let map = PhotonMap::for_scene(&scene);
        let near = Photon {
            position: Vec3::new(0.1, 0.1, 0.0),
            color: Color::gray(0.25),
        };
        let far = Photon {
            position: Vec3::new(0.9, 0.0, 0.0),
            color: Color::gray(1.0),
        };
        map.deposit(0, near);
        map.deposit(0, near);
        map.deposit(0, far);
        map.deposit(7, far);

        assert_eq!(map.total(), 3);
        assert_eq!(map.photons(1), Vec::new());
        assert_eq!(map.brightness(0, Vec3::zero(), 0.5), Color::gray(0.5));
        assert_eq!(map.brightness(1, Vec3::zero(), 0.5), Color::BLACK);

        map.clear();
        assert_eq!(map.total(), 0);
    }

    #[test]
    fn photon_map_accepts_concurrent_deposits() {
        let scene: Scene = std::iter::repeat_with(unit_tri).take(4).collect();
        let map = Arc::new(PhotonMap::for_scene(&scene));
        let workers: Vec<_> = (0..8)
            .map(|i| {
                let map = Arc::clone(&map);
                thread::spawn(move || {
                    for _ in 0..100 {
                        map.deposit(
                            i % 4,
                            Photon {
                                position: Vec3::zero(),
                                color: Color::WHITE,
                            },
                        );
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("worker panicked");
        }
        assert_eq!(map.total(), 800);
        assert_eq!(map.photons(3).len(), 200);
    }
}
