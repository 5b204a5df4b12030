use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

// ─── Vec3 ───────────────────────────────────────────────────────────────────

/// A 3-component vector used for positions and directions.
///
/// There is no `normalized()`: directions travel through the
/// engine un-normalized, and every signed distance is measured in units of
/// the length of the vector that defines it. Degenerate input (null vectors)
/// produces NaN rather than a panic.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    #[inline(always)]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub const fn unit_x() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub const fn unit_y() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    #[inline(always)]
    pub const fn unit_z() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// Squared Euclidean length. The only length the engine ever needs.
    #[inline(always)]
    pub fn len2(self) -> f64 {
        self.dot(self)
    }

    /// Squared distance between `self` and `other`.
    #[inline(always)]
    pub fn dist2(self, other: Self) -> f64 {
        (other - self).len2()
    }

    #[inline(always)]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Cross product. Looking from the tip of the result, `self` turns
    /// counter-clockwise to reach `rhs`; its length is
    /// `|self|·|rhs|·sin(angle)`.
    #[inline(always)]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, t: f64) -> Self {
        Self::new(self.x * t, self.y * t, self.z * t)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    #[inline(always)]
    fn mul(self, v: Vec3) -> Vec3 {
        v * self
    }
}

impl MulAssign<f64> for Vec3 {
    #[inline(always)]
    fn mul_assign(&mut self, t: f64) {
        self.x *= t;
        self.y *= t;
        self.z *= t;
    }
}

// Plain division so that x/0 keeps its IEEE meaning (0/0 is NaN).
impl Div<f64> for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn div(self, t: f64) -> Self {
        Self::new(self.x / t, self.y / t, self.z / t)
    }
}

// ─── Vec2 ───────────────────────────────────────────────────────────────────

/// A 2-component vector, used for screen-space projections and as the
/// (cos, sin) direction of a [`Rot2`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[inline(always)]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    #[inline(always)]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// Scalar component of `p` along `self`, in units of `|self|`.
    /// NaN when `self` is null.
    #[inline]
    pub fn comp(self, p: Self) -> f64 {
        self.dot(p) / self.dot(self)
    }

    #[inline(always)]
    pub fn len2(self) -> f64 {
        self.dot(self)
    }

    #[inline(always)]
    pub fn dist2(self, other: Self) -> f64 {
        (self - other).len2()
    }

    /// `self` turned 90° to the left: `(-y, x)`.
    #[inline(always)]
    pub fn rot90(self) -> Self {
        Self::new(-self.y, self.x)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

impl Add for Vec2 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, t: f64) -> Self {
        Self::new(self.x * t, self.y * t)
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;
    #[inline(always)]
    fn div(self, t: f64) -> Self {
        Self::new(self.x / t, self.y / t)
    }
}

// ─── Line2 ──────────────────────────────────────────────────────────────────

/// A 2D line `p + v·t`, `t ∈ (−∞, ∞)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Line2 {
    p: Vec2,
    v: Vec2,
}

impl Line2 {
    /// Line through `a` and `b`. Identical points give a null direction.
    pub fn through(a: Vec2, b: Vec2) -> Self {
        Self { p: a, v: b - a }
    }

    /// Signed distance of `q` in units of `|v|`: positive to the left of the
    /// direction, so the inside of a counter-clockwise triangle is positive.
    /// NaN for a null direction.
    pub fn distsign(&self, q: Vec2) -> f64 {
        let n = self.v.rot90();
        let t = n.dot(self.p - q) / n.dot(n);
        -t
    }

    /// Squared Euclidean distance between `q` and the line.
    pub fn dist2(&self, q: Vec2) -> f64 {
        (self.v.rot90() * self.distsign(q)).len2()
    }

    #[inline]
    pub fn point(&self) -> Vec2 {
        self.p
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.v
    }
}

// ─── Rot2 ───────────────────────────────────────────────────────────────────

/// A planar rotation stored as its cosine and sine.
///
/// Composing two rotations (`+=`, `-=`) uses the angle-sum identities and
/// never calls a trigonometric function; only [`Rot2::new`] does, once. The
/// angle itself is tracked alongside for callers that want to display it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rot2 {
    cos: f64,
    sin: f64,
    angle: f64,
}

impl Default for Rot2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Rot2 {
    #[inline]
    pub const fn identity() -> Self {
        Self {
            cos: 1.0,
            sin: 0.0,
            angle: 0.0,
        }
    }

    /// Rotation by `angle` radians. Computes `sin`/`cos` exactly once; use an
    /// [`AngleCache`] when the same step is built over and over.
    pub fn new(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self { cos, sin, angle }
    }

    #[inline]
    pub fn cos(&self) -> f64 {
        self.cos
    }

    #[inline]
    pub fn sin(&self) -> f64 {
        self.sin
    }

    #[inline]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Direction of the rotation as the vector `(cos, sin)`.
    #[inline]
    pub fn dir(&self) -> Vec2 {
        Vec2::new(self.cos, self.sin)
    }
}

impl AddAssign for Rot2 {
    #[inline]
    fn add_assign(&mut self, o: Self) {
        let cos = self.cos * o.cos - self.sin * o.sin;
        self.sin = self.sin * o.cos + self.cos * o.sin;
        self.cos = cos;
        self.angle += o.angle;
    }
}

impl SubAssign for Rot2 {
    #[inline]
    fn sub_assign(&mut self, o: Self) {
        let cos = self.cos * o.cos + self.sin * o.sin;
        self.sin = self.sin * o.cos - self.cos * o.sin;
        self.cos = cos;
        self.angle -= o.angle;
    }
}

/// `rot * n` composes the rotation with itself `|n|` times, backwards for
/// negative `n`. This is repeated accumulation and costs O(|n|).
impl Mul<i32> for Rot2 {
    type Output = Self;
    fn mul(self, n: i32) -> Self {
        let mut result = Rot2::identity();
        for _ in 0..n.unsigned_abs() {
            if n > 0 {
                result += self;
            } else {
                result -= self;
            }
        }
        result
    }
}

// ─── AngleCache ─────────────────────────────────────────────────────────────

/// Memoizes [`Rot2`] values by exact angle, for call sites that build the
/// same incremental step (e.g. a drag-to-rotate handler) many times a second.
///
/// The caller owns the cache and feeds its steps to [`GeoRot`] turns; the
/// engine itself only ever builds absolute rotations with [`Rot2::new`].
///
/// [`GeoRot`]: crate::camera::GeoRot
#[derive(Debug, Default, Clone)]
pub struct AngleCache {
    entries: HashMap<u64, Rot2>,
}

impl AngleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache pre-seeded with the step sizes an interactive viewer uses:
    /// 0, π/4, π/360 and π/1440.
    pub fn with_common_steps() -> Self {
        let mut cache = Self::new();
        for angle in [
            0.0,
            std::f64::consts::FRAC_PI_4,
            std::f64::consts::PI / 360.0,
            std::f64::consts::PI / 1440.0,
        ] {
            cache.get(angle);
        }
        cache
    }

    /// The rotation for `angle`, computing its sine and cosine only the
    /// first time this exact angle is requested.
    pub fn get(&mut self, angle: f64) -> Rot2 {
        *self
            .entries
            .entry(angle.to_bits())
            .or_insert_with(|| Rot2::new(angle))
    }

    pub fn contains(&self, angle: f64) -> bool {
        self.entries.contains_key(&angle.to_bits())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn cross_product_is_right_handed() {
        let z = Vec3::unit_x().cross(Vec3::unit_y());
        assert_eq!(z, Vec3::unit_z());
        assert_eq!(Vec3::unit_y().cross(Vec3::unit_x()), -Vec3::unit_z());
    }

    #[test]
    fn squared_distances() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 6.0, 3.0);
        assert_eq!(a.dist2(b), 25.0);
        assert_eq!(Vec2::new(3.0, 4.0).len2(), 25.0);
    }

    #[test]
    fn division_by_zero_stays_ieee() {
        let v = Vec3::new(0.0, 1.0, -1.0) / 0.0;
        assert!(v.x.is_nan());
        assert_eq!(v.y, f64::INFINITY);
        assert_eq!(v.z, f64::NEG_INFINITY);
    }

    #[test]
    fn comp_of_null_vector_is_nan() {
        assert!(Vec2::zero().comp(Vec2::new(1.0, 1.0)).is_nan());
        assert_eq!(Vec2::new(2.0, 0.0).comp(Vec2::new(3.0, 5.0)), 1.5);
    }

    #[test]
    fn rot90_turns_left() {
        assert_eq!(Vec2::new(1.0, 0.0).rot90(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn line2_signed_distance_positive_on_left() {
        let line = Line2::through(Vec2::zero(), Vec2::new(2.0, 0.0));
        assert_eq!(line.distsign(Vec2::new(5.0, 1.0)), 0.5);
        assert_eq!(line.distsign(Vec2::new(5.0, -1.0)), -0.5);
        assert_abs_diff_eq!(line.dist2(Vec2::new(-3.0, 3.0)), 9.0, epsilon = 1e-12);
        assert!(Line2::through(Vec2::zero(), Vec2::zero())
            .distsign(Vec2::new(1.0, 1.0))
            .is_nan());
    }

    #[test]
    fn rotation_round_trip_restores_the_start() {
        let step = Rot2::new(0.3);
        let mut rot = Rot2::new(1.1);
        let before = rot;
        rot += step;
        rot -= step;
        assert_abs_diff_eq!(rot.cos(), before.cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(rot.sin(), before.sin(), epsilon = 1e-12);
        assert_abs_diff_eq!(rot.angle(), before.angle(), epsilon = 1e-12);
    }

    #[test]
    fn composition_matches_direct_angle() {
        let mut rot = Rot2::new(0.25);
        rot += Rot2::new(0.5);
        let direct = Rot2::new(0.75);
        assert_abs_diff_eq!(rot.cos(), direct.cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(rot.sin(), direct.sin(), epsilon = 1e-12);
    }

    #[test]
    fn integer_multiplication_accumulates() {
        let step = Rot2::new(PI / 8.0);
        let quarter = step * 4;
        assert_abs_diff_eq!(quarter.cos(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(quarter.sin(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(quarter.angle(), FRAC_PI_2, epsilon = 1e-12);

        let back = step * -4;
        assert_abs_diff_eq!(back.sin(), -1.0, epsilon = 1e-12);
        assert_eq!(step * 0, Rot2::identity());
    }

    #[test]
    fn angle_cache_reuses_entries() {
        let mut cache = AngleCache::with_common_steps();
        assert_eq!(cache.len(), 4);
        assert!(cache.contains(PI / 1440.0));

        let step = cache.get(PI / 1440.0);
        assert_eq!(cache.len(), 4);
        assert_eq!(step, Rot2::new(PI / 1440.0));

        cache.get(0.1);
        assert_eq!(cache.len(), 5);
        assert_eq!(cache.get(0.0), Rot2::new(0.0));
    }
}
