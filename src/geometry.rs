//! Planes, lines, half-lines, segments and rotation axes in 3D.
//!
//! Everything here is a plain value type. Degenerate input (null normals,
//! null directions, a line parallel to the plane it is asked to cross)
//! yields NaN instead of an error; the comparisons downstream treat NaN as
//! "not a hit" without any special casing.

use crate::math::{Rot2, Vec3};

// ─── Plane ──────────────────────────────────────────────────────────────────

/// A plane through `p` with normal `n`: `n·(x − p) = 0`. The normal is not
/// required to be unit length.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Plane3 {
    p: Vec3,
    n: Vec3,
}

impl Plane3 {
    #[inline]
    pub const fn new(p: Vec3, n: Vec3) -> Self {
        Self { p, n }
    }

    /// Plane through three points with `n = (b − a) × (c − a)`: the normal
    /// points to the side from which `a, b, c` appear counter-clockwise.
    /// Coincident points give a null normal.
    pub fn through(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self::new(a, (b - a).cross(c - a))
    }

    /// Signed distance of `q` in units of `|n|`, positive above the plane
    /// (on the normal's side). NaN for a null normal.
    #[inline]
    pub fn distsign(&self, q: Vec3) -> f64 {
        self.n.dot(q - self.p) / self.n.dot(self.n)
    }

    #[inline]
    pub fn point(&self) -> Vec3 {
        self.p
    }

    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.n
    }
}

// ─── Line ───────────────────────────────────────────────────────────────────

/// A line `p + v·t`, `t ∈ (−∞, ∞)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Line3 {
    p: Vec3,
    v: Vec3,
}

impl Line3 {
    /// Line through `a` and `b` with direction `b − a`.
    #[inline]
    pub fn through(a: Vec3, b: Vec3) -> Self {
        Self { p: a, v: b - a }
    }

    #[inline]
    pub const fn from_direction(p: Vec3, v: Vec3) -> Self {
        Self { p, v }
    }

    /// True when the direction is orthogonal to the plane's normal. A null
    /// direction or a null normal counts as parallel.
    #[inline]
    pub fn is_parallel(&self, plane: &Plane3) -> bool {
        self.v.dot(plane.normal()) == 0.0
    }

    /// The parameter `t` at which `p + v·t` lies on the plane. NaN or
    /// infinite when the line is parallel or either vector is null.
    #[inline]
    pub fn distsign(&self, plane: &Plane3) -> f64 {
        let n = plane.normal();
        (plane.point() - self.p).dot(n) / self.v.dot(n)
    }

    /// Intersection with the plane; NaN components for degenerate input.
    #[inline]
    pub fn cross(&self, plane: &Plane3) -> Vec3 {
        self.at(self.distsign(plane))
    }

    #[inline(always)]
    pub fn at(&self, t: f64) -> Vec3 {
        self.p + self.v * t
    }

    #[inline]
    pub fn point(&self) -> Vec3 {
        self.p
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.v
    }
}

// ─── Bounded lines ──────────────────────────────────────────────────────────

/// Something built on a [`Line3`] that may or may not reach a given plane
/// within its own parameter range.
pub trait Reach {
    fn line(&self) -> &Line3;

    /// Whether the crossing with `plane` lies within the valid range of `t`.
    fn reaches(&self, plane: &Plane3) -> bool;
}

impl Reach for Line3 {
    #[inline]
    fn line(&self) -> &Line3 {
        self
    }

    #[inline]
    fn reaches(&self, plane: &Plane3) -> bool {
        !self.is_parallel(plane)
    }
}

/// `p + v·t` for `t ∈ [0, ∞)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HalfLine3(Line3);

impl HalfLine3 {
    /// Half-line starting at `a` and heading through `b`.
    #[inline]
    pub fn through(a: Vec3, b: Vec3) -> Self {
        Self(Line3::through(a, b))
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.0.point()
    }
}

impl Reach for HalfLine3 {
    #[inline]
    fn line(&self) -> &Line3 {
        &self.0
    }

    #[inline]
    fn reaches(&self, plane: &Plane3) -> bool {
        !self.0.is_parallel(plane) && self.0.distsign(plane) >= 0.0
    }
}

/// `p + v·t` for `t ∈ [0, 1]`: the segment from `a` to `b`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Segment3(Line3);

impl Segment3 {
    #[inline]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self(Line3::through(a, b))
    }

    #[inline]
    pub fn start(&self) -> Vec3 {
        self.0.point()
    }

    #[inline]
    pub fn end(&self) -> Vec3 {
        self.0.at(1.0)
    }
}

impl Reach for Segment3 {
    #[inline]
    fn line(&self) -> &Line3 {
        &self.0
    }

    #[inline]
    fn reaches(&self, plane: &Plane3) -> bool {
        if self.0.is_parallel(plane) {
            return false;
        }
        let t = self.0.distsign(plane);
        (0.0..=1.0).contains(&t)
    }
}

// ─── Axis ───────────────────────────────────────────────────────────────────

/// A line used as a rotation axis.
///
/// Rotation is only circular when the direction has unit length; a longer
/// or shorter direction stretches the orbit into an ellipse. Callers are
/// expected to pass unit directions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Axis3(Line3);

impl Axis3 {
    /// Axis through the origin along `v`.
    #[inline]
    pub fn from_direction(v: Vec3) -> Self {
        Self(Line3::from_direction(Vec3::zero(), v))
    }

    #[inline]
    pub fn through(a: Vec3, b: Vec3) -> Self {
        Self(Line3::through(a, b))
    }

    #[inline]
    pub fn line(&self) -> &Line3 {
        &self.0
    }

    /// Rotates `q` about the axis, counter-clockwise when looking back along
    /// the axis direction, so that `(x, y, axis)` forms a right-handed frame.
    pub fn rot(&self, q: Vec3, rot: &Rot2) -> Vec3 {
        let v = self.0.direction();
        let o = self.0.cross(&Plane3::new(q, v));
        let rx = q - o;
        // |ry| == |rx| only when |v| == 1.
        let ry = v.cross(rx);
        o + rx * rot.cos() + ry * rot.sin()
    }
}
