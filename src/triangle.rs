use crate::geometry::{Plane3, Reach};
use crate::math::Vec3;

/// A triangle that carries the planes needed to decide, in O(1), whether a
/// line, half-line or segment passes through it.
///
/// Besides its supporting `surface`, each edge owns a plane that contains the
/// edge and is tilted away from the surface so that the triangle's interior
/// lies on the positive side of all three. A crossing point is inside the
/// triangle exactly when none of the three edge distances is negative.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossableTri {
    a: Vec3,
    b: Vec3,
    c: Vec3,
    surface: Plane3,
    bc: Plane3,
    ca: Plane3,
    ab: Plane3,
}

impl CrossableTri {
    /// Vertices listed counter-clockwise (as seen by the viewer) make the
    /// surface normal point towards the viewer.
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let surface = Plane3::through(a, b, c);

        // Centroid pushed against the normal, so no edge plane can coincide
        // with the surface.
        let d = (a + b + c) / 3.0 - surface.normal();

        Self {
            a,
            b,
            c,
            surface,
            bc: Plane3::through(b, c, d),
            ca: Plane3::through(c, a, d),
            ab: Plane3::through(a, b, d),
        }
    }

    /// The plane the triangle lies in. Its positive side is the side from
    /// which the vertices appear counter-clockwise.
    #[inline]
    pub fn surface(&self) -> &Plane3 {
        &self.surface
    }

    #[inline]
    pub fn is_crossed<R: Reach>(&self, ray: &R) -> bool {
        self.crossing(ray).is_some()
    }

    /// The point where `ray` passes through the triangle, if it does.
    ///
    /// NaN coordinates (from degenerate input) fail the `>= 0` edge tests and
    /// are reported as no crossing.
    #[inline]
    pub fn crossing<R: Reach>(&self, ray: &R) -> Option<Vec3> {
        if !ray.reaches(&self.surface) {
            return None;
        }
        let p = ray.line().cross(&self.surface);
        self.contains(p).then_some(p)
    }

    /// Whether `p` lies inside the triangle's prism, i.e. has a
    /// non-negative signed distance to all three edge planes. Meaningful for
    /// points on the surface.
    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        self.bc.distsign(p) >= 0.0 && self.ca.distsign(p) >= 0.0 && self.ab.distsign(p) >= 0.0
    }

    #[inline]
    pub fn a(&self) -> Vec3 {
        self.a
    }

    #[inline]
    pub fn b(&self) -> Vec3 {
        self.b
    }

    #[inline]
    pub fn c(&self) -> Vec3 {
        self.c
    }

    #[inline]
    pub fn vertices(&self) -> [Vec3; 3] {
        [self.a, self.b, self.c]
    }
}
