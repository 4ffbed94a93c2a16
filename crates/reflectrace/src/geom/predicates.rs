//! Exact(ish) geometric predicates: cross products, side tests, segment and
//! line intersection, and affine reflection through a line.
//!
//! Purpose
//! - Give every other module one shared, tolerance-consistent vocabulary for
//!   "which side", "do these intersect", and "reflect this point" instead of
//!   re-deriving the arithmetic ad hoc.
//!
//! Why this design
//! - Angular/side comparisons use signed cross products exclusively, never
//!   `atan2`, so ordering stays consistent with the visibility cone's
//!   angular sort (`crate::visibility::sort`).
//! - All tolerance comparisons read from [`GeomConfig`] so a single change
//!   there retunes every predicate at once.

use crate::config::GeomConfig;
use crate::geom::types::{Segment, Vec2};

/// 2D cross product (the z-component of the 3D cross product of `(a,0)` and `(b,0)`).
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Signed side of `p` relative to the directed line `from -> to`.
/// Positive: `p` is to the left (CCW); negative: to the right (CW); `0.0`: collinear.
#[inline]
pub fn side(from: Vec2, to: Vec2, p: Vec2) -> f64 {
    cross(to - from, p - from)
}

/// Whether `p` lies on the directed line through `seg`, on its positive
/// ("left") side, using an exact `== 0.0` boundary (no tolerance): callers
/// that need a tolerant collinearity test should use
/// [`collinear_from_origin`] instead.
#[inline]
pub fn side_of_segment(seg: Segment, p: Vec2) -> f64 {
    side(seg.start, seg.end, p)
}

/// Normalised "is `p` collinear with the ray `origin -> through`" test, used
/// by the visibility cone's angular classification. Returns true when the
/// normalised cross product magnitude is below `cfg.collinear_eps`.
#[inline]
pub fn collinear_from_origin(origin: Vec2, through: Vec2, p: Vec2, cfg: &GeomConfig) -> bool {
    let a = through - origin;
    let b = p - origin;
    let na = a.norm();
    let nb = b.norm();
    if na <= 0.0 || nb <= 0.0 {
        return true;
    }
    (cross(a, b) / (na * nb)).abs() < cfg.collinear_eps
}

/// Parametric intersection of two lines `p0 + t*d0` and `p1 + u*d1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineIntersection {
    pub point: Vec2,
    pub t: f64,
    pub u: f64,
}

/// Intersect the (infinite) lines through `a` (direction `da`) and `b`
/// (direction `db`). Returns `None` when the directions are parallel
/// (including degenerate zero-length directions).
pub fn line_intersection(a: Vec2, da: Vec2, b: Vec2, db: Vec2) -> Option<LineIntersection> {
    let denom = cross(da, db);
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let diff = b - a;
    let t = cross(diff, db) / denom;
    let u = cross(diff, da) / denom;
    Some(LineIntersection {
        point: a + da * t,
        t,
        u,
    })
}

/// Intersect ray `source -> target` (parametrised so `t=1` is `target`) with
/// the infinite line through `seg`, returning `(t_ray, s_segment)` where
/// `s_segment` is the parameter along `seg.start -> seg.end`.
pub fn ray_vs_segment_line(source: Vec2, target: Vec2, seg: Segment) -> Option<(f64, f64)> {
    let li = line_intersection(source, target - source, seg.start, seg.direction())?;
    Some((li.t, li.u))
}

/// Exact affine reflection of `p` through the infinite line supporting `seg`.
pub fn reflect_point(p: Vec2, seg: Segment) -> Vec2 {
    let d = seg.direction();
    let len_sq = d.dot(&d);
    if len_sq <= 0.0 {
        return p;
    }
    let ap = p - seg.start;
    let proj = d * (ap.dot(&d) / len_sq);
    let closest = seg.start + proj;
    closest * 2.0 - p
}
