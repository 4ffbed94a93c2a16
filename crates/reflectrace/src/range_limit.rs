//! The optional range-limit circle that turns distant surface hits into
//! [`crate::visibility::ArcHit`]-style vertices instead.
//!
//! Mirrors [`crate::surface::Orientation`]'s "which half-plane reflects" idea
//! but for a disk: [`RangeOrientation`] says whether the reachable region is
//! the inside or the outside of the circle.

use crate::geom::Vec2;

/// Whether the query's reachable region is the inside or the outside of the
/// range-limit circle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RangeOrientation {
    Inside,
    Outside,
}

/// A circular range limit: `{center, radius, orientation}`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RangeLimit {
    pub center: Vec2,
    pub radius: f64,
    pub orientation: RangeOrientation,
}

impl RangeLimit {
    pub fn new(center: Vec2, radius: f64, orientation: RangeOrientation) -> Self {
        Self {
            center,
            radius,
            orientation,
        }
    }

    /// Signed distance to the boundary, positive inside the reachable
    /// region, negative outside it.
    #[inline]
    pub fn signed_allowance(&self, p: Vec2) -> f64 {
        let d = (p - self.center).norm();
        match self.orientation {
            RangeOrientation::Inside => self.radius - d,
            RangeOrientation::Outside => d - self.radius,
        }
    }

    #[inline]
    pub fn is_allowed(&self, p: Vec2) -> bool {
        self.signed_allowance(p) >= 0.0
    }

    /// The first point beyond `min_t` along `source + t*dir` at which the
    /// ray leaves the reachable region (the exit boundary crossing), if any.
    pub fn exit_crossing(&self, source: Vec2, dir: Vec2, min_t: f64) -> Option<(f64, Vec2)> {
        let a = dir.dot(&dir);
        if a <= 0.0 {
            return None;
        }
        let oc = source - self.center;
        let b = 2.0 * oc.dot(&dir);
        let c = oc.dot(&oc) - self.radius * self.radius;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let sqrt_disc = disc.sqrt();
        let mut ts = [(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)];
        ts.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
        for t in ts {
            if t <= min_t {
                continue;
            }
            let step = (t.abs() * 1e-9).max(1e-9);
            let just_after = source + dir * (t + step);
            if !self.is_allowed(just_after) {
                let p = source + dir * t;
                return Some((t, p));
            }
        }
        None
    }

    /// Both parametric intersections of the infinite line `source + t*dir`
    /// with this circle, sorted ascending, regardless of `orientation` or
    /// "allowed" semantics. Used by cone projection to place `ArcJunction`
    /// points on the boundary rays, where the question is purely geometric
    /// ("where does this ray cross the circle"), not "where does the
    /// reachable region end".
    pub fn line_intersections(&self, source: Vec2, dir: Vec2) -> Vec<(f64, Vec2)> {
        let a = dir.dot(&dir);
        if a <= 0.0 {
            return Vec::new();
        }
        let oc = source - self.center;
        let b = 2.0 * oc.dot(&dir);
        let c = oc.dot(&oc) - self.radius * self.radius;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return Vec::new();
        }
        let sqrt_disc = disc.sqrt();
        let mut ts = [(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)];
        ts.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
        ts.iter().map(|&t| (t, source + dir * t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn exit_crossing_from_inside_origin() {
        let limit = RangeLimit::new(vector![0.0, 0.0], 10.0, RangeOrientation::Inside);
        let (t, p) = limit
            .exit_crossing(vector![0.0, 0.0], vector![1.0, 0.0], 0.0)
            .unwrap();
        assert!((t - 10.0).abs() < 1e-9);
        assert!((p - vector![10.0, 0.0]).norm() < 1e-9);
    }

    #[test]
    fn outside_orientation_exit_is_entry_into_circle() {
        let limit = RangeLimit::new(vector![0.0, 0.0], 10.0, RangeOrientation::Outside);
        // Starting outside, travelling inward: allowed region is outside the
        // circle, so the exit (becoming disallowed) is entering the circle.
        let (t, p) = limit
            .exit_crossing(vector![-20.0, 0.0], vector![1.0, 0.0], 0.0)
            .unwrap();
        assert!((t - 10.0).abs() < 1e-9);
        assert!((p - vector![-10.0, 0.0]).norm() < 1e-9);
    }

    #[test]
    fn no_crossing_when_ray_misses_circle() {
        let limit = RangeLimit::new(vector![0.0, 0.0], 1.0, RangeOrientation::Inside);
        assert!(limit
            .exit_crossing(vector![10.0, 10.0], vector![1.0, 0.0], 0.0)
            .is_none());
    }

    #[test]
    fn line_intersections_returns_both_crossings_sorted() {
        let limit = RangeLimit::new(vector![0.0, 0.0], 5.0, RangeOrientation::Inside);
        let hits = limit.line_intersections(vector![-20.0, 0.0], vector![1.0, 0.0]);
        assert_eq!(hits.len(), 2);
        assert!((hits[0].1 - vector![-5.0, 0.0]).norm() < 1e-9);
        assert!((hits[1].1 - vector![5.0, 0.0]).norm() < 1e-9);
    }
}
