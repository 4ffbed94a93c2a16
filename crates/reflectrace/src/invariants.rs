//! The invariant kernel: pure geometric predicates used by the test harness
//! to check the quantified properties of `SPEC_FULL.md` §8 against an actual
//! computed result, rather than trusting that the code which built a
//! `SourcePoint` tagged it correctly.

use crate::full_trajectory::FullTrajectoryResult;
use crate::geom::{cross, line_intersection, Vec2};
use crate::range_limit::RangeLimit;
use crate::surface::Surface;
use crate::visibility::{ScreenBounds, SourcePoint};

/// `is_cursor_reachable() ≡ fully_aligned`, per `SPEC_FULL.md` §6/§8.
pub fn is_cursor_reachable(result: &FullTrajectoryResult) -> bool {
    result.fully_aligned
}

fn point_near_segment(p: Vec2, a: Vec2, b: Vec2, eps: f64) -> bool {
    crate::trace::point_on_segment_param(a, b, p, &crate::config::GeomConfig {
        point_on_line_eps: eps,
        ..crate::config::GeomConfig::default()
    })
    .is_some()
}

fn point_on_circle(p: Vec2, center: Vec2, radius: f64, eps: f64) -> bool {
    ((p - center).norm() - radius).abs() < eps
}

/// Every vertex is a surface point, a screen-boundary point, the origin, or
/// (for range-limited queries) an arc point.
pub fn polygon_vertices_on_sources(
    polygon: &[SourcePoint],
    origin: Vec2,
    all_surfaces: &[&dyn Surface],
    bounds: ScreenBounds,
    range_limit: Option<RangeLimit>,
    eps: f64,
) -> bool {
    polygon.iter().all(|vertex| match vertex {
        SourcePoint::Origin(p) => (*p - origin).norm() < eps,
        SourcePoint::Endpoint { surface, point, .. }
        | SourcePoint::HitPoint { surface, point, .. }
        | SourcePoint::ArcIntersection { surface, point, .. } => all_surfaces
            .iter()
            .find(|s| s.id() == *surface)
            .map(|s| point_near_segment(*point, s.segment().start, s.segment().end, eps.max(1e-3)))
            .unwrap_or(false),
        SourcePoint::Junction { point, .. } => {
            // A junction point must lie on at least one of its chain's
            // adjacent surfaces (both, in a well-formed scene).
            all_surfaces
                .iter()
                .any(|s| point_near_segment(*point, s.segment().start, s.segment().end, eps.max(1e-3)))
        }
        SourcePoint::Boundary { point, .. } => {
            let corners = bounds.corners();
            (0..4).any(|i| point_near_segment(*point, corners[i], corners[(i + 1) % 4], eps.max(1e-3)))
        }
        SourcePoint::ArcHit { point, .. } | SourcePoint::ArcJunction { point, .. } => range_limit
            .map(|rl| point_on_circle(*point, rl.center, rl.radius, eps.max(1e-3)))
            .unwrap_or(false),
    })
}

/// Every edge lies along a surface, a screen boundary, a ray from `origin`,
/// or the range circle.
pub fn polygon_edges_follow_sources(polygon: &[SourcePoint], origin: Vec2, range_limit: Option<RangeLimit>, eps: f64) -> bool {
    if polygon.len() < 2 {
        return true;
    }
    (0..polygon.len()).all(|i| {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % polygon.len()];
        edge_follows_a_source(a, b, origin, range_limit, eps)
    })
}

fn edge_follows_a_source(a: &SourcePoint, b: &SourcePoint, origin: Vec2, range_limit: Option<RangeLimit>, eps: f64) -> bool {
    let (pa, pb) = (a.compute_xy(), b.compute_xy());

    if let (Some(sa), Some(sb)) = (a.surface_id(), b.surface_id()) {
        if sa == sb {
            return true;
        }
    }
    if matches!(a, SourcePoint::Boundary { .. }) && matches!(b, SourcePoint::Boundary { .. }) {
        return true;
    }
    let da = pa - origin;
    let db = pb - origin;
    if da.norm() > eps && db.norm() > eps && cross(da, db).abs() < eps.max(1e-6) * da.norm() * db.norm() {
        return true;
    }
    if let Some(rl) = range_limit {
        if point_on_circle(pa, rl.center, rl.radius, eps.max(1e-3)) && point_on_circle(pb, rl.center, rl.radius, eps.max(1e-3)) {
            return true;
        }
    }
    false
}

/// No two non-adjacent edges of `polygon` properly cross.
pub fn no_self_intersection(polygon: &[SourcePoint]) -> bool {
    let n = polygon.len();
    if n < 4 {
        return true;
    }
    let pts: Vec<Vec2> = polygon.iter().map(|p| p.compute_xy()).collect();
    for i in 0..n {
        let (a0, a1) = (pts[i], pts[(i + 1) % n]);
        for j in 0..n {
            if j == i || j == (i + 1) % n || (j + 1) % n == i {
                continue;
            }
            let (b0, b1) = (pts[j], pts[(j + 1) % n]);
            if segments_properly_cross(a0, a1, b0, b1) {
                return false;
            }
        }
    }
    true
}

fn segments_properly_cross(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> bool {
    let Some(li) = line_intersection(a0, a1 - a0, b0, b1 - b0) else {
        return false;
    };
    const EPS: f64 = 1e-9;
    (EPS..1.0 - EPS).contains(&li.t) && (EPS..1.0 - EPS).contains(&li.u)
}

/// Every pair of adjacent polygon vertices shares a surface, shares a
/// continuation ray, or has an `Origin` on one side.
pub fn adjacency_provenance(polygon: &[SourcePoint]) -> bool {
    if polygon.len() < 2 {
        return true;
    }
    (0..polygon.len()).all(|i| {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % polygon.len()];
        if matches!(a, SourcePoint::Origin(_)) || matches!(b, SourcePoint::Origin(_)) {
            return true;
        }
        if matches!(a, SourcePoint::Boundary { .. }) && matches!(b, SourcePoint::Boundary { .. }) {
            return true;
        }
        if let (Some(sa), Some(sb)) = (a.surface_id(), b.surface_id()) {
            if sa == sb {
                return true;
            }
        }
        if let (Some(ca), Some(cb)) = (a.continuation_id(), b.continuation_id()) {
            if ca == cb {
                return true;
            }
        }
        false
    })
}

/// After dedup, no two consecutive vertices share both a surface id and a
/// continuation-ray id (a dedup pass that missed collapsing such a run).
pub fn dedup_is_total(polygon: &[SourcePoint]) -> bool {
    if polygon.len() < 2 {
        return true;
    }
    (0..polygon.len() - 1).all(|i| {
        let a = &polygon[i];
        let b = &polygon[i + 1];
        let same_surface = matches!((a.surface_id(), b.surface_id()), (Some(x), Some(y)) if x == y);
        let same_continuation = matches!((a.continuation_id(), b.continuation_id()), (Some(x), Some(y)) if x == y);
        !(same_surface && same_continuation)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    fn square_polygon() -> Vec<SourcePoint> {
        vec![
            SourcePoint::Boundary { point: vector![0.0, 0.0], continuation: None },
            SourcePoint::Boundary { point: vector![10.0, 0.0], continuation: None },
            SourcePoint::Boundary { point: vector![10.0, 10.0], continuation: None },
            SourcePoint::Boundary { point: vector![0.0, 10.0], continuation: None },
        ]
    }

    #[test]
    fn square_of_boundary_points_has_no_self_intersection() {
        assert!(no_self_intersection(&square_polygon()));
    }

    #[test]
    fn square_of_boundary_points_satisfies_adjacency_and_dedup() {
        let polygon = square_polygon();
        assert!(adjacency_provenance(&polygon));
        assert!(dedup_is_total(&polygon));
    }

    #[test]
    fn crossed_quadrilateral_is_detected() {
        let polygon = vec![
            SourcePoint::Boundary { point: vector![0.0, 0.0], continuation: None },
            SourcePoint::Boundary { point: vector![10.0, 10.0], continuation: None },
            SourcePoint::Boundary { point: vector![10.0, 0.0], continuation: None },
            SourcePoint::Boundary { point: vector![0.0, 10.0], continuation: None },
        ];
        assert!(!no_self_intersection(&polygon));
    }
}
