//! Provenance-carrying visibility polygon vertices.
//!
//! Every point the cone projection emits remembers *why* it exists — which
//! surface, junction, screen boundary, or range-limit arc it came from —
//! so the dedup pass (`super::dedup`) can collapse runs that share
//! provenance without losing the ones that don't, and so the invariant
//! kernel (`crate::invariants`) can check "every vertex is a surface point,
//! a screen-boundary point, the origin, or an arc point" directly against
//! the tag rather than re-deriving it from coordinates.

use crate::geom::Vec2;
use crate::surface::{EndpointWhich, SurfaceId};

/// Identity of one angular direction from the cone's origin; every
/// [`SourcePoint`] cast along the same direction carries the same id so
/// `super::dedup` can collapse a whole continuation to its first and last
/// point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContinuationRayId(pub u64);

/// Which cone boundary (or canonical full-cone axis direction) an
/// [`SourcePoint::ArcJunction`] sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundarySide {
    /// The `origin -> window.start` ray (windowed cone).
    WindowStart,
    /// The `origin -> window.end` ray (windowed cone).
    WindowEnd,
    /// The positive canonical axis direction (full cone, see
    /// `crate::visibility::cone::ConeKind::Full`).
    AxisPositive,
    /// The negative canonical axis direction (full cone).
    AxisNegative,
}

/// A provenance-carrying visibility-polygon vertex.
///
/// Each variant stores its own screen-space `point`: these are produced
/// once, during cone projection, by code that already has the point in
/// hand (a ray/surface intersection, a chain lookup, a circle crossing),
/// so there is no value in re-deriving it lazily from a stored ray
/// parameter. `compute_xy()` simply returns it.
#[derive(Clone, Debug, PartialEq)]
pub enum SourcePoint {
    /// The cone's origin itself (only ever the first vertex of a full,
    /// unobstructed cone with no surfaces in range).
    Origin(Vec2),
    /// A non-shared end of an open surface chain.
    Endpoint {
        surface: SurfaceId,
        which: EndpointWhich,
        point: Vec2,
        continuation: Option<ContinuationRayId>,
    },
    /// A ray from the origin striking a surface before reaching its target.
    HitPoint {
        surface: SurfaceId,
        point: Vec2,
        t_ray: f64,
        s_surface: f64,
        continuation: Option<ContinuationRayId>,
    },
    /// A shared endpoint between two consecutive surfaces of a chain.
    Junction {
        chain_index: usize,
        junction_index: usize,
        before: SurfaceId,
        after: SurfaceId,
        point: Vec2,
        blocking: bool,
        continuation: Option<ContinuationRayId>,
    },
    /// A corner (or, in principle, an edge sample) of the screen-bounds
    /// rectangle, reached before any scene surface.
    Boundary {
        point: Vec2,
        continuation: Option<ContinuationRayId>,
    },
    /// The range-limit circle crossed before any surface or screen bound.
    ArcHit {
        point: Vec2,
        ray_source: Option<Box<SourcePoint>>,
        continuation: Option<ContinuationRayId>,
    },
    /// Where the range-limit circle meets a cone boundary ray (or, for a
    /// full cone, one of the two canonical diametric points).
    ArcJunction { point: Vec2, boundary: BoundarySide },
    /// Where the range-limit circle meets a surface segment.
    ArcIntersection { point: Vec2, surface: SurfaceId },
}

impl SourcePoint {
    /// The vertex's screen-space coordinates.
    #[inline]
    pub fn compute_xy(&self) -> Vec2 {
        match self {
            SourcePoint::Origin(p) => *p,
            SourcePoint::Endpoint { point, .. } => *point,
            SourcePoint::HitPoint { point, .. } => *point,
            SourcePoint::Junction { point, .. } => *point,
            SourcePoint::Boundary { point, .. } => *point,
            SourcePoint::ArcHit { point, .. } => *point,
            SourcePoint::ArcJunction { point, .. } => *point,
            SourcePoint::ArcIntersection { point, .. } => *point,
        }
    }

    /// A stable identity string, unique per `(variant, provenance)` pair
    /// within one query — used by tests, not by the dedup pass itself
    /// (which only cares about `surface_id()`/`continuation_id()`).
    pub fn key(&self) -> String {
        match self {
            SourcePoint::Origin(_) => "origin".to_string(),
            SourcePoint::Endpoint { surface, which, .. } => format!("endpoint:{surface}:{which:?}"),
            SourcePoint::HitPoint { surface, t_ray, .. } => format!("hit:{surface}:{t_ray:.9}"),
            SourcePoint::Junction {
                chain_index,
                junction_index,
                ..
            } => format!("junction:{chain_index}:{junction_index}"),
            SourcePoint::Boundary { point, .. } => format!("boundary:{:.6}:{:.6}", point.x, point.y),
            SourcePoint::ArcHit { point, .. } => format!("arc_hit:{:.6}:{:.6}", point.x, point.y),
            SourcePoint::ArcJunction { boundary, .. } => format!("arc_junction:{boundary:?}"),
            SourcePoint::ArcIntersection { surface, point, .. } => {
                format!("arc_intersection:{surface}:{:.6}:{:.6}", point.x, point.y)
            }
        }
    }

    /// The surface this point is provenance-tied to, if any. Used by the
    /// dedup pass to collapse maximal runs on the same surface id.
    pub fn surface_id(&self) -> Option<&SurfaceId> {
        match self {
            SourcePoint::Endpoint { surface, .. } => Some(surface),
            SourcePoint::HitPoint { surface, .. } => Some(surface),
            SourcePoint::ArcIntersection { surface, .. } => Some(surface),
            _ => None,
        }
    }

    /// The continuation ray this point belongs to, if any.
    pub fn continuation_id(&self) -> Option<ContinuationRayId> {
        match self {
            SourcePoint::Endpoint { continuation, .. }
            | SourcePoint::HitPoint { continuation, .. }
            | SourcePoint::Junction { continuation, .. }
            | SourcePoint::Boundary { continuation, .. }
            | SourcePoint::ArcHit { continuation, .. } => *continuation,
            _ => None,
        }
    }
}

/// The ordered set of [`SourcePoint`]s cast along one angular direction
/// from the cone's origin, linked so `super::dedup` can collapse them to
/// their endpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct ContinuationRay {
    pub id: ContinuationRayId,
    pub source: SourcePoint,
    pub passed_through: Vec<SourcePoint>,
    pub final_point: SourcePoint,
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn compute_xy_returns_stored_point_for_every_variant() {
        let p = vector![3.0, 4.0];
        let points = vec![
            SourcePoint::Origin(p),
            SourcePoint::Endpoint {
                surface: SurfaceId::new("s"),
                which: EndpointWhich::Start,
                point: p,
                continuation: None,
            },
            SourcePoint::Boundary {
                point: p,
                continuation: None,
            },
        ];
        for sp in points {
            assert_eq!(sp.compute_xy(), p);
        }
    }

    #[test]
    fn surface_id_only_set_on_surface_provenance() {
        let hit = SourcePoint::HitPoint {
            surface: SurfaceId::new("s0"),
            point: vector![0.0, 0.0],
            t_ray: 1.0,
            s_surface: 0.5,
            continuation: None,
        };
        assert_eq!(hit.surface_id(), Some(&SurfaceId::new("s0")));
        assert!(SourcePoint::Origin(vector![0.0, 0.0]).surface_id().is_none());
    }

    #[test]
    fn key_distinguishes_hit_points_at_different_t() {
        let a = SourcePoint::HitPoint {
            surface: SurfaceId::new("s0"),
            point: vector![0.0, 0.0],
            t_ray: 1.0,
            s_surface: 0.5,
            continuation: None,
        };
        let b = SourcePoint::HitPoint {
            surface: SurfaceId::new("s0"),
            point: vector![0.0, 0.0],
            t_ray: 2.0,
            s_surface: 0.5,
            continuation: None,
        };
        assert_ne!(a.key(), b.key());
    }
}
