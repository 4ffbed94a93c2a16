//! Provenance-preserving dedup: collapse maximal runs of angularly
//! adjacent vertices that share provenance, per `SPEC_FULL.md` §4.9 item 5.
//!
//! Two independent groupings are collapsed in sequence: first runs sharing
//! a surface id (a ray grazing along one surface produces many near-
//! duplicate `HitPoint`/`Endpoint`/`Junction` vertices on it), then runs
//! sharing a `ContinuationRay` id (a non-blocking junction's continuation
//! cast produces a source and a final point that should survive even
//! though everything between them is redundant). Composing the two passes
//! is a design choice, not dictated by the source: a vertex can carry both
//! kinds of provenance at once, and collapsing surface-runs first means a
//! continuation's interior points are already gone by the time the second
//! pass looks for continuation runs.

use crate::surface::SurfaceId;
use crate::visibility::source_point::{ContinuationRayId, SourcePoint};

fn collapse_runs<K: PartialEq>(points: Vec<SourcePoint>, key_fn: impl Fn(&SourcePoint) -> Option<K>) -> Vec<SourcePoint> {
    let mut out = Vec::with_capacity(points.len());
    let mut i = 0;
    while i < points.len() {
        let key = key_fn(&points[i]);
        if key.is_none() {
            out.push(points[i].clone());
            i += 1;
            continue;
        }
        let mut j = i;
        while j + 1 < points.len() && key_fn(&points[j + 1]) == key {
            j += 1;
        }
        out.push(points[i].clone());
        if j > i {
            out.push(points[j].clone());
        }
        i = j + 1;
    }
    out
}

/// Collapse consecutive same-surface and same-continuation-ray runs,
/// preserving every other vertex untouched.
pub fn dedup(points: Vec<SourcePoint>) -> Vec<SourcePoint> {
    let by_surface = collapse_runs::<SurfaceId>(points, |p| p.surface_id().cloned());
    collapse_runs::<ContinuationRayId>(by_surface, |p| p.continuation_id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::EndpointWhich;
    use nalgebra::vector;

    fn hit(surface: &str, x: f64) -> SourcePoint {
        SourcePoint::HitPoint {
            surface: SurfaceId::new(surface),
            point: vector![x, 0.0],
            t_ray: x,
            s_surface: 0.5,
            continuation: None,
        }
    }

    #[test]
    fn collapses_run_on_same_surface_to_first_and_last() {
        let points = vec![hit("s0", 1.0), hit("s0", 2.0), hit("s0", 3.0), hit("s1", 4.0)];
        let result = dedup(points);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].key(), hit("s0", 1.0).key());
        assert_eq!(result[1].key(), hit("s0", 3.0).key());
        assert_eq!(result[2].key(), hit("s1", 4.0).key());
    }

    #[test]
    fn leaves_non_adjacent_duplicates_alone() {
        let points = vec![hit("s0", 1.0), hit("s1", 2.0), hit("s0", 3.0)];
        let result = dedup(points.clone());
        assert_eq!(result, points);
    }

    #[test]
    fn collapses_continuation_run_after_surface_pass() {
        let ray_id = ContinuationRayId(7);
        let points = vec![
            SourcePoint::Endpoint {
                surface: SurfaceId::new("a"),
                which: EndpointWhich::Start,
                point: vector![0.0, 0.0],
                continuation: Some(ray_id),
            },
            SourcePoint::HitPoint {
                surface: SurfaceId::new("b"),
                point: vector![1.0, 0.0],
                t_ray: 1.0,
                s_surface: 0.2,
                continuation: Some(ray_id),
            },
        ];
        let result = dedup(points);
        assert_eq!(result.len(), 2);
    }
}
