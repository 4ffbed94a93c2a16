//! Cone projection: the `SPEC_FULL.md` §4.9 procedure that turns an origin,
//! a cone shape, and a scene into an ordered, provenance-tagged visibility
//! polygon.
//!
//! The procedure in five steps:
//! 1. Enumerate ray targets: every open chain endpoint, every chain
//!    junction, the two cone boundary rays (windowed) or nothing extra
//!    (full), plus the range-limit circle's boundary markers.
//! 2. Cast one ray per target against the full surface set (scene surfaces
//!    plus the synthetic screen-bounds rectangle), using the physical
//!    strategy so only bounded, capability-respecting hits count.
//! 3. Classify: a junction blocks the cast iff its two adjacent surfaces'
//!    outward normals fall on opposite sides of the cone's reference
//!    direction; a non-blocking junction (or an endpoint, or a boundary
//!    corner) that is reached casts a continuation past itself to find what
//!    lies beyond.
//! 4. Sort the resulting points by angle around `origin` (`super::sort`).
//! 5. Dedup consecutive same-provenance runs (`super::dedup`).

use tracing::debug;

use crate::config::GeomConfig;
use crate::geom::{cross, Ray, Segment, Vec2};
use crate::range_limit::RangeLimit;
use crate::strategy::{find_next_hit, HitMode, HitOptions};
use crate::surface::{EndpointWhich, Surface, SurfaceChain, SurfaceId};
use crate::visibility::bounds::ScreenBounds;
use crate::visibility::cone::ConeKind;
use crate::visibility::dedup::dedup;
use crate::visibility::sort::sort_by_angle;
use crate::visibility::source_point::{BoundarySide, ContinuationRayId, SourcePoint};

/// Everything `project` needs to know about the scene; borrowed for the
/// duration of one call, never mutated.
#[derive(Clone, Copy)]
pub struct VisibilityQuery<'a> {
    pub origin: Vec2,
    pub cone: ConeKind,
    pub chains: &'a [SurfaceChain],
    pub all_surfaces: &'a [&'a dyn Surface],
    pub bounds: ScreenBounds,
    pub exclude_surface: Option<&'a SurfaceId>,
    pub range_limit: Option<RangeLimit>,
}

#[derive(Clone, Debug)]
enum TargetProvenance {
    Endpoint { surface: SurfaceId, which: EndpointWhich },
    Junction {
        chain_index: usize,
        junction_index: usize,
        before: SurfaceId,
        after: SurfaceId,
        blocking: bool,
    },
    BoundaryCorner,
}

struct RayTarget {
    point: Vec2,
    provenance: TargetProvenance,
}

/// Run the full cone-projection procedure and return the ordered,
/// deduped visibility polygon vertices.
pub fn project(query: &VisibilityQuery<'_>, cfg: &GeomConfig) -> Vec<SourcePoint> {
    let boundary_surfaces = query.bounds.as_surfaces();
    let mut cast_surfaces: Vec<&dyn Surface> = Vec::with_capacity(query.all_surfaces.len() + 4);
    for s in query.all_surfaces {
        if query.exclude_surface == Some(&s.id()) {
            continue;
        }
        cast_surfaces.push(*s);
    }
    for b in &boundary_surfaces {
        cast_surfaces.push(b);
    }

    let targets = enumerate_targets(query);
    let mut next_ray_id = 0u64;
    let mut points = Vec::with_capacity(targets.len() * 2);

    for target in &targets {
        let Some(reached) = cast_one(query, &cast_surfaces, target, cfg) else {
            debug!(target: "reflectrace::visibility", point = ?target.point, "ray target produced no hit at all");
            continue;
        };
        let is_blocking_junction = matches!(
            target.provenance,
            TargetProvenance::Junction { blocking: true, .. }
        );
        if !reached {
            points.push(to_blocked_source_point(query, &cast_surfaces, target, cfg));
            continue;
        }
        if is_blocking_junction {
            points.push(target_to_source_point(target, None));
            continue;
        }
        let ray_id = ContinuationRayId(next_ray_id);
        next_ray_id += 1;
        let source_point = target_to_source_point(target, Some(ray_id));
        points.push(source_point);
        if let Some(final_point) = cast_continuation(query, &cast_surfaces, target, ray_id, cfg) {
            points.push(final_point);
        }
    }

    if query.range_limit.is_some() {
        points.extend(arc_junction_points(query));
    }

    let ref_dir = query.cone.reference_direction(query.origin);
    sort_by_angle(&mut points, ref_dir, cfg.collinear_eps, |p| {
        let d = p.compute_xy() - query.origin;
        if d.norm() <= 0.0 {
            ref_dir
        } else {
            d
        }
    });
    dedup(points)
}

fn enumerate_targets(query: &VisibilityQuery<'_>) -> Vec<RayTarget> {
    let mut targets = Vec::new();

    for (chain_index, chain) in query.chains.iter().enumerate() {
        for (surface, which) in chain.endpoints() {
            if let Some(point) = chain.endpoint_point(which, query.all_surfaces) {
                targets.push(RayTarget {
                    point,
                    provenance: TargetProvenance::Endpoint { surface, which },
                });
            }
        }
        for junction_index in 0..chain.junction_count() {
            let Some(j) = chain.junction(junction_index) else {
                continue;
            };
            let (before, after) = (j.before.clone(), j.after.clone());
            if let Some(point) = chain.junction_point(junction_index, query.all_surfaces) {
                let blocking = junction_blocks(query, before.clone(), after.clone(), point);
                targets.push(RayTarget {
                    point,
                    provenance: TargetProvenance::Junction {
                        chain_index,
                        junction_index,
                        before,
                        after,
                        blocking,
                    },
                });
            }
        }
    }

    for corner in query.bounds.corners() {
        targets.push(RayTarget {
            point: corner,
            provenance: TargetProvenance::BoundaryCorner,
        });
    }

    if let ConeKind::Windowed { window } = query.cone {
        targets.push(RayTarget {
            point: window.start,
            provenance: TargetProvenance::BoundaryCorner,
        });
        targets.push(RayTarget {
            point: window.end,
            provenance: TargetProvenance::BoundaryCorner,
        });
    }

    targets
}

/// A junction blocks the cast past it iff its two adjacent surfaces' outward
/// normals lie on opposite sides of the cone's reference direction
/// (`SPEC_FULL.md` §4.9 item 3, §9: resolved against the source's looser
/// "opposite sides of ref" prose by comparing outward normals directly).
fn junction_blocks(query: &VisibilityQuery<'_>, before: SurfaceId, after: SurfaceId, _point: Vec2) -> bool {
    let ref_dir = query.cone.reference_direction(query.origin);
    let find = |id: &SurfaceId| query.all_surfaces.iter().find(|s| s.id() == *id).copied();
    let (Some(before), Some(after)) = (find(&before), find(&after)) else {
        return false;
    };
    let n_before = before.orientation().outward_normal(before.segment());
    let n_after = after.orientation().outward_normal(after.segment());
    let side_before = cross(ref_dir, n_before);
    let side_after = cross(ref_dir, n_after);
    side_before.signum() != side_after.signum() && side_before != 0.0 && side_after != 0.0
}

/// Cast a ray from `query.origin` toward `target.point`; `Some(true)` if the
/// target is reached (nothing strictly closer blocks it), `Some(false)` if
/// something blocks it first, `None` if the cast produced no hit at all
/// (should not happen once the screen-bounds rectangle is in `cast_surfaces`,
/// but a caller-supplied scene with an open boundary could still produce it).
fn cast_one(
    query: &VisibilityQuery<'_>,
    cast_surfaces: &[&dyn Surface],
    target: &RayTarget,
    cfg: &GeomConfig,
) -> Option<bool> {
    let ray = Ray::new(query.origin, target.point);
    let options = hit_options(query);
    let hit = find_next_hit(ray, cast_surfaces, &options, cfg)?;
    Some(hit.t() >= 1.0 - cfg.min_t_eps)
}

fn hit_options<'a>(query: &VisibilityQuery<'a>) -> HitOptions<'a> {
    HitOptions {
        mode: HitMode::Physical,
        start_line: match query.cone {
            ConeKind::Windowed { window } => Some(window),
            ConeKind::Full => None,
        },
        exclude_surfaces: &[],
        min_t: None,
        range_limit: query.range_limit,
    }
}

fn to_blocked_source_point(
    query: &VisibilityQuery<'_>,
    cast_surfaces: &[&dyn Surface],
    target: &RayTarget,
    cfg: &GeomConfig,
) -> SourcePoint {
    let ray = Ray::new(query.origin, target.point);
    let options = hit_options(query);
    match find_next_hit(ray, cast_surfaces, &options, cfg) {
        Some(crate::strategy::Hit::Surface(h)) if ScreenBounds::is_boundary_id(&h.surface) => {
            SourcePoint::Boundary {
                point: h.point,
                continuation: None,
            }
        }
        Some(crate::strategy::Hit::Surface(h)) => SourcePoint::HitPoint {
            surface: h.surface,
            point: h.point,
            t_ray: h.t,
            s_surface: h.s,
            continuation: None,
        },
        Some(crate::strategy::Hit::Range(h)) => SourcePoint::ArcHit {
            point: h.point,
            ray_source: None,
            continuation: None,
        },
        None => SourcePoint::Boundary {
            point: target.point,
            continuation: None,
        },
    }
}

fn target_to_source_point(target: &RayTarget, continuation: Option<ContinuationRayId>) -> SourcePoint {
    match &target.provenance {
        TargetProvenance::Endpoint { surface, which } => SourcePoint::Endpoint {
            surface: surface.clone(),
            which: *which,
            point: target.point,
            continuation,
        },
        TargetProvenance::Junction {
            chain_index,
            junction_index,
            before,
            after,
            blocking,
        } => SourcePoint::Junction {
            chain_index: *chain_index,
            junction_index: *junction_index,
            before: before.clone(),
            after: after.clone(),
            point: target.point,
            blocking: *blocking,
            continuation,
        },
        TargetProvenance::BoundaryCorner => SourcePoint::Boundary {
            point: target.point,
            continuation,
        },
    }
}

/// Cast past a reached, non-blocking target to find the next thing the same
/// ray direction encounters.
fn cast_continuation(
    query: &VisibilityQuery<'_>,
    cast_surfaces: &[&dyn Surface],
    target: &RayTarget,
    ray_id: ContinuationRayId,
    cfg: &GeomConfig,
) -> Option<SourcePoint> {
    let direction = target.point - query.origin;
    if direction.norm() <= 0.0 {
        return None;
    }
    let far_target = query.origin + direction * 1e6;
    let ray = Ray::new(query.origin, far_target);
    let mut options = hit_options(query);
    options.min_t = Some(1.0 / 1e6 + cfg.min_t_eps);
    let hit = find_next_hit(ray, cast_surfaces, &options, cfg)?;
    let point = match hit {
        crate::strategy::Hit::Surface(h) if ScreenBounds::is_boundary_id(&h.surface) => SourcePoint::Boundary {
            point: h.point,
            continuation: Some(ray_id),
        },
        crate::strategy::Hit::Surface(h) => SourcePoint::HitPoint {
            surface: h.surface,
            point: h.point,
            t_ray: h.t,
            s_surface: h.s,
            continuation: Some(ray_id),
        },
        crate::strategy::Hit::Range(h) => SourcePoint::ArcHit {
            point: h.point,
            ray_source: None,
            continuation: Some(ray_id),
        },
    };
    Some(point)
}

/// Where the range-limit circle meets the cone's boundary rays (windowed),
/// or the two canonical diametric points along the axis (full), per
/// `SPEC_FULL.md` §4.10.
fn arc_junction_points(query: &VisibilityQuery<'_>) -> Vec<SourcePoint> {
    let Some(range_limit) = query.range_limit else {
        return Vec::new();
    };
    match query.cone {
        ConeKind::Full => {
            let axis = crate::visibility::cone::full_cone_axis();
            vec![
                SourcePoint::ArcJunction {
                    point: range_limit.center + axis * range_limit.radius,
                    boundary: BoundarySide::AxisPositive,
                },
                SourcePoint::ArcJunction {
                    point: range_limit.center - axis * range_limit.radius,
                    boundary: BoundarySide::AxisNegative,
                },
            ]
        }
        ConeKind::Windowed { window } => {
            let mut out = Vec::with_capacity(2);
            if let Some((_, p)) = nearest_forward(&range_limit, query.origin, window.start - query.origin) {
                out.push(SourcePoint::ArcJunction {
                    point: p,
                    boundary: BoundarySide::WindowStart,
                });
            }
            if let Some((_, p)) = nearest_forward(&range_limit, query.origin, window.end - query.origin) {
                out.push(SourcePoint::ArcJunction {
                    point: p,
                    boundary: BoundarySide::WindowEnd,
                });
            }
            out
        }
    }
}

fn nearest_forward(range_limit: &RangeLimit, source: Vec2, dir: Vec2) -> Option<(f64, Vec2)> {
    range_limit
        .line_intersections(source, dir)
        .into_iter()
        .find(|(t, _)| *t > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range_limit::RangeOrientation;
    use crate::surface::{PlaneSurface, ReflectiveSide, SurfaceClass};
    use nalgebra::vector;

    fn window_wall(id: &str) -> PlaneSurface {
        PlaneSurface {
            id: SurfaceId::new(id),
            segment: Segment::new(vector![100.0, -50.0], vector![100.0, 50.0]),
            classification: SurfaceClass::Reflective,
            orientation: crate::surface::Orientation::new(ReflectiveSide::Right),
        }
    }

    #[test]
    fn unobstructed_full_cone_yields_four_boundary_corners() {
        let bounds = ScreenBounds::new(0.0, 0.0, 800.0, 600.0);
        let origin = vector![400.0, 300.0];
        let query = VisibilityQuery {
            origin,
            cone: ConeKind::Full,
            chains: &[],
            all_surfaces: &[],
            bounds,
            exclude_surface: None,
            range_limit: None,
        };
        let cfg = GeomConfig::default();
        let polygon = project(&query, &cfg);
        assert_eq!(polygon.len(), 4);
        for p in &polygon {
            assert!(matches!(p, SourcePoint::Boundary { .. }));
        }
    }

    #[test]
    fn a_wall_between_origin_and_far_corner_occludes_it() {
        let bounds = ScreenBounds::new(0.0, -200.0, 800.0, 200.0);
        let wall = window_wall("wall");
        let all: Vec<&dyn Surface> = vec![&wall];
        let origin = vector![0.0, 0.0];
        let query = VisibilityQuery {
            origin,
            cone: ConeKind::Full,
            chains: &[],
            all_surfaces: &all,
            bounds,
            exclude_surface: None,
            range_limit: None,
        };
        let cfg = GeomConfig::default();
        let polygon = project(&query, &cfg);
        let has_wall_hit = polygon
            .iter()
            .any(|p| p.surface_id() == Some(&SurfaceId::new("wall")));
        assert!(has_wall_hit);
    }

    #[test]
    fn range_limited_full_cone_adds_two_arc_junctions() {
        let bounds = ScreenBounds::new(-1000.0, -1000.0, 1000.0, 1000.0);
        let origin = vector![0.0, 0.0];
        let query = VisibilityQuery {
            origin,
            cone: ConeKind::Full,
            chains: &[],
            all_surfaces: &[],
            bounds,
            exclude_surface: None,
            range_limit: Some(RangeLimit::new(origin, 50.0, RangeOrientation::Inside)),
        };
        let cfg = GeomConfig::default();
        let polygon = project(&query, &cfg);
        let arc_junctions = polygon
            .iter()
            .filter(|p| matches!(p, SourcePoint::ArcJunction { .. }))
            .count();
        assert_eq!(arc_junctions, 2);
    }
}
