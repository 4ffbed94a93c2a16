//! `TracePath`: the one loop that consumes a propagator and a strategy and
//! emits ordered segments with a termination reason.
//!
//! There were, in the system this crate replaces, two copies of this loop —
//! a legacy one keyed on ad hoc `excludeSurfaces`/`maxReflections`
//! parameters, and a strategy-based one. Only the strategy-based loop is
//! implemented here; it is authoritative.

use crate::config::{GeomConfig, SearchLimits};
use crate::geom::{line_intersection, Segment, Vec2};
use crate::propagator::RayPropagator;
use crate::strategy::{Hit, HitMode, Strategy};
use crate::surface::SurfaceId;

/// Distance a "no hit" segment is extended to, so renderers have something
/// finite to draw toward infinity. Shared with `crate::merged`, which runs
/// the same far-sentinel convention for its own no-hit case.
pub(crate) const FAR_SENTINEL_DISTANCE: f64 = 1.0e6;

/// Why a trace stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationKind {
    Cursor,
    Wall,
    OffSegment,
    NoHit,
    MaxReflections,
}

/// One emitted segment of a trace.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceSegment {
    pub start: Vec2,
    pub end: Vec2,
    pub surface: Option<SurfaceId>,
    pub on_segment: bool,
    pub can_reflect: bool,
}

/// The full output of one `TracePath::run`.
#[derive(Clone, Debug)]
pub struct TraceResult {
    pub segments: Vec<TraceSegment>,
    pub final_propagator: RayPropagator,
    pub cursor_segment_index: Option<usize>,
    pub cursor_t: Option<f64>,
    pub termination: TerminationKind,
}

/// Per-run options.
#[derive(Clone, Copy, Debug, Default)]
pub struct TraceOptions {
    /// If set, the trace stops as soon as this point falls on the current
    /// segment, emitting a final segment ending exactly there.
    pub stop_at_cursor: Option<Vec2>,
    /// If set, overrides the first segment's start point (used to resume a
    /// trace mid-flight, e.g. from a divergence point or from the cursor).
    pub continue_from_position: Option<Vec2>,
}

/// Parameter of `p` along `source -> source+direction`, assuming `p` is
/// (numerically) collinear with that line — true by construction for every
/// caller of this module (continuation points are always derived from the
/// same image-space ray they are later tested against).
fn param_of_point(source: Vec2, direction: Vec2, p: Vec2) -> f64 {
    let len_sq = direction.dot(&direction);
    if len_sq <= 0.0 {
        0.0
    } else {
        (p - source).dot(&direction) / len_sq
    }
}

/// Parametric position of `p` along `[a, b]`, if `p` lies on that segment
/// within `cfg.point_on_line_eps` of perpendicular distance. Shared with
/// `crate::merged`'s own "cursor lies on the current segment" check.
pub(crate) fn point_on_segment_param(a: Vec2, b: Vec2, p: Vec2, cfg: &GeomConfig) -> Option<f64> {
    let d = b - a;
    let len = d.norm();
    if len <= 0.0 {
        return None;
    }
    let t = (p - a).dot(&d) / (len * len);
    if !(-cfg.cursor_on_segment_eps..=1.0 + cfg.cursor_on_segment_eps).contains(&t) {
        return None;
    }
    let closest = a + d * t;
    if (closest - p).norm() > cfg.point_on_line_eps {
        return None;
    }
    Some(t)
}

/// Run `strategy` from `propagator`, emitting segments until a termination
/// condition is met.
pub fn run<'a>(
    mut propagator: RayPropagator,
    strategy: &dyn Strategy<'a>,
    options: TraceOptions,
    cfg: &GeomConfig,
    limits: &SearchLimits,
) -> TraceResult {
    let span = tracing::debug_span!(target: "reflectrace::trace", "trace_path");
    let _enter = span.enter();

    let mut segments = Vec::new();
    let mut cursor_segment_index = None;
    let mut cursor_t = None;
    let mut first_iteration = true;
    let mut start_override = options.continue_from_position;

    let termination = 'outer: loop {
        for _ in 0..limits.safety_iteration_cap {
            let ray = propagator.get_ray();
            let direction = ray.direction();

            let segment_start = if first_iteration {
                start_override.take().unwrap_or(ray.source)
            } else if let Some(start_line) = propagator.start_line {
                line_intersection(ray.source, direction, start_line.start, start_line.direction())
                    .map(|li| li.point)
                    .unwrap_or(ray.source)
            } else {
                ray.source
            };

            let min_t = if first_iteration {
                options
                    .continue_from_position
                    .map(|p| param_of_point(ray.source, direction, p))
            } else {
                None
            };
            first_iteration = false;

            let hit = strategy.find_next_hit(ray, propagator.start_line, min_t, &[], cfg);

            let hit_end = hit.as_ref().map(Hit::point).unwrap_or_else(|| {
                let len = direction.norm();
                if len <= 0.0 {
                    segment_start
                } else {
                    segment_start + direction / len * FAR_SENTINEL_DISTANCE
                }
            });

            if let Some(cursor) = options.stop_at_cursor {
                if let Some(t) = point_on_segment_param(segment_start, hit_end, cursor, cfg) {
                    segments.push(TraceSegment {
                        start: segment_start,
                        end: cursor,
                        surface: None,
                        on_segment: true,
                        can_reflect: false,
                    });
                    cursor_segment_index = Some(segments.len() - 1);
                    cursor_t = Some(t);
                    break 'outer TerminationKind::Cursor;
                }
            }

            let Some(hit) = hit else {
                segments.push(TraceSegment {
                    start: segment_start,
                    end: hit_end,
                    surface: None,
                    on_segment: false,
                    can_reflect: false,
                });
                tracing::debug!(target: "reflectrace::trace", "no_hit");
                break 'outer TerminationKind::NoHit;
            };

            let surface_id = hit.surface_id().cloned();
            segments.push(TraceSegment {
                start: segment_start,
                end: hit.point(),
                surface: surface_id.clone(),
                on_segment: hit.on_segment(),
                can_reflect: hit.can_reflect(),
            });

            if !hit.can_reflect() {
                tracing::debug!(target: "reflectrace::trace", surface = ?surface_id, "wall");
                break 'outer TerminationKind::Wall;
            }
            if strategy.mode() == HitMode::Physical && !hit.on_segment() {
                tracing::debug!(target: "reflectrace::trace", "off_segment");
                break 'outer TerminationKind::OffSegment;
            }

            let Hit::Surface(surface_hit) = &hit else {
                unreachable!("range hits always have can_reflect = false");
            };
            let surface = strategy
                .surfaces()
                .iter()
                .find(|s| s.id() == surface_hit.surface)
                .expect("hit surface must be among strategy.surfaces()");
            propagator = propagator.reflect_through(*surface);

            if propagator.depth >= limits.max_reflections {
                tracing::debug!(target: "reflectrace::trace", depth = propagator.depth, "max_reflections");
                break 'outer TerminationKind::MaxReflections;
            }
        }
        tracing::warn!(target: "reflectrace::trace", "safety_iteration_cap reached");
        break TerminationKind::MaxReflections;
    };

    TraceResult {
        segments,
        final_propagator: propagator,
        cursor_segment_index,
        cursor_t,
        termination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ReflectionCache;
    use crate::strategy::PhysicalStrategy;
    use crate::surface::{PlaneSurface, ReflectiveSide, Surface};
    use nalgebra::vector;
    use std::rc::Rc;

    #[test]
    fn no_surfaces_direct_shot() {
        let surfaces: Vec<&dyn Surface> = vec![];
        let strategy = PhysicalStrategy::new(&surfaces, None);
        let cache = Rc::new(ReflectionCache::new());
        let propagator = RayPropagator::new(vector![0.0, 0.0], vector![100.0, 0.0], cache);
        let cfg = GeomConfig::default();
        let limits = SearchLimits::default();
        let result = run(propagator, &strategy, TraceOptions::default(), &cfg, &limits);
        assert_eq!(result.termination, TerminationKind::NoHit);
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segments[0].start, vector![0.0, 0.0]);
    }

    #[test]
    fn blocked_by_absorbing_wall() {
        let wall = PlaneSurface::absorbing("wall", Segment::new(vector![50.0, -50.0], vector![50.0, 50.0]));
        let surfaces: Vec<&dyn Surface> = vec![&wall];
        let strategy = PhysicalStrategy::new(&surfaces, None);
        let cache = Rc::new(ReflectionCache::new());
        let propagator = RayPropagator::new(vector![0.0, 0.0], vector![100.0, 0.0], cache);
        let cfg = GeomConfig::default();
        let limits = SearchLimits::default();
        let result = run(propagator, &strategy, TraceOptions::default(), &cfg, &limits);
        assert_eq!(result.termination, TerminationKind::Wall);
        assert_eq!(result.segments.len(), 1);
        assert!((result.segments[0].end - vector![50.0, 0.0]).norm() < 1e-9);
    }

    #[test]
    fn reflects_off_single_mirror_then_runs_to_far_sentinel() {
        let mirror = PlaneSurface::reflective(
            "m",
            Segment::new(vector![200.0, 0.0], vector![200.0, 200.0]),
            ReflectiveSide::Left,
        );
        let surfaces: Vec<&dyn Surface> = vec![&mirror];
        let strategy = PhysicalStrategy::new(&surfaces, None);
        let cache = Rc::new(ReflectionCache::new());
        let propagator = RayPropagator::new(vector![100.0, 100.0], vector![300.0, 100.0], cache);
        let cfg = GeomConfig::default();
        let limits = SearchLimits::default();
        let result = run(propagator, &strategy, TraceOptions::default(), &cfg, &limits);
        assert_eq!(result.termination, TerminationKind::NoHit);
        assert_eq!(result.segments.len(), 2);
        assert!((result.segments[0].end - vector![200.0, 100.0]).norm() < 1e-9);
        assert_eq!(result.segments[0].surface, Some(mirror.id()));
    }

    #[test]
    fn stops_exactly_at_cursor_when_on_path() {
        let surfaces: Vec<&dyn Surface> = vec![];
        let strategy = PhysicalStrategy::new(&surfaces, None);
        let cache = Rc::new(ReflectionCache::new());
        let propagator = RayPropagator::new(vector![0.0, 0.0], vector![100.0, 0.0], cache);
        let cfg = GeomConfig::default();
        let limits = SearchLimits::default();
        let opts = TraceOptions {
            stop_at_cursor: Some(vector![40.0, 0.0]),
            continue_from_position: None,
        };
        let result = run(propagator, &strategy, opts, &cfg, &limits);
        assert_eq!(result.termination, TerminationKind::Cursor);
        assert_eq!(result.segments.len(), 1);
        assert!((result.segments[0].end - vector![40.0, 0.0]).norm() < 1e-9);
        assert_eq!(result.cursor_segment_index, Some(0));
    }
}
