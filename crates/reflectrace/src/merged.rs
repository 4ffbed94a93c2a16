//! `MergedPathCalculator`: dual-strategy traversal that detects divergence
//! between the planned and physical strategies *during* the trace loop,
//! rather than tracing each independently and diffing afterward.
//!
//! Pre-reflection uses the bypass-filtered active surfaces, not the raw
//! planned list, so this module and [`crate::image_chain`] never disagree
//! about which surfaces are in play (see `SPEC_FULL.md`'s resolution of the
//! production source's pre-reflection ambiguity).

use std::rc::Rc;

use crate::cache::ReflectionCache;
use crate::config::{GeomConfig, SearchLimits};
use crate::geom::{line_intersection, Vec2};
use crate::propagator::{reflect_chain_backward, RayPropagator};
use crate::range_limit::RangeLimit;
use crate::strategy::{Hit, PhysicalStrategy, PlannedStrategy, Strategy};
use crate::surface::{Surface, SurfaceId};
use crate::trace::{self, TraceOptions, TraceSegment};

/// Which of "no hit" / "hit a surface" / "hit the range-limit arc" a
/// strategy reported, used to decide whether both strategies agree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HitIdentity {
    None,
    Surface(SurfaceId),
    Range,
}

fn identity_of(hit: &Option<Hit>) -> HitIdentity {
    match hit {
        None => HitIdentity::None,
        Some(Hit::Surface(h)) => HitIdentity::Surface(h.surface.clone()),
        Some(Hit::Range(_)) => HitIdentity::Range,
    }
}

/// The two surfaces each strategy would have taken at a divergence point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DivergenceSurfaces {
    pub physical: HitIdentity,
    pub planned: HitIdentity,
}

/// Output of [`run`].
#[derive(Clone, Debug)]
pub struct MergedResult {
    pub segments: Vec<TraceSegment>,
    pub divergence_point: Option<Vec2>,
    pub divergence_surfaces: Option<DivergenceSurfaces>,
    pub propagator_at_divergence: Option<RayPropagator>,
    pub fully_aligned: bool,
    pub reached_cursor: bool,
}

fn find_surface<'a>(id: &SurfaceId, all_surfaces: &[&'a dyn Surface]) -> Option<&'a dyn Surface> {
    all_surfaces.iter().find(|s| s.id() == *id).copied()
}

fn hit_end_or_sentinel(hit: &Option<Hit>, segment_start: Vec2, direction: Vec2) -> Vec2 {
    match hit {
        Some(h) => h.point(),
        None => {
            let len = direction.norm();
            if len <= 0.0 {
                segment_start
            } else {
                segment_start + direction / len * trace::FAR_SENTINEL_DISTANCE
            }
        }
    }
}

fn hit_t(hit: &Option<Hit>) -> f64 {
    hit.as_ref().map(Hit::t).unwrap_or(f64::INFINITY)
}

/// Run the merged traversal from `player` toward `cursor`.
///
/// `active_surfaces` is the bypass-filtered ordered planned-surface list
/// (see `crate::image_chain::BypassEvaluator`); `all_surfaces` is the
/// physical strategy's full scene surface set and must contain every
/// surface named in `active_surfaces`.
pub fn run(
    player: Vec2,
    cursor: Vec2,
    active_surfaces: &[&dyn Surface],
    all_surfaces: &[&dyn Surface],
    range_limit: Option<RangeLimit>,
    cache: Rc<ReflectionCache>,
    cfg: &GeomConfig,
    limits: &SearchLimits,
) -> MergedResult {
    let span = tracing::debug_span!(target: "reflectrace::merged", "merged_path");
    let _enter = span.enter();

    let initial_target = reflect_chain_backward(cursor, active_surfaces, &cache);
    let mut propagator = RayPropagator::new(player, initial_target, cache);

    let physical = PhysicalStrategy::new(all_surfaces, range_limit);
    let planned = PlannedStrategy::new(active_surfaces);

    let mut segments = Vec::new();
    let mut first_iteration = true;

    for _ in 0..limits.safety_iteration_cap {
        let ray = propagator.get_ray();
        let direction = ray.direction();

        let segment_start = if first_iteration {
            player
        } else if let Some(start_line) = propagator.start_line {
            line_intersection(ray.source, direction, start_line.start, start_line.direction())
                .map(|li| li.point)
                .unwrap_or(ray.source)
        } else {
            ray.source
        };
        first_iteration = false;

        let physical_hit = physical.find_next_hit(ray, propagator.start_line, None, &[], cfg);
        let planned_hit = planned.find_next_hit(ray, propagator.start_line, None, &[], cfg);

        let physical_end = hit_end_or_sentinel(&physical_hit, segment_start, direction);
        let planned_end = hit_end_or_sentinel(&planned_hit, segment_start, direction);

        let cursor_on_physical = trace::point_on_segment_param(segment_start, physical_end, cursor, cfg);
        let cursor_on_planned = trace::point_on_segment_param(segment_start, planned_end, cursor, cfg);

        if cursor_on_physical.is_some() && cursor_on_planned.is_some() {
            segments.push(TraceSegment {
                start: segment_start,
                end: cursor,
                surface: None,
                on_segment: true,
                can_reflect: false,
            });
            let continuation = trace::run(
                propagator.clone(),
                &physical,
                TraceOptions {
                    stop_at_cursor: None,
                    continue_from_position: Some(cursor),
                },
                cfg,
                limits,
            );
            segments.extend(continuation.segments);
            return MergedResult {
                segments,
                divergence_point: None,
                divergence_surfaces: None,
                propagator_at_divergence: None,
                fully_aligned: true,
                reached_cursor: true,
            };
        }

        let physical_identity = identity_of(&physical_hit);
        let planned_identity = identity_of(&planned_hit);

        if physical_identity == planned_identity {
            match physical_identity {
                HitIdentity::None => {
                    segments.push(TraceSegment {
                        start: segment_start,
                        end: physical_end,
                        surface: None,
                        on_segment: false,
                        can_reflect: false,
                    });
                    return MergedResult {
                        segments,
                        divergence_point: None,
                        divergence_surfaces: None,
                        propagator_at_divergence: None,
                        fully_aligned: true,
                        reached_cursor: false,
                    };
                }
                HitIdentity::Range => {
                    segments.push(TraceSegment {
                        start: segment_start,
                        end: physical_end,
                        surface: None,
                        on_segment: false,
                        can_reflect: false,
                    });
                    return MergedResult {
                        segments,
                        divergence_point: None,
                        divergence_surfaces: None,
                        propagator_at_divergence: None,
                        fully_aligned: false,
                        reached_cursor: false,
                    };
                }
                HitIdentity::Surface(id) => {
                    let can_reflect = physical_hit.as_ref().map(Hit::can_reflect).unwrap_or(false);
                    segments.push(TraceSegment {
                        start: segment_start,
                        end: physical_end,
                        surface: Some(id.clone()),
                        on_segment: true,
                        can_reflect,
                    });
                    if !can_reflect {
                        return MergedResult {
                            segments,
                            divergence_point: None,
                            divergence_surfaces: None,
                            propagator_at_divergence: None,
                            fully_aligned: false,
                            reached_cursor: false,
                        };
                    }
                    let Some(surface) = find_surface(&id, all_surfaces) else {
                        return MergedResult {
                            segments,
                            divergence_point: None,
                            divergence_surfaces: None,
                            propagator_at_divergence: None,
                            fully_aligned: false,
                            reached_cursor: false,
                        };
                    };
                    propagator = propagator.reflect_through(surface);
                    continue;
                }
            }
        }

        let divergence_point = if hit_t(&physical_hit) <= hit_t(&planned_hit) {
            physical_end
        } else {
            planned_end
        };
        segments.push(TraceSegment {
            start: segment_start,
            end: divergence_point,
            surface: None,
            on_segment: false,
            can_reflect: false,
        });
        return MergedResult {
            segments,
            divergence_point: Some(divergence_point),
            divergence_surfaces: Some(DivergenceSurfaces {
                physical: physical_identity,
                planned: planned_identity,
            }),
            propagator_at_divergence: Some(propagator),
            fully_aligned: false,
            reached_cursor: false,
        };
    }

    tracing::warn!(target: "reflectrace::merged", "safety_iteration_cap reached");
    MergedResult {
        segments,
        divergence_point: None,
        divergence_surfaces: None,
        propagator_at_divergence: Some(propagator),
        fully_aligned: false,
        reached_cursor: false,
    }
}
