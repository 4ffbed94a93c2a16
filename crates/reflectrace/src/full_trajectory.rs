//! `FullTrajectoryCalculator`: composes the merged traversal with the two
//! extra traces `SPEC_FULL.md` §4.7 asks for once a divergence happens, so
//! collaborators can render the red planned remainder and yellow physical
//! continuation alongside the green merged prefix.

use std::rc::Rc;

use crate::cache::ReflectionCache;
use crate::config::{GeomConfig, SearchLimits};
use crate::geom::Vec2;
use crate::merged::{self, HitIdentity, MergedResult};
use crate::range_limit::RangeLimit;
use crate::strategy::{PhysicalStrategy, PlannedStrategy, Strategy};
use crate::surface::{Surface, SurfaceClass};
use crate::trace::{self, TerminationKind, TraceOptions, TraceResult};

/// The four-section output of one full-trajectory query.
#[derive(Clone, Debug)]
pub struct FullTrajectoryResult {
    pub merged: MergedResult,
    /// Continuation of the physical strategy past the divergence point,
    /// when the physical side of the divergence was itself reflective.
    pub physical_divergent: Option<TraceResult>,
    /// The planned strategy's attempt to still reach the cursor from the
    /// divergence point, ignoring what the physical strategy actually hit.
    pub planned_to_cursor: Option<TraceResult>,
    /// Physical continuation from the cursor, once `planned_to_cursor`
    /// reached it.
    pub physical_from_cursor: Option<TraceResult>,
    pub divergence_point: Option<Vec2>,
    pub fully_aligned: bool,
}

fn find_surface<'a>(id: &crate::surface::SurfaceId, surfaces: &[&'a dyn Surface]) -> Option<&'a dyn Surface> {
    surfaces.iter().find(|s| s.id() == *id).copied()
}

/// Run the full trajectory for `(player, cursor)` against `active_surfaces`
/// (the bypass-filtered planned list, see `crate::image_chain`) and
/// `all_surfaces` (the physical strategy's full scene).
pub fn run(
    player: Vec2,
    cursor: Vec2,
    active_surfaces: &[&dyn Surface],
    all_surfaces: &[&dyn Surface],
    range_limit: Option<RangeLimit>,
    cache: Rc<ReflectionCache>,
    cfg: &GeomConfig,
    limits: &SearchLimits,
) -> FullTrajectoryResult {
    let merged = merged::run(
        player,
        cursor,
        active_surfaces,
        all_surfaces,
        range_limit,
        cache,
        cfg,
        limits,
    );

    if merged.fully_aligned {
        return FullTrajectoryResult {
            divergence_point: None,
            fully_aligned: true,
            merged,
            physical_divergent: None,
            planned_to_cursor: None,
            physical_from_cursor: None,
        };
    }

    let divergence_point = merged.divergence_point;
    let Some(propagator_at_divergence) = merged.propagator_at_divergence.clone() else {
        return FullTrajectoryResult {
            divergence_point,
            fully_aligned: false,
            merged,
            physical_divergent: None,
            planned_to_cursor: None,
            physical_from_cursor: None,
        };
    };

    let physical_divergent = merged.divergence_surfaces.as_ref().and_then(|ds| match &ds.physical {
        HitIdentity::Surface(id) => {
            let surface = find_surface(id, all_surfaces)?;
            if surface.classification() != SurfaceClass::Reflective {
                return None;
            }
            let direction = propagator_at_divergence.get_ray().direction();
            if !surface.can_reflect_from(direction) {
                return None;
            }
            let reflected = propagator_at_divergence.reflect_through(surface);
            let physical = PhysicalStrategy::new(all_surfaces, range_limit);
            Some(trace::run(reflected, &physical, TraceOptions::default(), cfg, limits))
        }
        _ => None,
    });

    let planned = PlannedStrategy::new(active_surfaces);
    let planned_to_cursor = trace::run(
        propagator_at_divergence,
        &planned,
        TraceOptions {
            stop_at_cursor: Some(cursor),
            continue_from_position: divergence_point,
        },
        cfg,
        limits,
    );

    let physical_from_cursor = if planned_to_cursor.termination == TerminationKind::Cursor {
        let physical = PhysicalStrategy::new(all_surfaces, range_limit);
        Some(trace::run(
            planned_to_cursor.final_propagator.clone(),
            &physical,
            TraceOptions {
                stop_at_cursor: None,
                continue_from_position: Some(cursor),
            },
            cfg,
            limits,
        ))
    } else {
        None
    };

    FullTrajectoryResult {
        divergence_point,
        fully_aligned: false,
        merged,
        physical_divergent,
        planned_to_cursor: Some(planned_to_cursor),
        physical_from_cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Segment;
    use crate::surface::{PlaneSurface, ReflectiveSide};
    use nalgebra::vector;

    #[test]
    fn fully_aligned_query_has_no_extra_traces() {
        let surfaces: Vec<&dyn Surface> = vec![];
        let cache = Rc::new(ReflectionCache::new());
        let cfg = GeomConfig::default();
        let limits = SearchLimits::default();
        let result = run(
            vector![0.0, 0.0],
            vector![100.0, 0.0],
            &[],
            &surfaces,
            None,
            cache,
            &cfg,
            &limits,
        );
        assert!(result.fully_aligned);
        assert!(result.physical_divergent.is_none());
        assert!(result.planned_to_cursor.is_none());
        assert!(result.physical_from_cursor.is_none());
    }

    #[test]
    fn divergence_against_reflective_surface_yields_physical_divergent() {
        // Planned path expects nothing; physical scene has a reflective wall
        // directly in front of the shot, so the physical strategy diverges
        // from "no hit" by bouncing off it.
        let mirror = PlaneSurface::reflective(
            "m",
            Segment::new(vector![50.0, -50.0], vector![50.0, 50.0]),
            ReflectiveSide::Right,
        );
        let all_surfaces: Vec<&dyn Surface> = vec![&mirror];
        let cache = Rc::new(ReflectionCache::new());
        let cfg = GeomConfig::default();
        let limits = SearchLimits::default();
        let result = run(
            vector![0.0, 0.0],
            vector![1000.0, 0.0],
            &[],
            &all_surfaces,
            None,
            cache,
            &cfg,
            &limits,
        );
        assert!(!result.fully_aligned);
        assert!(result.physical_divergent.is_some());
        assert!(result.planned_to_cursor.is_some());
    }

    #[test]
    fn divergence_against_absorbing_wall_has_no_physical_divergent() {
        let wall = PlaneSurface::absorbing("wall", Segment::new(vector![50.0, -50.0], vector![50.0, 50.0]));
        let all_surfaces: Vec<&dyn Surface> = vec![&wall];
        let cache = Rc::new(ReflectionCache::new());
        let cfg = GeomConfig::default();
        let limits = SearchLimits::default();
        let result = run(
            vector![0.0, 0.0],
            vector![100.0, 0.0],
            &[],
            &all_surfaces,
            None,
            cache,
            &cfg,
            &limits,
        );
        assert!(!result.fully_aligned);
        assert!(result.physical_divergent.is_none());
    }
}
