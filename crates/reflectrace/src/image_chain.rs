//! `ImageChain`: forward player images and backward cursor images through an
//! ordered planned-surface list, plus the `BypassEvaluator` that filters
//! that list down to the surfaces a shot could actually reach.
//!
//! Cyclic references (a surface pointing back at its chain) are avoided the
//! way `SPEC_FULL.md` calls for: surfaces are looked up by id against a
//! caller-supplied slice, never stored as back-pointers.

use crate::cache::ReflectionCache;
use crate::error::EngineError;
use crate::geom::{line_intersection, side_of_segment, Vec2};
use crate::propagator::reflect_chain_backward;
use crate::surface::{ReflectiveSide, Surface, SurfaceId};

fn on_reflective_side(surface: &dyn Surface, p: Vec2) -> bool {
    let s = side_of_segment(surface.segment(), p);
    match surface.orientation().reflective_side {
        ReflectiveSide::Left => s >= 0.0,
        ReflectiveSide::Right => s <= 0.0,
    }
}

/// Forward player images and backward cursor images through an ordered
/// planned-surface list `[s_0 .. s_{n-1}]`.
///
/// `player_image[i]` is `player` reflected through `s_0, .., s_{i-1}`;
/// `cursor_image[i]` is `cursor` reflected through `s_{n-1}, .., s_i`. Both
/// arrays have `n+1` entries; `reflection_point[i]` is where the line
/// `player_image[i] -> cursor_image[n-i]` crosses `s_i`'s supporting line.
#[derive(Clone, Debug)]
pub struct ImageChain {
    pub player: Vec2,
    pub cursor: Vec2,
    pub planned: Vec<SurfaceId>,
    pub player_image: Vec<Vec2>,
    pub cursor_image: Vec<Vec2>,
    pub reflection_point: Vec<Vec2>,
    pub on_segment: Vec<bool>,
    /// `true` at index `i` when the reflection-point solve was degenerate
    /// (parallel images) and fell back to `s_i`'s midpoint.
    pub degenerate: Vec<bool>,
}

impl ImageChain {
    /// Build the chain for `planned_surfaces`, in plan order.
    pub fn build(player: Vec2, cursor: Vec2, planned_surfaces: &[&dyn Surface], cache: &ReflectionCache) -> Self {
        let n = planned_surfaces.len();
        let planned: Vec<SurfaceId> = planned_surfaces.iter().map(|s| s.id()).collect();

        let mut player_image = Vec::with_capacity(n + 1);
        player_image.push(player);
        for s in planned_surfaces {
            let prev = *player_image.last().unwrap();
            player_image.push(cache.reflect(prev, *s));
        }

        let mut cursor_image = vec![Vec2::zeros(); n + 1];
        cursor_image[n] = cursor;
        for i in (0..n).rev() {
            cursor_image[i] = cache.reflect(cursor_image[i + 1], planned_surfaces[i]);
        }
        debug_assert!((cursor_image[0] - reflect_chain_backward(cursor, planned_surfaces, cache)).norm() < 1e-6);

        let mut reflection_point = Vec::with_capacity(n);
        let mut on_segment = Vec::with_capacity(n);
        let mut degenerate = Vec::with_capacity(n);
        for i in 0..n {
            let a = player_image[i];
            let b = cursor_image[n - i];
            let seg = planned_surfaces[i].segment();
            match line_intersection(a, b - a, seg.start, seg.direction()) {
                Some(li) if (b - a).norm() > 0.0 => {
                    reflection_point.push(li.point);
                    on_segment.push((-1e-6..=1.0 + 1e-6).contains(&li.u));
                    degenerate.push(false);
                }
                _ => {
                    reflection_point.push(seg.midpoint());
                    on_segment.push(true);
                    degenerate.push(true);
                }
            }
        }

        Self {
            player,
            cursor,
            planned,
            player_image,
            cursor_image,
            reflection_point,
            on_segment,
            degenerate,
        }
    }

    pub fn reflection_point_at(&self, i: usize) -> Result<Vec2, EngineError> {
        if self.reflection_point.is_empty() {
            return Err(EngineError::EmptyPlan);
        }
        self.reflection_point
            .get(i)
            .copied()
            .ok_or(EngineError::ImageChainIndexOutOfBounds {
                index: i,
                plan_len: self.reflection_point.len(),
            })
    }
}

/// Why a planned surface was removed from the active plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BypassReason {
    PlayerOnNonReflectiveSide,
    CursorOnNonReflectiveSide,
    ChainBreakAtReflectionPoint { at_index: usize },
    CursorUnreachableAfterFirstPass,
}

/// Result of [`evaluate_bypass`].
#[derive(Clone, Debug)]
pub struct BypassResult {
    /// Surviving surfaces, in original plan order.
    pub active: Vec<SurfaceId>,
    pub bypassed: Vec<(SurfaceId, BypassReason)>,
}

/// Filter `chain.planned` down to the surfaces a shot can actually reach.
///
/// `surfaces` must be the same surfaces (same ids, same order) used to
/// build `chain`; a mismatch is a caller defect, not degenerate geometry.
pub fn evaluate_bypass(chain: &ImageChain, surfaces: &[&dyn Surface]) -> Result<BypassResult, EngineError> {
    if surfaces.len() != chain.planned.len() {
        return Err(EngineError::UnknownPlannedSurface(
            chain.planned.last().cloned().unwrap_or_else(|| SurfaceId::new("")),
        ));
    }
    for (s, id) in surfaces.iter().zip(chain.planned.iter()) {
        if s.id() != *id {
            return Err(EngineError::UnknownSurfaceInChain(s.id()));
        }
    }

    let n = surfaces.len();
    let mut keep = vec![true; n];
    let mut bypassed = Vec::new();

    if n > 0 && !on_reflective_side(surfaces[0], chain.player) {
        keep[0] = false;
        bypassed.push((surfaces[0].id(), BypassReason::PlayerOnNonReflectiveSide));
    }
    if n > 0 && keep[n - 1] && !on_reflective_side(surfaces[n - 1], chain.cursor) {
        keep[n - 1] = false;
        bypassed.push((surfaces[n - 1].id(), BypassReason::CursorOnNonReflectiveSide));
    }
    for i in 0..n.saturating_sub(1) {
        if keep[i + 1] && !on_reflective_side(surfaces[i + 1], chain.reflection_point[i]) {
            keep[i + 1] = false;
            bypassed.push((
                surfaces[i + 1].id(),
                BypassReason::ChainBreakAtReflectionPoint { at_index: i },
            ));
        }
    }

    loop {
        let Some(last) = keep.iter().rposition(|&k| k) else {
            break;
        };
        if on_reflective_side(surfaces[last], chain.cursor) {
            break;
        }
        keep[last] = false;
        bypassed.push((surfaces[last].id(), BypassReason::CursorUnreachableAfterFirstPass));
    }

    let active = surfaces
        .iter()
        .zip(keep.iter())
        .filter(|(_, &k)| k)
        .map(|(s, _)| s.id())
        .collect();

    Ok(BypassResult { active, bypassed })
}
