//! `ReflectionEngine`: the stateful facade of `SPEC_FULL.md` §4.11/§6.
//!
//! Owns the current scene/query state, memoises the last
//! `FullTrajectoryResult`, and notifies registered observers synchronously
//! on recomputation. Setters invalidate; getters recompute lazily on first
//! access after invalidation and memoise until the next setter call.

use std::rc::Rc;

use crate::cache::ReflectionCache;
use crate::config::{GeomConfig, SearchLimits};
use crate::error::EngineError;
use crate::full_trajectory::{self, FullTrajectoryResult};
use crate::geom::Vec2;
use crate::image_chain::{evaluate_bypass, ImageChain};
use crate::range_limit::RangeLimit;
use crate::surface::{Surface, SurfaceChain, SurfaceId};
use crate::visibility::{self, ConeKind, ScreenBounds, SourcePoint, VisibilityQuery};

/// A scene and its derived, memoised results.
///
/// Generic over a caller-supplied `Surface` implementation so collaborators
/// can plug in their own scene representation (see `crate::surface`'s module
/// doc); this crate's own tests and demos instantiate it with `PlaneSurface`.
pub struct ReflectionEngine<S: Surface> {
    player: Vec2,
    cursor: Vec2,
    planned_surfaces: Vec<SurfaceId>,
    all_surfaces: Vec<S>,
    chains: Vec<SurfaceChain>,
    range_limit: Option<RangeLimit>,
    cfg: GeomConfig,
    limits: SearchLimits,
    cached_trajectory: Option<FullTrajectoryResult>,
    observers: Vec<Box<dyn Fn(&FullTrajectoryResult)>>,
}

impl<S: Surface> ReflectionEngine<S> {
    pub fn new(cfg: GeomConfig, limits: SearchLimits) -> Self {
        Self {
            player: Vec2::zeros(),
            cursor: Vec2::zeros(),
            planned_surfaces: Vec::new(),
            all_surfaces: Vec::new(),
            chains: Vec::new(),
            range_limit: None,
            cfg,
            limits,
            cached_trajectory: None,
            observers: Vec::new(),
        }
    }

    fn invalidate(&mut self) {
        self.cached_trajectory = None;
    }

    pub fn set_player(&mut self, player: Vec2) {
        self.player = player;
        self.invalidate();
    }

    pub fn set_cursor(&mut self, cursor: Vec2) {
        self.cursor = cursor;
        self.invalidate();
    }

    pub fn set_planned_surfaces(&mut self, planned: Vec<SurfaceId>) {
        self.planned_surfaces = planned;
        self.invalidate();
    }

    pub fn set_all_surfaces(&mut self, surfaces: Vec<S>) {
        self.all_surfaces = surfaces;
        self.invalidate();
    }

    /// Replace the surface-chain list, validating that every surface id a
    /// chain names is present in `all_surfaces` (a malformed scene, signalled
    /// as a defect rather than silently producing an incomplete polygon).
    pub fn set_chains(&mut self, chains: Vec<SurfaceChain>) -> Result<(), EngineError> {
        for (chain_index, chain) in chains.iter().enumerate() {
            for surface in &chain.surfaces {
                if !self.all_surfaces.iter().any(|s| s.id() == *surface) {
                    return Err(EngineError::ChainReferencesUnknownSurface {
                        chain_index,
                        surface: surface.clone(),
                    });
                }
            }
        }
        self.chains = chains;
        self.invalidate();
        Ok(())
    }

    pub fn set_range_limit(&mut self, range_limit: Option<RangeLimit>) {
        self.range_limit = range_limit;
        self.invalidate();
    }

    pub fn on_results_changed(&mut self, observer: impl Fn(&FullTrajectoryResult) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn all_surfaces_dyn(&self) -> Vec<&dyn Surface> {
        self.all_surfaces.iter().map(|s| s as &dyn Surface).collect()
    }

    fn recompute(&mut self) -> &FullTrajectoryResult {
        let all: Vec<&dyn Surface> = self.all_surfaces_dyn();
        let planned: Vec<&dyn Surface> = self
            .planned_surfaces
            .iter()
            .filter_map(|id| all.iter().find(|s| s.id() == *id).copied())
            .collect();
        let cache = Rc::new(ReflectionCache::new());
        let chain = ImageChain::build(self.player, self.cursor, &planned, &cache);
        let active_ids = evaluate_bypass(&chain, &planned)
            .map(|r| r.active)
            .unwrap_or_default();
        let active: Vec<&dyn Surface> = active_ids
            .iter()
            .filter_map(|id| all.iter().find(|s| s.id() == *id).copied())
            .collect();

        let result = full_trajectory::run(
            self.player,
            self.cursor,
            &active,
            &all,
            self.range_limit,
            cache,
            &self.cfg,
            &self.limits,
        );
        for observer in &self.observers {
            observer(&result);
        }
        self.cached_trajectory = Some(result);
        self.cached_trajectory.as_ref().unwrap()
    }

    /// The current (possibly memoised) full trajectory result.
    pub fn get_full_trajectory(&mut self) -> &FullTrajectoryResult {
        if self.cached_trajectory.is_none() {
            self.recompute();
        }
        self.cached_trajectory.as_ref().unwrap()
    }

    /// `≡ get_full_trajectory().fully_aligned`.
    pub fn is_cursor_reachable(&mut self) -> bool {
        self.get_full_trajectory().fully_aligned
    }

    /// Project a visibility polygon from `origin` through `cone`, against
    /// this engine's current scene. Stateless with respect to the cached
    /// trajectory: it does not read or write `cached_trajectory`.
    ///
    /// Errors if `exclude_surface` names an id not present in `all_surfaces`
    /// (a caller bug, not a degenerate scene).
    pub fn get_visibility(
        &self,
        origin: Vec2,
        cone: ConeKind,
        bounds: ScreenBounds,
        exclude_surface: Option<&SurfaceId>,
    ) -> Result<Vec<SourcePoint>, EngineError> {
        let all: Vec<&dyn Surface> = self.all_surfaces_dyn();
        if let Some(id) = exclude_surface {
            if !all.iter().any(|s| s.id() == *id) {
                return Err(EngineError::UnknownExcludedSurface(id.clone()));
            }
        }
        let query = VisibilityQuery {
            origin,
            cone,
            chains: &self.chains,
            all_surfaces: &all,
            bounds,
            exclude_surface,
            range_limit: self.range_limit,
        };
        Ok(visibility::project(&query, &self.cfg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PlaneSurface;
    use nalgebra::vector;
    use std::cell::RefCell;

    #[test]
    fn setters_invalidate_and_getter_recomputes() {
        let mut engine = ReflectionEngine::<PlaneSurface>::new(GeomConfig::default(), SearchLimits::default());
        engine.set_player(vector![0.0, 0.0]);
        engine.set_cursor(vector![100.0, 0.0]);
        assert!(engine.is_cursor_reachable());

        engine.set_cursor(vector![200.0, 0.0]);
        assert!(engine.cached_trajectory.is_none());
        assert!(engine.is_cursor_reachable());
    }

    #[test]
    fn observer_is_invoked_once_per_recomputation() {
        let mut engine = ReflectionEngine::<PlaneSurface>::new(GeomConfig::default(), SearchLimits::default());
        let calls = Rc::new(RefCell::new(0));
        let calls_clone = Rc::clone(&calls);
        engine.on_results_changed(move |_| {
            *calls_clone.borrow_mut() += 1;
        });
        engine.set_player(vector![0.0, 0.0]);
        engine.set_cursor(vector![10.0, 0.0]);
        engine.get_full_trajectory();
        engine.get_full_trajectory();
        assert_eq!(*calls.borrow(), 1);
        engine.set_cursor(vector![20.0, 0.0]);
        engine.get_full_trajectory();
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn set_chains_rejects_unknown_surface_id() {
        let mut engine = ReflectionEngine::<PlaneSurface>::new(GeomConfig::default(), SearchLimits::default());
        let result = engine.set_chains(vec![SurfaceChain::new(vec![SurfaceId::new("missing")], false)]);
        assert!(matches!(result, Err(EngineError::ChainReferencesUnknownSurface { .. })));
    }

    #[test]
    fn get_visibility_rejects_unknown_excluded_surface() {
        let engine = ReflectionEngine::<PlaneSurface>::new(GeomConfig::default(), SearchLimits::default());
        let bounds = ScreenBounds::new(0.0, 0.0, 800.0, 600.0);
        let missing = SurfaceId::new("missing");
        let result = engine.get_visibility(vector![0.0, 0.0], ConeKind::Full, bounds, Some(&missing));
        assert!(matches!(result, Err(EngineError::UnknownExcludedSurface(id)) if id == missing));
    }
}
