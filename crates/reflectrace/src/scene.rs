//! `SceneQuery`: the plain-data bundle a collaborator assembles before
//! handing a scene to the engine facade, so tests and the randomized
//! generator can build a query without touching engine internals.

use crate::geom::Vec2;
use crate::range_limit::RangeLimit;
use crate::surface::{PlaneSurface, Surface, SurfaceChain, SurfaceId};

/// A complete, serializable description of one query's scene and endpoints.
///
/// `all_surfaces` is `Vec<PlaneSurface>` rather than `Vec<Box<dyn Surface>>`:
/// a plain-data bundle that round-trips through `serde` cannot carry trait
/// objects, and `PlaneSurface` is this crate's own concrete `Surface` anyway
/// (see `crate::surface`'s module doc on why the trait exists at all).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneQuery {
    pub player: Vec2,
    pub cursor: Vec2,
    pub planned_surfaces: Vec<SurfaceId>,
    pub all_surfaces: Vec<PlaneSurface>,
    pub chains: Vec<SurfaceChain>,
    pub range_limit: Option<RangeLimit>,
}

impl SceneQuery {
    /// Borrowed view of `all_surfaces` as trait objects, ready for
    /// `find_next_hit`/`Strategy` consumption.
    pub fn all_surfaces_dyn(&self) -> Vec<&dyn Surface> {
        self.all_surfaces.iter().map(|s| s as &dyn Surface).collect()
    }

    /// Borrowed view of only the planned surfaces, in plan order; `None` if
    /// `planned_surfaces` names an id absent from `all_surfaces` (a
    /// malformed scene, not degenerate geometry).
    pub fn planned_surfaces_dyn(&self) -> Option<Vec<&dyn Surface>> {
        self.planned_surfaces
            .iter()
            .map(|id| self.all_surfaces.iter().find(|s| s.id() == *id).map(|s| s as &dyn Surface))
            .collect()
    }
}
