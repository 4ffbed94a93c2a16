//! Screen bounds: the rectangle that terminates a full (or windowed) cone
//! when no scene surface stands in the way first.
//!
//! Modelled as four synthetic absorbing surfaces so the same
//! `find_next_hit` used for every other cast also terminates rays that
//! would otherwise run to infinity — the rectangle is "part of the scene"
//! for hit-detection purposes, matching how most 2D visibility-polygon
//! algorithms treat their viewport.

use crate::geom::{Segment, Vec2};
use crate::surface::{PlaneSurface, ReflectiveSide, SurfaceId};

/// Axis-aligned screen rectangle, `{minX,minY,maxX,maxY}` per `SPEC_FULL.md` §6.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScreenBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ScreenBounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The four corners, in a fixed winding order starting at `(minX, minY)`.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.min_x, self.min_y),
            Vec2::new(self.max_x, self.min_y),
            Vec2::new(self.max_x, self.max_y),
            Vec2::new(self.min_x, self.max_y),
        ]
    }

    /// Four absorbing surfaces along the rectangle's edges, with ids
    /// reserved for this purpose (never collide with caller-supplied
    /// surface ids in practice; callers own their own id namespace).
    pub fn as_surfaces(&self) -> [PlaneSurface; 4] {
        let c = self.corners();
        [
            PlaneSurface {
                id: SurfaceId::new("__bounds_bottom__"),
                segment: Segment::new(c[0], c[1]),
                classification: crate::surface::SurfaceClass::Absorbing,
                orientation: crate::surface::Orientation::new(ReflectiveSide::Left),
            },
            PlaneSurface {
                id: SurfaceId::new("__bounds_right__"),
                segment: Segment::new(c[1], c[2]),
                classification: crate::surface::SurfaceClass::Absorbing,
                orientation: crate::surface::Orientation::new(ReflectiveSide::Left),
            },
            PlaneSurface {
                id: SurfaceId::new("__bounds_top__"),
                segment: Segment::new(c[2], c[3]),
                classification: crate::surface::SurfaceClass::Absorbing,
                orientation: crate::surface::Orientation::new(ReflectiveSide::Left),
            },
            PlaneSurface {
                id: SurfaceId::new("__bounds_left__"),
                segment: Segment::new(c[3], c[0]),
                classification: crate::surface::SurfaceClass::Absorbing,
                orientation: crate::surface::Orientation::new(ReflectiveSide::Left),
            },
        ]
    }

    /// Whether `id` names one of this rectangle's synthetic boundary
    /// surfaces, used to classify a hit as [`crate::visibility::SourcePoint::Boundary`]
    /// rather than [`crate::visibility::SourcePoint::HitPoint`].
    pub fn is_boundary_id(id: &SurfaceId) -> bool {
        matches!(
            id.0.as_str(),
            "__bounds_bottom__" | "__bounds_right__" | "__bounds_top__" | "__bounds_left__"
        )
    }
}
