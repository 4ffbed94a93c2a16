//! Cone shape: full (unbounded angular range) or windowed (bounded by the
//! two rays to a segment's endpoints).
//!
//! The production source this crate replaces left the full-cone reference
//! direction implicit; per `SPEC_FULL.md` §9 this implementation fixes it
//! to the scene-stable axis `(1, 0)` and treats that as an explicit
//! invariant rather than an incidental default.

use crate::geom::{Segment, Vec2};

/// The scene-stable reference axis used for a full cone's angular sort and
/// junction-blocking test (`SPEC_FULL.md` §9, §4.9 item 3). Never collinear
/// with a boundary ray in practice because a full cone has none.
#[inline]
pub fn full_cone_axis() -> Vec2 {
    Vec2::new(1.0, 0.0)
}

/// The cone's angular shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConeKind {
    /// Unbounded angular range (360 degrees around `origin`).
    Full,
    /// Bounded by the two rays `origin -> window.start`, `origin -> window.end`.
    /// `window` is also the *start line* for every hit detection cast
    /// through this cone (rays must land strictly past it).
    Windowed { window: Segment },
}

impl ConeKind {
    /// The reference direction used for junction blocking and angular sort:
    /// `origin - window.midpoint()` for a windowed cone, the canonical
    /// axis for a full cone.
    pub fn reference_direction(&self, origin: Vec2) -> Vec2 {
        match self {
            ConeKind::Full => full_cone_axis(),
            ConeKind::Windowed { window } => {
                let r = origin - window.midpoint();
                if r.norm() <= 0.0 {
                    full_cone_axis()
                } else {
                    r
                }
            }
        }
    }

    /// The surface id to exclude from hit-detection (the window segment
    /// itself never self-occludes a windowed cone); `None` for a full cone.
    pub fn excluded_window(&self) -> Option<Segment> {
        match self {
            ConeKind::Full => None,
            ConeKind::Windowed { window } => Some(*window),
        }
    }
}
