//! Geometry primitives: points, segments, rays, and the exact predicates
//! built on top of them.
//!
//! Kept minimal and numerically explicit: every other module composes these
//! functions rather than reaching into `nalgebra` directly for anything
//! beyond plain vector arithmetic.

mod predicates;
mod types;

pub use predicates::{
    collinear_from_origin, cross, line_intersection, reflect_point, ray_vs_segment_line, side,
    side_of_segment, LineIntersection,
};
pub use types::{Ray, Segment, Vec2};
