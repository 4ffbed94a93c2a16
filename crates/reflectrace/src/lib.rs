//! 2D reflection/trajectory/visibility engine.
//!
//! Computes, for a scene of reflective and absorbing line segments, the
//! planned and physical trajectories of a shot from a player position toward
//! a cursor position under an intended sequence of reflections, and the
//! visibility polygons obtained by projecting a light cone from an origin
//! through those same surfaces. See `crate::engine::ReflectionEngine` for the
//! public entry point.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod full_trajectory;
pub mod geom;
pub mod image_chain;
pub mod invariants;
pub mod merged;
pub mod propagator;
pub mod range_limit;
pub mod scene;
pub mod strategy;
pub mod surface;
pub mod trace;
pub mod visibility;

pub use cache::ReflectionCache;
pub use config::{GeomConfig, SearchLimits};
pub use engine::ReflectionEngine;
pub use error::EngineError;
pub use full_trajectory::FullTrajectoryResult;
pub use geom::{Ray, Segment, Vec2};
pub use image_chain::{BypassReason, BypassResult, ImageChain};
pub use merged::MergedResult;
pub use propagator::RayPropagator;
pub use range_limit::{RangeLimit, RangeOrientation};
pub use scene::SceneQuery;
pub use strategy::{Hit, HitMode, PhysicalStrategy, PlannedStrategy, Strategy};
pub use surface::{PlaneSurface, Surface, SurfaceChain, SurfaceClass, SurfaceId};
pub use trace::{TerminationKind, TraceResult, TraceSegment};
pub use visibility::{ConeKind, ScreenBounds, SourcePoint};
