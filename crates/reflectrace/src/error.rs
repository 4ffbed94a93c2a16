//! Defect-class errors: programmer misuse, never degenerate-but-legal input.
//!
//! Degenerate geometry (parallel reflection lines, zero-length rays, no hit)
//! is represented as data elsewhere in this crate (`Termination`,
//! `BypassReason`, `Option`s) and never surfaces here. `EngineError` is
//! reserved for the handful of public entry points that can be asked to do
//! something that is only reachable by a caller bug.

use crate::surface::SurfaceId;

/// A defect signalled by misuse of the public API, not by scene geometry.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("image-chain index {index} out of bounds for a plan of length {plan_len}")]
    ImageChainIndexOutOfBounds { index: usize, plan_len: usize },

    #[error("reflection point requested on an empty plan")]
    EmptyPlan,

    #[error("surface chain references unknown surface id {0:?}")]
    UnknownSurfaceInChain(SurfaceId),

    #[error("planned surfaces list references unknown surface id {0:?}")]
    UnknownPlannedSurface(SurfaceId),

    #[error("chain at index {chain_index} references surface id {surface:?}, which is not in all_surfaces")]
    ChainReferencesUnknownSurface {
        chain_index: usize,
        surface: SurfaceId,
    },

    #[error("excluded surface id {0:?} is not present in all_surfaces")]
    UnknownExcludedSurface(SurfaceId),
}
