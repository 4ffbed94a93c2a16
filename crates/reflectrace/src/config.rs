//! Numeric tolerances and search limits, threaded explicitly (no globals).
//!
//! Every predicate and loop in this crate takes a `GeomConfig`/`SearchLimits`
//! rather than hard-coding an epsilon; `Default` reproduces the constants
//! named throughout the design.

/// Tolerances used by the exact predicates in [`crate::geom`] and by the
/// trace loop's "cursor is on this segment" test.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeomConfig {
    /// Normalised cross-product threshold for "collinear from origin",
    /// `|a×b| / (|a|·|b|) < collinear_eps` (~0.06° at the default `1e-3`).
    pub collinear_eps: f64,
    /// Parametric slack for "the cursor lies on `[start, end]`" tests.
    pub cursor_on_segment_eps: f64,
    /// Parametric slack below which a hit is considered to coincide with
    /// the ray's own origin (guards against re-hitting the surface just
    /// reflected off of due to floating-point error).
    pub min_t_eps: f64,
    /// Absolute perpendicular-distance slack for "the cursor lies on this
    /// segment" tests, in scene coordinate units.
    pub point_on_line_eps: f64,
}

impl Default for GeomConfig {
    fn default() -> Self {
        Self {
            collinear_eps: 1e-3,
            cursor_on_segment_eps: 1e-6,
            min_t_eps: 1e-9,
            point_on_line_eps: 1e-6,
        }
    }
}

/// Bounds on how far a trace may run before giving up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SearchLimits {
    /// User-visible cap: a trace that reflects this many times terminates
    /// with [`crate::trace::TerminationKind::MaxReflections`].
    pub max_reflections: u32,
    /// Internal safety cap, strictly larger than `max_reflections`, guarding
    /// against a loop that never reaches either termination path. Reaching
    /// it is an internal fault (see `crate::trace`), not a user-visible
    /// outcome.
    pub safety_iteration_cap: u32,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_reflections: 64,
            safety_iteration_cap: 4096,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let g = GeomConfig::default();
        assert!(g.collinear_eps > 0.0 && g.collinear_eps < 1.0);
        let l = SearchLimits::default();
        assert!(l.safety_iteration_cap > l.max_reflections);
    }
}
