//! Memoised point-through-surface reflection.
//!
//! Contract: pure function of `(p, s)`; idempotent identity
//! `reflect(reflect(p,s),s) ≡ p`, where "≡" means the *exact* `Vec2`
//! previously stored for `p` is returned, not a numerically close copy.
//! This is why the cache stores the reverse mapping `(q,s) -> p` whenever it
//! computes `(p,s) -> q`: the second reflection is a cache hit, not a
//! recomputation, so floating-point round-trip error can never appear.
//!
//! Identity here means exact bit-pattern identity of the point's
//! coordinates, not nominal/pointer identity — `Vec2` is a plain value type.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::geom::{reflect_point, Vec2};
use crate::surface::{Surface, SurfaceId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct PointKey(u64, u64);

impl From<Vec2> for PointKey {
    #[inline]
    fn from(p: Vec2) -> Self {
        Self(p.x.to_bits(), p.y.to_bits())
    }
}

/// Running hit/miss counters for cache tuning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Hit rate in `[0, 1]`; `0.0` when nothing has been queried yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Per-query memoisation of point-through-surface reflection.
///
/// Shared across a [`crate::propagator::RayPropagator`] lineage via `Rc`
/// (queries are single-threaded, see the crate's concurrency model), so every
/// reflection along one trace consults and grows the same table.
#[derive(Debug, Default)]
pub struct ReflectionCache {
    map: RefCell<HashMap<(PointKey, SurfaceId), Vec2>>,
    stats: RefCell<CacheStats>,
}

impl ReflectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reflect `p` through `surface`, memoised.
    pub fn reflect(&self, p: Vec2, surface: &dyn Surface) -> Vec2 {
        let id = surface.id();
        let key = (PointKey::from(p), id.clone());
        if let Some(&q) = self.map.borrow().get(&key) {
            self.stats.borrow_mut().hits += 1;
            tracing::trace!(target: "reflectrace::cache", surface = %id, "hit");
            return q;
        }
        self.stats.borrow_mut().misses += 1;
        tracing::trace!(target: "reflectrace::cache", surface = %id, "miss");
        let q = reflect_point(p, surface.segment());
        let mut map = self.map.borrow_mut();
        map.insert(key, q);
        map.insert((PointKey::from(q), id), p);
        q
    }

    pub fn stats(&self) -> CacheStats {
        *self.stats.borrow()
    }
}

impl Drop for ReflectionCache {
    fn drop(&mut self) {
        let stats = self.stats();
        if stats.hits + stats.misses > 0 {
            tracing::debug!(
                target: "reflectrace::cache",
                hits = stats.hits,
                misses = stats.misses,
                hit_rate = stats.hit_rate(),
                "reflection cache retired"
            );
        }
    }
}
