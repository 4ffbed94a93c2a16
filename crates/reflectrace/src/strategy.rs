//! Hit detection: one shared `find_next_hit` and the two strategies
//! (`Physical`, `Planned`) that wrap it with different surface sets and
//! acceptance rules.
//!
//! Why a `Strategy` trait
//! - The production prototype kept a strategy's surface list behind a
//!   closure/weak-reference so `min_t` continuation queries could reach back
//!   into it. Here that becomes an explicit `surfaces()` accessor on a plain
//!   trait object — no closures, no globals.

use crate::config::GeomConfig;
use crate::geom::{ray_vs_segment_line, Ray, Segment, Vec2};
use crate::range_limit::RangeLimit;
use crate::surface::{Surface, SurfaceId};

/// Which hit-detection rules apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitMode {
    /// Bounded segments, `can_reflect_from` enforced, range limit enforced.
    Physical,
    /// Extended infinite lines, every hit is reflectable, range limit ignored.
    Planned,
}

/// A hit on a surface's (bounded or extended) line.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceHit {
    pub surface: SurfaceId,
    pub point: Vec2,
    /// Parameter along the ray (`source -> target`); `t=1` is `target`.
    pub t: f64,
    /// Parameter along the surface's segment (`start -> end`).
    pub s: f64,
    /// Whether `s` falls in `[0, 1]`, computed regardless of mode.
    pub on_segment: bool,
    pub can_reflect: bool,
}

/// A hit on the range-limit circle rather than on any surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeHit {
    pub point: Vec2,
    pub t: f64,
}

/// The outcome of [`find_next_hit`].
#[derive(Clone, Debug, PartialEq)]
pub enum Hit {
    Surface(SurfaceHit),
    Range(RangeHit),
}

impl Hit {
    pub fn point(&self) -> Vec2 {
        match self {
            Hit::Surface(h) => h.point,
            Hit::Range(h) => h.point,
        }
    }

    pub fn t(&self) -> f64 {
        match self {
            Hit::Surface(h) => h.t,
            Hit::Range(h) => h.t,
        }
    }

    pub fn can_reflect(&self) -> bool {
        matches!(self, Hit::Surface(h) if h.can_reflect)
    }

    pub fn on_segment(&self) -> bool {
        matches!(self, Hit::Surface(h) if h.on_segment)
    }

    pub fn surface_id(&self) -> Option<&SurfaceId> {
        match self {
            Hit::Surface(h) => Some(&h.surface),
            Hit::Range(_) => None,
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Hit::Range(_))
    }
}

/// Per-call options for [`find_next_hit`].
#[derive(Clone, Debug)]
pub struct HitOptions<'a> {
    pub mode: HitMode,
    /// The surface whose line the ray was just reflected off; hits at or
    /// before it are rejected (strict past-the-reflector rule).
    pub start_line: Option<Segment>,
    pub exclude_surfaces: &'a [SurfaceId],
    pub min_t: Option<f64>,
    pub range_limit: Option<RangeLimit>,
}

impl<'a> HitOptions<'a> {
    pub fn new(mode: HitMode) -> Self {
        Self {
            mode,
            start_line: None,
            exclude_surfaces: &[],
            min_t: None,
            range_limit: None,
        }
    }
}

/// Find the nearest accepted hit for `ray` against `surfaces`, under `options`.
pub fn find_next_hit(
    ray: Ray,
    surfaces: &[&dyn Surface],
    options: &HitOptions,
    cfg: &GeomConfig,
) -> Option<Hit> {
    let direction = ray.direction();
    let mut lower_bound = options.min_t.unwrap_or(0.0);
    if let Some(start_line) = options.start_line {
        if let Some((t_sl, _)) = ray_vs_segment_line(ray.source, ray.target, start_line) {
            lower_bound = lower_bound.max(t_sl);
        }
    }
    let min_t = lower_bound + cfg.min_t_eps;

    let mut best: Option<SurfaceHit> = None;
    for surface in surfaces {
        let id = surface.id();
        if options.exclude_surfaces.contains(&id) {
            continue;
        }
        let Some((t, s)) = ray_vs_segment_line(ray.source, ray.target, surface.segment()) else {
            continue;
        };
        if t <= min_t {
            continue;
        }
        let on_segment = (-cfg.cursor_on_segment_eps..=1.0 + cfg.cursor_on_segment_eps).contains(&s);
        if options.mode == HitMode::Physical && !on_segment {
            continue;
        }
        let can_reflect = match options.mode {
            HitMode::Physical => surface.can_reflect_from(direction),
            HitMode::Planned => true,
        };
        let point = ray.point_at(t);
        let candidate = SurfaceHit {
            surface: id,
            point,
            t,
            s,
            on_segment,
            can_reflect,
        };
        best = Some(match best {
            None => candidate,
            Some(cur) => pick_better(cur, candidate),
        });
    }

    let Some(range_limit) = options.range_limit else {
        return best.map(Hit::Surface);
    };

    let exceeds = best
        .as_ref()
        .map(|h| !range_limit.is_allowed(h.point))
        .unwrap_or(false);
    if let Some(h) = &best {
        if !exceeds {
            return Some(Hit::Surface(h.clone()));
        }
    }
    if let Some((t, point)) = range_limit.exit_crossing(ray.source, direction, min_t) {
        if best.as_ref().map(|h| t < h.t).unwrap_or(true) {
            return Some(Hit::Range(RangeHit { point, t }));
        }
    }
    best.map(Hit::Surface)
}

fn pick_better(a: SurfaceHit, b: SurfaceHit) -> SurfaceHit {
    const TIE_EPS: f64 = 1e-9;
    if (a.t - b.t).abs() > TIE_EPS {
        return if a.t < b.t { a } else { b };
    }
    if a.surface != b.surface {
        return if a.surface < b.surface { a } else { b };
    }
    if a.s <= b.s {
        a
    } else {
        b
    }
}

/// A fixed surface set + mode + (optional) range limit; `TracePath` supplies
/// the per-step `start_line`/`min_t`/`exclude_surfaces` on every call.
pub trait Strategy<'a> {
    fn surfaces(&self) -> &[&'a dyn Surface];
    fn mode(&self) -> HitMode;
    fn range_limit(&self) -> Option<RangeLimit>;

    fn find_next_hit(
        &self,
        ray: Ray,
        start_line: Option<Segment>,
        min_t: Option<f64>,
        exclude_surfaces: &[SurfaceId],
        cfg: &GeomConfig,
    ) -> Option<Hit> {
        let options = HitOptions {
            mode: self.mode(),
            start_line,
            exclude_surfaces,
            min_t,
            range_limit: self.range_limit(),
        };
        find_next_hit(ray, self.surfaces(), &options, cfg)
    }
}

/// All scene surfaces; respects `can_reflect_from` and a range limit.
pub struct PhysicalStrategy<'a> {
    surfaces: &'a [&'a dyn Surface],
    range_limit: Option<RangeLimit>,
}

impl<'a> PhysicalStrategy<'a> {
    pub fn new(surfaces: &'a [&'a dyn Surface], range_limit: Option<RangeLimit>) -> Self {
        Self { surfaces, range_limit }
    }
}

impl<'a> Strategy<'a> for PhysicalStrategy<'a> {
    fn surfaces(&self) -> &[&'a dyn Surface] {
        self.surfaces
    }
    fn mode(&self) -> HitMode {
        HitMode::Physical
    }
    fn range_limit(&self) -> Option<RangeLimit> {
        self.range_limit
    }
}

/// Only the planned surfaces; every hit is reflectable, range limit ignored.
pub struct PlannedStrategy<'a> {
    surfaces: &'a [&'a dyn Surface],
}

impl<'a> PlannedStrategy<'a> {
    pub fn new(surfaces: &'a [&'a dyn Surface]) -> Self {
        Self { surfaces }
    }
}

impl<'a> Strategy<'a> for PlannedStrategy<'a> {
    fn surfaces(&self) -> &[&'a dyn Surface] {
        self.surfaces
    }
    fn mode(&self) -> HitMode {
        HitMode::Planned
    }
    fn range_limit(&self) -> Option<RangeLimit> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Segment;
    use crate::range_limit::RangeOrientation;
    use crate::surface::{PlaneSurface, ReflectiveSide};
    use nalgebra::vector;

    #[test]
    fn physical_rejects_off_segment_hit() {
        let s = PlaneSurface::reflective(
            "s0",
            Segment::new(vector![200.0, 0.0], vector![200.0, 5.0]),
            ReflectiveSide::Left,
        );
        let surfaces: Vec<&dyn Surface> = vec![&s];
        let ray = Ray::new(vector![0.0, 100.0], vector![400.0, 100.0]);
        let opts = HitOptions::new(HitMode::Physical);
        let cfg = GeomConfig::default();
        assert!(find_next_hit(ray, &surfaces, &opts, &cfg).is_none());
    }

    #[test]
    fn planned_accepts_extended_line_hit() {
        let s = PlaneSurface::reflective(
            "s0",
            Segment::new(vector![200.0, 0.0], vector![200.0, 5.0]),
            ReflectiveSide::Left,
        );
        let surfaces: Vec<&dyn Surface> = vec![&s];
        let ray = Ray::new(vector![0.0, 100.0], vector![400.0, 100.0]);
        let opts = HitOptions::new(HitMode::Planned);
        let cfg = GeomConfig::default();
        let hit = find_next_hit(ray, &surfaces, &opts, &cfg).unwrap();
        assert!(!hit.on_segment());
        assert!(hit.can_reflect());
    }

    #[test]
    fn start_line_rejects_hit_at_or_before_reflector() {
        let s0 = PlaneSurface::reflective(
            "s0",
            Segment::new(vector![0.0, -10.0], vector![0.0, 10.0]),
            ReflectiveSide::Right,
        );
        let surfaces: Vec<&dyn Surface> = vec![&s0];
        let ray = Ray::new(vector![0.0, 0.0], vector![10.0, 0.0]);
        let mut opts = HitOptions::new(HitMode::Physical);
        opts.start_line = Some(s0.segment());
        let cfg = GeomConfig::default();
        assert!(find_next_hit(ray, &surfaces, &opts, &cfg).is_none());
    }

    #[test]
    fn tie_break_prefers_lower_surface_id() {
        let a = PlaneSurface::reflective(
            "a",
            Segment::new(vector![10.0, -5.0], vector![10.0, 5.0]),
            ReflectiveSide::Right,
        );
        let b = PlaneSurface::reflective(
            "b",
            Segment::new(vector![10.0, -5.0], vector![10.0, 5.0]),
            ReflectiveSide::Right,
        );
        let surfaces: Vec<&dyn Surface> = vec![&b, &a];
        let ray = Ray::new(vector![0.0, 0.0], vector![1.0, 0.0]);
        let opts = HitOptions::new(HitMode::Physical);
        let cfg = GeomConfig::default();
        let hit = find_next_hit(ray, &surfaces, &opts, &cfg).unwrap();
        assert_eq!(hit.surface_id().unwrap().0, "a");
    }

    #[test]
    fn range_limit_converts_distant_hit_to_range_hit() {
        let s = PlaneSurface::absorbing("far", Segment::new(vector![1000.0, -5.0], vector![1000.0, 5.0]));
        let surfaces: Vec<&dyn Surface> = vec![&s];
        let ray = Ray::new(vector![0.0, 0.0], vector![1.0, 0.0]);
        let mut opts = HitOptions::new(HitMode::Physical);
        opts.range_limit = Some(RangeLimit::new(vector![0.0, 0.0], 100.0, RangeOrientation::Inside));
        let cfg = GeomConfig::default();
        let hit = find_next_hit(ray, &surfaces, &opts, &cfg).unwrap();
        assert!(hit.is_range());
        assert!((hit.point() - vector![100.0, 0.0]).norm() < 1e-6);
    }
}
