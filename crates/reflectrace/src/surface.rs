//! The surface model: an opaque, immutable-per-query reflector or absorber,
//! plus the chain structure that groups surfaces sharing endpoints.
//!
//! Why a trait instead of fields
//! - The production prototype this crate replaces carried two incompatible
//!   shapes for a "surface" test double (plain `normal`/`canReflect` fields
//!   vs. methods). This crate settles on the method-based form: `Surface` is
//!   a trait so callers can plug in their own scene representation as long
//!   as it can answer `id`/`segment`/`classification`/`orientation`; hit
//!   detection and the cache only ever call through the trait.

use std::fmt;

use crate::geom::{Segment, Vec2};

/// Stable identity for a surface within one query. Backed by a string so
/// tie-breaks in hit detection (`crate::strategy`) have a total, deterministic
/// order independent of insertion sequence.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct SurfaceId(pub String);

impl SurfaceId {
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of the segment's directed line (`start -> end`) is the
/// reflective face. `Left` is the side where [`crate::geom::side_of_segment`]
/// is positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ReflectiveSide {
    Left,
    Right,
}

/// A surface's reflective half-plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Orientation {
    pub reflective_side: ReflectiveSide,
}

impl Orientation {
    #[inline]
    pub fn new(reflective_side: ReflectiveSide) -> Self {
        Self { reflective_side }
    }

    /// Outward-facing unit normal of the reflective face for `segment`.
    pub fn outward_normal(&self, segment: Segment) -> Vec2 {
        let d = segment.direction();
        let perp_left = Vec2::new(-d.y, d.x);
        let n = match self.reflective_side {
            ReflectiveSide::Left => perp_left,
            ReflectiveSide::Right => -perp_left,
        };
        let len = n.norm();
        if len <= 0.0 {
            n
        } else {
            n / len
        }
    }
}

/// Whether a surface reflects or absorbs incoming light.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SurfaceClass {
    Reflective,
    Absorbing,
}

/// An opaque, immutable-per-query scene surface.
///
/// `can_reflect_from` has a default implementation in terms of
/// `classification`/`orientation`/`segment`; override it only if a caller's
/// scene representation has a cheaper or more specific capability rule.
pub trait Surface: fmt::Debug {
    fn id(&self) -> SurfaceId;
    fn segment(&self) -> Segment;
    fn classification(&self) -> SurfaceClass;
    fn orientation(&self) -> Orientation;

    /// Whether a ray travelling in `direction` can reflect off this surface,
    /// i.e. whether it is reflective and `direction` approaches the
    /// reflective face (rather than grazing past its back).
    fn can_reflect_from(&self, direction: Vec2) -> bool {
        if self.classification() != SurfaceClass::Reflective {
            return false;
        }
        let n = self.orientation().outward_normal(self.segment());
        direction.dot(&n) < 0.0
    }
}

/// A straightforward, concrete [`Surface`] implementation backed by plain
/// fields — the default scene representation used by this crate's own
/// tests, demos, and benches.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlaneSurface {
    pub id: SurfaceId,
    pub segment: Segment,
    pub classification: SurfaceClass,
    pub orientation: Orientation,
}

impl PlaneSurface {
    pub fn reflective(id: impl Into<String>, segment: Segment, reflective_side: ReflectiveSide) -> Self {
        Self {
            id: SurfaceId::new(id),
            segment,
            classification: SurfaceClass::Reflective,
            orientation: Orientation::new(reflective_side),
        }
    }

    pub fn absorbing(id: impl Into<String>, segment: Segment) -> Self {
        Self {
            id: SurfaceId::new(id),
            segment,
            classification: SurfaceClass::Absorbing,
            // Orientation is irrelevant for an absorbing wall; pick a side
            // arbitrarily so the type stays total.
            orientation: Orientation::new(ReflectiveSide::Left),
        }
    }
}

impl Surface for PlaneSurface {
    fn id(&self) -> SurfaceId {
        self.id.clone()
    }
    fn segment(&self) -> Segment {
        self.segment
    }
    fn classification(&self) -> SurfaceClass {
        self.classification
    }
    fn orientation(&self) -> Orientation {
        self.orientation
    }
}

/// Which end of a surface an [`Endpoint`]/[`Junction`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EndpointWhich {
    Start,
    End,
}

/// An ordered sequence of surfaces that share endpoints, by id.
///
/// A chain does not own its surfaces: it is a view over `all_surfaces`,
/// resolved at query time so chains never need back-pointers into surfaces
/// (see the design note on cyclic references in `SPEC_FULL.md` §9).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceChain {
    pub surfaces: Vec<SurfaceId>,
    pub closed: bool,
}

impl SurfaceChain {
    pub fn new(surfaces: Vec<SurfaceId>, closed: bool) -> Self {
        Self { surfaces, closed }
    }

    /// Number of junctions in this chain: `len` for closed chains (wrapping),
    /// `len.saturating_sub(1)` for open chains.
    pub fn junction_count(&self) -> usize {
        if self.surfaces.is_empty() {
            0
        } else if self.closed {
            self.surfaces.len()
        } else {
            self.surfaces.len() - 1
        }
    }

    /// The `(before, after)` surface ids of junction `index`, where junction
    /// `index` sits between `surfaces[index]` and `surfaces[index+1]`
    /// (wrapping for closed chains).
    pub fn junction(&self, index: usize) -> Option<Junction<'_>> {
        if index >= self.junction_count() {
            return None;
        }
        let before = &self.surfaces[index];
        let after = &self.surfaces[(index + 1) % self.surfaces.len()];
        Some(Junction {
            chain: self,
            index,
            before,
            after,
        })
    }

    /// Non-shared ends of an open chain. Empty for a closed chain.
    pub fn endpoints(&self) -> Vec<(SurfaceId, EndpointWhich)> {
        if self.closed || self.surfaces.is_empty() {
            return Vec::new();
        }
        vec![
            (self.surfaces[0].clone(), EndpointWhich::Start),
            (
                self.surfaces[self.surfaces.len() - 1].clone(),
                EndpointWhich::End,
            ),
        ]
    }

    /// Resolve junction `index`'s point against `surfaces` (a lookup for the
    /// whole scene). The two adjacent surfaces are expected to share this
    /// point exactly; in debug builds a mismatch trips an assertion, in
    /// release it is averaged away rather than panicking on bad scene data.
    pub fn junction_point(&self, index: usize, surfaces: &[&dyn Surface]) -> Option<Vec2> {
        let j = self.junction(index)?;
        let before = surfaces.iter().find(|s| s.id() == *j.before)?;
        let after = surfaces.iter().find(|s| s.id() == *j.after)?;
        let (p_before, p_after) = (before.segment().end, after.segment().start);
        debug_assert!(
            (p_before - p_after).norm() < 1e-6,
            "chain junction {index}: before.end and after.start do not coincide"
        );
        Some((p_before + p_after) * 0.5)
    }

    /// Resolve the non-shared end `which` of an open chain against `surfaces`.
    pub fn endpoint_point(&self, which: EndpointWhich, surfaces: &[&dyn Surface]) -> Option<Vec2> {
        let (id, end) = self.endpoints().into_iter().find(|(_, w)| *w == which)?;
        let surface = surfaces.iter().find(|s| s.id() == id)?;
        Some(match end {
            EndpointWhich::Start => surface.segment().start,
            EndpointWhich::End => surface.segment().end,
        })
    }
}

/// A shared endpoint between two consecutive surfaces of a chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Junction<'a> {
    pub chain: &'a SurfaceChain,
    pub index: usize,
    pub before: &'a SurfaceId,
    pub after: &'a SurfaceId,
}
