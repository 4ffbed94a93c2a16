//! Image-space ray propagation.
//!
//! A [`RayPropagator`] is immutable: `reflect_through` always returns a new
//! value. Image-space propagation always reflects *both* `origin_image` and
//! `target_image` and derives direction from the pair afterwards — never
//! "direction + reflect normal" — which is what keeps the ray exact across
//! long reflection chains (the two reflected points compose through the
//! cache's identity guarantee, so error cannot accumulate between them).

use std::rc::Rc;

use crate::cache::ReflectionCache;
use crate::geom::{Ray, Segment, Vec2};
use crate::surface::{Surface, SurfaceId};

/// Immutable state of a ray as it is propagated through reflections in
/// image space. Cloning is cheap: the underlying cache is reference-counted.
#[derive(Clone, Debug)]
pub struct RayPropagator {
    pub origin_image: Vec2,
    pub target_image: Vec2,
    pub depth: u32,
    pub last_surface: Option<SurfaceId>,
    pub start_line: Option<Segment>,
    cache: Rc<ReflectionCache>,
}

impl RayPropagator {
    pub fn new(origin: Vec2, target: Vec2, cache: Rc<ReflectionCache>) -> Self {
        Self {
            origin_image: origin,
            target_image: target,
            depth: 0,
            last_surface: None,
            start_line: None,
            cache,
        }
    }

    /// The current image-space ray: `source` is the (possibly reflected)
    /// origin image, `target` is the (possibly reflected) target image.
    #[inline]
    pub fn get_ray(&self) -> Ray {
        Ray::new(self.origin_image, self.target_image)
    }

    /// Reflect both images through `surface`, advancing depth and recording
    /// `surface`'s segment as the new `start_line`: hit detection from the
    /// returned propagator only accepts hits strictly past this line.
    pub fn reflect_through(&self, surface: &dyn Surface) -> Self {
        let origin_image = self.cache.reflect(self.origin_image, surface);
        let target_image = self.cache.reflect(self.target_image, surface);
        Self {
            origin_image,
            target_image,
            depth: self.depth + 1,
            last_surface: Some(surface.id()),
            start_line: Some(surface.segment()),
            cache: Rc::clone(&self.cache),
        }
    }

    /// An independent propagator sharing the same cache lineage; equivalent
    /// to `clone()`, named separately to document intent at call sites.
    #[inline]
    pub fn fork(&self) -> Self {
        self.clone()
    }

    pub fn cache(&self) -> &Rc<ReflectionCache> {
        &self.cache
    }
}

/// Reflect `p` successively through `surfaces`, in order.
pub fn reflect_chain_forward(p: Vec2, surfaces: &[&dyn Surface], cache: &ReflectionCache) -> Vec2 {
    surfaces.iter().fold(p, |acc, s| cache.reflect(acc, *s))
}

/// Reflect `p` successively through `surfaces`, in reverse order. Used to
/// pre-reflect a cursor backward through an ordered planned-surface list
/// (`crate::merged`, `crate::image_chain`).
pub fn reflect_chain_backward(p: Vec2, surfaces: &[&dyn Surface], cache: &ReflectionCache) -> Vec2 {
    surfaces.iter().rev().fold(p, |acc, s| cache.reflect(acc, *s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{PlaneSurface, ReflectiveSide};
    use nalgebra::vector;

    #[test]
    fn reflect_through_advances_depth_and_start_line() {
        let cache = Rc::new(ReflectionCache::new());
        let p = RayPropagator::new(vector![100.0, 100.0], vector![300.0, 100.0], cache);
        assert_eq!(p.depth, 0);
        assert!(p.start_line.is_none());

        let s = PlaneSurface::reflective(
            "s0",
            crate::geom::Segment::new(vector![200.0, 0.0], vector![200.0, 200.0]),
            ReflectiveSide::Left,
        );
        let p2 = p.reflect_through(&s);
        assert_eq!(p2.depth, 1);
        assert_eq!(p2.last_surface, Some(s.id()));
        assert_eq!(p2.start_line, Some(s.segment()));
        // origin image unaffected by target's reflection and vice versa.
        assert!((p2.origin_image - vector![300.0, 100.0]).norm() < 1e-9);
    }

    #[test]
    fn reflecting_twice_through_same_surface_returns_original_images() {
        let cache = Rc::new(ReflectionCache::new());
        let p = RayPropagator::new(vector![100.0, 100.0], vector![300.0, 100.0], cache);
        let s = PlaneSurface::reflective(
            "s0",
            crate::geom::Segment::new(vector![200.0, 0.0], vector![200.0, 200.0]),
            ReflectiveSide::Left,
        );
        let once = p.reflect_through(&s);
        let twice = once.reflect_through(&s);
        assert!((twice.origin_image - p.origin_image).norm() < 1e-12);
        assert!((twice.target_image - p.target_image).norm() < 1e-12);
    }
}
