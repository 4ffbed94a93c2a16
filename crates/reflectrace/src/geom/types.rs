//! Basic 2D value types shared by every other module.
//!
//! - `Vec2`: a point or free vector, backed by `nalgebra::Vector2<f64>`.
//! - `Segment`: a bounded line between two points.
//! - `Ray`: a `source` and a `target` *point on the intended line* — never a
//!   direction. Every length/direction computation derives from the two
//!   points, which keeps reflected rays exact across chains (see
//!   `propagator`).

use nalgebra::Vector2;

/// A point or free vector in the plane.
pub type Vec2 = Vector2<f64>;

/// A bounded line segment between two endpoints.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    #[inline]
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }

    #[inline]
    pub fn midpoint(&self) -> Vec2 {
        (self.start + self.end) * 0.5
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    /// Point at parameter `t` along `start -> end` (`t=0` is `start`, `t=1` is `end`).
    #[inline]
    pub fn point_at(&self, t: f64) -> Vec2 {
        self.start + self.direction() * t
    }
}

/// A ray defined by a source and a point on its intended line.
///
/// `target` is never normalized into a direction: keeping it as a point lets
/// every downstream computation (intersection, reflection) stay in terms of
/// two points, which is what makes image-space propagation exact.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Ray {
    pub source: Vec2,
    pub target: Vec2,
}

impl Ray {
    #[inline]
    pub fn new(source: Vec2, target: Vec2) -> Self {
        Self { source, target }
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.target - self.source
    }

    /// Point at parameter `t` along `source -> target` (`t=1` is `target`).
    #[inline]
    pub fn point_at(&self, t: f64) -> Vec2 {
        self.source + self.direction() * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn segment_point_at_endpoints() {
        let s = Segment::new(vector![0.0, 0.0], vector![4.0, 0.0]);
        assert_eq!(s.point_at(0.0), vector![0.0, 0.0]);
        assert_eq!(s.point_at(1.0), vector![4.0, 0.0]);
        assert_eq!(s.midpoint(), vector![2.0, 0.0]);
        assert!((s.length() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn ray_direction_and_point_at() {
        let r = Ray::new(vector![1.0, 1.0], vector![1.0, 5.0]);
        assert_eq!(r.direction(), vector![0.0, 4.0]);
        assert_eq!(r.point_at(0.5), vector![1.0, 3.0]);
    }
}
