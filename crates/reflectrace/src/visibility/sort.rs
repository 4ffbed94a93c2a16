//! Angular ordering of visibility-polygon vertices, using signed cross
//! products exclusively — never `atan2` (`SPEC_FULL.md` §4.9 item 4).
//!
//! The technique is the classic `atan2`-free polar sort: project each
//! direction onto the `(ref, ref_perp)` frame via `dot`/`cross` to decide
//! which half-turn it falls in, then break ties within a half-turn with a
//! plain cross-product sign. Because that projection is an orientation
//! preserving linear map, comparing the *original* vectors' cross product
//! for the within-half tie-break is equivalent to comparing their images.

use std::cmp::Ordering;

use crate::geom::{cross, Vec2};

/// `true` when `dir` falls in the second half-turn (clockwise) of a sweep
/// starting at `ref_dir` and going counter-clockwise through the first
/// half-turn; `false` for the first half-turn, including `dir == ref_dir`
/// itself.
fn in_second_half(ref_dir: Vec2, dir: Vec2, eps: f64) -> bool {
    let w = cross(ref_dir, dir);
    if w > eps {
        false
    } else if w < -eps {
        true
    } else {
        ref_dir.dot(&dir) < 0.0
    }
}

/// Angular comparator: orders directions by a sweep starting at `ref_dir`.
/// Two directions that lie on opposite sides of `ref_dir` are ordered by
/// which half-turn they fall in; two on the same side are ordered by the
/// sign of their mutual cross product.
pub fn angular_cmp(ref_dir: Vec2, a: Vec2, b: Vec2, eps: f64) -> Ordering {
    let ha = in_second_half(ref_dir, a, eps);
    let hb = in_second_half(ref_dir, b, eps);
    if ha != hb {
        return ha.cmp(&hb);
    }
    let c = cross(a, b);
    if c > eps {
        Ordering::Less
    } else if c < -eps {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Sort `items` in place by the angular order of `direction_of(item)`
/// relative to `ref_dir`.
pub fn sort_by_angle<T>(items: &mut [T], ref_dir: Vec2, eps: f64, direction_of: impl Fn(&T) -> Vec2) {
    items.sort_by(|a, b| angular_cmp(ref_dir, direction_of(a), direction_of(b), eps));
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn sweep_from_positive_x_axis_orders_counterclockwise() {
        let ref_dir = vector![1.0, 0.0];
        let mut dirs = vec![
            vector![0.0, -1.0],  // -90deg
            vector![-1.0, 0.0],  // 180deg
            vector![1.0, 0.0],   // 0deg
            vector![0.0, 1.0],   // 90deg
        ];
        sort_by_angle(&mut dirs, ref_dir, 1e-9, |d| *d);
        assert_eq!(
            dirs,
            vec![
                vector![1.0, 0.0],
                vector![0.0, 1.0],
                vector![-1.0, 0.0],
                vector![0.0, -1.0],
            ]
        );
    }

    #[test]
    fn angular_cmp_is_consistent_with_a_full_sort() {
        let ref_dir = vector![0.3, 0.7];
        let mut dirs: Vec<Vec2> = (0..16)
            .map(|i| {
                let theta = (i as f64) * std::f64::consts::TAU / 16.0;
                vector![theta.cos(), theta.sin()]
            })
            .collect();
        sort_by_angle(&mut dirs, ref_dir, 1e-9, |d| *d);
        // The sorted order must be a rotation of the original cyclic order:
        // find where the first element landed and check the rest follow in
        // the same cyclic sequence.
        let start = (0..16)
            .find(|&i| {
                let theta = (i as f64) * std::f64::consts::TAU / 16.0;
                (vector![theta.cos(), theta.sin()] - dirs[0]).norm() < 1e-9
            })
            .unwrap();
        for (k, d) in dirs.iter().enumerate() {
            let theta = ((start + k) % 16) as f64 * std::f64::consts::TAU / 16.0;
            assert!((vector![theta.cos(), theta.sin()] - d).norm() < 1e-9);
        }
    }
}
