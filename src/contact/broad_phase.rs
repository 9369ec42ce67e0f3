//! Body-level broad phase over a uniform grid of padded bounding boxes

use crate::geometry::Aabb;
use std::collections::{HashMap, HashSet};

/// Padded bounding box of one body
#[derive(Debug, Clone, Copy)]
pub struct BodyBounds {
    /// Index of the body in the caller's list
    pub index: usize,
    pub aabb: Aabb,
}

impl BodyBounds {
    /// Bounds expanded by `padding` on every side
    pub fn padded(index: usize, aabb: &Aabb, padding: f64) -> Self {
        Self {
            index,
            aabb: aabb.padded(padding),
        }
    }
}

/// Grid cell size: twice the median of the bodies' largest extents
///
/// Empty input falls back to 1.0 and a vanishing size to 1e-3.
pub fn compute_cell_size(bounds: &[BodyBounds]) -> f64 {
    if bounds.is_empty() {
        return 1.0;
    }

    let mut extents: Vec<f64> = bounds.iter().map(|b| b.aabb.max_extent()).collect();
    extents.sort_by(f64::total_cmp);

    let cell_size = extents[extents.len() / 2] * 2.0;
    if cell_size < 1e-6 {
        1e-3
    } else {
        cell_size
    }
}

fn cell_range(min: f64, max: f64, cell_size: f64) -> std::ops::RangeInclusive<i64> {
    (min / cell_size).floor() as i64..=(max / cell_size).floor() as i64
}

/// Every unique pair `(lo, hi)` of body indices whose boxes overlap
///
/// Each body is registered in every cell its box touches; co-resident
/// bodies are proposed once per pair and confirmed with an exact box test.
/// The result is sorted.
pub fn neighbor_pairs(bounds: &[BodyBounds], cell_size: f64) -> Vec<(usize, usize)> {
    let mut cells: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();

    for (slot, b) in bounds.iter().enumerate() {
        let min = b.aabb.min;
        let max = b.aabb.max;
        for ix in cell_range(min.x, max.x, cell_size) {
            for iy in cell_range(min.y, max.y, cell_size) {
                for iz in cell_range(min.z, max.z, cell_size) {
                    cells.entry((ix, iy, iz)).or_default().push(slot);
                }
            }
        }
    }

    let mut seen: HashSet<u64> = HashSet::new();
    let mut pairs = Vec::new();

    for members in cells.values() {
        for (i, &sa) in members.iter().enumerate() {
            for &sb in &members[i + 1..] {
                let (lo, hi) = if sa < sb { (sa, sb) } else { (sb, sa) };
                let key = ((lo as u64) << 32) | hi as u64;
                if !seen.insert(key) {
                    continue;
                }
                if bounds[lo].aabb.overlaps(&bounds[hi].aabb) {
                    let (a, b) = (bounds[lo].index, bounds[hi].index);
                    pairs.push(if a < b { (a, b) } else { (b, a) });
                }
            }
        }
    }

    pairs.sort_unstable();
    pairs
}

/// Exhaustive pair list, used below the grid threshold
pub fn all_pairs(bounds: &[BodyBounds]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, a) in bounds.iter().enumerate() {
        for b in &bounds[i + 1..] {
            if a.aabb.overlaps(&b.aabb) {
                pairs.push((a.index.min(b.index), a.index.max(b.index)));
            }
        }
    }
    pairs.sort_unstable();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use approx::assert_relative_eq;

    fn cube(index: usize, x: f64, size: f64) -> BodyBounds {
        BodyBounds {
            index,
            aabb: Aabb::new(Point::new(x, 0.0, 0.0), Point::new(x + size, size, size)),
        }
    }

    #[test]
    fn test_cell_size() {
        assert_relative_eq!(compute_cell_size(&[]), 1.0);

        let bounds = vec![cube(0, 0.0, 1.0), cube(1, 5.0, 2.0), cube(2, 9.0, 10.0)];
        assert_relative_eq!(compute_cell_size(&bounds), 4.0);

        let points = vec![cube(0, 0.0, 0.0)];
        assert_relative_eq!(compute_cell_size(&points), 1e-3);
    }

    #[test]
    fn test_neighbor_pairs() {
        let bounds = vec![
            cube(0, 0.0, 1.0),
            cube(1, 1.0, 1.0), // touches 0
            cube(2, 10.0, 1.0),
            cube(3, 10.5, 1.0), // overlaps 2
        ];
        let pairs = neighbor_pairs(&bounds, compute_cell_size(&bounds));
        assert_eq!(pairs, vec![(0, 1), (2, 3)]);
        assert_eq!(all_pairs(&bounds), pairs);
    }

    #[test]
    fn test_neighbor_pairs_across_cells() {
        // Large body spanning many cells of small neighbors
        let mut bounds: Vec<BodyBounds> = (0..5).map(|i| cube(i, i as f64 * 3.0, 1.0)).collect();
        bounds.push(BodyBounds {
            index: 5,
            aabb: Aabb::new(Point::new(-1.0, 0.5, 0.5), Point::new(20.0, 0.6, 0.6)),
        });

        let pairs = neighbor_pairs(&bounds, compute_cell_size(&bounds));
        assert_eq!(pairs, vec![(0, 5), (1, 5), (2, 5), (3, 5), (4, 5)]);
    }

    #[test]
    fn test_padding_creates_pair() {
        let aabb_a = Aabb::new(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 1.0));
        let aabb_b = Aabb::new(Point::new(1.5, 0.0, 0.0), Point::new(2.5, 1.0, 1.0));

        let tight = vec![BodyBounds::padded(0, &aabb_a, 0.1), BodyBounds::padded(1, &aabb_b, 0.1)];
        assert!(neighbor_pairs(&tight, compute_cell_size(&tight)).is_empty());

        let loose = vec![BodyBounds::padded(0, &aabb_a, 0.3), BodyBounds::padded(1, &aabb_b, 0.3)];
        assert_eq!(neighbor_pairs(&loose, compute_cell_size(&loose)), vec![(0, 1)]);
    }
}
