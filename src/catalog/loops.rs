//! Boundary loop extraction from sampled edges

use crate::geometry::{is_near, loop_area, Point};

/// Closed loops chained from a face's edges
#[derive(Debug, Clone, Default)]
pub struct LoopSet {
    /// Closed loops, largest area first
    pub loops: Vec<Vec<Point>>,

    /// Chains that never returned to their start point
    pub open_chains: usize,

    /// Closed chains with fewer than three distinct points
    pub degenerate: usize,
}

impl LoopSet {
    /// Outer boundary (largest loop)
    pub fn outer(&self) -> Option<&Vec<Point>> {
        self.loops.first()
    }

    /// Inner boundaries (every loop but the largest)
    pub fn holes(&self) -> &[Vec<Point>] {
        self.loops.get(1..).unwrap_or(&[])
    }

    /// All loop points in order
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.loops.iter().flatten()
    }
}

/// Append `points` to `loop_points`, skipping points that coincide with the
/// current last point
fn append_points<'a, I>(loop_points: &mut Vec<Point>, points: I, snap_tol: f64)
where
    I: Iterator<Item = &'a Point>,
{
    for p in points {
        if loop_points.last().map_or(true, |last| !is_near(last, p, snap_tol)) {
            loop_points.push(*p);
        }
    }
}

/// Chain sampled edges into closed loops by matching endpoints
///
/// Each entry of `edges` is one edge's ordered sample points (start first,
/// end last). Edges are consumed greedily: a chain grows by any unused edge
/// whose start or end lies within `snap_tol` of the chain's current end,
/// reversing the edge when needed. A chain that cannot close is discarded.
pub fn chain_loops(edges: &[Vec<Point>], snap_tol: f64) -> LoopSet {
    let mut set = LoopSet::default();
    let mut used = vec![false; edges.len()];

    while let Some(first) = used.iter().position(|u| !u) {
        used[first] = true;
        let first_edge = &edges[first];
        let (Some(&start), Some(&end)) = (first_edge.first(), first_edge.last()) else {
            continue;
        };

        let mut points = Vec::new();
        append_points(&mut points, first_edge.iter(), snap_tol);
        let mut current = end;

        while !is_near(&current, &start, snap_tol) {
            let next = edges.iter().enumerate().find_map(|(k, edge)| {
                if used[k] {
                    return None;
                }
                match (edge.first(), edge.last()) {
                    (Some(s), Some(_)) if is_near(&current, s, snap_tol) => Some((k, false)),
                    (Some(_), Some(e)) if is_near(&current, e, snap_tol) => Some((k, true)),
                    _ => None,
                }
            });

            let Some((k, reverse)) = next else {
                break;
            };
            used[k] = true;
            let edge = &edges[k];
            if reverse {
                append_points(&mut points, edge.iter().rev(), snap_tol);
                current = edge[0];
            } else {
                append_points(&mut points, edge.iter(), snap_tol);
                current = edge[edge.len() - 1];
            }
        }

        if !is_near(&current, &start, snap_tol) {
            set.open_chains += 1;
            continue;
        }

        while points.len() > 1 && is_near(&points[0], &points[points.len() - 1], snap_tol) {
            points.pop();
        }

        if points.len() >= 3 {
            set.loops.push(points);
        } else {
            set.degenerate += 1;
        }
    }

    set.loops
        .sort_by(|a, b| loop_area(b).total_cmp(&loop_area(a)));
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn segments(corners: &[Point]) -> Vec<Vec<Point>> {
        let n = corners.len();
        (0..n)
            .map(|i| vec![corners[i], corners[(i + 1) % n]])
            .collect()
    }

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point> {
        vec![
            Point::new(x0, y0, 0.0),
            Point::new(x0 + size, y0, 0.0),
            Point::new(x0 + size, y0 + size, 0.0),
            Point::new(x0, y0 + size, 0.0),
        ]
    }

    #[test]
    fn test_chain_square() {
        let set = chain_loops(&segments(&square(0.0, 0.0, 10.0)), 0.01);
        assert_eq!(set.loops.len(), 1);
        assert_eq!(set.loops[0].len(), 4);
        assert_eq!(set.open_chains, 0);
        assert_relative_eq!(loop_area(&set.loops[0]), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_chain_reversed_and_shuffled_edges() {
        let mut edges = segments(&square(0.0, 0.0, 10.0));
        edges[1].reverse();
        edges.swap(0, 2);
        let set = chain_loops(&edges, 0.01);
        assert_eq!(set.loops.len(), 1);
        assert_eq!(set.loops[0].len(), 4);
    }

    #[test]
    fn test_chain_with_hole_sorted_by_area() {
        let mut edges = segments(&square(4.0, 4.0, 2.0));
        edges.extend(segments(&square(0.0, 0.0, 10.0)));
        let set = chain_loops(&edges, 0.01);

        assert_eq!(set.loops.len(), 2);
        assert_relative_eq!(loop_area(set.outer().unwrap()), 100.0, epsilon = 1e-9);
        assert_eq!(set.holes().len(), 1);
        assert_relative_eq!(loop_area(&set.holes()[0]), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_open_chain_discarded() {
        let mut edges = segments(&square(0.0, 0.0, 10.0));
        edges.pop();
        let set = chain_loops(&edges, 0.01);
        assert!(set.loops.is_empty());
        assert_eq!(set.open_chains, 1);
    }

    #[test]
    fn test_snap_tolerance() {
        let mut edges = segments(&square(0.0, 0.0, 10.0));
        edges[2][0].x += 0.005;
        let set = chain_loops(&edges, 0.01);
        assert_eq!(set.loops.len(), 1);
    }

    #[test]
    fn test_single_closed_edge() {
        let circle: Vec<Point> = (0..=17)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / 17.0;
                Point::new(t.cos(), t.sin(), 0.0)
            })
            .collect();
        let set = chain_loops(&[circle], 0.01);
        assert_eq!(set.loops.len(), 1);
        assert_eq!(set.loops[0].len(), 17);
    }
}
