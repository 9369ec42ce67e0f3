//! 2D polygon overlap tests in a face's local plane frame
//!
//! Faces are projected into a shared 2D frame (see [`PlaneFrame`]) and
//! compared as polygons with holes. Two levels of overlap are provided:
//! [`polygons_overlap`] is the coarse gate (touching boundaries count), and
//! [`has_interior_overlap`] only accepts overlap of positive area, which is
//! what separates a face contact from an edge-only adjacency.

use crate::geometry::types::{Point, Point2d, Vec3};
use crate::geometry::vector::{collinear_overlap, plane_axes};

/// Orientation values within this of zero count as collinear in the
/// non-strict segment test
const COLLINEAR_EPS: f64 = 1e-12;

/// Local 2D frame on a plane
#[derive(Debug, Clone, Copy)]
pub struct PlaneFrame {
    /// Frame origin (a point on the plane)
    pub origin: Point,

    /// Unit plane normal
    pub normal: Vec3,

    /// First in-plane axis
    pub u: Vec3,

    /// Second in-plane axis
    pub v: Vec3,
}

impl PlaneFrame {
    /// Build a frame from a point on the plane and its unit normal
    pub fn new(origin: Point, normal: &Vec3) -> Self {
        let (u, v) = plane_axes(normal);
        Self {
            origin,
            normal: *normal,
            u,
            v,
        }
    }

    /// Project a 3D point into frame coordinates
    pub fn project(&self, p: &Point) -> Point2d {
        let d = p - self.origin;
        Point2d::new(d.dot(&self.u), d.dot(&self.v))
    }

    /// Project every point of a loop
    pub fn project_loop(&self, points: &[Point]) -> Vec<Point2d> {
        points.iter().map(|p| self.project(p)).collect()
    }
}

/// A face outline in 2D: one outer ring and any number of holes
#[derive(Debug, Clone, PartialEq)]
pub struct FacePolygon {
    /// Outer boundary
    pub outer: Vec<Point2d>,

    /// Inner boundaries (excluded regions)
    pub holes: Vec<Vec<Point2d>>,
}

impl FacePolygon {
    /// Create a face polygon from already projected rings
    pub fn new(outer: Vec<Point2d>, holes: Vec<Vec<Point2d>>) -> Self {
        Self { outer, holes }
    }

    /// Project 3D loops into `frame`
    pub fn project(frame: &PlaneFrame, outer: &[Point], holes: &[Vec<Point>]) -> Self {
        Self {
            outer: frame.project_loop(outer),
            holes: holes.iter().map(|h| frame.project_loop(h)).collect(),
        }
    }

    /// A polygon needs at least three outer vertices
    pub fn is_valid(&self) -> bool {
        self.outer.len() >= 3
    }

    /// Bounding box of the outer ring as (min, max)
    pub fn bbox(&self) -> (Point2d, Point2d) {
        let mut min = Point2d::new(f64::MAX, f64::MAX);
        let mut max = Point2d::new(f64::MIN, f64::MIN);
        for p in &self.outer {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }

    /// Outer ring followed by every hole
    pub fn rings(&self) -> impl Iterator<Item = &[Point2d]> {
        std::iter::once(self.outer.as_slice()).chain(self.holes.iter().map(|h| h.as_slice()))
    }

    /// Every boundary segment of every ring
    fn boundary_segments(&self) -> impl Iterator<Item = (Point2d, Point2d)> + '_ {
        self.rings().flat_map(ring_segments)
    }
}

/// Closed-ring segments (last vertex connects back to the first)
fn ring_segments(ring: &[Point2d]) -> impl Iterator<Item = (Point2d, Point2d)> + '_ {
    let n = ring.len();
    (0..n).map(move |i| (ring[i], ring[(i + 1) % n]))
}

/// Ray casting, odd crossing count means inside
pub fn point_in_polygon(pt: &Point2d, polygon: &[Point2d]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        if (pi.y > pt.y) != (pj.y > pt.y)
            && pt.x < (pj.x - pi.x) * (pt.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Inside the outer ring and not inside any hole
pub fn point_in_face(pt: &Point2d, face: &FacePolygon) -> bool {
    point_in_polygon(pt, &face.outer) && !face.holes.iter().any(|h| point_in_polygon(pt, h))
}

/// Inside the polygon and farther than `tol` from every boundary segment
pub fn point_strictly_inside_polygon(pt: &Point2d, polygon: &[Point2d], tol: f64) -> bool {
    point_in_polygon(pt, polygon) && min_distance_to_ring(pt, polygon) > tol
}

/// Strict membership with holes respected: strictly inside the outer ring,
/// and outside every hole by more than `tol`
pub fn point_strictly_inside_face(pt: &Point2d, face: &FacePolygon, tol: f64) -> bool {
    point_strictly_inside_polygon(pt, &face.outer, tol)
        && face
            .holes
            .iter()
            .all(|h| !point_in_polygon(pt, h) && min_distance_to_ring(pt, h) > tol)
}

/// Standard orientation test; touching and collinear overlap count
pub fn segments_intersect(a1: &Point2d, a2: &Point2d, b1: &Point2d, b2: &Point2d) -> bool {
    let d1 = cross_sign(b1, b2, a1);
    let d2 = cross_sign(b1, b2, a2);
    let d3 = cross_sign(a1, a2, b1);
    let d4 = cross_sign(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1.abs() < COLLINEAR_EPS && on_segment(b1, b2, a1))
        || (d2.abs() < COLLINEAR_EPS && on_segment(b1, b2, a2))
        || (d3.abs() < COLLINEAR_EPS && on_segment(a1, a2, b1))
        || (d4.abs() < COLLINEAR_EPS && on_segment(a1, a2, b2))
}

/// Proper crossing only: any orientation value within `tol` of zero
/// (an endpoint on the other segment, or collinear segments) is rejected
pub fn segments_properly_intersect(
    a1: &Point2d,
    a2: &Point2d,
    b1: &Point2d,
    b2: &Point2d,
    tol: f64,
) -> bool {
    let d1 = cross_sign(b1, b2, a1);
    let d2 = cross_sign(b1, b2, a2);
    let d3 = cross_sign(a1, a2, b1);
    let d4 = cross_sign(a1, a2, b2);

    if d1.abs() < tol || d2.abs() < tol || d3.abs() < tol || d4.abs() < tol {
        return false;
    }

    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

/// Coarse overlap gate: bounding-box reject, vertex containment either way
/// (holes respected), then boundary crossing
pub fn polygons_overlap(a: &FacePolygon, b: &FacePolygon, snap_tol: f64) -> bool {
    if !a.is_valid() || !b.is_valid() {
        return false;
    }

    let (a_min, a_max) = a.bbox();
    let (b_min, b_max) = b.bbox();
    if a_max.x < b_min.x - snap_tol
        || b_max.x < a_min.x - snap_tol
        || a_max.y < b_min.y - snap_tol
        || b_max.y < a_min.y - snap_tol
    {
        return false;
    }

    if a.outer.iter().any(|p| point_in_face(p, b)) {
        return true;
    }
    if b.outer.iter().any(|p| point_in_face(p, a)) {
        return true;
    }

    // Star or L shapes can overlap without any vertex inside the other
    a.boundary_segments().any(|(a1, a2)| {
        b.boundary_segments()
            .any(|(b1, b2)| segments_intersect(&a1, &a2, &b1, &b2))
    })
}

/// Positive-area overlap, boundary-only touching excluded
///
/// Samples the centroid, edge midpoints and vertices of each outer ring for
/// strict membership in the other face, then falls back to proper boundary
/// crossings.
pub fn has_interior_overlap(a: &FacePolygon, b: &FacePolygon, tol: f64) -> bool {
    if !a.is_valid() || !b.is_valid() {
        return false;
    }

    // Identical faces have every vertex on the boundary, but the centroid
    // sits deep inside
    if point_strictly_inside_face(&polygon_centroid(&a.outer), b, tol) {
        return true;
    }
    if point_strictly_inside_face(&polygon_centroid(&b.outer), a, tol) {
        return true;
    }

    let midpoint_inside = |from: &FacePolygon, to: &FacePolygon| {
        ring_segments(&from.outer).any(|(p, q)| {
            let mid = Point2d::from((p.coords + q.coords) * 0.5);
            point_strictly_inside_face(&mid, to, tol)
        })
    };
    if midpoint_inside(a, b) || midpoint_inside(b, a) {
        return true;
    }

    if a.outer.iter().any(|p| point_strictly_inside_face(p, b, tol)) {
        return true;
    }
    if b.outer.iter().any(|p| point_strictly_inside_face(p, a, tol)) {
        return true;
    }

    a.boundary_segments().any(|(a1, a2)| {
        b.boundary_segments()
            .any(|(b1, b2)| segments_properly_intersect(&a1, &a2, &b1, &b2, tol))
    })
}

/// Whether a segment touches the face region: an endpoint or the midpoint
/// lies inside (holes respected), or the segment crosses any boundary ring
pub fn segment_touches_face(p0: &Point2d, p1: &Point2d, face: &FacePolygon) -> bool {
    if !face.is_valid() {
        return false;
    }

    let mid = Point2d::from((p0.coords + p1.coords) * 0.5);
    if point_in_face(p0, face) || point_in_face(p1, face) || point_in_face(&mid, face) {
        return true;
    }

    face.boundary_segments()
        .any(|(q0, q1)| segments_intersect(p0, p1, &q0, &q1))
}

/// Whether the two boundaries share a collinear interval longer than `tol`
///
/// Distinguishes faces adjacent along an edge from faces meeting at a
/// single corner point.
pub fn share_boundary_interval(a: &FacePolygon, b: &FacePolygon, max_sin: f64, tol: f64) -> bool {
    let lift = |p: &Point2d| Point::new(p.x, p.y, 0.0);
    a.boundary_segments().any(|(a1, a2)| {
        b.boundary_segments().any(|(b1, b2)| {
            collinear_overlap(&lift(&a1), &lift(&a2), &lift(&b1), &lift(&b2), max_sin, tol)
                .is_some_and(|overlap| overlap > tol)
        })
    })
}

/// Vertex average of a ring
fn polygon_centroid(ring: &[Point2d]) -> Point2d {
    let sum = ring
        .iter()
        .fold(nalgebra::Vector2::zeros(), |acc, p| acc + p.coords);
    Point2d::from(sum / ring.len() as f64)
}

fn min_distance_to_ring(pt: &Point2d, ring: &[Point2d]) -> f64 {
    ring_segments(ring)
        .map(|(a, b)| point_to_segment_distance(pt, &a, &b))
        .fold(f64::MAX, f64::min)
}

fn point_to_segment_distance(pt: &Point2d, a: &Point2d, b: &Point2d) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < 1e-24 {
        return (pt - a).norm();
    }

    let t = ((pt - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (pt - (a + ab * t)).norm()
}

fn cross_sign(a: &Point2d, b: &Point2d, c: &Point2d) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(p: &Point2d, q: &Point2d, r: &Point2d) -> bool {
    p.x.min(q.x) <= r.x + COLLINEAR_EPS
        && r.x <= p.x.max(q.x) + COLLINEAR_EPS
        && p.y.min(q.y) <= r.y + COLLINEAR_EPS
        && r.y <= p.y.max(q.y) + COLLINEAR_EPS
}
