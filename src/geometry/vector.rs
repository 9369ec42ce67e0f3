//! 3D vector and plane operations shared by the catalog and matchers

use crate::error::{InterfaceDetectorError, Result};
use crate::geometry::types::{Point, Vec3};

/// Normalize a vector, failing on (near) zero length
pub fn unit_vector(v: &Vec3) -> Result<Vec3> {
    let norm = v.norm();
    if !norm.is_finite() || norm < 1e-12 {
        return Err(InterfaceDetectorError::GeometryError(
            "Degenerate direction (zero length)".to_string(),
        ));
    }
    Ok(v / norm)
}

/// Whether two points coincide within `tol`
pub fn is_near(a: &Point, b: &Point, tol: f64) -> bool {
    (b - a).norm_squared() < tol * tol
}

/// Compute the signed distance from a point to a plane defined by a point and normal
/// Positive distance means the point is on the side the normal points to
pub fn signed_distance_to_plane(point: &Point, plane_point: &Point, plane_normal: &Vec3) -> f64 {
    let v = point - plane_point;
    v.dot(plane_normal)
}

/// Perpendicular distance from a point to an infinite line through
/// `line_point` with unit direction `line_dir`
pub fn distance_point_to_line(point: &Point, line_point: &Point, line_dir: &Vec3) -> f64 {
    let d = point - line_point;
    (d - line_dir * d.dot(line_dir)).norm()
}

/// Build two orthonormal in-plane axes for a unit normal
///
/// The seed is the world axis least parallel to the normal, orthogonalized
/// against it (Gram-Schmidt), so the frame never degenerates.
pub fn plane_axes(normal: &Vec3) -> (Vec3, Vec3) {
    let ax = normal.x.abs();
    let ay = normal.y.abs();
    let az = normal.z.abs();

    let seed = if ax <= ay && ax <= az {
        Vec3::x()
    } else if ay <= az {
        Vec3::y()
    } else {
        Vec3::z()
    };

    let u = (seed - normal * seed.dot(normal)).normalize();
    let v = normal.cross(&u);
    (u, v)
}

/// Newell's method: area-weighted normal of a closed 3D loop
///
/// The returned vector has length twice the enclosed area and points along
/// the loop's right-hand normal.
pub fn newell_normal(points: &[Point]) -> Vec3 {
    let n = points.len();
    let mut normal = Vec3::zeros();
    for i in 0..n {
        let cur = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (cur.y - next.y) * (cur.z + next.z);
        normal.y += (cur.z - next.z) * (cur.x + next.x);
        normal.z += (cur.x - next.x) * (cur.y + next.y);
    }
    normal
}

/// Area enclosed by a closed 3D loop (Newell estimate)
pub fn loop_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    0.5 * newell_normal(points).norm()
}

/// Length of the interval shared by two collinear segments
///
/// Returns `None` when either segment is degenerate, the directions differ
/// by more than `max_sin` (sine of the angle), or the second segment's start
/// is farther than `line_tol` from the first segment's line. Otherwise the
/// overlap of the 1-D projections onto the first segment is returned, which
/// may be zero or negative for disjoint intervals.
pub fn collinear_overlap(
    a1: &Point,
    a2: &Point,
    b1: &Point,
    b2: &Point,
    max_sin: f64,
    line_tol: f64,
) -> Option<f64> {
    let dir_a = a2 - a1;
    let len_a = dir_a.norm();
    let dir_b = b2 - b1;
    let len_b = dir_b.norm();
    if len_a < 1e-12 || len_b < 1e-12 {
        return None;
    }

    let sin_angle = dir_a.cross(&dir_b).norm() / (len_a * len_b);
    if sin_angle > max_sin {
        return None;
    }

    let unit_a = dir_a / len_a;
    if distance_point_to_line(b1, a1, &unit_a) > line_tol {
        return None;
    }

    let t1 = (b1 - a1).dot(&unit_a);
    let t2 = (b2 - a1).dot(&unit_a);
    let start = t1.min(t2).max(0.0);
    let end = t1.max(t2).min(len_a);
    Some(end - start)
}
