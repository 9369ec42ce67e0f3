//! Primitive solid builders
//!
//! Used by tests, benchmarks and synthetic inputs. Every builder produces
//! outward-facing faces with boundary edges laid out the way a modeler would
//! report them.

use crate::error::Result;
use crate::geometry::{newell_normal, plane_axes, unit_vector, Point, Vec3};
use crate::model::body::{Body, BodyId, Edge, EdgeCurve, Face, FaceId, Surface};
use std::f64::consts::PI;

/// Closed straight-edged loop through `corners`
fn polygon_edges(corners: &[Point]) -> Vec<Edge> {
    let n = corners.len();
    (0..n)
        .map(|i| Edge::line(corners[i], corners[(i + 1) % n]))
        .collect()
}

fn planar_face(id: usize, corners: &[Point], normal: Vec3, area: Option<f64>) -> Face {
    Face {
        id: FaceId(id),
        surface: Surface::Plane {
            origin: corners[0],
            normal,
        },
        reversed: false,
        area,
        edges: polygon_edges(corners),
    }
}

/// Axis-aligned box between `min` and `max`
///
/// Faces are numbered from `first_face` in the order -z, +z, -y, +x, +y, -x.
pub fn box_body(id: BodyId, name: &str, min: Point, max: Point, first_face: usize) -> Body {
    let p = |x: f64, y: f64, z: f64| Point::new(x, y, z);
    let (x0, y0, z0) = (min.x, min.y, min.z);
    let (x1, y1, z1) = (max.x, max.y, max.z);
    let (dx, dy, dz) = (x1 - x0, y1 - y0, z1 - z0);

    let faces = vec![
        planar_face(
            first_face,
            &[p(x0, y0, z0), p(x0, y1, z0), p(x1, y1, z0), p(x1, y0, z0)],
            -Vec3::z(),
            Some(dx * dy),
        ),
        planar_face(
            first_face + 1,
            &[p(x0, y0, z1), p(x1, y0, z1), p(x1, y1, z1), p(x0, y1, z1)],
            Vec3::z(),
            Some(dx * dy),
        ),
        planar_face(
            first_face + 2,
            &[p(x0, y0, z0), p(x1, y0, z0), p(x1, y0, z1), p(x0, y0, z1)],
            -Vec3::y(),
            Some(dx * dz),
        ),
        planar_face(
            first_face + 3,
            &[p(x1, y0, z0), p(x1, y1, z0), p(x1, y1, z1), p(x1, y0, z1)],
            Vec3::x(),
            Some(dy * dz),
        ),
        planar_face(
            first_face + 4,
            &[p(x1, y1, z0), p(x0, y1, z0), p(x0, y1, z1), p(x1, y1, z1)],
            Vec3::y(),
            Some(dx * dz),
        ),
        planar_face(
            first_face + 5,
            &[p(x0, y1, z0), p(x0, y0, z0), p(x0, y0, z1), p(x0, y1, z1)],
            -Vec3::x(),
            Some(dy * dz),
        ),
    ];

    Body::new(id, name, faces)
}

/// Single-face planar sheet bounded by four corners
///
/// The face normal follows the right-hand winding of `corners`.
pub fn plate_body(id: BodyId, name: &str, corners: [Point; 4], face_id: usize) -> Result<Body> {
    let normal = unit_vector(&newell_normal(&corners))?;
    let face = planar_face(face_id, &corners, normal, None);
    Ok(Body::new(id, name, vec![face]))
}

/// Solid cylinder: one lateral face and two disc caps
///
/// The lateral face is bounded by the two closed end circles. Faces are
/// numbered from `first_face` as lateral, base cap, top cap.
pub fn cylinder_body(
    id: BodyId,
    name: &str,
    base: Point,
    axis: Vec3,
    radius: f64,
    length: f64,
    first_face: usize,
) -> Result<Body> {
    let axis = unit_vector(&axis)?;
    let (reference, _) = plane_axes(&axis);
    let top = base + axis * length;

    let circle = |center: Point| {
        Edge::arc(EdgeCurve::Arc {
            center,
            axis,
            reference,
            radius,
            start_angle: 0.0,
            end_angle: 2.0 * PI,
        })
    };

    let lateral = Face {
        id: FaceId(first_face),
        surface: Surface::Cylinder {
            origin: base,
            axis,
            radius: Some(radius),
        },
        reversed: false,
        area: None,
        edges: vec![circle(base), circle(top)],
    };

    let base_cap = Face {
        id: FaceId(first_face + 1),
        surface: Surface::Plane {
            origin: base,
            normal: -axis,
        },
        reversed: false,
        area: Some(PI * radius * radius),
        edges: vec![circle(base)],
    };

    let top_cap = Face {
        id: FaceId(first_face + 2),
        surface: Surface::Plane {
            origin: top,
            normal: axis,
        },
        reversed: false,
        area: Some(PI * radius * radius),
        edges: vec![circle(top)],
    };

    Ok(Body::new(id, name, vec![lateral, base_cap, top_cap]))
}
