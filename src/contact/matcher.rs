//! Pairwise geometric compatibility predicates
//!
//! Each predicate either accepts a face pair with a ranking distance or
//! rejects it with the first check that failed. Rejections are plain values
//! so the caller can count stages and log near misses.

use crate::catalog::{CylindricalFeature, PlanarFeature, VERTEX_SNAP_TOL};
use crate::geometry::polygon::{
    has_interior_overlap, polygons_overlap, segment_touches_face, share_boundary_interval,
    FacePolygon, PlaneFrame,
};
use crate::geometry::{collinear_overlap, distance_point_to_line, signed_distance_to_plane, Point};
use std::fmt;

/// cos(10°): opposing planar normals must satisfy `dot <= -ANTI_PARALLEL_COS`
pub const ANTI_PARALLEL_COS: f64 = 0.984_807_753_012_208;

/// cos(8°): cylinder axes are parallel when `|dot| >= CYLINDER_PARALLEL_COS`
pub const CYLINDER_PARALLEL_COS: f64 = 0.990_268_068_741_570;

/// sin(10°): a cylinder axis lies in a plane when `|dot(axis, normal)|` is below this
pub const TANGENT_AXIS_SIN: f64 = 0.173_648_177_666_930;

/// sin(3°): maximum direction deviation of collinear edges
pub const EDGE_COLLINEAR_SIN: f64 = 0.052_335_956_242_944;

/// Fixed coincidence tolerance for coaxial axes and equal radii (mm)
pub const COINCIDENCE_TOL: f64 = 0.05;

/// Offset and shared-interval tolerance for collinear edges (mm)
pub const LINE_TOL: f64 = 0.01;

/// Boundary clearance for strict interior membership (mm)
pub const BOUNDARY_TOL: f64 = 0.001;

/// Minimum axial overlap of coaxial cylinders (mm)
pub const AXIAL_OVERLAP_TOL: f64 = 1e-6;

/// First failed check of a predicate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    NotAntiParallel { dot: f64 },
    PlaneDistance { distance: f64 },
    NoOverlap,
    PointContact,
    AxesNotParallel { dot: f64 },
    AxesOffset { offset: f64 },
    RadiusMismatch { difference: f64 },
    NoAxialOverlap { overlap: f64 },
    AxisNotInPlane { dot: f64 },
    TangentGap { gap: f64 },
    OutsideFace,
    NotCollinear,
    NoSharedInterval { overlap: f64 },
}

impl Rejection {
    /// Number of checks of the predicate passed before this rejection
    pub fn stage(&self) -> usize {
        match self {
            Rejection::NotAntiParallel { .. }
            | Rejection::AxesNotParallel { .. }
            | Rejection::AxisNotInPlane { .. }
            | Rejection::NotCollinear => 0,
            Rejection::PlaneDistance { .. }
            | Rejection::AxesOffset { .. }
            | Rejection::TangentGap { .. }
            | Rejection::NoSharedInterval { .. } => 1,
            Rejection::NoOverlap | Rejection::RadiusMismatch { .. } | Rejection::OutsideFace => 2,
            Rejection::PointContact | Rejection::NoAxialOverlap { .. } => 3,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotAntiParallel { dot } => {
                write!(f, "normals not opposed: dot={:.4} (need <= {:.4})", dot, -ANTI_PARALLEL_COS)
            }
            Rejection::PlaneDistance { distance } => write!(f, "plane distance {:.4e}", distance),
            Rejection::NoOverlap => write!(f, "projected polygons do not overlap"),
            Rejection::PointContact => write!(f, "faces meet at a point only"),
            Rejection::AxesNotParallel { dot } => write!(f, "axes not parallel: |dot|={:.4}", dot),
            Rejection::AxesOffset { offset } => write!(f, "axes offset by {:.4}", offset),
            Rejection::RadiusMismatch { difference } => {
                write!(f, "radii differ by {:.4}", difference)
            }
            Rejection::NoAxialOverlap { overlap } => {
                write!(f, "axial ranges overlap by {:.4e}", overlap)
            }
            Rejection::AxisNotInPlane { dot } => {
                write!(f, "axis not parallel to plane: |dot|={:.4}", dot)
            }
            Rejection::TangentGap { gap } => write!(f, "tangency gap {:.4e}", gap),
            Rejection::OutsideFace => write!(f, "contact line misses the face"),
            Rejection::NotCollinear => write!(f, "edges not collinear"),
            Rejection::NoSharedInterval { overlap } => {
                write!(f, "edge intervals overlap by {:.4e}", overlap)
            }
        }
    }
}

/// Accepted planar pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarMatch {
    /// Perpendicular plane-to-plane distance
    pub distance: f64,

    /// Whether the faces share area (false for boundary-only contact)
    pub interior: bool,
}

/// Accepted coaxial cylinder pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderMatch {
    /// Perpendicular distance between the axis lines
    pub axis_offset: f64,

    /// Shared axial length
    pub overlap_length: f64,

    /// Contact radius (the smaller of the two)
    pub radius: f64,
}

/// Accepted plane-to-cylinder tangency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangencyMatch {
    /// `|distance(axis, plane) - radius|`
    pub gap: f64,
}

/// Coplanar opposed faces with overlapping outlines
pub fn match_planar(
    a: &PlanarFeature,
    b: &PlanarFeature,
    tolerance: f64,
) -> Result<PlanarMatch, Rejection> {
    let dot = a.normal.dot(&b.normal);
    if dot > -ANTI_PARALLEL_COS {
        return Err(Rejection::NotAntiParallel { dot });
    }

    let distance = signed_distance_to_plane(&b.origin, &a.origin, &a.normal).abs();
    if distance > tolerance {
        return Err(Rejection::PlaneDistance { distance });
    }

    let frame = PlaneFrame::new(a.origin, &a.normal);
    let poly_a = FacePolygon::project(&frame, &a.outer, &a.holes);
    let poly_b = FacePolygon::project(&frame, &b.outer, &b.holes);

    if !polygons_overlap(&poly_a, &poly_b, VERTEX_SNAP_TOL) {
        return Err(Rejection::NoOverlap);
    }

    let interior = has_interior_overlap(&poly_a, &poly_b, BOUNDARY_TOL);
    if !interior && !share_boundary_interval(&poly_a, &poly_b, EDGE_COLLINEAR_SIN, LINE_TOL) {
        return Err(Rejection::PointContact);
    }

    Ok(PlanarMatch { distance, interior })
}

/// Coaxial cylinders of equal radius with overlapping axial ranges
pub fn match_cylinders(
    a: &CylindricalFeature,
    b: &CylindricalFeature,
) -> Result<CylinderMatch, Rejection> {
    let dot = a.axis.dot(&b.axis).abs();
    if dot < CYLINDER_PARALLEL_COS {
        return Err(Rejection::AxesNotParallel { dot });
    }

    let axis_offset = distance_point_to_line(&b.origin, &a.origin, &a.axis);
    if axis_offset > COINCIDENCE_TOL {
        return Err(Rejection::AxesOffset {
            offset: axis_offset,
        });
    }

    let difference = (a.radius - b.radius).abs();
    if difference > COINCIDENCE_TOL {
        return Err(Rejection::RadiusMismatch { difference });
    }

    // B's axial range expressed in A's axial coordinate
    let axial = |p: Point| (p - a.origin).dot(&a.axis);
    let b0 = axial(b.axis_point(b.axial_range.0));
    let b1 = axial(b.axis_point(b.axial_range.1));
    let overlap = a.axial_range.1.min(b0.max(b1)) - a.axial_range.0.max(b0.min(b1));
    if overlap <= AXIAL_OVERLAP_TOL {
        return Err(Rejection::NoAxialOverlap { overlap });
    }

    Ok(CylinderMatch {
        axis_offset,
        overlap_length: overlap,
        radius: a.radius.min(b.radius),
    })
}

/// Cylinder lying on a plane along a line inside the planar face
pub fn match_tangency(
    plane: &PlanarFeature,
    cylinder: &CylindricalFeature,
    tolerance: f64,
) -> Result<TangencyMatch, Rejection> {
    let dot = cylinder.axis.dot(&plane.normal).abs();
    if dot > TANGENT_AXIS_SIN {
        return Err(Rejection::AxisNotInPlane { dot });
    }

    let (t0, t1) = cylinder.axial_range;
    let mid = cylinder.axis_point(0.5 * (t0 + t1));
    let axis_distance = signed_distance_to_plane(&mid, &plane.origin, &plane.normal).abs();
    let gap = (axis_distance - cylinder.radius).abs();
    if gap > tolerance {
        return Err(Rejection::TangentGap { gap });
    }

    let frame = PlaneFrame::new(plane.origin, &plane.normal);
    let face = FacePolygon::project(&frame, &plane.outer, &plane.holes);
    let p0 = frame.project(&cylinder.axis_point(t0));
    let p1 = frame.project(&cylinder.axis_point(t1));
    if !segment_touches_face(&p0, &p1, &face) {
        return Err(Rejection::OutsideFace);
    }

    Ok(TangencyMatch { gap })
}

/// Collinear straight edges sharing an interval, returning its length
pub fn edges_coincident(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> Result<f64, Rejection> {
    match collinear_overlap(a1, a2, b1, b2, EDGE_COLLINEAR_SIN, LINE_TOL) {
        None => Err(Rejection::NotCollinear),
        Some(overlap) if overlap > LINE_TOL => Ok(overlap),
        Some(overlap) => Err(Rejection::NoSharedInterval { overlap }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CylinderSense;
    use crate::geometry::Vec3;
    use approx::assert_relative_eq;

    fn square(x0: f64, y0: f64, size: f64, z: f64, up: bool) -> PlanarFeature {
        let mut outer = vec![
            Point::new(x0, y0, z),
            Point::new(x0 + size, y0, z),
            Point::new(x0 + size, y0 + size, z),
            Point::new(x0, y0 + size, z),
        ];
        if !up {
            outer.reverse();
        }
        PlanarFeature {
            normal: if up { Vec3::z() } else { -Vec3::z() },
            origin: outer[0],
            outer,
            holes: Vec::new(),
        }
    }

    fn cylinder(origin: Point, axis: Vec3, radius: f64, range: (f64, f64)) -> CylindricalFeature {
        CylindricalFeature {
            axis,
            origin,
            radius,
            sense: CylinderSense::Outer,
            axial_range: range,
            boundary: Vec::new(),
        }
    }

    #[test]
    fn test_planar_face_contact() {
        let lower = square(0.0, 0.0, 10.0, 0.0, true);
        let upper = square(0.0, 0.0, 10.0, 0.5, false);

        let m = match_planar(&lower, &upper, 1.0).unwrap();
        assert_relative_eq!(m.distance, 0.5, epsilon = 1e-12);
        assert!(m.interior);
    }

    #[test]
    fn test_planar_rejections() {
        let lower = square(0.0, 0.0, 10.0, 0.0, true);

        let same_side = square(0.0, 0.0, 10.0, 0.5, true);
        assert!(matches!(
            match_planar(&lower, &same_side, 1.0),
            Err(Rejection::NotAntiParallel { .. })
        ));

        let far = square(0.0, 0.0, 10.0, 2.0, false);
        assert!(matches!(
            match_planar(&lower, &far, 1.0),
            Err(Rejection::PlaneDistance { .. })
        ));

        let apart = square(20.0, 0.0, 10.0, 0.0, false);
        assert_eq!(match_planar(&lower, &apart, 1.0), Err(Rejection::NoOverlap));

        let corner = square(10.0, 10.0, 10.0, 0.0, false);
        assert_eq!(match_planar(&lower, &corner, 1.0), Err(Rejection::PointContact));
    }

    #[test]
    fn test_planar_boundary_only() {
        let a = square(0.0, 0.0, 10.0, 0.0, true);
        let b = square(10.0, 0.0, 10.0, 0.0, false);
        let m = match_planar(&a, &b, 1.0).unwrap();
        assert!(!m.interior);
    }

    #[test]
    fn test_match_cylinders() {
        let a = cylinder(Point::origin(), Vec3::z(), 5.0, (0.0, 10.0));
        let b = cylinder(Point::new(0.0, 0.0, 5.0), -Vec3::z(), 5.0, (-10.0, 0.0));

        let m = match_cylinders(&a, &b).unwrap();
        assert_relative_eq!(m.overlap_length, 5.0, epsilon = 1e-12);
        assert_relative_eq!(m.axis_offset, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_match_cylinders_rejections() {
        let a = cylinder(Point::origin(), Vec3::z(), 5.0, (0.0, 10.0));

        let tilted = cylinder(Point::origin(), Vec3::new(0.0, 0.3, 1.0).normalize(), 5.0, (0.0, 10.0));
        assert!(matches!(
            match_cylinders(&a, &tilted),
            Err(Rejection::AxesNotParallel { .. })
        ));

        let offset = cylinder(Point::new(0.1, 0.0, 0.0), Vec3::z(), 5.0, (0.0, 10.0));
        assert!(matches!(
            match_cylinders(&a, &offset),
            Err(Rejection::AxesOffset { .. })
        ));

        let thin = cylinder(Point::origin(), Vec3::z(), 4.0, (0.0, 10.0));
        assert!(matches!(
            match_cylinders(&a, &thin),
            Err(Rejection::RadiusMismatch { .. })
        ));

        let stacked = cylinder(Point::new(0.0, 0.0, 10.0), Vec3::z(), 5.0, (0.0, 10.0));
        assert!(matches!(
            match_cylinders(&a, &stacked),
            Err(Rejection::NoAxialOverlap { .. })
        ));
    }

    #[test]
    fn test_match_tangency() {
        let plane = square(0.0, 0.0, 20.0, 0.0, true);
        let lying = cylinder(Point::new(2.0, 10.0, 5.0), Vec3::x(), 5.0, (0.0, 16.0));

        let m = match_tangency(&plane, &lying, 1.0).unwrap();
        assert_relative_eq!(m.gap, 0.0, epsilon = 1e-12);

        let upright = cylinder(Point::new(10.0, 10.0, 0.0), Vec3::z(), 5.0, (0.0, 10.0));
        assert!(matches!(
            match_tangency(&plane, &upright, 1.0),
            Err(Rejection::AxisNotInPlane { .. })
        ));

        let floating = cylinder(Point::new(2.0, 10.0, 8.0), Vec3::x(), 5.0, (0.0, 16.0));
        assert!(matches!(
            match_tangency(&plane, &floating, 1.0),
            Err(Rejection::TangentGap { .. })
        ));

        let beside = cylinder(Point::new(30.0, 10.0, 5.0), Vec3::x(), 5.0, (0.0, 16.0));
        assert_eq!(match_tangency(&plane, &beside, 1.0), Err(Rejection::OutsideFace));
    }

    #[test]
    fn test_edges_coincident() {
        let a1 = Point::new(0.0, 0.0, 0.0);
        let a2 = Point::new(10.0, 0.0, 0.0);

        let overlap = edges_coincident(&a1, &a2, &Point::new(12.0, 0.0, 0.0), &Point::new(4.0, 0.0, 0.0));
        assert_relative_eq!(overlap.unwrap(), 6.0, epsilon = 1e-12);

        assert!(matches!(
            edges_coincident(&a1, &a2, &a2, &Point::new(20.0, 0.0, 0.0)),
            Err(Rejection::NoSharedInterval { .. })
        ));
        assert_eq!(
            edges_coincident(&a1, &a2, &a1, &Point::new(0.0, 10.0, 0.0)),
            Err(Rejection::NotCollinear)
        );
    }

    #[test]
    fn test_rejection_stage() {
        assert_eq!(Rejection::NotAntiParallel { dot: 1.0 }.stage(), 0);
        assert_eq!(Rejection::NoOverlap.stage(), 2);
        assert_eq!(Rejection::PointContact.stage(), 3);
        assert!(Rejection::TangentGap { gap: 2.0 }.to_string().contains("gap"));
    }
}
