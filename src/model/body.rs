//! Kernel-independent body, face and edge definitions

use crate::geometry::{Aabb, Point, Vec3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Number of interior parametric samples taken on a curved edge
pub const CURVE_SAMPLES: usize = 16;

/// Stable identity of a body within one detection run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(pub usize);

/// Stable identity of a face, unique across the whole body set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceId(pub usize);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Underlying analytic surface of a face
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    /// Infinite plane through `origin` with normal `normal`
    Plane { origin: Point, normal: Vec3 },

    /// Infinite cylinder around the line through `origin` along `axis`
    ///
    /// The radius may be unknown, in which case it is measured from the
    /// face boundary.
    Cylinder {
        origin: Point,
        axis: Vec3,
        radius: Option<f64>,
    },

    /// Any other surface kind (cone, torus, spline...), carried by name only
    Other { kind: String },
}

impl Surface {
    /// Short type name for logs
    pub fn kind_name(&self) -> &str {
        match self {
            Surface::Plane { .. } => "plane",
            Surface::Cylinder { .. } => "cylinder",
            Surface::Other { kind } => kind,
        }
    }
}

/// A curve with a parameter domain that can be evaluated at any parameter
pub trait ParametricCurve {
    /// Parameter interval `(t0, t1)` covered by the edge
    fn parameter_range(&self) -> (f64, f64);

    /// Point on the curve at parameter `t`
    fn evaluate(&self, t: f64) -> Point;
}

/// Curved edge geometry
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeCurve {
    /// Circular arc (or full circle) in the plane normal to `axis`
    ///
    /// Angles are measured from `reference` towards `axis x reference`.
    Arc {
        center: Point,
        axis: Vec3,
        reference: Vec3,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
}

impl ParametricCurve for EdgeCurve {
    fn parameter_range(&self) -> (f64, f64) {
        match self {
            EdgeCurve::Arc {
                start_angle,
                end_angle,
                ..
            } => (*start_angle, *end_angle),
        }
    }

    fn evaluate(&self, t: f64) -> Point {
        match self {
            EdgeCurve::Arc {
                center,
                axis,
                reference,
                radius,
                ..
            } => {
                let binormal = axis.cross(reference);
                center + (reference * t.cos() + binormal * t.sin()) * *radius
            }
        }
    }
}

impl EdgeCurve {
    /// Exact bounding box of the curve over its parameter range
    ///
    /// Each world coordinate of an arc point is `c + R cos(t - phi)`, so its
    /// extremes sit at `phi` and `phi + pi`. Those that fall inside the
    /// parameter range are added to the two endpoints.
    pub fn bounds(&self) -> Aabb {
        match self {
            EdgeCurve::Arc {
                center,
                axis,
                reference,
                radius,
                ..
            } => {
                let (t0, t1) = self.parameter_range();
                let (lo, hi) = (t0.min(t1), t0.max(t1));
                let binormal = axis.cross(reference);

                let mut aabb = Aabb::empty();
                aabb.include_point(&self.evaluate(lo));
                aabb.include_point(&self.evaluate(hi));

                for i in 0..3 {
                    let (u, v) = (reference[i] * radius, binormal[i] * radius);
                    let amplitude = u.hypot(v);
                    if hi - lo >= 2.0 * PI {
                        aabb.min[i] = aabb.min[i].min(center[i] - amplitude);
                        aabb.max[i] = aabb.max[i].max(center[i] + amplitude);
                        continue;
                    }

                    let phi = v.atan2(u);
                    let first = ((lo - phi) / PI).ceil() as i64;
                    let last = ((hi - phi) / PI).floor() as i64;
                    for k in first..=last {
                        aabb.include_point(&self.evaluate(phi + k as f64 * PI));
                    }
                }
                aabb
            }
        }
    }
}

/// Boundary edge of a face
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub start: Point,
    pub end: Point,
    pub curve: Option<EdgeCurve>,
}

impl Edge {
    /// Straight edge between two points
    pub fn line(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            curve: None,
        }
    }

    /// Edge following an arc, with endpoints evaluated from the curve
    pub fn arc(curve: EdgeCurve) -> Self {
        let (t0, t1) = curve.parameter_range();
        Self {
            start: curve.evaluate(t0),
            end: curve.evaluate(t1),
            curve: Some(curve),
        }
    }

    /// Whether the edge carries no curve geometry
    pub fn is_straight(&self) -> bool {
        self.curve.is_none()
    }

    /// Ordered sample points from start to end
    ///
    /// Straight edges give their two endpoints. Curved edges add
    /// [`CURVE_SAMPLES`] interior points evenly spaced in parameter space,
    /// unless the curve turns out to be straight within `snap_tol`.
    pub fn sample(&self, snap_tol: f64) -> Vec<Point> {
        let Some(curve) = &self.curve else {
            return vec![self.start, self.end];
        };

        let (t0, t1) = curve.parameter_range();
        let range = t1 - t0;
        if range.abs() <= 1e-15 {
            return vec![self.start, self.end];
        }

        let chord = self.end - self.start;
        let chord_len = chord.norm();
        let curved = if chord_len > 1e-12 {
            let mid = curve.evaluate(t0 + range * 0.5);
            chord.cross(&(mid - self.start)).norm() / chord_len > snap_tol
        } else {
            // closed edge
            true
        };

        let mut points = Vec::with_capacity(CURVE_SAMPLES + 2);
        points.push(self.start);
        if curved {
            for s in 1..=CURVE_SAMPLES {
                let t = t0 + range * s as f64 / (CURVE_SAMPLES + 1) as f64;
                points.push(curve.evaluate(t));
            }
        }
        points.push(self.end);
        points
    }
}

/// A bounded surface patch of a body
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub id: FaceId,
    pub surface: Surface,

    /// Face orientation is opposite to the surface's own normal/axis sense
    pub reversed: bool,

    /// Area reported by the modeler, when available
    pub area: Option<f64>,

    pub edges: Vec<Edge>,
}

/// A solid body described by its boundary faces
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: BodyId,
    pub name: String,
    pub faces: Vec<Face>,
}

impl Body {
    /// Create a body from its faces
    pub fn new(id: BodyId, name: impl Into<String>, faces: Vec<Face>) -> Self {
        Self {
            id,
            name: name.into(),
            faces,
        }
    }

    /// Every edge together with the face it bounds
    pub fn edges(&self) -> impl Iterator<Item = (&Face, &Edge)> {
        self.faces
            .iter()
            .flat_map(|face| face.edges.iter().map(move |edge| (face, edge)))
    }

    /// Bounding box of all edges, `None` for a body without edges
    ///
    /// Curved edges contribute their exact extent rather than their samples,
    /// so a tessellated arc never shrinks the box.
    pub fn bounds(&self) -> Option<Aabb> {
        let endpoints: Vec<Point> = self
            .edges()
            .flat_map(|(_, edge)| [edge.start, edge.end])
            .collect();
        let mut aabb = Aabb::from_points(&endpoints)?;
        for curve in self.edges().filter_map(|(_, edge)| edge.curve.as_ref()) {
            aabb.include_aabb(&curve.bounds());
        }
        Some(aabb)
    }

    /// Total number of edges over all faces
    pub fn num_edges(&self) -> usize {
        self.faces.iter().map(|f| f.edges.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn circle(radius: f64) -> EdgeCurve {
        EdgeCurve::Arc {
            center: Point::origin(),
            axis: Vec3::z(),
            reference: Vec3::x(),
            radius,
            start_angle: 0.0,
            end_angle: 2.0 * PI,
        }
    }

    #[test]
    fn test_arc_evaluate() {
        let arc = circle(5.0);
        let p = arc.evaluate(PI / 2.0);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 5.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sample_straight_edge() {
        let edge = Edge::line(Point::origin(), Point::new(1.0, 0.0, 0.0));
        assert_eq!(edge.sample(0.01).len(), 2);
        assert!(edge.is_straight());
    }

    #[test]
    fn test_sample_closed_arc() {
        let edge = Edge::arc(circle(5.0));
        let points = edge.sample(0.01);

        assert_eq!(points.len(), CURVE_SAMPLES + 2);
        for p in &points {
            assert_relative_eq!(p.coords.norm(), 5.0, epsilon = 1e-9);
        }
        assert_relative_eq!((points[0] - points[points.len() - 1]).norm(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_arc_bounds_are_exact() {
        // 18 samples of a full circle never reach the extreme at -y
        let full = circle(5.0).bounds();
        assert_relative_eq!(full.min.y, -5.0, epsilon = 1e-12);
        assert_relative_eq!(full.max.x, 5.0, epsilon = 1e-12);
        assert_relative_eq!(full.min.z, 0.0, epsilon = 1e-12);
        assert_relative_eq!(full.max.z, 0.0, epsilon = 1e-12);

        let quarter = EdgeCurve::Arc {
            center: Point::origin(),
            axis: Vec3::z(),
            reference: Vec3::x(),
            radius: 2.0,
            start_angle: 0.25 * PI,
            end_angle: 0.75 * PI,
        }
        .bounds();
        assert_relative_eq!(quarter.max.y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(quarter.min.y, 2.0 * (0.25 * PI).sin(), epsilon = 1e-12);
        assert_relative_eq!(quarter.max.x, 2.0 * (0.25 * PI).cos(), epsilon = 1e-12);
        assert_relative_eq!(quarter.min.x, -quarter.max.x, epsilon = 1e-12);
    }

    #[test]
    fn test_tilted_circle_bounds() {
        let axis = Vec3::new(1.0, 0.0, 1.0).normalize();
        let circle = EdgeCurve::Arc {
            center: Point::new(1.0, 2.0, 3.0),
            axis,
            reference: Vec3::y(),
            radius: 4.0,
            start_angle: 0.0,
            end_angle: 2.0 * PI,
        };
        let bounds = circle.bounds();
        let half_x = 4.0 * (1.0 - axis.x * axis.x).sqrt();

        assert_relative_eq!(bounds.max.x, 1.0 + half_x, epsilon = 1e-12);
        assert_relative_eq!(bounds.min.y, -2.0, epsilon = 1e-12);
        assert_relative_eq!(bounds.max.z, 3.0 + half_x, epsilon = 1e-12);
    }

    #[test]
    fn test_body_bounds() {
        let face = Face {
            id: FaceId(0),
            surface: Surface::Plane {
                origin: Point::origin(),
                normal: Vec3::z(),
            },
            reversed: false,
            area: None,
            edges: vec![Edge::arc(circle(2.0))],
        };
        let body = Body::new(BodyId(0), "disc", vec![face]);
        let bounds = body.bounds().unwrap();

        assert_relative_eq!(bounds.max.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.min.y, -2.0, epsilon = 1e-12);
        assert_eq!(body.num_edges(), 1);
    }
}
