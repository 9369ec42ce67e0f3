//! JSON body-set format
//!
//! Stand-in for a modeling kernel: bodies, faces with their analytic
//! surfaces, and boundary edges (straight or circular arcs).

use crate::error::{InterfaceDetectorError, Result};
use crate::geometry::{unit_vector, Point, Vec3};
use crate::model::{Body, BodyId, Edge, EdgeCurve, Face, FaceId, Surface};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct JsonBodySet {
    bodies: Vec<JsonBody>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<usize>,
    name: String,
    faces: Vec<JsonFace>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonFace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<usize>,
    surface: JsonSurface,
    #[serde(default)]
    reversed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    area: Option<f64>,
    edges: Vec<JsonEdge>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum JsonSurface {
    Plane {
        origin: [f64; 3],
        normal: [f64; 3],
    },
    Cylinder {
        origin: [f64; 3],
        axis: [f64; 3],
        #[serde(default, skip_serializing_if = "Option::is_none")]
        radius: Option<f64>,
    },
    Other {
        kind: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonEdge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arc: Option<JsonArc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonArc {
    center: [f64; 3],
    axis: [f64; 3],
    reference: [f64; 3],
    radius: f64,
    start_angle: f64,
    end_angle: f64,
}

fn point(p: [f64; 3]) -> Point {
    Point::new(p[0], p[1], p[2])
}

fn vector(v: [f64; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

fn array(p: &Point) -> [f64; 3] {
    [p.x, p.y, p.z]
}

fn varray(v: &Vec3) -> [f64; 3] {
    [v.x, v.y, v.z]
}

fn invalid(msg: String) -> InterfaceDetectorError {
    InterfaceDetectorError::InvalidBodyDefinition(msg)
}

/// Hands out ids, skipping every id given explicitly in the input
struct IdAllocator {
    taken: HashSet<usize>,
    next: usize,
}

impl IdAllocator {
    fn new(explicit: impl Iterator<Item = usize>, what: &str) -> Result<Self> {
        let mut taken = HashSet::new();
        for id in explicit {
            if !taken.insert(id) {
                return Err(invalid(format!("Duplicate {} id {}", what, id)));
            }
        }
        Ok(Self { taken, next: 0 })
    }

    fn resolve(&mut self, id: Option<usize>) -> usize {
        if let Some(id) = id {
            return id;
        }
        while self.taken.contains(&self.next) {
            self.next += 1;
        }
        self.taken.insert(self.next);
        self.next
    }
}

/// Orthonormal `(axis, reference)` frame of an arc
///
/// The reference is made perpendicular to the axis before normalizing, so
/// angles are always measured in the circle's own plane.
fn arc_frame(arc: &JsonArc, body: &str) -> Result<(Vec3, Vec3)> {
    let axis = unit_vector(&vector(arc.axis))
        .map_err(|_| invalid(format!("Arc of body '{}' has a zero-length axis", body)))?;
    let reference = vector(arc.reference);
    let reference = unit_vector(&(reference - axis * reference.dot(&axis))).map_err(|_| {
        invalid(format!(
            "Arc reference of body '{}' is zero or parallel to its axis",
            body
        ))
    })?;
    Ok((axis, reference))
}

fn convert_edge(edge: JsonEdge, body: &str) -> Result<Edge> {
    match edge.arc {
        Some(arc) => {
            if !(arc.radius.is_finite() && arc.radius > 0.0) {
                return Err(invalid(format!(
                    "Arc of body '{}' has non-positive radius {}",
                    body, arc.radius
                )));
            }
            let (axis, reference) = arc_frame(&arc, body)?;
            let curve = EdgeCurve::Arc {
                center: point(arc.center),
                axis,
                reference,
                radius: arc.radius,
                start_angle: arc.start_angle,
                end_angle: arc.end_angle,
            };
            let mut converted = Edge::arc(curve);
            if let Some(start) = edge.start {
                converted.start = point(start);
            }
            if let Some(end) = edge.end {
                converted.end = point(end);
            }
            Ok(converted)
        }
        None => match (edge.start, edge.end) {
            (Some(start), Some(end)) => Ok(Edge::line(point(start), point(end))),
            _ => Err(invalid(format!(
                "Straight edge of body '{}' needs both start and end",
                body
            ))),
        },
    }
}

fn convert(set: JsonBodySet) -> Result<Vec<Body>> {
    let mut body_ids = IdAllocator::new(set.bodies.iter().filter_map(|b| b.id), "body")?;
    let mut face_ids = IdAllocator::new(
        set.bodies
            .iter()
            .flat_map(|b| b.faces.iter().filter_map(|f| f.id)),
        "face",
    )?;

    let mut bodies = Vec::with_capacity(set.bodies.len());
    for json_body in set.bodies {
        let id = BodyId(body_ids.resolve(json_body.id));
        let mut faces = Vec::with_capacity(json_body.faces.len());

        for json_face in json_body.faces {
            let surface = match json_face.surface {
                JsonSurface::Plane { origin, normal } => Surface::Plane {
                    origin: point(origin),
                    normal: vector(normal),
                },
                JsonSurface::Cylinder {
                    origin,
                    axis,
                    radius,
                } => Surface::Cylinder {
                    origin: point(origin),
                    axis: vector(axis),
                    radius,
                },
                JsonSurface::Other { kind } => Surface::Other { kind },
            };

            let edges = json_face
                .edges
                .into_iter()
                .map(|e| convert_edge(e, &json_body.name))
                .collect::<Result<Vec<_>>>()?;

            faces.push(Face {
                id: FaceId(face_ids.resolve(json_face.id)),
                surface,
                reversed: json_face.reversed,
                area: json_face.area,
                edges,
            });
        }

        bodies.push(Body::new(id, json_body.name, faces));
    }

    Ok(bodies)
}

/// Parse a body set from JSON text
pub fn parse_json_bodies(text: &str) -> Result<Vec<Body>> {
    let set: JsonBodySet = serde_json::from_str(text)
        .map_err(|e| invalid(format!("Failed to parse body set: {}", e)))?;
    convert(set)
}

/// Read a body set from a JSON file
pub fn read_json_bodies<P: AsRef<Path>>(path: P) -> Result<Vec<Body>> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    let set: JsonBodySet = serde_json::from_reader(reader)
        .map_err(|e| invalid(format!("Failed to parse body set: {}", e)))?;
    convert(set)
}

/// Write a body set to a JSON file with every id explicit
pub fn write_json_bodies<P: AsRef<Path>>(bodies: &[Body], path: P) -> Result<()> {
    let set = JsonBodySet {
        bodies: bodies
            .iter()
            .map(|body| JsonBody {
                id: Some(body.id.0),
                name: body.name.clone(),
                faces: body
                    .faces
                    .iter()
                    .map(|face| JsonFace {
                        id: Some(face.id.0),
                        surface: match &face.surface {
                            Surface::Plane { origin, normal } => JsonSurface::Plane {
                                origin: array(origin),
                                normal: varray(normal),
                            },
                            Surface::Cylinder {
                                origin,
                                axis,
                                radius,
                            } => JsonSurface::Cylinder {
                                origin: array(origin),
                                axis: varray(axis),
                                radius: *radius,
                            },
                            Surface::Other { kind } => JsonSurface::Other { kind: kind.clone() },
                        },
                        reversed: face.reversed,
                        area: face.area,
                        edges: face
                            .edges
                            .iter()
                            .map(|edge| JsonEdge {
                                start: Some(array(&edge.start)),
                                end: Some(array(&edge.end)),
                                arc: edge.curve.as_ref().map(|curve| match curve {
                                    EdgeCurve::Arc {
                                        center,
                                        axis,
                                        reference,
                                        radius,
                                        start_angle,
                                        end_angle,
                                    } => JsonArc {
                                        center: array(center),
                                        axis: varray(axis),
                                        reference: varray(reference),
                                        radius: *radius,
                                        start_angle: *start_angle,
                                        end_angle: *end_angle,
                                    },
                                }),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect(),
    };

    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(BufWriter::new(file), &set).map_err(|e| {
        InterfaceDetectorError::IoError(std::io::Error::other(format!(
            "Failed to write body set: {}",
            e
        )))
    })?;

    Ok(())
}
