//! Per-body face feature extraction
//!
//! The catalog classifies every face as planar or cylindrical, extracts the
//! parameters the matchers need and records why any other face was skipped.
//! It is built once per detection run and never mutated afterwards.

pub mod loops;

use crate::contact::diagnostics::DiagnosticLog;
use crate::geometry::{distance_point_to_line, loop_area, unit_vector, Aabb, Point, Vec3};
use crate::model::{Body, BodyId, Face, FaceId, Surface};
use loops::{chain_loops, LoopSet};
use serde::Serialize;
use std::collections::BTreeMap;
use std::f64::consts::PI;
use thiserror::Error;

/// Endpoint snap tolerance used to chain edges into loops (mm)
pub const VERTEX_SNAP_TOL: f64 = 0.01;

/// Planar faces logged in detail per body
const MAX_FACE_DETAIL: usize = 10;

/// Why a face was left out of the catalog
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    #[error("surface is neither a plane nor a cylinder")]
    UnsupportedSurface,

    #[error("face area is unavailable or non-positive")]
    AreaUnavailable,

    #[error("cylinder radius is unavailable")]
    RadiusUnavailable,

    #[error("normal or axis direction has zero length")]
    DegenerateNormal,

    #[error("edges do not close into a loop")]
    OpenLoop,

    #[error("boundary has fewer than 3 vertices")]
    TooFewVertices,
}

/// Concave bore or convex pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CylinderSense {
    Outer,
    Inner,
}

/// Extracted description of a planar face
#[derive(Debug, Clone)]
pub struct PlanarFeature {
    /// Unit outward normal, corrected for the face orientation flag
    pub normal: Vec3,

    /// Point on the plane
    pub origin: Point,

    /// Largest boundary loop
    pub outer: Vec<Point>,

    /// Remaining boundary loops
    pub holes: Vec<Vec<Point>>,
}

/// Extracted description of a cylindrical face
#[derive(Debug, Clone)]
pub struct CylindricalFeature {
    /// Unit axis direction
    pub axis: Vec3,

    /// Point on the axis
    pub origin: Point,

    pub radius: f64,

    pub sense: CylinderSense,

    /// Axial coordinate range `(min, max)` of the boundary, measured from `origin`
    pub axial_range: (f64, f64),

    /// Sampled boundary points
    pub boundary: Vec<Point>,
}

impl CylindricalFeature {
    /// Axial length of the face
    pub fn length(&self) -> f64 {
        self.axial_range.1 - self.axial_range.0
    }

    /// Point on the axis at axial coordinate `t`
    pub fn axis_point(&self, t: f64) -> Point {
        self.origin + self.axis * t
    }
}

#[derive(Debug, Clone)]
pub enum FaceFeature {
    Planar(PlanarFeature),
    Cylindrical(CylindricalFeature),
}

impl FaceFeature {
    /// Normal of a planar face or axis of a cylindrical one
    pub fn direction(&self) -> Vec3 {
        match self {
            FaceFeature::Planar(p) => p.normal,
            FaceFeature::Cylindrical(c) => c.axis,
        }
    }
}

/// A classified face
#[derive(Debug, Clone)]
pub struct CatalogFace {
    pub id: FaceId,
    pub body: BodyId,
    pub area: f64,
    pub feature: FaceFeature,
}

/// Straight boundary edge used by the edge-to-edge pass
#[derive(Debug, Clone)]
pub struct EdgeRecord {
    pub face: FaceId,
    pub start: Point,
    pub end: Point,

    /// Normal or axis of the owning face, zero when the face was skipped
    pub orientation: Vec3,
}

impl EdgeRecord {
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    pub fn midpoint(&self) -> Point {
        Point::from((self.start.coords + self.end.coords) * 0.5)
    }
}

/// Per-body extraction counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_faces: usize,
    pub planar: usize,
    pub cylindrical: usize,
    pub unsupported: usize,
    pub area_unavailable: usize,
    pub radius_unavailable: usize,
    pub degenerate_normal: usize,
    pub open_loop: usize,
    pub too_few_vertices: usize,
}

impl CatalogStats {
    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::UnsupportedSurface => self.unsupported += 1,
            SkipReason::AreaUnavailable => self.area_unavailable += 1,
            SkipReason::RadiusUnavailable => self.radius_unavailable += 1,
            SkipReason::DegenerateNormal => self.degenerate_normal += 1,
            SkipReason::OpenLoop => self.open_loop += 1,
            SkipReason::TooFewVertices => self.too_few_vertices += 1,
        }
    }

    /// Number of faces skipped for any reason
    pub fn skipped(&self) -> usize {
        self.unsupported
            + self.area_unavailable
            + self.radius_unavailable
            + self.degenerate_normal
            + self.open_loop
            + self.too_few_vertices
    }

    fn merge(&mut self, other: &CatalogStats) {
        self.total_faces += other.total_faces;
        self.planar += other.planar;
        self.cylindrical += other.cylindrical;
        self.unsupported += other.unsupported;
        self.area_unavailable += other.area_unavailable;
        self.radius_unavailable += other.radius_unavailable;
        self.degenerate_normal += other.degenerate_normal;
        self.open_loop += other.open_loop;
        self.too_few_vertices += other.too_few_vertices;
    }
}

/// Extracted features of one body
#[derive(Debug, Clone)]
pub struct CatalogBody {
    /// Position in the input body list
    pub index: usize,
    pub id: BodyId,
    pub name: String,
    pub faces: Vec<CatalogFace>,
    pub edges: Vec<EdgeRecord>,
    pub bounds: Option<Aabb>,
    pub stats: CatalogStats,
}

/// Case-insensitive substring test on a body name
pub fn name_contains(name: &str, keyword: &str) -> bool {
    name.to_lowercase().contains(&keyword.to_lowercase())
}

/// Immutable snapshot of every body's extracted faces
#[derive(Debug, Clone, Default)]
pub struct FaceCatalog {
    pub bodies: Vec<CatalogBody>,
}

impl FaceCatalog {
    /// Extract features from every face of every body
    pub fn build(bodies: &[Body], log: &mut DiagnosticLog) -> Self {
        let catalog_bodies = bodies
            .iter()
            .enumerate()
            .map(|(index, body)| catalog_body(index, body, log))
            .collect();

        Self {
            bodies: catalog_bodies,
        }
    }

    /// Summed extraction counts over all bodies
    pub fn stats(&self) -> CatalogStats {
        let mut total = CatalogStats::default();
        for body in &self.bodies {
            total.merge(&body.stats);
        }
        total
    }

    /// Look up a catalogued face by id
    pub fn face(&self, id: FaceId) -> Option<&CatalogFace> {
        self.bodies
            .iter()
            .flat_map(|b| b.faces.iter())
            .find(|f| f.id == id)
    }
}

fn catalog_body(index: usize, body: &Body, log: &mut DiagnosticLog) -> CatalogBody {
    let mut stats = CatalogStats::default();
    let mut faces = Vec::new();
    let mut unsupported_kinds: BTreeMap<String, usize> = BTreeMap::new();
    let mut orientations: BTreeMap<FaceId, Vec3> = BTreeMap::new();

    for face in &body.faces {
        stats.total_faces += 1;
        match extract_feature(face) {
            Ok((feature, area)) => {
                match feature {
                    FaceFeature::Planar(_) => stats.planar += 1,
                    FaceFeature::Cylindrical(_) => stats.cylindrical += 1,
                }
                orientations.insert(face.id, feature.direction());
                faces.push(CatalogFace {
                    id: face.id,
                    body: body.id,
                    area,
                    feature,
                });
            }
            Err(reason) => {
                stats.record_skip(reason);
                if reason == SkipReason::UnsupportedSurface {
                    *unsupported_kinds
                        .entry(face.surface.kind_name().to_string())
                        .or_default() += 1;
                } else {
                    log.push(format!(
                        "  [skip] {} face {}: {}",
                        body.name, face.id, reason
                    ));
                }
            }
        }
    }

    let edges = body
        .edges()
        .filter(|(_, edge)| edge.is_straight())
        .map(|(face, edge)| EdgeRecord {
            face: face.id,
            start: edge.start,
            end: edge.end,
            orientation: orientations.get(&face.id).copied().unwrap_or_else(Vec3::zeros),
        })
        .collect();

    log.push(format!(
        "[body] {}: faces={}, planar={}, cylindrical={}, skipped={}",
        body.name,
        stats.total_faces,
        stats.planar,
        stats.cylindrical,
        stats.skipped()
    ));
    for (kind, count) in &unsupported_kinds {
        log.push(format!("  unsupported: {} x{}", kind, count));
    }
    for face in faces.iter().take(MAX_FACE_DETAIL) {
        if let FaceFeature::Planar(p) = &face.feature {
            log.push(format!(
                "  planar face {}: n=({:.4},{:.4},{:.4}) o=({:.4},{:.4},{:.4}) area={:.3e} verts={} holes={}",
                face.id,
                p.normal.x,
                p.normal.y,
                p.normal.z,
                p.origin.x,
                p.origin.y,
                p.origin.z,
                face.area,
                p.outer.len(),
                p.holes.len()
            ));
        }
    }

    CatalogBody {
        index,
        id: body.id,
        name: body.name.clone(),
        faces,
        edges,
        bounds: body.bounds(),
        stats,
    }
}

/// Classify one face, returning its feature and area or the reason to skip it
pub fn extract_feature(face: &Face) -> std::result::Result<(FaceFeature, f64), SkipReason> {
    let supplied_area = match face.area {
        Some(a) if a.is_finite() && a > 0.0 => Some(a),
        Some(_) => return Err(SkipReason::AreaUnavailable),
        None => None,
    };

    match &face.surface {
        Surface::Plane { origin, normal } => {
            let mut normal = unit_vector(normal).map_err(|_| SkipReason::DegenerateNormal)?;
            if face.reversed {
                normal = -normal;
            }

            let loops = face_loops(face)?;
            let outer = loops.outer().cloned().ok_or(SkipReason::TooFewVertices)?;
            let holes = loops.holes().to_vec();

            let area = match supplied_area {
                Some(a) => a,
                None => {
                    let computed =
                        loop_area(&outer) - holes.iter().map(|h| loop_area(h)).sum::<f64>();
                    if computed <= 0.0 {
                        return Err(SkipReason::AreaUnavailable);
                    }
                    computed
                }
            };

            Ok((
                FaceFeature::Planar(PlanarFeature {
                    normal,
                    origin: *origin,
                    outer,
                    holes,
                }),
                area,
            ))
        }
        Surface::Cylinder {
            origin,
            axis,
            radius,
        } => {
            let axis = unit_vector(axis).map_err(|_| SkipReason::DegenerateNormal)?;
            let loops = face_loops(face)?;
            let boundary: Vec<Point> = loops.points().copied().collect();

            let radius = match radius {
                Some(r) if r.is_finite() && *r > 0.0 => *r,
                _ => {
                    let measured = distance_point_to_line(&boundary[0], origin, &axis);
                    if !measured.is_finite() || measured <= 1e-9 {
                        return Err(SkipReason::RadiusUnavailable);
                    }
                    measured
                }
            };

            let (t_min, t_max) = boundary
                .iter()
                .map(|p| (p - origin).dot(&axis))
                .fold((f64::MAX, f64::MIN), |(lo, hi), t| (lo.min(t), hi.max(t)));

            let area = match supplied_area {
                Some(a) => a,
                None => {
                    let computed = 2.0 * PI * radius * (t_max - t_min);
                    if computed <= 0.0 {
                        return Err(SkipReason::AreaUnavailable);
                    }
                    computed
                }
            };

            let sense = if face.reversed {
                CylinderSense::Inner
            } else {
                CylinderSense::Outer
            };

            Ok((
                FaceFeature::Cylindrical(CylindricalFeature {
                    axis,
                    origin: *origin,
                    radius,
                    sense,
                    axial_range: (t_min, t_max),
                    boundary,
                }),
                area,
            ))
        }
        Surface::Other { .. } => Err(SkipReason::UnsupportedSurface),
    }
}

/// Closed boundary loops of a face, at least one
fn face_loops(face: &Face) -> std::result::Result<LoopSet, SkipReason> {
    let sampled: Vec<Vec<Point>> = face
        .edges
        .iter()
        .map(|e| e.sample(VERTEX_SNAP_TOL))
        .collect();
    let set = chain_loops(&sampled, VERTEX_SNAP_TOL);

    if set.loops.is_empty() {
        return Err(if set.open_chains > 0 {
            SkipReason::OpenLoop
        } else {
            SkipReason::TooFewVertices
        });
    }
    Ok(set)
}
