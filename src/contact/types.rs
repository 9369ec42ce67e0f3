//! Contact detection data types

use crate::catalog::CatalogStats;
use crate::contact::diagnostics::DiagnosticLog;
use crate::error::{InterfaceDetectorError, Result};
use crate::geometry::Vec3;
use crate::model::{BodyId, FaceId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Criteria for contact detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionCriteria {
    /// Maximum plane-to-plane distance and tangency gap (mm)
    pub tolerance: f64,

    /// Enable planar face-to-face detection
    pub detect_planar: bool,

    /// Enable coaxial cylinder detection
    pub detect_cylindrical: bool,

    /// Enable the shared straight edge pass
    pub detect_edges: bool,

    /// Body count from which the uniform grid broad phase is used
    pub broad_phase_min_bodies: usize,
}

impl Default for DetectionCriteria {
    fn default() -> Self {
        Self {
            tolerance: 1.0,
            detect_planar: true,
            detect_cylindrical: true,
            detect_edges: true,
            broad_phase_min_bodies: 16,
        }
    }
}

impl DetectionCriteria {
    /// Create criteria with the given tolerance and every detector enabled
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    /// Check that the tolerance is usable
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(InterfaceDetectorError::ConfigError(format!(
                "Tolerance must be a positive finite length, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    /// Whether plane-to-cylinder tangency is checked
    pub fn detect_tangency(&self) -> bool {
        self.detect_planar && self.detect_cylindrical
    }
}

/// Kind of touching region between two faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContactType {
    /// Coplanar opposed faces sharing area
    Face,

    /// Line contact along a shared boundary
    Edge,

    /// Coaxial cylinders with overlapping axial range
    Cylinder,

    /// Plane tangent to a cylinder
    PlaneCylinder,
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContactType::Face => "Face",
            ContactType::Edge => "Edge",
            ContactType::Cylinder => "Cylinder",
            ContactType::PlaneCylinder => "PlaneCylinder",
        };
        f.write_str(name)
    }
}

/// Geometric test that produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Predicate {
    PlanarPlanar,
    CylinderCylinder,
    PlaneCylinder,
    EdgeEdge,
}

/// Transient face pair accepted by one predicate
#[derive(Debug, Clone)]
pub struct ContactCandidate {
    pub face_a: FaceId,
    pub face_b: FaceId,

    /// Catalog indices of the owning bodies
    pub body_a: usize,
    pub body_b: usize,

    /// Normal or axis of each face, used to pick the canonical A side
    pub direction_a: Vec3,
    pub direction_b: Vec3,

    /// Ranking distance (plane or axis separation)
    pub distance: f64,

    pub predicate: Predicate,
    pub contact_type: ContactType,

    /// Contact area, zero for line contacts
    pub measure: f64,
}

impl ContactCandidate {
    /// Lower value wins when two candidates share a face pair
    pub fn priority(&self) -> u8 {
        match (self.predicate, self.contact_type) {
            (Predicate::EdgeEdge, _) => 2,
            (_, ContactType::Edge) => 1,
            _ => 0,
        }
    }

    /// Unordered face pair key
    pub fn face_key(&self) -> (FaceId, FaceId) {
        if self.face_a <= self.face_b {
            (self.face_a, self.face_b)
        } else {
            (self.face_b, self.face_a)
        }
    }
}

/// Final classified contact between two faces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactPair {
    pub face_a: FaceId,
    pub face_b: FaceId,
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub body_name_a: String,
    pub body_name_b: String,

    #[serde(rename = "type")]
    pub contact_type: ContactType,

    /// Group name prefix
    pub prefix: String,

    /// 1-based index within the prefix
    pub pair_index: usize,

    /// Individual selection name of the A face
    pub name_a: String,

    /// Individual selection name of the B face
    pub name_b: String,

    /// Contact area (mm²), zero for line contacts
    pub measure: f64,

    /// Ranking distance of the accepted candidate
    pub distance: f64,

    pub selected: bool,
}

/// A named set of faces, one per side of a prefix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedGroup {
    pub name: String,
    pub faces: Vec<FaceId>,
}

/// Dominant surface family of a body-to-body interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InterfaceKind {
    /// Face and edge contacts only
    Planar,
    /// Coaxial cylinder contacts only
    Cylindrical,
    /// Plane-to-cylinder tangency, or contacts of both families
    Mixed,
}

/// Aggregate of all contacts between one pair of bodies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterfaceSummary {
    pub group_name: String,
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub kind: InterfaceKind,

    /// Summed contact measure (mm²)
    pub total_measure: f64,

    pub face_pairs: usize,
}

/// Counts of candidates passing each predicate stage
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectionStats {
    pub bodies: usize,
    pub body_pairs_compared: usize,

    pub planar_compared: usize,
    pub planar_passed_normal: usize,
    pub planar_passed_distance: usize,
    pub planar_passed_overlap: usize,
    pub planar_boundary_only: usize,

    pub cylinder_compared: usize,
    pub cylinder_passed_parallel: usize,
    pub cylinder_passed_coaxial: usize,
    pub cylinder_passed_radius: usize,
    pub cylinder_passed_axial: usize,

    pub tangency_compared: usize,
    pub tangency_accepted: usize,

    pub edge_comparisons: usize,
    pub edge_collinear: usize,

    pub candidates: usize,
    pub dropped_by_nearest: usize,
    pub duplicates_removed: usize,
    pub pairs: usize,

    pub catalog: CatalogStats,
}

impl DetectionStats {
    /// Add the per-stage counts of one body-pair scan
    pub fn merge(&mut self, other: &DetectionStats) {
        self.body_pairs_compared += other.body_pairs_compared;
        self.planar_compared += other.planar_compared;
        self.planar_passed_normal += other.planar_passed_normal;
        self.planar_passed_distance += other.planar_passed_distance;
        self.planar_passed_overlap += other.planar_passed_overlap;
        self.planar_boundary_only += other.planar_boundary_only;
        self.cylinder_compared += other.cylinder_compared;
        self.cylinder_passed_parallel += other.cylinder_passed_parallel;
        self.cylinder_passed_coaxial += other.cylinder_passed_coaxial;
        self.cylinder_passed_radius += other.cylinder_passed_radius;
        self.cylinder_passed_axial += other.cylinder_passed_axial;
        self.tangency_compared += other.tangency_compared;
        self.tangency_accepted += other.tangency_accepted;
        self.edge_comparisons += other.edge_comparisons;
        self.edge_collinear += other.edge_collinear;
        self.candidates += other.candidates;
    }
}

/// Results from a detection run
#[derive(Debug, Clone)]
pub struct DetectionReport {
    /// Classified contacts sorted by type and face ids
    pub pairs: Vec<ContactPair>,

    /// Two groups per prefix, built from selected pairs
    pub groups: Vec<NamedGroup>,

    /// One summary per touching body pair
    pub interfaces: Vec<InterfaceSummary>,

    pub stats: DetectionStats,
    pub log: DiagnosticLog,
    pub criteria: DetectionCriteria,
}

impl DetectionReport {
    /// Get number of contact pairs
    pub fn num_pairs(&self) -> usize {
        self.pairs.len()
    }

    /// Pairs of one contact type
    pub fn pairs_of_type(&self, contact_type: ContactType) -> impl Iterator<Item = &ContactPair> {
        self.pairs
            .iter()
            .filter(move |p| p.contact_type == contact_type)
    }

    /// Number of pairs of one contact type
    pub fn count(&self, contact_type: ContactType) -> usize {
        self.pairs_of_type(contact_type).count()
    }

    /// Summed contact measure of all pairs
    pub fn total_measure(&self) -> f64 {
        self.pairs.iter().map(|p| p.measure).sum()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(60));
        println!("CONTACT DETECTION RESULTS");
        println!("{}", "=".repeat(60));
        println!();
        println!("  Bodies:          {}", self.stats.bodies);
        println!("  Body Pairs:      {}", self.stats.body_pairs_compared);
        println!("  Skipped Faces:   {}", self.stats.catalog.skipped());
        println!();
        println!("  Contact Pairs:   {}", self.num_pairs());
        println!("    Face:          {}", self.count(ContactType::Face));
        println!("    Edge:          {}", self.count(ContactType::Edge));
        println!("    Cylinder:      {}", self.count(ContactType::Cylinder));
        println!("    PlaneCylinder: {}", self.count(ContactType::PlaneCylinder));
        println!("  Total Area:      {:.3} mm²", self.total_measure());
        println!();

        if !self.interfaces.is_empty() {
            println!("  Interfaces:");
            for iface in &self.interfaces {
                println!(
                    "    {} ({:?}, {} pairs, {:.3} mm²)",
                    iface.group_name, iface.kind, iface.face_pairs, iface.total_measure
                );
            }
            println!();
        }

        println!("  Filter Statistics:");
        println!(
            "    Planar:   compared={} normal={} distance={} overlap={}",
            self.stats.planar_compared,
            self.stats.planar_passed_normal,
            self.stats.planar_passed_distance,
            self.stats.planar_passed_overlap
        );
        println!(
            "    Cylinder: compared={} parallel={} coaxial={} radius={} axial={}",
            self.stats.cylinder_compared,
            self.stats.cylinder_passed_parallel,
            self.stats.cylinder_passed_coaxial,
            self.stats.cylinder_passed_radius,
            self.stats.cylinder_passed_axial
        );
        println!(
            "    Tangency: compared={} accepted={}",
            self.stats.tangency_compared, self.stats.tangency_accepted
        );
        println!(
            "    Edges:    compared={} collinear={}",
            self.stats.edge_comparisons, self.stats.edge_collinear
        );
        println!("    Dropped by nearest filter: {}", self.stats.dropped_by_nearest);
        println!();
        println!("  Criteria:");
        println!("    Tolerance:   {:.4} mm", self.criteria.tolerance);
        println!("    Planar:      {}", self.criteria.detect_planar);
        println!("    Cylindrical: {}", self.criteria.detect_cylindrical);
        println!("    Edges:       {}", self.criteria.detect_edges);
        println!();
        println!("{}", "=".repeat(60));
    }
}
