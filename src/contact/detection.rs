//! Two-phase contact detection pipeline
//!
//! Phase one gathers candidates from every eligible body pair; phase two
//! filters them (nearest match), deduplicates and classifies. The filter
//! needs the complete candidate set, so the phases never interleave.

use crate::catalog::{CatalogBody, CatalogFace, EdgeRecord, FaceCatalog, FaceFeature};
use crate::contact::broad_phase::{all_pairs, compute_cell_size, neighbor_pairs, BodyBounds};
use crate::contact::classify::{classify, GroupFilter};
use crate::contact::diagnostics::{DetailBudget, DiagnosticLog};
use crate::contact::matcher::{
    edges_coincident, match_cylinders, match_planar, match_tangency, Rejection, LINE_TOL,
};
use crate::contact::nearest::retain_nearest;
use crate::contact::types::{
    ContactCandidate, ContactType, DetectionCriteria, DetectionReport, DetectionStats, Predicate,
};
use crate::error::{InterfaceDetectorError, Result};
use crate::model::{Body, FaceId};
use kiddo::ImmutableKdTree;
use std::collections::HashSet;
use std::f64::consts::PI;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Near misses within this multiple of the tolerance are always logged
const NEAR_MISS_FACTOR: f64 = 10.0;

/// Threshold for parallelization (below this, overhead isn't worth it)
const PARALLEL_THRESHOLD: usize = 64;

/// Candidates, counts and log lines of one body pair
#[derive(Debug, Default)]
struct PairScan {
    candidates: Vec<ContactCandidate>,
    stats: DetectionStats,
    log: DiagnosticLog,
}

/// Detect contacts between all eligible pairs of `bodies`
pub fn detect_contacts(
    bodies: &[Body],
    criteria: &DetectionCriteria,
    filter: &GroupFilter,
) -> Result<DetectionReport> {
    if bodies.is_empty() {
        return Err(InterfaceDetectorError::EmptyBodySet);
    }
    criteria.validate()?;

    log::info!(
        "Detecting contacts among {} bodies (tolerance {} mm)",
        bodies.len(),
        criteria.tolerance
    );

    let mut log = DiagnosticLog::new();
    log.push(format!("bodies: {}", bodies.len()));

    let catalog = FaceCatalog::build(bodies, &mut log);
    let mut stats = DetectionStats {
        bodies: bodies.len(),
        catalog: catalog.stats(),
        ..DetectionStats::default()
    };
    log.push(format!(
        "catalog: planar={}, cylindrical={}, skipped={}",
        stats.catalog.planar,
        stats.catalog.cylindrical,
        stats.catalog.skipped()
    ));

    let body_pairs = candidate_body_pairs(&catalog, criteria, filter, &mut log);
    log::info!("Evaluating {} body pairs...", body_pairs.len());

    let scan = |&(i, j): &(usize, usize)| {
        scan_body_pair(&catalog.bodies[i], &catalog.bodies[j], criteria)
    };

    #[cfg(feature = "parallel")]
    let scans: Vec<PairScan> = if body_pairs.len() >= PARALLEL_THRESHOLD {
        body_pairs.par_iter().map(scan).collect()
    } else {
        body_pairs.iter().map(scan).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let scans: Vec<PairScan> = body_pairs.iter().map(scan).collect();

    // Merge in body-pair order
    let mut candidates = Vec::new();
    for mut pair_scan in scans {
        stats.merge(&pair_scan.stats);
        log.append(&mut pair_scan.log);
        candidates.append(&mut pair_scan.candidates);
    }

    log.push(format!(
        "planar filter: compared={}, normal={}, distance={}, overlap={}, boundary-only={}",
        stats.planar_compared,
        stats.planar_passed_normal,
        stats.planar_passed_distance,
        stats.planar_passed_overlap,
        stats.planar_boundary_only
    ));
    log.push(format!(
        "cylinder filter: compared={}, parallel={}, coaxial={}, radius={}, axial={}",
        stats.cylinder_compared,
        stats.cylinder_passed_parallel,
        stats.cylinder_passed_coaxial,
        stats.cylinder_passed_radius,
        stats.cylinder_passed_axial
    ));
    log.push(format!(
        "tangency: compared={}, accepted={}",
        stats.tangency_compared, stats.tangency_accepted
    ));
    log.push(format!(
        "edges: compared={}, collinear={}",
        stats.edge_comparisons, stats.edge_collinear
    ));

    stats.dropped_by_nearest = retain_nearest(&mut candidates, &mut log);

    let classification = classify(candidates, &catalog, filter);
    stats.duplicates_removed = classification.duplicates_removed;
    stats.pairs = classification.pairs.len();
    log.push(format!(
        "detected pairs: {} ({} duplicates removed)",
        stats.pairs, stats.duplicates_removed
    ));

    log::info!("Found {} contact pairs", stats.pairs);

    Ok(DetectionReport {
        pairs: classification.pairs,
        groups: classification.groups,
        interfaces: classification.interfaces,
        stats,
        log,
        criteria: criteria.clone(),
    })
}

/// Body pairs whose padded boxes overlap and that pass the keyword filter
fn candidate_body_pairs(
    catalog: &FaceCatalog,
    criteria: &DetectionCriteria,
    filter: &GroupFilter,
    log: &mut DiagnosticLog,
) -> Vec<(usize, usize)> {
    let bounds: Vec<BodyBounds> = catalog
        .bodies
        .iter()
        .filter_map(|b| {
            b.bounds
                .as_ref()
                .map(|aabb| BodyBounds::padded(b.index, aabb, criteria.tolerance))
        })
        .collect();

    let pairs = if catalog.bodies.len() < criteria.broad_phase_min_bodies {
        let pairs = all_pairs(&bounds);
        log.push(format!("exhaustive body pairs: {}", pairs.len()));
        pairs
    } else {
        let cell_size = compute_cell_size(&bounds);
        let pairs = neighbor_pairs(&bounds, cell_size);
        log.push(format!(
            "spatial index: cell size={:.3e}, neighbor pairs={}",
            cell_size,
            pairs.len()
        ));
        pairs
    };

    let eligible: Vec<(usize, usize)> = pairs
        .into_iter()
        .filter(|&(i, j)| filter.admits(&catalog.bodies[i].name, &catalog.bodies[j].name))
        .collect();

    if *filter != GroupFilter::All {
        log.push(format!("keyword filter: {} eligible body pairs", eligible.len()));
    }
    eligible
}

/// Evaluate every face pair and shared edge between two bodies
fn scan_body_pair(
    body_a: &CatalogBody,
    body_b: &CatalogBody,
    criteria: &DetectionCriteria,
) -> PairScan {
    let mut scan = PairScan::default();
    scan.stats.body_pairs_compared = 1;
    let mut budget = DetailBudget::default();

    for fa in &body_a.faces {
        for fb in &body_b.faces {
            // Lower face id first, so results do not depend on body order
            let (first, second, first_body, second_body) = if fa.id <= fb.id {
                (fa, fb, body_a, body_b)
            } else {
                (fb, fa, body_b, body_a)
            };
            match_faces(
                first,
                second,
                first_body,
                second_body,
                criteria,
                &mut scan,
                &mut budget,
            );
        }
    }

    if criteria.detect_edges {
        scan_shared_edges(body_a, body_b, &mut scan);
    }

    if !scan.candidates.is_empty() {
        scan.log.push(format!(
            "[pair] {} <-> {}: {} candidates",
            body_a.name,
            body_b.name,
            scan.candidates.len()
        ));
    }
    scan
}

#[allow(clippy::too_many_arguments)]
fn candidate(
    a: &CatalogFace,
    b: &CatalogFace,
    body_a: &CatalogBody,
    body_b: &CatalogBody,
    predicate: Predicate,
    contact_type: ContactType,
    distance: f64,
    measure: f64,
) -> ContactCandidate {
    ContactCandidate {
        face_a: a.id,
        face_b: b.id,
        body_a: body_a.index,
        body_b: body_b.index,
        direction_a: a.feature.direction(),
        direction_b: b.feature.direction(),
        distance,
        predicate,
        contact_type,
        measure,
    }
}

/// Run the predicate matching the two faces' surface types
fn match_faces(
    a: &CatalogFace,
    b: &CatalogFace,
    body_a: &CatalogBody,
    body_b: &CatalogBody,
    criteria: &DetectionCriteria,
    scan: &mut PairScan,
    budget: &mut DetailBudget,
) {
    let tolerance = criteria.tolerance;

    match (&a.feature, &b.feature) {
        (FaceFeature::Planar(pa), FaceFeature::Planar(pb)) if criteria.detect_planar => {
            scan.stats.planar_compared += 1;
            let result = match_planar(pa, pb, tolerance);
            let passed = match &result {
                Ok(_) => 3,
                Err(r) => r.stage().min(3),
            };
            scan.stats.planar_passed_normal += usize::from(passed >= 1);
            scan.stats.planar_passed_distance += usize::from(passed >= 2);
            scan.stats.planar_passed_overlap += usize::from(passed >= 3);

            match result {
                Ok(m) => {
                    let (contact_type, measure) = if m.interior {
                        (ContactType::Face, a.area.min(b.area))
                    } else {
                        scan.stats.planar_boundary_only += 1;
                        scan.log.push(format!(
                            "  [edge only] {} face {} <-> {} face {}: coplanar, boundary shared",
                            body_a.name, a.id, body_b.name, b.id
                        ));
                        (ContactType::Edge, 0.0)
                    };
                    scan.candidates.push(candidate(
                        a,
                        b,
                        body_a,
                        body_b,
                        Predicate::PlanarPlanar,
                        contact_type,
                        m.distance,
                        measure,
                    ));
                }
                Err(Rejection::PlaneDistance { distance })
                    if distance < tolerance * NEAR_MISS_FACTOR =>
                {
                    scan.log.push(format!(
                        "  near-miss plane distance: {} face {} <-> {} face {}, dist={:.3e} (tol={:.3e})",
                        body_a.name, a.id, body_b.name, b.id, distance, tolerance
                    ));
                }
                Err(r) => log_rejection(scan, budget, a.id, b.id, body_a, body_b, &r),
            }
        }
        (FaceFeature::Cylindrical(ca), FaceFeature::Cylindrical(cb))
            if criteria.detect_cylindrical =>
        {
            scan.stats.cylinder_compared += 1;
            let result = match_cylinders(ca, cb);
            let passed = match &result {
                Ok(_) => 4,
                Err(r) => r.stage(),
            };
            scan.stats.cylinder_passed_parallel += usize::from(passed >= 1);
            scan.stats.cylinder_passed_coaxial += usize::from(passed >= 2);
            scan.stats.cylinder_passed_radius += usize::from(passed >= 3);
            scan.stats.cylinder_passed_axial += usize::from(passed >= 4);

            match result {
                Ok(m) => {
                    scan.log.push(format!(
                        "  [coaxial] {} face {} ({:?}) <-> {} face {} ({:?}): r={:.4}, overlap={:.4}",
                        body_a.name, a.id, ca.sense, body_b.name, b.id, cb.sense, m.radius, m.overlap_length
                    ));
                    scan.candidates.push(candidate(
                        a,
                        b,
                        body_a,
                        body_b,
                        Predicate::CylinderCylinder,
                        ContactType::Cylinder,
                        m.axis_offset,
                        2.0 * PI * m.radius * m.overlap_length,
                    ));
                }
                Err(r) => log_rejection(scan, budget, a.id, b.id, body_a, body_b, &r),
            }
        }
        (FaceFeature::Planar(plane), FaceFeature::Cylindrical(cyl))
        | (FaceFeature::Cylindrical(cyl), FaceFeature::Planar(plane))
            if criteria.detect_tangency() =>
        {
            scan.stats.tangency_compared += 1;
            match match_tangency(plane, cyl, tolerance) {
                Ok(m) => {
                    scan.stats.tangency_accepted += 1;
                    scan.candidates.push(candidate(
                        a,
                        b,
                        body_a,
                        body_b,
                        Predicate::PlaneCylinder,
                        ContactType::PlaneCylinder,
                        m.gap,
                        0.0,
                    ));
                }
                Err(r) => log_rejection(scan, budget, a.id, b.id, body_a, body_b, &r),
            }
        }
        _ => {}
    }
}

fn log_rejection(
    scan: &mut PairScan,
    budget: &mut DetailBudget,
    face_a: FaceId,
    face_b: FaceId,
    body_a: &CatalogBody,
    body_b: &CatalogBody,
    rejection: &Rejection,
) {
    // Most face pairs of neighbouring bodies fail the direction test
    if rejection.stage() == 0 || !budget.take() {
        return;
    }
    scan.log.push(format!(
        "  [rejected] {} face {} <-> {} face {}: {}",
        body_a.name, face_a, body_b.name, face_b, rejection
    ));
}

/// Build a k-d tree over edge midpoints
fn build_edge_kdtree(edges: &[EdgeRecord]) -> ImmutableKdTree<f64, 3> {
    let points: Vec<[f64; 3]> = edges
        .iter()
        .map(|e| {
            let m = e.midpoint();
            [m.x, m.y, m.z]
        })
        .collect();

    ImmutableKdTree::new_from_slice(&points)
}

/// Collinear straight edges shared between two bodies, one candidate per face pair
fn scan_shared_edges(body_a: &CatalogBody, body_b: &CatalogBody, scan: &mut PairScan) {
    if body_a.edges.is_empty() || body_b.edges.is_empty() {
        return;
    }

    let tree_b = build_edge_kdtree(&body_b.edges);
    let max_len_b = body_b
        .edges
        .iter()
        .map(EdgeRecord::length)
        .fold(0.0, f64::max);
    let mut paired: HashSet<(FaceId, FaceId)> = HashSet::new();

    for ea in &body_a.edges {
        let m = ea.midpoint();
        let radius = 0.5 * (ea.length() + max_len_b) + LINE_TOL;
        let nearby = tree_b.within::<kiddo::SquaredEuclidean>(&[m.x, m.y, m.z], radius * radius);

        for neighbor in nearby.iter() {
            let eb = &body_b.edges[neighbor.item as usize];
            let (first, second, first_body, second_body) = if ea.face <= eb.face {
                (ea, eb, body_a, body_b)
            } else {
                (eb, ea, body_b, body_a)
            };

            let key = (first.face, second.face);
            if paired.contains(&key) {
                continue;
            }

            scan.stats.edge_comparisons += 1;
            if edges_coincident(&first.start, &first.end, &second.start, &second.end).is_err() {
                continue;
            }

            scan.stats.edge_collinear += 1;
            paired.insert(key);
            scan.candidates.push(ContactCandidate {
                face_a: first.face,
                face_b: second.face,
                body_a: first_body.index,
                body_b: second_body.index,
                direction_a: first.orientation,
                direction_b: second.orientation,
                distance: 0.0,
                predicate: Predicate::EdgeEdge,
                contact_type: ContactType::Edge,
                measure: 0.0,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::model::shapes::{box_body, plate_body};
    use crate::model::BodyId;

    fn square_plate(id: usize, x0: f64, z: f64, up: bool, face_id: usize) -> Body {
        let mut corners = [
            Point::new(x0, 0.0, z),
            Point::new(x0 + 10.0, 0.0, z),
            Point::new(x0 + 10.0, 10.0, z),
            Point::new(x0, 10.0, z),
        ];
        if !up {
            corners.reverse();
        }
        plate_body(BodyId(id), &format!("Plate{}", id), corners, face_id).unwrap()
    }

    #[test]
    fn test_empty_body_set() {
        let result = detect_contacts(&[], &DetectionCriteria::default(), &GroupFilter::All);
        assert!(matches!(result, Err(InterfaceDetectorError::EmptyBodySet)));
    }

    #[test]
    fn test_invalid_tolerance() {
        let bodies = vec![square_plate(0, 0.0, 0.0, true, 0)];
        let result = detect_contacts(&bodies, &DetectionCriteria::new(-1.0), &GroupFilter::All);
        assert!(matches!(result, Err(InterfaceDetectorError::ConfigError(_))));
    }

    #[test]
    fn test_face_contact_between_plates() {
        let bodies = vec![
            square_plate(0, 0.0, 0.0, true, 0),
            square_plate(1, 0.0, 0.5, false, 1),
        ];
        let report =
            detect_contacts(&bodies, &DetectionCriteria::default(), &GroupFilter::All).unwrap();

        assert_eq!(report.num_pairs(), 1);
        assert_eq!(report.pairs[0].contact_type, ContactType::Face);
        assert!((report.pairs[0].measure - 100.0).abs() < 1e-9);
        assert_eq!(report.stats.planar_compared, 1);
        assert_eq!(report.stats.planar_passed_overlap, 1);
    }

    #[test]
    fn test_stacked_boxes_edge_pass_deduplicated() {
        let bodies = vec![
            box_body(BodyId(0), "Lower", Point::new(0.0, 0.0, 0.0), Point::new(10.0, 10.0, 5.0), 0),
            box_body(BodyId(1), "Upper", Point::new(0.0, 0.0, 5.0), Point::new(10.0, 10.0, 10.0), 6),
        ];
        let criteria = DetectionCriteria {
            detect_edges: false,
            ..DetectionCriteria::default()
        };
        let report = detect_contacts(&bodies, &criteria, &GroupFilter::All).unwrap();

        assert_eq!(report.count(ContactType::Face), 1);
        let pair = &report.pairs[0];
        assert_eq!((pair.face_a, pair.face_b), (FaceId(1), FaceId(6)));
        assert_eq!(pair.body_name_a, "Lower");

        let with_edges =
            detect_contacts(&bodies, &DetectionCriteria::default(), &GroupFilter::All).unwrap();
        assert_eq!(with_edges.count(ContactType::Face), 1);
        assert!(with_edges.stats.edge_collinear > 0);
        // the top/bottom pair is reported once as a face contact
        assert!(with_edges
            .pairs
            .iter()
            .filter(|p| (p.face_a, p.face_b) == (FaceId(1), FaceId(6)))
            .all(|p| p.contact_type == ContactType::Face));
    }

    #[test]
    fn test_keyword_filter_excludes_pairs() {
        let bodies = vec![
            square_plate(0, 0.0, 0.0, true, 0),
            square_plate(1, 0.0, 0.5, false, 1),
        ];
        let filter = GroupFilter::Single("Bolt".to_string());
        let report = detect_contacts(&bodies, &DetectionCriteria::default(), &filter).unwrap();
        assert_eq!(report.num_pairs(), 0);
        assert_eq!(report.stats.body_pairs_compared, 0);
    }

    #[test]
    fn test_edge_kdtree_lookup() {
        let body = box_body(BodyId(0), "Block", Point::origin(), Point::new(1.0, 1.0, 1.0), 0);
        let edges: Vec<EdgeRecord> = body
            .edges()
            .map(|(face, edge)| EdgeRecord {
                face: face.id,
                start: edge.start,
                end: edge.end,
                orientation: crate::geometry::Vec3::zeros(),
            })
            .collect();
        let tree = build_edge_kdtree(&edges);

        let nearest = tree.nearest_n::<kiddo::SquaredEuclidean>(&[0.5, 0.0, 0.0], std::num::NonZero::new(1).unwrap());
        assert_eq!(nearest.len(), 1);
        let found = &edges[nearest[0].item as usize];
        assert!((found.midpoint() - Point::new(0.5, 0.0, 0.0)).norm() < 1e-12);
    }
}
