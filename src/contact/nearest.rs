//! Nearest-match filter for planar candidates
//!
//! A thin body produces two opposed faces that both pass the plane tests
//! against a neighbour. Only the closest partner of each face is kept: a
//! candidate survives when its distance is within [`NEAREST_EPSILON`] of the
//! minimum recorded for either of its faces. Equidistant partners are all
//! kept.

use crate::contact::diagnostics::DiagnosticLog;
use crate::contact::types::{ContactCandidate, Predicate};
use crate::model::FaceId;
use std::collections::HashMap;

/// Distance slack when comparing against a face's minimum (mm)
pub const NEAREST_EPSILON: f64 = 0.01;

/// Drop planar candidates that are not the closest match of either face
///
/// Must run on the complete candidate set. Candidates of other predicates
/// pass through untouched. Returns the number of dropped candidates.
pub fn retain_nearest(candidates: &mut Vec<ContactCandidate>, log: &mut DiagnosticLog) -> usize {
    let mut best: HashMap<FaceId, f64> = HashMap::new();
    for c in candidates
        .iter()
        .filter(|c| c.predicate == Predicate::PlanarPlanar)
    {
        for face in [c.face_a, c.face_b] {
            let entry = best.entry(face).or_insert(f64::MAX);
            if c.distance < *entry {
                *entry = c.distance;
            }
        }
    }

    let before = candidates.len();
    candidates.retain(|c| {
        if c.predicate != Predicate::PlanarPlanar {
            return true;
        }

        let best_a = best.get(&c.face_a).copied().unwrap_or(f64::MAX);
        let best_b = best.get(&c.face_b).copied().unwrap_or(f64::MAX);
        let keep = c.distance <= best_a + NEAREST_EPSILON || c.distance <= best_b + NEAREST_EPSILON;
        if !keep {
            log.push(format!(
                "  not nearest (dropped): face {} <-> face {}, dist={:.3e} (best={:.3e}/{:.3e})",
                c.face_a, c.face_b, c.distance, best_a, best_b
            ));
        }
        keep
    });

    let dropped = before - candidates.len();
    if dropped > 0 {
        log.push(format!("nearest filter dropped {} candidates", dropped));
    }
    dropped
}
