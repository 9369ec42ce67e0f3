//! Candidate deduplication, A/B assignment, naming and grouping

use crate::catalog::{name_contains, FaceCatalog};
use crate::contact::types::{
    ContactCandidate, ContactPair, ContactType, InterfaceKind, InterfaceSummary, NamedGroup,
};
use crate::error::{InterfaceDetectorError, Result};
use crate::model::{BodyId, FaceId};
use std::collections::{BTreeMap, HashMap};

/// Offset of the A-side individual selection names
const NAME_OFFSET_A: usize = 100_000;

/// Offset of the B-side individual selection names
const NAME_OFFSET_B: usize = 200_000;

/// Body-name keyword filter deciding which body pairs are examined
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupFilter {
    /// Every body pair
    #[default]
    All,

    /// Pairs where at least one body matches the keyword
    Single(String),

    /// Pairs with one body matching each keyword
    Between(String, String),
}

impl GroupFilter {
    /// Build a filter from optional keywords; blank keywords count as absent
    pub fn from_keywords(keyword_a: Option<&str>, keyword_b: Option<&str>) -> Result<Self> {
        let clean = |k: Option<&str>| {
            k.map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
        };

        match (clean(keyword_a), clean(keyword_b)) {
            (None, None) => Ok(GroupFilter::All),
            (Some(a), None) => Ok(GroupFilter::Single(a)),
            (Some(a), Some(b)) => Ok(GroupFilter::Between(a, b)),
            (None, Some(b)) => Err(InterfaceDetectorError::ConfigError(format!(
                "Keyword B '{}' requires keyword A",
                b
            ))),
        }
    }

    /// Whether a pair of bodies with these names is eligible
    pub fn admits(&self, name_a: &str, name_b: &str) -> bool {
        match self {
            GroupFilter::All => true,
            GroupFilter::Single(kw) => name_contains(name_a, kw) || name_contains(name_b, kw),
            GroupFilter::Between(ka, kb) => {
                (name_contains(name_a, ka) && name_contains(name_b, kb))
                    || (name_contains(name_a, kb) && name_contains(name_b, ka))
            }
        }
    }

    /// Primary keyword used for group prefixes
    pub fn keyword(&self) -> Option<&str> {
        match self {
            GroupFilter::All => None,
            GroupFilter::Single(kw) | GroupFilter::Between(kw, _) => Some(kw),
        }
    }
}

/// Group-name prefix for a contact
///
/// Pairs involving a body that matches the keyword are grouped under the
/// keyword itself, everything else under a fixed tag per contact type.
pub fn prefix_for(
    contact_type: ContactType,
    keyword: Option<&str>,
    name_a: &str,
    name_b: &str,
) -> String {
    let keyword = keyword.filter(|kw| name_contains(name_a, kw) || name_contains(name_b, kw));
    match (keyword, contact_type) {
        (Some(kw), ContactType::Face) => kw.to_string(),
        (Some(kw), ContactType::Edge) => format!("{}_Edge", kw),
        (Some(kw), ContactType::Cylinder) => format!("{}_Cyl", kw),
        (Some(kw), ContactType::PlaneCylinder) => format!("{}_Tangent", kw),
        (None, ContactType::Face) => "NodeSet".to_string(),
        (None, ContactType::Edge) => "EdgeContact".to_string(),
        (None, ContactType::Cylinder) => "CylinderContact".to_string(),
        (None, ContactType::PlaneCylinder) => "TangentContact".to_string(),
    }
}

/// Output of the classification stage
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub pairs: Vec<ContactPair>,
    pub groups: Vec<NamedGroup>,
    pub interfaces: Vec<InterfaceSummary>,
    pub duplicates_removed: usize,
}

/// Keep the highest-priority candidate per unordered face pair
///
/// Earlier candidates win ties. Returns the survivors in input order and
/// the number removed.
pub fn dedup_candidates(candidates: Vec<ContactCandidate>) -> (Vec<ContactCandidate>, usize) {
    let total = candidates.len();
    let mut slots: HashMap<(FaceId, FaceId), usize> = HashMap::new();
    let mut kept: Vec<Option<ContactCandidate>> = Vec::with_capacity(total);

    for candidate in candidates {
        match slots.get(&candidate.face_key()) {
            Some(&slot) => {
                let better = kept[slot]
                    .as_ref()
                    .map_or(true, |current| candidate.priority() < current.priority());
                if better {
                    kept[slot] = Some(candidate);
                }
            }
            None => {
                slots.insert(candidate.face_key(), kept.len());
                kept.push(Some(candidate));
            }
        }
    }

    let survivors: Vec<ContactCandidate> = kept.into_iter().flatten().collect();
    let removed = total - survivors.len();
    (survivors, removed)
}

/// Turn filtered candidates into named, grouped contact pairs
pub fn classify(
    candidates: Vec<ContactCandidate>,
    catalog: &FaceCatalog,
    filter: &GroupFilter,
) -> Classification {
    let (survivors, duplicates_removed) = dedup_candidates(candidates);

    let mut oriented: Vec<(ContactCandidate, bool)> = survivors
        .into_iter()
        .map(|c| {
            // The face whose direction components sum positive is the A side
            let d = c.direction_a;
            let keep = d.x + d.y + d.z > 0.0;
            (c, keep)
        })
        .collect();
    oriented.sort_by(|(a, _), (b, _)| {
        (a.contact_type, a.face_key()).cmp(&(b.contact_type, b.face_key()))
    });

    let mut counters: HashMap<String, usize> = HashMap::new();
    let pairs: Vec<ContactPair> = oriented
        .into_iter()
        .map(|(c, keep)| {
            let (face_a, face_b, body_a, body_b) = if keep {
                (c.face_a, c.face_b, c.body_a, c.body_b)
            } else {
                (c.face_b, c.face_a, c.body_b, c.body_a)
            };
            let cat_a = &catalog.bodies[body_a];
            let cat_b = &catalog.bodies[body_b];

            let prefix = prefix_for(c.contact_type, filter.keyword(), &cat_a.name, &cat_b.name);
            let counter = counters.entry(prefix.clone()).or_insert(0);
            *counter += 1;
            let pair_index = *counter;

            ContactPair {
                face_a,
                face_b,
                body_a: cat_a.id,
                body_b: cat_b.id,
                body_name_a: cat_a.name.clone(),
                body_name_b: cat_b.name.clone(),
                contact_type: c.contact_type,
                name_a: format!("{}_{}", prefix, NAME_OFFSET_A + pair_index),
                name_b: format!("{}_{}", prefix, NAME_OFFSET_B + pair_index),
                prefix,
                pair_index,
                measure: c.measure,
                distance: c.distance,
                selected: true,
            }
        })
        .collect();

    let groups = build_groups(&pairs);
    let interfaces = summarize_interfaces(&pairs);

    Classification {
        pairs,
        groups,
        interfaces,
        duplicates_removed,
    }
}

/// Two groups per prefix (`{prefix}_1` A faces, `{prefix}_2` B faces) over
/// selected pairs, ordered by prefix
pub fn build_groups(pairs: &[ContactPair]) -> Vec<NamedGroup> {
    let mut by_prefix: BTreeMap<&str, (Vec<FaceId>, Vec<FaceId>)> = BTreeMap::new();
    for pair in pairs.iter().filter(|p| p.selected) {
        let (a, b) = by_prefix.entry(&pair.prefix).or_default();
        a.push(pair.face_a);
        b.push(pair.face_b);
    }

    by_prefix
        .into_iter()
        .flat_map(|(prefix, (a, b))| {
            [
                NamedGroup {
                    name: format!("{}_1", prefix),
                    faces: a,
                },
                NamedGroup {
                    name: format!("{}_2", prefix),
                    faces: b,
                },
            ]
        })
        .collect()
}

/// Mark pairs selected when either body name contains `keyword`
///
/// Returns the number of selected pairs.
pub fn select_by_keyword(pairs: &mut [ContactPair], keyword: &str) -> usize {
    let mut selected = 0;
    for pair in pairs.iter_mut() {
        pair.selected =
            name_contains(&pair.body_name_a, keyword) || name_contains(&pair.body_name_b, keyword);
        selected += usize::from(pair.selected);
    }
    selected
}

fn sanitize_name(name: &str) -> String {
    if name.is_empty() {
        return "Body".to_string();
    }
    name.replace([' ', '/', '\\'], "_")
}

/// One summary per touching body pair, keyed by body id order
pub fn summarize_interfaces(pairs: &[ContactPair]) -> Vec<InterfaceSummary> {
    let mut by_bodies: BTreeMap<(BodyId, BodyId), InterfaceSummary> = BTreeMap::new();

    for pair in pairs {
        let (lo, hi, lo_name, hi_name) = if pair.body_a <= pair.body_b {
            (pair.body_a, pair.body_b, &pair.body_name_a, &pair.body_name_b)
        } else {
            (pair.body_b, pair.body_a, &pair.body_name_b, &pair.body_name_a)
        };
        let kind = match pair.contact_type {
            ContactType::Face | ContactType::Edge => InterfaceKind::Planar,
            ContactType::Cylinder => InterfaceKind::Cylindrical,
            ContactType::PlaneCylinder => InterfaceKind::Mixed,
        };

        let summary = by_bodies.entry((lo, hi)).or_insert_with(|| InterfaceSummary {
            group_name: format!(
                "Interface_{}_{}",
                sanitize_name(lo_name),
                sanitize_name(hi_name)
            ),
            body_a: lo,
            body_b: hi,
            kind,
            total_measure: 0.0,
            face_pairs: 0,
        });
        if summary.kind != kind {
            summary.kind = InterfaceKind::Mixed;
        }
        summary.total_measure += pair.measure;
        summary.face_pairs += 1;
    }

    by_bodies.into_values().collect()
}
