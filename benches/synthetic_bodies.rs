//! Synthetic body generation utilities for benchmarking
//!
//! Builds regular assemblies of touching boxes so the detection workload
//! grows predictably with the number of bodies.

use interface_detector::contact::broad_phase::BodyBounds;
use interface_detector::geometry::{Aabb, Point, Vec3};
use interface_detector::model::shapes::box_body;
use interface_detector::model::{Body, BodyId};

/// Generate a structured 3D grid of touching boxes
///
/// Total bodies = nx * ny * nz. Every box has six faces, numbered
/// consecutively in body order.
///
/// # Arguments
/// * `nx` - Number of boxes in X direction
/// * `ny` - Number of boxes in Y direction
/// * `nz` - Number of boxes in Z direction
/// * `size` - Edge length of each box
pub fn generate_box_grid(nx: usize, ny: usize, nz: usize, size: f64) -> Vec<Body> {
    let mut bodies = Vec::with_capacity(nx * ny * nz);

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let id = bodies.len();
                let min = Point::new(i as f64 * size, j as f64 * size, k as f64 * size);
                bodies.push(box_body(
                    BodyId(id),
                    &format!("Box_{}_{}_{}", i, j, k),
                    min,
                    min + Vec3::new(size, size, size),
                    id * 6,
                ));
            }
        }
    }

    bodies
}

/// Two layers of plates separated by `gap`, offset so that every upper
/// plate straddles four lower ones
pub fn generate_staggered_layers(n: usize, size: f64, gap: f64) -> Vec<Body> {
    let mut bodies = generate_box_grid(n, n, 1, size);
    let z0 = size + gap;
    let offset = 0.5 * size;

    for j in 0..n.saturating_sub(1) {
        for i in 0..n.saturating_sub(1) {
            let id = bodies.len();
            let min = Point::new(i as f64 * size + offset, j as f64 * size + offset, z0);
            bodies.push(box_body(
                BodyId(id),
                &format!("Cap_{}_{}", i, j),
                min,
                min + Vec3::new(size, size, 0.2 * size),
                id * 6,
            ));
        }
    }

    bodies
}

/// Scattered boxes with deterministic pseudo-random placement
pub fn generate_scattered_bounds(count: usize, extent: f64) -> Vec<BodyBounds> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    (0..count)
        .map(|index| {
            let min = Point::new(next() * extent, next() * extent, next() * extent);
            let size = Vec3::new(1.0 + next() * 4.0, 1.0 + next() * 4.0, 1.0 + next() * 4.0);
            BodyBounds {
                index,
                aabb: Aabb::new(min, min + size),
            }
        })
        .collect()
}

/// Grid dimensions giving roughly `target_bodies` boxes in a flat slab
pub fn calculate_grid_dimensions(target_bodies: usize) -> (usize, usize, usize) {
    let side = (target_bodies as f64).sqrt().ceil() as usize;
    (side.max(1), side.max(1), 1)
}
