//! Adjacency test for ray pairs
//!
//! Two extreme rays span a common 2-face exactly when no other ray of
//! the cone is tight on every constraint the pair is jointly tight on.
//! The combinatorial scan is preceded by a counting filter: a pair whose
//! common tight set has fewer than `dim - 2` constraints cannot span a
//! 2-face and is rejected without touching the ray list.

use super::ray::Ray;

/// True iff the rays at `p_idx` and `n_idx` are adjacent in the cone
/// described by `rays`. The scan runs in ray-list order and stops at the
/// first witness against adjacency.
pub fn adjacent(rays: &[Ray], p_idx: usize, n_idx: usize, dim: usize) -> bool {
    let p_faces = rays[p_idx].faces();
    let n_faces = rays[n_idx].faces();

    if p_faces.intersection_count(n_faces) + 2 < dim {
        return false;
    }

    for (i, q) in rays.iter().enumerate() {
        if i == p_idx || i == n_idx {
            continue;
        }
        if q.faces().contains_intersection(p_faces, n_faces) {
            return false;
        }
    }
    true
}
