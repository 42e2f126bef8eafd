//! Hilbert bases of the integer points of pointed cones
//!
//! The basis is assembled bottom-up: the generators' span is cut down to
//! a full-rank coordinate system through its saturated lattice, the cone
//! is triangulated into simplicial subcones while its support
//! hyperplanes are computed by a double description sweep over the dual
//! cone, every subcone contributes the integer points of its fundamental
//! parallelepiped, and the merged candidate list is reduced to the
//! unique minimal generating set. Each simplicial subcone is an
//! independent worker task.
//!
//! When support constraints are supplied, the admissible region is a
//! union of faces of the cone; the basis is computed per maximal
//! admissible face and the results are merged.

use std::time::Instant;

use crate::enumerate::adjacency::adjacent;
use crate::enumerate::ray::Ray;
use crate::enumerate::validity::{self, ValidityConstraints};
use crate::error::{ConeError, Result};
use crate::maths::{lattice, linear, Bitmask, Integer, Matrix, Rational, Vector};
use crate::pool::{CancelToken, WorkPool};

/// Configuration for a Hilbert basis run.
#[derive(Debug, Clone, Default)]
pub struct HilbertConfig {
    /// Worker threads for the subcone phase; `0` means one per hardware
    /// thread.
    pub parallelism: usize,
    /// Support constraints restricting the admissible region.
    pub validity: ValidityConstraints,
    /// Cancellation handle, polled per face and per lattice point.
    pub cancel: CancelToken,
}

/// Counters and timing from one Hilbert basis run.
#[derive(Debug, Clone, Default)]
pub struct HilbertStats {
    /// Maximal admissible faces processed.
    pub faces: usize,
    /// Simplicial subcones across all faces.
    pub simplices: usize,
    /// Candidate vectors before reduction, summed over faces.
    pub candidates: usize,
    /// Elements in the final basis.
    pub basis_size: usize,
    /// Wall-clock time for the whole run, in microseconds.
    pub time_us: u128,
}

/// Computes the minimal generating set of `cone(generators) ∩ Z^dim`
/// under non-negative integer combination.
pub struct HilbertEnumerator {
    config: HilbertConfig,
}

impl HilbertEnumerator {
    pub fn new() -> Self {
        Self::with_config(HilbertConfig::default())
    }

    pub fn with_config(config: HilbertConfig) -> Self {
        Self { config }
    }

    /// The Hilbert basis of the cone generated by `generators`,
    /// lexicographically sorted. Zero generators are ignored; an empty
    /// generating set yields an empty basis. Fails with
    /// [`ConeError::UnsolvedCase`] when the generators span a cone that
    /// contains a line.
    pub fn enumerate(
        &self,
        generators: &[Vector],
        dim: usize,
    ) -> Result<(Vec<Vector>, HilbertStats)> {
        if dim == 0 {
            return Err(ConeError::ZeroDimension);
        }
        for g in generators {
            if g.len() != dim {
                return Err(ConeError::ShapeMismatch {
                    rows: generators.len(),
                    cols: g.len(),
                    dim,
                });
            }
        }

        let start = Instant::now();
        let cancel = &self.config.cancel;
        let pool = WorkPool::new(self.config.parallelism);
        let mut stats = HilbertStats::default();

        let gens: Vec<&Vector> = generators.iter().filter(|g| !g.is_zero()).collect();
        if gens.is_empty() {
            stats.time_us = start.elapsed().as_micros();
            return Ok((Vec::new(), stats));
        }

        let mut faces: Vec<Vec<usize>> = if self.config.validity.is_none() {
            vec![(0..gens.len()).collect()]
        } else {
            let masks = self.config.validity.bitmasks(dim);
            maximal_compatible_sets(&gens, &masks)
        };
        faces.retain(|face| !face.is_empty());
        stats.faces = faces.len();

        let mut basis: Vec<Vector> = Vec::new();
        for face in &faces {
            if cancel.is_armed() {
                return Err(ConeError::Cancelled);
            }
            let members: Vec<&Vector> = face.iter().map(|&i| gens[i]).collect();
            let mut part = face_basis(&members, &pool, cancel, &mut stats)?;
            basis.append(&mut part);
        }

        basis.sort();
        basis.dedup();
        stats.basis_size = basis.len();
        stats.time_us = start.elapsed().as_micros();
        Ok((basis, stats))
    }
}

impl Default for HilbertEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Hilbert basis of the cone spanned by one admissible face, expressed
/// in the ambient coordinates.
fn face_basis(
    members: &[&Vector],
    pool: &WorkPool,
    cancel: &CancelToken,
    stats: &mut HilbertStats,
) -> Result<Vec<Vector>> {
    let family =
        Matrix::from_rows(members.iter().map(|m| m.coords().to_vec()).collect());
    let lattice_basis = lattice::saturate(&family);
    let rho = lattice_basis.rows();

    // Coordinates of every generator in the saturated span lattice. The
    // generators are integer points of their own span, so the solutions
    // are integral.
    let gram = Matrix::from_integer(&lattice_basis.mul(&lattice_basis.transpose()));
    let coords: Vec<Vector> = members
        .iter()
        .map(|m| {
            let rhs: Vec<Rational> = lattice_basis
                .mul_vector(m.coords())
                .into_iter()
                .map(Rational::from_integer)
                .collect();
            let solution = match linear::solve(&gram, &rhs) {
                Some(x) => x,
                None => panic!("invariant violated: gram matrix of a lattice basis is singular"),
            };
            let ints: Vec<Integer> = solution
                .into_iter()
                .map(|v| {
                    if v.denominator() != &Integer::one() {
                        panic!(
                            "invariant violated: generator {:?} is not an integer point of its span lattice",
                            m
                        );
                    }
                    v.numerator().clone()
                })
                .collect();
            Vector::from_coords(ints)
        })
        .collect();

    let (hyperplanes, triangulation) = dual_sweep(&coords, rho, cancel)?;

    let normals =
        Matrix::from_rows(hyperplanes.iter().map(|r| r.vector().coords().to_vec()).collect());
    if linear::rank(&normals) < rho {
        return Err(ConeError::UnsolvedCase);
    }
    stats.simplices += triangulation.len();

    let mut candidates: Vec<Vector> = coords.clone();
    let coords_ref = &coords;
    let tasks: Vec<_> = triangulation
        .iter()
        .map(|cell| {
            move |token: &CancelToken| -> Result<Vec<Vector>> {
                parallelepiped_points(coords_ref, cell, token)
            }
        })
        .collect();
    for mut block in pool.run(tasks, cancel)? {
        candidates.append(&mut block);
    }
    candidates.sort();
    candidates.dedup();
    stats.candidates += candidates.len();

    let reduced = reduce_candidates(candidates, &hyperplanes);

    let back = lattice_basis.transpose();
    Ok(reduced
        .into_iter()
        .map(|x| Vector::from_coords(back.mul_vector(x.coords())))
        .collect())
}

/// Support hyperplanes and a placing triangulation of the full-rank cone
/// generated by `points` in dimension `rho`.
///
/// The hyperplanes are the extreme rays of the dual cone, computed by
/// the double description step with the generators as constraint rows.
/// Mask bit `i` of a hyperplane marks tightness on generator `i`. The
/// triangulation starts from a greedy independent subset and grows over
/// the facets visible from each later generator.
fn dual_sweep(
    points: &[Vector],
    rho: usize,
    cancel: &CancelToken,
) -> Result<(Vec<Ray>, Vec<Vec<usize>>)> {
    let mut ech = linear::Echelon::new(rho);
    let mut simplex: Vec<usize> = Vec::with_capacity(rho);
    for (i, p) in points.iter().enumerate() {
        let row: Vec<Rational> =
            p.coords().iter().cloned().map(Rational::from_integer).collect();
        if ech.insert(&row) {
            simplex.push(i);
            if simplex.len() == rho {
                break;
            }
        }
    }
    if simplex.len() < rho {
        panic!("invariant violated: generators do not span their saturated lattice");
    }

    let g0 = Matrix::from_rows(simplex.iter().map(|&i| points[i].coords().to_vec()).collect());
    let inverse = match linear::invert(&Matrix::from_integer(&g0)) {
        Some(inv) => inv,
        None => panic!("invariant violated: greedy independent subset is singular"),
    };

    let universe = points.len();
    let mut rays: Vec<Ray> = Vec::with_capacity(rho);
    for j in 0..rho {
        let column: Vec<Rational> = (0..rho).map(|i| inverse.get(i, j).clone()).collect();
        let normal = Vector::from_coords(linear::primitive_integer_row(&column));
        let mut faces = Bitmask::new(universe);
        for &s in &simplex {
            faces.set(s);
        }
        faces.clear(simplex[j]);
        rays.push(Ray::from_parts(normal, faces));
    }
    let mut triangulation: Vec<Vec<usize>> = vec![simplex.clone()];
    let mut in_simplex = vec![false; universe];
    for &s in &simplex {
        in_simplex[s] = true;
    }

    for (j, point) in points.iter().enumerate() {
        if in_simplex[j] {
            continue;
        }
        if cancel.is_armed() {
            return Err(ConeError::Cancelled);
        }
        let row = point.coords();
        for ray in rays.iter_mut() {
            ray.evaluate(row);
        }
        let mut pos = Vec::new();
        let mut neg = Vec::new();
        for (i, ray) in rays.iter().enumerate() {
            match ray.sign() {
                s if s > 0 => pos.push(i),
                s if s < 0 => neg.push(i),
                _ => {}
            }
        }

        // Every facet the new generator sees is pyramided over it: the
        // cells meeting the facet in rho - 1 generators each spawn one
        // new cell.
        let mut grown: Vec<Vec<usize>> = Vec::new();
        for &n in &neg {
            let facet = rays[n].faces();
            for cell in &triangulation {
                let mut shared: Vec<usize> =
                    cell.iter().copied().filter(|&v| facet.get(v)).collect();
                if shared.len() + 1 == rho {
                    shared.push(j);
                    grown.push(shared);
                }
            }
        }
        triangulation.append(&mut grown);

        let mut fresh: Vec<Ray> = Vec::new();
        for &p in &pos {
            for &n in &neg {
                if cancel.is_armed() {
                    return Err(ConeError::Cancelled);
                }
                if adjacent(&rays, p, n, rho) {
                    fresh.push(Ray::pivot_unoriented(&rays[p], &rays[n], j));
                }
            }
        }
        let old = std::mem::take(&mut rays);
        for mut ray in old {
            match ray.sign() {
                0 => {
                    ray.mark_tight(j);
                    rays.push(ray);
                }
                s if s > 0 => rays.push(ray),
                _ => {}
            }
        }
        rays.append(&mut fresh);
    }
    Ok((rays, triangulation))
}

/// The non-zero integer points of the fundamental parallelepiped of one
/// simplicial subcone.
///
/// Residue tuples of the quotient lattice are driven by an odometer
/// bounded by the Hermite diagonal of the generator matrix; each tuple
/// is lifted into the half-open parallelepiped by subtracting the
/// floored generator coordinates.
fn parallelepiped_points(
    points: &[Vector],
    cell: &[usize],
    token: &CancelToken,
) -> Result<Vec<Vector>> {
    let rho = cell.len();
    let mut gmat = Matrix::zeros(rho, rho);
    for (j, &v) in cell.iter().enumerate() {
        for i in 0..rho {
            *gmat.get_mut(i, j) = points[v].get(i).clone();
        }
    }
    let diagonal = match lattice::hnf_diagonal(&gmat) {
        Some(d) => d,
        None => panic!("invariant violated: triangulation cell is not simplicial"),
    };
    let inverse = match linear::invert(&Matrix::from_integer(&gmat)) {
        Some(inv) => inv,
        None => panic!("invariant violated: triangulation cell is not simplicial"),
    };

    let mut out = Vec::new();
    let mut residue = vec![Integer::zero(); rho];
    loop {
        if token.is_armed() {
            return Err(ConeError::Cancelled);
        }
        if residue.iter().any(|c| !c.is_zero()) {
            out.push(lift_residue(&gmat, &inverse, &residue));
        }
        let mut k = 0;
        loop {
            if k == rho {
                return Ok(out);
            }
            residue[k] = &residue[k] + &Integer::one();
            if residue[k] < diagonal[k] {
                break;
            }
            residue[k] = Integer::zero();
            k += 1;
        }
    }
}

fn lift_residue(
    gmat: &Matrix<Integer>,
    inverse: &Matrix<Rational>,
    residue: &[Integer],
) -> Vector {
    let rho = residue.len();
    let floors: Vec<Integer> = (0..rho)
        .map(|i| {
            let mut acc = Rational::zero();
            for (j, r) in residue.iter().enumerate() {
                if !r.is_zero() {
                    let term = inverse.get(i, j) * &Rational::from_integer(r.clone());
                    acc = &acc + &term;
                }
            }
            acc.floor()
        })
        .collect();
    let shift = gmat.mul_vector(&floors);
    let coords: Vec<Integer> =
        residue.iter().zip(shift.iter()).map(|(r, s)| r - s).collect();
    Vector::from_coords(coords)
}

/// Keep exactly the candidates that are not a sum of two non-zero
/// integer points of the cone.
///
/// A candidate is redundant iff an already kept one subtracts from it
/// without leaving the cone, which holds iff its value is at least the
/// kept one's on every support hyperplane. Candidates are processed in
/// increasing order of total hyperplane value, so reducers always come
/// first; the tight-set subset test prunes most comparisons.
fn reduce_candidates(candidates: Vec<Vector>, hyperplanes: &[Ray]) -> Vec<Vector> {
    let h = hyperplanes.len();
    let mut scored: Vec<(Vec<Integer>, Bitmask, Integer, Vector)> = candidates
        .into_iter()
        .map(|v| {
            let values: Vec<Integer> =
                hyperplanes.iter().map(|l| v.inner(l.vector().coords())).collect();
            let mut tight = Bitmask::new(h);
            let mut total = Integer::zero();
            for (i, value) in values.iter().enumerate() {
                if value.is_zero() {
                    tight.set(i);
                } else {
                    total = &total + value;
                }
            }
            (values, tight, total, v)
        })
        .collect();
    scored.sort_by(|a, b| a.2.cmp(&b.2).then_with(|| a.3.cmp(&b.3)));

    let mut kept: Vec<(Vec<Integer>, Bitmask, Vector)> = Vec::new();
    'candidates: for (values, tight, _, v) in scored {
        for (kept_values, kept_tight, _) in kept.iter() {
            if !tight.is_subset_of(kept_tight) {
                continue;
            }
            if kept_values.iter().zip(values.iter()).all(|(a, b)| a <= b) {
                continue 'candidates;
            }
        }
        kept.push((values, tight, v));
    }
    kept.into_iter().map(|(_, _, v)| v).collect()
}

/// Maximal sets of generators whose supports can jointly appear in an
/// admissible vector. For at-most-one constraints joint admissibility is
/// pairwise, so these are the maximal cliques of the compatibility
/// graph.
fn maximal_compatible_sets(gens: &[&Vector], masks: &[Bitmask]) -> Vec<Vec<usize>> {
    let n = gens.len();
    let mut compatible = vec![vec![false; n]; n];
    for i in 0..n {
        for j in i..n {
            let ok = if i == j {
                validity::is_admissible(masks, gens[i].support())
            } else {
                let mut union = gens[i].support().clone();
                union.or_assign(gens[j].support());
                validity::is_admissible(masks, &union)
            };
            compatible[i][j] = ok;
            compatible[j][i] = ok;
        }
    }

    let vertices: Vec<usize> = (0..n).filter(|&i| compatible[i][i]).collect();
    let mut out = Vec::new();
    let mut clique = Vec::new();
    grow_cliques(&compatible, &mut clique, vertices, Vec::new(), &mut out);
    out
}

fn grow_cliques(
    compatible: &[Vec<bool>],
    clique: &mut Vec<usize>,
    mut candidates: Vec<usize>,
    mut excluded: Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if candidates.is_empty() && excluded.is_empty() {
        out.push(clique.clone());
        return;
    }
    while !candidates.is_empty() {
        let v = candidates.remove(0);
        let next_candidates: Vec<usize> =
            candidates.iter().copied().filter(|&u| compatible[v][u]).collect();
        let next_excluded: Vec<usize> =
            excluded.iter().copied().filter(|&u| compatible[v][u]).collect();
        clique.push(v);
        grow_cliques(compatible, clique, next_candidates, next_excluded, out);
        clique.pop();
        excluded.push(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec_of(vals: &[i64]) -> Vector {
        Vector::from_coords(vals.iter().map(|&v| Integer::from(v)).collect())
    }

    fn gens(rows: &[&[i64]]) -> Vec<Vector> {
        rows.iter().map(|r| vec_of(r)).collect()
    }

    fn coords(v: &Vector) -> Vec<i64> {
        v.coords().iter().map(|c| c.to_i64().unwrap()).collect()
    }

    fn basis_of(generators: &[Vector], dim: usize) -> Vec<Vec<i64>> {
        let (basis, _) = HilbertEnumerator::new().enumerate(generators, dim).unwrap();
        basis.iter().map(coords).collect()
    }

    #[test]
    fn test_doubled_axes_reduce_to_units() {
        let g = gens(&[&[2, 0], &[0, 2]]);
        assert_eq!(basis_of(&g, 2), vec![vec![0, 1], vec![1, 0]]);
    }

    #[test]
    fn test_unit_simplex_is_its_own_basis() {
        let g = gens(&[&[1, 0, 0], &[0, 1, 0], &[0, 0, 1]]);
        assert_eq!(
            basis_of(&g, 3),
            vec![vec![0, 0, 1], vec![0, 1, 0], vec![1, 0, 0]]
        );
    }

    #[test]
    fn test_scaled_simplex_candidates_cover_parallelepiped() {
        let g = gens(&[&[2, 0, 0], &[0, 2, 0], &[0, 0, 2]]);
        let (basis, stats) = HilbertEnumerator::new().enumerate(&g, 3).unwrap();
        assert_eq!(
            basis.iter().map(coords).collect::<Vec<_>>(),
            vec![vec![0, 0, 1], vec![0, 1, 0], vec![1, 0, 0]]
        );
        // Three generators plus the seven non-zero 0/1 parallelepiped points.
        assert_eq!(stats.candidates, 10);
        assert_eq!(stats.simplices, 1);
    }

    #[test]
    fn test_slanted_cone_needs_interior_point() {
        let g = gens(&[&[1, 0, 0], &[0, 1, 0], &[1, 1, 2]]);
        assert_eq!(
            basis_of(&g, 3),
            vec![vec![0, 1, 0], vec![1, 0, 0], vec![1, 1, 1], vec![1, 1, 2]]
        );
    }

    #[test]
    fn test_square_cone_keeps_all_height_one_points() {
        let g = gens(&[&[1, 1, 1], &[-1, 1, 1], &[-1, -1, 1], &[1, -1, 1]]);
        let (basis, stats) = HilbertEnumerator::new().enumerate(&g, 3).unwrap();
        let expected: Vec<Vec<i64>> = vec![
            vec![-1, -1, 1],
            vec![-1, 0, 1],
            vec![-1, 1, 1],
            vec![0, -1, 1],
            vec![0, 0, 1],
            vec![0, 1, 1],
            vec![1, -1, 1],
            vec![1, 0, 1],
            vec![1, 1, 1],
        ];
        assert_eq!(basis.iter().map(coords).collect::<Vec<_>>(), expected);
        assert_eq!(stats.faces, 1);
        assert_eq!(stats.simplices, 2);
        assert_eq!(stats.basis_size, 9);
    }

    #[test]
    fn test_lower_dimensional_span() {
        let g = gens(&[&[1, 1, 1]]);
        assert_eq!(basis_of(&g, 3), vec![vec![1, 1, 1]]);

        // The saturation sees through a scaled generator.
        let doubled = gens(&[&[2, 2, 2]]);
        assert_eq!(basis_of(&doubled, 3), vec![vec![1, 1, 1]]);
    }

    #[test]
    fn test_line_is_unsolved() {
        let g = gens(&[&[1, 0], &[-1, 0], &[0, 1]]);
        let err = HilbertEnumerator::new().enumerate(&g, 2).unwrap_err();
        assert_eq!(err, ConeError::UnsolvedCase);
    }

    #[test]
    fn test_empty_and_zero_generators() {
        let (basis, stats) = HilbertEnumerator::new().enumerate(&[], 2).unwrap();
        assert!(basis.is_empty());
        assert_eq!(stats.faces, 0);

        let zeros = gens(&[&[0, 0]]);
        let (basis, _) = HilbertEnumerator::new().enumerate(&zeros, 2).unwrap();
        assert!(basis.is_empty());
    }

    #[test]
    fn test_input_validation() {
        let g = gens(&[&[1, 0]]);
        let e = HilbertEnumerator::new().enumerate(&g, 0);
        assert_eq!(e.unwrap_err(), ConeError::ZeroDimension);

        let e = HilbertEnumerator::new().enumerate(&g, 3);
        assert_eq!(e.unwrap_err(), ConeError::ShapeMismatch { rows: 1, cols: 2, dim: 3 });
    }

    #[test]
    fn test_validity_splits_the_cone() {
        // At most one of the two coordinates may be non-zero, so the
        // admissible region is the pair of axes.
        let g = gens(&[&[1, 0], &[0, 1], &[1, 1]]);
        let mut validity = ValidityConstraints::new(2, 1);
        validity.add_local([0, 1]);
        let config = HilbertConfig { validity, ..Default::default() };
        let (basis, stats) =
            HilbertEnumerator::with_config(config).enumerate(&g, 2).unwrap();
        assert_eq!(basis.iter().map(coords).collect::<Vec<_>>(), vec![vec![0, 1], vec![1, 0]]);
        assert_eq!(stats.faces, 2);
    }

    #[test]
    fn test_pre_armed_token_cancels() {
        let cancel = CancelToken::new();
        cancel.arm();
        let config = HilbertConfig { cancel, ..Default::default() };
        let g = gens(&[&[1, 0], &[0, 1]]);
        let err = HilbertEnumerator::with_config(config).enumerate(&g, 2).unwrap_err();
        assert_eq!(err, ConeError::Cancelled);
    }

    #[test]
    fn test_composes_with_vertex_enumeration() {
        use crate::enumerate::dd::{ConstraintSign, VertexEnumerator};

        let matrix = Matrix::from_flat(
            [1, -1, 0, 0, 1, -1].iter().map(|&v| Integer::from(v)).collect(),
            2,
            3,
        );
        let signs = [ConstraintSign::Equality, ConstraintSign::Equality];
        let (rays, _) = VertexEnumerator::new().enumerate(&matrix, &signs, 3).unwrap();
        let generators: Vec<Vector> = rays.into_iter().map(|r| r.into_vector()).collect();
        assert_eq!(basis_of(&generators, 3), vec![vec![1, 1, 1]]);
    }
}
