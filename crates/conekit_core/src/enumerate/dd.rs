//! Double description enumeration of extreme rays
//!
//! The enumerator intersects the non-negative orthant with the rows of a
//! constraint matrix, one row at a time. Each row splits the current ray
//! list by the exact sign of the inner product; adjacent positive and
//! negative rays are combined into rays on the new hyperplane, and the
//! survivors depend on whether the row is an equality or an inequality.
//! The candidate pair space of each row is fanned out over the worker
//! pool; the main thread owns the ray list and merges at the row barrier.

use std::time::Instant;

use crate::enumerate::adjacency::adjacent;
use crate::enumerate::ray::Ray;
use crate::enumerate::validity::{self, ValidityConstraints};
use crate::error::{ConeError, Result};
use crate::maths::{Integer, Matrix};
use crate::pool::{CancelToken, WorkPool};

/// Row tag: hyperplane or halfspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSign {
    /// The row must evaluate to exactly zero.
    Equality,
    /// The row must evaluate to zero or more.
    GreaterEqual,
}

/// Configuration for a vertex enumeration run.
#[derive(Debug, Clone, Default)]
pub struct EnumerationConfig {
    /// Worker threads for the pivot phase; `0` means one per hardware
    /// thread.
    pub parallelism: usize,
    /// Fail with [`ConeError::Infeasible`] as soon as the surviving ray
    /// set becomes empty.
    pub feasibility_check: bool,
    /// Sort the output lexicographically by coordinates.
    pub canonicalise_output: bool,
    /// Support constraints; rays violating them are dropped at birth.
    pub validity: ValidityConstraints,
    /// Cancellation handle, polled at every row and every candidate pair.
    pub cancel: CancelToken,
}

/// Counters and timing from one enumeration run.
#[derive(Debug, Clone, Default)]
pub struct EnumerationStats {
    /// Constraint rows consumed.
    pub rows_processed: usize,
    /// Largest ray list seen at any row barrier.
    pub peak_rays: usize,
    /// Positive-negative pairs examined.
    pub pivots_considered: u64,
    /// Pairs that survived the adjacency and validity tests.
    pub pivots_admitted: u64,
    /// Rays in the final list.
    pub final_rays: usize,
    /// Wall-clock time for the whole run, in microseconds.
    pub time_us: u128,
}

/// Double description enumerator for `{x >= 0 : A x = 0 or A x >= 0}`,
/// one sign tag per row of `A`.
pub struct VertexEnumerator {
    config: EnumerationConfig,
}

impl VertexEnumerator {
    pub fn new() -> Self {
        Self::with_config(EnumerationConfig::default())
    }

    pub fn with_config(config: EnumerationConfig) -> Self {
        Self { config }
    }

    /// Enumerate the primitive extreme rays of the cone cut out of the
    /// non-negative orthant of dimension `dim` by the rows of `matrix`.
    ///
    /// Face-mask bits `0..dim` are the orthant facets; bit `dim + i` is
    /// row `i`. Every returned ray is primitive and its mask holds
    /// exactly the constraints that evaluate to zero on it.
    pub fn enumerate(
        &self,
        matrix: &Matrix<Integer>,
        signs: &[ConstraintSign],
        dim: usize,
    ) -> Result<(Vec<Ray>, EnumerationStats)> {
        if dim == 0 {
            return Err(ConeError::ZeroDimension);
        }
        let (rows, cols) = matrix.dims();
        if rows > 0 && cols != dim {
            return Err(ConeError::ShapeMismatch { rows, cols, dim });
        }
        if signs.len() != rows {
            return Err(ConeError::SignCountMismatch { signs: signs.len(), rows });
        }

        let start = Instant::now();
        let universe = dim + rows;
        let validity_masks = if self.config.validity.is_none() {
            Vec::new()
        } else {
            self.config.validity.bitmasks(dim)
        };
        let pool = WorkPool::new(self.config.parallelism);
        let cancel = &self.config.cancel;

        let mut stats = EnumerationStats::default();
        let mut rays: Vec<Ray> = (0..dim).map(|a| Ray::axis(a, dim, universe)).collect();
        stats.peak_rays = rays.len();

        for (row_idx, sign) in signs.iter().enumerate() {
            if cancel.is_armed() {
                return Err(ConeError::Cancelled);
            }
            let row = matrix.row(row_idx);
            let tight_bit = dim + row_idx;

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

            let total_pairs = pos.len() * neg.len();
            stats.pivots_considered += total_pairs as u64;

            let mut fresh: Vec<Ray> = Vec::new();
            if total_pairs > 0 {
                let workers = pool.workers().min(total_pairs);
                let chunk = (total_pairs + workers - 1) / workers;
                let rays_ref = &rays;
                let masks_ref = &validity_masks;
                let pos_ref = &pos;
                let neg_ref = &neg;

                let mut tasks = Vec::with_capacity(workers);
                for t in 0..workers {
                    let lo = t * chunk;
                    let hi = ((t + 1) * chunk).min(total_pairs);
                    if lo >= hi {
                        continue;
                    }
                    tasks.push(move |token: &CancelToken| -> Result<Vec<Ray>> {
                        let mut local = Vec::new();
                        for k in lo..hi {
                            if token.is_armed() {
                                return Err(ConeError::Cancelled);
                            }
                            let p = pos_ref[k / neg_ref.len()];
                            let n = neg_ref[k % neg_ref.len()];
                            if !adjacent(rays_ref, p, n, dim) {
                                continue;
                            }
                            let ray = Ray::pivot(&rays_ref[p], &rays_ref[n], tight_bit);
                            if !masks_ref.is_empty()
                                && !validity::is_admissible(masks_ref, ray.vector().support())
                            {
                                continue;
                            }
                            local.push(ray);
                        }
                        Ok(local)
                    });
                }
                for mut block in pool.run(tasks, cancel)? {
                    fresh.append(&mut block);
                }
            }
            stats.pivots_admitted += fresh.len() as u64;

            // Zero rays always survive and gain the new tight bit; the
            // positive side survives inequalities only.
            let keep_positive = matches!(sign, ConstraintSign::GreaterEqual);
            let old = std::mem::take(&mut rays);
            for mut ray in old {
                match ray.sign() {
                    0 => {
                        ray.mark_tight(tight_bit);
                        rays.push(ray);
                    }
                    s if s > 0 && keep_positive => rays.push(ray),
                    _ => {}
                }
            }
            rays.append(&mut fresh);

            for ray in rays.iter() {
                if ray.faces().count_ones() + 1 < dim {
                    panic!(
                        "invariant violated: ray {:?} is tight on fewer than {} constraints",
                        ray.vector(),
                        dim - 1
                    );
                }
            }

            stats.rows_processed += 1;
            stats.peak_rays = stats.peak_rays.max(rays.len());

            if rays.is_empty() && self.config.feasibility_check {
                return Err(ConeError::Infeasible);
            }
        }

        if self.config.canonicalise_output {
            rays.sort_by(|a, b| a.vector().cmp(b.vector()));
        }

        stats.final_rays = rays.len();
        stats.time_us = start.elapsed().as_micros();
        Ok((rays, stats))
    }
}

impl Default for VertexEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_matrix(rows: usize, cols: usize, vals: &[i64]) -> Matrix<Integer> {
        Matrix::from_flat(vals.iter().map(|&v| Integer::from(v)).collect(), rows, cols)
    }

    fn coords(ray: &Ray) -> Vec<i64> {
        ray.vector().coords().iter().map(|c| c.to_i64().unwrap()).collect()
    }

    fn enumerate_canonical(
        matrix: &Matrix<Integer>,
        signs: &[ConstraintSign],
        dim: usize,
    ) -> Vec<Vec<i64>> {
        let config = EnumerationConfig { canonicalise_output: true, ..Default::default() };
        let (rays, _) =
            VertexEnumerator::with_config(config).enumerate(matrix, signs, dim).unwrap();
        rays.iter().map(coords).collect()
    }

    fn verify_output(
        matrix: &Matrix<Integer>,
        signs: &[ConstraintSign],
        dim: usize,
        rays: &[Ray],
    ) {
        for ray in rays {
            let mut g = Integer::zero();
            for c in ray.vector().coords() {
                if !c.is_zero() {
                    g = g.gcd(c);
                }
            }
            assert_eq!(g, Integer::one(), "ray {:?} is not primitive", ray.vector());

            for j in 0..dim {
                assert!(ray.vector().get(j).sign() >= 0);
                assert_eq!(ray.faces().get(j), ray.vector().get(j).is_zero());
            }
            for (i, sign) in signs.iter().enumerate() {
                let value = ray.vector().inner(matrix.row(i));
                match sign {
                    ConstraintSign::Equality => assert!(value.is_zero()),
                    ConstraintSign::GreaterEqual => assert!(value.sign() >= 0),
                }
                assert_eq!(ray.faces().get(dim + i), value.is_zero());
            }
        }
    }

    #[test]
    fn test_no_constraints_returns_axes() {
        let matrix = Matrix::zeros(0, 0);
        let out = enumerate_canonical(&matrix, &[], 3);
        assert_eq!(out, vec![vec![0, 0, 1], vec![0, 1, 0], vec![1, 0, 0]]);
    }

    #[test]
    fn test_sum_equality_empties_the_orthant() {
        let matrix = int_matrix(1, 3, &[1, 1, 1]);
        let out = enumerate_canonical(&matrix, &[ConstraintSign::Equality], 3);
        assert!(out.is_empty());

        let config = EnumerationConfig { feasibility_check: true, ..Default::default() };
        let err = VertexEnumerator::with_config(config)
            .enumerate(&matrix, &[ConstraintSign::Equality], 3)
            .unwrap_err();
        assert_eq!(err, ConeError::Infeasible);
    }

    #[test]
    fn test_two_equalities_single_ray() {
        let matrix = int_matrix(2, 3, &[1, -1, 0, 0, 1, -1]);
        let signs = [ConstraintSign::Equality, ConstraintSign::Equality];
        let (rays, _) = VertexEnumerator::new().enumerate(&matrix, &signs, 3).unwrap();
        assert_eq!(rays.len(), 1);
        assert_eq!(coords(&rays[0]), vec![1, 1, 1]);
        // No coordinate vanishes, both rows are tight.
        assert_eq!(rays[0].faces().ones().collect::<Vec<_>>(), vec![3, 4]);
        verify_output(&matrix, &signs, 3, &rays);
    }

    #[test]
    fn test_sum_inequality_keeps_axes() {
        let matrix = int_matrix(1, 4, &[1, 1, 1, 1]);
        let out = enumerate_canonical(&matrix, &[ConstraintSign::GreaterEqual], 4);
        assert_eq!(
            out,
            vec![
                vec![0, 0, 0, 1],
                vec![0, 0, 1, 0],
                vec![0, 1, 0, 0],
                vec![1, 0, 0, 0],
            ]
        );
    }

    #[test]
    fn test_halfspace_splits_quadrant() {
        let matrix = int_matrix(1, 2, &[1, -1]);
        let signs = [ConstraintSign::GreaterEqual];
        let config = EnumerationConfig { canonicalise_output: true, ..Default::default() };
        let (rays, stats) =
            VertexEnumerator::with_config(config).enumerate(&matrix, &signs, 2).unwrap();
        assert_eq!(rays.iter().map(coords).collect::<Vec<_>>(), vec![vec![1, 0], vec![1, 1]]);
        verify_output(&matrix, &signs, 2, &rays);

        assert_eq!(stats.rows_processed, 1);
        assert_eq!(stats.pivots_considered, 1);
        assert_eq!(stats.pivots_admitted, 1);
        assert_eq!(stats.peak_rays, 2);
        assert_eq!(stats.final_rays, 2);
    }

    #[test]
    fn test_dimension_one() {
        let empty = Matrix::zeros(0, 0);
        assert_eq!(enumerate_canonical(&empty, &[], 1), vec![vec![1]]);

        let pin = int_matrix(1, 1, &[1]);
        assert!(enumerate_canonical(&pin, &[ConstraintSign::Equality], 1).is_empty());

        let config = EnumerationConfig { feasibility_check: true, ..Default::default() };
        let err = VertexEnumerator::with_config(config)
            .enumerate(&pin, &[ConstraintSign::Equality], 1)
            .unwrap_err();
        assert_eq!(err, ConeError::Infeasible);
    }

    #[test]
    fn test_zero_rows_change_nothing() {
        let matrix = int_matrix(2, 3, &[0, 0, 0, 0, 0, 0]);
        let signs = [ConstraintSign::Equality, ConstraintSign::GreaterEqual];
        let (rays, _) = VertexEnumerator::new().enumerate(&matrix, &signs, 3).unwrap();
        assert_eq!(rays.len(), 3);
        // A zero row is tight on everything, so the masks pick it up.
        for ray in &rays {
            assert!(ray.faces().get(3));
            assert!(ray.faces().get(4));
        }
        verify_output(&matrix, &signs, 3, &rays);
    }

    #[test]
    fn test_equality_drops_strictly_positive_rays() {
        let matrix = int_matrix(1, 2, &[1, 0]);
        let eq = enumerate_canonical(&matrix, &[ConstraintSign::Equality], 2);
        assert_eq!(eq, vec![vec![0, 1]]);
        let ge = enumerate_canonical(&matrix, &[ConstraintSign::GreaterEqual], 2);
        assert_eq!(ge, vec![vec![0, 1], vec![1, 0]]);
    }

    #[test]
    fn test_input_validation() {
        let matrix = int_matrix(1, 3, &[1, 1, 1]);
        let e = VertexEnumerator::new().enumerate(&matrix, &[ConstraintSign::Equality], 0);
        assert_eq!(e.unwrap_err(), ConeError::ZeroDimension);

        let e = VertexEnumerator::new().enumerate(&matrix, &[ConstraintSign::Equality], 4);
        assert_eq!(e.unwrap_err(), ConeError::ShapeMismatch { rows: 1, cols: 3, dim: 4 });

        let e = VertexEnumerator::new().enumerate(&matrix, &[], 3);
        assert_eq!(e.unwrap_err(), ConeError::SignCountMismatch { signs: 0, rows: 1 });
    }

    #[test]
    fn test_validity_constraints_drop_mixed_support() {
        let matrix = int_matrix(1, 3, &[1, -1, 0]);
        let signs = [ConstraintSign::GreaterEqual];

        let unconstrained = enumerate_canonical(&matrix, &signs, 3);
        assert_eq!(unconstrained, vec![vec![0, 0, 1], vec![1, 0, 0], vec![1, 1, 0]]);

        // At most one of the first two coordinates may be non-zero.
        let mut validity = ValidityConstraints::new(2, 1);
        validity.add_local([0, 1]);
        let config = EnumerationConfig {
            canonicalise_output: true,
            validity,
            ..Default::default()
        };
        let (rays, _) =
            VertexEnumerator::with_config(config).enumerate(&matrix, &signs, 3).unwrap();
        assert_eq!(rays.iter().map(coords).collect::<Vec<_>>(), vec![vec![0, 0, 1], vec![1, 0, 0]]);
    }

    #[test]
    fn test_pre_armed_token_cancels() {
        let cancel = CancelToken::new();
        cancel.arm();
        let config = EnumerationConfig { cancel, ..Default::default() };
        let matrix = int_matrix(1, 2, &[1, -1]);
        let err = VertexEnumerator::with_config(config)
            .enumerate(&matrix, &[ConstraintSign::GreaterEqual], 2)
            .unwrap_err();
        assert_eq!(err, ConeError::Cancelled);
    }

    #[test]
    fn test_same_input_same_output() {
        let matrix = int_matrix(2, 4, &[1, -1, 0, 0, 1, 1, -1, -1]);
        let signs = [ConstraintSign::GreaterEqual, ConstraintSign::GreaterEqual];
        let run = || {
            let config = EnumerationConfig { parallelism: 4, ..Default::default() };
            let (mut rays, _) =
                VertexEnumerator::with_config(config).enumerate(&matrix, &signs, 4).unwrap();
            rays.sort_by(|a, b| a.vector().cmp(b.vector()));
            rays
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_random_cones_satisfy_invariants() {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let dim = rng.gen_range(2..5);
            let rows = rng.gen_range(1..4);
            let vals: Vec<i64> = (0..dim * rows).map(|_| rng.gen_range(-3..=3)).collect();
            let signs: Vec<ConstraintSign> = (0..rows)
                .map(|_| {
                    if rng.gen_bool(0.3) {
                        ConstraintSign::Equality
                    } else {
                        ConstraintSign::GreaterEqual
                    }
                })
                .collect();
            let matrix = int_matrix(rows, dim, &vals);
            let (rays, _) = VertexEnumerator::new().enumerate(&matrix, &signs, dim).unwrap();
            verify_output(&matrix, &signs, dim, &rays);
        }
    }
}
