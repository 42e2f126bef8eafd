//! Integer lattice utilities
//!
//! Column reduction of integer matrices under unimodular column
//! operations. This yields the integer kernel of a matrix, the
//! saturation of the lattice spanned by a family of vectors, and the
//! Hermite diagonal used to enumerate fundamental-domain residues.

use super::{Integer, Matrix};

/// Extended gcd: returns `(g, x, y)` with `a*x + b*y = g` and `g >= 0`.
pub fn ext_gcd(a: &Integer, b: &Integer) -> (Integer, Integer, Integer) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (Integer::one(), Integer::zero());
    let (mut old_t, mut t) = (Integer::zero(), Integer::one());

    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &(&q * &r);
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &(&q * &s);
        old_s = std::mem::replace(&mut s, next_s);
        let next_t = &old_t - &(&q * &t);
        old_t = std::mem::replace(&mut t, next_t);
    }

    if old_r.sign() < 0 {
        old_r.negate();
        old_s.negate();
        old_t.negate();
    }
    (old_r, old_s, old_t)
}

struct ColumnEchelon {
    work: Matrix<Integer>,
    trans: Matrix<Integer>,
    /// (row, column) of each pivot, rows increasing.
    pivots: Vec<(usize, usize)>,
    pivot_col: Vec<bool>,
}

/// Reduce `a` to column echelon form by unimodular column operations,
/// tracking the transform so that `work = a * trans` throughout.
fn column_echelon(a: &Matrix<Integer>) -> ColumnEchelon {
    let (rows, cols) = a.dims();
    let mut work = a.clone();
    let mut trans = Matrix::identity(cols);
    let mut pivots = Vec::new();
    let mut pivot_col = vec![false; cols];

    for row in 0..rows {
        let p = match (0..cols).find(|&j| !pivot_col[j] && !work.get(row, j).is_zero()) {
            Some(p) => p,
            None => continue,
        };

        for j in 0..cols {
            if j == p || pivot_col[j] || work.get(row, j).is_zero() {
                continue;
            }
            let a_val = work.get(row, p).clone();
            let b_val = work.get(row, j).clone();
            let (g, x, y) = ext_gcd(&a_val, &b_val);
            let u = &a_val / &g;
            let v = &b_val / &g;

            // col_p <- x*col_p + y*col_j ; col_j <- u*col_j - v*col_p.
            // The operation matrix has determinant (a*x + b*y)/g = 1.
            combine_columns(&mut work, p, j, &x, &y, &u, &v);
            combine_columns(&mut trans, p, j, &x, &y, &u, &v);
        }

        if work.get(row, p).sign() < 0 {
            negate_column(&mut work, p);
            negate_column(&mut trans, p);
        }
        pivot_col[p] = true;
        pivots.push((row, p));
    }

    ColumnEchelon { work, trans, pivots, pivot_col }
}

fn combine_columns(
    m: &mut Matrix<Integer>,
    p: usize,
    j: usize,
    x: &Integer,
    y: &Integer,
    u: &Integer,
    v: &Integer,
) {
    for i in 0..m.rows() {
        let mp = m.get(i, p).clone();
        let mj = m.get(i, j).clone();
        if mp.is_zero() && mj.is_zero() {
            continue;
        }
        *m.get_mut(i, p) = &(x * &mp) + &(y * &mj);
        *m.get_mut(i, j) = &(u * &mj) - &(v * &mp);
    }
}

fn negate_column(m: &mut Matrix<Integer>, j: usize) {
    for i in 0..m.rows() {
        m.get_mut(i, j).negate();
    }
}

/// Basis of the integer kernel `{x : a * x = 0}`, one basis vector per
/// row of the result. The kernel lattice is saturated by construction.
pub fn integer_kernel(a: &Matrix<Integer>) -> Matrix<Integer> {
    let cols = a.cols();
    let ech = column_echelon(a);
    let free: Vec<usize> = (0..cols).filter(|&j| !ech.pivot_col[j]).collect();

    let mut basis = Matrix::zeros(free.len(), cols);
    for (k, &j) in free.iter().enumerate() {
        for i in 0..cols {
            *basis.get_mut(k, i) = ech.trans.get(i, j).clone();
        }
    }
    basis
}

/// Basis of the saturation of the lattice spanned by the rows of
/// `vectors`: all integer points of their rational span. One basis
/// vector per row of the result.
pub fn saturate(vectors: &Matrix<Integer>) -> Matrix<Integer> {
    integer_kernel(&integer_kernel(vectors))
}

/// Diagonal of a column Hermite form of a square matrix: positive
/// entries whose product is `|det|`. `None` when the matrix is singular.
///
/// Entry `k` bounds coordinate `k` of the canonical residue tuples of
/// the quotient lattice, so the fundamental domain is enumerated by
/// nested loops `0 <= x_k < diag[k]`.
pub fn hnf_diagonal(g: &Matrix<Integer>) -> Option<Vec<Integer>> {
    let n = g.rows();
    assert_eq!(g.cols(), n, "hermite diagonal requires a square matrix");
    let ech = column_echelon(g);
    if ech.pivots.len() < n {
        return None;
    }
    Some(ech.pivots.iter().map(|&(row, col)| ech.work.get(row, col).clone()).collect())
}
