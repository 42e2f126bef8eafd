//! Exact linear algebra over the rationals
//!
//! Gauss-Jordan elimination with exact pivoting, used for small square
//! solves, inverses and rank questions. Entries never round; a pivot is
//! any non-zero rational.

use super::{Integer, Matrix, Rational};

/// Incremental row echelon form for rank tracking.
///
/// Rows are inserted one at a time and reduced against the rows already
/// kept. An insert that reduces to zero leaves the rank unchanged.
pub struct Echelon {
    cols: usize,
    rows: Vec<Vec<Rational>>,
    pivots: Vec<usize>,
}

impl Echelon {
    /// Create an empty echelon form for rows of width `cols`.
    pub fn new(cols: usize) -> Self {
        Self { cols, rows: Vec::new(), pivots: Vec::new() }
    }

    /// Current rank.
    pub fn rank(&self) -> usize {
        self.rows.len()
    }

    /// Reduce `row` against the kept rows and keep it if independent.
    /// Returns true iff the row increased the rank.
    pub fn insert(&mut self, row: &[Rational]) -> bool {
        assert_eq!(row.len(), self.cols, "row width mismatch");
        let mut work = row.to_vec();
        for (kept, &p) in self.rows.iter().zip(self.pivots.iter()) {
            if work[p].is_zero() {
                continue;
            }
            let factor = work[p].clone();
            for j in 0..self.cols {
                let delta = &factor * &kept[j];
                work[j] = &work[j] - &delta;
            }
        }
        let pivot = match work.iter().position(|v| !v.is_zero()) {
            Some(p) => p,
            None => return false,
        };
        let lead = work[pivot].clone();
        for v in work.iter_mut() {
            *v = &*v / &lead;
        }
        self.rows.push(work);
        self.pivots.push(pivot);
        true
    }
}

/// Rank of an integer matrix.
pub fn rank(m: &Matrix<Integer>) -> usize {
    let mut ech = Echelon::new(m.cols());
    for i in 0..m.rows() {
        let row: Vec<Rational> = m.row(i).iter().cloned().map(Rational::from_integer).collect();
        ech.insert(&row);
    }
    ech.rank()
}

/// Solve the square system `m * x = rhs` exactly.
/// Returns `None` when the matrix is singular.
pub fn solve(m: &Matrix<Rational>, rhs: &[Rational]) -> Option<Vec<Rational>> {
    let n = m.rows();
    assert_eq!(m.cols(), n, "solve requires a square matrix");
    assert_eq!(rhs.len(), n, "right-hand side length mismatch");

    let mut a: Vec<Vec<Rational>> = (0..n)
        .map(|i| {
            let mut row = m.row(i).to_vec();
            row.push(rhs[i].clone());
            row
        })
        .collect();

    gauss_jordan(&mut a, n)?;
    Some(a.into_iter().map(|row| row[n].clone()).collect())
}

/// Invert a square rational matrix exactly.
/// Returns `None` when the matrix is singular.
pub fn invert(m: &Matrix<Rational>) -> Option<Matrix<Rational>> {
    let n = m.rows();
    assert_eq!(m.cols(), n, "invert requires a square matrix");

    let mut a: Vec<Vec<Rational>> = (0..n)
        .map(|i| {
            let mut row = m.row(i).to_vec();
            for j in 0..n {
                row.push(if i == j { Rational::one() } else { Rational::zero() });
            }
            row
        })
        .collect();

    gauss_jordan(&mut a, n)?;

    let mut out = Matrix::zeros_rational(n, n);
    for i in 0..n {
        for j in 0..n {
            *out.get_mut(i, j) = a[i][n + j].clone();
        }
    }
    Some(out)
}

/// Full Gauss-Jordan sweep on an augmented system with `n` pivot columns.
/// Leaves the pivot block as the identity; `None` when a pivot is missing.
fn gauss_jordan(a: &mut [Vec<Rational>], n: usize) -> Option<()> {
    let width = a.first().map_or(0, |r| r.len());
    for col in 0..n {
        let pivot_row = (col..n).find(|&r| !a[r][col].is_zero())?;
        a.swap(col, pivot_row);

        let lead = a[col][col].clone();
        for j in 0..width {
            a[col][j] = &a[col][j] / &lead;
        }

        for r in 0..n {
            if r == col || a[r][col].is_zero() {
                continue;
            }
            let factor = a[r][col].clone();
            for j in 0..width {
                let delta = &factor * &a[col][j];
                a[r][j] = &a[r][j] - &delta;
            }
        }
    }
    Some(())
}

/// Clear denominators of a rational row: the primitive integer row with
/// the same direction. The zero row maps to the zero row.
pub fn primitive_integer_row(row: &[Rational]) -> Vec<Integer> {
    let mut lcm = Integer::one();
    for v in row.iter() {
        if v.is_zero() {
            continue;
        }
        let den = v.denominator();
        let g = lcm.gcd(den);
        lcm = &(&lcm / &g) * den;
    }
    let mut out: Vec<Integer> = row
        .iter()
        .map(|v| {
            if v.is_zero() {
                Integer::zero()
            } else {
                &(&lcm / v.denominator()) * v.numerator()
            }
        })
        .collect();

    let mut g = Integer::zero();
    for v in out.iter() {
        if !v.is_zero() {
            g = g.gcd(v);
            if g == Integer::one() {
                return out;
            }
        }
    }
    if !g.is_zero() {
        for v in out.iter_mut() {
            *v = &*v / &g;
        }
    }
    out
}
