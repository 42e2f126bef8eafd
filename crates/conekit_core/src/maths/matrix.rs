//! Dense matrix operations
//!
//! Row-major dense matrix representation over exact element types.

use super::{Integer, Rational};

/// Dense matrix in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Clone> Matrix<T> {
    /// Create a matrix from a flat vector (row-major order).
    pub fn from_flat(data: Vec<T>, rows: usize, cols: usize) -> Self {
        assert_eq!(data.len(), rows * cols, "flat data does not match dimensions");
        Self { data, rows, cols }
    }

    /// Create a matrix from a list of equal-length rows.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Self {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in rows {
            assert_eq!(row.len(), ncols, "rows of unequal length");
            data.extend(row);
        }
        Self { data, rows: nrows, cols: ncols }
    }

    /// Get matrix dimensions.
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Get number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Access element at (i, j).
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[i * self.cols + j]
    }

    /// Mutable access to element at (i, j).
    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut T {
        &mut self.data[i * self.cols + j]
    }

    /// Overwrite element at (i, j).
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        self.data[i * self.cols + j] = value;
    }

    /// Get underlying data as slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consume and return underlying data.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Get a row as a slice.
    pub fn row(&self, i: usize) -> &[T] {
        let start = i * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Swap two rows.
    pub fn swap_rows(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        for k in 0..self.cols {
            self.data.swap(i * self.cols + k, j * self.cols + k);
        }
    }

    /// Swap two columns.
    pub fn swap_cols(&mut self, i: usize, j: usize) {
        if i == j {
            return;
        }
        for k in 0..self.rows {
            self.data.swap(k * self.cols + i, k * self.cols + j);
        }
    }

    /// Return the transposed matrix.
    pub fn transpose(&self) -> Matrix<T> {
        let mut data = Vec::with_capacity(self.rows * self.cols);
        for j in 0..self.cols {
            for i in 0..self.rows {
                data.push(self.get(i, j).clone());
            }
        }
        Matrix { data, rows: self.cols, cols: self.rows }
    }
}

impl<T: Clone + Default> Matrix<T> {
    /// Create a matrix filled with default values.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { data: vec![T::default(); rows * cols], rows, cols }
    }
}

impl Matrix<Integer> {
    /// Create a zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { data: vec![Integer::zero(); rows * cols], rows, cols }
    }

    /// Create an identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            *m.get_mut(i, i) = Integer::one();
        }
        m
    }

    /// Matrix-vector product.
    pub fn mul_vector(&self, v: &[Integer]) -> Vec<Integer> {
        assert_eq!(self.cols, v.len(), "dimension mismatch in matrix-vector product");
        (0..self.rows)
            .map(|i| {
                let mut acc = Integer::zero();
                for j in 0..self.cols {
                    let a = self.get(i, j);
                    if !a.is_zero() && !v[j].is_zero() {
                        acc = &acc + &(a * &v[j]);
                    }
                }
                acc
            })
            .collect()
    }

    /// Matrix product `self * other`.
    pub fn mul(&self, other: &Matrix<Integer>) -> Matrix<Integer> {
        assert_eq!(self.cols, other.rows, "dimension mismatch in matrix product");
        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                if a.is_zero() {
                    continue;
                }
                for j in 0..other.cols {
                    let b = other.get(k, j);
                    if !b.is_zero() {
                        *out.get_mut(i, j) = &*out.get(i, j) + &(a * b);
                    }
                }
            }
        }
        out
    }
}

impl Matrix<Rational> {
    /// Create a zero rational matrix.
    pub fn zeros_rational(rows: usize, cols: usize) -> Self {
        Self { data: vec![Rational::zero(); rows * cols], rows, cols }
    }

    /// Create a rational identity matrix.
    pub fn identity_rational(n: usize) -> Self {
        let mut m = Self::zeros_rational(n, n);
        for i in 0..n {
            *m.get_mut(i, i) = Rational::one();
        }
        m
    }

    /// Lift an integer matrix to rationals.
    pub fn from_integer(m: &Matrix<Integer>) -> Self {
        let data = m.as_slice().iter().cloned().map(Rational::from_integer).collect();
        Self { data, rows: m.rows(), cols: m.cols() }
    }
}
