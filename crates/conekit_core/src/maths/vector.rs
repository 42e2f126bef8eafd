//! Dense integer vectors with support tracking
//!
//! A [`Vector`] couples a fixed-length coordinate array with a support
//! mask: bit `i` of the mask is set exactly when coordinate `i` is
//! non-zero. Single-element writes keep the mask current; bulk mutation
//! through [`Vector::coords_mut`] must be followed by
//! [`Vector::rebuild_support`] before the mask is read again.

use std::cmp::Ordering;
use std::fmt;

use super::{Bitmask, Integer};

/// Fixed-length coordinate vector of [`Integer`]s plus its support mask.
#[derive(Clone, PartialEq, Eq)]
pub struct Vector {
    coords: Vec<Integer>,
    support: Bitmask,
}

impl Vector {
    /// Create the zero vector of length `n`.
    pub fn zero(n: usize) -> Self {
        Self { coords: vec![Integer::zero(); n], support: Bitmask::new(n) }
    }

    /// Create a vector from its coordinates.
    pub fn from_coords(coords: Vec<Integer>) -> Self {
        let mut v = Self { support: Bitmask::new(coords.len()), coords };
        v.rebuild_support();
        v
    }

    /// Length of the vector.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// True iff the vector has length zero.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Coordinate `i`.
    pub fn get(&self, i: usize) -> &Integer {
        &self.coords[i]
    }

    /// Overwrite coordinate `i`, keeping the support mask current.
    pub fn set(&mut self, i: usize, value: Integer) {
        if value.is_zero() {
            self.support.clear(i);
        } else {
            self.support.set(i);
        }
        self.coords[i] = value;
    }

    /// The coordinates as a slice.
    pub fn coords(&self) -> &[Integer] {
        &self.coords
    }

    /// Mutable access to the coordinates for batch updates. Call
    /// [`Vector::rebuild_support`] afterwards.
    pub fn coords_mut(&mut self) -> &mut [Integer] {
        &mut self.coords
    }

    /// Recompute the support mask from the coordinates.
    pub fn rebuild_support(&mut self) {
        let mut support = Bitmask::new(self.coords.len());
        for (i, c) in self.coords.iter().enumerate() {
            if !c.is_zero() {
                support.set(i);
            }
        }
        self.support = support;
    }

    /// The support mask: bit `i` set iff coordinate `i` is non-zero.
    pub fn support(&self) -> &Bitmask {
        &self.support
    }

    /// True iff every coordinate is zero.
    pub fn is_zero(&self) -> bool {
        self.support.count_ones() == 0
    }

    /// In-place sum `self += other`.
    pub fn add_assign(&mut self, other: &Vector) {
        assert_eq!(self.len(), other.len(), "vector length mismatch");
        for (c, o) in self.coords.iter_mut().zip(other.coords.iter()) {
            *c = &*c + o;
        }
        self.rebuild_support();
    }

    /// In-place scaled subtraction `self -= k * other`, one pass.
    pub fn sub_scaled(&mut self, k: &Integer, other: &Vector) {
        assert_eq!(self.len(), other.len(), "vector length mismatch");
        for (c, o) in self.coords.iter_mut().zip(other.coords.iter()) {
            *c = &*c - &(k * o);
        }
        self.rebuild_support();
    }

    /// In-place scaling `self *= k`.
    pub fn scale(&mut self, k: &Integer) {
        for c in self.coords.iter_mut() {
            *c = &*c * k;
        }
        self.rebuild_support();
    }

    /// The combination `a * x + b * y` built in one pass.
    pub fn combine(a: &Integer, x: &Vector, b: &Integer, y: &Vector) -> Vector {
        assert_eq!(x.len(), y.len(), "vector length mismatch");
        let coords: Vec<Integer> = x
            .coords
            .iter()
            .zip(y.coords.iter())
            .map(|(xi, yi)| &(a * xi) + &(b * yi))
            .collect();
        Vector::from_coords(coords)
    }

    /// Exact inner product against a coefficient row.
    pub fn inner(&self, row: &[Integer]) -> Integer {
        assert_eq!(self.len(), row.len(), "vector length mismatch");
        let mut acc = Integer::zero();
        for (c, r) in self.coords.iter().zip(row.iter()) {
            if !c.is_zero() && !r.is_zero() {
                acc = &acc + &(c * r);
            }
        }
        acc
    }

    /// Divide all finite non-zero coordinates by their common gcd,
    /// leaving a primitive vector. Signs are unchanged; the zero vector
    /// is left alone.
    pub fn scale_down(&mut self) {
        let mut g = Integer::zero();
        for c in self.coords.iter() {
            if c.is_infinite() || c.is_zero() {
                continue;
            }
            g = g.gcd(c);
            if g == Integer::one() {
                return;
            }
        }
        if g.is_zero() {
            return;
        }
        for c in self.coords.iter_mut() {
            if !c.is_infinite() {
                *c = &*c / &g;
            }
        }
    }

    /// Negate every coordinate in place. The support is unchanged.
    pub fn negate(&mut self) {
        for c in self.coords.iter_mut() {
            c.negate();
        }
    }
}

impl PartialOrd for Vector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Vector {
    /// Lexicographic order on coordinates.
    fn cmp(&self, other: &Self) -> Ordering {
        self.coords.cmp(&other.coords)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec_of(vals: &[i64]) -> Vector {
        Vector::from_coords(vals.iter().map(|&v| Integer::from(v)).collect())
    }

    #[test]
    fn test_support_tracking() {
        let mut v = Vector::zero(4);
        assert!(v.is_zero());
        v.set(2, Integer::from(5));
        assert!(v.support().get(2));
        assert!(!v.support().get(0));
        v.set(2, Integer::zero());
        assert!(v.is_zero());
    }

    #[test]
    fn test_batch_mutation_rebuild() {
        let mut v = vec_of(&[1, 0, 3]);
        v.coords_mut()[0] = Integer::zero();
        v.coords_mut()[1] = Integer::from(7);
        v.rebuild_support();
        assert_eq!(v.support().ones().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_inner_product() {
        let v = vec_of(&[1, -2, 3]);
        let row: Vec<Integer> = [4, 5, 6].iter().map(|&x| Integer::from(x)).collect();
        assert_eq!(v.inner(&row), Integer::from(4 - 10 + 18));
        assert_eq!(Vector::zero(3).inner(&row), Integer::zero());
    }

    #[test]
    fn test_combine() {
        let x = vec_of(&[1, 0, 2]);
        let y = vec_of(&[0, 3, -1]);
        let c = Vector::combine(&Integer::from(2), &x, &Integer::from(3), &y);
        assert_eq!(c, vec_of(&[2, 9, 1]));
        assert_eq!(c.support().ones().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_sub_scaled() {
        let mut v = vec_of(&[10, 4, 6]);
        let w = vec_of(&[3, 2, 2]);
        v.sub_scaled(&Integer::from(2), &w);
        assert_eq!(v, vec_of(&[4, 0, 2]));
        assert!(!v.support().get(1));
    }

    #[test]
    fn test_scale_down() {
        let mut v = vec_of(&[6, -9, 12]);
        v.scale_down();
        assert_eq!(v, vec_of(&[2, -3, 4]));

        let mut z = Vector::zero(3);
        z.scale_down();
        assert!(z.is_zero());

        let mut u = vec_of(&[0, 5, 0]);
        u.scale_down();
        assert_eq!(u, vec_of(&[0, 1, 0]));
    }

    #[test]
    fn test_lexicographic_order() {
        let a = vec_of(&[1, 0, 0]);
        let b = vec_of(&[1, 1, 0]);
        let c = vec_of(&[0, 9, 9]);
        assert!(c < a);
        assert!(a < b);
    }
}
