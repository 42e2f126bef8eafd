//! Rays of the running cone
//!
//! A [`Ray`] is a primitive integer vector together with the bitmask of
//! constraints currently tight on it and a scratch slot holding its inner
//! product with the row being processed. The mask universe is fixed up
//! front by the driver; bits for rows not yet processed stay clear until
//! the row is reached.

use crate::maths::{Bitmask, Integer, Vector};

/// A ray of the running cone: primitive coordinates, tight-constraint
/// mask, and the cached value of the current constraint row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ray {
    vector: Vector,
    faces: Bitmask,
    value: Integer,
}

impl Ray {
    /// The `axis`-th coordinate axis in `dim` dimensions, tight on every
    /// other axis hyperplane. `universe` is the total mask length (axis
    /// facets followed by constraint rows).
    pub fn axis(axis: usize, dim: usize, universe: usize) -> Ray {
        assert!(axis < dim && dim <= universe, "axis ray outside the mask universe");
        let mut vector = Vector::zero(dim);
        vector.set(axis, Integer::one());
        let mut faces = Bitmask::new(universe);
        for j in 0..dim {
            if j != axis {
                faces.set(j);
            }
        }
        Ray { vector, faces, value: Integer::zero() }
    }

    /// Wrap an existing vector with a known tight-constraint mask.
    pub fn from_parts(vector: Vector, faces: Bitmask) -> Ray {
        Ray { vector, faces, value: Integer::zero() }
    }

    /// The coordinates.
    pub fn vector(&self) -> &Vector {
        &self.vector
    }

    /// Give up the coordinates.
    pub fn into_vector(self) -> Vector {
        self.vector
    }

    /// The tight-constraint mask.
    pub fn faces(&self) -> &Bitmask {
        &self.faces
    }

    /// The cached inner product from the latest [`Ray::evaluate`] call.
    pub fn value(&self) -> &Integer {
        &self.value
    }

    /// Sign of the cached inner product.
    pub fn sign(&self) -> i32 {
        self.value.sign()
    }

    /// Cache the inner product with a constraint row.
    pub fn evaluate(&mut self, row: &[Integer]) {
        self.value = self.vector.inner(row);
    }

    /// Record that a constraint is tight on this ray.
    pub fn mark_tight(&mut self, bit: usize) {
        self.faces.set(bit);
    }

    /// Combine a positive and a negative ray into the ray where the
    /// current constraint vanishes, scaled to primitive form and flipped
    /// so the leading non-zero coordinate is positive. The new mask is
    /// the intersection of the parent masks plus `tight_bit`.
    pub fn pivot(pos: &Ray, neg: &Ray, tight_bit: usize) -> Ray {
        let mut ray = Self::pivot_unoriented(pos, neg, tight_bit);
        if let Some(lead) = ray.vector.support().ones().next() {
            if ray.vector.get(lead).sign() < 0 {
                ray.vector.negate();
            }
        }
        ray
    }

    /// The same combination without the canonical sign flip. Used when
    /// the ray's orientation carries meaning, as with support hyperplanes
    /// of a dual cone.
    pub fn pivot_unoriented(pos: &Ray, neg: &Ray, tight_bit: usize) -> Ray {
        debug_assert!(pos.sign() > 0, "pivot requires a strictly positive first argument");
        debug_assert!(neg.sign() < 0, "pivot requires a strictly negative second argument");

        let alpha = pos.value.clone();
        let minus_beta = -&neg.value;
        let mut vector = Vector::combine(&alpha, &neg.vector, &minus_beta, &pos.vector);
        vector.scale_down();

        let mut faces = pos.faces.clone();
        faces.and_assign(&neg.faces);
        faces.set(tight_bit);

        Ray { vector, faces, value: Integer::zero() }
    }
}
