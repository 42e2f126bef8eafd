//! Fixed-length bitsets for tight-constraint bookkeeping
//!
//! A [`Bitmask`] records one bit per constraint. Masks up to one machine
//! word live inline; longer masks fall back to a heap word array. The
//! representation is not visible to callers, and bits beyond the declared
//! length are never set.

use std::fmt;

const WORD_BITS: usize = 64;

#[derive(Clone, PartialEq, Eq)]
enum Words {
    One(u64),
    Many(Box<[u64]>),
}

/// Fixed-length bitset.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmask {
    len: usize,
    words: Words,
}

impl Bitmask {
    /// Create an all-zero mask of the given length.
    pub fn new(len: usize) -> Self {
        let words = if len <= WORD_BITS {
            Words::One(0)
        } else {
            let n = (len + WORD_BITS - 1) / WORD_BITS;
            Words::Many(vec![0u64; n].into_boxed_slice())
        };
        Self { len, words }
    }

    /// Number of bits in the mask.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True iff the mask has zero length.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn words(&self) -> &[u64] {
        match &self.words {
            Words::One(w) => std::slice::from_ref(w),
            Words::Many(ws) => ws,
        }
    }

    fn words_mut(&mut self) -> &mut [u64] {
        match &mut self.words {
            Words::One(w) => std::slice::from_mut(w),
            Words::Many(ws) => ws,
        }
    }

    /// Test bit `i`.
    pub fn get(&self, i: usize) -> bool {
        assert!(i < self.len, "bit index {} out of range for mask of length {}", i, self.len);
        self.words()[i / WORD_BITS] >> (i % WORD_BITS) & 1 == 1
    }

    /// Set bit `i`.
    pub fn set(&mut self, i: usize) {
        assert!(i < self.len, "bit index {} out of range for mask of length {}", i, self.len);
        self.words_mut()[i / WORD_BITS] |= 1u64 << (i % WORD_BITS);
    }

    /// Clear bit `i`.
    pub fn clear(&mut self, i: usize) {
        assert!(i < self.len, "bit index {} out of range for mask of length {}", i, self.len);
        self.words_mut()[i / WORD_BITS] &= !(1u64 << (i % WORD_BITS));
    }

    /// In-place intersection with `other`.
    pub fn and_assign(&mut self, other: &Bitmask) {
        assert_eq!(self.len, other.len, "mask length mismatch");
        for (w, o) in self.words_mut().iter_mut().zip(other.words()) {
            *w &= o;
        }
    }

    /// In-place union with `other`.
    pub fn or_assign(&mut self, other: &Bitmask) {
        assert_eq!(self.len, other.len, "mask length mismatch");
        for (w, o) in self.words_mut().iter_mut().zip(other.words()) {
            *w |= o;
        }
    }

    /// True iff every set bit of `self` is also set in `other`.
    pub fn is_subset_of(&self, other: &Bitmask) -> bool {
        assert_eq!(self.len, other.len, "mask length mismatch");
        self.words().iter().zip(other.words()).all(|(w, o)| w & !o == 0)
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words().iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Number of bits set in both masks, without materialising the
    /// intersection.
    pub fn intersection_count(&self, other: &Bitmask) -> usize {
        assert_eq!(self.len, other.len, "mask length mismatch");
        self.words()
            .iter()
            .zip(other.words())
            .map(|(w, o)| (w & o).count_ones() as usize)
            .sum()
    }

    /// True iff `a AND b` is a subset of `self`, without materialising
    /// the intersection.
    pub fn contains_intersection(&self, a: &Bitmask, b: &Bitmask) -> bool {
        assert_eq!(self.len, a.len, "mask length mismatch");
        assert_eq!(self.len, b.len, "mask length mismatch");
        self.words()
            .iter()
            .zip(a.words().iter().zip(b.words()))
            .all(|(w, (x, y))| x & y & !w == 0)
    }

    /// Iterate the indices of set bits in increasing order.
    pub fn ones(&self) -> Ones<'_> {
        Ones { words: self.words(), word_idx: 0, current: self.words().first().copied().unwrap_or(0) }
    }
}

/// Iterator over set bit indices.
pub struct Ones<'a> {
    words: &'a [u64],
    word_idx: usize,
    current: u64,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.current == 0 {
            self.word_idx += 1;
            if self.word_idx >= self.words.len() {
                return None;
            }
            self.current = self.words[self.word_idx];
        }
        let bit = self.current.trailing_zeros() as usize;
        self.current &= self.current - 1;
        Some(self.word_idx * WORD_BITS + bit)
    }
}

impl fmt::Debug for Bitmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitmask[")?;
        for (k, i) in self.ones().enumerate() {
            if k > 0 {
                write!(f, " ")?;
            }
            write!(f, "{i}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(len: usize, bits: &[usize]) -> Bitmask {
        let mut m = Bitmask::new(len);
        for &b in bits {
            m.set(b);
        }
        m
    }

    #[test]
    fn test_set_get_clear() {
        let mut m = Bitmask::new(10);
        assert!(!m.get(3));
        m.set(3);
        m.set(9);
        assert!(m.get(3));
        assert!(m.get(9));
        m.clear(3);
        assert!(!m.get(3));
        assert_eq!(m.count_ones(), 1);
    }

    #[test]
    fn test_heap_fallback() {
        let mut m = Bitmask::new(200);
        m.set(0);
        m.set(63);
        m.set(64);
        m.set(199);
        assert_eq!(m.count_ones(), 4);
        assert!(m.get(64));
        assert!(!m.get(65));
        assert_eq!(m.ones().collect::<Vec<_>>(), vec![0, 63, 64, 199]);
    }

    #[test]
    fn test_and_or() {
        let a = mask(80, &[1, 5, 70]);
        let b = mask(80, &[5, 70, 79]);
        let mut i = a.clone();
        i.and_assign(&b);
        assert_eq!(i.ones().collect::<Vec<_>>(), vec![5, 70]);
        let mut u = a.clone();
        u.or_assign(&b);
        assert_eq!(u.ones().collect::<Vec<_>>(), vec![1, 5, 70, 79]);
    }

    #[test]
    fn test_subset() {
        let small = mask(100, &[2, 64]);
        let big = mask(100, &[2, 17, 64, 99]);
        assert!(small.is_subset_of(&big));
        assert!(!big.is_subset_of(&small));
        assert!(small.is_subset_of(&small));
        assert!(Bitmask::new(100).is_subset_of(&small));
    }

    #[test]
    fn test_intersection_count() {
        let a = mask(70, &[0, 1, 2, 65]);
        let b = mask(70, &[2, 3, 65, 69]);
        assert_eq!(a.intersection_count(&b), 2);
        assert_eq!(a.intersection_count(&Bitmask::new(70)), 0);
    }

    #[test]
    fn test_contains_intersection() {
        let a = mask(70, &[0, 1, 2, 65]);
        let b = mask(70, &[2, 3, 65, 69]);
        // a AND b = {2, 65}.
        assert!(mask(70, &[2, 65]).contains_intersection(&a, &b));
        assert!(mask(70, &[1, 2, 65, 69]).contains_intersection(&a, &b));
        assert!(!mask(70, &[2]).contains_intersection(&a, &b));
        assert!(!Bitmask::new(70).contains_intersection(&a, &b));
        assert!(Bitmask::new(70).contains_intersection(&a, &mask(70, &[4])));
    }

    #[test]
    fn test_ones_iterator_single_word() {
        let m = mask(64, &[0, 31, 63]);
        assert_eq!(m.ones().collect::<Vec<_>>(), vec![0, 31, 63]);
        assert_eq!(Bitmask::new(64).ones().count(), 0);
    }
}
