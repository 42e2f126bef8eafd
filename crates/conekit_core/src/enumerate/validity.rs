//! Admissibility constraints on coordinate supports
//!
//! Some cones only have meaningful solutions on restricted supports: a
//! constraint names a subset of coordinate positions and requires that a
//! solution be non-zero on at most one of them. Coordinates are grouped
//! into consecutive equal-sized blocks, possibly followed by padding
//! coordinates that no constraint may touch. A within-block pattern can
//! be broadcast to every block (a local constraint per block), or a
//! single constraint can cover the pattern's positions across all blocks
//! at once (a global constraint).

use crate::maths::Bitmask;

/// A description of support constraints, compiled on demand into
/// bitmasks of a concrete vector length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidityConstraints {
    block_size: usize,
    n_blocks: usize,
    local: Vec<Vec<usize>>,
    global: Vec<Vec<usize>>,
}

impl ValidityConstraints {
    /// Create an empty constraint set over `n_blocks` consecutive blocks
    /// of `block_size` coordinates each.
    pub fn new(block_size: usize, n_blocks: usize) -> Self {
        Self { block_size, n_blocks, local: Vec::new(), global: Vec::new() }
    }

    /// The constraint set that admits everything.
    pub fn none() -> Self {
        Self::default()
    }

    /// True iff no constraint has been added.
    pub fn is_none(&self) -> bool {
        self.local.is_empty() && self.global.is_empty()
    }

    /// Add one local constraint per block: within each block, at most one
    /// of the pattern's positions may be non-zero. Positions are relative
    /// to the start of a block.
    pub fn add_local<I: IntoIterator<Item = usize>>(&mut self, pattern: I) {
        let pattern: Vec<usize> = pattern.into_iter().collect();
        for &p in &pattern {
            assert!(p < self.block_size, "local position {} outside block of size {}", p, self.block_size);
        }
        self.local.push(pattern);
    }

    /// Add a single global constraint: across all blocks together, at
    /// most one of the pattern's positions may be non-zero. Positions are
    /// relative to the start of each block.
    pub fn add_global<I: IntoIterator<Item = usize>>(&mut self, pattern: I) {
        let pattern: Vec<usize> = pattern.into_iter().collect();
        for &p in &pattern {
            assert!(p < self.block_size, "global position {} outside block of size {}", p, self.block_size);
        }
        self.global.push(pattern);
    }

    /// Compile the constraints into bitmasks of length `len`. Each local
    /// pattern produces one mask per block; each global pattern produces
    /// a single mask. `len` may exceed the blocks with padding
    /// coordinates, which no mask touches.
    pub fn bitmasks(&self, len: usize) -> Vec<Bitmask> {
        assert!(
            len >= self.block_size * self.n_blocks,
            "vector length {} shorter than {} blocks of size {}",
            len,
            self.n_blocks,
            self.block_size
        );
        let mut out = Vec::with_capacity(self.local.len() * self.n_blocks + self.global.len());
        for pattern in &self.local {
            for block in 0..self.n_blocks {
                let mut mask = Bitmask::new(len);
                for &p in pattern {
                    mask.set(block * self.block_size + p);
                }
                out.push(mask);
            }
        }
        for pattern in &self.global {
            let mut mask = Bitmask::new(len);
            for block in 0..self.n_blocks {
                for &p in pattern {
                    mask.set(block * self.block_size + p);
                }
            }
            out.push(mask);
        }
        out
    }
}

/// True iff `support` is non-zero on at most one position of every mask.
pub fn is_admissible(masks: &[Bitmask], support: &Bitmask) -> bool {
    masks.iter().all(|m| support.intersection_count(m) <= 1)
}
