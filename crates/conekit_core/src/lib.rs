//! Conekit Core Library
//!
//! Exact vertex enumeration and Hilbert bases for rational polyhedral cones.
//!
//! # Overview
//!
//! This library computes the extreme rays of a pointed cone given by
//! linear constraints, and the minimal generating set of the integer
//! points of a cone given by generators. All arithmetic is exact:
//! unbounded integers with a machine-word fast path, reduced rationals,
//! and elimination that never rounds.
//!
//! # Key Components
//!
//! - [`maths`] - Exact integers, rationals, bitmasks, vectors and matrices
//! - [`enumerate`] - The double description and Hilbert basis drivers
//! - [`pool`] - Worker pool and cooperative cancellation
//! - [`error`] - The error type shared by every driver

pub mod error;
pub mod maths;
pub mod pool;
pub mod enumerate;

pub use error::{ConeError, Result};
pub use maths::{Bitmask, Integer, Matrix, Rational, Vector};
pub use pool::{CancelToken, WorkPool};
pub use enumerate::{
    ConstraintSign, EnumerationConfig, EnumerationStats, HilbertConfig, HilbertEnumerator,
    HilbertStats, Ray, ValidityConstraints, VertexEnumerator,
};
