//! Exact arithmetic and dense linear algebra primitives
//!
//! Everything in this module is exact: unbounded integers, reduced
//! rationals, and elimination routines that never round. Floating point
//! is not used anywhere.

pub mod bitmask;
pub mod integer;
pub mod lattice;
pub mod linear;
pub mod matrix;
pub mod rational;
pub mod vector;

pub use bitmask::Bitmask;
pub use integer::Integer;
pub use matrix::Matrix;
pub use rational::Rational;
pub use vector::Vector;

use thiserror::Error;

/// Failures of the arithmetic layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    /// An indeterminate form was requested, such as `0 * inf` or `inf - inf`.
    #[error("indeterminate arithmetic form: {0}")]
    Indeterminate(&'static str),

    /// Exact division was requested but the dividend is not a multiple
    /// of the divisor.
    #[error("exact division has a non-zero remainder")]
    NotExact,

    /// A string could not be parsed as an integer.
    #[error("cannot parse {0:?} as an integer")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, ArithmeticError>;
