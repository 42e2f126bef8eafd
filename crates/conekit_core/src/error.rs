//! Error types for cone enumeration

use thiserror::Error;

use crate::maths::ArithmeticError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConeError {
    /// The constraint matrix shape does not match the ambient dimension.
    #[error("constraint matrix is {rows}x{cols} but the ambient dimension is {dim}")]
    ShapeMismatch { rows: usize, cols: usize, dim: usize },

    /// The per-row sign tags do not match the number of constraint rows.
    #[error("{signs} sign tags supplied for {rows} constraint rows")]
    SignCountMismatch { signs: usize, rows: usize },

    /// The ambient dimension is zero.
    #[error("ambient dimension must be positive")]
    ZeroDimension,

    /// A feasibility check found an empty intermediate ray set.
    #[error("the intersection is trivial: no ray satisfies the constraints")]
    Infeasible,

    /// The input lies outside the supported regime, e.g. generators that
    /// do not span a pointed cone.
    #[error("unsolved case: the input is outside the supported regime")]
    UnsolvedCase,

    /// The operation was cancelled through its cancellation token.
    #[error("the operation was cancelled")]
    Cancelled,

    /// An arithmetic failure escaped the maths layer.
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
}

pub type Result<T> = std::result::Result<T, ConeError>;
