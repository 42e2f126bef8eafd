//! Cone enumeration algorithms
//!
//! The double description driver intersects a cone with constraint
//! hyperplanes and halfspaces one row at a time; the Hilbert driver
//! triangulates a generated cone and reduces its lattice points to the
//! minimal generating set. Both share the ray representation, the
//! adjacency test and the support admissibility constraints.

pub mod adjacency;
pub mod dd;
pub mod hilbert;
pub mod ray;
pub mod validity;

pub use dd::{ConstraintSign, EnumerationConfig, EnumerationStats, VertexEnumerator};
pub use hilbert::{HilbertConfig, HilbertEnumerator, HilbertStats};
pub use ray::Ray;
pub use validity::ValidityConstraints;
