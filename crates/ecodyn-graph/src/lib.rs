//! # ecodyn-graph
//!
//! Bound-checked array/matrix facades (§ 4.2) and the multi-compartment
//! labelled topology graph (§ 4.3) that ecological data components and the
//! simulation driver build on.

pub mod error;
pub mod labels;
pub mod topology;
pub mod view;

pub use error::{GraphError, Result};
pub use labels::LabelIndex;
pub use topology::Topology;
pub use view::{DenseMatrix, DenseMatrixMut, DenseVector, DenseVectorMut, ReadOnly, SparseMatrix};
