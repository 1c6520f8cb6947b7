//! Error types for the `provincia-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

use provincia_types::ProvinceId;

/// Errors that can occur during repository and transport operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// A province was not found in the repository.
    #[error("province not found: {0}")]
    ProvinceNotFound(ProvinceId),

    /// A province arena index points past the province table.
    #[error("province index {0} is out of range")]
    ProvinceIndexOutOfRange(usize),

    /// A vertex index points past the graph arena.
    #[error("vertex {0} is out of range")]
    VertexOutOfRange(usize),

    /// An arc index points past the arc table.
    #[error("arc {0} is out of range")]
    ArcOutOfRange(usize),

    /// Flow left a vertex unbalanced while splitting it into routes.
    #[error("flow is not conserved at vertex {vertex}")]
    FlowNotConserved {
        /// The vertex where the walk got stuck.
        vertex: usize,
    },

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow in transport calculation")]
    ArithmeticOverflow,
}
