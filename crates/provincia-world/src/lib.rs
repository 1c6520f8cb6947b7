//! Province storage and transport for the Provincia turn engine.
//!
//! This crate holds the per-turn entity store and everything that moves
//! goods between provinces: the per-resource transport graph, the flow
//! solvers, and the passes that write transport availability back.
//!
//! # Modules
//!
//! - [`repository`] -- [`Repository`], the validated and indexed snapshot
//!   passed by reference through a turn.
//! - [`graph`] -- The (province, mode) vertex arena and its edge rules.
//! - [`flow`] -- Edmonds-Karp max flow with path decomposition, and the
//!   widest-path alternative.
//! - [`route`] -- Hop sequences reconstructed from a flow.
//! - [`availability`] -- Domestic and partner availability passes.
//! - [`infrastructure`] -- Capacity roll-up from active buildings.
//! - [`error`] -- Error types for repository and transport operations.

pub mod availability;
pub mod error;
pub mod flow;
pub mod graph;
pub mod infrastructure;
pub mod repository;
pub mod route;

// Re-export primary types at crate root.
pub use availability::{
    ProvinceFlow, TransportOptions, TransportReport, compute_domestic_availability,
    compute_partner_availability,
};
pub use error::WorldError;
pub use flow::{FlowAlgorithm, FlowOutcome, ModeFlow, solve};
pub use graph::{Edge, TerrainRules, TransportGraph, Vertex};
pub use infrastructure::aggregate_infrastructure;
pub use repository::Repository;
pub use route::{Hop, Route};
