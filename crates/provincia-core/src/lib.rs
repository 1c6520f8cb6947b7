//! Turn orchestration and building eligibility for the Provincia engine.
//!
//! This crate owns the per-turn pass: criteria evaluation, the four
//! eligibility stages, and the ordering of those stages against the
//! infrastructure roll-up and the transport passes of `provincia-world`.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `provincia-config.yaml` into
//!   strongly-typed structs.
//! - [`criteria`] -- [`Evaluate`] for tag, numeric and count criteria.
//! - [`tallies`] -- Existing building counts per province, owner and world.
//! - [`eligibility`] -- The [`Resolver`] and its stages: siting,
//!   neighborhood, limits and resource gate.
//! - [`turn`] -- The turn pass, stage timing and snapshot loading.
//!
//! [`Evaluate`]: criteria::Evaluate
//! [`Resolver`]: eligibility::Resolver

pub mod config;
pub mod criteria;
pub mod eligibility;
pub mod tallies;
pub mod turn;

pub use config::{ConfigError, EngineConfig};
pub use eligibility::{Candidates, EligibilityStage, Resolver, StageContext, StageError};
pub use turn::{StageOutcome, StageTiming, TurnReport, load_repository, run_turn};
