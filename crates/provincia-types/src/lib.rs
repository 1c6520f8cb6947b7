//! Shared type definitions for the Provincia turn engine.
//!
//! This crate is the single source of truth for the records exchanged with
//! the collaborator (the desktop tables that own persistence and UI). Types
//! defined here flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe string wrappers for provinces, buildings and states
//! - [`enums`] -- Transport modes, building status, siting requirements and
//!   diagnostic categories
//! - [`criteria`] -- Parsed criteria trees (tag, numeric and count families)
//! - [`structs`] -- Provinces, templates, buildings, population, partners,
//!   settings and the per-turn snapshot
//! - [`record`] -- Per-record decoding and structural validation
//! - [`diagnostic`] -- Advisory messages returned with every turn

pub mod criteria;
pub mod diagnostic;
pub mod enums;
pub mod ids;
pub mod record;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use criteria::{CountCriteria, Malformed, NumericCriteria, TagCriteria};
pub use diagnostic::{Diagnostic, Diagnostics};
pub use enums::{BuildingStatus, DiagnosticCategory, SitingRequirement, TransportMode};
pub use ids::{BuildingName, CountryName, ProvinceId};
pub use record::{RawSnapshot, Record, RecordError, RecordKind};
pub use structs::{
    Building, BuildingModifiers, BuildingTemplate, Employment, PartnerTransport,
    PopulationGroup, ProfessionRequirement, Province, Settings, Snapshot, TradeAgreement,
    TradePartner, TransportInfrastructure, TransportInfrastructureRecord, TransportLink,
    TransportLinkRecord, TurnInput, normalize_tag, normalize_tags,
};
