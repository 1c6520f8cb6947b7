//! Enumeration types for the Provincia turn engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// A category of movement with its own per-province capacity.
///
/// Each mode connects provinces under different rules:
/// - `Land`: mutual neighbors sharing a planet
/// - `Water`: neighbors sharing a planet, through coasts and sea lanes
/// - `Air`: any two provinces sharing a planet
/// - `Space`: any two provinces, planets ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TransportMode {
    /// Roads and rail between adjacent provinces.
    Land,
    /// Shipping along coasts and sea lanes.
    Water,
    /// Flights within a planet.
    Air,
    /// Orbital links between any spaceports.
    Space,
}

impl TransportMode {
    /// Every mode, in arena order.
    pub const ALL: [Self; 4] = [Self::Land, Self::Water, Self::Air, Self::Space];

    /// The lowercase label used in tables and route strings.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Land => "land",
            Self::Water => "water",
            Self::Air => "air",
            Self::Space => "space",
        }
    }

    /// Position of this mode in [`Self::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Land => 0,
            Self::Water => 1,
            Self::Air => 2,
            Self::Space => 3,
        }
    }
}

impl core::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Buildings
// ---------------------------------------------------------------------------

/// Operating status of an existing building.
///
/// Only active buildings contribute transport infrastructure. Every status
/// counts towards neighborhood criteria and limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BuildingStatus {
    /// Running normally.
    #[serde(alias = "Active")]
    Active,
    /// Built but switched off.
    #[serde(alias = "Inactive")]
    Inactive,
    /// Still under construction.
    #[serde(alias = "UnderConstruction")]
    UnderConstruction,
    /// Any status this engine does not interpret.
    #[default]
    #[serde(other)]
    Unknown,
}

/// A siting requirement field of a building template.
///
/// The first five are tag-set criteria, the last three are numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SitingRequirement {
    /// `required_landscapes` against province landscapes.
    Landscapes,
    /// `required_planet` against province planet tags.
    Planet,
    /// `required_culture` against province cultures.
    Culture,
    /// `required_religion` against province religions.
    Religion,
    /// `required_climate` against province climates.
    Climate,
    /// `required_radiation` against province radiation.
    Radiation,
    /// `required_pollution` against province pollution.
    Pollution,
    /// `required_stability` against province stability.
    Stability,
}

impl SitingRequirement {
    /// Every requirement, in evaluation order.
    pub const ALL: [Self; 8] = [
        Self::Landscapes,
        Self::Planet,
        Self::Culture,
        Self::Religion,
        Self::Climate,
        Self::Radiation,
        Self::Pollution,
        Self::Stability,
    ];

    /// The template field carrying this requirement.
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Landscapes => "required_landscapes",
            Self::Planet => "required_planet",
            Self::Culture => "required_culture",
            Self::Religion => "required_religion",
            Self::Climate => "required_climate",
            Self::Radiation => "required_radiation",
            Self::Pollution => "required_pollution",
            Self::Stability => "required_stability",
        }
    }
}

impl core::fmt::Display for SitingRequirement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.field_name())
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Bucket a diagnostic belongs to.
///
/// The collaborator's turn log groups, deduplicates and caps messages per
/// category, so the label text is part of the output contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DiagnosticCategory {
    /// Siting results: where a template can be built, or which requirements failed.
    Siting,
    /// A stage removed provinces from a template's candidate lists.
    TemplatesNarrowed,
    /// A province was removed because a building limit has been reached.
    LimitExceeded,
    /// A province was removed for lack of arable land or workers.
    ResourceGate,
    /// A record failed structural validation and was skipped.
    MalformedEntity,
    /// A record refers to a province or template that does not exist.
    MissingReference,
    /// A criteria node is malformed and evaluated to false.
    CriteriaDefect,
    /// Routes and quantities found by the transport solver.
    Transport,
    /// A province has no transport path to its hub.
    UnreachableProvince,
    /// Partner corridor results.
    PartnerRoute,
    /// Stage faults and timings.
    System,
}

impl DiagnosticCategory {
    /// The prefix label shown in the turn log.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Siting => "siting",
            Self::TemplatesNarrowed => "templates narrowed",
            Self::LimitExceeded => "limit exceeded",
            Self::ResourceGate => "resource gate",
            Self::MalformedEntity => "malformed entity",
            Self::MissingReference => "missing reference",
            Self::CriteriaDefect => "criteria defect",
            Self::Transport => "transport",
            Self::UnreachableProvince => "unreachable province",
            Self::PartnerRoute => "partner route",
            Self::System => "system",
        }
    }
}

impl core::fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
