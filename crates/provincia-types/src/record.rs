//! Per-record decoding and structural validation.
//!
//! Each record is decoded and checked on its own. A bad record yields a
//! [`RecordError`] and is left out; the rest of the table still loads.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::DiagnosticCategory;
use crate::structs::{
    Building, BuildingTemplate, PopulationGroup, Province, Settings, Snapshot, TradePartner,
};

/// The table a record comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    /// A province.
    Province,
    /// A building template.
    Template,
    /// A building.
    Building,
    /// A population group.
    PopulationGroup,
    /// A trade partner record.
    TradePartner,
}

impl core::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Province => "province",
            Self::Template => "template",
            Self::Building => "building",
            Self::PopulationGroup => "population group",
            Self::TradePartner => "trade partner",
        })
    }
}

/// Why a record was skipped or corrected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// The record failed to decode or failed structural validation.
    #[error("{kind} #{index} skipped: {reason}")]
    MalformedEntity {
        /// Source table.
        kind: RecordKind,
        /// Zero-based position in the source table.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// The record refers to something absent from the snapshot.
    #[error("{kind} #{index} skipped: unknown {target} \"{id}\"")]
    MissingReference {
        /// Source table.
        kind: RecordKind,
        /// Zero-based position in the source table.
        index: usize,
        /// What kind of thing is missing.
        target: &'static str,
        /// The missing identifier.
        id: String,
    },

    /// The record was kept after an inconsistent field was corrected.
    #[error("{kind} #{index} corrected: {reason}")]
    Corrected {
        /// Source table.
        kind: RecordKind,
        /// Zero-based position in the source table.
        index: usize,
        /// What was changed.
        reason: String,
    },
}

impl RecordError {
    /// The diagnostic bucket for this error.
    pub const fn category(&self) -> DiagnosticCategory {
        match self {
            Self::MalformedEntity { .. } | Self::Corrected { .. } => {
                DiagnosticCategory::MalformedEntity
            }
            Self::MissingReference { .. } => DiagnosticCategory::MissingReference,
        }
    }
}

/// A record type with structural rules beyond what decoding enforces.
pub trait Record: Sized {
    /// The table this record type comes from.
    const KIND: RecordKind;

    /// Check structural rules, returning the reason on failure.
    fn check(&self) -> Result<(), String>;

    /// Check, wrapping a failure as a [`RecordError::MalformedEntity`].
    fn validate(self, index: usize) -> Result<Self, RecordError> {
        match self.check() {
            Ok(()) => Ok(self),
            Err(reason) => Err(RecordError::MalformedEntity {
                kind: Self::KIND,
                index,
                reason,
            }),
        }
    }
}

impl Record for Province {
    const KIND: RecordKind = RecordKind::Province;

    fn check(&self) -> Result<(), String> {
        if self.id.is_blank() {
            return Err("missing \"id\"".to_owned());
        }
        if self.free_arable_land.is_sign_negative() {
            return Err(format!("province {} has negative free_arable_land", self.id));
        }
        Ok(())
    }
}

impl Record for BuildingTemplate {
    const KIND: RecordKind = RecordKind::Template;

    fn check(&self) -> Result<(), String> {
        if self.name.is_blank() {
            return Err("missing \"name\"".to_owned());
        }
        Ok(())
    }
}

impl Record for Building {
    const KIND: RecordKind = RecordKind::Building;

    fn check(&self) -> Result<(), String> {
        if self.building_name.is_blank() {
            return Err("missing \"building_name\"".to_owned());
        }
        if self.province_id.is_blank() {
            return Err(format!("building {} has no \"province_id\"", self.building_name));
        }
        Ok(())
    }
}

impl Record for PopulationGroup {
    const KIND: RecordKind = RecordKind::PopulationGroup;

    fn check(&self) -> Result<(), String> {
        match &self.province_id {
            Some(id) if !id.is_blank() => Ok(()),
            _ => Err("missing \"province_id\"".to_owned()),
        }
    }
}

impl Record for TradePartner {
    const KIND: RecordKind = RecordKind::TradePartner;

    fn check(&self) -> Result<(), String> {
        if self.country.is_blank() {
            return Err("missing \"country\"".to_owned());
        }
        Ok(())
    }
}

/// Decode one table, keeping every record that decodes and validates.
pub fn decode_table<T>(rows: Vec<Value>, errors: &mut Vec<RecordError>) -> Vec<T>
where
    T: Record + DeserializeOwned,
{
    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let decoded = serde_json::from_value::<T>(row)
            .map_err(|err| RecordError::MalformedEntity {
                kind: T::KIND,
                index,
                reason: err.to_string(),
            })
            .and_then(|record| record.validate(index));
        match decoded {
            Ok(record) => records.push(record),
            Err(err) => errors.push(err),
        }
    }
    records
}

/// A snapshot whose tables have not been decoded yet.
///
/// Decoding tables record by record keeps one bad row from discarding the
/// whole table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    /// Province rows.
    #[serde(default)]
    pub provinces: Vec<Value>,
    /// Template rows.
    #[serde(default, alias = "building_templates")]
    pub templates: Vec<Value>,
    /// Building rows.
    #[serde(default)]
    pub buildings: Vec<Value>,
    /// Population group rows.
    #[serde(default)]
    pub population: Vec<Value>,
    /// World settings.
    #[serde(default)]
    pub settings: Settings,
    /// Partner trade record rows.
    #[serde(default)]
    pub trade_partners: Vec<Value>,
}

impl RawSnapshot {
    /// Decode every table, collecting one error per rejected row.
    pub fn decode(self) -> (Snapshot, Vec<RecordError>) {
        let mut errors = Vec::new();
        let snapshot = Snapshot {
            provinces: decode_table(self.provinces, &mut errors),
            templates: decode_table(self.templates, &mut errors),
            buildings: decode_table(self.buildings, &mut errors),
            population: decode_table(self.population, &mut errors),
            settings: self.settings,
            trade_partners: decode_table(self.trade_partners, &mut errors),
        };
        (snapshot, errors)
    }
}
