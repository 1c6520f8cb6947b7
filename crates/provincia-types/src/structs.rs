//! Records exchanged with the collaborator.
//!
//! Field names follow the collaborator's JSON tables. Fields this engine does
//! not interpret are kept in an `extra` map so that records written back
//! after a turn lose nothing.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::criteria::{CountCriteria, NumericCriteria, TagCriteria};
use crate::enums::{BuildingStatus, SitingRequirement, TransportMode};
use crate::ids::{BuildingName, CountryName, ProvinceId};

/// Case-folds a tag for comparison: trimmed and lowercased.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Normalizes every tag of a list into a set.
pub fn normalize_tags<'a>(tags: impl IntoIterator<Item = &'a String>) -> BTreeSet<String> {
    tags.into_iter().map(|tag| normalize_tag(tag)).collect()
}

/// Accepts a list of strings, a single comma-separated string, or null.
///
/// Hand-edited tables carry both `"Forest, Hills"` and `["Forest", "Hills"]`.
fn tag_list<'de, D, T>(deserializer: D) -> Result<BTreeSet<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String> + Ord,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        List(Vec<String>),
    }

    let parsed = Option::<Repr>::deserialize(deserializer)?;
    let items = match parsed {
        None => Vec::new(),
        Some(Repr::Text(text)) => text.split(',').map(str::to_owned).collect(),
        Some(Repr::List(list)) => list,
    };
    Ok(items
        .into_iter()
        .map(|item| item.trim().to_owned())
        .filter(|item| !item.is_empty())
        .map(T::from)
        .collect())
}

// ---------------------------------------------------------------------------
// Transport infrastructure
// ---------------------------------------------------------------------------

/// Capacity and computed availability of one transport mode in one place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportLink {
    /// Resource category -> quantity the mode can carry.
    pub capacity: BTreeMap<String, Decimal>,
    /// Resource category -> quantity deliverable to the hub. Engine output.
    pub available: BTreeMap<String, Decimal>,
}

/// Per-mode transport capacity of a province or a building template.
///
/// On the wire this is `{"types": [{"type": "land", "capacity": {...},
/// "available": {...}}, ...]}`. In memory it is keyed by mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TransportInfrastructureRecord", into = "TransportInfrastructureRecord")]
pub struct TransportInfrastructure {
    links: BTreeMap<TransportMode, TransportLink>,
}

impl TransportInfrastructure {
    /// The link for a mode, if the mode is present.
    pub fn link(&self, mode: TransportMode) -> Option<&TransportLink> {
        self.links.get(&mode)
    }

    /// The link for a mode, created empty when absent.
    pub fn link_mut(&mut self, mode: TransportMode) -> &mut TransportLink {
        self.links.entry(mode).or_default()
    }

    /// Iterate over present modes.
    pub fn links(&self) -> impl Iterator<Item = (&TransportMode, &TransportLink)> {
        self.links.iter()
    }

    /// Iterate mutably over present modes.
    pub fn links_mut(&mut self) -> impl Iterator<Item = (&TransportMode, &mut TransportLink)> {
        self.links.iter_mut()
    }

    /// Capacity of a mode for a resource; zero when unset.
    pub fn capacity(&self, mode: TransportMode, resource: &str) -> Decimal {
        self.links
            .get(&mode)
            .and_then(|link| link.capacity.get(resource))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Availability of a mode for a resource; zero when unset.
    pub fn available(&self, mode: TransportMode, resource: &str) -> Decimal {
        self.links
            .get(&mode)
            .and_then(|link| link.available.get(resource))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Overwrite the availability of a mode for a resource.
    pub fn set_available(&mut self, mode: TransportMode, resource: &str, quantity: Decimal) {
        self.link_mut(mode)
            .available
            .insert(resource.to_owned(), quantity);
    }

    /// Whether any mode has positive capacity for any resource.
    pub fn has_any_capacity(&self) -> bool {
        self.links
            .values()
            .any(|link| link.capacity.values().any(|quantity| *quantity > Decimal::ZERO))
    }
}

/// Wire form of [`TransportInfrastructure`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TransportInfrastructureRecord {
    /// One entry per transport mode.
    #[serde(default)]
    pub types: Vec<TransportLinkRecord>,
}

/// Wire form of one [`TransportLink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TransportLinkRecord {
    /// The mode this entry describes.
    #[serde(rename = "type")]
    pub mode: TransportMode,
    /// Resource category -> capacity.
    #[serde(default)]
    #[ts(as = "BTreeMap<String, f64>")]
    pub capacity: BTreeMap<String, Decimal>,
    /// Resource category -> computed availability.
    #[serde(default)]
    #[ts(as = "BTreeMap<String, f64>")]
    pub available: BTreeMap<String, Decimal>,
}

impl From<TransportInfrastructureRecord> for TransportInfrastructure {
    fn from(record: TransportInfrastructureRecord) -> Self {
        let mut links: BTreeMap<TransportMode, TransportLink> = BTreeMap::new();
        // Repeated entries for one mode merge; later keys win.
        for entry in record.types {
            let link = links.entry(entry.mode).or_default();
            link.capacity.extend(entry.capacity);
            link.available.extend(entry.available);
        }
        Self { links }
    }
}

impl From<TransportInfrastructure> for TransportInfrastructureRecord {
    fn from(infrastructure: TransportInfrastructure) -> Self {
        Self {
            types: infrastructure
                .links
                .into_iter()
                .map(|(mode, link)| TransportLinkRecord {
                    mode,
                    capacity: link.capacity,
                    available: link.available,
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Province
// ---------------------------------------------------------------------------

/// A province: a map cell with ownership, terrain and transport capacity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Province {
    /// Unique province identifier.
    pub id: ProvinceId,
    /// Owning state. Blank for unowned provinces.
    #[serde(default)]
    pub owner: CountryName,
    /// Terrain tags.
    #[serde(default, deserialize_with = "tag_list")]
    #[ts(type = "Array<string> | string | null")]
    pub landscapes: BTreeSet<String>,
    /// Adjacent provinces.
    #[serde(default, deserialize_with = "tag_list")]
    #[ts(type = "Array<string> | string | null")]
    pub neighbors: BTreeSet<ProvinceId>,
    /// Planet tags. Provinces sharing none connect only through space.
    #[serde(default, deserialize_with = "tag_list")]
    #[ts(type = "Array<string> | string | null")]
    pub planet: BTreeSet<String>,
    /// Culture tags.
    #[serde(default, deserialize_with = "tag_list")]
    #[ts(type = "Array<string> | string | null")]
    pub culture: BTreeSet<String>,
    /// Religion tags.
    #[serde(default, deserialize_with = "tag_list")]
    #[ts(type = "Array<string> | string | null")]
    pub religion: BTreeSet<String>,
    /// Climate tags.
    #[serde(default, deserialize_with = "tag_list")]
    #[ts(type = "Array<string> | string | null")]
    pub climate: BTreeSet<String>,
    /// Radiation level.
    #[serde(default, alias = "rad", skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<f64>")]
    pub radiation: Option<Decimal>,
    /// Pollution level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<f64>")]
    pub pollution: Option<Decimal>,
    /// Stability level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<f64>")]
    pub stability: Option<Decimal>,
    /// Whether this is its owner's capital. At most one per state.
    #[serde(default)]
    pub is_capital: bool,
    /// Arable land not yet in use.
    #[serde(default)]
    #[ts(as = "f64")]
    pub free_arable_land: Decimal,
    /// Per-mode capacity and computed availability.
    #[serde(default)]
    #[ts(as = "TransportInfrastructureRecord")]
    pub transport_infrastructure: TransportInfrastructure,
    /// Fields not interpreted by the engine.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: BTreeMap<String, Value>,
}

impl Province {
    /// The tag set a tag-set siting requirement is evaluated against.
    ///
    /// Returns `None` for numeric requirements.
    pub const fn tags_for(&self, requirement: SitingRequirement) -> Option<&BTreeSet<String>> {
        match requirement {
            SitingRequirement::Landscapes => Some(&self.landscapes),
            SitingRequirement::Planet => Some(&self.planet),
            SitingRequirement::Culture => Some(&self.culture),
            SitingRequirement::Religion => Some(&self.religion),
            SitingRequirement::Climate => Some(&self.climate),
            SitingRequirement::Radiation
            | SitingRequirement::Pollution
            | SitingRequirement::Stability => None,
        }
    }

    /// The scalar a numeric siting requirement is evaluated against.
    pub const fn scalar_for(&self, requirement: SitingRequirement) -> Option<Decimal> {
        match requirement {
            SitingRequirement::Radiation => self.radiation,
            SitingRequirement::Pollution => self.pollution,
            SitingRequirement::Stability => self.stability,
            SitingRequirement::Landscapes
            | SitingRequirement::Planet
            | SitingRequirement::Culture
            | SitingRequirement::Religion
            | SitingRequirement::Climate => None,
        }
    }

    /// Whether this province is owned by `state`.
    pub fn is_owned_by(&self, state: &CountryName) -> bool {
        !self.owner.is_blank() && self.owner.same_as(state)
    }

    /// Whether any landscape of this province is in `normalized` (already case-folded).
    pub fn has_landscape_in(&self, normalized: &BTreeSet<String>) -> bool {
        self.landscapes
            .iter()
            .any(|landscape| normalized.contains(&normalize_tag(landscape)))
    }

    /// Whether the two provinces share at least one planet tag.
    pub fn shares_planet_with(&self, other: &Self) -> bool {
        let ours = normalize_tags(&self.planet);
        other
            .planet
            .iter()
            .any(|planet| ours.contains(&normalize_tag(planet)))
    }
}

// ---------------------------------------------------------------------------
// Building templates and buildings
// ---------------------------------------------------------------------------

/// A worker requirement for one profession.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProfessionRequirement {
    /// Profession name.
    #[serde(default)]
    pub profession: String,
    /// Workers of that profession needed.
    #[serde(default)]
    #[ts(as = "f64")]
    pub quantity: Decimal,
}

/// The specification of a building type.
///
/// Siting, neighborhood and limit fields are inputs. The four province lists
/// at the bottom are recomputed every turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BuildingTemplate {
    /// Building type name.
    pub name: BuildingName,

    /// Criteria over province landscapes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<Value>")]
    pub required_landscapes: Option<TagCriteria>,
    /// Criteria over province planet tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<Value>")]
    pub required_planet: Option<TagCriteria>,
    /// Criteria over province cultures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<Value>")]
    pub required_culture: Option<TagCriteria>,
    /// Criteria over province religions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<Value>")]
    pub required_religion: Option<TagCriteria>,
    /// Criteria over province climates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<Value>")]
    pub required_climate: Option<TagCriteria>,
    /// Criteria over province radiation.
    #[serde(default, alias = "required_rad", skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<Value>")]
    pub required_radiation: Option<NumericCriteria>,
    /// Criteria over province pollution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<Value>")]
    pub required_pollution: Option<NumericCriteria>,
    /// Criteria over province stability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<Value>")]
    pub required_stability: Option<NumericCriteria>,

    /// Criteria over building tallies of the evaluating state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<Value>")]
    pub state_required_buildings: Option<CountCriteria>,
    /// Criteria over building tallies of the candidate province.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<Value>")]
    pub province_required_buildings: Option<CountCriteria>,

    /// Maximum buildings of this name per province.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province_limit: Option<u64>,
    /// Maximum buildings of this name per state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_limit: Option<u64>,
    /// Maximum buildings of this name in the world.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_limit: Option<u64>,

    /// Free arable land a candidate province needs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<f64>")]
    pub required_arable_land: Option<Decimal>,
    /// Unemployed workers a candidate province needs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<f64>")]
    pub required_workers: Option<Decimal>,
    /// Per-profession worker needs. When non-empty, their sum replaces `required_workers`.
    #[serde(default)]
    pub required_workers_professions: Vec<ProfessionRequirement>,

    /// Transport capacity one active building of this type contributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<TransportInfrastructureRecord>")]
    pub transport_infrastructure: Option<TransportInfrastructure>,

    /// Candidate provinces owned by the evaluating state.
    #[serde(default)]
    pub matching_provinces_state: Vec<ProvinceId>,
    /// Candidate provinces owned by anyone else.
    #[serde(default)]
    pub matching_provinces_others: Vec<ProvinceId>,
    /// Published copy of `matching_provinces_state`.
    #[serde(default)]
    pub allowed_building_state: Vec<ProvinceId>,
    /// Published copy of `matching_provinces_others`.
    #[serde(default)]
    pub allowed_building_others: Vec<ProvinceId>,

    /// Fields not interpreted by the engine.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: BTreeMap<String, Value>,
}

impl BuildingTemplate {
    /// The tag-set criteria for a siting requirement, if defined.
    pub const fn tag_criteria(&self, requirement: SitingRequirement) -> Option<&TagCriteria> {
        match requirement {
            SitingRequirement::Landscapes => self.required_landscapes.as_ref(),
            SitingRequirement::Planet => self.required_planet.as_ref(),
            SitingRequirement::Culture => self.required_culture.as_ref(),
            SitingRequirement::Religion => self.required_religion.as_ref(),
            SitingRequirement::Climate => self.required_climate.as_ref(),
            SitingRequirement::Radiation
            | SitingRequirement::Pollution
            | SitingRequirement::Stability => None,
        }
    }

    /// The numeric criteria for a siting requirement, if defined.
    pub const fn numeric_criteria(&self, requirement: SitingRequirement) -> Option<&NumericCriteria> {
        match requirement {
            SitingRequirement::Radiation => self.required_radiation.as_ref(),
            SitingRequirement::Pollution => self.required_pollution.as_ref(),
            SitingRequirement::Stability => self.required_stability.as_ref(),
            SitingRequirement::Landscapes
            | SitingRequirement::Planet
            | SitingRequirement::Culture
            | SitingRequirement::Religion
            | SitingRequirement::Climate => None,
        }
    }

    /// Workers a site must have unemployed.
    ///
    /// The sum of non-negative profession quantities when professions are
    /// listed, otherwise `required_workers`, otherwise zero. Never negative.
    pub fn effective_required_workers(&self) -> Decimal {
        if self.required_workers_professions.is_empty() {
            return self
                .required_workers
                .unwrap_or(Decimal::ZERO)
                .max(Decimal::ZERO);
        }
        self.required_workers_professions
            .iter()
            .map(|requirement| requirement.quantity)
            .filter(|quantity| !quantity.is_sign_negative())
            .fold(Decimal::ZERO, |total, quantity| total.saturating_add(quantity))
    }

    /// Arable land a site must have free. Never negative.
    pub fn effective_required_arable_land(&self) -> Decimal {
        self.required_arable_land
            .unwrap_or(Decimal::ZERO)
            .max(Decimal::ZERO)
    }
}

/// Modifiers applied to an individual building.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BuildingModifiers {
    /// Multiplier on the transport capacity the building contributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<f64>")]
    pub transport_efficiency: Option<Decimal>,
    /// Modifiers not interpreted by the engine.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: BTreeMap<String, Value>,
}

/// An existing building.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Building {
    /// Template name this building was built from.
    pub building_name: BuildingName,
    /// State that owns the building.
    #[serde(default)]
    pub building_owner: CountryName,
    /// Province the building stands in.
    pub province_id: ProvinceId,
    /// Operating status.
    ///
    /// Read leniently: PascalCase spellings are accepted and anything
    /// unrecognised becomes [`BuildingStatus::Unknown`], so the binding is a
    /// plain string.
    #[serde(default)]
    #[ts(type = "string")]
    pub status: BuildingStatus,
    /// Upgrade level. Treated as 1 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<f64>")]
    pub building_level: Option<Decimal>,
    /// Per-building modifiers.
    #[serde(default)]
    pub building_modifiers: BuildingModifiers,
    /// Fields not interpreted by the engine.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: BTreeMap<String, Value>,
}

// ---------------------------------------------------------------------------
// Population
// ---------------------------------------------------------------------------

/// Employment figures of a population group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Employment {
    /// Working-age members without a job.
    #[serde(default)]
    #[ts(as = "f64")]
    pub unemployed_workers: Decimal,
}

/// A population group living in one province.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PopulationGroup {
    /// Province the group lives in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province_id: Option<ProvinceId>,
    /// Employment figures.
    #[serde(default)]
    pub employment: Employment,
    /// Fields not interpreted by the engine.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: BTreeMap<String, Value>,
}

// ---------------------------------------------------------------------------
// Trade partners
// ---------------------------------------------------------------------------

/// A trade agreement naming a partner state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TradeAgreement {
    /// The partner state.
    pub country: CountryName,
}

/// Transport totals towards a partner's capital.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PartnerTransport {
    /// Resource category -> quantity deliverable to the partner capital.
    #[serde(default)]
    #[ts(as = "BTreeMap<String, f64>")]
    pub available: BTreeMap<String, Decimal>,
}

/// The evaluating state's trade record for one partner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TradePartner {
    /// The partner state.
    pub country: CountryName,
    /// Corridor capacity towards the partner capital. Engine output.
    #[serde(default)]
    pub total_transport: PartnerTransport,
    /// Fields not interpreted by the engine.
    #[serde(flatten)]
    #[ts(skip)]
    pub extra: BTreeMap<String, Value>,
}

// ---------------------------------------------------------------------------
// Settings, snapshot and turn input
// ---------------------------------------------------------------------------

/// World settings supplied by the collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Settings {
    /// Enabled transport modes.
    #[serde(default)]
    pub transport_modes: Vec<TransportMode>,
    /// Resource categories moved by the transport network.
    #[serde(default)]
    pub resource_categories: Vec<String>,
    /// Mode -> landscapes a province needs to host that mode. Empty means any.
    #[serde(default, alias = "route_landscapes")]
    pub permitted_terrain: BTreeMap<TransportMode, Vec<String>>,
    /// Landscapes that make a province coastal.
    #[serde(default)]
    pub coastal_landscapes: Vec<String>,
    /// Landscapes that relay water transport without limit.
    #[serde(default)]
    pub sea_routes_landscapes: Vec<String>,
}

/// One turn's worth of decoded tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Snapshot {
    /// All provinces in the world.
    #[serde(default)]
    pub provinces: Vec<Province>,
    /// All building templates.
    #[serde(default, alias = "building_templates")]
    pub templates: Vec<BuildingTemplate>,
    /// All existing buildings.
    #[serde(default)]
    pub buildings: Vec<Building>,
    /// All population groups.
    #[serde(default)]
    pub population: Vec<PopulationGroup>,
    /// World settings.
    #[serde(default)]
    pub settings: Settings,
    /// The evaluating state's partner trade records.
    #[serde(default)]
    pub trade_partners: Vec<TradePartner>,
}

/// Who is evaluating the turn and whom they can route through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TurnInput {
    /// The evaluating state.
    pub state_name: CountryName,
    /// Foreign states whose provinces domestic transport may cross.
    #[serde(default)]
    pub accessible_countries: Vec<CountryName>,
    /// Partners that get a corridor computation.
    #[serde(default)]
    pub trade_agreements: Vec<TradeAgreement>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[test]
    fn bindings_describe_lenient_inputs() {
        let province = Province::decl();
        assert!(province.contains("landscapes: Array<string> | string | null"));
        assert!(province.contains("neighbors: Array<string> | string | null"));
        assert!(Building::decl().contains("status: string"));
    }

    #[test]
    fn province_accepts_comma_separated_tags() {
        let province: Province = serde_json::from_value(json!({
            "id": "P1",
            "owner": "Avalon",
            "landscapes": "Forest, Hills",
            "neighbors": ["P2", " P3 "],
            "planet": null,
            "rad": 4
        }))
        .unwrap();
        assert_eq!(
            province.landscapes,
            BTreeSet::from(["Forest".to_owned(), "Hills".to_owned()])
        );
        assert!(province.neighbors.contains("P3"));
        assert!(province.planet.is_empty());
        assert_eq!(province.radiation, Some(dec!(4)));
    }

    #[test]
    fn unknown_province_fields_survive_a_round_trip() {
        let raw = json!({"id": "P1", "owner": "Avalon", "population": 1200});
        let province: Province = serde_json::from_value(raw).unwrap();
        let written = serde_json::to_value(&province).unwrap();
        assert_eq!(written.get("population"), Some(&json!(1200)));
    }

    #[test]
    fn transport_infrastructure_uses_the_types_list() {
        let province: Province = serde_json::from_value(json!({
            "id": "P1",
            "transport_infrastructure": {"types": [
                {"type": "land", "capacity": {"goods": 10}, "available": {"goods": 0}},
                {"type": "air", "capacity": {"goods": 2.5}}
            ]}
        }))
        .unwrap();
        let infra = &province.transport_infrastructure;
        assert_eq!(infra.capacity(TransportMode::Land, "goods"), dec!(10));
        assert_eq!(infra.capacity(TransportMode::Air, "goods"), dec!(2.5));
        assert_eq!(infra.capacity(TransportMode::Water, "goods"), Decimal::ZERO);
        assert!(infra.has_any_capacity());

        let written = serde_json::to_value(&province).unwrap();
        let types = written["transport_infrastructure"]["types"].as_array().unwrap();
        assert_eq!(types.len(), 2);
        assert_eq!(types[0]["type"], json!("land"));
    }

    #[test]
    fn template_criteria_fields_parse() {
        let template: BuildingTemplate = serde_json::from_value(json!({
            "name": "Sawmill",
            "required_landscapes": {"AND": ["Forest"]},
            "required_rad": {"LESS_THAN": 5},
            "province_limit": 1
        }))
        .unwrap();
        assert!(matches!(template.required_landscapes, Some(TagCriteria::And(_))));
        assert_eq!(template.required_radiation, Some(NumericCriteria::LessThan(dec!(5))));
        assert_eq!(template.province_limit, Some(1));
        assert!(template.matching_provinces_state.is_empty());
    }

    #[test]
    fn professions_replace_required_workers() {
        let template: BuildingTemplate = serde_json::from_value(json!({
            "name": "Mine",
            "required_workers": 50,
            "required_workers_professions": [
                {"profession": "miner", "quantity": 30},
                {"profession": "engineer", "quantity": 5},
                {"profession": "ghost", "quantity": -4}
            ]
        }))
        .unwrap();
        assert_eq!(template.effective_required_workers(), dec!(35));

        let template: BuildingTemplate =
            serde_json::from_value(json!({"name": "Hut", "required_workers": -3})).unwrap();
        assert_eq!(template.effective_required_workers(), Decimal::ZERO);
    }

    #[test]
    fn planets_are_compared_case_insensitively() {
        let a = Province {
            planet: BTreeSet::from(["Terra".to_owned()]),
            ..Province::default()
        };
        let b = Province {
            planet: BTreeSet::from(["terra ".to_owned(), "Luna".to_owned()]),
            ..Province::default()
        };
        let c = Province::default();
        assert!(a.shares_planet_with(&b));
        assert!(!a.shares_planet_with(&c));
    }

    #[test]
    fn ownership_ignores_case_and_blank_owners() {
        let province = Province {
            owner: CountryName::from("Avalon"),
            ..Province::default()
        };
        assert!(province.is_owned_by(&CountryName::from("avalon")));
        let unowned = Province::default();
        assert!(!unowned.is_owned_by(&CountryName::from("")));
    }
}
