//! The per-turn entity store.
//!
//! A [`Repository`] owns every table of one turn's snapshot and is passed by
//! reference through the pipeline. Provinces live in an arena (`Vec`) with a
//! `ProvinceId -> index` map, so the transport graph can address them by
//! index.
//!
//! Loading validates records one at a time. Rejected records are returned as
//! [`RecordError`]s for the caller to turn into diagnostics; they never abort
//! the load.

use std::collections::{BTreeMap, BTreeSet};

use provincia_types::{
    Building, BuildingName, BuildingTemplate, CountryName, PopulationGroup, Province, ProvinceId,
    Record, RecordError, RecordKind, Settings, Snapshot, TradePartner,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::WorldError;

/// All tables of one turn, validated and indexed.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    /// Province arena.
    provinces: Vec<Province>,
    /// Province id -> arena index.
    province_index: BTreeMap<ProvinceId, usize>,
    /// Building templates. Several may share a name.
    templates: Vec<BuildingTemplate>,
    /// Buildings whose province and template both exist.
    buildings: Vec<Building>,
    /// Population groups whose province exists.
    population: Vec<PopulationGroup>,
    /// World settings.
    settings: Settings,
    /// The evaluating state's partner trade records.
    trade_partners: Vec<TradePartner>,
}

impl Repository {
    /// Create an empty repository with the given settings.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Build a repository from a decoded snapshot.
    ///
    /// Returns the repository and every record that was skipped or
    /// corrected along the way:
    /// - provinces with a blank or duplicate id are skipped
    /// - a second capital of the same owner loses its `is_capital` flag
    /// - buildings in unknown provinces or of unknown templates are skipped
    /// - population groups in unknown provinces are skipped
    ///
    /// Every province gets a zero entry for each configured mode and
    /// resource in both `capacity` and `available`.
    pub fn load(snapshot: Snapshot) -> (Self, Vec<RecordError>) {
        let mut errors = Vec::new();
        let mut repo = Self::new(snapshot.settings);

        let mut capitals: BTreeSet<String> = BTreeSet::new();
        for (index, province) in snapshot.provinces.into_iter().enumerate() {
            let mut province = match province.validate(index) {
                Ok(province) => province,
                Err(err) => {
                    errors.push(err);
                    continue;
                }
            };
            if repo.province_index.contains_key(&province.id) {
                errors.push(RecordError::MalformedEntity {
                    kind: RecordKind::Province,
                    index,
                    reason: format!("duplicate province id {}", province.id),
                });
                continue;
            }
            if province.is_capital && !capitals.insert(province.owner.key()) {
                province.is_capital = false;
                errors.push(RecordError::Corrected {
                    kind: RecordKind::Province,
                    index,
                    reason: format!(
                        "{} is a second capital of \"{}\"; is_capital ignored",
                        province.id, province.owner
                    ),
                });
            }
            repo.normalize_transport(&mut province);
            repo.province_index
                .insert(province.id.clone(), repo.provinces.len());
            repo.provinces.push(province);
        }

        for (index, template) in snapshot.templates.into_iter().enumerate() {
            match template.validate(index) {
                Ok(template) => repo.templates.push(template),
                Err(err) => errors.push(err),
            }
        }
        let template_names: BTreeSet<BuildingName> =
            repo.templates.iter().map(|t| t.name.clone()).collect();

        for (index, building) in snapshot.buildings.into_iter().enumerate() {
            let building = match building.validate(index) {
                Ok(building) => building,
                Err(err) => {
                    errors.push(err);
                    continue;
                }
            };
            if !repo.province_index.contains_key(&building.province_id) {
                errors.push(RecordError::MissingReference {
                    kind: RecordKind::Building,
                    index,
                    target: "province",
                    id: building.province_id.to_string(),
                });
                continue;
            }
            if !template_names.contains(&building.building_name) {
                errors.push(RecordError::MissingReference {
                    kind: RecordKind::Building,
                    index,
                    target: "template",
                    id: building.building_name.to_string(),
                });
                continue;
            }
            repo.buildings.push(building);
        }

        for (index, group) in snapshot.population.into_iter().enumerate() {
            let group = match group.validate(index) {
                Ok(group) => group,
                Err(err) => {
                    errors.push(err);
                    continue;
                }
            };
            if let Some(province) = &group.province_id
                && !repo.province_index.contains_key(province)
            {
                errors.push(RecordError::MissingReference {
                    kind: RecordKind::PopulationGroup,
                    index,
                    target: "province",
                    id: province.to_string(),
                });
                continue;
            }
            repo.population.push(group);
        }

        for (index, partner) in snapshot.trade_partners.into_iter().enumerate() {
            match partner.validate(index) {
                Ok(partner) => repo.trade_partners.push(partner),
                Err(err) => errors.push(err),
            }
        }

        debug!(
            provinces = repo.provinces.len(),
            templates = repo.templates.len(),
            buildings = repo.buildings.len(),
            rejected = errors.len(),
            "Repository loaded"
        );
        (repo, errors)
    }

    /// Give a province a zero entry for every configured mode and resource.
    fn normalize_transport(&self, province: &mut Province) {
        for mode in &self.settings.transport_modes {
            let link = province.transport_infrastructure.link_mut(*mode);
            for resource in &self.settings.resource_categories {
                link.capacity
                    .entry(resource.clone())
                    .or_insert(Decimal::ZERO);
                link.available
                    .entry(resource.clone())
                    .or_insert(Decimal::ZERO);
            }
        }
    }

    /// Hand the tables back in snapshot form.
    pub fn into_snapshot(self) -> Snapshot {
        Snapshot {
            provinces: self.provinces,
            templates: self.templates,
            buildings: self.buildings,
            population: self.population,
            settings: self.settings,
            trade_partners: self.trade_partners,
        }
    }

    // -------------------------------------------------------------------
    // Provinces
    // -------------------------------------------------------------------

    /// Add a province after loading.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MalformedEntity`] for an invalid province or a
    /// duplicate id.
    pub fn add_province(&mut self, province: Province) -> Result<usize, RecordError> {
        let index = self.provinces.len();
        let mut province = province.validate(index)?;
        if self.province_index.contains_key(&province.id) {
            return Err(RecordError::MalformedEntity {
                kind: RecordKind::Province,
                index,
                reason: format!("duplicate province id {}", province.id),
            });
        }
        self.normalize_transport(&mut province);
        self.province_index.insert(province.id.clone(), index);
        self.provinces.push(province);
        Ok(index)
    }

    /// All provinces in arena order.
    pub fn provinces(&self) -> &[Province] {
        &self.provinces
    }

    /// Number of provinces.
    pub fn province_count(&self) -> usize {
        self.provinces.len()
    }

    /// Look up a province by id.
    pub fn province(&self, id: &str) -> Option<&Province> {
        self.province_index
            .get(id)
            .and_then(|index| self.provinces.get(*index))
    }

    /// Look up a province mutably by id.
    pub fn province_mut(&mut self, id: &str) -> Option<&mut Province> {
        let index = *self.province_index.get(id)?;
        self.provinces.get_mut(index)
    }

    /// Arena index of a province.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.province_index.get(id).copied()
    }

    /// Province at an arena index.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ProvinceIndexOutOfRange`] for a stale index.
    pub fn province_at(&self, index: usize) -> Result<&Province, WorldError> {
        self.provinces
            .get(index)
            .ok_or(WorldError::ProvinceIndexOutOfRange(index))
    }

    /// Province at an arena index, mutably.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ProvinceIndexOutOfRange`] for a stale index.
    pub fn province_at_mut(&mut self, index: usize) -> Result<&mut Province, WorldError> {
        self.provinces
            .get_mut(index)
            .ok_or(WorldError::ProvinceIndexOutOfRange(index))
    }

    /// Arena indices of every province owned by `state`, ascending.
    pub fn indices_owned_by(&self, state: &CountryName) -> Vec<usize> {
        self.provinces
            .iter()
            .enumerate()
            .filter(|(_, province)| province.is_owned_by(state))
            .map(|(index, _)| index)
            .collect()
    }

    /// Arena index of `state`'s capital, if it has one.
    pub fn capital_of(&self, state: &CountryName) -> Option<usize> {
        self.provinces
            .iter()
            .position(|province| province.is_capital && province.is_owned_by(state))
    }

    // -------------------------------------------------------------------
    // Templates, buildings, population
    // -------------------------------------------------------------------

    /// All building templates.
    pub fn templates(&self) -> &[BuildingTemplate] {
        &self.templates
    }

    /// All building templates, mutably.
    pub fn templates_mut(&mut self) -> &mut [BuildingTemplate] {
        &mut self.templates
    }

    /// All buildings that passed validation.
    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// All population groups that passed validation.
    pub fn population(&self) -> &[PopulationGroup] {
        &self.population
    }

    /// World settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    // -------------------------------------------------------------------
    // Trade partners
    // -------------------------------------------------------------------

    /// The evaluating state's partner records.
    pub fn trade_partners(&self) -> &[TradePartner] {
        &self.trade_partners
    }

    /// Set one resource of a partner's `total_transport.available`,
    /// creating the partner record when absent.
    pub fn set_partner_available(&mut self, country: &CountryName, resource: &str, quantity: Decimal) {
        if let Some(partner) = self
            .trade_partners
            .iter_mut()
            .find(|partner| partner.country.same_as(country))
        {
            partner
                .total_transport
                .available
                .insert(resource.to_owned(), quantity);
            return;
        }
        let mut partner = TradePartner {
            country: country.clone(),
            ..TradePartner::default()
        };
        partner
            .total_transport
            .available
            .insert(resource.to_owned(), quantity);
        self.trade_partners.push(partner);
    }
}
