//! Transport capacity roll-up from buildings.
//!
//! A province's transport capacity is the sum of what its active buildings
//! provide. Each building contributes its template's
//! `transport_infrastructure` scaled by `transport_efficiency * level`.

use std::collections::{BTreeMap, BTreeSet};

use provincia_types::{
    BuildingName, BuildingStatus, CountryName, TransportInfrastructure, TransportMode,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::WorldError;
use crate::repository::Repository;

/// Staged capacity sums: province index -> (mode, resource) -> quantity.
type Contributions = BTreeMap<usize, BTreeMap<(TransportMode, String), Decimal>>;

/// Rebuild the `capacity` maps of `state`'s provinces from its active
/// buildings.
///
/// Capacity and availability of the state's provinces are zeroed first, so
/// running the roll-up twice gives the same result. Buildings of the state
/// standing in another state's provinces are ignored. When several
/// templates share a name, the last one with infrastructure wins.
///
/// Returns the number of contributing buildings.
///
/// # Errors
///
/// Returns [`WorldError::ArithmeticOverflow`] if a scaled quantity
/// overflows. Nothing is written in that case.
pub fn aggregate_infrastructure(
    repo: &mut Repository,
    state: &CountryName,
) -> Result<usize, WorldError> {
    let mut by_name: BTreeMap<&BuildingName, &TransportInfrastructure> = BTreeMap::new();
    for template in repo.templates() {
        if let Some(infrastructure) = &template.transport_infrastructure {
            by_name.insert(&template.name, infrastructure);
        }
    }

    let owned: BTreeSet<usize> = repo.indices_owned_by(state).into_iter().collect();
    let mut sums = Contributions::new();
    let mut contributing: usize = 0;

    for building in repo.buildings() {
        if building.status != BuildingStatus::Active || !building.building_owner.same_as(state) {
            continue;
        }
        let Some(infrastructure) = by_name.get(&building.building_name) else {
            continue;
        };
        let Some(province) = repo.index_of(building.province_id.as_str()) else {
            continue;
        };
        if !owned.contains(&province) {
            debug!(
                building = %building.building_name,
                province = %building.province_id,
                "Building outside the state's provinces ignored"
            );
            continue;
        }

        let efficiency = building
            .building_modifiers
            .transport_efficiency
            .unwrap_or(Decimal::ONE);
        let level = building.building_level.unwrap_or(Decimal::ONE);
        let multiplier = efficiency
            .checked_mul(level)
            .ok_or(WorldError::ArithmeticOverflow)?;

        let slot = sums.entry(province).or_default();
        for (mode, link) in infrastructure.links() {
            for (resource, quantity) in &link.capacity {
                let scaled = quantity
                    .checked_mul(multiplier)
                    .ok_or(WorldError::ArithmeticOverflow)?;
                let total = slot.entry((*mode, resource.clone())).or_insert(Decimal::ZERO);
                *total = total
                    .checked_add(scaled)
                    .ok_or(WorldError::ArithmeticOverflow)?;
            }
        }
        contributing = contributing
            .checked_add(1)
            .ok_or(WorldError::ArithmeticOverflow)?;
    }

    for &index in &owned {
        let infrastructure = &mut repo.province_at_mut(index)?.transport_infrastructure;
        for (_, link) in infrastructure.links_mut() {
            link.capacity.values_mut().for_each(|quantity| *quantity = Decimal::ZERO);
            link.available.values_mut().for_each(|quantity| *quantity = Decimal::ZERO);
        }
        if let Some(contributions) = sums.remove(&index) {
            for ((mode, resource), quantity) in contributions {
                infrastructure.link_mut(mode).capacity.insert(resource, quantity);
            }
        }
    }

    debug!(state = %state, buildings = contributing, "Infrastructure aggregated");
    Ok(contributing)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use provincia_types::{
        Building, BuildingModifiers, BuildingTemplate, Province, ProvinceId, Settings, Snapshot,
    };
    use rust_decimal_macros::dec;

    use super::*;

    fn make_province(id: &str, owner: &str) -> Province {
        Province {
            id: ProvinceId::from(id),
            owner: CountryName::from(owner),
            ..Province::default()
        }
    }

    fn make_port() -> BuildingTemplate {
        let mut infrastructure = TransportInfrastructure::default();
        infrastructure
            .link_mut(TransportMode::Water)
            .capacity
            .insert("goods".to_owned(), dec!(5));
        BuildingTemplate {
            name: BuildingName::from("Port"),
            transport_infrastructure: Some(infrastructure),
            ..BuildingTemplate::default()
        }
    }

    fn make_building(province: &str, owner: &str, status: BuildingStatus) -> Building {
        Building {
            building_name: BuildingName::from("Port"),
            building_owner: CountryName::from(owner),
            province_id: ProvinceId::from(province),
            status,
            ..Building::default()
        }
    }

    fn make_repo(buildings: Vec<Building>) -> Repository {
        let mut stale = make_province("P1", "Avalon");
        stale
            .transport_infrastructure
            .link_mut(TransportMode::Land)
            .capacity
            .insert("goods".to_owned(), dec!(40));
        Repository::load(Snapshot {
            provinces: vec![stale, make_province("P2", "Lyonesse")],
            templates: vec![make_port()],
            buildings,
            settings: Settings {
                transport_modes: vec![TransportMode::Land, TransportMode::Water],
                resource_categories: vec!["goods".to_owned()],
                ..Settings::default()
            },
            ..Snapshot::default()
        })
        .0
    }

    fn capacity(repo: &Repository, id: &str, mode: TransportMode) -> Decimal {
        repo.province(id)
            .unwrap()
            .transport_infrastructure
            .capacity(mode, "goods")
    }

    #[test]
    fn active_buildings_scale_by_efficiency_and_level() {
        let mut upgraded = make_building("P1", "Avalon", BuildingStatus::Active);
        upgraded.building_level = Some(dec!(2));
        upgraded.building_modifiers = BuildingModifiers {
            transport_efficiency: Some(dec!(1.5)),
            ..BuildingModifiers::default()
        };
        let mut repo = make_repo(vec![
            upgraded,
            make_building("P1", "Avalon", BuildingStatus::Active),
            make_building("P1", "Avalon", BuildingStatus::Inactive),
        ]);
        let count = aggregate_infrastructure(&mut repo, &CountryName::from("Avalon")).unwrap();
        assert_eq!(count, 2);
        assert_eq!(capacity(&repo, "P1", TransportMode::Water), dec!(20));
        assert_eq!(capacity(&repo, "P1", TransportMode::Land), dec!(0));
    }

    #[test]
    fn other_states_are_untouched() {
        let mut repo = make_repo(vec![
            make_building("P2", "Lyonesse", BuildingStatus::Active),
            make_building("P2", "Avalon", BuildingStatus::Active),
        ]);
        let count = aggregate_infrastructure(&mut repo, &CountryName::from("Avalon")).unwrap();
        assert_eq!(count, 0);
        assert_eq!(capacity(&repo, "P2", TransportMode::Water), dec!(0));
    }

    #[test]
    fn roll_up_is_idempotent() {
        let mut repo = make_repo(vec![make_building("P1", "Avalon", BuildingStatus::Active)]);
        let state = CountryName::from("Avalon");
        aggregate_infrastructure(&mut repo, &state).unwrap();
        aggregate_infrastructure(&mut repo, &state).unwrap();
        assert_eq!(capacity(&repo, "P1", TransportMode::Water), dec!(5));
    }
}
