//! Building tallies for neighborhood criteria and limits.
//!
//! Tallies count existing buildings by exact building name, whatever their
//! status. A building is attributed to the province it stands in and to that
//! province's owner. Templates sharing a name share a count.

use std::collections::BTreeMap;

use provincia_types::{CountryName, ProvinceId};
use provincia_world::Repository;

/// Building name -> number of existing buildings.
pub type Tally = BTreeMap<String, u64>;

static EMPTY: Tally = BTreeMap::new();

/// Building counts per province, per owning state, and world-wide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildingTallies {
    per_province: BTreeMap<ProvinceId, Tally>,
    per_owner: BTreeMap<String, Tally>,
    world: Tally,
}

impl BuildingTallies {
    /// Count every building in the repository.
    pub fn from_repository(repo: &Repository) -> Self {
        let mut tallies = Self::default();
        for building in repo.buildings() {
            let name = building.building_name.as_str();
            bump(&mut tallies.world, name);
            bump(
                tallies
                    .per_province
                    .entry(building.province_id.clone())
                    .or_default(),
                name,
            );
            if let Some(province) = repo.province(building.province_id.as_str())
                && !province.owner.is_blank()
            {
                bump(tallies.per_owner.entry(province.owner.key()).or_default(), name);
            }
        }
        tallies
    }

    /// Buildings standing in one province.
    pub fn province(&self, id: &ProvinceId) -> &Tally {
        self.per_province.get(id).unwrap_or(&EMPTY)
    }

    /// Buildings standing in provinces owned by `owner`.
    pub fn owner(&self, owner: &CountryName) -> &Tally {
        self.per_owner.get(&owner.key()).unwrap_or(&EMPTY)
    }

    /// Buildings anywhere.
    pub const fn world(&self) -> &Tally {
        &self.world
    }
}

/// The count of `name` in a tally, zero when absent.
pub fn count_of(tally: &Tally, name: &str) -> u64 {
    tally.get(name).copied().unwrap_or(0)
}

fn bump(tally: &mut Tally, name: &str) {
    let count = tally.entry(name.to_owned()).or_insert(0);
    *count = count.saturating_add(1);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use provincia_types::{
        Building, BuildingName, BuildingStatus, BuildingTemplate, Province, Snapshot,
    };

    use super::*;

    fn make_province(id: &str, owner: &str) -> Province {
        Province {
            id: ProvinceId::from(id),
            owner: CountryName::from(owner),
            ..Province::default()
        }
    }

    fn make_building(name: &str, province: &str, status: BuildingStatus) -> Building {
        Building {
            building_name: BuildingName::from(name),
            province_id: ProvinceId::from(province),
            status,
            ..Building::default()
        }
    }

    fn make_template(name: &str) -> BuildingTemplate {
        BuildingTemplate {
            name: BuildingName::from(name),
            ..BuildingTemplate::default()
        }
    }

    #[test]
    fn buildings_count_by_province_owner_and_world() {
        let (repo, errors) = Repository::load(Snapshot {
            provinces: vec![
                make_province("P1", "Avalon"),
                make_province("P2", "avalon"),
                make_province("P3", "Lyonesse"),
            ],
            templates: vec![make_template("Mine"), make_template("Farm")],
            buildings: vec![
                make_building("Mine", "P1", BuildingStatus::Active),
                make_building("Mine", "P2", BuildingStatus::UnderConstruction),
                make_building("Mine", "P3", BuildingStatus::Inactive),
                make_building("Farm", "P1", BuildingStatus::Active),
            ],
            ..Snapshot::default()
        });
        assert!(errors.is_empty());
        let tallies = BuildingTallies::from_repository(&repo);

        assert_eq!(count_of(tallies.province(&ProvinceId::from("P1")), "Mine"), 1);
        assert_eq!(count_of(tallies.province(&ProvinceId::from("P1")), "Farm"), 1);
        assert_eq!(count_of(tallies.owner(&CountryName::from("AVALON")), "Mine"), 2);
        assert_eq!(count_of(tallies.owner(&CountryName::from("Lyonesse")), "Farm"), 0);
        assert_eq!(count_of(tallies.world(), "Mine"), 3);
        assert!(tallies.province(&ProvinceId::from("P9")).is_empty());
    }
}
