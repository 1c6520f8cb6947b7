//! End-to-end turn passes over small hand-built worlds.
//!
//! Each test builds a snapshot, runs [`run_turn`] and checks the repository
//! writes and the diagnostics handed back for the turn log.

#![allow(clippy::unwrap_used)]

use provincia_core::{EngineConfig, StageOutcome, load_repository, run_turn};
use provincia_types::{
    Building, BuildingName, BuildingStatus, BuildingTemplate, CountryName, DiagnosticCategory,
    Diagnostics, Province, ProvinceId, RawSnapshot, Settings, Snapshot, TagCriteria,
    TradeAgreement, TransportMode, TurnInput,
};
use provincia_world::Repository;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn make_province(id: &str, owner: &str, neighbors: &[&str]) -> Province {
    Province {
        id: ProvinceId::from(id),
        owner: CountryName::from(owner),
        neighbors: neighbors.iter().map(|id| ProvinceId::from(*id)).collect(),
        planet: std::iter::once("Terra".to_owned()).collect(),
        ..Province::default()
    }
}

fn with_capacity(mut province: Province, mode: TransportMode, quantity: Decimal) -> Province {
    province
        .transport_infrastructure
        .link_mut(mode)
        .capacity
        .insert("goods".to_owned(), quantity);
    province
}

fn capital(mut province: Province) -> Province {
    province.is_capital = true;
    province
}

fn goods_settings(modes: &[TransportMode]) -> Settings {
    Settings {
        transport_modes: modes.to_vec(),
        resource_categories: vec!["goods".to_owned()],
        ..Settings::default()
    }
}

fn make_input(state: &str) -> TurnInput {
    TurnInput {
        state_name: CountryName::from(state),
        ..TurnInput::default()
    }
}

fn available(repo: &Repository, id: &str, mode: TransportMode) -> Decimal {
    repo.province(id)
        .unwrap()
        .transport_infrastructure
        .available(mode, "goods")
}

/// Capital P1 and P2, mutual neighbors on Terra, land capacity 10 each.
fn two_province_world() -> Repository {
    let (repo, errors) = Repository::load(Snapshot {
        provinces: vec![
            capital(with_capacity(
                make_province("P1", "Avalon", &["P2"]),
                TransportMode::Land,
                dec!(10),
            )),
            with_capacity(
                make_province("P2", "Avalon", &["P1"]),
                TransportMode::Land,
                dec!(10),
            ),
        ],
        settings: goods_settings(&[TransportMode::Land]),
        ..Snapshot::default()
    });
    assert!(errors.is_empty());
    repo
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[test]
fn neighbor_delivers_its_land_capacity_to_the_capital() {
    init_tracing();
    let mut repo = two_province_world();
    let report = run_turn(&mut repo, &make_input("Avalon"), &EngineConfig::default());

    assert_eq!(available(&repo, "P2", TransportMode::Land), dec!(10));
    assert_eq!(available(&repo, "P1", TransportMode::Land), Decimal::ZERO);

    let flow = report
        .domestic
        .iter()
        .find(|flow| flow.province.as_str() == "P2")
        .unwrap();
    assert_eq!(flow.resource, "goods");
    assert_eq!(flow.outcome.total, dec!(10));
    assert_eq!(
        flow.outcome.best_route().unwrap().to_string(),
        "P2(land)->P1(land)"
    );
    assert!(
        report
            .diagnostics
            .to_lines()
            .contains(&"[transport] goods: P2 delivers 10 to P1 via P2(land)->P1(land)".to_owned())
    );
}

#[test]
fn widest_path_configuration_gives_the_same_single_route() {
    let config = EngineConfig::parse("transport:\n  algorithm: widest_path\n").unwrap();
    let mut repo = two_province_world();
    let report = run_turn(&mut repo, &make_input("Avalon"), &config);
    assert_eq!(available(&repo, "P2", TransportMode::Land), dec!(10));
    assert_eq!(report.failed_stages().count(), 0);
}

#[test]
fn zero_capacity_province_gets_zero_and_a_diagnostic() {
    let (mut repo, _) = Repository::load(Snapshot {
        provinces: vec![
            capital(with_capacity(
                make_province("P1", "Avalon", &["P2"]),
                TransportMode::Land,
                dec!(10),
            )),
            make_province("P2", "Avalon", &["P1"]),
        ],
        settings: goods_settings(&TransportMode::ALL),
        ..Snapshot::default()
    });
    let report = run_turn(&mut repo, &make_input("Avalon"), &EngineConfig::default());

    for mode in TransportMode::ALL {
        assert_eq!(available(&repo, "P2", mode), Decimal::ZERO, "{mode}");
    }
    assert_eq!(
        report.diagnostics.count(DiagnosticCategory::UnreachableProvince),
        1
    );
    assert_eq!(report.failed_stages().count(), 0);
}

#[test]
fn transport_pass_is_idempotent() {
    let mut repo = two_province_world();
    let config = EngineConfig::default();
    let input = make_input("Avalon");

    run_turn(&mut repo, &input, &config);
    let first = repo.provinces().to_vec();
    run_turn(&mut repo, &input, &config);
    assert_eq!(repo.provinces(), first.as_slice());
}

#[test]
fn partner_corridor_is_written_to_the_partner_record() {
    let (mut repo, errors) = Repository::load(Snapshot {
        provinces: vec![
            capital(with_capacity(
                make_province("P1", "Avalon", &["P2"]),
                TransportMode::Land,
                dec!(10),
            )),
            with_capacity(
                make_province("P2", "Avalon", &["P1", "L1"]),
                TransportMode::Land,
                dec!(4),
            ),
            capital(with_capacity(
                make_province("L1", "Lyonesse", &["P2"]),
                TransportMode::Land,
                dec!(8),
            )),
        ],
        settings: goods_settings(&[TransportMode::Land]),
        ..Snapshot::default()
    });
    assert!(errors.is_empty());
    let mut input = make_input("Avalon");
    input.trade_agreements.push(TradeAgreement {
        country: CountryName::from("Lyonesse"),
    });

    let report = run_turn(&mut repo, &input, &EngineConfig::default());
    assert_eq!(report.outcome_of("partner transport"), Some(&StageOutcome::Completed));
    let partner = repo
        .trade_partners()
        .iter()
        .find(|partner| partner.country.same_as(&CountryName::from("lyonesse")))
        .unwrap();
    // P1 is capped by the P2 relay, P2 by its own capacity: 4 + 4.
    assert_eq!(
        partner.total_transport.available.get("goods").copied(),
        Some(dec!(8))
    );
}

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

fn lumber_camp(limit: u64) -> BuildingTemplate {
    BuildingTemplate {
        name: BuildingName::from("Lumber Camp"),
        required_landscapes: Some(TagCriteria::from_value(&json!({"AND": ["Forest"]}))),
        province_limit: Some(limit),
        ..BuildingTemplate::default()
    }
}

fn forest(id: &str) -> Province {
    let mut province = make_province(id, "Avalon", &[]);
    province.landscapes.insert("Forest".to_owned());
    province
}

fn lumber_camp_in(province: &str) -> Building {
    Building {
        building_name: BuildingName::from("Lumber Camp"),
        building_owner: CountryName::from("Avalon"),
        province_id: ProvinceId::from(province),
        status: BuildingStatus::Active,
        ..Building::default()
    }
}

#[test]
fn province_limit_removes_every_full_forest() {
    let (mut repo, errors) = Repository::load(Snapshot {
        provinces: vec![
            capital(make_province("P1", "Avalon", &[])),
            forest("P2"),
            forest("P3"),
        ],
        templates: vec![lumber_camp(1)],
        buildings: vec![lumber_camp_in("P2"), lumber_camp_in("P3")],
        ..Snapshot::default()
    });
    assert!(errors.is_empty());
    let report = run_turn(&mut repo, &make_input("Avalon"), &EngineConfig::default());

    let template = repo.templates().first().unwrap();
    assert!(template.matching_provinces_state.is_empty());
    assert!(template.allowed_building_state.is_empty());
    let limits: Vec<String> = report
        .diagnostics
        .in_category(DiagnosticCategory::LimitExceeded)
        .map(|diagnostic| diagnostic.message.clone())
        .collect();
    assert_eq!(
        limits,
        vec![
            "Lumber Camp: province_limit 1 reached in P2".to_owned(),
            "Lumber Camp: province_limit 1 reached in P3".to_owned(),
        ]
    );
}

#[test]
fn candidate_lists_are_rebuilt_each_turn() {
    let (mut repo, _) = Repository::load(Snapshot {
        provinces: vec![capital(make_province("P1", "Avalon", &[])), forest("P2")],
        templates: vec![BuildingTemplate {
            matching_provinces_others: vec![ProvinceId::from("X9")],
            allowed_building_others: vec![ProvinceId::from("X9")],
            ..lumber_camp(3)
        }],
        ..Snapshot::default()
    });
    run_turn(&mut repo, &make_input("Avalon"), &EngineConfig::default());
    let template = repo.templates().first().unwrap();
    assert_eq!(template.allowed_building_state, vec![ProvinceId::from("P2")]);
    assert!(template.allowed_building_others.is_empty());
    assert!(template.matching_provinces_others.is_empty());
}

#[test]
fn infrastructure_roll_up_feeds_transport() {
    let mut depot = BuildingTemplate {
        name: BuildingName::from("Depot"),
        ..BuildingTemplate::default()
    };
    let mut infrastructure = provincia_types::TransportInfrastructure::default();
    infrastructure
        .link_mut(TransportMode::Land)
        .capacity
        .insert("goods".to_owned(), dec!(6));
    depot.transport_infrastructure = Some(infrastructure);

    let depot_in = |province: &str| Building {
        building_name: BuildingName::from("Depot"),
        building_owner: CountryName::from("Avalon"),
        province_id: ProvinceId::from(province),
        status: BuildingStatus::Active,
        ..Building::default()
    };
    let (mut repo, errors) = Repository::load(Snapshot {
        provinces: vec![
            capital(make_province("P1", "Avalon", &["P2"])),
            make_province("P2", "Avalon", &["P1"]),
        ],
        templates: vec![depot],
        buildings: vec![depot_in("P1"), depot_in("P2")],
        settings: goods_settings(&[TransportMode::Land]),
        ..Snapshot::default()
    });
    assert!(errors.is_empty());
    let config = EngineConfig::parse("infrastructure:\n  aggregate_from_buildings: true\n").unwrap();

    let report = run_turn(&mut repo, &make_input("Avalon"), &config);
    assert_eq!(report.outcome_of("infrastructure"), Some(&StageOutcome::Completed));
    assert_eq!(available(&repo, "P2", TransportMode::Land), dec!(6));
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn raw_snapshot_loads_with_per_record_diagnostics() {
    let raw = RawSnapshot {
        provinces: vec![
            json!({"id": "P1", "owner": "Avalon", "is_capital": true, "planet": ["Terra"]}),
            json!({"id": "P1", "owner": "Avalon"}),
            json!({"id": "P2", "owner": "Avalon", "is_capital": true}),
        ],
        templates: vec![json!({"name": "Sawmill", "required_landscapes": {"OR": ["Forest"]}})],
        buildings: vec![json!({"building_name": "Sawmill", "province_id": "P7"})],
        ..RawSnapshot::default()
    };
    let mut diagnostics = Diagnostics::new();
    let mut repo = load_repository(raw, &mut diagnostics);

    assert_eq!(repo.province_count(), 2);
    assert!(!repo.province("P2").unwrap().is_capital);
    // Duplicate id and demoted second capital.
    assert_eq!(diagnostics.count(DiagnosticCategory::MalformedEntity), 2);
    assert_eq!(diagnostics.count(DiagnosticCategory::MissingReference), 1);

    let report = run_turn(&mut repo, &make_input("Avalon"), &EngineConfig::default());
    assert_eq!(report.failed_stages().count(), 0);
}
