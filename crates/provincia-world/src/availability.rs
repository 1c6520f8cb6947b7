//! Transport availability passes.
//!
//! Both passes compute every result first and only then write, so a fault
//! midway leaves the repository untouched.
//!
//! - [`compute_domestic_availability`]: for every resource, how much each of
//!   the state's provinces can deliver to the state capital, per mode,
//!   written to the provinces' `available` maps.
//! - [`compute_partner_availability`]: for every trade agreement and
//!   resource, how much the whole state can deliver to the partner's capital,
//!   written to the partner record.

use std::collections::BTreeSet;

use provincia_types::{
    CountryName, DiagnosticCategory, Diagnostics, ProvinceId, TradeAgreement, TransportMode,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::WorldError;
use crate::flow::{FlowAlgorithm, FlowOutcome, solve};
use crate::graph::{TerrainRules, TransportGraph};
use crate::repository::Repository;

/// Solver settings for the availability passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportOptions {
    /// Which solver to run.
    pub algorithm: FlowAlgorithm,
    /// Skip origins that are pure sea-lane relays.
    pub skip_sea_lane_origins: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            algorithm: FlowAlgorithm::MaxFlow,
            skip_sea_lane_origins: true,
        }
    }
}

/// One solved origin for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvinceFlow {
    /// The origin province.
    pub province: ProvinceId,
    /// The resource category.
    pub resource: String,
    /// The solution.
    pub outcome: FlowOutcome,
}

/// Everything a pass computed, and what it has to say about it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportReport {
    /// Solved origins, in resource then province order.
    pub flows: Vec<ProvinceFlow>,
    /// Advisory messages.
    pub diagnostics: Diagnostics,
}

/// A staged `available` write.
struct Write {
    province: usize,
    mode: TransportMode,
    resource: String,
    quantity: Decimal,
}

/// Arena indices of every province owned by `state` or any of `others`.
fn friendly_set(repo: &Repository, state: &CountryName, others: &[CountryName]) -> BTreeSet<usize> {
    let mut friendly: BTreeSet<usize> = repo.indices_owned_by(state).into_iter().collect();
    for country in others {
        friendly.extend(repo.indices_owned_by(country));
    }
    friendly
}

// ---------------------------------------------------------------------------
// Domestic
// ---------------------------------------------------------------------------

/// Recompute the state's provinces' `available` maps.
///
/// Every `available` entry of the state's provinces is reset to zero for
/// each configured resource, then every non-capital province gets, per mode,
/// what it can deliver to the capital over the state's and the accessible
/// countries' provinces. Unreachable provinces stay at zero and get an
/// [`DiagnosticCategory::UnreachableProvince`] diagnostic.
///
/// # Errors
///
/// Returns a [`WorldError`] if the graph or the solver fails. Nothing is
/// written in that case.
pub fn compute_domestic_availability(
    repo: &mut Repository,
    state: &CountryName,
    accessible: &[CountryName],
    options: &TransportOptions,
) -> Result<TransportReport, WorldError> {
    let rules = TerrainRules::from_settings(repo.settings());
    let resources = repo.settings().resource_categories.clone();
    let owned = repo.indices_owned_by(state);
    let mut report = TransportReport::default();
    let mut writes: Vec<Write> = Vec::new();

    if let Some(capital) = repo.capital_of(state) {
        let friendly = friendly_set(repo, state, accessible);
        let capital_id = repo.province_at(capital)?.id.clone();

        let mut origins = Vec::new();
        for &index in &owned {
            if index == capital {
                continue;
            }
            let province = repo.province_at(index)?;
            if options.skip_sea_lane_origins && rules.is_sea_lane(province) {
                report.diagnostics.push(
                    DiagnosticCategory::Transport,
                    format!("{} is a sea lane and is not an origin", province.id),
                );
                continue;
            }
            origins.push(index);
        }

        for resource in &resources {
            let graph = TransportGraph::build(repo, &friendly, resource)?;
            debug!(
                resource = resource.as_str(),
                vertices = graph.vertex_count(),
                edges = graph.edges().len(),
                origins = origins.len(),
                "Transport graph built"
            );
            for &origin in &origins {
                let province_id = repo.province_at(origin)?.id.clone();
                let outcome = solve(&graph, origin, capital, options.algorithm)?;
                for flow in &outcome.modes {
                    writes.push(Write {
                        province: origin,
                        mode: flow.mode,
                        resource: resource.clone(),
                        quantity: flow.quantity,
                    });
                }
                if outcome.is_unreachable() {
                    debug!(province = %province_id, resource = resource.as_str(), "No path to capital");
                    report.diagnostics.push(
                        DiagnosticCategory::UnreachableProvince,
                        format!("{province_id} cannot deliver {resource} to {capital_id}"),
                    );
                } else if let Some(route) = outcome.best_route() {
                    report.diagnostics.push(
                        DiagnosticCategory::Transport,
                        format!(
                            "{resource}: {province_id} delivers {} to {capital_id} via {route}",
                            outcome.total.normalize()
                        ),
                    );
                }
                report.flows.push(ProvinceFlow {
                    province: province_id,
                    resource: resource.clone(),
                    outcome,
                });
            }
        }
    } else {
        report.diagnostics.push(
            DiagnosticCategory::Transport,
            format!("{state} has no capital; availability reset to 0"),
        );
    }

    // Apply: reset, then write.
    for &index in &owned {
        let province = repo.province_at_mut(index)?;
        for (_, link) in province.transport_infrastructure.links_mut() {
            for resource in &resources {
                link.available.insert(resource.clone(), Decimal::ZERO);
            }
        }
    }
    for write in writes {
        repo.province_at_mut(write.province)?
            .transport_infrastructure
            .set_available(write.mode, &write.resource, write.quantity);
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// Partners
// ---------------------------------------------------------------------------

/// Recompute `total_transport.available` of every partner named in
/// `agreements`.
///
/// For each resource the value is replaced by the summed flow from all of
/// the state's provinces to the partner's capital, over the state's and the
/// partner's provinces. Each origin gets a [`DiagnosticCategory::PartnerRoute`]
/// line naming its best route, or saying nothing gets through, before the
/// per-resource total. A partner without a capital gets zeros and a
/// [`DiagnosticCategory::PartnerRoute`] diagnostic. Missing partner records
/// are created.
///
/// # Errors
///
/// Returns a [`WorldError`] if the graph or the solver fails. Nothing is
/// written in that case.
pub fn compute_partner_availability(
    repo: &mut Repository,
    state: &CountryName,
    agreements: &[TradeAgreement],
    options: &TransportOptions,
) -> Result<TransportReport, WorldError> {
    let resources = repo.settings().resource_categories.clone();
    let owned = repo.indices_owned_by(state);
    let mut report = TransportReport::default();
    let mut writes: Vec<(CountryName, String, Decimal)> = Vec::new();

    for agreement in agreements {
        let partner = &agreement.country;
        if partner.is_blank() || partner.same_as(state) {
            continue;
        }
        let Some(capital) = repo.capital_of(partner) else {
            report.diagnostics.push(
                DiagnosticCategory::PartnerRoute,
                format!("{partner} has no capital; partner transport reset to 0"),
            );
            for resource in &resources {
                writes.push((partner.clone(), resource.clone(), Decimal::ZERO));
            }
            continue;
        };
        let capital_id = repo.province_at(capital)?.id.clone();
        let friendly = friendly_set(repo, state, std::slice::from_ref(partner));

        for resource in &resources {
            let graph = TransportGraph::build(repo, &friendly, resource)?;
            let mut total = Decimal::ZERO;
            for &origin in &owned {
                let outcome = solve(&graph, origin, capital, options.algorithm)?;
                let origin_id = &repo.province_at(origin)?.id;
                let message = match outcome.best_route() {
                    Some(route) if !outcome.is_unreachable() => format!(
                        "{resource}: {origin_id} delivers {} to {partner} via {route}",
                        outcome.total.normalize()
                    ),
                    _ => format!(
                        "{resource}: no flow from {origin_id} to {partner} at {capital_id}"
                    ),
                };
                report.diagnostics.push(DiagnosticCategory::PartnerRoute, message);
                total = total
                    .checked_add(outcome.total)
                    .ok_or(WorldError::ArithmeticOverflow)?;
            }
            debug!(
                partner = %partner,
                resource = resource.as_str(),
                total = %total,
                "Partner route solved"
            );
            report.diagnostics.push(
                DiagnosticCategory::PartnerRoute,
                format!(
                    "{resource}: {state} can deliver {} to {partner} at {capital_id}",
                    total.normalize()
                ),
            );
            writes.push((partner.clone(), resource.clone(), total));
        }
    }

    for (partner, resource, quantity) in writes {
        repo.set_partner_available(&partner, &resource, quantity);
    }
    Ok(report)
}
