//! Resource gate: free arable land and unemployed workers.
//!
//! Only requirements above zero are checked. Arable land is checked before
//! workers and a candidate is reported for the first shortfall found.

use std::collections::BTreeMap;

use provincia_types::{DiagnosticCategory, Diagnostics, ProvinceId};
use provincia_world::{Repository, WorldError};
use rust_decimal::Decimal;

use super::{Candidates, StageContext, StageError, check_table};

/// Unemployed workers per province, summed over its population groups.
///
/// Groups without a province are ignored.
///
/// # Errors
///
/// Returns [`StageError::ArithmeticOverflow`] if a sum overflows.
pub fn unemployed_by_province(
    repo: &Repository,
) -> Result<BTreeMap<ProvinceId, Decimal>, StageError> {
    let mut totals: BTreeMap<ProvinceId, Decimal> = BTreeMap::new();
    for group in repo.population() {
        let Some(province) = &group.province_id else {
            continue;
        };
        let total = totals.entry(province.clone()).or_insert(Decimal::ZERO);
        *total = total
            .checked_add(group.employment.unemployed_workers)
            .ok_or(StageError::ArithmeticOverflow {
                context: "summing unemployed workers",
            })?;
    }
    Ok(totals)
}

/// Drop candidates lacking the land or workers a template needs.
///
/// # Errors
///
/// Returns [`StageError::CandidateMismatch`] if the table does not line up
/// with the templates, [`StageError::World`] if a candidate is not in the
/// repository, or [`StageError::ArithmeticOverflow`] if summing workers
/// overflows.
pub fn apply(
    context: &StageContext<'_>,
    candidates: &mut [Candidates],
    diagnostics: &mut Diagnostics,
) -> Result<(), StageError> {
    check_table(context.repo, candidates)?;
    let workers = unemployed_by_province(context.repo)?;

    for (template, entry) in context.repo.templates().iter().zip(candidates.iter_mut()) {
        let land = template.effective_required_arable_land();
        let staff = template.effective_required_workers();
        if land <= Decimal::ZERO && staff <= Decimal::ZERO {
            continue;
        }

        let mut shortfalls: BTreeMap<ProvinceId, String> = BTreeMap::new();
        for id in entry.iter() {
            let province = context
                .repo
                .province(id.as_str())
                .ok_or_else(|| WorldError::ProvinceNotFound(id.clone()))?;
            let free = province.free_arable_land;
            let idle = workers.get(id).copied().unwrap_or(Decimal::ZERO);
            let shortfall = if land > Decimal::ZERO && free < land {
                Some(format!("{id} lacks arable land ({free} < {land})"))
            } else if staff > Decimal::ZERO && idle < staff {
                Some(format!("{id} lacks unemployed workers ({idle} < {staff})"))
            } else {
                None
            };
            if let Some(reason) = shortfall {
                shortfalls.insert(id.clone(), reason);
            }
        }

        let removed = entry.retain(|id| !shortfalls.contains_key(id));
        for id in &removed {
            if let Some(reason) = shortfalls.get(id) {
                diagnostics.push(
                    DiagnosticCategory::ResourceGate,
                    format!("{}: {reason}", template.name),
                );
            }
        }
    }
    Ok(())
}
