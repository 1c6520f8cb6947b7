//! Limits stage: province, state and world building caps.
//!
//! A limit is reached once the existing count of the template's name is at
//! or above it. Province limits use the candidate's own tally, state limits
//! the tally of whoever owns the candidate, and the world limit the global
//! tally.

use std::collections::BTreeMap;

use provincia_types::{CountryName, DiagnosticCategory, Diagnostics, ProvinceId};
use provincia_world::WorldError;

use super::{Candidates, StageContext, StageError, check_table, join_ids};
use crate::tallies::count_of;

/// Drop candidates where the template's limits have been reached.
///
/// # Errors
///
/// Returns [`StageError::CandidateMismatch`] if the table does not line up
/// with the templates, or [`StageError::World`] if a foreign candidate is not
/// in the repository.
pub fn apply(
    context: &StageContext<'_>,
    candidates: &mut [Candidates],
    diagnostics: &mut Diagnostics,
) -> Result<(), StageError> {
    check_table(context.repo, candidates)?;

    for (template, entry) in context.repo.templates().iter().zip(candidates.iter_mut()) {
        let name = template.name.as_str();

        if let Some(limit) = template.province_limit {
            let removed =
                entry.retain(|id| count_of(context.tallies.province(id), name) < limit);
            for id in &removed {
                diagnostics.push(
                    DiagnosticCategory::LimitExceeded,
                    format!("{name}: province_limit {limit} reached in {id}"),
                );
            }
        }

        if let Some(limit) = template.state_limit {
            apply_state_limit(context, name, limit, entry, diagnostics)?;
        }

        if let Some(limit) = template.world_limit {
            let built = count_of(context.tallies.world(), name);
            if built >= limit && !entry.is_empty() {
                let removed = entry.clear();
                diagnostics.push(
                    DiagnosticCategory::LimitExceeded,
                    format!(
                        "{name}: world_limit {limit} reached ({built} built); removed {}",
                        join_ids(&removed)
                    ),
                );
            }
        }
    }
    Ok(())
}

fn apply_state_limit(
    context: &StageContext<'_>,
    name: &str,
    limit: u64,
    entry: &mut Candidates,
    diagnostics: &mut Diagnostics,
) -> Result<(), StageError> {
    if !entry.state.is_empty() && count_of(context.tallies.owner(context.state), name) >= limit {
        let removed = std::mem::take(&mut entry.state);
        diagnostics.push(
            DiagnosticCategory::LimitExceeded,
            format!(
                "{name}: state_limit {limit} reached by {}; removed {}",
                context.state,
                join_ids(&removed)
            ),
        );
    }

    // Foreign candidates are grouped by owner key so each owner is reported
    // once.
    let mut owners: BTreeMap<String, (CountryName, Vec<ProvinceId>)> = BTreeMap::new();
    let mut kept = Vec::with_capacity(entry.others.len());
    for id in std::mem::take(&mut entry.others) {
        let province = context
            .repo
            .province(id.as_str())
            .ok_or_else(|| WorldError::ProvinceNotFound(id.clone()))?;
        if count_of(context.tallies.owner(&province.owner), name) >= limit {
            owners
                .entry(province.owner.key())
                .or_insert_with(|| (province.owner.clone(), Vec::new()))
                .1
                .push(id);
        } else {
            kept.push(id);
        }
    }
    entry.others = kept;

    for (owner, removed) in owners.into_values() {
        diagnostics.push(
            DiagnosticCategory::LimitExceeded,
            format!(
                "{name}: state_limit {limit} reached by {owner}; removed {}",
                join_ids(&removed)
            ),
        );
    }
    Ok(())
}
