//! Neighborhood stage: building count criteria.
//!
//! `state_required_buildings` is checked once against everything the
//! evaluating state owns; failing it empties both lists.
//! `province_required_buildings` is checked per candidate against the
//! buildings standing in that province.

use provincia_types::{BuildingTemplate, DiagnosticCategory, Diagnostics};

use super::{Candidates, StageContext, StageError, check_table, join_ids};
use crate::criteria::Evaluate;

fn report_defects(template: &BuildingTemplate, diagnostics: &mut Diagnostics) {
    let fields = [
        ("state_required_buildings", &template.state_required_buildings),
        ("province_required_buildings", &template.province_required_buildings),
    ];
    for (field, criteria) in fields {
        let Some(criteria) = criteria else { continue };
        for defect in criteria.defects() {
            diagnostics.push(
                DiagnosticCategory::CriteriaDefect,
                format!("{}: {field}: {defect}", template.name),
            );
        }
    }
}

/// Drop candidates whose surroundings fail the template's count criteria.
///
/// # Errors
///
/// Returns [`StageError::CandidateMismatch`] if the table does not line up
/// with the templates.
pub fn apply(
    context: &StageContext<'_>,
    candidates: &mut [Candidates],
    diagnostics: &mut Diagnostics,
) -> Result<(), StageError> {
    check_table(context.repo, candidates)?;
    let owned = context.tallies.owner(context.state);

    for (template, entry) in context.repo.templates().iter().zip(candidates.iter_mut()) {
        report_defects(template, diagnostics);
        if entry.is_empty() {
            continue;
        }

        if let Some(criteria) = &template.state_required_buildings
            && !criteria.evaluate(owned)
        {
            let removed = entry.clear();
            diagnostics.push(
                DiagnosticCategory::TemplatesNarrowed,
                format!(
                    "{}: state_required_buildings not met by {}; removed {}",
                    template.name,
                    context.state,
                    join_ids(&removed)
                ),
            );
            continue;
        }

        if let Some(criteria) = &template.province_required_buildings {
            let removed =
                entry.retain(|id| criteria.evaluate(context.tallies.province(id)));
            if !removed.is_empty() {
                diagnostics.push(
                    DiagnosticCategory::TemplatesNarrowed,
                    format!(
                        "{}: province_required_buildings not met in {}",
                        template.name,
                        join_ids(&removed)
                    ),
                );
            }
        }
    }
    Ok(())
}
