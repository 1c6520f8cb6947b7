//! Siting stage: site requirements against province attributes.
//!
//! A province matches a template when every requirement the template
//! defines holds. Undefined requirements are satisfied. Matches are split by
//! ownership into the state and foreign lists.

use std::collections::{BTreeMap, BTreeSet};

use provincia_types::{
    BuildingTemplate, DiagnosticCategory, Diagnostics, Province, SitingRequirement,
};

use super::{Candidates, StageContext, StageError, check_table, join_ids};
use crate::criteria::{Evaluate, TagSet, tag_set};

/// Case-folded tag sets of one province, per tag requirement.
fn site_tags(province: &Province) -> BTreeMap<SitingRequirement, TagSet> {
    SitingRequirement::ALL
        .iter()
        .filter_map(|requirement| {
            province
                .tags_for(*requirement)
                .map(|tags| (*requirement, tag_set(tags)))
        })
        .collect()
}

/// Whether one requirement of `template` holds in `province`.
fn requirement_holds(
    template: &BuildingTemplate,
    requirement: SitingRequirement,
    province: &Province,
    tags: &BTreeMap<SitingRequirement, TagSet>,
) -> bool {
    if let Some(criteria) = template.tag_criteria(requirement) {
        return tags
            .get(&requirement)
            .is_some_and(|set| criteria.evaluate(set));
    }
    if let Some(criteria) = template.numeric_criteria(requirement) {
        return criteria.evaluate(&province.scalar_for(requirement));
    }
    true
}

/// Report malformed siting criteria of a template.
fn report_defects(template: &BuildingTemplate, diagnostics: &mut Diagnostics) {
    for requirement in SitingRequirement::ALL {
        let defects = match (
            template.tag_criteria(requirement),
            template.numeric_criteria(requirement),
        ) {
            (Some(criteria), _) => criteria.defects(),
            (None, Some(criteria)) => criteria.defect().map(str::to_owned).into_iter().collect(),
            (None, None) => Vec::new(),
        };
        for defect in defects {
            diagnostics.push(
                DiagnosticCategory::CriteriaDefect,
                format!("{}: {requirement}: {defect}", template.name),
            );
        }
    }
}

/// Rebuild every template's candidates from the provinces.
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
    let sites: Vec<(&Province, BTreeMap<SitingRequirement, TagSet>)> = context
        .repo
        .provinces()
        .iter()
        .map(|province| (province, site_tags(province)))
        .collect();

    for (template, entry) in context.repo.templates().iter().zip(candidates.iter_mut()) {
        report_defects(template, diagnostics);
        *entry = Candidates::default();
        let mut failed: BTreeSet<SitingRequirement> = BTreeSet::new();

        for (province, tags) in &sites {
            let mut matches = true;
            for requirement in SitingRequirement::ALL {
                if !requirement_holds(template, requirement, province, tags) {
                    matches = false;
                    failed.insert(requirement);
                }
            }
            if !matches {
                continue;
            }
            if province.is_owned_by(context.state) {
                entry.state.push(province.id.clone());
            } else {
                entry.others.push(province.id.clone());
            }
        }

        if entry.is_empty() {
            let reasons = if failed.is_empty() {
                "no provinces to evaluate".to_owned()
            } else {
                let names: Vec<&str> = failed.iter().map(|r| r.field_name()).collect();
                format!("failed {}", names.join(", "))
            };
            diagnostics.push(
                DiagnosticCategory::Siting,
                format!("{} matches no province: {reasons}", template.name),
            );
        } else if context.report_matches {
            diagnostics.push(
                DiagnosticCategory::Siting,
                format!(
                    "{} can be built in own [{}] and foreign [{}]",
                    template.name,
                    join_ids(&entry.state),
                    join_ids(&entry.others)
                ),
            );
        }
    }
    Ok(())
}
