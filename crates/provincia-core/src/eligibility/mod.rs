//! Building eligibility resolution.
//!
//! For every template the resolver keeps two candidate lists, the evaluating
//! state's provinces and everyone else's, and narrows them through four
//! stages:
//!
//! 1. [`siting`] -- site requirements against province attributes. The only
//!    stage that adds candidates.
//! 2. [`neighborhood`] -- building count criteria, state-wide and
//!    per-province.
//! 3. [`limits`] -- province, state and world building limits.
//! 4. [`resources`] -- free arable land and unemployed workers.
//!
//! Stages after siting only ever remove. Each stage works on a copy of the
//! candidates and the copy replaces the original only on success, so a
//! failed stage changes nothing. [`write_back`] finally stores the lists on
//! the templates as both the matching and the allowed provinces.

pub mod limits;
pub mod neighborhood;
pub mod resources;
pub mod siting;

use provincia_types::{CountryName, Diagnostics, ProvinceId};
use provincia_world::{Repository, WorldError};

use crate::tallies::BuildingTallies;

/// Errors that can abort a single eligibility stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    /// A repository lookup failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The candidate table does not line up with the templates.
    #[error("candidate table has {found} entries for {expected} templates")]
    CandidateMismatch {
        /// Number of templates.
        expected: usize,
        /// Number of candidate entries.
        found: usize,
    },

    /// A quantity sum overflowed.
    #[error("arithmetic overflow while {context}")]
    ArithmeticOverflow {
        /// What was being summed.
        context: &'static str,
    },
}

/// The eligibility stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EligibilityStage {
    /// Site requirements.
    Siting,
    /// Building count criteria.
    Neighborhood,
    /// Building limits.
    Limits,
    /// Arable land and workers.
    ResourceGate,
}

impl EligibilityStage {
    /// Every stage, in run order.
    pub const ALL: [Self; 4] = [
        Self::Siting,
        Self::Neighborhood,
        Self::Limits,
        Self::ResourceGate,
    ];

    /// Stage name for logs and timings.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Siting => "siting",
            Self::Neighborhood => "neighborhood",
            Self::Limits => "limits",
            Self::ResourceGate => "resource gate",
        }
    }
}

impl core::fmt::Display for EligibilityStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// One template's candidate provinces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidates {
    /// Candidates owned by the evaluating state.
    pub state: Vec<ProvinceId>,
    /// Candidates owned by anyone else.
    pub others: Vec<ProvinceId>,
}

impl Candidates {
    /// Total number of candidates.
    pub fn len(&self) -> usize {
        self.state.len().saturating_add(self.others.len())
    }

    /// Whether both lists are empty.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty() && self.others.is_empty()
    }

    /// Every candidate, own provinces first.
    pub fn iter(&self) -> impl Iterator<Item = &ProvinceId> {
        self.state.iter().chain(self.others.iter())
    }

    /// Keep only the candidates for which `keep` holds. Returns the removed
    /// ones in list order.
    pub fn retain(&mut self, mut keep: impl FnMut(&ProvinceId) -> bool) -> Vec<ProvinceId> {
        let mut removed = Vec::new();
        for list in [&mut self.state, &mut self.others] {
            list.retain(|id| {
                let kept = keep(id);
                if !kept {
                    removed.push(id.clone());
                }
                kept
            });
        }
        removed
    }

    /// Empty both lists. Returns what they held.
    pub fn clear(&mut self) -> Vec<ProvinceId> {
        let mut removed = std::mem::take(&mut self.state);
        removed.append(&mut self.others);
        removed
    }
}

/// Render province ids as a comma-separated list.
pub fn join_ids(ids: &[ProvinceId]) -> String {
    ids.iter()
        .map(ProvinceId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Read-only inputs shared by every stage.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    /// The turn's entities.
    pub repo: &'a Repository,
    /// The evaluating state.
    pub state: &'a CountryName,
    /// Existing building counts.
    pub tallies: &'a BuildingTallies,
    /// Whether siting lists each template's candidates.
    pub report_matches: bool,
}

/// Runs the stages over a candidate table, one entry per template.
#[derive(Debug)]
pub struct Resolver<'a> {
    context: StageContext<'a>,
    candidates: Vec<Candidates>,
}

impl<'a> Resolver<'a> {
    /// Start with empty candidate lists for every template.
    pub fn new(context: StageContext<'a>) -> Self {
        Self {
            candidates: vec![Candidates::default(); context.repo.templates().len()],
            context,
        }
    }

    /// Current candidates, parallel to the repository's templates.
    pub fn candidates(&self) -> &[Candidates] {
        &self.candidates
    }

    /// Run one stage. On failure the candidates are left as they were.
    ///
    /// # Errors
    ///
    /// Returns the stage's [`StageError`].
    pub fn run(
        &mut self,
        stage: EligibilityStage,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), StageError> {
        let mut working = self.candidates.clone();
        let mut emitted = Diagnostics::new();
        match stage {
            EligibilityStage::Siting => siting::apply(&self.context, &mut working, &mut emitted)?,
            EligibilityStage::Neighborhood => {
                neighborhood::apply(&self.context, &mut working, &mut emitted)?;
            }
            EligibilityStage::Limits => limits::apply(&self.context, &mut working, &mut emitted)?,
            EligibilityStage::ResourceGate => {
                resources::apply(&self.context, &mut working, &mut emitted)?;
            }
        }
        self.candidates = working;
        diagnostics.append(emitted);
        Ok(())
    }

    /// Finish, handing back the candidate table.
    pub fn into_candidates(self) -> Vec<Candidates> {
        self.candidates
    }
}

/// Fail unless the table has exactly one entry per template.
pub(crate) fn check_table(repo: &Repository, candidates: &[Candidates]) -> Result<(), StageError> {
    let expected = repo.templates().len();
    if candidates.len() == expected {
        Ok(())
    } else {
        Err(StageError::CandidateMismatch {
            expected,
            found: candidates.len(),
        })
    }
}

/// Store the final lists on the templates as both matching and allowed
/// provinces.
///
/// # Errors
///
/// Returns [`StageError::CandidateMismatch`] if the table does not line up
/// with the templates; nothing is written in that case.
pub fn write_back(repo: &mut Repository, candidates: Vec<Candidates>) -> Result<(), StageError> {
    check_table(repo, &candidates)?;
    for (template, entry) in repo.templates_mut().iter_mut().zip(candidates) {
        template.allowed_building_state.clone_from(&entry.state);
        template.allowed_building_others.clone_from(&entry.others);
        template.matching_provinces_state = entry.state;
        template.matching_provinces_others = entry.others;
    }
    Ok(())
}
