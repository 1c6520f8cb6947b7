//! Turn pass: the fixed stage sequence run once per game turn.
//!
//! Each pass runs these stages, in order:
//!
//! 1. **Infrastructure** -- rebuild the state's province capacities from its
//!    active buildings (only when enabled in [`EngineConfig`]).
//! 2. **Eligibility** -- siting, neighborhood, limits and resource gate, each
//!    narrowing the previous stage's candidates.
//! 3. **Write back** -- store the candidate lists on the templates.
//! 4. **Domestic transport** -- what each province can deliver to the
//!    state capital.
//! 5. **Partner transport** -- what the state can deliver to each trade
//!    partner's capital (only when enabled).
//!
//! A stage that fails is logged, reported as a `[system]` diagnostic and
//! skipped without writing anything; the pass carries on with the next
//! stage. Nothing fails the pass as a whole.

use std::time::{Duration, Instant};

use provincia_types::{DiagnosticCategory, Diagnostics, RawSnapshot, TurnInput};
use provincia_world::{
    ProvinceFlow, Repository, aggregate_infrastructure, compute_domestic_availability,
    compute_partner_availability,
};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::eligibility::{EligibilityStage, Resolver, StageContext, write_back};
use crate::tallies::BuildingTallies;

/// How a stage ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The stage ran and its changes were applied.
    Completed,
    /// The stage was disabled or had nothing to work on.
    Skipped,
    /// The stage failed; its changes were discarded.
    Failed(String),
}

/// Timing of one stage of a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTiming {
    /// Stage name.
    pub name: &'static str,
    /// Wall-clock time spent in the stage.
    pub elapsed: Duration,
    /// How the stage ended.
    pub outcome: StageOutcome,
}

/// Everything a pass produced besides the repository writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReport {
    /// Diagnostics for the collaborator's turn log, in emission order.
    pub diagnostics: Diagnostics,
    /// One entry per stage, in run order.
    pub stages: Vec<StageTiming>,
    /// Per-province results of the domestic transport stage.
    pub domestic: Vec<ProvinceFlow>,
}

impl TurnReport {
    /// Stages that failed, in run order.
    pub fn failed_stages(&self) -> impl Iterator<Item = &StageTiming> {
        self.stages
            .iter()
            .filter(|timing| matches!(timing.outcome, StageOutcome::Failed(_)))
    }

    /// Outcome of the named stage, if it ran in this pass.
    pub fn outcome_of(&self, name: &str) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .find(|timing| timing.name == name)
            .map(|timing| &timing.outcome)
    }

    /// Record a stage result and hand back its value on success.
    fn finish<T, E: core::fmt::Display>(
        &mut self,
        name: &'static str,
        started: Instant,
        result: Result<T, E>,
    ) -> Option<T> {
        let elapsed = started.elapsed();
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        match result {
            Ok(value) => {
                debug!(stage = name, elapsed_ms, "Stage completed");
                self.diagnostics.push(
                    DiagnosticCategory::System,
                    format!("{name}: completed in {elapsed_ms} ms"),
                );
                self.stages.push(StageTiming {
                    name,
                    elapsed,
                    outcome: StageOutcome::Completed,
                });
                Some(value)
            }
            Err(err) => {
                warn!(stage = name, elapsed_ms, %err, "Stage failed; changes discarded");
                self.diagnostics.push(
                    DiagnosticCategory::System,
                    format!("{name}: failed ({err}); changes discarded"),
                );
                self.stages.push(StageTiming {
                    name,
                    elapsed,
                    outcome: StageOutcome::Failed(err.to_string()),
                });
                None
            }
        }
    }

    fn skip(&mut self, name: &'static str, reason: &str) {
        debug!(stage = name, reason, "Stage skipped");
        self.diagnostics.push(
            DiagnosticCategory::System,
            format!("{name}: skipped ({reason})"),
        );
        self.stages.push(StageTiming {
            name,
            elapsed: Duration::ZERO,
            outcome: StageOutcome::Skipped,
        });
    }
}

/// Decode a raw snapshot and load it into a repository.
///
/// Every rejected or corrected record becomes a diagnostic in `diagnostics`.
pub fn load_repository(raw: RawSnapshot, diagnostics: &mut Diagnostics) -> Repository {
    let (snapshot, mut errors) = raw.decode();
    let (repo, load_errors) = Repository::load(snapshot);
    errors.extend(load_errors);
    for err in &errors {
        diagnostics.push(err.category(), err.to_string());
    }
    if !errors.is_empty() {
        debug!(records = errors.len(), "Records rejected or corrected on load");
    }
    repo
}

/// Run one full pass for the evaluating state named in `input`.
///
/// Writes go straight into `repo`: template candidate lists, province
/// `available` maps, partner records and, when enabled, province capacities.
pub fn run_turn(repo: &mut Repository, input: &TurnInput, config: &EngineConfig) -> TurnReport {
    let state = &input.state_name;
    info!(
        state = %state,
        provinces = repo.province_count(),
        templates = repo.templates().len(),
        "Turn started"
    );
    let mut report = TurnReport::default();

    // --- Infrastructure ---
    if config.infrastructure.aggregate_from_buildings {
        let started = Instant::now();
        let result = aggregate_infrastructure(repo, state);
        if let Some(contributing) = report.finish("infrastructure", started, result) {
            debug!(contributing, "Province capacities rebuilt");
        }
    } else {
        report.skip("infrastructure", "disabled");
    }

    // --- Eligibility ---
    let tallies = BuildingTallies::from_repository(repo);
    let context = StageContext {
        repo,
        state,
        tallies: &tallies,
        report_matches: config.eligibility.report_matches,
    };
    let mut resolver = Resolver::new(context);
    let mut sited = false;
    for stage in EligibilityStage::ALL {
        let started = Instant::now();
        let result = resolver.run(stage, &mut report.diagnostics);
        let completed = report.finish(stage.name(), started, result).is_some();
        if stage == EligibilityStage::Siting {
            sited = completed;
        }
    }
    let candidates = resolver.into_candidates();

    // --- Write back ---
    // Without siting there is nothing to store; last turn's lists stay.
    if sited {
        let started = Instant::now();
        let result = write_back(repo, candidates);
        report.finish("write back", started, result);
    } else {
        report.skip("write back", "siting failed");
    }

    // --- Domestic transport ---
    let options = config.transport.options();
    let started = Instant::now();
    let result = compute_domestic_availability(
        repo,
        state,
        &input.accessible_countries,
        &options,
    );
    if let Some(transport) = report.finish("domestic transport", started, result) {
        report.diagnostics.append(transport.diagnostics);
        report.domestic = transport.flows;
    }

    // --- Partner transport ---
    if !config.transport.partner_routes {
        report.skip("partner transport", "disabled");
    } else if input.trade_agreements.is_empty() {
        report.skip("partner transport", "no trade agreements");
    } else {
        let started = Instant::now();
        let result =
            compute_partner_availability(repo, state, &input.trade_agreements, &options);
        if let Some(transport) = report.finish("partner transport", started, result) {
            report.diagnostics.append(transport.diagnostics);
        }
    }

    info!(
        state = %state,
        diagnostics = report.diagnostics.len(),
        failed = report.failed_stages().count(),
        "Turn complete"
    );
    report
}
