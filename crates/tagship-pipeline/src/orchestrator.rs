//! Build Matrix Orchestrator
//!
//! One task per target runs build, normalize, and stage. Units share nothing
//! mutable except the staging area, whose keys are exclusive per unit, and a
//! halt flag that keeps units from starting once a sibling failed.

use crate::artifact::NormalizedArtifact;
use crate::executor::BuildExecutor;
use crate::normalizer::Normalizer;
use crate::runners::RunnerPool;
use crate::staging::StagingArea;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tagship_core::{
    FailurePolicy, PipelineError, PipelineResult, StripWarning, TargetDescriptor, TargetSet,
};
use tagship_runtime::CancelSignal;
use tokio::task::{Id, JoinSet};
use tracing::Instrument;

/// Terminal status of one build unit
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitOutcome {
    Succeeded {
        artifact: String,
        sha256: String,
        symbols_stripped: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        strip_warning: Option<StripWarning>,
    },
    Failed {
        #[serde(serialize_with = "display_error")]
        error: PipelineError,
    },
    /// Never started because a sibling failed first
    Skipped,
    /// Aborted while in flight
    Cancelled,
}

fn display_error<S: Serializer>(error: &PipelineError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}

impl UnitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UnitOutcome::Succeeded { .. })
    }

    fn succeeded(artifact: &NormalizedArtifact, strip_warning: Option<StripWarning>) -> Self {
        UnitOutcome::Succeeded {
            artifact: artifact.name.clone(),
            sha256: artifact.sha256.clone(),
            symbols_stripped: artifact.symbols_stripped,
            strip_warning,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnitReport {
    pub triple: String,
    pub environment: String,
    pub artifact_name: String,
    #[serde(flatten)]
    pub outcome: UnitOutcome,
}

/// Outcome of every unit, in target-set order
#[derive(Debug, Serialize)]
pub struct MatrixReport {
    pub units: Vec<UnitReport>,
    pub cancelled: bool,
}

impl MatrixReport {
    pub fn all_succeeded(&self) -> bool {
        !self.cancelled && self.units.iter().all(|u| u.outcome.is_success())
    }

    pub fn succeeded(&self) -> usize {
        self.units.iter().filter(|u| u.outcome.is_success()).count()
    }

    pub fn strip_warnings(&self) -> Vec<&StripWarning> {
        self.units
            .iter()
            .filter_map(|u| match &u.outcome {
                UnitOutcome::Succeeded {
                    strip_warning: Some(w),
                    ..
                } => Some(w),
                _ => None,
            })
            .collect()
    }

    /// Why the matrix did not fully succeed: `Cancelled` for a cancelled
    /// run, else the first failure in target order.
    pub fn failure(&self) -> Option<PipelineError> {
        if self.cancelled {
            return Some(PipelineError::Cancelled);
        }
        let failed = self.units.iter().find_map(|u| match &u.outcome {
            UnitOutcome::Failed { error } => Some(error.clone()),
            _ => None,
        });
        failed.or_else(|| {
            self.units
                .iter()
                .any(|u| !u.outcome.is_success())
                .then_some(PipelineError::Cancelled)
        })
    }

    pub fn into_result(self) -> PipelineResult<Self> {
        match self.failure() {
            Some(error) => Err(error),
            None => Ok(self),
        }
    }
}

struct UnitContext {
    executor: Arc<dyn BuildExecutor>,
    normalizer: Normalizer,
    staging: Arc<StagingArea>,
    runners: RunnerPool,
    halt: AtomicBool,
}

/// Runs one independent build unit per target
pub struct BuildMatrix {
    targets: TargetSet,
    ctx: Arc<UnitContext>,
    policy: FailurePolicy,
}

impl BuildMatrix {
    pub fn new(
        targets: TargetSet,
        executor: Arc<dyn BuildExecutor>,
        normalizer: Normalizer,
        staging: Arc<StagingArea>,
        runners: RunnerPool,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            targets,
            ctx: Arc::new(UnitContext {
                executor,
                normalizer,
                staging,
                runners,
                halt: AtomicBool::new(false),
            }),
            policy,
        }
    }

    /// Dispatch every unit and wait until each one reached a terminal status
    pub async fn run(&self, mut cancel: CancelSignal) -> MatrixReport {
        let targets: Vec<TargetDescriptor> = self.targets.iter().cloned().collect();
        let mut outcomes: Vec<Option<UnitOutcome>> = targets.iter().map(|_| None).collect();
        let mut task_index: HashMap<Id, usize> = HashMap::new();
        let mut set = JoinSet::new();

        for (idx, target) in targets.iter().enumerate() {
            let ctx = self.ctx.clone();
            let target = target.clone();
            let span = tracing::info_span!("unit", artifact = %target.artifact_name);
            let handle = set.spawn(run_unit(ctx, target).instrument(span));
            task_index.insert(handle.id(), idx);
        }

        let mut cancelled = false;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::warn!("cancelling in-flight build units");
                    cancelled = true;
                    set.abort_all();
                    break;
                }
                next = set.join_next_with_id() => {
                    let Some(joined) = next else { break };
                    let (idx, outcome) = resolve(&task_index, &targets, joined);
                    let failed = matches!(outcome, UnitOutcome::Failed { .. });
                    outcomes[idx] = Some(outcome);

                    if failed && self.policy == FailurePolicy::FailFast {
                        tracing::warn!("fail-fast: aborting remaining build units");
                        set.abort_all();
                        break;
                    }
                }
            }
        }

        // Aborted tasks are dropped here, which kills their child processes
        while let Some(joined) = set.join_next_with_id().await {
            let (idx, outcome) = resolve(&task_index, &targets, joined);
            outcomes[idx] = Some(outcome);
        }

        let units = targets
            .into_iter()
            .zip(outcomes)
            .map(|(target, outcome)| UnitReport {
                triple: target.triple,
                environment: target.environment,
                artifact_name: target.artifact_name,
                outcome: outcome.unwrap_or(UnitOutcome::Cancelled),
            })
            .collect();

        MatrixReport { units, cancelled }
    }
}

fn resolve(
    task_index: &HashMap<Id, usize>,
    targets: &[TargetDescriptor],
    joined: Result<(Id, UnitOutcome), tokio::task::JoinError>,
) -> (usize, UnitOutcome) {
    match joined {
        Ok((id, outcome)) => (task_index[&id], outcome),
        Err(e) => {
            let idx = task_index[&e.id()];
            let outcome = if e.is_cancelled() {
                UnitOutcome::Cancelled
            } else {
                UnitOutcome::Failed {
                    error: PipelineError::build_failure(
                        &targets[idx].triple,
                        format!("build unit panicked: {e}"),
                    ),
                }
            };
            (idx, outcome)
        }
    }
}

async fn run_unit(ctx: Arc<UnitContext>, target: TargetDescriptor) -> UnitOutcome {
    let _permit = match ctx.runners.acquire(&target.environment).await {
        Ok(permit) => permit,
        Err(error) => return UnitOutcome::Failed { error },
    };

    if ctx.halt.load(Ordering::SeqCst) {
        tracing::info!("skipped: a sibling unit failed");
        return UnitOutcome::Skipped;
    }

    match build_and_stage(&ctx, &target).await {
        Ok((artifact, warning)) => {
            tracing::info!(artifact = %artifact.name, sha256 = %artifact.sha256, "unit succeeded");
            UnitOutcome::succeeded(&artifact, warning)
        }
        Err(error) => {
            tracing::error!(triple = %target.triple, error = %error, "unit failed");
            ctx.halt.store(true, Ordering::SeqCst);
            UnitOutcome::Failed { error }
        }
    }
}

async fn build_and_stage(
    ctx: &UnitContext,
    target: &TargetDescriptor,
) -> PipelineResult<(NormalizedArtifact, Option<StripWarning>)> {
    let raw = ctx.executor.build(target).await?;
    let (artifact, warning) = ctx.normalizer.normalize(raw).await?;
    ctx.staging.stage(&artifact).await?;
    Ok((artifact, warning))
}
