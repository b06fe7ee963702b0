//! One pipeline run: build matrix, then assembly and publish for tag pushes

use crate::assembler::{ReleaseAssembler, ReleaseFiles};
use crate::executor::{BuildExecutor, CargoExecutor};
use crate::hosts::{DirectoryHost, GithubCliHost};
use crate::normalizer::{Normalizer, StripCommand, SymbolStripper};
use crate::orchestrator::{BuildMatrix, UnitReport};
use crate::publisher::{PublishOutcome, ReleaseHost, ReleasePublisher};
use crate::runners::RunnerPool;
use crate::staging::StagingArea;
use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::sync::Arc;
use tagship_core::{
    FailurePolicy, HostKind, PipelineConfig, PipelineError, PipelineResult, StripWarning,
    TargetSet, TriggerEvent,
};
use tagship_runtime::CancelSignal;
use tracing::Instrument;

/// Everything a run did, in a form suitable for `--json` output
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub trigger: TriggerEvent,
    pub units: Vec<UnitReport>,
    pub strip_warnings: Vec<StripWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<ReleaseFiles>,
    pub publish: PublishOutcome,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    pub error: Option<PipelineError>,
}

fn serialize_error<S: Serializer>(error: &Option<PipelineError>, s: S) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct ErrorView<'a> {
        kind: &'a str,
        message: String,
        exit_code: i32,
    }

    match error {
        Some(e) => ErrorView {
            kind: e.kind(),
            message: e.to_string(),
            exit_code: e.exit_code(),
        }
        .serialize(s),
        None => s.serialize_none(),
    }
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// The run's error, if any, or the report itself
    pub fn into_result(mut self) -> PipelineResult<Self> {
        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(self),
        }
    }
}

/// A configured release pipeline
pub struct Pipeline {
    targets: TargetSet,
    executor: Arc<dyn BuildExecutor>,
    stripper: Arc<dyn SymbolStripper>,
    runners: RunnerPool,
    policy: FailurePolicy,
    staging_dir: Option<PathBuf>,
    dist_dir: PathBuf,
    publisher: ReleasePublisher,
}

impl Pipeline {
    /// A pipeline with the system `strip`, one runner per host class, and
    /// a temporary staging area
    pub fn new(
        targets: TargetSet,
        executor: Arc<dyn BuildExecutor>,
        host: Arc<dyn ReleaseHost>,
    ) -> Self {
        Self {
            targets,
            executor,
            stripper: Arc::new(StripCommand::new()),
            runners: RunnerPool::default(),
            policy: FailurePolicy::default(),
            staging_dir: None,
            dist_dir: PathBuf::from("dist"),
            publisher: ReleasePublisher::new(host),
        }
    }

    /// Wire up the cargo executor and the configured release host
    pub fn from_config(config: &PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        let project_dir = config.project.path.clone();

        let executor = CargoExecutor::new(&project_dir, config.binary())
            .with_cross(config.project.use_cross);

        let host: Arc<dyn ReleaseHost> = match config.publish.host {
            HostKind::Github => Arc::new(
                GithubCliHost::new()
                    .with_repo(config.publish.repo.clone())
                    .with_workdir(&project_dir),
            ),
            HostKind::Directory => Arc::new(DirectoryHost::new(&config.publish.root)),
        };

        let mut runners = RunnerPool::new(config.pipeline.max_parallel);
        for (environment, capacity) in &config.runners {
            runners = runners.with_capacity(environment, *capacity);
        }

        let mut pipeline = Self::new(config.target_set()?, Arc::new(executor), host)
            .with_runners(runners)
            .with_failure_policy(config.pipeline.failure_policy)
            .with_dist_dir(&config.pipeline.dist_dir)
            .with_repo_dir(&project_dir);
        pipeline.staging_dir = config.pipeline.staging_dir.clone();
        Ok(pipeline)
    }

    pub fn with_stripper(mut self, stripper: Arc<dyn SymbolStripper>) -> Self {
        self.stripper = stripper;
        self
    }

    pub fn with_runners(mut self, runners: RunnerPool) -> Self {
        self.runners = runners;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Stage under a fixed directory instead of a temporary one
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    pub fn with_dist_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dist_dir = dir.into();
        self
    }

    pub fn with_repo_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.publisher = self.publisher.with_repo_dir(dir);
        self
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    /// Run and convert the report into the run's result
    pub async fn run(
        &self,
        trigger: &TriggerEvent,
        cancel: CancelSignal,
    ) -> PipelineResult<RunReport> {
        self.execute(trigger, cancel).await.into_result()
    }

    /// Run to completion and report every stage, including the error that
    /// ended the run, if any.
    ///
    /// Assembly starts only after every unit succeeded; publish only after
    /// assembly collected one file per target. The staging area is removed
    /// before this returns.
    pub async fn execute(&self, trigger: &TriggerEvent, cancel: CancelSignal) -> RunReport {
        let span = tracing::info_span!("run", trigger = %trigger);
        self.execute_stages(trigger, cancel).instrument(span).await
    }

    async fn execute_stages(&self, trigger: &TriggerEvent, cancel: CancelSignal) -> RunReport {
        tracing::info!(targets = self.targets.len(), "pipeline run started");

        let mut report = RunReport {
            trigger: trigger.clone(),
            units: Vec::new(),
            strip_warnings: Vec::new(),
            release: None,
            publish: PublishOutcome::skipped("run did not reach publish"),
            error: None,
        };

        let staging = match self.open_staging() {
            Ok(staging) => Arc::new(staging),
            Err(error) => return fail(report, error),
        };

        let matrix = BuildMatrix::new(
            self.targets.clone(),
            self.executor.clone(),
            Normalizer::new(self.stripper.clone()),
            staging.clone(),
            self.runners.clone(),
            self.policy,
        );
        let matrix_report = matrix.run(cancel.clone()).await;
        let failure = matrix_report.failure();
        report.strip_warnings = matrix_report.strip_warnings().into_iter().cloned().collect();
        report.units = matrix_report.units;
        if let Some(error) = failure {
            return fail(report, error);
        }
        tracing::info!(staged = staging.len(), "all build units succeeded");

        if !trigger.publishes() {
            tracing::info!("manual run: artifacts staged, skipping assembly and publish");
            report.publish = PublishOutcome::skipped("manual invocation never publishes");
            return report;
        }

        if cancel.is_triggered() {
            return fail(report, PipelineError::Cancelled);
        }
        let assembler = ReleaseAssembler::new(&self.dist_dir);
        let release = match assembler.assemble(&staging, &self.targets).await {
            Ok(release) => release,
            Err(error) => return fail(report, error),
        };
        drop(matrix);
        drop(staging);

        if cancel.is_triggered() {
            report.release = Some(release);
            return fail(report, PipelineError::Cancelled);
        }
        let published = self.publisher.publish(trigger, &release).await;
        report.release = Some(release);
        match published {
            Ok(outcome) => {
                report.publish = outcome;
                report
            }
            Err(error) => fail(report, error),
        }
    }

    fn open_staging(&self) -> PipelineResult<StagingArea> {
        match &self.staging_dir {
            Some(dir) => StagingArea::at(dir),
            None => StagingArea::temporary(),
        }
    }
}

fn fail(mut report: RunReport, error: PipelineError) -> RunReport {
    tracing::error!(kind = error.kind(), error = %error, "pipeline run failed");
    report.error = Some(error);
    report
}
