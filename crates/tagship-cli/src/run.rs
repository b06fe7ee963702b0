//! Run command implementation

use anyhow::{Context, Result};
use std::path::PathBuf;
use tagship_core::{LogLevel, PipelineConfig, TriggerEvent};
use tagship_logging::RunEventCounter;
use tagship_pipeline::{Pipeline, PublishOutcome, RunReport, UnitOutcome};
use tagship_runtime::PipelineRuntime;

/// Run the pipeline for a tag push (`tag` set) or a manual invocation
pub fn run(
    tag: Option<String>,
    config: Option<PathBuf>,
    json: bool,
    flag_level: Option<LogLevel>,
    events: &RunEventCounter,
) -> Result<()> {
    let trigger = match tag {
        Some(tag) => TriggerEvent::tag_push(&tag)?,
        None => TriggerEvent::Manual,
    };

    let path = crate::config_path(config);
    let config = PipelineConfig::from_file(&path)
        .with_context(|| format!("Failed to load configuration: {}", path.display()))?;
    if flag_level.is_none() {
        apply_configured_level(&config);
    }
    let pipeline = Pipeline::from_config(&config)?;

    let runtime = PipelineRuntime::with_defaults().context("Failed to start runtime")?;
    runtime.cancel_on_ctrl_c();

    tracing::info!(project = %config.project.name, trigger = %trigger, "starting release pipeline");
    let report = runtime.block_on(pipeline.execute(&trigger, runtime.cancel_signal()));

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, events);
    }

    report.into_result()?;
    Ok(())
}

/// `[logging] level` from the config; `-v`/`-q` and `RUST_LOG` win over it
fn apply_configured_level(config: &PipelineConfig) {
    let Some(level) = config.log_level() else {
        return;
    };
    match tagship_logging::apply_level(level) {
        Ok(true) => tracing::debug!(%level, "applied configured log level"),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "cannot apply configured log level"),
    }
}

fn print_summary(report: &RunReport, events: &RunEventCounter) {
    println!("Trigger: {}", report.trigger);
    println!();
    for unit in &report.units {
        match &unit.outcome {
            UnitOutcome::Succeeded {
                artifact,
                symbols_stripped,
                ..
            } => {
                let stripped = if *symbols_stripped { "stripped" } else { "unstripped" };
                println!("✓ {artifact} ({}, {stripped})", unit.triple);
            }
            UnitOutcome::Failed { error } => println!("✗ {} failed: {error}", unit.artifact_name),
            UnitOutcome::Skipped => println!("- {} skipped", unit.artifact_name),
            UnitOutcome::Cancelled => println!("- {} cancelled", unit.artifact_name),
        }
    }

    for warning in &report.strip_warnings {
        println!("! {warning}");
    }

    if let Some(release) = &report.release {
        println!("\nAssembled {} files in {}", release.len(), release.dir.display());
    }

    match &report.publish {
        PublishOutcome::Published { tag, id, host, .. } => {
            println!("\n✓ Published {tag} to {host}: {id}");
        }
        PublishOutcome::Skipped { reason } => println!("\nPublish skipped: {reason}"),
    }

    let warnings = events.warnings();
    if warnings > 0 {
        println!("{warnings} warning(s) logged");
    }
}
