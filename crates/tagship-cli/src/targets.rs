//! Targets command implementation

use anyhow::{Context, Result};
use std::path::PathBuf;
use tagship_core::PipelineConfig;

/// Print one line per build unit: artifact, triple, and host class
pub fn run(config: Option<PathBuf>) -> Result<()> {
    let path = crate::config_path(config);
    let config = PipelineConfig::from_file(&path)
        .with_context(|| format!("Failed to load configuration: {}", path.display()))?;
    let targets = config.target_set()?;

    let width = targets
        .iter()
        .map(|t| t.file_name().len())
        .max()
        .unwrap_or(0);

    for target in &targets {
        println!(
            "{:<width$}  {:<28}  {} (x{})",
            target.file_name(),
            target.triple,
            target.environment,
            config.runner_capacity(&target.environment),
        );
    }
    println!("\n{} targets", targets.len());
    Ok(())
}
