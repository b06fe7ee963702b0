//! Check command implementation

use anyhow::{Context, Result};
use std::path::PathBuf;
use tagship_core::{HostKind, PipelineConfig};

/// Validate the configuration and print what it resolves to
pub fn run(config: Option<PathBuf>) -> Result<()> {
    let path = crate::config_path(config);

    println!("Checking configuration: {}", path.display());

    let config = PipelineConfig::from_file(&path)
        .with_context(|| format!("Invalid configuration: {}", path.display()))?;
    let targets = config.target_set()?;

    println!("✓ Project: {} (binary {})", config.project.name, config.binary());
    println!("✓ Targets: {}", targets.len());
    println!("✓ Failure policy: {:?}", config.pipeline.failure_policy);
    match config.publish.host {
        HostKind::Github => println!(
            "✓ Host: github{}",
            config
                .publish
                .repo
                .as_deref()
                .map(|r| format!(" ({r})"))
                .unwrap_or_default()
        ),
        HostKind::Directory => {
            println!("✓ Host: directory ({})", config.publish.root.display())
        }
    }
    println!("\nConfiguration is valid!");

    Ok(())
}
