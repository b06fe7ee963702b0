//! Init command implementation

use anyhow::{Context, Result};
use std::path::PathBuf;
use tagship_core::{CONFIG_FILE, PipelineConfig};

/// Write a starter tagship.toml; never overwrites an existing one
pub fn run(name: Option<String>, path: Option<PathBuf>) -> Result<()> {
    let dir = path.unwrap_or_else(|| PathBuf::from("."));
    let file = dir.join(CONFIG_FILE);

    if file.exists() {
        anyhow::bail!("{} already exists", file.display());
    }

    let name = match name {
        Some(name) => name,
        None => project_name(&dir)?,
    };

    let content = PipelineConfig::template(&name);
    // The starter file must itself be valid
    PipelineConfig::from_str(&content)
        .with_context(|| format!("Cannot generate configuration for project {name:?}"))?;

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    std::fs::write(&file, content)
        .with_context(|| format!("Failed to write {}", file.display()))?;

    println!("✓ Created {}", file.display());
    Ok(())
}

fn project_name(dir: &std::path::Path) -> Result<String> {
    let absolute = std::path::absolute(dir)
        .with_context(|| format!("Cannot resolve directory: {}", dir.display()))?;
    absolute
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("Cannot infer a project name; pass --name")
}
