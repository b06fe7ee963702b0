//! Release notes from git history, for hosts that cannot generate their own

use std::path::Path;
use std::process::Stdio;
use tagship_core::VersionTag;
use tokio::process::Command;

/// Notes for `tag`: the commits since the previous tag, then the artifacts.
///
/// Falls back to a one-line summary when git is unavailable or the tag is
/// unknown to the repository.
pub async fn generate_notes(repo_dir: &Path, tag: &VersionTag, artifacts: &[&str]) -> String {
    let previous = git(repo_dir, &["describe", "--tags", "--abbrev=0", &format!("{tag}^")]).await;
    let range = match &previous {
        Some(prev) => format!("{prev}..{tag}"),
        None => tag.to_string(),
    };
    let commits: Vec<String> = git(repo_dir, &["log", "--pretty=format:%s (%h)", &range])
        .await
        .map(|log| log.lines().map(str::to_string).collect())
        .unwrap_or_default();

    if commits.is_empty() {
        tracing::debug!(tag = %tag, "no git history available for notes");
    }
    render_notes(tag, previous.as_deref(), &commits, artifacts)
}

/// Markdown body of a release
pub fn render_notes(
    tag: &VersionTag,
    previous: Option<&str>,
    commits: &[String],
    artifacts: &[&str],
) -> String {
    let mut notes = format!("## {tag}\n\n");

    if commits.is_empty() {
        notes.push_str(&format!("Release {tag}.\n"));
    } else {
        match previous {
            Some(prev) => notes.push_str(&format!("Changes since {prev}:\n\n")),
            None => notes.push_str("Changes:\n\n"),
        }
        for commit in commits {
            notes.push_str(&format!("- {commit}\n"));
        }
    }

    if !artifacts.is_empty() {
        notes.push_str("\n### Artifacts\n\n");
        for name in artifacts {
            notes.push_str(&format!("- `{name}`\n"));
        }
    }
    notes
}

async fn git(repo_dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}
