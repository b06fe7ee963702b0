//! Trigger events and version tags

use crate::error::{PipelineError, PipelineResult};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A pushed tag of the form `v<version>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VersionTag(String);

impl VersionTag {
    /// Parse a tag name, accepting an optional `refs/tags/` prefix.
    ///
    /// The name must be `v` followed by a version starting with a digit,
    /// made only of ASCII alphanumerics, `.`, `+` and `-`. The tag names a
    /// release directory on some hosts, so `..` is rejected as well.
    pub fn parse(name: &str) -> PipelineResult<Self> {
        let name = name.trim();
        let tag = name.strip_prefix("refs/tags/").unwrap_or(name);

        let valid = tag.strip_prefix('v').is_some_and(|rest| {
            rest.starts_with(|c: char| c.is_ascii_digit())
                && rest
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'))
                && !rest.contains("..")
        });

        if !valid {
            return Err(PipelineError::InvalidTag(name.to_string()));
        }

        Ok(Self(tag.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Semantic version behind the tag, if it parses as one.
    ///
    /// Short forms such as `v1.2` are read as `1.2.0`.
    pub fn version(&self) -> Option<semver::Version> {
        let raw = &self.0[1..];
        if let Ok(v) = semver::Version::parse(raw) {
            return Some(v);
        }

        let (core, rest) = match raw.find(['-', '+']) {
            Some(idx) => raw.split_at(idx),
            None => (raw, ""),
        };
        let padded = match core.split('.').count() {
            1 => format!("{core}.0.0{rest}"),
            2 => format!("{core}.0{rest}"),
            _ => return None,
        };
        semver::Version::parse(&padded).ok()
    }

    /// Whether the version carries a pre-release component (`-rc.1`, `-beta`)
    pub fn is_prerelease_version(&self) -> bool {
        self.version().is_some_and(|v| !v.pre.is_empty())
    }
}

impl FromStr for VersionTag {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What started a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TriggerEvent {
    /// A version tag was pushed: build, assemble, and publish
    TagPush { tag: VersionTag },
    /// Operator-initiated run: build and stage only
    Manual,
}

impl TriggerEvent {
    pub fn tag_push(tag: &str) -> PipelineResult<Self> {
        Ok(TriggerEvent::TagPush {
            tag: VersionTag::parse(tag)?,
        })
    }

    /// Only tag pushes reach assembly and publish
    pub fn publishes(&self) -> bool {
        matches!(self, TriggerEvent::TagPush { .. })
    }

    pub fn tag(&self) -> Option<&VersionTag> {
        match self {
            TriggerEvent::TagPush { tag } => Some(tag),
            TriggerEvent::Manual => None,
        }
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerEvent::TagPush { tag } => write!(f, "tag push {tag}"),
            TriggerEvent::Manual => write!(f, "manual"),
        }
    }
}
