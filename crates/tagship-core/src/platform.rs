//! Platform identification for build targets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating-system family a platform belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFamily {
    Linux,
    Macos,
    Windows,
}

impl PlatformFamily {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported platform targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    /// Linux on x86_64.
    #[serde(rename = "linux-x86_64")]
    LinuxX86_64,
    /// Linux on ARM64.
    #[serde(rename = "linux-aarch64")]
    LinuxAarch64,
    /// macOS on x86_64 (Intel).
    #[serde(rename = "macos-x86_64")]
    MacosX86_64,
    /// macOS on ARM64 (Apple Silicon).
    #[serde(rename = "macos-aarch64")]
    MacosAarch64,
    /// Windows on x86_64.
    #[serde(rename = "windows-x86_64")]
    WindowsX86_64,
    /// Windows on ARM64.
    #[serde(rename = "windows-aarch64")]
    WindowsAarch64,
}

impl Platform {
    /// Detect the platform of the machine running the pipeline.
    #[must_use]
    pub fn current() -> Option<Self> {
        let arch = std::env::consts::ARCH;
        let os = std::env::consts::OS;

        match (os, arch) {
            ("linux", "x86_64") => Some(Self::LinuxX86_64),
            ("linux", "aarch64") => Some(Self::LinuxAarch64),
            ("macos", "x86_64") => Some(Self::MacosX86_64),
            ("macos", "aarch64") => Some(Self::MacosAarch64),
            ("windows", "x86_64") => Some(Self::WindowsX86_64),
            ("windows", "aarch64") => Some(Self::WindowsAarch64),
            _ => None,
        }
    }

    /// Get the platform key string (e.g., "linux-x86_64").
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LinuxX86_64 => "linux-x86_64",
            Self::LinuxAarch64 => "linux-aarch64",
            Self::MacosX86_64 => "macos-x86_64",
            Self::MacosAarch64 => "macos-aarch64",
            Self::WindowsX86_64 => "windows-x86_64",
            Self::WindowsAarch64 => "windows-aarch64",
        }
    }

    /// Parse a platform from its key string.
    ///
    /// `darwin-*` is accepted as an alias for `macos-*`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "linux-x86_64" => Some(Self::LinuxX86_64),
            "linux-aarch64" => Some(Self::LinuxAarch64),
            "macos-x86_64" | "darwin-x86_64" => Some(Self::MacosX86_64),
            "macos-aarch64" | "darwin-aarch64" => Some(Self::MacosAarch64),
            "windows-x86_64" => Some(Self::WindowsX86_64),
            "windows-aarch64" => Some(Self::WindowsAarch64),
            _ => None,
        }
    }

    #[must_use]
    pub fn family(&self) -> PlatformFamily {
        match self {
            Self::LinuxX86_64 | Self::LinuxAarch64 => PlatformFamily::Linux,
            Self::MacosX86_64 | Self::MacosAarch64 => PlatformFamily::Macos,
            Self::WindowsX86_64 | Self::WindowsAarch64 => PlatformFamily::Windows,
        }
    }

    #[must_use]
    pub fn arch(&self) -> &'static str {
        match self {
            Self::LinuxX86_64 | Self::MacosX86_64 | Self::WindowsX86_64 => "x86_64",
            Self::LinuxAarch64 | Self::MacosAarch64 | Self::WindowsAarch64 => "aarch64",
        }
    }

    /// Executable suffix for binaries built for this platform.
    ///
    /// Only the Windows family carries one.
    #[must_use]
    pub fn executable_suffix(&self) -> &'static str {
        match self.family() {
            PlatformFamily::Windows => ".exe",
            PlatformFamily::Linux | PlatformFamily::Macos => "",
        }
    }

    /// Whether debug symbols are stripped from binaries for this platform.
    #[must_use]
    pub fn strips_symbols(&self) -> bool {
        self.family() != PlatformFamily::Windows
    }

    /// Get the Rust target triple for this platform.
    #[must_use]
    pub fn rust_target(&self) -> &'static str {
        match self {
            Self::LinuxX86_64 => "x86_64-unknown-linux-gnu",
            Self::LinuxAarch64 => "aarch64-unknown-linux-gnu",
            Self::MacosX86_64 => "x86_64-apple-darwin",
            Self::MacosAarch64 => "aarch64-apple-darwin",
            Self::WindowsX86_64 => "x86_64-pc-windows-msvc",
            Self::WindowsAarch64 => "aarch64-pc-windows-msvc",
        }
    }

    /// Execution environment class that builds this platform by default.
    ///
    /// Linux aarch64 is cross-compiled on the x86_64 Linux host class.
    #[must_use]
    pub fn default_environment(&self) -> &'static str {
        match self.family() {
            PlatformFamily::Linux => "ubuntu-latest",
            PlatformFamily::Macos => "macos-latest",
            PlatformFamily::Windows => "windows-latest",
        }
    }

    /// Get all supported platforms.
    #[must_use]
    pub fn all() -> &'static [Platform] {
        &[
            Self::LinuxX86_64,
            Self::LinuxAarch64,
            Self::MacosX86_64,
            Self::MacosAarch64,
            Self::WindowsX86_64,
            Self::WindowsAarch64,
        ]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
