//! Hosted runner labels

use serde::{Deserialize, Serialize};

pub const UBUNTU_LATEST: &str = "ubuntu-latest";
pub const WINDOWS_LATEST: &str = "windows-latest";
pub const MACOS_LATEST: &str = "macos-latest";

/// Operating systems an OS-specific build can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOs {
    Linux,
    Windows,
    Macos,
}

impl TargetOs {
    /// Runner label for this OS
    pub fn runner_label(self) -> &'static str {
        match self {
            TargetOs::Linux => UBUNTU_LATEST,
            TargetOs::Windows => WINDOWS_LATEST,
            TargetOs::Macos => MACOS_LATEST,
        }
    }

    /// Workflow name used when none is given
    pub fn build_name(self) -> &'static str {
        match self {
            TargetOs::Linux => "Linux Build",
            TargetOs::Windows => "Windows Build",
            TargetOs::Macos => "macOS Build",
        }
    }

    /// Output file name used when none is given
    pub fn default_output_file(self) -> &'static str {
        match self {
            TargetOs::Linux => "linux-build.yml",
            TargetOs::Windows => "windows-build.yml",
            TargetOs::Macos => "macos-build.yml",
        }
    }
}
