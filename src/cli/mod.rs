//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{BuildCommand, OsBuildCommand};

/// Generate GitHub Actions workflows from a typed pipeline model
#[derive(Debug, Parser, Clone)]
#[command(name = "pipeline-gen")]
#[command(author = "Pipeline Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Generate GitHub Actions build and release workflows", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to generator configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the runtime SDK version
    #[arg(long, global = true)]
    pub runtime_version: Option<String>,

    /// Override the directory workflows are written to
    #[arg(long, global = true)]
    pub output_dir: Option<String>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate the build, tag and publish workflow
    Build(BuildCommand),

    /// Generate a build-only workflow for one operating system
    OsBuild(OsBuildCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

use std::ffi::OsString;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{PublicationMode, TargetOs};

    #[test]
    fn test_parse_build() {
        let cli = Cli::try_parse_from([
            "pipeline-gen",
            "build",
            "--branch",
            "main",
            "--project",
            "App/App.csproj",
            "--output",
            "build.yml",
            "--publication",
            "environment",
        ])
        .unwrap();

        match cli.command {
            Command::Build(cmd) => {
                let params = cmd.parameters();
                assert_eq!(params.branch, "main");
                assert_eq!(params.project_path, "App/App.csproj");
                assert_eq!(params.output_file, "build.yml");
                assert_eq!(params.runs_on, None);
                assert_eq!(params.publication, PublicationMode::Environment);
            }
            other => panic!("Expected build command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_os_build_defaults_from_os() {
        let cli = Cli::try_parse_from([
            "pipeline-gen",
            "-v",
            "os-build",
            "--os",
            "windows",
            "--branch",
            "main",
            "--project",
            "App/App.csproj",
        ])
        .unwrap();
        assert!(cli.verbose);

        match cli.command {
            Command::OsBuild(cmd) => {
                assert_eq!(cmd.os.map(TargetOs::from), Some(TargetOs::Windows));
                assert_eq!(cmd.build_name(), "Windows Build");

                let params = cmd.parameters();
                assert_eq!(params.runs_on.as_deref(), Some("windows-latest"));
                assert_eq!(params.output_file, "windows-build.yml");
            }
            other => panic!("Expected os-build command, got {:?}", other),
        }
    }

    #[test]
    fn test_os_and_runs_on_conflict() {
        let result = Cli::try_parse_from([
            "pipeline-gen",
            "os-build",
            "--os",
            "linux",
            "--runs-on",
            "self-hosted",
            "--branch",
            "main",
            "--project",
            "App/App.csproj",
        ]);
        assert!(result.is_err());
    }
}
