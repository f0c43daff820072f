//! CLI command definitions

use clap::Args;
use crate::generation::{BuildParameters, PublicationMode, TargetOs};

const DEFAULT_BUILD_NAME: &str = "Build";
const DEFAULT_OUTPUT_FILE: &str = "build.yml";

/// Generate the build, tag and publish workflow
#[derive(Debug, Args, Clone)]
pub struct BuildCommand {
    /// Branch the workflow triggers on
    #[arg(short, long)]
    pub branch: String,

    /// Project descriptor path, relative to the repository root
    #[arg(short, long)]
    pub project: String,

    /// Workflow file name inside the output directory
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output: String,

    /// Runner label for every job
    #[arg(long)]
    pub runs_on: Option<String>,

    /// How extracted properties reach later steps
    #[arg(long, value_enum, default_value_t = PublicationArg::StepOutput)]
    pub publication: PublicationArg,

    /// Print the workflow instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Print a JSON summary after writing
    #[arg(long)]
    pub json: bool,
}

impl BuildCommand {
    pub fn parameters(&self) -> BuildParameters {
        let params = BuildParameters::new(&self.branch, &self.project, &self.output)
            .with_publication(self.publication.into());
        match &self.runs_on {
            Some(runs_on) => params.with_runs_on(runs_on),
            None => params,
        }
    }
}

/// Generate a build-only workflow for one operating system
#[derive(Debug, Args, Clone)]
pub struct OsBuildCommand {
    /// Workflow name (defaults to one derived from --os)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Branch the workflow triggers on
    #[arg(short, long)]
    pub branch: String,

    /// Project descriptor path, relative to the repository root
    #[arg(short, long)]
    pub project: String,

    /// Workflow file name (defaults to one derived from --os)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Operating system to build on
    #[arg(long, value_enum, conflicts_with = "runs_on")]
    pub os: Option<OsArg>,

    /// Explicit runner label
    #[arg(long)]
    pub runs_on: Option<String>,

    /// Print the workflow instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Print a JSON summary after writing
    #[arg(long)]
    pub json: bool,
}

impl OsBuildCommand {
    pub fn build_name(&self) -> String {
        match (&self.name, self.os) {
            (Some(name), _) => name.clone(),
            (None, Some(os)) => TargetOs::from(os).build_name().to_string(),
            (None, None) => DEFAULT_BUILD_NAME.to_string(),
        }
    }

    pub fn parameters(&self) -> BuildParameters {
        let os = self.os.map(TargetOs::from);

        let output = match (&self.output, os) {
            (Some(output), _) => output.clone(),
            (None, Some(os)) => os.default_output_file().to_string(),
            (None, None) => DEFAULT_OUTPUT_FILE.to_string(),
        };

        let params = BuildParameters::new(&self.branch, &self.project, output);
        match (&self.runs_on, os) {
            (Some(runs_on), _) => params.with_runs_on(runs_on),
            (None, Some(os)) => params.with_runs_on(os.runner_label()),
            (None, None) => params,
        }
    }
}

/// Publication mode argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PublicationArg {
    #[clap(name = "step-output")]
    StepOutput,
    Environment,
}

impl From<PublicationArg> for PublicationMode {
    fn from(arg: PublicationArg) -> Self {
        match arg {
            PublicationArg::StepOutput => PublicationMode::StepOutput,
            PublicationArg::Environment => PublicationMode::Environment,
        }
    }
}

/// Operating system argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OsArg {
    Linux,
    Windows,
    Macos,
}

impl From<OsArg> for TargetOs {
    fn from(arg: OsArg) -> Self {
        match arg {
            OsArg::Linux => TargetOs::Linux,
            OsArg::Windows => TargetOs::Windows,
            OsArg::Macos => TargetOs::Macos,
        }
    }
}
