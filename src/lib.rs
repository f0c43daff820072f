//! pipeline-gen - typed generator for GitHub Actions workflows

pub mod cli;
pub mod core;
pub mod emit;
pub mod generation;

// Re-export commonly used types
pub use crate::core::{Expression, Job, Pipeline, PipelineError, Step, Triggers};
pub use crate::core::config::GeneratorConfig;
pub use emit::{serialize, write_to_file};
pub use generation::{BuildParameters, PublicationMode, ScriptGenerationService, TargetOs};
