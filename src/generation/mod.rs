//! Assembling and writing the standard build workflows

pub mod runners;
pub mod service;

pub use runners::TargetOs;
pub use service::{
    BuildParameters, GenerationSummary, JobSummary, PublicationMode, ScriptGenerationService,
};
