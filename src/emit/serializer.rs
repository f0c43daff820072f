//! Deterministic pipeline serializer

use crate::core::{Pipeline, PipelineError, Result};
use crate::emit::document::{JobDocument, WorkflowDocument};
use crate::emit::render::render_step;
use indexmap::IndexMap;
use tracing::debug;

/// Header written at the top of every generated file
pub const GENERATED_HEADER: &str = "# Generated by pipeline-gen - do not edit manually\n\n";

/// Render a pipeline to workflow YAML.
///
/// Dependencies are checked before anything is rendered. Keys come out in
/// insertion order, so identical pipelines always give identical text.
pub fn serialize(pipeline: &Pipeline) -> Result<String> {
    preflight(pipeline)?;

    let document = build_document(pipeline)?;
    let yaml = serde_yaml::to_string(&document)?;

    Ok(format!("{GENERATED_HEADER}{yaml}"))
}

fn preflight(pipeline: &Pipeline) -> Result<()> {
    if pipeline.triggers().is_empty() {
        return Err(PipelineError::configuration(
            format!("pipeline '{}'", pipeline.name()),
            "no trigger configured",
        ));
    }

    if pipeline.jobs().is_empty() {
        return Err(PipelineError::configuration(
            format!("pipeline '{}'", pipeline.name()),
            "no jobs defined",
        ));
    }

    pipeline.validate_dependencies()?;

    // The runner rejects a job with an empty step list
    if let Some((name, _)) = pipeline.jobs().iter().find(|(_, job)| job.steps().is_empty()) {
        return Err(PipelineError::configuration(
            format!("job '{}'", name),
            "no steps defined",
        ));
    }

    Ok(())
}

/// Build the serde document for a validated pipeline
pub fn build_document(pipeline: &Pipeline) -> Result<WorkflowDocument> {
    let mut jobs = IndexMap::with_capacity(pipeline.jobs().len());

    for (name, job) in pipeline.jobs() {
        let steps = job
            .steps()
            .iter()
            .map(render_step)
            .collect::<Result<Vec<_>>>()?;

        let condition = job.condition().map(|c| c.body()).transpose()?;

        debug!("Rendered job '{}' with {} steps", name, steps.len());

        jobs.insert(
            name.clone(),
            JobDocument {
                runs_on: job.runs_on().to_string(),
                needs: job.depends_on().map(str::to_string),
                condition,
                steps,
            },
        );
    }

    Ok(WorkflowDocument {
        name: pipeline.name().to_string(),
        on: pipeline.triggers().clone(),
        env: pipeline.environment().clone(),
        jobs,
    })
}
