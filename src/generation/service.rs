//! Workflow generation service
//!
//! Assembles the standard build, tag and publish jobs from a handful of
//! parameters and hands the result to the serializer.

use crate::core::{
    config::GeneratorConfig,
    error::require_non_empty,
    ExtractProperty, Expression, Job, Pipeline, PropertyRef, Result, Step, Triggers,
};
use crate::emit::{serialize, write_to_file};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const BUILD_JOB: &str = "build";
pub const TAG_JOB: &str = "add_tag";
pub const PUBLISH_JOB: &str = "publish";

const GIT_USER_NAME: &str = "Add Git Release Tag Action";
const GIT_USER_EMAIL: &str = "github.action@noreply.github.com";

/// How extracted descriptor properties are handed to later steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublicationMode {
    /// Step outputs, read as `steps.<id>.outputs.<name>`
    #[default]
    StepOutput,

    /// Job environment variables, read as `env.<name>`
    Environment,
}

/// Per-call generation parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildParameters {
    /// Branch the triggers are restricted to
    pub branch: String,

    /// Project descriptor path, relative to the repository root
    pub project_path: String,

    /// File name inside the configured output directory
    pub output_file: String,

    /// Runner label overriding the configured default
    pub runs_on: Option<String>,

    pub publication: PublicationMode,
}

impl BuildParameters {
    pub fn new(
        branch: impl Into<String>,
        project_path: impl Into<String>,
        output_file: impl Into<String>,
    ) -> Self {
        Self {
            branch: branch.into(),
            project_path: project_path.into(),
            output_file: output_file.into(),
            runs_on: None,
            publication: PublicationMode::default(),
        }
    }

    #[must_use]
    pub fn with_runs_on(mut self, runs_on: impl Into<String>) -> Self {
        self.runs_on = Some(runs_on.into());
        self
    }

    #[must_use]
    pub fn with_publication(mut self, publication: PublicationMode) -> Self {
        self.publication = publication;
        self
    }

    fn validate(&self) -> Result<()> {
        require_non_empty("build parameters", "branch", &self.branch)?;
        require_non_empty("build parameters", "project_path", &self.project_path)?;
        require_non_empty("build parameters", "output_file", &self.output_file)
    }
}

/// What a generation call produced
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    pub path: PathBuf,
    pub pipeline: String,
    pub jobs: Vec<JobSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub name: String,
    pub runs_on: String,
    pub needs: Option<String>,
    pub steps: usize,
}

impl GenerationSummary {
    pub fn new(pipeline: &Pipeline, path: PathBuf) -> Self {
        let jobs = pipeline
            .jobs()
            .iter()
            .map(|(name, job)| JobSummary {
                name: name.clone(),
                runs_on: job.runs_on().to_string(),
                needs: job.depends_on().map(str::to_string),
                steps: job.steps().len(),
            })
            .collect();

        Self {
            path,
            pipeline: pipeline.name().to_string(),
            jobs,
        }
    }
}

/// Builds and writes workflow files
#[derive(Debug, Clone, Default)]
pub struct ScriptGenerationService {
    config: GeneratorConfig,
}

impl ScriptGenerationService {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Where a workflow file with this name is written
    pub fn output_path(&self, output_file: &str) -> PathBuf {
        Path::new(&self.config.output_dir).join(output_file)
    }

    /// Generate the build, tag and publish workflow and write it
    pub fn generate_build_script(&self, params: &BuildParameters) -> Result<GenerationSummary> {
        let pipeline = self.build_pipeline(params)?;
        self.emit(&pipeline, &params.output_file)
    }

    /// Generate a build-only workflow for one runner and write it
    pub fn generate_os_specific_build_script(
        &self,
        build_name: &str,
        params: &BuildParameters,
    ) -> Result<GenerationSummary> {
        let pipeline = self.build_os_specific_pipeline(build_name, params)?;
        self.emit(&pipeline, &params.output_file)
    }

    /// Render the build, tag and publish workflow without writing it
    pub fn render_build_script(&self, params: &BuildParameters) -> Result<String> {
        serialize(&self.build_pipeline(params)?)
    }

    /// Render a build-only workflow without writing it
    pub fn render_os_specific_build_script(
        &self,
        build_name: &str,
        params: &BuildParameters,
    ) -> Result<String> {
        serialize(&self.build_os_specific_pipeline(build_name, params)?)
    }

    /// Assemble the three-stage pipeline: `build`, then `add_tag`, then `publish`
    pub fn build_pipeline(&self, params: &BuildParameters) -> Result<Pipeline> {
        params.validate()?;
        let runner = self.runner(params);

        let mut pipeline = self.base_pipeline(&self.config.pipeline_name, params)?;
        pipeline.add_job(BUILD_JOB, self.build_job(runner, params)?)?;
        pipeline.add_job(TAG_JOB, self.tag_job(runner, params)?)?;
        pipeline.add_job(PUBLISH_JOB, self.publish_job(runner)?)?;

        debug!(
            "Assembled pipeline '{}' with {} jobs on {}",
            pipeline.name(),
            pipeline.jobs().len(),
            runner
        );
        Ok(pipeline)
    }

    /// Assemble a pipeline with only the `build` job
    pub fn build_os_specific_pipeline(
        &self,
        build_name: &str,
        params: &BuildParameters,
    ) -> Result<Pipeline> {
        params.validate()?;
        let runner = self.runner(params);

        let mut pipeline = self.base_pipeline(build_name, params)?;
        pipeline.add_job(BUILD_JOB, self.build_job(runner, params)?)?;

        debug!("Assembled pipeline '{}' on {}", pipeline.name(), runner);
        Ok(pipeline)
    }

    fn emit(&self, pipeline: &Pipeline, output_file: &str) -> Result<GenerationSummary> {
        let text = serialize(pipeline)?;
        let path = self.output_path(output_file);
        write_to_file(&text, &path)?;

        info!("Generated workflow '{}' at {}", pipeline.name(), path.display());
        Ok(GenerationSummary::new(pipeline, path))
    }

    fn runner<'a>(&'a self, params: &'a BuildParameters) -> &'a str {
        params
            .runs_on
            .as_deref()
            .unwrap_or(&self.config.default_runner)
    }

    fn base_pipeline(&self, name: &str, params: &BuildParameters) -> Result<Pipeline> {
        let mut pipeline = Pipeline::new(name)?;
        pipeline.set_triggers(Triggers::for_branch(&params.branch)?);
        pipeline.add_environment_variable(
            &self.config.release_candidate_variable,
            Expression::raw(self.release_candidate_condition(&params.branch)).render()?,
        )?;
        Ok(pipeline)
    }

    /// True for a merged, labelled release pull request into `branch`
    fn release_candidate_condition(&self, branch: &str) -> String {
        let label = &self.config.release_label;
        format!(
            "github.event_name == 'pull_request' && github.event.pull_request.merged \
             && github.base_ref == '{branch}' \
             && startsWith(github.event.pull_request.title, '{label}:') \
             && contains(github.event.pull_request.labels.*.name, '{label}')"
        )
    }

    fn build_job(&self, runner: &str, params: &BuildParameters) -> Result<Job> {
        let mut job = Job::new(runner)?;
        job.add_step(Step::checkout("Check out")?)?;

        let display = self.config.display_extracted_properties;
        for step in self.extraction_steps(params, display)?.steps {
            job.add_step(step)?;
        }

        job.add_step(Step::setup_runtime("Setup .Net", &self.config.runtime_version)?)?;
        job.add_step(Step::restore("Restore")?)?;
        job.add_step(Step::compile("Build")?)?;
        job.add_step(Step::test("Test")?)?;
        Ok(job)
    }

    fn tag_job(&self, runner: &str, params: &BuildParameters) -> Result<Job> {
        let token = Expression::secret(&self.config.tag_token_secret);

        let mut job = Job::new(runner)?;
        job.set_depends_on(BUILD_JOB);
        job.set_condition(Expression::raw(format!(
            "needs.{}.result == 'success' && {}",
            BUILD_JOB,
            self.release_candidate_condition(&params.branch)
        )));

        job.add_step(Step::checkout_with_token("Check out", token.clone())?)?;

        let extracted = self.extraction_steps(params, false)?;
        for step in extracted.steps {
            job.add_step(step)?;
        }

        job.add_step(Step::configure_identity(
            "Configure Git",
            GIT_USER_NAME,
            GIT_USER_EMAIL,
        )?)?;
        job.add_step(Step::create_tag("Create Git Tag", extracted.version.clone())?)?;
        job.add_step(Step::create_release(
            "Create GitHub Release",
            extracted.version,
            extracted.release_notes,
            token,
        )?)?;
        Ok(job)
    }

    fn publish_job(&self, runner: &str) -> Result<Job> {
        let mut job = Job::new(runner)?;
        job.set_depends_on(TAG_JOB);
        job.set_condition(Expression::raw(format!("needs.{}.result == 'success'", TAG_JOB)));

        job.add_step(Step::checkout("Check out")?)?;
        job.add_step(Step::setup_runtime("Setup .Net", &self.config.runtime_version)?)?;
        job.add_step(Step::restore("Restore")?)?;
        job.add_step(Step::compile_with_configuration("Build", "Release")?)?;
        job.add_step(Step::pack("Pack NuGet Package", "Release")?)?;
        job.add_step(Step::publish(
            "Push NuGet Package",
            &self.config.package_source,
            Expression::secret(&self.config.publish_key_secret),
        )?)?;
        Ok(job)
    }

    /// Version and release notes extraction, optionally echoing each value
    fn extraction_steps(&self, params: &BuildParameters, display: bool) -> Result<Extraction> {
        let step_id = |id: &'static str| match params.publication {
            PublicationMode::StepOutput => Some(id),
            PublicationMode::Environment => None,
        };

        let version_id = step_id("extract_version");
        let notes_id = step_id("extract_package_release_notes");
        let version = PropertyRef::published_by(version_id, &self.config.version_variable);
        let release_notes =
            PropertyRef::published_by(notes_id, &self.config.release_notes_variable);

        let version_step = Step::extract_property(
            "Extract Version",
            version_id,
            ExtractProperty::new(
                &params.project_path,
                &self.config.version_property,
                &self.config.version_variable,
            ),
        )?;
        let notes_step = Step::extract_property(
            "Extract Package Release Notes",
            notes_id,
            ExtractProperty::new(
                &params.project_path,
                &self.config.release_notes_property,
                &self.config.release_notes_variable,
            ),
        )?;

        let mut steps = vec![version_step];
        if display {
            steps.push(Step::run(
                "Display Version",
                format!("echo \"Version number: {}\"", version.expression().render()?),
            )?);
        }
        steps.push(notes_step);
        if display {
            steps.push(Step::run(
                "Display Package Release Notes",
                format!(
                    "echo \"Package Release Notes: {}\"",
                    release_notes.expression().render()?
                ),
            )?);
        }

        Ok(Extraction {
            steps,
            version,
            release_notes,
        })
    }
}

struct Extraction {
    steps: Vec<Step>,
    version: PropertyRef,
    release_notes: PropertyRef,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PipelineError, Task};

    fn params() -> BuildParameters {
        BuildParameters::new("main", "App/App.csproj", "build.yml")
    }

    fn step_names(job: &Job) -> Vec<&str> {
        job.steps().iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_build_pipeline_has_three_linked_jobs() {
        let service = ScriptGenerationService::default();
        let pipeline = service.build_pipeline(&params()).unwrap();

        let names: Vec<&str> = pipeline.jobs().keys().map(String::as_str).collect();
        assert_eq!(names, [BUILD_JOB, TAG_JOB, PUBLISH_JOB]);
        assert_eq!(pipeline.job(TAG_JOB).unwrap().depends_on(), Some(BUILD_JOB));
        assert_eq!(pipeline.job(PUBLISH_JOB).unwrap().depends_on(), Some(TAG_JOB));
        assert!(pipeline.validate_dependencies().is_ok());
    }

    #[test]
    fn test_build_job_steps() {
        let service = ScriptGenerationService::default();
        let pipeline = service.build_pipeline(&params()).unwrap();

        assert_eq!(
            step_names(pipeline.job(BUILD_JOB).unwrap()),
            [
                "Check out",
                "Extract Version",
                "Extract Package Release Notes",
                "Setup .Net",
                "Restore",
                "Build",
                "Test",
            ]
        );
    }

    #[test]
    fn test_display_steps_follow_their_extraction() {
        let config = GeneratorConfig {
            display_extracted_properties: true,
            ..GeneratorConfig::default()
        };
        let service = ScriptGenerationService::new(config);
        let pipeline = service.build_pipeline(&params()).unwrap();
        let build = pipeline.job(BUILD_JOB).unwrap();

        assert_eq!(build.steps().len(), 9);
        assert_eq!(build.steps()[2].name(), "Display Version");
        assert_eq!(build.steps()[4].name(), "Display Package Release Notes");
        match build.steps()[2].task() {
            Task::RawCommand { command } => assert!(command
                .contains("${{ steps.extract_version.outputs.version_number }}")),
            other => panic!("Expected RawCommand, got {:?}", other),
        }

        // Only the build job echoes values
        assert_eq!(pipeline.job(TAG_JOB).unwrap().steps().len(), 6);
    }

    #[test]
    fn test_environment_publication() {
        let service = ScriptGenerationService::default();
        let params = params().with_publication(PublicationMode::Environment);
        let pipeline = service.build_pipeline(&params).unwrap();

        let tag = pipeline.job(TAG_JOB).unwrap();
        assert!(tag.steps().iter().all(|s| s.id().is_none()));
        match tag.steps()[4].task() {
            Task::CreateTag { version } => assert_eq!(
                version,
                &PropertyRef::Environment { variable: "version_number".to_string() }
            ),
            other => panic!("Expected CreateTag, got {:?}", other),
        }
    }

    #[test]
    fn test_runner_override_and_default() {
        let service = ScriptGenerationService::default();

        let pipeline = service.build_pipeline(&params()).unwrap();
        assert!(pipeline.jobs().values().all(|j| j.runs_on() == "ubuntu-latest"));

        let pipeline = service
            .build_os_specific_pipeline("Windows Build", &params().with_runs_on("windows-latest"))
            .unwrap();
        assert_eq!(pipeline.name(), "Windows Build");
        assert_eq!(pipeline.jobs().len(), 1);
        assert_eq!(pipeline.job(BUILD_JOB).unwrap().runs_on(), "windows-latest");
    }

    #[test]
    fn test_release_candidate_variable_uses_config() {
        let config = GeneratorConfig {
            release_candidate_variable: "RC".to_string(),
            release_label: "SHIP".to_string(),
            ..GeneratorConfig::default()
        };
        let service = ScriptGenerationService::new(config);
        let pipeline = service.build_pipeline(&params()).unwrap();

        let value = &pipeline.environment()["RC"];
        assert!(value.starts_with("${{ "));
        assert!(value.contains("github.base_ref == 'main'"));
        assert!(value.contains("'SHIP:'"));
    }

    #[test]
    fn test_runtime_version_uses_config() {
        let config = GeneratorConfig {
            runtime_version: "8.0.100".to_string(),
            ..GeneratorConfig::default()
        };
        let pipeline = ScriptGenerationService::new(config)
            .build_pipeline(&params())
            .unwrap();

        for name in [BUILD_JOB, PUBLISH_JOB] {
            let setup = pipeline
                .job(name)
                .unwrap()
                .steps()
                .iter()
                .find(|s| matches!(s.task(), Task::SetupRuntime { .. }))
                .unwrap();
            assert_eq!(setup.task(), &Task::SetupRuntime { version: "8.0.100".to_string() });
        }
    }

    #[test]
    fn test_empty_parameters_rejected() {
        let service = ScriptGenerationService::default();
        let err = service
            .build_pipeline(&BuildParameters::new("main", "", "build.yml"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Configuration { .. }));

        assert!(service
            .build_pipeline(&BuildParameters::new("", "App/App.csproj", "build.yml"))
            .is_err());
        assert!(service
            .build_pipeline(&params().with_runs_on(" "))
            .is_err());
    }

    #[test]
    fn test_output_path() {
        let service = ScriptGenerationService::default();
        assert_eq!(
            service.output_path("build.yml"),
            Path::new(".github/workflows").join("build.yml")
        );
    }
}
