//! Job domain model

use crate::core::error::{require_non_empty, PipelineError, Result};
use crate::core::expression::Expression;
use crate::core::step::Step;

/// A named unit of work: where it runs, what it waits for, and its steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Runner label, e.g. `ubuntu-latest`
    runs_on: String,

    /// Name of the job that must finish first. Resolved by the pipeline.
    depends_on: Option<String>,

    /// Condition gating the job
    condition: Option<Expression>,

    /// Steps in authored execution order
    steps: Vec<Step>,
}

impl Job {
    /// Create an empty job on the given runner
    pub fn new(runs_on: impl Into<String>) -> Result<Self> {
        let runs_on = runs_on.into();
        require_non_empty("job", "runs_on", &runs_on)?;
        Ok(Self {
            runs_on,
            depends_on: None,
            condition: None,
            steps: Vec::new(),
        })
    }

    /// Append a step.
    ///
    /// Step ids must be unique within the job, and a step reading another
    /// step's output must come after that step.
    pub fn add_step(&mut self, step: Step) -> Result<()> {
        if let Some(id) = step.id() {
            if self.step(id).is_some() {
                return Err(PipelineError::configuration(
                    format!("step '{}'", step.name()),
                    format!("duplicate step id '{}'", id),
                ));
            }
        }

        for referenced in step.referenced_steps() {
            if self.step(referenced).is_none() {
                return Err(PipelineError::configuration(
                    format!("step '{}'", step.name()),
                    format!("references unknown step id '{}'", referenced),
                ));
            }
        }

        self.steps.push(step);
        Ok(())
    }

    /// Builder form of [`Job::add_step`]
    pub fn with_step(mut self, step: Step) -> Result<Self> {
        self.add_step(step)?;
        Ok(self)
    }

    /// Record the job this one waits for. An empty name clears it.
    pub fn set_depends_on(&mut self, job_name: impl Into<String>) {
        let job_name = job_name.into();
        self.depends_on = if job_name.trim().is_empty() {
            None
        } else {
            Some(job_name)
        };
    }

    pub fn set_condition(&mut self, condition: Expression) {
        self.condition = Some(condition);
    }

    pub fn runs_on(&self) -> &str {
        &self.runs_on
    }

    pub fn depends_on(&self) -> Option<&str> {
        self.depends_on.as_deref()
    }

    pub fn condition(&self) -> Option<&Expression> {
        self.condition.as_ref()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Get a step by id
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id() == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::step::{ExtractProperty, PropertyRef};

    #[test]
    fn test_steps_keep_insertion_order() {
        let job = Job::new("ubuntu-latest")
            .unwrap()
            .with_step(Step::test("Test").unwrap())
            .unwrap()
            .with_step(Step::restore("Restore").unwrap())
            .unwrap()
            .with_step(Step::test("Test").unwrap())
            .unwrap();

        let names: Vec<&str> = job.steps().iter().map(|s| s.name()).collect();
        assert_eq!(names, ["Test", "Restore", "Test"]);
    }

    #[test]
    fn test_runs_on_required() {
        assert!(matches!(
            Job::new(""),
            Err(PipelineError::Configuration { .. })
        ));
    }

    #[test]
    fn test_duplicate_step_id_rejected() {
        let extract = || {
            Step::extract_property(
                "Extract Version",
                Some("extract_version"),
                ExtractProperty::new("App/App.csproj", "Version", "version_number"),
            )
            .unwrap()
        };

        let mut job = Job::new("ubuntu-latest").unwrap();
        job.add_step(extract()).unwrap();
        assert!(job.add_step(extract()).is_err());
        assert_eq!(job.steps().len(), 1);
    }

    #[test]
    fn test_unknown_sibling_reference_rejected() {
        let tag = Step::create_tag(
            "Create Git Tag",
            PropertyRef::StepOutput {
                step_id: "extract_version".to_string(),
                output: "version_number".to_string(),
            },
        )
        .unwrap();

        let mut job = Job::new("ubuntu-latest").unwrap();
        let err = job.add_step(tag.clone()).unwrap_err();
        assert!(err.to_string().contains("extract_version"));

        job.add_step(
            Step::extract_property(
                "Extract Version",
                Some("extract_version"),
                ExtractProperty::new("App/App.csproj", "Version", "version_number"),
            )
            .unwrap(),
        )
        .unwrap();
        assert!(job.add_step(tag).is_ok());
    }

    #[test]
    fn test_depends_on_is_a_plain_name() {
        let mut job = Job::new("windows-latest").unwrap();
        assert_eq!(job.depends_on(), None);

        job.set_depends_on("does_not_exist_yet");
        assert_eq!(job.depends_on(), Some("does_not_exist_yet"));

        job.set_depends_on("");
        assert_eq!(job.depends_on(), None);
    }
}
