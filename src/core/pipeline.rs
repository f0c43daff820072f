//! Pipeline domain model

use crate::core::{
    error::{require_non_empty, PipelineError, Result},
    job::Job,
    trigger::Triggers,
};
use indexmap::IndexMap;
use regex::Regex;

/// Job ids the runner accepts
const JOB_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_-]*$";

/// A complete workflow definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    /// Workflow name
    name: String,

    /// Events that start the workflow
    triggers: Triggers,

    /// Workflow-level environment, in insertion order
    environment: IndexMap<String, String>,

    /// Jobs, in insertion order
    jobs: IndexMap<String, Job>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        require_non_empty("pipeline", "name", &name)?;
        Ok(Self {
            name,
            triggers: Triggers::default(),
            environment: IndexMap::new(),
            jobs: IndexMap::new(),
        })
    }

    pub fn set_triggers(&mut self, triggers: Triggers) {
        self.triggers = triggers;
    }

    /// Add a workflow environment variable; names must be unique
    pub fn add_environment_variable(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        let name = name.into();
        require_non_empty("environment variable", "name", &name)?;

        if self.environment.contains_key(&name) {
            return Err(PipelineError::DuplicateVariable(name));
        }

        self.environment.insert(name, value.into());
        Ok(())
    }

    /// Add a job under a unique name. The dependency is checked later.
    pub fn add_job(&mut self, name: impl Into<String>, job: Job) -> Result<()> {
        let name = name.into();

        let pattern = Regex::new(JOB_NAME_PATTERN)
            .map_err(|e| PipelineError::configuration("job name pattern", e.to_string()))?;
        if !pattern.is_match(&name) {
            return Err(PipelineError::configuration(
                format!("job '{}'", name),
                "job names must start with a letter or '_' and contain only alphanumerics, '-' or '_'",
            ));
        }

        if self.jobs.contains_key(&name) {
            return Err(PipelineError::DuplicateJobName(name));
        }

        self.jobs.insert(name, job);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn triggers(&self) -> &Triggers {
        &self.triggers
    }

    pub fn environment(&self) -> &IndexMap<String, String> {
        &self.environment
    }

    pub fn jobs(&self) -> &IndexMap<String, Job> {
        &self.jobs
    }

    /// Get a job by name
    pub fn job(&self, name: &str) -> Option<&Job> {
        self.jobs.get(name)
    }

    /// Check every `depends_on` against the jobs declared before it.
    ///
    /// Only backward references resolve, which keeps the graph acyclic.
    pub fn validate_dependencies(&self) -> Result<()> {
        for (index, (name, job)) in self.jobs.iter().enumerate() {
            let Some(dependency) = job.depends_on() else {
                continue;
            };

            match self.jobs.get_index_of(dependency) {
                Some(position) if position < index => {}
                Some(_) => {
                    return Err(PipelineError::DependencyOrder {
                        job: name.clone(),
                        dependency: dependency.to_string(),
                    })
                }
                None => {
                    return Err(PipelineError::UnresolvedDependency {
                        job: name.clone(),
                        dependency: dependency.to_string(),
                    })
                }
            }
        }

        Ok(())
    }
}
