//! Serde schema of the emitted workflow document
//!
//! Field declaration order is the key order in the rendered YAML, and every
//! mapping is an `IndexMap`, so the output never depends on hashing.

use crate::core::trigger::Triggers;
use indexmap::IndexMap;
use serde::Serialize;

/// Top-level workflow file
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowDocument {
    pub name: String,

    pub on: Triggers,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,

    pub jobs: IndexMap<String, JobDocument>,
}

/// One job entry under `jobs:`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct JobDocument {
    pub runs_on: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs: Option<String>,

    #[serde(rename = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    pub steps: Vec<StepDocument>,
}

/// Rendered fields of a single step
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StepDocument {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Action identifier, e.g. `actions/checkout@v3`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,

    #[serde(rename = "with", skip_serializing_if = "IndexMap::is_empty")]
    pub with_inputs: IndexMap<String, serde_yaml::Value>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
}

impl StepDocument {
    pub(crate) fn new(name: &str, id: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            id: id.map(str::to_string),
            ..Default::default()
        }
    }

    pub(crate) fn uses(mut self, action: &str) -> Self {
        self.uses = Some(action.to_string());
        self
    }

    pub(crate) fn input(mut self, key: &str, value: impl Into<serde_yaml::Value>) -> Self {
        self.with_inputs.insert(key.to_string(), value.into());
        self
    }

    pub(crate) fn run(mut self, command: impl Into<String>) -> Self {
        self.run = Some(command.into());
        self
    }

    pub(crate) fn shell(mut self, shell: &str) -> Self {
        self.shell = Some(shell.to_string());
        self
    }
}
