//! Trigger configuration: which events start the workflow

use crate::core::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Branch filter shared by push and pull request triggers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchFilter {
    branches: Vec<String>,
}

impl BranchFilter {
    /// Create a filter; at least one non-empty branch is required
    pub fn new<I, S>(branches: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let branches: Vec<String> = branches.into_iter().map(Into::into).collect();

        if branches.is_empty() {
            return Err(PipelineError::configuration(
                "trigger",
                "a branch filter needs at least one branch",
            ));
        }
        if branches.iter().any(|b| b.trim().is_empty()) {
            return Err(PipelineError::configuration(
                "trigger",
                "branch names must not be empty",
            ));
        }

        Ok(Self { branches })
    }

    pub fn branches(&self) -> &[String] {
        &self.branches
    }
}

/// Pull request lifecycle actions a trigger can listen for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestAction {
    Opened,
    Synchronize,
    Reopened,
    Closed,
}

impl PullRequestAction {
    /// Every action, in the order the runner documents them
    pub fn all() -> [PullRequestAction; 4] {
        [
            PullRequestAction::Opened,
            PullRequestAction::Synchronize,
            PullRequestAction::Reopened,
            PullRequestAction::Closed,
        ]
    }
}

/// Pull request trigger: a branch filter narrowed by lifecycle actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestFilter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    types: Vec<PullRequestAction>,

    #[serde(flatten)]
    filter: BranchFilter,
}

impl PullRequestFilter {
    /// Create a filter; repeated actions are kept once, first occurrence wins
    pub fn new<I>(filter: BranchFilter, actions: I) -> Self
    where
        I: IntoIterator<Item = PullRequestAction>,
    {
        let mut types = Vec::new();
        for action in actions {
            if !types.contains(&action) {
                types.push(action);
            }
        }
        Self { types, filter }
    }

    pub fn actions(&self) -> &[PullRequestAction] {
        &self.types
    }

    pub fn branches(&self) -> &[String] {
        self.filter.branches()
    }
}

/// Events that start the workflow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Triggers {
    #[serde(skip_serializing_if = "Option::is_none")]
    push: Option<BranchFilter>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pull_request: Option<PullRequestFilter>,
}

impl Triggers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push and pull request triggers on one branch, covering every PR action
    pub fn for_branch(branch: &str) -> Result<Self> {
        Ok(Self::new()
            .on_push(BranchFilter::new([branch])?)
            .on_pull_request(PullRequestFilter::new(
                BranchFilter::new([branch])?,
                PullRequestAction::all(),
            )))
    }

    pub fn on_push(mut self, filter: BranchFilter) -> Self {
        self.push = Some(filter);
        self
    }

    pub fn on_pull_request(mut self, filter: PullRequestFilter) -> Self {
        self.pull_request = Some(filter);
        self
    }

    pub fn push(&self) -> Option<&BranchFilter> {
        self.push.as_ref()
    }

    pub fn pull_request(&self) -> Option<&PullRequestFilter> {
        self.pull_request.as_ref()
    }

    /// True when no event is configured
    pub fn is_empty(&self) -> bool {
        self.push.is_none() && self.pull_request.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_filter_requires_branches() {
        let empty: Vec<String> = Vec::new();
        assert!(BranchFilter::new(empty).is_err());
        assert!(BranchFilter::new([""]).is_err());
        assert_eq!(BranchFilter::new(["main"]).unwrap().branches(), ["main"]);
    }

    #[test]
    fn test_pull_request_actions_are_deduplicated() {
        let filter = PullRequestFilter::new(
            BranchFilter::new(["main"]).unwrap(),
            [
                PullRequestAction::Closed,
                PullRequestAction::Opened,
                PullRequestAction::Closed,
            ],
        );
        assert_eq!(
            filter.actions(),
            [PullRequestAction::Closed, PullRequestAction::Opened]
        );
    }

    #[test]
    fn test_for_branch() {
        let triggers = Triggers::for_branch("main").unwrap();
        assert_eq!(triggers.push().unwrap().branches(), ["main"]);

        let pr = triggers.pull_request().unwrap();
        assert_eq!(pr.branches(), ["main"]);
        assert_eq!(pr.actions(), PullRequestAction::all());
        assert!(!triggers.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let yaml = serde_yaml::to_string(&Triggers::for_branch("main").unwrap()).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(value["push"]["branches"][0].as_str(), Some("main"));
        assert_eq!(value["pull_request"]["branches"][0].as_str(), Some("main"));
        assert_eq!(value["pull_request"]["types"][1].as_str(), Some("synchronize"));
    }
}
