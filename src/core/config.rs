//! Generator configuration from YAML

use serde::{Deserialize, Serialize};
use std::path::Path;
use anyhow::Result;

/// Values shared by every generated workflow.
///
/// All fields have defaults, so an empty file (or no file) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Workflow name used by the full build and release pipeline
    pub pipeline_name: String,

    /// Runtime SDK version installed by setup steps
    pub runtime_version: String,

    /// Workflow environment variable flagging release-candidate runs
    pub release_candidate_variable: String,

    /// Runner label used when a call does not override it
    pub default_runner: String,

    /// Directory generated workflow files are written to
    pub output_dir: String,

    /// Secret holding the token used to push tags and create releases
    pub tag_token_secret: String,

    /// Secret holding the package feed API key
    pub publish_key_secret: String,

    /// Package feed packages are pushed to
    pub package_source: String,

    /// Descriptor property holding the package version
    pub version_property: String,

    /// Variable the extracted version is published under
    pub version_variable: String,

    /// Descriptor property holding the release notes
    pub release_notes_property: String,

    /// Variable the extracted release notes are published under
    pub release_notes_variable: String,

    /// Pull request label marking a release
    pub release_label: String,

    /// Echo each extracted property right after extracting it
    pub display_extracted_properties: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            pipeline_name: "Build".to_string(),
            runtime_version: "7.0.201".to_string(),
            release_candidate_variable: "IS_RELEASE_CANDIDATE".to_string(),
            default_runner: "ubuntu-latest".to_string(),
            output_dir: ".github/workflows".to_string(),
            tag_token_secret: "PAT_FOR_TAGGING".to_string(),
            publish_key_secret: "NUGET_ACCESS".to_string(),
            package_source: "https://api.nuget.org/v3/index.json".to_string(),
            version_property: "Version".to_string(),
            version_variable: "version_number".to_string(),
            release_notes_property: "PackageReleaseNotes".to_string(),
            release_notes_variable: "package_release_notes".to_string(),
            release_label: "RELEASES".to_string(),
            display_extracted_properties: false,
        }
    }
}

impl GeneratorConfig {
    /// Load generator configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse generator configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: GeneratorConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the generator configuration
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("pipeline_name", &self.pipeline_name),
            ("runtime_version", &self.runtime_version),
            ("release_candidate_variable", &self.release_candidate_variable),
            ("default_runner", &self.default_runner),
            ("output_dir", &self.output_dir),
            ("tag_token_secret", &self.tag_token_secret),
            ("publish_key_secret", &self.publish_key_secret),
            ("package_source", &self.package_source),
            ("version_property", &self.version_property),
            ("version_variable", &self.version_variable),
            ("release_notes_property", &self.release_notes_property),
            ("release_notes_variable", &self.release_notes_variable),
            ("release_label", &self.release_label),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                anyhow::bail!("Configuration field '{}' must not be empty", field);
            }
        }

        if self.version_variable == self.release_notes_variable {
            anyhow::bail!(
                "version_variable and release_notes_variable must differ (both are '{}')",
                self.version_variable
            );
        }

        Ok(())
    }
}
