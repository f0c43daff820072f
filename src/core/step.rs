//! Step domain model

use crate::core::error::{require_non_empty, PipelineError, Result};
use crate::core::expression::Expression;
use indexmap::IndexMap;
use regex::Regex;

/// Where a value extracted from the project descriptor is published
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyRef {
    /// Output of the step with this id, visible to later steps of the same job
    StepOutput { step_id: String, output: String },

    /// Environment variable set for the remainder of the job
    Environment { variable: String },
}

impl PropertyRef {
    /// Reference to a value extracted into `variable` by a step with `step_id`.
    ///
    /// Without a step id the value is exported to the job environment.
    pub fn published_by(step_id: Option<&str>, variable: &str) -> Self {
        match step_id {
            Some(step_id) => PropertyRef::StepOutput {
                step_id: step_id.to_string(),
                output: variable.to_string(),
            },
            None => PropertyRef::Environment {
                variable: variable.to_string(),
            },
        }
    }

    /// Expression a downstream step uses to read the value
    pub fn expression(&self) -> Expression {
        match self {
            PropertyRef::StepOutput { step_id, output } => {
                Expression::step_output(step_id.clone(), output.clone())
            }
            PropertyRef::Environment { variable } => Expression::env(variable.clone()),
        }
    }

    /// Sibling step this reference depends on, if any
    pub fn step_id(&self) -> Option<&str> {
        match self {
            PropertyRef::StepOutput { step_id, .. } => Some(step_id),
            PropertyRef::Environment { .. } => None,
        }
    }
}

/// Instruction to read one property out of the project descriptor at run time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractProperty {
    descriptor_path: String,
    property_name: String,
    output_variable: String,
}

impl ExtractProperty {
    pub fn new(
        descriptor_path: impl Into<String>,
        property_name: impl Into<String>,
        output_variable: impl Into<String>,
    ) -> Self {
        Self {
            descriptor_path: descriptor_path.into(),
            property_name: property_name.into(),
            output_variable: output_variable.into(),
        }
    }

    pub fn descriptor_path(&self) -> &str {
        &self.descriptor_path
    }

    /// Element name inside the descriptor, e.g. `Version`
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// Shell variable and output name the value is published under
    pub fn output_variable(&self) -> &str {
        &self.output_variable
    }

    fn validate(&self) -> Result<()> {
        const CONTEXT: &str = "extract property step";
        require_non_empty(CONTEXT, "descriptor_path", &self.descriptor_path)?;
        require_non_empty(CONTEXT, "property_name", &self.property_name)?;
        require_non_empty(CONTEXT, "output_variable", &self.output_variable)?;

        // Both names end up unquoted inside the extraction script
        require_match(CONTEXT, "property_name", &self.property_name, PROPERTY_NAME_PATTERN)?;
        require_match(CONTEXT, "output_variable", &self.output_variable, VARIABLE_NAME_PATTERN)
    }
}

/// Descriptor element names, without namespace prefixes
const PROPERTY_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_.-]*$";

/// Portable shell variable names
const VARIABLE_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

fn require_match(context: &str, field: &str, value: &str, pattern: &str) -> Result<()> {
    let regex = Regex::new(pattern)
        .map_err(|e| PipelineError::configuration(format!("{} pattern", field), e.to_string()))?;
    if !regex.is_match(value) {
        return Err(PipelineError::configuration(
            context,
            format!("'{}' value '{}' must match {}", field, value, pattern),
        ));
    }
    Ok(())
}

/// The closed set of step kinds the generator knows how to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Checkout { token: Option<Expression> },
    ConfigureIdentity { user_name: String, user_email: String },
    ExtractDescriptorProperty(ExtractProperty),
    SetupRuntime { version: String },
    Restore,
    Compile { configuration: Option<String> },
    Test,
    RawCommand { command: String },
    CreateTag { version: PropertyRef },
    CreateRelease { version: PropertyRef, notes: PropertyRef, token: Expression },
    Pack { configuration: String },
    Publish { source: String, api_key: Expression },
}

/// A single step in a job.
///
/// Only the checked constructors below create steps, so every step that
/// reaches a job has its required fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Display name shown by the runner
    name: String,

    /// Identifier other steps use to read this step's outputs
    id: Option<String>,

    /// Step-level environment variables
    env: IndexMap<String, String>,

    task: Task,
}

impl Step {
    fn new(name: impl Into<String>, task: Task) -> Result<Self> {
        let name = name.into();
        require_non_empty("step", "name", &name)?;
        Ok(Self {
            name,
            id: None,
            env: IndexMap::new(),
            task,
        })
    }

    pub fn checkout(name: impl Into<String>) -> Result<Self> {
        Self::new(name, Task::Checkout { token: None })
    }

    /// Checkout authenticated with a token, so later pushes are allowed
    pub fn checkout_with_token(name: impl Into<String>, token: Expression) -> Result<Self> {
        token.body()?;
        Self::new(name, Task::Checkout { token: Some(token) })
    }

    pub fn configure_identity(
        name: impl Into<String>,
        user_name: impl Into<String>,
        user_email: impl Into<String>,
    ) -> Result<Self> {
        let user_name = user_name.into();
        let user_email = user_email.into();
        require_non_empty("configure identity step", "user_name", &user_name)?;
        require_non_empty("configure identity step", "user_email", &user_email)?;
        Self::new(name, Task::ConfigureIdentity { user_name, user_email })
    }

    /// Extract a descriptor property.
    ///
    /// With an `id` the value becomes a step output; without one it is
    /// exported as a job environment variable. See [`Step::published_as`].
    pub fn extract_property(
        name: impl Into<String>,
        id: Option<&str>,
        property: ExtractProperty,
    ) -> Result<Self> {
        property.validate()?;
        let mut step = Self::new(name, Task::ExtractDescriptorProperty(property))?;
        if let Some(id) = id {
            step = step.with_id(id)?;
        }
        Ok(step)
    }

    pub fn setup_runtime(name: impl Into<String>, version: impl Into<String>) -> Result<Self> {
        let version = version.into();
        require_non_empty("setup runtime step", "version", &version)?;
        Self::new(name, Task::SetupRuntime { version })
    }

    pub fn restore(name: impl Into<String>) -> Result<Self> {
        Self::new(name, Task::Restore)
    }

    pub fn compile(name: impl Into<String>) -> Result<Self> {
        Self::new(name, Task::Compile { configuration: None })
    }

    pub fn compile_with_configuration(
        name: impl Into<String>,
        configuration: impl Into<String>,
    ) -> Result<Self> {
        let configuration = configuration.into();
        require_non_empty("compile step", "configuration", &configuration)?;
        Self::new(name, Task::Compile { configuration: Some(configuration) })
    }

    pub fn test(name: impl Into<String>) -> Result<Self> {
        Self::new(name, Task::Test)
    }

    pub fn run(name: impl Into<String>, command: impl Into<String>) -> Result<Self> {
        let command = command.into();
        require_non_empty("run step", "command", &command)?;
        Self::new(name, Task::RawCommand { command })
    }

    pub fn create_tag(name: impl Into<String>, version: PropertyRef) -> Result<Self> {
        version.expression().body()?;
        Self::new(name, Task::CreateTag { version })
    }

    pub fn create_release(
        name: impl Into<String>,
        version: PropertyRef,
        notes: PropertyRef,
        token: Expression,
    ) -> Result<Self> {
        version.expression().body()?;
        notes.expression().body()?;
        token.body()?;
        Self::new(name, Task::CreateRelease { version, notes, token })
    }

    pub fn pack(name: impl Into<String>, configuration: impl Into<String>) -> Result<Self> {
        let configuration = configuration.into();
        require_non_empty("pack step", "configuration", &configuration)?;
        Self::new(name, Task::Pack { configuration })
    }

    pub fn publish(
        name: impl Into<String>,
        source: impl Into<String>,
        api_key: Expression,
    ) -> Result<Self> {
        let source = source.into();
        require_non_empty("publish step", "source", &source)?;
        api_key.body()?;
        Self::new(name, Task::Publish { source, api_key })
    }

    /// Set the step id
    pub fn with_id(mut self, id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        require_non_empty("step", "id", &id)?;
        self.id = Some(id);
        Ok(self)
    }

    /// Add a step environment variable
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// How downstream steps read the value this step extracts, if it extracts one
    pub fn published_as(&self) -> Option<PropertyRef> {
        match &self.task {
            Task::ExtractDescriptorProperty(property) => Some(PropertyRef::published_by(
                self.id.as_deref(),
                &property.output_variable,
            )),
            _ => None,
        }
    }

    /// Ids of sibling steps whose outputs this step reads
    pub fn referenced_steps(&self) -> Vec<&str> {
        match &self.task {
            Task::CreateTag { version } => version.step_id().into_iter().collect(),
            Task::CreateRelease { version, notes, .. } => {
                version.step_id().into_iter().chain(notes.step_id()).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn env(&self) -> &IndexMap<String, String> {
        &self.env
    }

    pub fn task(&self) -> &Task {
        &self.task
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version_property() -> ExtractProperty {
        ExtractProperty::new("App/App.csproj", "Version", "version_number")
    }

    #[test]
    fn test_extract_property_requires_fields() {
        let err = Step::extract_property(
            "Extract Version",
            None,
            ExtractProperty::new("", "Version", "version_number"),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Configuration { .. }));

        assert!(Step::extract_property(
            "Extract Version",
            None,
            ExtractProperty::new("App/App.csproj", " ", "version_number"),
        )
        .is_err());
    }

    #[test]
    fn test_extract_property_rejects_unsafe_names() {
        for (property, variable) in [
            ("Version</a>", "version_number"),
            ("msb:Version", "version_number"),
            ("Version", "version-number"),
            ("Version", "$(whoami)"),
            ("Version", "1st"),
        ] {
            let err = Step::extract_property(
                "Extract Version",
                None,
                ExtractProperty::new("App/App.csproj", property, variable),
            )
            .unwrap_err();
            assert!(
                matches!(err, PipelineError::Configuration { .. }),
                "{} / {} should be rejected",
                property,
                variable
            );
        }

        assert!(Step::extract_property(
            "Extract Notes",
            None,
            ExtractProperty::new("My App/App.csproj", "PackageReleaseNotes", "_notes2"),
        )
        .is_ok());
    }

    #[test]
    fn test_publication_modes() {
        let with_id =
            Step::extract_property("Extract Version", Some("extract_version"), version_property())
                .unwrap();
        assert_eq!(with_id.id(), Some("extract_version"));
        assert_eq!(
            with_id.published_as().unwrap().expression().render().unwrap(),
            "${{ steps.extract_version.outputs.version_number }}"
        );

        let without_id =
            Step::extract_property("Extract Version", None, version_property()).unwrap();
        assert_eq!(without_id.id(), None);
        assert_eq!(
            without_id.published_as().unwrap().expression().render().unwrap(),
            "${{ env.version_number }}"
        );

        assert!(Step::test("Test").unwrap().published_as().is_none());
    }

    #[test]
    fn test_constructors_require_fields() {
        assert!(Step::run("Say hello", "").is_err());
        assert!(Step::run("", "echo hello").is_err());
        assert!(Step::setup_runtime("Setup .Net", " ").is_err());
        assert!(Step::pack("Pack", "").is_err());
        assert!(Step::test("Test").unwrap().with_id("").is_err());
    }

    #[test]
    fn test_referenced_steps() {
        let tag = Step::create_tag(
            "Create Git Tag",
            PropertyRef::StepOutput {
                step_id: "extract_version".to_string(),
                output: "version_number".to_string(),
            },
        )
        .unwrap();
        assert_eq!(tag.referenced_steps(), ["extract_version"]);

        let test = Step::test("Test").unwrap();
        assert!(test.referenced_steps().is_empty());
    }

    #[test]
    fn test_invalid_references_fail_at_construction() {
        let err = Step::publish("Push", "https://api.nuget.org/v3/index.json", Expression::secret(""))
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidReference(_)));
    }

    #[test]
    fn test_accessors_expose_constructed_fields() {
        let step = Step::run("Print", "echo $FOO").unwrap().with_env("FOO", "bar");
        assert_eq!(step.name(), "Print");
        assert_eq!(step.env().get("FOO").map(String::as_str), Some("bar"));
        assert_eq!(
            step.task(),
            &Task::RawCommand { command: "echo $FOO".to_string() }
        );
    }
}
