//! Rendering steps into their emitted document form

use crate::core::{ExtractProperty, Result, Step, Task};
use crate::emit::document::StepDocument;

pub const CHECKOUT_ACTION: &str = "actions/checkout@v3";
pub const SETUP_DOTNET_ACTION: &str = "actions/setup-dotnet@v3";
pub const CREATE_RELEASE_ACTION: &str = "actions/create-release@v1";

/// Render a step's fields in emission order
pub fn render_step(step: &Step) -> Result<StepDocument> {
    let doc = StepDocument::new(step.name(), step.id());

    let mut doc = match step.task() {
        Task::Checkout { token } => {
            let doc = doc.uses(CHECKOUT_ACTION);
            match token {
                Some(token) => doc.input("token", token.render()?),
                None => doc,
            }
        }
        Task::ConfigureIdentity { user_name, user_email } => doc.run(format!(
            "git config user.name {}\ngit config user.email {}",
            shell_quote(user_name),
            shell_quote(user_email)
        )),
        Task::ExtractDescriptorProperty(property) => {
            let sink = if step.id().is_some() { "GITHUB_OUTPUT" } else { "GITHUB_ENV" };
            doc.shell("bash").run(extract_script(property, sink))
        }
        Task::SetupRuntime { version } => doc
            .uses(SETUP_DOTNET_ACTION)
            .input("dotnet-version", version.as_str()),
        Task::Restore => doc.run("dotnet restore"),
        Task::Compile { configuration: None } => doc.run("dotnet build --no-restore"),
        Task::Compile { configuration: Some(configuration) } => doc.run(format!(
            "dotnet build --no-restore --configuration {configuration}"
        )),
        Task::Test => doc.run("dotnet test --no-build --verbosity normal"),
        Task::RawCommand { command } => doc.run(command.as_str()),
        Task::CreateTag { version } => {
            let version = version.expression().render()?;
            doc.run(format!(
                "git tag -a \"v{version}\" -m \"Release - v{version}\"\ngit push origin --tags"
            ))
        }
        Task::CreateRelease { version, notes, token } => {
            let version = version.expression().render()?;
            let mut doc = doc
                .uses(CREATE_RELEASE_ACTION)
                .input("tag_name", format!("v{version}"))
                .input("release_name", format!("Release - v{version}"))
                .input("body", notes.expression().render()?);
            doc.env.insert("GITHUB_TOKEN".to_string(), token.render()?);
            doc
        }
        Task::Pack { configuration } => doc.run(format!(
            "dotnet pack --configuration {configuration} --include-symbols"
        )),
        Task::Publish { source, api_key } => doc.run(format!(
            "dotnet nuget push **/bin/Release/**/*.nupkg --source {source} --api-key {} --skip-duplicate",
            api_key.render()?
        )),
    };

    for (key, value) in step.env() {
        doc.env.insert(key.clone(), value.clone());
    }

    Ok(doc)
}

/// Bash script reading the first `<Property>` element of the descriptor into
/// a shell variable and appending it to the `sink` file.
///
/// The element may span several lines. The value is written with the
/// `name<<delimiter` form the runner uses for multi-line values, so release
/// notes keep their line breaks. Property and variable names are restricted
/// to identifier characters when the step is built; the path is quoted here.
fn extract_script(property: &ExtractProperty, sink: &str) -> String {
    let var = property.output_variable();
    let prop = property.property_name();
    let path = shell_quote(property.descriptor_path());
    let delimiter = format!("{var}_EOF");

    format!(
        "{var}=$(sed -n -e '/<{prop}>/{{' -e ':a' -e '/<\\/{prop}>/!{{' -e 'N' -e 'ba' -e '}}' \
         -e 's:.*<{prop}>\\(.*\\)</{prop}>.*:\\1:p' -e 'q' -e '}}' {path})\n\
         {{\n\
         \x20 echo \"{var}<<{delimiter}\"\n\
         \x20 echo \"${var}\"\n\
         \x20 echo \"{delimiter}\"\n\
         }} >> \"${sink}\""
    )
}

/// Single-quote a value for bash
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
