//! Templated expressions resolved by the CI runner at run time

use crate::core::error::{PipelineError, Result};

/// A reference to a value only known while the workflow runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// Workflow or job environment variable: `env.<name>`
    Env(String),

    /// Output published by an earlier step: `steps.<id>.outputs.<name>`
    StepOutput { step_id: String, output: String },

    /// Repository secret: `secrets.<name>`
    Secret(String),

    /// Free-form expression body, emitted as-is between the braces
    Raw(String),
}

impl Expression {
    pub fn env(name: impl Into<String>) -> Self {
        Expression::Env(name.into())
    }

    pub fn step_output(step_id: impl Into<String>, output: impl Into<String>) -> Self {
        Expression::StepOutput {
            step_id: step_id.into(),
            output: output.into(),
        }
    }

    pub fn secret(name: impl Into<String>) -> Self {
        Expression::Secret(name.into())
    }

    pub fn raw(body: impl Into<String>) -> Self {
        Expression::Raw(body.into())
    }

    /// The expression body without the `${{ }}` wrapper, as used by `if:` keys
    pub fn body(&self) -> Result<String> {
        match self {
            Expression::Env(name) => Ok(format!("env.{}", non_empty(name)?)),
            Expression::StepOutput { step_id, output } => Ok(format!(
                "steps.{}.outputs.{}",
                non_empty(step_id)?,
                non_empty(output)?
            )),
            Expression::Secret(name) => Ok(format!("secrets.{}", non_empty(name)?)),
            Expression::Raw(body) => Ok(non_empty(body)?.to_string()),
        }
    }

    /// Render the full placeholder, e.g. `${{ env.version_number }}`
    pub fn render(&self) -> Result<String> {
        Ok(format!("${{{{ {} }}}}", self.body()?))
    }
}

fn non_empty(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::InvalidReference(name.to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_step_output() {
        let expr = Expression::step_output("extract_version", "version_number");
        assert_eq!(
            expr.render().unwrap(),
            "${{ steps.extract_version.outputs.version_number }}"
        );
    }

    #[test]
    fn test_render_env_and_secret() {
        assert_eq!(
            Expression::env("package_release_notes").render().unwrap(),
            "${{ env.package_release_notes }}"
        );
        assert_eq!(
            Expression::secret("NUGET_ACCESS").render().unwrap(),
            "${{ secrets.NUGET_ACCESS }}"
        );
    }

    #[test]
    fn test_body_has_no_wrapper() {
        let expr = Expression::raw("needs.build.result == 'success'");
        assert_eq!(expr.body().unwrap(), "needs.build.result == 'success'");
    }

    #[test]
    fn test_empty_reference_is_rejected() {
        assert!(matches!(
            Expression::env("").render(),
            Err(PipelineError::InvalidReference(_))
        ));
        assert!(matches!(
            Expression::step_output("extract_version", " ").render(),
            Err(PipelineError::InvalidReference(_))
        ));
    }
}
