//! CLI output formatting

use crate::generation::GenerationSummary;
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");

/// Format a generation summary for display
pub fn format_summary(summary: &GenerationSummary) -> String {
    let mut out = format!(
        "{} Generated {} at {}",
        CHECK,
        style(&summary.pipeline).bold(),
        style(summary.path.display()).cyan()
    );

    for job in &summary.jobs {
        let needs = match &job.needs {
            Some(needs) => format!(" (needs {})", style(needs).dim()),
            None => String::new(),
        };
        out.push_str(&format!(
            "\n  {} on {}: {} steps{}",
            style(&job.name).bold(),
            style(&job.runs_on).dim(),
            style(job.steps).cyan(),
            needs
        ));
    }

    out
}
