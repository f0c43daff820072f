mod cli;
mod core;
mod emit;
mod generation;

use anyhow::{Context, Result};
use cli::{Cli, Command};
use cli::commands::{BuildCommand, OsBuildCommand};
use cli::output::*;
use crate::core::config::GeneratorConfig;
use generation::{GenerationSummary, ScriptGenerationService};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging on stderr so --dry-run output stays clean
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let service = ScriptGenerationService::new(load_config(&cli)?);

    let result = match &cli.command {
        Command::Build(cmd) => build(&service, cmd),
        Command::OsBuild(cmd) => os_build(&service, cmd),
    };

    if let Err(e) = result {
        eprintln!("{} {}", CROSS, style("Generation failed").red());
        error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<GeneratorConfig> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("Failed to load generator config from {}", path))?,
        None => GeneratorConfig::default(),
    };

    if let Some(version) = &cli.runtime_version {
        config.runtime_version = version.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }

    config.validate().context("Invalid generator configuration")?;
    Ok(config)
}

fn build(service: &ScriptGenerationService, cmd: &BuildCommand) -> Result<()> {
    let params = cmd.parameters();

    if cmd.dry_run {
        print!("{}", service.render_build_script(&params)?);
        return Ok(());
    }

    let summary = service
        .generate_build_script(&params)
        .with_context(|| format!("Failed to generate {}", params.output_file))?;
    report(&summary, cmd.json)
}

fn os_build(service: &ScriptGenerationService, cmd: &OsBuildCommand) -> Result<()> {
    let params = cmd.parameters();
    let name = cmd.build_name();

    if cmd.dry_run {
        print!("{}", service.render_os_specific_build_script(&name, &params)?);
        return Ok(());
    }

    let summary = service
        .generate_os_specific_build_script(&name, &params)
        .with_context(|| format!("Failed to generate {}", params.output_file))?;
    report(&summary, cmd.json)
}

fn report(summary: &GenerationSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!("{}", format_summary(summary));
    }
    Ok(())
}
