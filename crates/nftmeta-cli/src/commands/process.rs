//! `nftmeta process` command implementation
//!
//! Resolves the environment, runs the pipeline and prints a summary.

use crate::config::{EnvironmentRegistry, RunConfig};
use crate::error::Result;
use crate::pipeline::{self, ProcessOutcome};
use crate::ProcessArgs;
use colored::Colorize;

/// Settings for one run from the registry and the command line
pub fn run_config(args: &ProcessArgs) -> Result<RunConfig> {
    let registry = EnvironmentRegistry::load(&args.config)?;
    let environment = registry.resolve(args.env.as_deref(), args.env_url.as_deref())?;

    let mut config = RunConfig::new(environment);
    config.collection_name = args.collection_name.clone();
    config.generated_media_dir = args.media_dir.clone();
    config.generated_metadata_dir = args.metadata_dir.clone();
    config.max_concurrent_fetches = args.concurrency.max(1);
    config.fetch_timeout_secs = args.timeout_secs;
    Ok(config)
}

pub async fn run(args: ProcessArgs) -> Result<()> {
    let config = run_config(&args)?;

    println!(
        "{} Processing {} for {} ({})",
        "→".cyan(),
        args.dir.display(),
        config.environment,
        config.environment_url
    );

    let outcome = pipeline::process(&args.dir, args.format, &config).await?;
    print_summary(&outcome);
    Ok(())
}

fn print_summary(outcome: &ProcessOutcome) {
    let plan = &outcome.plan;

    println!(
        "{} Hashed {} resource(s), {} already hashed",
        "✓".green(),
        outcome.walk.hashed,
        outcome.walk.skipped
    );
    println!(
        "{} Staged {} media file(s) from {} rewritten URI(s)",
        "✓".green(),
        plan.media.len(),
        outcome.rewritten
    );
    println!("{} Factory {}", "✓".green(), plan.factory.url);
    if let Some(default_token) = &plan.default_token {
        println!("{} Default token {}", "✓".green(), default_token.url);
    }
    println!("{} Published {} token(s)", "✓".green(), plan.tokens.len());

    if !outcome.diagnostics.is_empty() {
        println!(
            "\n{} {} diagnostic(s):",
            "!".yellow().bold(),
            outcome.diagnostics.len()
        );
        for entry in outcome.diagnostics.entries() {
            println!("  {} {}", entry.kind.to_string().yellow(), entry.message);
        }
    }

    println!(
        "\n{} Upload plan written: {}",
        "✓".green().bold(),
        outcome.plan_path.display()
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::Parser;
    use tempfile::TempDir;

    fn args(extra: &[&str]) -> ProcessArgs {
        let mut argv = vec!["nftmeta", "process", "collection"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Some(crate::Commands::Process(args)) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_run_config_from_flags() {
        let dir = TempDir::new().unwrap();
        let registry = dir.path().join("config.json");
        std::fs::write(&registry, r#"{ "qa": "https://qa.example.com/" }"#).unwrap();

        let config = run_config(&args(&[
            "--config",
            registry.to_str().unwrap(),
            "--env",
            "QA",
            "--collection-name",
            "Tacos",
            "--concurrency",
            "0",
            "--media-dir",
            "media",
        ]))
        .unwrap();

        assert_eq!(config.environment, "qa");
        assert_eq!(config.environment_url, "https://qa.example.com");
        assert_eq!(config.collection_name.as_deref(), Some("Tacos"));
        assert_eq!(config.max_concurrent_fetches, 1);
        assert_eq!(config.generated_media_dir, "media");
        assert_eq!(config.generated_metadata_dir, "generated_metadata");
    }

    #[test]
    fn test_explicit_url_needs_no_registry() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("none.json");

        let config = run_config(&args(&[
            "--config",
            missing.to_str().unwrap(),
            "--env-url",
            "https://cdn.example.com",
        ]))
        .unwrap();

        assert_eq!(config.environment, "custom");
    }
}
