use anyhow::Result;
use clap::Parser;
use tracing::warn;

use reqgen::config::GeneratorConfig;
use reqgen::project::{self, TEST_SINGLE_PROJECT_ENV};
use reqgen::regenerate::Regenerator;

#[derive(Parser)]
#[command(
    name = "reqregen",
    about = "Regenerate requirements.md for every project through a bounded claude worker pool",
    version
)]
struct Args {}

#[tokio::main]
async fn main() -> Result<()> {
    let _args = Args::parse();
    setup_logging();

    let config = GeneratorConfig::from_env();

    // Informational only; discovery below reports real errors.
    match project::scan(&config.projects_dir) {
        Ok(report) => {
            println!("Project requirements status");
            println!("   Directories: {}", report.total_dirs);
            println!("   With specification: {}", report.with_spec);
            println!("   With requirements: {}", report.with_requirements);
            println!("   Needing requirements: {}", report.needing_requirements);
            println!();
        }
        Err(err) => warn!(error = %err, "could not scan projects directory"),
    }

    let only = std::env::var(TEST_SINGLE_PROJECT_ENV)
        .ok()
        .filter(|s| !s.is_empty());
    let projects = project::discover_with_override(&config.projects_dir, only.as_deref())?;
    if only.is_some() && !projects.is_empty() {
        println!("TEST MODE: Only processing {}", projects[0].id);
    }

    let regenerator = Regenerator::new(config);
    regenerator.run(projects).await;
    Ok(())
}

fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
