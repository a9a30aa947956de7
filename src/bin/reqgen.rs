use anyhow::Result;
use clap::Parser;

use reqgen::config::GeneratorConfig;
use reqgen::generate::Generator;

#[derive(Parser)]
#[command(
    name = "reqgen",
    about = "Generate requirements.md for projects from their specification.yaml",
    version
)]
struct Args {
    /// Project id to process. When omitted, the first ten discovered
    /// projects are processed sequentially.
    project_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging();

    let generator = Generator::new(GeneratorConfig::from_env());
    match args.project_id {
        Some(project_id) => {
            // Outcome is on the status line; a failed generation is not a
            // process error.
            generator.generate(&project_id).await;
        }
        None => {
            generator.run_batch().await?;
        }
    }
    Ok(())
}

fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    // Status lines go to stdout; keep tracing on stderr so output stays
    // pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
