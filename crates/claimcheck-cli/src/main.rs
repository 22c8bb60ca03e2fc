//! Claimcheck CLI - verify one factual claim from the command line.
//!
//! ```text
//! claimcheck "The Earth is flat."
//! claimcheck --format text --max-turns 6 "Acme Corp announced layoffs this week."
//! ```
//!
//! Requires `GOOGLE_API_KEY`, `SERPAPI_API_KEY`, and `NEWSAPI_API_KEY`
//! in the environment.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use claimcheck_runtime::{Orchestrator, RuntimeConfig, VerifyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// JSON result on stdout.
    Json,
    /// Human-readable summary.
    Text,
}

#[derive(Debug, Parser)]
#[command(name = "claimcheck", version, about = "Verify a factual claim with web and news evidence")]
struct Cli {
    /// The claim to verify.
    claim: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Override the model name.
    #[arg(long)]
    model: Option<String>,

    /// Override the iteration budget.
    #[arg(long)]
    max_turns: Option<u32>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = RuntimeConfig::from_env().context("loading configuration")?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(max_turns) = cli.max_turns {
        config.max_turns = max_turns;
    }

    let orchestrator = Orchestrator::from_env_with_config(config)
        .context("building orchestrator from environment")?;

    let result = orchestrator.verify(&cli.claim).await?;

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Text => {
            println!("Verdict: {}", result.verdict);
            println!();
            println!("{}", result.explanation);
            if !result.sources.is_empty() {
                println!();
                println!("Sources:");
                for source in &result.sources {
                    println!("- {} ({})", source.title, source.url);
                }
            }
        }
    }

    Ok(())
}

/// Distinguish policy failures from transport failures in the exit code.
fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<VerifyError>() {
        Some(VerifyError::PolicyNotSatisfied { .. }) => 2,
        Some(VerifyError::InvalidClaim) => 64,
        _ => 1,
    }
}
