#![deny(dead_code)]

use std::path::Path;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vibescope_core::config::EngineConfig;
use vibescope_core::output::{format_json, format_text, OutputFormat};
use vibescope_core::secondary::SecondaryAnalyzer;
use vibescope_core::Engine;

mod output;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "vibescope",
    about = "Estimate whether a repository was vibe-coded",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Repository URL or local directory (shorthand for
    /// `vibescope analyze <locator>`).
    locator: Option<String>,

    /// Branch to try first when cloning.
    #[arg(long, requires = "locator")]
    branch: Option<String>,

    /// Output format: pretty, text, or json.
    #[arg(long, default_value = "pretty", requires = "locator")]
    format: String,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a repository URL or local directory (same as the bare form).
    Analyze(AnalyzeArgs),

    /// Check whether the configured secondary analyzer responds.
    Probe,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Repository URL or local directory.
    locator: String,

    #[arg(long)]
    branch: Option<String>,

    #[arg(long, default_value = "pretty")]
    format: String,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Analyze(args)) => {
            run_analyze(&args.locator, args.branch.as_deref(), &args.format)
        }
        Some(Command::Probe) => run_probe(),
        None => match cli.locator {
            Some(locator) => run_analyze(&locator, cli.branch.as_deref(), &cli.format),
            None => {
                anyhow::bail!("no repository given; try `vibescope <url-or-path>` or --help")
            }
        },
    }
}

fn run_analyze(locator: &str, branch: Option<&str>, format: &str) -> Result<()> {
    let fmt = parse_format(format)?;
    let engine = Engine::new(EngineConfig::load(Path::new(".")));

    let path = Path::new(locator);
    let outcome = if path.is_dir() {
        engine.analyze_tree(path)?
    } else {
        engine.analyze_repository(locator, branch)?
    };

    let rendered = match fmt {
        OutputFormat::Json => format_json(&outcome),
        OutputFormat::Text => format_text(&outcome),
        OutputFormat::Pretty => output::format_pretty(&outcome),
    };
    println!("{rendered}");
    Ok(())
}

fn run_probe() -> Result<()> {
    let config = EngineConfig::load(Path::new("."));
    if config.secondary.command.is_empty() {
        anyhow::bail!("no secondary analyzer configured in vibescope.toml");
    }
    let analyzer = SecondaryAnalyzer::new(config.secondary.command.clone());
    if analyzer.probe() {
        println!("secondary analyzer responded: {:?}", config.secondary.command);
        Ok(())
    } else {
        anyhow::bail!("secondary analyzer did not respond: {:?}", config.secondary.command)
    }
}

fn parse_format(s: &str) -> Result<OutputFormat> {
    match s {
        "pretty" => Ok(OutputFormat::Pretty),
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => anyhow::bail!("unknown format: {other} (expected pretty, text, or json)"),
    }
}
