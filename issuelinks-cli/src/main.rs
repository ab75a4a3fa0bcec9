//! Issuelinks CLI - collect markdown links from a GitHub user's issues

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{ConfigArgs, ScanArgs, SecretsArgs};

/// Collect markdown links from the issues of a GitHub user's repositories
#[derive(Parser, Debug)]
#[command(name = "issuelinks")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.config/issuelinks/config.toml
    #[arg(long, global = true, env = "ISSUELINKS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Scan a user's repositories and write the link documents
    #[command(visible_alias = "s")]
    Scan(ScanArgs),

    /// Show or save configuration
    Config(ConfigArgs),

    /// Manage the secrets file holding the GitHub token
    Secrets(SecretsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let config_path = cli.config.as_deref();

    match cli.command {
        Some(Commands::Version) => {
            println!("issuelinks {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Scan(args)) => {
            args.execute(cli.verbose, config_path).await?;
        }
        Some(Commands::Config(args)) => {
            args.execute(config_path)?;
        }
        Some(Commands::Secrets(args)) => {
            args.execute()?;
        }
        None => {
            println!("issuelinks - collect markdown links from GitHub issues");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
