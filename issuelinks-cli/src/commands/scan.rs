//! Scan command - fetch repositories and issues, write the link documents

use std::path::Path;

use clap::Args;
use issuelinks_core::{write_outputs, Aggregator, OutputPaths, ScanReport};
use issuelinks_github::GitHubClient;
use tokio_util::sync::CancellationToken;

use super::{load_config, OverrideArgs};

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    #[command(flatten)]
    pub overrides: OverrideArgs,
}

impl ScanArgs {
    /// Execute the scan command
    pub async fn execute(self, verbose: bool, config_path: Option<&Path>) -> anyhow::Result<()> {
        let config = load_config(config_path, self.overrides)?;

        if verbose {
            tracing::info!(
                username = ?config.github.username,
                per_page = config.github.effective_per_page(),
                include_issues = config.scan.include_issues,
                empty_issues = ?config.scan.empty_issues,
                on_failure = ?config.scan.on_failure,
                "Configuration loaded"
            );
        }

        let client = GitHubClient::from_config(&config)?;

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Interrupted, finishing the current repository...");
                on_interrupt.cancel();
            }
        });

        let mut aggregator = Aggregator::from_config(&config)?.with_cancellation(cancel);
        if verbose {
            aggregator = aggregator.on_progress(|p| {
                eprintln!(
                    "[{}/{}] {}",
                    p.current,
                    p.total,
                    p.repository.as_deref().unwrap_or("(unnamed)")
                );
            });
        }

        let report = aggregator.scan(&client).await?;

        let paths = OutputPaths::from(&config.output);
        write_outputs(&report, &paths)?;

        println!(
            "Wrote {} repositories to {}",
            report.projects.repository.len(),
            paths.projects.display()
        );
        println!(
            "Wrote {} skipped repositories to {}",
            report.skipped.skipped_repositories.len(),
            paths.skipped.display()
        );

        check_report(&report)
    }
}

/// Fail the command if the scan was partial
fn check_report(report: &ScanReport) -> anyhow::Result<()> {
    if !report.failures.is_empty() {
        eprintln!();
        eprintln!("Failed to fetch issues for {} repositories:", report.failures.len());
        for failure in &report.failures {
            eprintln!("  {}: {}", failure.repository, failure.error);
        }
    }

    if report.cancelled {
        anyhow::bail!("Scan cancelled; output contains only the repositories processed so far");
    }

    if !report.failures.is_empty() {
        anyhow::bail!(
            "{} repositories could not be scanned",
            report.failures.len()
        );
    }

    Ok(())
}
