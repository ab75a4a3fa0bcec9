//! Config command - show the effective configuration or save it

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use issuelinks_core::{github_token, Config};

use super::OverrideArgs;

/// Show or save configuration
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write the effective configuration (with any flags applied) to the config file
    Save {
        #[command(flatten)]
        overrides: OverrideArgs,
    },
}

impl ConfigArgs {
    /// Execute the config command
    pub fn execute(self, config_path: Option<&Path>) -> anyhow::Result<()> {
        match self.command {
            ConfigCommand::Show => show(config_path),
            ConfigCommand::Save { overrides } => save(config_path, overrides),
        }
    }
}

fn target_path(config_path: Option<&Path>) -> anyhow::Result<PathBuf> {
    config_path
        .map(Path::to_path_buf)
        .or_else(Config::default_config_path)
        .ok_or_else(|| anyhow::anyhow!("Could not determine config path; pass --config"))
}

/// The file `config` commands act on and its settings with env and flags applied
///
/// A file that does not exist yet reads as the defaults.
fn effective(
    config_path: Option<&Path>,
    overrides: OverrideArgs,
) -> anyhow::Result<(PathBuf, Config)> {
    let path = target_path(config_path)?;
    let config = Config::load_or_default(&path)?
        .with_env_overrides()?
        .with_cli_overrides(overrides.into());
    Ok((path, config))
}

fn show(config_path: Option<&Path>) -> anyhow::Result<()> {
    let (path, config) = effective(config_path, OverrideArgs::default())?;

    println!("issuelinks Configuration");
    println!("========================");
    println!();
    println!("GitHub:");
    println!(
        "  username: {}",
        config.github.username.as_deref().unwrap_or("(not set)")
    );
    println!("  per_page: {}", config.github.effective_per_page());
    println!("  api_url: {}", config.github.api_url);
    println!("  timeout: {:?}", config.github.timeout);
    println!();
    println!("Scan:");
    println!("  include_issues: {}", config.scan.include_issues);
    println!("  empty_issues: {:?}", config.scan.empty_issues);
    println!("  on_failure: {:?}", config.scan.on_failure);
    println!();
    println!("Throttle:");
    if config.throttle.enabled {
        println!(
            "  {} requests per {:?}",
            config.throttle.burst, config.throttle.interval
        );
    } else {
        println!("  disabled");
    }
    println!();
    println!("Output:");
    println!("  projects: {}", config.output.projects.display());
    println!("  skipped: {}", config.output.skipped.display());
    println!();

    println!("Config file: {}", path.display());
    if path.exists() {
        println!("  (exists)");
    } else {
        println!("  (not found - using defaults)");
    }

    let token = github_token().ok().flatten();
    println!(
        "GitHub token: {}",
        if token.is_some() { "found" } else { "not found" }
    );

    Ok(())
}

fn save(config_path: Option<&Path>, overrides: OverrideArgs) -> anyhow::Result<()> {
    // Start from the file being replaced, if any, so unrelated settings survive.
    let (path, config) = effective(config_path, overrides)?;

    config.save_to_file(&path)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_with_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(show(Some(&path)).is_ok());
        assert!(!path.exists());
    }

    #[test]
    fn test_save_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issuelinks").join("config.toml");
        let overrides = OverrideArgs {
            username: Some("octocat".to_string()),
            no_throttle: true,
            ..Default::default()
        };

        save(Some(&path), overrides).unwrap();

        let saved = Config::load_from_file(&path).unwrap();
        assert_eq!(saved.github.username.as_deref(), Some("octocat"));
        assert!(!saved.throttle.enabled);
    }

    #[test]
    fn test_save_keeps_unrelated_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[output]\nprojects = \"out/projects.json\"\n").unwrap();

        let overrides = OverrideArgs {
            username: Some("octocat".to_string()),
            ..Default::default()
        };
        save(Some(&path), overrides).unwrap();

        let saved = Config::load_from_file(&path).unwrap();
        assert_eq!(saved.github.username.as_deref(), Some("octocat"));
        assert_eq!(saved.output.projects, PathBuf::from("out/projects.json"));
    }
}
