//! Secrets command - create the token file

use clap::{Args, Subcommand};
use issuelinks_core::Secrets;

/// Manage the secrets file
#[derive(Args, Debug)]
pub struct SecretsArgs {
    #[command(subcommand)]
    pub command: SecretsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SecretsCommand {
    /// Create ~/.config/issuelinks/secrets.toml with owner-only permissions
    Init,
}

impl SecretsArgs {
    /// Execute the secrets command
    pub fn execute(self) -> anyhow::Result<()> {
        match self.command {
            SecretsCommand::Init => {
                let path = Secrets::path()
                    .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
                Secrets::write_template(&path)?;
                println!("Created {}", path.display());
                println!("Add your GitHub token there, or set GITHUB_TOKEN instead.");
                Ok(())
            }
        }
    }
}
