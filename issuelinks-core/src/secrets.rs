//! GitHub token lookup
//!
//! The token never lives in `config.toml`. It comes from `GITHUB_TOKEN`
//! or, failing that, from `~/.config/issuelinks/secrets.toml`:
//!
//! ```toml
//! [github]
//! token = "ghp_..."
//! ```
//!
//! On Unix the secrets file is refused unless only its owner can read it.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::{Error, Result};

/// Environment variable checked before the secrets file
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

const TEMPLATE: &str = "\
# issuelinks secrets - keep this file private (mode 600)
#
# A classic or fine-grained token with read access to repositories and
# issues: https://github.com/settings/tokens

[github]
token = \"\"
";

/// Contents of `secrets.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Secrets {
    pub github: GitHubSecrets,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GitHubSecrets {
    pub token: Option<String>,
}

impl Secrets {
    /// `~/.config/issuelinks/secrets.toml`
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("issuelinks").join("secrets.toml"))
    }

    /// Parse a secrets file after checking who can read it
    pub fn read(path: &Path) -> Result<Self> {
        ensure_private(path)?;
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| {
            Error::Config(format!("Invalid secrets file {}: {}", path.display(), e))
        })
    }

    /// Write an empty template to `path`, readable by the owner only
    ///
    /// Fails if the file already exists.
    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => {
                Error::Config(format!("{} already exists, not overwriting", path.display()))
            }
            _ => Error::Io(e),
        })?;
        file.write_all(TEMPLATE.as_bytes())?;

        info!(path = %path.display(), "Wrote secrets template");
        Ok(())
    }
}

/// The GitHub token from the environment or the default secrets file
///
/// `Ok(None)` means neither source has a non-empty token.
pub fn github_token() -> Result<Option<String>> {
    resolve_token(std::env::var(TOKEN_ENV).ok(), Secrets::path().as_deref())
}

fn resolve_token(env_token: Option<String>, file: Option<&Path>) -> Result<Option<String>> {
    if let Some(token) = env_token.as_deref().and_then(non_blank) {
        debug!(source = TOKEN_ENV, "Found GitHub token");
        return Ok(Some(token));
    }

    let Some(path) = file.filter(|p| p.exists()) else {
        return Ok(None);
    };

    let token = Secrets::read(path)?.github.token.as_deref().and_then(non_blank);
    if token.is_some() {
        debug!(source = %path.display(), "Found GitHub token");
    }
    Ok(token)
}

fn non_blank(token: &str) -> Option<String> {
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(unix)]
fn ensure_private(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)?.permissions().mode() & 0o777;
    if mode & 0o077 == 0 {
        return Ok(());
    }
    Err(Error::Config(format!(
        "{} is readable by other users (mode {:o}); run `chmod 600` on it",
        path.display(),
        mode
    )))
}

#[cfg(not(unix))]
fn ensure_private(_path: &Path) -> Result<()> {
    Ok(())
}
