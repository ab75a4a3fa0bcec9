//! Writing scan results to disk
//!
//! Each document is serialized in memory first, written to a temporary
//! file beside the target and then renamed over it, so a reader never sees
//! a half-written file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{info, warn};

use crate::aggregate::ScanReport;
use crate::config::OutputConfig;
use crate::{Error, Result};

/// Where the two output documents go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub projects: PathBuf,
    pub skipped: PathBuf,
}

impl From<&OutputConfig> for OutputPaths {
    fn from(config: &OutputConfig) -> Self {
        Self {
            projects: config.projects.clone(),
            skipped: config.skipped.clone(),
        }
    }
}

/// Serialize `value` as JSON indented with four spaces
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Replace `path` with `contents` via a temporary sibling file
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let staged = stage(path, contents)?;
    commit(&staged, path)
}

/// Write the aggregated projects and the skipped list
///
/// Both documents are staged before either target is replaced, so a failed
/// write leaves the previous pair in place.
pub fn write_outputs(report: &ScanReport, paths: &OutputPaths) -> Result<()> {
    let projects = to_pretty_json(&report.projects)?;
    let skipped = to_pretty_json(&report.skipped)?;

    let staged_projects = stage(&paths.projects, &projects)?;
    let staged_skipped = match stage(&paths.skipped, &skipped) {
        Ok(staged) => staged,
        Err(e) => {
            discard(&staged_projects);
            return Err(e);
        }
    };

    if let Err(e) = commit(&staged_projects, &paths.projects) {
        discard(&staged_skipped);
        return Err(e);
    }
    info!(
        path = %paths.projects.display(),
        repositories = report.projects.repository.len(),
        "Wrote projects"
    );

    commit(&staged_skipped, &paths.skipped)?;
    info!(
        path = %paths.skipped.display(),
        skipped = report.skipped.skipped_repositories.len(),
        "Wrote skipped repositories"
    );

    Ok(())
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Other(format!("Not a file path: {}", path.display())))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    Ok(path.with_file_name(tmp_name))
}

/// Write `contents` to the temporary sibling of `path` and return its path
///
/// Nothing is left on disk if this fails.
fn stage(path: &Path, contents: &[u8]) -> Result<PathBuf> {
    let tmp_path = temp_path(path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let written = fs::File::create(&tmp_path).and_then(|mut file| {
        file.write_all(contents)?;
        file.sync_all()
    });
    if let Err(e) = written {
        discard(&tmp_path);
        return Err(Error::Io(e));
    }

    Ok(tmp_path)
}

fn commit(tmp_path: &Path, path: &Path) -> Result<()> {
    fs::rename(tmp_path, path).map_err(|e| {
        discard(tmp_path);
        Error::Io(e)
    })
}

fn discard(tmp_path: &Path) {
    if let Err(e) = fs::remove_file(tmp_path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %tmp_path.display(), error = %e, "Could not remove temporary file");
        }
    }
}
