//! Release folder publishing and git automation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info, warn};

use crate::constants::RELEASE_MANIFEST;
use crate::error::{DatasetError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseFile {
    pub name: String,
    pub sha256: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseManifest {
    pub dataset: String,
    pub rows: usize,
    pub generated_at: DateTime<Utc>,
    pub files: Vec<ReleaseFile>,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn copy_into(src: &Path, release_dir: &Path) -> Result<ReleaseFile> {
    let name = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| DatasetError::Config(format!("not a file path: {}", src.display())))?;
    let bytes = fs::read(src)?;
    fs::write(release_dir.join(&name), &bytes)?;
    debug!("Copied {} to {}", name, release_dir.display());
    Ok(ReleaseFile {
        sha256: sha256_hex(&bytes),
        bytes: bytes.len() as u64,
        name,
    })
}

/// Data rows in a CSV file, header excluded
fn count_rows(path: &Path) -> Result<usize> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = 0;
    for record in reader.records() {
        record?;
        rows += 1;
    }
    Ok(rows)
}

/// Copy the cleaned CSV (and the data dictionary when present) into the
/// release folder and write a manifest describing them.
pub fn publish_release(
    clean_csv: &Path,
    data_dictionary: &Path,
    release_dir: &Path,
) -> Result<ReleaseManifest> {
    fs::create_dir_all(release_dir)?;

    let rows = count_rows(clean_csv)?;
    let mut files = vec![copy_into(clean_csv, release_dir)?];
    if data_dictionary.is_file() {
        files.push(copy_into(data_dictionary, release_dir)?);
    } else {
        warn!("Data dictionary {} not found, releasing without it", data_dictionary.display());
    }

    let manifest = ReleaseManifest {
        dataset: files[0].name.clone(),
        rows,
        generated_at: Utc::now(),
        files,
    };
    fs::write(
        release_dir.join(RELEASE_MANIFEST),
        serde_json::to_string_pretty(&manifest)?,
    )?;

    info!("📦 Release written to {} ({} rows)", release_dir.display(), rows);
    Ok(manifest)
}

fn run_git(args: &[&str]) -> Result<String> {
    debug!("git {}", args.join(" "));
    let output = Command::new("git")
        .args(args)
        .output()
        .map_err(|e| DatasetError::Git(format!("could not run git: {}", e)))?;
    if !output.status.success() {
        return Err(DatasetError::Git(format!(
            "git {} exited with {}: {}",
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Stage everything and commit with `message`
pub fn git_commit(message: &str) -> Result<()> {
    run_git(&["add", "."])?;
    run_git(&["commit", "-m", message])?;
    info!("Committed: {}", message);
    Ok(())
}

pub fn git_push(remote: &str, branch: &str) -> Result<()> {
    run_git(&["push", remote, branch])?;
    info!("Pushed to {}/{}", remote, branch);
    Ok(())
}
