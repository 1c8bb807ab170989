//! Download and unpack Cricsheet match archives

use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{ArchiveSource, SourcesConfig};
use crate::error::{DatasetError, Result};

pub fn build_client(sources: &SourcesConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(sources.timeout_seconds))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

fn download_bar(total: Option<u64>, url: &str) -> ProgressBar {
    let pb = match total {
        Some(len) => ProgressBar::new(len),
        None => ProgressBar::new_spinner(),
    };
    if let Ok(style) =
        ProgressStyle::with_template("{msg} [{bar:40}] {bytes}/{total_bytes} ({bytes_per_sec})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message(format!("Downloading {}", url));
    pb
}

/// Stream `url` into `dest`. A non-success status is an error and leaves no
/// file behind.
pub async fn download_archive(client: &reqwest::Client, url: &str, dest: &Path) -> Result<u64> {
    let mut response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DatasetError::Download {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let pb = download_bar(response.content_length(), url);
    let mut file = File::create(dest)?;
    let mut written: u64 = 0;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk)?;
        written += chunk.len() as u64;
        pb.set_position(written);
    }
    file.flush()?;
    pb.finish_and_clear();

    info!("Downloaded {} ({} bytes) to {}", url, written, dest.display());
    Ok(written)
}

/// Extract every entry of a zip archive under `dest_dir`. Entries whose path
/// would land outside `dest_dir` are refused.
pub fn unpack_archive(zip_path: &Path, dest_dir: &Path) -> Result<usize> {
    let file = File::open(zip_path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    fs::create_dir_all(dest_dir)?;

    let mut extracted = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let relative = match entry.enclosed_name() {
            Some(p) => p.to_path_buf(),
            None => {
                return Err(DatasetError::Zip(zip::result::ZipError::InvalidArchive(
                    "entry path escapes the destination directory",
                )))
            }
        };
        let out_path = dest_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
        extracted += 1;
    }

    info!("Extracted {} files from {}", extracted, zip_path.display());
    Ok(extracted)
}

/// Where one source's archive and extracted files live under the work dir
pub fn source_paths(work_dir: &Path, source: &ArchiveSource) -> (PathBuf, PathBuf) {
    (
        work_dir.join(format!("{}.zip", source.key)),
        work_dir.join(&source.key),
    )
}

/// Download and unpack one source, returning its extraction directory
pub async fn fetch_source(
    client: &reqwest::Client,
    source: &ArchiveSource,
    work_dir: &Path,
) -> Result<PathBuf> {
    let (zip_path, dir) = source_paths(work_dir, source);
    download_archive(client, &source.url, &zip_path).await?;
    unpack_archive(&zip_path, &dir)?;
    Ok(dir)
}

/// Fetch every configured source. A failing source is logged and left out so
/// the others can still be processed.
pub async fn fetch_all(
    sources: &SourcesConfig,
    work_dir: &Path,
) -> Result<Vec<(ArchiveSource, PathBuf)>> {
    let client = build_client(sources)?;
    let mut fetched = Vec::new();
    for source in &sources.archives {
        info!("📥 Fetching {} matches from {}", source.format, source.url);
        match fetch_source(&client, source, work_dir).await {
            Ok(dir) => fetched.push((source.clone(), dir)),
            Err(e) => warn!("Skipping {} source: {}", source.format, e),
        }
    }
    Ok(fetched)
}

/// Use whatever was extracted by an earlier run instead of downloading
pub fn local_sources(sources: &SourcesConfig, work_dir: &Path) -> Vec<(ArchiveSource, PathBuf)> {
    sources
        .archives
        .iter()
        .filter_map(|source| {
            let (_, dir) = source_paths(work_dir, source);
            if dir.is_dir() {
                Some((source.clone(), dir))
            } else {
                warn!("No local data for {} at {}", source.format, dir.display());
                None
            }
        })
        .collect()
}
