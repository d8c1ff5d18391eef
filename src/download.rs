//! Downloads daily OISST v2 high resolution files from the NOAA PSL servers.

use std::{
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, bail, Context, Error, Result};
use futures::StreamExt;
use indicatif::ProgressStyle;
use reqwest::Client;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::cli::create_spinner;

pub const FILE_SERVER_URL: &str = "https://downloads.psl.noaa.gov/Datasets/noaa.oisst.v2.highres";
pub const THREDDS_URL: &str = "https://psl.noaa.gov/thredds/fileServer/Datasets/noaa.oisst.v2.highres";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Where a year of data is fetched from.
#[derive(Debug, Clone)]
pub struct Sources {
    pub thredds: String,
    pub file_server: String,
}

impl Default for Sources {
    fn default() -> Self {
        Sources {
            thredds: THREDDS_URL.to_string(),
            file_server: FILE_SERVER_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub year: i32,
    pub output_dir: PathBuf,
    /// Try THREDDS first and fall back to the file server on any failure.
    pub try_thredds: bool,
    /// Upper bound on the THREDDS attempt.
    pub timeout: Duration,
    pub sources: Sources,
}

pub fn file_name(year: i32) -> String {
    format!("sst.day.mean.{}.nc", year)
}

pub fn file_url(root: &str, year: i32) -> String {
    format!("{}/{}", root.trim_end_matches('/'), file_name(year))
}

/// Fetches one year of daily SST and returns the saved path.
pub async fn download_oisst(client: &Client, request: &DownloadRequest) -> Result<PathBuf> {
    let target = request.output_dir.join(file_name(request.year));

    if request.try_thredds {
        let url = file_url(&request.sources.thredds, request.year);
        match download_with_timeout(client, &url, &target, request.timeout).await {
            Ok(()) => {
                info!(%url, path = %target.display(), "Downloaded from THREDDS");
                return Ok(target);
            }
            Err(e) => warn!(%url, error = %e, "THREDDS download failed, trying file server"),
        }
    }

    let url = file_url(&request.sources.file_server, request.year);
    download_file(client, &url, &target).await?;
    info!(%url, path = %target.display(), "Downloaded from PSL file server");

    Ok(target)
}

/// Runs [`download_file`] and abandons it once `timeout` has elapsed.
///
/// Dropping the unfinished download removes its temporary file.
pub async fn download_with_timeout(
    client: &Client,
    url: &str,
    file_path: &Path,
    timeout: Duration,
) -> Result<()> {
    tokio::time::timeout(timeout, download_file(client, url, file_path))
        .await
        .map_err(|_| anyhow!("Timed out after {:?} downloading {}", timeout, url))?
}

/// Streams `url` to `file_path` with a progress bar.
///
/// The body goes to a temporary file next to `file_path` that is only
/// renamed into place once complete.
pub async fn download_file(client: &Client, url: &str, file_path: &Path) -> Result<(), Error> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        bail!("Failed to download {}: {}", url, response.status());
    }

    let dir = file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut file = NamedTempFile::new_in(dir)?;

    let progress_bar = create_spinner(format!("Downloading {}", url));
    let total_size = response.content_length().unwrap_or(0);
    if total_size > 0 {
        progress_bar.set_length(total_size);
        progress_bar.set_style(
            ProgressStyle::with_template(
                "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {eta}",
            )?
            .progress_chars("=> "),
        );
    }

    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.with_context(|| format!("Error reading body of {}", url))?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        progress_bar.set_position(downloaded);
    }

    file.persist(file_path)?;
    progress_bar.finish_with_message(format!("Saved {}", file_path.display()));

    Ok(())
}

// -- Tests -------------------------------------------------------------------
