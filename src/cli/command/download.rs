use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use chrono::{Datelike, Utc};
use reqwest::Client;

use crate::download::{download_oisst, DownloadRequest, Sources};

use super::home_dir;

pub async fn download(
    year: Option<i32>,
    output_dir: Option<PathBuf>,
    try_thredds: bool,
    timeout_secs: u64,
) -> Result<String> {
    let output_dir = match output_dir {
        Some(dir) => dir,
        None => home_dir()?,
    };
    std::fs::create_dir_all(&output_dir)?;

    let request = DownloadRequest {
        year: year.unwrap_or_else(|| Utc::now().year()),
        output_dir,
        try_thredds,
        timeout: Duration::from_secs(timeout_secs),
        sources: Sources::default(),
    };

    let path = download_oisst(&Client::new(), &request).await?;

    Ok(path.to_string_lossy().to_string())
}
