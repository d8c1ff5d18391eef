pub mod climatology;
pub mod download;
pub mod index;
pub mod subset;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use chrono::{Datelike, Local};

pub use climatology::climatology;
pub use download::download;
pub use index::index;
pub use subset::subset;

use crate::{grid::SstGrid, parquet};

pub fn make_parquet_file_name(kind: &str) -> Result<PathBuf> {
    let today = Local::now();
    let file_name = format!(
        "oisst-{}-{}-{:02}-{:02}.parquet",
        kind,
        today.year(),
        today.month(),
        today.day()
    );

    Ok(home_dir()?.join(file_name))
}

pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow!("Cannot find the home directory"))
}

fn load_grid(input: &Path) -> Result<SstGrid> {
    let records = parquet::read_grid(input)?;

    Ok(SstGrid::from_records(&records))
}

// -- Tests -------------------------------------------------------------------
