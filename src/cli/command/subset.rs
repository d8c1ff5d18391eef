use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::{cli::create_spinner, domain::NamedDomain, parquet};

use super::{load_grid, make_parquet_file_name};

pub fn subset(
    input: &Path,
    domain: NamedDomain,
    fill_nan: bool,
    output: Option<PathBuf>,
) -> Result<String> {
    let output = match output {
        Some(path) => path,
        None => make_parquet_file_name("subset")?,
    };

    let bar = create_spinner("Subsetting grid...".to_string());
    let grid = load_grid(input)?;
    let mut sub = grid.select(&domain.domain())?;
    if fill_nan {
        sub = sub.fill_nearest();
    }
    parquet::save_grid(&sub.to_records(), &output)?;
    bar.finish_with_message("Grid subset");

    info!(
        domain = %domain.domain(),
        lats = sub.lats().len(),
        lons = sub.lons().len(),
        "Saved subset"
    );

    Ok(output.to_string_lossy().to_string())
}

// -- Tests -------------------------------------------------------------------
