use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::{
    calendar::{LeapDayPolicy, DAYS_IN_CYCLE},
    cli::create_spinner,
    climatology::{Climatology, ReferencePeriod},
    grid::SstGrid,
    harmonic::HarmonicBasis,
    parquet::{self, CellClimatology},
};

use super::{load_grid, make_parquet_file_name};

pub fn climatology(
    input: &Path,
    start: NaiveDate,
    end: NaiveDate,
    harmonics: usize,
    leap_day: LeapDayPolicy,
    fill_nan: bool,
    output: Option<PathBuf>,
) -> Result<String> {
    let period = ReferencePeriod::new(start, end)?;
    let basis = HarmonicBasis::new(DAYS_IN_CYCLE, harmonics)?;
    let output = match output {
        Some(path) => path,
        None => make_parquet_file_name("climatology")?,
    };

    let mut grid = load_grid(input)?;
    if fill_nan {
        grid = grid.fill_nearest();
    }

    let bar = create_spinner(format!("Computing climatology of {} cells...", grid.cell_count()));
    let cells = grid_climatology(&grid, period, &basis, leap_day)?;
    bar.finish_with_message("Climatology computed");

    let unsmoothed = cells.iter().filter(|c| c.smoothed.is_none()).count();
    if unsmoothed > 0 {
        warn!(
            cells = unsmoothed,
            "Cells with missing days in the reference period were not smoothed"
        );
    }

    parquet::save_climatology(&cells, &output)?;
    info!(cells = cells.len(), %start, %end, harmonics, "Saved climatology");

    Ok(output.to_string_lossy().to_string())
}

/// Climatology of every cell, gap-filled first. Cells whose mean covers
/// every day are then smoothed in one batch on the shared basis.
pub fn grid_climatology(
    grid: &SstGrid,
    period: ReferencePeriod,
    basis: &HarmonicBasis,
    leap_day: LeapDayPolicy,
) -> Result<Vec<CellClimatology>> {
    let cells: Vec<_> = grid.cells().collect();

    let mut cells: Vec<CellClimatology> = cells
        .into_par_iter()
        .map(|(lat, lon, series)| CellClimatology {
            lat,
            lon,
            climatology: Climatology::compute(&series.fill_gaps(), period, leap_day),
            smoothed: None,
        })
        .collect();

    let complete: Vec<usize> = (0..cells.len())
        .filter(|&i| cells[i].climatology.days().iter().all(|d| d.mean.is_finite()))
        .collect();
    let means: Vec<Vec<f64>> = complete.iter().map(|&i| cells[i].climatology.mean()).collect();
    let stds: Vec<Vec<f64>> = complete.iter().map(|&i| cells[i].climatology.std()).collect();

    let smooth_means = basis.fit_batch(&means)?;
    let smooth_stds = basis.fit_batch(&stds)?;

    for ((i, mean), std) in complete.into_iter().zip(smooth_means).zip(smooth_stds) {
        let climatology = &cells[i].climatology;
        cells[i].smoothed = Some(climatology.with_curves(mean, std));
    }

    Ok(cells)
}

// -- Tests -------------------------------------------------------------------
