use std::{
    f64::consts::PI,
    path::{Path, PathBuf},
};

use anyhow::{bail, Result};
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::{
    calendar::{LeapDayPolicy, DAYS_IN_CYCLE},
    climatology::{Climatology, ReferencePeriod},
    domain::Region,
    grid::SstGrid,
    harmonic::HarmonicBasis,
    parquet::{self, IndexTable},
    spectral::{dominant_period, harmonic_smoother},
};

use super::{load_grid, make_parquet_file_name};

pub fn index(
    input: &Path,
    regions: &[Region],
    start: NaiveDate,
    end: NaiveDate,
    cutoff: usize,
    leap_day: LeapDayPolicy,
    output: Option<PathBuf>,
) -> Result<String> {
    if regions.is_empty() {
        bail!("No region given");
    }
    let period = ReferencePeriod::new(start, end)?;
    let output = match output {
        Some(path) => path,
        None => {
            let names: Vec<&str> = regions.iter().map(|r| r.name()).collect();
            make_parquet_file_name(&format!("index-{}", names.join("_")))?
        }
    };

    let grid = load_grid(input)?;
    let tables = regions
        .iter()
        .map(|region| regional_index(&grid, *region, period, cutoff, leap_day))
        .collect::<Result<Vec<_>>>()?;
    parquet::save_index(&tables, &output)?;

    let rows: usize = tables.iter().map(|t| t.dates.len()).sum();
    info!(regions = tables.len(), rows, "Saved regional indices");

    Ok(output.to_string_lossy().to_string())
}

/// Area mean over `region`, its anomaly against the reference climatology,
/// and the anomaly split into low and high frequencies.
pub fn regional_index(
    grid: &SstGrid,
    region: Region,
    period: ReferencePeriod,
    cutoff: usize,
    leap_day: LeapDayPolicy,
) -> Result<IndexTable> {
    let series = grid.area_mean(&region.domain())?.fill_gaps();
    let climatology = Climatology::compute(&series, period, leap_day);

    let missing = climatology.missing_days();
    if !missing.is_empty() {
        warn!(
            %region,
            days = missing.len(),
            "Reference period does not cover every day of the year"
        );
    }
    if let Some((amplitude, peak_day)) = annual_cycle(&climatology) {
        info!(%region, amplitude, peak_day, "Annual cycle of the climatology");
    }

    let anomalies = climatology.anomalies(&series, leap_day)?;
    if anomalies.is_empty() {
        bail!("No data for region {}", region);
    }
    if anomalies.values().iter().any(|v| !v.is_finite()) {
        warn!(%region, "Anomalies contain missing values; the frequency split will be NaN");
    }
    if let Some(days) = dominant_period(anomalies.values()) {
        info!(%region, days, "Dominant period of the anomalies");
    }

    let split = harmonic_smoother(anomalies.values(), cutoff)?;
    let value = series.normalize(leap_day).iter().map(|d| d.value()).collect();

    Ok(IndexTable {
        region: region.to_string(),
        dates: anomalies.dates().to_vec(),
        value,
        anomaly: anomalies.values().to_vec(),
        low_pass: split.low_pass,
        high_pass: split.high_pass,
    })
}

/// Amplitude and peak ordinal day of the first harmonic of the mean.
fn annual_cycle(climatology: &Climatology) -> Option<(f64, f64)> {
    let basis = HarmonicBasis::new(DAYS_IN_CYCLE, 1).ok()?;
    let fit = basis.fit(&climatology.mean()).ok()?;
    let amplitude = fit.amplitude(1)?;
    let phase = fit.phase(1)?;
    if !amplitude.is_finite() {
        return None;
    }

    Some((amplitude, phase / (2.0 * PI) * DAYS_IN_CYCLE as f64))
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use ::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::TempDir;

    use crate::{grid::GridRecord, series::TimeSeries};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn grid_fixture(warming: f64) -> SstGrid {
        let mut records = Vec::new();
        for year in [2019, 2020, 2021] {
            let offset = if year == 2021 { warming } else { 0.0 };
            for day in date(year, 1, 1).iter_days().take_while(|d| *d <= date(year, 12, 31)) {
                for (lon, base) in [(200.0, 27.0), (230.0, 25.0)] {
                    records.push(GridRecord {
                        date: day,
                        lat: 0.0,
                        lon,
                        sst: Some(base + offset),
                    });
                }
            }
        }

        SstGrid::from_records(&records)
    }

    #[test]
    fn should_compute_anomalies_against_reference() {
        let grid = grid_fixture(1.0);
        let period = ReferencePeriod::new(date(2019, 1, 1), date(2020, 12, 31)).unwrap();

        let table = regional_index(&grid, Region::Nino34, period, 3, LeapDayPolicy::Drop).unwrap();

        // Leap day 2020-02-29 is dropped.
        assert_eq!(table.dates.len(), 365 * 3);
        assert_eq!(table.value.len(), table.dates.len());
        assert!((table.value[0] - 26.0).abs() < 1e-12);
        assert!(table.anomaly[0].abs() < 1e-12);
        assert!((table.anomaly[365 * 2] - 1.0).abs() < 1e-12);
        for i in 0..table.dates.len() {
            let total = table.low_pass[i] + table.high_pass[i];
            assert!((total - table.anomaly[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn should_locate_annual_cycle_peak() {
        let start = date(2021, 1, 1);
        let values = (1..=365)
            .map(|d| 20.0 + 1.5 * (2.0 * PI * (d as f64 - 200.0) / 365.0).cos())
            .collect();
        let series = TimeSeries::daily(start, values);
        let period = ReferencePeriod::new(start, date(2021, 12, 31)).unwrap();
        let climatology = Climatology::compute(&series, period, LeapDayPolicy::Drop);

        let (amplitude, peak_day) = annual_cycle(&climatology).unwrap();

        assert!((amplitude - 1.5).abs() < 1e-9);
        assert!((peak_day - 200.0).abs() < 1e-6);
    }

    #[test]
    fn should_write_every_region_of_a_group() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("grid.parquet");
        let output = temp_dir.path().join("ninos.parquet");
        let records = grid_fixture(0.5).to_records();
        parquet::save_grid(&records, &input).unwrap();
        let start = date(2019, 1, 1);
        let end = date(2020, 12, 31);

        let regions = [Region::Nino34, Region::Nino4];
        index(&input, &regions, start, end, 3, LeapDayPolicy::Drop, Some(output.clone())).unwrap();

        let file = std::fs::File::open(&output).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let rows: usize = reader.map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(rows, 2 * 365 * 3);
    }

    #[test]
    fn should_fail_for_region_outside_grid() {
        let grid = grid_fixture(0.0);
        let period = ReferencePeriod::new(date(2019, 1, 1), date(2020, 12, 31)).unwrap();

        let r = regional_index(&grid, Region::IodEast, period, 3, LeapDayPolicy::Drop);

        assert!(r.is_err());
    }
}
