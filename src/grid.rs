//! Gridded SST held in memory as a dense (time, lat, lon) cube.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::{
    domain::Domain,
    error::{Error, Result},
    series::TimeSeries,
};

/// One value of a long-format SST table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridRecord {
    pub date: NaiveDate,
    pub lat: f64,
    pub lon: f64,
    pub sst: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SstGrid {
    dates: Vec<NaiveDate>,
    lats: Vec<f64>,
    lons: Vec<f64>,
    /// Row-major over (time, lat, lon); NaN where there is no data.
    values: Vec<f64>,
}

impl SstGrid {
    pub fn from_records(records: &[GridRecord]) -> Self {
        let dates = sorted_unique(records.iter().map(|r| r.date).collect(), NaiveDate::cmp);
        let lats = sorted_unique(records.iter().map(|r| r.lat).collect(), f64::total_cmp);
        let lons = sorted_unique(records.iter().map(|r| r.lon).collect(), f64::total_cmp);

        let mut values = vec![f64::NAN; dates.len() * lats.len() * lons.len()];
        let (nlat, nlon) = (lats.len(), lons.len());

        for r in records {
            // Every key came from `records`, so the searches cannot miss.
            let (Ok(t), Ok(i), Ok(j)) = (
                dates.binary_search(&r.date),
                lats.binary_search_by(|v| v.total_cmp(&r.lat)),
                lons.binary_search_by(|v| v.total_cmp(&r.lon)),
            ) else {
                continue;
            };
            values[(t * nlat + i) * nlon + j] = r.sst.unwrap_or(f64::NAN);
        }

        SstGrid {
            dates,
            lats,
            lons,
            values,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    pub fn cell_count(&self) -> usize {
        self.lats.len() * self.lons.len()
    }

    fn index(&self, t: usize, i: usize, j: usize) -> usize {
        (t * self.lats.len() + i) * self.lons.len() + j
    }

    pub fn value(&self, t: usize, i: usize, j: usize) -> Option<f64> {
        if t >= self.dates.len() || i >= self.lats.len() || j >= self.lons.len() {
            return None;
        }
        Some(self.values[self.index(t, i, j)])
    }

    /// Time series at `(lat_index, lon_index)`.
    pub fn cell_series(&self, i: usize, j: usize) -> TimeSeries {
        let values = (0..self.dates.len())
            .map(|t| self.values[self.index(t, i, j)])
            .collect();

        TimeSeries::from_sorted(self.dates.clone(), values)
    }

    /// Every cell with its coordinates, in (lat, lon) order.
    pub fn cells(&self) -> impl Iterator<Item = (f64, f64, TimeSeries)> + '_ {
        (0..self.lats.len()).flat_map(move |i| {
            (0..self.lons.len()).map(move |j| (self.lats[i], self.lons[j], self.cell_series(i, j)))
        })
    }

    /// The part of the grid inside `domain`.
    pub fn select(&self, domain: &Domain) -> Result<SstGrid> {
        let lat_idx: Vec<usize> = (0..self.lats.len())
            .filter(|&i| self.lats[i] >= domain.lat_min && self.lats[i] <= domain.lat_max)
            .collect();
        let lon_idx: Vec<usize> = (0..self.lons.len())
            .filter(|&j| self.lons[j] >= domain.lon_min && self.lons[j] <= domain.lon_max)
            .collect();

        if lat_idx.is_empty() || lon_idx.is_empty() {
            return Err(Error::EmptyDomain(domain.to_string()));
        }

        let mut values = Vec::with_capacity(self.dates.len() * lat_idx.len() * lon_idx.len());
        for t in 0..self.dates.len() {
            for &i in &lat_idx {
                for &j in &lon_idx {
                    values.push(self.values[self.index(t, i, j)]);
                }
            }
        }

        Ok(SstGrid {
            dates: self.dates.clone(),
            lats: lat_idx.iter().map(|&i| self.lats[i]).collect(),
            lons: lon_idx.iter().map(|&j| self.lons[j]).collect(),
            values,
        })
    }

    /// Spatial mean over `domain` for each date, skipping NaN cells.
    pub fn area_mean(&self, domain: &Domain) -> Result<TimeSeries> {
        let sub = self.select(domain)?;
        let cells = sub.cell_count();

        let values = sub
            .values
            .chunks(cells)
            .map(|slab| {
                let (sum, n) = slab
                    .iter()
                    .filter(|v| !v.is_nan())
                    .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
                if n == 0 {
                    f64::NAN
                } else {
                    sum / n as f64
                }
            })
            .collect();

        Ok(TimeSeries::from_sorted(sub.dates, values))
    }

    /// Replaces every NaN with the nearest finite cell of the same date.
    ///
    /// Distance is Euclidean in grid indices, without wrapping in longitude.
    /// Ties go to the lower latitude index, then the lower longitude index.
    /// A date with no finite cell stays all NaN.
    pub fn fill_nearest(&self) -> SstGrid {
        let (nlat, nlon) = (self.lats.len(), self.lons.len());
        let mut values = self.values.clone();

        if nlat * nlon > 0 {
            values
                .par_chunks_mut(nlat * nlon)
                .zip(self.values.par_chunks(nlat * nlon))
                .for_each(|(filled, slab)| {
                    for i in 0..nlat {
                        for j in 0..nlon {
                            if slab[i * nlon + j].is_nan() {
                                filled[i * nlon + j] = nearest_in_slab(slab, nlat, nlon, i, j);
                            }
                        }
                    }
                });
        }

        SstGrid {
            dates: self.dates.clone(),
            lats: self.lats.clone(),
            lons: self.lons.clone(),
            values,
        }
    }

    /// Back to long format, one record per (date, lat, lon).
    pub fn to_records(&self) -> Vec<GridRecord> {
        let mut records = Vec::with_capacity(self.values.len());
        for (t, date) in self.dates.iter().enumerate() {
            for (i, lat) in self.lats.iter().enumerate() {
                for (j, lon) in self.lons.iter().enumerate() {
                    let v = self.values[self.index(t, i, j)];
                    records.push(GridRecord {
                        date: *date,
                        lat: *lat,
                        lon: *lon,
                        sst: (!v.is_nan()).then_some(v),
                    });
                }
            }
        }

        records
    }
}

/// Searches square rings of growing radius around `(i, j)`; a ring at
/// radius `r` cannot hold anything closer than `r`, so the search stops once
/// `r²` exceeds the best distance found.
fn nearest_in_slab(slab: &[f64], nlat: usize, nlon: usize, i: usize, j: usize) -> f64 {
    let (i, j) = (i as isize, j as isize);
    let (nlat, nlon) = (nlat as isize, nlon as isize);
    // (distance², lat index, lon index, value)
    let mut best: Option<(isize, isize, isize, f64)> = None;

    for r in 1..nlat.max(nlon) {
        if matches!(best, Some((d, ..)) if r * r > d) {
            break;
        }
        for di in -r..=r {
            let step = if di.abs() == r { 1 } else { 2 * r };
            let mut dj = -r;
            while dj <= r {
                let (y, x) = (i + di, j + dj);
                if y >= 0 && y < nlat && x >= 0 && x < nlon {
                    let v = slab[(y * nlon + x) as usize];
                    let d = di * di + dj * dj;
                    let closer = best.map_or(true, |(bd, by, bx, _)| (d, y, x) < (bd, by, bx));
                    if !v.is_nan() && closer {
                        best = Some((d, y, x, v));
                    }
                }
                dj += step;
            }
        }
    }

    best.map_or(f64::NAN, |(.., v)| v)
}

fn sorted_unique<T: Copy>(mut items: Vec<T>, cmp: fn(&T, &T) -> Ordering) -> Vec<T> {
    items.sort_by(cmp);
    items.dedup_by(|a, b| cmp(a, b) == Ordering::Equal);

    items
}

// -- Tests -------------------------------------------------------------------
