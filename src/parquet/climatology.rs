//! Save per-cell climatologies to a parquet file.

use std::{fs::File, path::Path, sync::Arc};

use anyhow::Result;
use arrow::{
    array::{Float32Builder, Float64Builder, UInt16Builder, UInt32Builder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::arrow::ArrowWriter;

use crate::{calendar::DAYS_IN_CYCLE, cli::create_progress_bar, climatology::Climatology};

use super::writer_properties;

/// Climatology of one grid cell, with its harmonic fit when there is one.
#[derive(Debug, Clone)]
pub struct CellClimatology {
    pub lat: f64,
    pub lon: f64,
    pub climatology: Climatology,
    pub smoothed: Option<Climatology>,
}

pub fn save_climatology(cells: &[CellClimatology], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;

    let schema = Arc::new(Schema::new(vec![
        Field::new("lat", DataType::Float32, false),
        Field::new("lon", DataType::Float32, false),
        Field::new("dayofyear", DataType::UInt16, false),
        Field::new("count", DataType::UInt32, false),
        Field::new("mean", DataType::Float64, true),
        Field::new("std", DataType::Float64, true),
        Field::new("mean_smooth", DataType::Float64, true),
        Field::new("std_smooth", DataType::Float64, true),
    ]));

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(writer_properties()))?;
    let pb = create_progress_bar(cells.len() as u64, "Writing climatology".to_string());

    // One record batch per chunk of cells keeps memory bounded on large grids.
    for chunk in cells.chunks(256) {
        let rows = chunk.len() * DAYS_IN_CYCLE;
        let mut lat_builder = Float32Builder::with_capacity(rows);
        let mut lon_builder = Float32Builder::with_capacity(rows);
        let mut doy_builder = UInt16Builder::with_capacity(rows);
        let mut count_builder = UInt32Builder::with_capacity(rows);
        let mut mean_builder = Float64Builder::with_capacity(rows);
        let mut std_builder = Float64Builder::with_capacity(rows);
        let mut mean_smooth_builder = Float64Builder::with_capacity(rows);
        let mut std_smooth_builder = Float64Builder::with_capacity(rows);

        for cell in chunk {
            for (i, stats) in cell.climatology.days().iter().enumerate() {
                lat_builder.append_value(cell.lat as f32);
                lon_builder.append_value(cell.lon as f32);
                doy_builder.append_value((i + 1) as u16);
                count_builder.append_value(stats.count as u32);
                mean_builder.append_option(finite(stats.mean));
                std_builder.append_option(finite(stats.std));

                let smooth = cell.smoothed.as_ref().and_then(|s| s.days().get(i));
                mean_smooth_builder.append_option(smooth.and_then(|s| finite(s.mean)));
                std_smooth_builder.append_option(smooth.and_then(|s| finite(s.std)));
            }
            pb.inc(1);
        }

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(lat_builder.finish()),
                Arc::new(lon_builder.finish()),
                Arc::new(doy_builder.finish()),
                Arc::new(count_builder.finish()),
                Arc::new(mean_builder.finish()),
                Arc::new(std_builder.finish()),
                Arc::new(mean_smooth_builder.finish()),
                Arc::new(std_smooth_builder.finish()),
            ],
        )?;
        writer.write(&batch)?;
    }

    pb.finish_with_message("Climatology written");
    writer.close()?;
    Ok(())
}

/// NaN and infinities are stored as nulls.
pub(super) fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

// -- Tests -------------------------------------------------------------------
