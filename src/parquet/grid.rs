//! Read and write the long-format SST table (`date, lat, lon, sst`).

use std::{fs::File, path::Path, sync::Arc};

use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, ArrayRef, Date32Array, Date32Builder, Float32Builder, Float64Array},
    compute::cast,
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter};
use tracing::{debug, info};

use crate::grid::GridRecord;

use super::{from_date32, to_date32, writer_properties};

const CHUNK_SIZE: usize = 100_000;

pub fn read_grid(file_path: &Path) -> Result<Vec<GridRecord>> {
    let file = File::open(file_path)
        .with_context(|| format!("Cannot open `{}`", file_path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        let dates = column_as(&batch, "date", &DataType::Date32)?;
        let dates = dates
            .as_any()
            .downcast_ref::<Date32Array>()
            .ok_or_else(|| anyhow!("Column `date` is not a date"))?;
        let lats = float_column(&batch, "lat")?;
        let lons = float_column(&batch, "lon")?;
        let ssts = float_column(&batch, "sst")?;

        for row in 0..batch.num_rows() {
            if dates.is_null(row) || lats.is_null(row) || lons.is_null(row) {
                continue;
            }
            let date = from_date32(dates.value(row))
                .ok_or_else(|| anyhow!("Date out of range at row {}", row))?;
            let sst = (!ssts.is_null(row))
                .then(|| ssts.value(row))
                .filter(|v| !v.is_nan());

            records.push(GridRecord {
                date,
                lat: lats.value(row),
                lon: lons.value(row),
                sst,
            });
        }
        debug!(rows = batch.num_rows(), "Read grid batch");
    }

    info!(records = records.len(), path = %file_path.display(), "Loaded SST grid");

    Ok(records)
}

fn column_as(batch: &RecordBatch, name: &str, to: &DataType) -> Result<ArrayRef> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("Missing column `{}`", name))?;

    cast(column.as_ref(), to).with_context(|| format!("Cannot read column `{}` as {}", name, to))
}

fn float_column(batch: &RecordBatch, name: &str) -> Result<Float64Array> {
    let column = column_as(batch, name, &DataType::Float64)?;

    column
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| anyhow!("Column `{}` is not numeric", name))
}

pub fn save_grid(records: &[GridRecord], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;

    let schema = Arc::new(Schema::new(vec![
        Field::new("date", DataType::Date32, false),
        Field::new("lat", DataType::Float32, false),
        Field::new("lon", DataType::Float32, false),
        Field::new("sst", DataType::Float32, true),
    ]));

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(writer_properties()))?;

    for chunk in records.chunks(CHUNK_SIZE) {
        let mut date_builder = Date32Builder::with_capacity(chunk.len());
        let mut lat_builder = Float32Builder::with_capacity(chunk.len());
        let mut lon_builder = Float32Builder::with_capacity(chunk.len());
        let mut sst_builder = Float32Builder::with_capacity(chunk.len());

        for r in chunk {
            date_builder.append_value(to_date32(r.date));
            lat_builder.append_value(r.lat as f32);
            lon_builder.append_value(r.lon as f32);
            sst_builder.append_option(r.sst.map(|v| v as f32));
        }

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(date_builder.finish()),
                Arc::new(lat_builder.finish()),
                Arc::new(lon_builder.finish()),
                Arc::new(sst_builder.finish()),
            ],
        )?;
        writer.write(&batch)?;
    }

    writer.close()?;
    Ok(())
}

// -- Tests -------------------------------------------------------------------
