//! Save regional SST indices to a parquet file.

use std::{fs::File, path::Path, sync::Arc};

use anyhow::{ensure, Result};
use arrow::{
    array::{Date32Builder, Float64Builder, StringBuilder},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;

use super::{climatology::finite, to_date32, writer_properties};

/// Area-mean SST of a region with its anomaly and the anomaly's
/// low/high frequency split. All columns share `dates`.
#[derive(Debug, Clone, Default)]
pub struct IndexTable {
    pub region: String,
    pub dates: Vec<NaiveDate>,
    pub value: Vec<f64>,
    pub anomaly: Vec<f64>,
    pub low_pass: Vec<f64>,
    pub high_pass: Vec<f64>,
}

/// Writes one or more regional tables into a single file, one region after
/// the other.
pub fn save_index(tables: &[IndexTable], file_path: &Path) -> Result<()> {
    for table in tables {
        let rows = table.dates.len();
        ensure!(
            [&table.value, &table.anomaly, &table.low_pass, &table.high_pass]
                .iter()
                .all(|c| c.len() == rows),
            "Index columns for region {} differ in length",
            table.region
        );
    }

    let file = File::create(file_path)?;

    let schema = Arc::new(Schema::new(vec![
        Field::new("region", DataType::Utf8, false),
        Field::new("date", DataType::Date32, false),
        Field::new("value", DataType::Float64, true),
        Field::new("anomaly", DataType::Float64, true),
        Field::new("low_pass", DataType::Float64, true),
        Field::new("high_pass", DataType::Float64, true),
    ]));

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(writer_properties()))?;

    for table in tables {
        let rows = table.dates.len();
        let mut region_builder = StringBuilder::with_capacity(rows, rows * table.region.len());
        let mut date_builder = Date32Builder::with_capacity(rows);
        let mut value_builder = Float64Builder::with_capacity(rows);
        let mut anomaly_builder = Float64Builder::with_capacity(rows);
        let mut low_builder = Float64Builder::with_capacity(rows);
        let mut high_builder = Float64Builder::with_capacity(rows);

        for row in 0..rows {
            region_builder.append_value(&table.region);
            date_builder.append_value(to_date32(table.dates[row]));
            value_builder.append_option(finite(table.value[row]));
            anomaly_builder.append_option(finite(table.anomaly[row]));
            low_builder.append_option(finite(table.low_pass[row]));
            high_builder.append_option(finite(table.high_pass[row]));
        }

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(region_builder.finish()),
                Arc::new(date_builder.finish()),
                Arc::new(value_builder.finish()),
                Arc::new(anomaly_builder.finish()),
                Arc::new(low_builder.finish()),
                Arc::new(high_builder.finish()),
            ],
        )?;
        writer.write(&batch)?;
    }

    writer.close()?;

    Ok(())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use arrow::array::{Array, StringArray};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::NamedTempFile;

    use super::*;

    fn table_fixture(region: &str) -> IndexTable {
        let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();

        IndexTable {
            region: region.to_string(),
            dates: start.iter_days().take(3).collect(),
            value: vec![27.0, 27.5, f64::NAN],
            anomaly: vec![0.5, 1.0, f64::NAN],
            low_pass: vec![0.6, 0.7, 0.8],
            high_pass: vec![-0.1, 0.3, 0.2],
        }
    }

    #[test]
    fn should_save_index_table() {
        let table = table_fixture("3.4");
        let temp_file = NamedTempFile::new().unwrap();

        save_index(&[table], temp_file.path()).unwrap();

        let file = File::open(temp_file.path()).unwrap();
        let mut reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let batch = reader.next().unwrap().unwrap();
        let regions = batch.column(0).as_any().downcast_ref::<StringArray>().unwrap();

        assert_eq!(batch.num_rows(), 3);
        assert_eq!(regions.value(2), "3.4");
        assert_eq!(batch.column(2).null_count(), 1);
        assert_eq!(batch.column(4).null_count(), 0);
    }

    #[test]
    fn should_reject_ragged_columns() {
        let mut table = table_fixture("4");
        table.high_pass.pop();
        let temp_file = NamedTempFile::new().unwrap();

        let err = save_index(&[table_fixture("3.4"), table], temp_file.path()).unwrap_err();

        assert!(err.to_string().contains("region 4 differ in length"));
    }

    #[test]
    fn should_stack_regions_in_one_file() {
        let tables = [table_fixture("IOD_West"), table_fixture("IOD_East")];
        let temp_file = NamedTempFile::new().unwrap();

        save_index(&tables, temp_file.path()).unwrap();

        let file = File::open(temp_file.path()).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let mut regions = Vec::new();
        for batch in reader {
            let batch = batch.unwrap();
            let column = batch.column(0).as_any().downcast_ref::<StringArray>().unwrap();
            regions.extend((0..column.len()).map(|i| column.value(i).to_string()));
        }

        assert_eq!(regions.len(), 6);
        assert_eq!(regions[0], "IOD_West");
        assert_eq!(regions[5], "IOD_East");
    }
}
