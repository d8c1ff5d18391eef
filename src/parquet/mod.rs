//! Handles serialising and saving data to disk in the _parquet_ file format.

pub mod climatology;
pub mod grid;
pub mod index;

use chrono::{Datelike, NaiveDate};
use parquet::{
    basic::{Compression, ZstdLevel},
    file::properties::WriterProperties,
};

pub use climatology::{save_climatology, CellClimatology};
pub use grid::{read_grid, save_grid};
pub use index::{save_index, IndexTable};

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const EPOCH_FROM_CE: i32 = 719_163;

/// Days since the Unix epoch, as stored in an arrow `Date32` column.
pub fn to_date32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_FROM_CE
}

/// `None` for a day count outside chrono's range.
pub fn from_date32(days: i32) -> Option<NaiveDate> {
    days.checked_add(EPOCH_FROM_CE).and_then(NaiveDate::from_num_days_from_ce_opt)
}

fn writer_properties() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::default()))
        .set_dictionary_enabled(true)
        .build()
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_convert_date32() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();

        assert_eq!(epoch.num_days_from_ce(), EPOCH_FROM_CE);
        assert_eq!(to_date32(epoch), 0);
        assert_eq!(to_date32(date), 19_782);
        assert_eq!(from_date32(19_782), Some(date));
    }

    #[test]
    fn should_reject_out_of_range_date32() {
        assert_eq!(from_date32(i32::MAX), None);
        assert_eq!(from_date32(i32::MIN), None);
    }
}
