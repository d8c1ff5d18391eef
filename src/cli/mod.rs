//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    calendar::LeapDayPolicy,
    domain::{NamedDomain, RegionSet},
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a year of daily OISST v2 data
    Download {
        /// Defaults to the current UTC year
        #[arg(long)]
        year: Option<i32>,
        /// Defaults to the home directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Try the THREDDS server before the PSL file server
        #[arg(long)]
        try_thredds: bool,
        /// Seconds allowed for the THREDDS attempt
        #[arg(long, default_value_t = 20)]
        timeout_secs: u64,
    },
    /// Cut a named domain out of an SST grid
    Subset {
        /// Long-format parquet grid (date, lat, lon, sst)
        #[arg(long)]
        input: PathBuf,
        /// global, nz, tropical_pacific, ninos or iod
        #[arg(long)]
        domain: NamedDomain,
        /// Fill missing cells from the nearest cell with data, per date
        #[arg(long)]
        fill_nan: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Day-of-year climatology of every grid cell
    Climatology {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "1991-01-01")]
        start: NaiveDate,
        #[arg(long, default_value = "2020-12-31")]
        end: NaiveDate,
        /// Harmonics kept when smoothing mean and standard deviation
        #[arg(long, default_value_t = 4)]
        harmonics: usize,
        /// What to do with February 29: drop or fold
        #[arg(long, default_value = "drop")]
        leap_day: LeapDayPolicy,
        /// Fill missing cells from the nearest cell with data before averaging
        #[arg(long)]
        fill_nan: bool,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Regional SST index with anomalies and a low/high-pass split
    Index {
        #[arg(long)]
        input: PathBuf,
        /// nino1+2, nino3, nino4, nino3.4, oni, iod_west, iod_east,
        /// all-ninos or all-iod; repeat for several
        #[arg(long = "region", required = true)]
        regions: Vec<RegionSet>,
        #[arg(long, default_value = "1991-01-01")]
        start: NaiveDate,
        #[arg(long, default_value = "2020-12-31")]
        end: NaiveDate,
        /// Harmonics (including the mean) kept in the low-pass
        #[arg(long, default_value_t = 3)]
        cutoff: usize,
        #[arg(long, default_value = "drop")]
        leap_day: LeapDayPolicy,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    let bar = ProgressBar::new(size).with_message(message);
    if let Ok(style) = ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {msg}") {
        bar.set_style(style.progress_chars("##-"));
    }

    bar
}

// -- Tests -------------------------------------------------------------------
