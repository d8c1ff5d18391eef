//! Download NOAA OISST v2 daily sea-surface temperature and derive
//! day-of-year climatologies, harmonic fits and regional indices from it.

pub mod calendar;
pub mod cli;
pub mod climatology;
pub mod domain;
pub mod download;
pub mod error;
pub mod grid;
pub mod harmonic;
pub mod parquet;
pub mod series;
pub mod spectral;

pub use calendar::{ordinal_day, LeapDayPolicy, NormalizedDay, DAYS_IN_CYCLE};
pub use climatology::{Climatology, DayStats, ReferencePeriod};
pub use error::{Error, Result};
pub use harmonic::{fit_harmonics, HarmonicBasis, HarmonicFit};
pub use series::TimeSeries;
pub use spectral::{dominant_period, harmonic_smoother, power_spectrum, SpectralDecomposition};
