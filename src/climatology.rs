//! Day-of-year climatology (mean and standard deviation) over a reference period.

use chrono::NaiveDate;
use tracing::debug;

use crate::{
    calendar::{ordinal_day, LeapDayPolicy, NormalizedDay, DAYS_IN_CYCLE},
    error::{Error, Result},
    harmonic::HarmonicBasis,
    series::TimeSeries,
};

/// Inclusive date range a climatology is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferencePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReferencePeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidPeriod { start, end });
        }

        Ok(ReferencePeriod { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayStats {
    pub mean: f64,
    /// Sample standard deviation (N - 1 denominator); NaN below two values.
    pub std: f64,
    pub count: usize,
}

impl DayStats {
    const MISSING: DayStats = DayStats {
        mean: f64::NAN,
        std: f64::NAN,
        count: 0,
    };

    fn from_values(values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return DayStats::MISSING;
        }

        let mean = values.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        DayStats { mean, std, count }
    }

    pub fn is_missing(&self) -> bool {
        self.count == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Climatology {
    period: ReferencePeriod,
    days: Vec<DayStats>,
}

impl Climatology {
    /// Groups values dated inside `period` by ordinal day.
    pub fn from_normalized(days: &[NormalizedDay], period: ReferencePeriod) -> Self {
        let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); DAYS_IN_CYCLE];

        for day in days.iter().filter(|d| period.contains(d.date())) {
            buckets[day.slot()].push(day.value());
        }

        let days: Vec<DayStats> = buckets.iter().map(|b| DayStats::from_values(b)).collect();

        let climatology = Climatology { period, days };
        debug!(
            start = %period.start,
            end = %period.end,
            missing = climatology.missing_days().len(),
            "Computed climatology"
        );

        climatology
    }

    pub fn compute(series: &TimeSeries, period: ReferencePeriod, policy: LeapDayPolicy) -> Self {
        let within = series.between(period.start, period.end);

        Climatology::from_normalized(&within.normalize(policy), period)
    }

    pub fn period(&self) -> ReferencePeriod {
        self.period
    }

    /// Stats for `ordinal` in `1..=365`.
    pub fn get(&self, ordinal: u16) -> Option<&DayStats> {
        self.days.get((ordinal as usize).checked_sub(1)?)
    }

    pub fn days(&self) -> &[DayStats] {
        &self.days
    }

    pub fn mean(&self) -> Vec<f64> {
        self.days.iter().map(|d| d.mean).collect()
    }

    pub fn std(&self) -> Vec<f64> {
        self.days.iter().map(|d| d.std).collect()
    }

    /// Ordinal days with no data in the reference period.
    pub fn missing_days(&self) -> Vec<u16> {
        self.days
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_missing())
            .map(|(i, _)| (i + 1) as u16)
            .collect()
    }

    /// Observed value minus the climatological mean of its ordinal day.
    ///
    /// Dates without an ordinal under `policy` are left out.
    pub fn anomalies(&self, series: &TimeSeries, policy: LeapDayPolicy) -> Result<TimeSeries> {
        let mut dates = Vec::with_capacity(series.len());
        let mut values = Vec::with_capacity(series.len());

        for (date, value) in series.iter() {
            if let Some(ordinal) = ordinal_day(*date, policy) {
                dates.push(*date);
                values.push(value - self.days[(ordinal - 1) as usize].mean);
            }
        }

        TimeSeries::new(dates, values)
    }

    /// Replaces mean and std with their fit on `basis`.
    ///
    /// A missing day leaves NaN in the input and so the whole smoothed
    /// curve comes out NaN.
    pub fn smoothed(&self, basis: &HarmonicBasis) -> Result<Climatology> {
        let mean = basis.fit(&self.mean())?.fitted;
        let std = basis.fit(&self.std())?.fitted;

        Ok(self.with_curves(mean, std))
    }

    /// Same period and counts with new mean and std curves.
    pub(crate) fn with_curves(&self, mean: Vec<f64>, std: Vec<f64>) -> Climatology {
        let days = self
            .days
            .iter()
            .zip(mean.into_iter().zip(std))
            .map(|(d, (mean, std))| DayStats {
                mean,
                std,
                count: d.count,
            })
            .collect();

        Climatology {
            period: self.period,
            days,
        }
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use std::f64::consts::PI;

    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, SeedableRng};
    use rand_distr::{Distribution, Normal};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn should_reject_inverted_period() {
        let r = ReferencePeriod::new(date(2021, 1, 1), date(2020, 1, 1));

        assert!(matches!(r, Err(Error::InvalidPeriod { .. })));
    }

    #[test]
    fn should_use_single_value_per_day() {
        let values: Vec<f64> = (0..365).map(|i| i as f64 * 0.1).collect();
        let series = TimeSeries::daily(date(2021, 1, 1), values.clone());
        let period = ReferencePeriod::new(date(2021, 1, 1), date(2021, 12, 31)).unwrap();

        let clim = Climatology::compute(&series, period, LeapDayPolicy::Drop);

        assert!(clim.missing_days().is_empty());
        for (i, stats) in clim.days().iter().enumerate() {
            assert_eq!(stats.mean, values[i]);
            assert_eq!(stats.count, 1);
            assert!(stats.std.is_nan());
        }
    }

    #[test]
    fn should_compute_sample_std_across_years() {
        // 2019 is all 1.0, 2020 (leap) all 3.0, 2021 all 5.0.
        let mut dates = Vec::new();
        let mut values = Vec::new();
        for (year, value) in [(2019, 1.0), (2020, 3.0), (2021, 5.0)] {
            for day in date(year, 1, 1).iter_days().take_while(|d| *d <= date(year, 12, 31)) {
                dates.push(day);
                values.push(value);
            }
        }
        let series = TimeSeries::new(dates, values).unwrap();
        let period = ReferencePeriod::new(date(2019, 1, 1), date(2021, 12, 31)).unwrap();

        let clim = Climatology::compute(&series, period, LeapDayPolicy::Drop);

        for stats in clim.days() {
            assert_eq!(stats.count, 3);
            assert_abs_diff_eq!(stats.mean, 3.0, epsilon = 1e-12);
            assert_abs_diff_eq!(stats.std, 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn should_flag_missing_days() {
        let series = TimeSeries::daily(date(2021, 1, 1), vec![1.0; 10]);
        let period = ReferencePeriod::new(date(2021, 1, 1), date(2021, 12, 31)).unwrap();

        let clim = Climatology::compute(&series, period, LeapDayPolicy::Drop);

        assert_eq!(clim.missing_days().len(), 355);
        assert_eq!(clim.missing_days()[0], 11);
        assert!(clim.get(11).unwrap().is_missing());
        assert!(clim.get(11).unwrap().mean.is_nan());
        assert!(clim.get(0).is_none());
        assert!(clim.get(366).is_none());
    }

    #[test]
    fn should_ignore_values_outside_period() {
        let series = TimeSeries::daily(date(2020, 12, 31), vec![100.0, 1.0]);
        let period = ReferencePeriod::new(date(2021, 1, 1), date(2021, 12, 31)).unwrap();

        let clim = Climatology::compute(&series, period, LeapDayPolicy::Drop);

        assert_eq!(clim.get(1).unwrap().mean, 1.0);
        assert!(clim.get(365).unwrap().is_missing());
    }

    #[test]
    fn should_fold_leap_day_into_feb_28() {
        let series = TimeSeries::daily(date(2024, 2, 28), vec![1.0, 2.0, 3.0]);
        let period = ReferencePeriod::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();

        let folded = Climatology::compute(&series, period, LeapDayPolicy::FoldIntoFeb28);
        let dropped = Climatology::compute(&series, period, LeapDayPolicy::Drop);

        assert_eq!(folded.get(59).unwrap().count, 2);
        assert_eq!(folded.get(59).unwrap().mean, 1.5);
        assert_eq!(dropped.get(59).unwrap().count, 1);
        assert_eq!(dropped.get(60).unwrap().mean, 3.0);
    }

    #[test]
    fn should_bucket_every_normalized_day_of_a_leap_year() {
        let start = date(2020, 1, 1);
        let values = vec![1.0; 366];
        let series = TimeSeries::daily(start, values);
        let period = ReferencePeriod::new(start, date(2020, 12, 31)).unwrap();
        let days = series.normalize(LeapDayPolicy::FoldIntoFeb28);

        let clim = Climatology::from_normalized(&days, period);

        assert_eq!(days.len(), 366);
        assert!(days.iter().all(|d| (1..=365).contains(&d.ordinal())));
        assert_eq!(clim.days().iter().map(|d| d.count).sum::<usize>(), 366);
        assert_eq!(clim.get(59).unwrap().count, 2);
        assert_eq!(clim.get(365).unwrap().count, 1);
    }

    #[test]
    fn should_compute_anomalies() {
        let series = TimeSeries::daily(date(2021, 1, 1), vec![2.0, 4.0]);
        let period = ReferencePeriod::new(date(2021, 1, 1), date(2021, 1, 2)).unwrap();
        let clim = Climatology::compute(&series, period, LeapDayPolicy::Drop);
        let observed = TimeSeries::daily(date(2022, 1, 1), vec![3.0, 3.0]);

        let anomalies = clim.anomalies(&observed, LeapDayPolicy::Drop).unwrap();

        assert_eq!(anomalies.values(), &[1.0, -1.0]);
        assert_eq!(anomalies.dates()[0], date(2022, 1, 1));
    }

    #[test]
    fn should_recover_seasonal_cycle_from_noisy_years() {
        let amplitude = 2.0;
        let peak_day = 220.0;
        let noise = Normal::new(0.0, 0.5).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let start = date(2001, 1, 1);
        let end = date(2003, 12, 31);
        let mut dates = Vec::new();
        let mut values = Vec::new();
        for day in start.iter_days().take_while(|d| *d <= end) {
            let ordinal = ordinal_day(day, LeapDayPolicy::Drop).unwrap() as f64;
            let seasonal = amplitude * (2.0 * PI * (ordinal - peak_day) / 365.0).cos();
            dates.push(day);
            values.push(18.0 + seasonal + noise.sample(&mut rng));
        }
        let series = TimeSeries::new(dates, values).unwrap();
        let period = ReferencePeriod::new(start, end).unwrap();

        let clim = Climatology::compute(&series, period, LeapDayPolicy::Drop);
        let basis = HarmonicBasis::new(DAYS_IN_CYCLE, 4).unwrap();
        let fit = basis.fit(&clim.mean()).unwrap();

        let recovered_amplitude = fit.amplitude(1).unwrap();
        let recovered_peak = fit.phase(1).unwrap() / (2.0 * PI) * 365.0;
        assert!((recovered_amplitude - amplitude).abs() / amplitude < 0.05);
        assert!((recovered_peak - peak_day).abs() < 3.0, "peak at {}", recovered_peak);
        assert_abs_diff_eq!(fit.mean(), 18.0, epsilon = 0.1);

        let smoothed = clim.smoothed(&basis).unwrap();
        assert_eq!(smoothed.get(1).unwrap().count, 3);
        assert_abs_diff_eq!(smoothed.get(220).unwrap().mean, 20.0, epsilon = 0.2);
    }
}
