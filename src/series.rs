//! Daily time series.

use chrono::NaiveDate;

use crate::{
    calendar::{self, LeapDayPolicy, NormalizedDay},
    error::{Error, Result},
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(Error::LengthMismatch {
                expected: dates.len(),
                actual: values.len(),
            });
        }

        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(Error::UnsortedDates {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }

        Ok(TimeSeries { dates, values })
    }

    /// Caller guarantees `dates` are strictly increasing and as long as `values`.
    pub(crate) fn from_sorted(dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        debug_assert_eq!(dates.len(), values.len());

        TimeSeries { dates, values }
    }

    /// Builds a series of consecutive days starting at `start`.
    pub fn daily(start: NaiveDate, values: Vec<f64>) -> Self {
        let dates = start.iter_days().take(values.len()).collect();

        TimeSeries { dates, values }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &f64)> {
        self.dates.iter().zip(self.values.iter())
    }

    /// Entries dated within `[start, end]`, both inclusive.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> TimeSeries {
        let (dates, values) = self
            .iter()
            .filter(|(date, _)| **date >= start && **date <= end)
            .map(|(date, value)| (*date, *value))
            .unzip();

        TimeSeries { dates, values }
    }

    pub fn normalize(&self, policy: LeapDayPolicy) -> Vec<NormalizedDay> {
        calendar::normalize(self.iter(), policy)
    }

    /// Reindexes onto every day between the first and last date and fills the
    /// holes: interior gaps (missing days or NaN) are interpolated linearly, a
    /// trailing gap is forward-filled, a leading gap stays NaN.
    pub fn fill_gaps(&self) -> TimeSeries {
        let (Some(first), Some(last)) = (self.dates.first(), self.dates.last()) else {
            return self.clone();
        };

        let span = (*last - *first).num_days() as usize + 1;
        let mut values = vec![f64::NAN; span];
        for (date, value) in self.iter() {
            values[(*date - *first).num_days() as usize] = *value;
        }

        let mut previous: Option<usize> = None;
        for i in 0..span {
            if values[i].is_nan() {
                continue;
            }
            if let Some(p) = previous {
                let gap = i - p;
                for j in (p + 1)..i {
                    let w = (j - p) as f64 / gap as f64;
                    values[j] = values[p] + w * (values[i] - values[p]);
                }
            }
            previous = Some(i);
        }

        if let Some(p) = previous {
            let fill = values[p];
            for value in values.iter_mut().skip(p + 1) {
                *value = fill;
            }
        }

        TimeSeries::daily(*first, values)
    }
}

// -- Tests -------------------------------------------------------------------
