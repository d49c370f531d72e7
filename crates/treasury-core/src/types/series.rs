//! Date-indexed series.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::date::{Date, DateRange};

/// Ordered map from [`Date`] to a real value.
///
/// Unlike a dataframe column there is no implicit alignment: series are put
/// on a common axis with [`TimeSeries::reindex_ffill`], and combined with
/// [`TimeSeries::add_outer`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSeries {
    points: BTreeMap<Date, f64>,
}

impl TimeSeries {
    /// Creates an empty series.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from `(date, value)` pairs. Later duplicates win.
    pub fn from_points(points: impl IntoIterator<Item = (Date, f64)>) -> Self {
        Self {
            points: points.into_iter().collect(),
        }
    }

    /// Series holding `value` on every day of `range`.
    #[must_use]
    pub fn constant(range: &DateRange, value: f64) -> Self {
        Self::from_points(range.days().map(|d| (d, value)))
    }

    /// Zero-valued series over `range`.
    #[must_use]
    pub fn zeros(range: &DateRange) -> Self {
        Self::constant(range, 0.0)
    }

    /// Sets the value at `date`.
    pub fn insert(&mut self, date: Date, value: f64) {
        self.points.insert(date, value);
    }

    /// Exact lookup; no fill is applied.
    #[must_use]
    pub fn value_at(&self, date: Date) -> Option<f64> {
        self.points.get(&date).copied()
    }

    /// Last observation at or before `date`.
    #[must_use]
    pub fn value_asof(&self, date: Date) -> Option<f64> {
        self.points.range(..=date).next_back().map(|(_, v)| *v)
    }

    /// Puts the series on `range`, carrying the last known value forward.
    ///
    /// Observations before `range.start()` seed the carry. Days with no prior
    /// observation are zero.
    #[must_use]
    pub fn reindex_ffill(&self, range: &DateRange) -> Self {
        let mut last = self.value_asof(range.start()).unwrap_or(0.0);
        let points = range
            .days()
            .map(|day| {
                if let Some(v) = self.value_at(day) {
                    last = v;
                }
                (day, last)
            })
            .collect();
        Self { points }
    }

    /// Multiplies every value by `factor`.
    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            points: self.points.iter().map(|(d, v)| (*d, v * factor)).collect(),
        }
    }

    /// Pointwise sum over the union of both indexes; a missing side counts as zero.
    #[must_use]
    pub fn add_outer(&self, other: &TimeSeries) -> Self {
        let mut points = self.points.clone();
        for (date, value) in &other.points {
            *points.entry(*date).or_insert(0.0) += value;
        }
        Self { points }
    }

    /// First `(date, value)` pair.
    #[must_use]
    pub fn first(&self) -> Option<(Date, f64)> {
        self.points.iter().next().map(|(d, v)| (*d, *v))
    }

    /// Last `(date, value)` pair.
    #[must_use]
    pub fn last(&self) -> Option<(Date, f64)> {
        self.points.iter().next_back().map(|(d, v)| (*d, *v))
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the series holds no observation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates observations in date order.
    pub fn iter(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }

    /// Values in date order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.values().copied()
    }
}

impl FromIterator<(Date, f64)> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = (Date, f64)>>(iter: I) -> Self {
        Self::from_points(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    #[test]
    fn test_reindex_fills_gaps_forward() {
        let series = TimeSeries::from_points([(d("2024-01-01"), 1.0), (d("2024-01-04"), 4.0)]);
        let range = DateRange::parse("2024-01-01", "2024-01-05").unwrap();

        let aligned = series.reindex_ffill(&range);
        let values: Vec<f64> = aligned.values().collect();
        assert_eq!(values, vec![1.0, 1.0, 1.0, 4.0, 4.0]);
    }

    #[test]
    fn test_reindex_zero_before_first_observation() {
        let series = TimeSeries::from_points([(d("2024-01-03"), 7.0)]);
        let range = DateRange::parse("2024-01-01", "2024-01-04").unwrap();

        let values: Vec<f64> = series.reindex_ffill(&range).values().collect();
        assert_eq!(values, vec![0.0, 0.0, 7.0, 7.0]);
    }

    #[test]
    fn test_reindex_carries_value_from_before_window() {
        let series = TimeSeries::from_points([(d("2023-12-20"), 3.0), (d("2024-02-01"), 9.0)]);
        let range = DateRange::parse("2024-01-01", "2024-01-02").unwrap();

        let aligned = series.reindex_ffill(&range);
        assert_eq!(aligned.value_at(d("2024-01-01")), Some(3.0));
        assert_eq!(aligned.value_at(d("2024-01-02")), Some(3.0));
        // Observations outside the axis are dropped
        assert_eq!(aligned.len(), 2);
    }

    #[test]
    fn test_add_outer_union() {
        let a = TimeSeries::from_points([(d("2024-01-01"), 1.0), (d("2024-01-02"), 2.0)]);
        let b = TimeSeries::from_points([(d("2024-01-02"), 10.0), (d("2024-01-03"), 20.0)]);

        let sum = a.add_outer(&b);
        assert_eq!(sum.len(), 3);
        assert_relative_eq!(sum.value_at(d("2024-01-01")).unwrap(), 1.0);
        assert_relative_eq!(sum.value_at(d("2024-01-02")).unwrap(), 12.0);
        assert_relative_eq!(sum.value_at(d("2024-01-03")).unwrap(), 20.0);
    }

    #[test]
    fn test_constant_and_scale() {
        let range = DateRange::parse("2024-01-01", "2024-01-03").unwrap();
        let series = TimeSeries::constant(&range, 5.0).scale(0.8);
        assert!(series.values().all(|v| (v - 4.0).abs() < 1e-12));
        assert_eq!(series.first().unwrap().0, range.start());
        assert_eq!(series.last().unwrap().0, range.end());
    }

    #[test]
    fn test_value_at_is_exact() {
        let series = TimeSeries::from_points([(d("2024-01-01"), 1.0)]);
        assert_eq!(series.value_at(d("2024-01-02")), None);
        assert_eq!(series.value_asof(d("2024-01-02")), Some(1.0));
    }
}
