//! Property-based tests for series alignment and arithmetic.

use approx::assert_relative_eq;
use proptest::prelude::*;

use treasury_core::types::{Date, DateRange, TimeSeries};

fn day(offset: i64) -> Date {
    Date::from_ymd(2022, 1, 1).unwrap().add_days(offset)
}

/// Sparse series scattered over roughly two months, some points before the axis.
fn series_strategy() -> impl Strategy<Value = TimeSeries> {
    prop::collection::vec((-10i64..60, -1e6f64..1e6), 0..25)
        .prop_map(|points| points.into_iter().map(|(offset, v)| (day(offset), v)).collect())
}

fn range_strategy() -> impl Strategy<Value = DateRange> {
    (0i64..30, 0i64..30).prop_map(|(start, len)| DateRange::new(day(start), day(start + len)).unwrap())
}

// =============================================================================
// FORWARD FILL
// =============================================================================

proptest! {
    #[test]
    fn property_reindex_covers_every_day(series in series_strategy(), range in range_strategy()) {
        let aligned = series.reindex_ffill(&range);

        prop_assert_eq!(aligned.len(), range.len());
        prop_assert_eq!(aligned.first().map(|(d, _)| d), Some(range.start()));
        prop_assert_eq!(aligned.last().map(|(d, _)| d), Some(range.end()));
    }

    #[test]
    fn property_reindex_carries_last_observation(series in series_strategy(), range in range_strategy()) {
        let aligned = series.reindex_ffill(&range);

        for d in range.days() {
            let expected = series.value_asof(d).unwrap_or(0.0);
            prop_assert_eq!(aligned.value_at(d), Some(expected));
        }
    }

    #[test]
    fn property_reindex_is_idempotent(series in series_strategy(), range in range_strategy()) {
        let once = series.reindex_ffill(&range);
        let twice = once.reindex_ffill(&range);
        prop_assert_eq!(once, twice);
    }
}

// =============================================================================
// OUTER-JOIN SUM
// =============================================================================

proptest! {
    #[test]
    fn property_add_outer_is_pointwise_over_union(a in series_strategy(), b in series_strategy()) {
        let sum = a.add_outer(&b);

        let union = a.iter().chain(b.iter()).map(|(d, _)| d).collect::<std::collections::BTreeSet<_>>();
        prop_assert_eq!(sum.len(), union.len());
        for d in union {
            let expected = a.value_at(d).unwrap_or(0.0) + b.value_at(d).unwrap_or(0.0);
            prop_assert_eq!(sum.value_at(d), Some(expected));
        }
    }

    #[test]
    fn property_add_outer_commutes(a in series_strategy(), b in series_strategy()) {
        prop_assert_eq!(a.add_outer(&b), b.add_outer(&a));
    }

    #[test]
    fn property_empty_series_is_identity(a in series_strategy()) {
        prop_assert_eq!(a.add_outer(&TimeSeries::new()), a.clone());
        prop_assert_eq!(TimeSeries::new().add_outer(&a), a);
    }

    #[test]
    fn property_add_outer_preserves_total(a in series_strategy(), b in series_strategy()) {
        let total: f64 = a.add_outer(&b).values().sum();
        let expected: f64 = a.values().sum::<f64>() + b.values().sum::<f64>();
        assert_relative_eq!(total, expected, epsilon = 1e-6, max_relative = 1e-9);
    }
}
