//! Spread backtest transform and treasury reconciliation.
//!
//! The spread diverts `p`% of every balance series into a reserve token. The
//! reserve receives a constant injection equal to `p`% of the total balance
//! on the first day; it does not compound with later price moves.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use treasury_core::error::{TreasuryError, TreasuryResult};
use treasury_core::types::{BalanceTable, Date, DateRange, Erc20, TimeSeries, TokenAddress, Treasury};

/// The reserve token receiving the diverted percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadToken {
    /// Token name.
    pub name: String,
    /// Ticker symbol, the balance table key.
    pub symbol: String,
    /// Contract address.
    pub address: TokenAddress,
}

impl SpreadToken {
    /// Create a new spread token.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, address: impl Into<TokenAddress>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            address: address.into(),
        }
    }
}

/// Checks that `p` is a percentage in `[0, 100]`.
pub fn validate_spread_percentage(p: f64) -> TreasuryResult<f64> {
    if (0.0..=100.0).contains(&p) {
        Ok(p)
    } else {
        Err(TreasuryError::InvalidSpreadPercentage { value: p })
    }
}

/// Scales every series by `(100 - p) / 100`.
pub fn resize_balances(balances: &BalanceTable, spread_percentage: f64) -> TreasuryResult<BalanceTable> {
    let p = validate_spread_percentage(spread_percentage)?;
    let factor = (100.0 - p) / 100.0;
    Ok(balances
        .iter()
        .map(|(symbol, series)| (symbol.clone(), series.scale(factor)))
        .collect())
}

/// Applies the spread transform.
///
/// Every series is downsized by `p`%; the reserve series `spread_symbol`
/// gains a constant `p`% of the starting total over `range`. The total on
/// `range.start()` is preserved.
pub fn apply_spread(
    balances: BalanceTable,
    spread_symbol: &str,
    spread_percentage: f64,
    range: &DateRange,
) -> TreasuryResult<BalanceTable> {
    let p = validate_spread_percentage(spread_percentage)?;
    let initial_total = balances.total_at(range.start());

    let mut resized = resize_balances(&balances, p)?;
    let injection = TimeSeries::constant(range, initial_total * p / 100.0);
    let reserve = match resized.get(spread_symbol) {
        Some(existing) => existing.add_outer(&injection),
        None => injection,
    };
    debug!(
        spread_symbol,
        spread_percentage = p,
        initial_total,
        existing = balances.contains(spread_symbol),
        "applied spread"
    );
    resized.insert(spread_symbol, reserve);
    Ok(resized)
}

/// Writes end-of-window balances back onto the treasury.
///
/// Every asset's balance becomes its series value at `end`, 0 if that day is
/// absent. The reserve token is appended when the treasury does not hold it.
pub fn reconcile(
    mut treasury: Treasury,
    balances: &BalanceTable,
    end: Date,
    spread_token: &SpreadToken,
) -> TreasuryResult<Treasury> {
    let mut seen = BTreeSet::new();
    for asset in &mut treasury.assets {
        if !seen.insert(asset.symbol.clone()) {
            return Err(TreasuryError::DuplicateSymbol {
                symbol: asset.symbol.clone(),
            });
        }
        let series = balances
            .get(&asset.symbol)
            .ok_or_else(|| TreasuryError::missing_balance(&asset.symbol))?;
        asset.balance = series.value_at(end).unwrap_or(0.0);
    }

    if !treasury.find_asset(&spread_token.symbol).is_found() {
        let series = balances
            .get(&spread_token.symbol)
            .ok_or_else(|| TreasuryError::missing_reserve_token(&spread_token.symbol))?;
        let balance = series.value_at(end).unwrap_or(0.0);
        debug!(symbol = %spread_token.symbol, balance, "appending reserve token");
        treasury.assets.push(Erc20::new(
            spread_token.name.clone(),
            spread_token.symbol.clone(),
            spread_token.address.clone(),
            balance,
        ));
    }

    Ok(treasury)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use treasury_core::types::AssetLookup;

    fn date(day: u32) -> Date {
        Date::from_ymd(2022, 1, day).unwrap()
    }

    fn range() -> DateRange {
        DateRange::new(date(1), date(3)).unwrap()
    }

    fn usdr() -> SpreadToken {
        SpreadToken::new("Real USD", "USDR", "0xUSDR")
    }

    fn balances() -> BalanceTable {
        let mut balances = BalanceTable::new();
        balances.insert("A", TimeSeries::constant(&range(), 10.0));
        balances.insert("B", TimeSeries::constant(&range(), 10.0));
        balances
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(validate_spread_percentage(0.0).is_ok());
        assert!(validate_spread_percentage(100.0).is_ok());
        assert_eq!(
            validate_spread_percentage(100.5),
            Err(TreasuryError::InvalidSpreadPercentage { value: 100.5 })
        );
        assert!(validate_spread_percentage(-1.0).is_err());
        assert!(validate_spread_percentage(f64::NAN).is_err());
    }

    #[test]
    fn test_resize() {
        let resized = resize_balances(&balances(), 25.0).unwrap();
        assert_relative_eq!(resized.get("A").unwrap().value_at(date(2)).unwrap(), 7.5);
    }

    #[test]
    fn test_apply_spread_new_reserve() {
        let spread = apply_spread(balances(), "USDR", 20.0, &range()).unwrap();
        assert_eq!(spread.len(), 3);
        assert_relative_eq!(spread.get("A").unwrap().value_at(date(1)).unwrap(), 8.0);
        let reserve = spread.get("USDR").unwrap();
        assert_eq!(reserve.len(), 3);
        assert!(reserve.values().all(|v| (v - 4.0).abs() < 1e-12));
        assert_relative_eq!(spread.total_at(date(1)), 20.0);
    }

    #[test]
    fn test_apply_spread_existing_reserve() {
        let mut table = balances();
        table.insert("USDR", TimeSeries::from_points([(date(2), 10.0)]));
        let spread = apply_spread(table, "USDR", 50.0, &range()).unwrap();

        let reserve = spread.get("USDR").unwrap();
        // 50% of the starting total 20, plus half of the held 10 on day 2
        assert_relative_eq!(reserve.value_at(date(1)).unwrap(), 10.0);
        assert_relative_eq!(reserve.value_at(date(2)).unwrap(), 15.0);
        assert_relative_eq!(reserve.value_at(date(3)).unwrap(), 10.0);
    }

    #[test]
    fn test_apply_spread_zero_percent_adds_zero_reserve() {
        let spread = apply_spread(balances(), "USDR", 0.0, &range()).unwrap();
        assert_eq!(spread.get("A"), balances().get("A"));
        assert!(spread.get("USDR").unwrap().values().all(|v| v == 0.0));
    }

    #[test]
    fn test_apply_spread_on_empty_table() {
        let spread = apply_spread(BalanceTable::new(), "USDR", 20.0, &range()).unwrap();
        assert_eq!(spread.len(), 1);
        assert!(spread.get("USDR").unwrap().values().all(|v| v == 0.0));
    }

    #[test]
    fn test_apply_spread_rejects_bad_percentage() {
        assert!(apply_spread(balances(), "USDR", 120.0, &range()).is_err());
    }

    #[test]
    fn test_reconcile_appends_reserve() {
        let treasury = Treasury::new(
            "0xtreasury",
            vec![Erc20::new("A", "A", "0xa", 10.0), Erc20::new("B", "B", "0xb", 5.0)],
            vec![],
        );
        let spread = apply_spread(balances(), "USDR", 20.0, &range()).unwrap();
        let treasury = reconcile(treasury, &spread, date(3), &usdr()).unwrap();

        assert_eq!(treasury.num_assets(), 3);
        assert_relative_eq!(treasury.assets[0].balance, 8.0);
        match treasury.find_asset("USDR") {
            AssetLookup::Found(reserve) => {
                assert_relative_eq!(reserve.balance, 4.0);
                assert_eq!(reserve.address.as_str(), "0xusdr");
            }
            AssetLookup::NotFound => panic!("reserve token not appended"),
        }
    }

    #[test]
    fn test_reconcile_updates_held_reserve_in_place() {
        let treasury = Treasury::new("0xtreasury", vec![Erc20::new("Real USD", "USDR", "0xusdr", 1.0)], vec![]);
        let mut table = BalanceTable::new();
        table.insert("USDR", TimeSeries::constant(&range(), 3.0));
        let treasury = reconcile(treasury, &table, date(3), &usdr()).unwrap();
        assert_eq!(treasury.num_assets(), 1);
        assert_relative_eq!(treasury.assets[0].balance, 3.0);
    }

    #[test]
    fn test_reconcile_absent_end_date_is_zero() {
        let treasury = Treasury::new("0xtreasury", vec![Erc20::new("A", "A", "0xa", 10.0)], vec![]);
        let mut table = BalanceTable::new();
        table.insert("A", TimeSeries::from_points([(date(1), 7.0)]));
        table.insert("USDR", TimeSeries::from_points([(date(1), 1.0)]));
        let treasury = reconcile(treasury, &table, date(3), &usdr()).unwrap();
        assert_eq!(treasury.assets[0].balance, 0.0);
        assert_eq!(treasury.assets[1].balance, 0.0);
    }

    #[test]
    fn test_reconcile_missing_reserve_series() {
        let treasury = Treasury::new("0xtreasury", vec![Erc20::new("A", "A", "0xa", 10.0)], vec![]);
        let mut table = BalanceTable::new();
        table.insert("A", TimeSeries::constant(&range(), 10.0));
        let err = reconcile(treasury, &table, date(3), &usdr()).unwrap_err();
        assert_eq!(err, TreasuryError::missing_reserve_token("USDR"));
    }

    #[test]
    fn test_reconcile_missing_asset_series() {
        let treasury = Treasury::new("0xtreasury", vec![Erc20::new("C", "C", "0xc", 1.0)], vec![]);
        let err = reconcile(treasury, &balances(), date(3), &usdr()).unwrap_err();
        assert_eq!(err, TreasuryError::missing_balance("C"));
    }

    #[test]
    fn test_reconcile_rejects_duplicate_symbols() {
        let treasury = Treasury::new(
            "0xtreasury",
            vec![Erc20::new("A", "A", "0xa", 1.0), Erc20::new("A2", "A", "0xa2", 1.0)],
            vec![],
        );
        let err = reconcile(treasury, &balances(), date(3), &usdr()).unwrap_err();
        assert!(matches!(err, TreasuryError::DuplicateSymbol { .. }));
    }
}
