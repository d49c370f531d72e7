//! Balance series construction.

use tracing::debug;

use treasury_core::types::{BalanceTable, DateRange, PriceTable, TimeSeries, TotalBalance, Treasury};

/// Builds one value series per asset: quantity × forward-filled price.
///
/// Assets without a price series get no entry.
#[must_use]
pub fn build_balances(treasury: &Treasury, prices: &PriceTable, range: &DateRange) -> BalanceTable {
    let mut balances = BalanceTable::new();
    for asset in &treasury.assets {
        match prices.get(&asset.key()) {
            Some(series) => {
                balances.insert(asset.symbol.clone(), series.reindex_ffill(range).scale(asset.balance));
            }
            None => debug!(symbol = %asset.symbol, address = %asset.address, "no price series for asset"),
        }
    }
    balances
}

/// Pointwise sum of every series in the table.
#[must_use]
pub fn total_balance(balances: &BalanceTable) -> TotalBalance {
    let total = balances
        .iter()
        .fold(TimeSeries::new(), |acc, (_, series)| acc.add_outer(series));
    TotalBalance::new(total)
}
