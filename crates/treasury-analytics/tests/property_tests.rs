//! Property-based tests for analytics invariants.
//!
//! These tests verify key properties that should always hold:
//! - The whitelist filter is idempotent
//! - The spread preserves the total balance on the first day
//! - Spread boundaries at 0% and 100%
//! - Risk contributions sum to portfolio volatility
//! - Zero-variance windows attribute zero risk

use proptest::prelude::*;
use treasury_analytics::prelude::*;
use treasury_core::prelude::*;
use treasury_traits::{RawBalancePoint, RawHolding, RawPortfolioItem, Whitelist};

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

/// Simple deterministic hash for reproducible pseudo-random values.
fn simple_hash(seed: u64, index: u64) -> u64 {
    let mut h = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(index);
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h
}

fn window(days: i64) -> DateRange {
    let start = Date::from_ymd(2022, 1, 1).unwrap();
    DateRange::new(start, start.add_days(days - 1)).unwrap()
}

/// Generates a treasury of `n` tokens with random-walk prices over `range`.
fn generate_treasury(n: usize, seed: u64, range: &DateRange) -> (Treasury, PriceTable) {
    let mut assets = Vec::with_capacity(n);
    let mut prices = PriceTable::new();

    for i in 0..n {
        let hash = simple_hash(seed, i as u64);
        let symbol = format!("T{i}");
        let address = format!("0x{i:040x}");
        let quantity = 1.0 + (hash % 10_000) as f64 / 10.0;

        let mut price = 0.5 + (hash % 500) as f64 / 100.0;
        let series: TimeSeries = range
            .days()
            .enumerate()
            .map(|(t, day)| {
                let step = simple_hash(hash, t as u64) % 200;
                price *= 1.0 + (step as f64 - 100.0) / 2_000.0; // +-5% per day
                (day, price)
            })
            .collect();

        prices.insert(TokenKey::new(symbol.as_str(), address.as_str()), series);
        assets.push(Erc20::new(format!("Token {i}"), symbol, address, quantity));
    }

    (Treasury::new("0xtreasury", assets, vec![]), prices)
}

fn raw_item(i: usize, seed: u64) -> RawPortfolioItem {
    let hash = simple_hash(seed, i as u64);
    let quote = match hash % 4 {
        0 => None,
        1 => Some(0.0),
        _ => Some((hash % 1_000) as f64 + 1.0),
    };
    RawPortfolioItem {
        contract_address: format!("0x{:x}", hash % 8),
        contract_name: Some(format!("Token {i}")),
        contract_ticker_symbol: Some(format!("T{}", hash % 6)),
        contract_decimals: Some(6),
        holdings: vec![RawHolding {
            timestamp: "2022-01-03T00:00:00Z".to_string(),
            quote_rate: Some(1.0),
            close: Some(RawBalancePoint {
                balance: Some(format!("{}", hash % 1_000_000_000)),
                quote,
            }),
        }],
    }
}

/// Renders retained assets back into raw items so they can be filtered again.
fn to_raw(assets: &[Erc20]) -> Vec<RawPortfolioItem> {
    assets
        .iter()
        .map(|a| RawPortfolioItem {
            contract_address: a.address.to_string(),
            contract_name: Some(a.name.clone()),
            contract_ticker_symbol: Some(a.symbol.clone()),
            contract_decimals: None,
            holdings: vec![RawHolding {
                timestamp: "2022-01-03T00:00:00Z".to_string(),
                quote_rate: Some(1.0),
                close: Some(RawBalancePoint {
                    balance: None,
                    quote: Some(a.balance.max(1.0)),
                }),
            }],
        })
        .collect()
}

// =============================================================================
// WHITELIST PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn property_whitelist_filter_idempotent(seed in any::<u64>(), n in 0usize..40) {
        let items: Vec<RawPortfolioItem> = (0..n).map(|i| raw_item(i, seed)).collect();
        let whitelist: Whitelist = (0..8u64).filter(|a| a % 3 != 0).map(|a| format!("0x{a:x}")).collect();

        let once = filter_holdings(&items, &whitelist);
        let twice = filter_holdings(&to_raw(&once), &whitelist);

        let symbols = |assets: &[Erc20]| assets.iter().map(|a| a.symbol.clone()).collect::<Vec<_>>();
        prop_assert_eq!(symbols(&once), symbols(&twice));
    }

    #[test]
    fn property_retain_priced_assets_idempotent(seed in any::<u64>(), n in 1usize..12) {
        let range = window(5);
        let (treasury, prices) = generate_treasury(n, seed, &range);
        let keep: std::collections::BTreeSet<String> =
            prices.existing_token_symbols().into_iter().filter(|s| s.len() % 2 == 0 || s.ends_with('1')).collect();

        let once = retain_priced_assets(treasury, &keep);
        let twice = retain_priced_assets(once.clone(), &keep);
        prop_assert_eq!(once, twice);
    }
}

// =============================================================================
// SPREAD PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn property_spread_conserves_start_total(seed in any::<u64>(), n in 0usize..10, p in 0.0f64..=100.0) {
        let range = window(10);
        let (treasury, prices) = generate_treasury(n, seed, &range);
        let balances = build_balances(&treasury, &prices, &range);
        let before = balances.total_at(range.start());

        let spread = apply_spread(balances, "USDR", p, &range).unwrap();
        let after = spread.total_at(range.start());
        prop_assert!((before - after).abs() <= 1e-9 * before.abs().max(1.0));
    }

    #[test]
    fn property_spread_conserves_with_held_reserve(seed in any::<u64>(), n in 1usize..10, p in 0.0f64..=100.0) {
        let range = window(10);
        let (treasury, prices) = generate_treasury(n, seed, &range);
        let balances = build_balances(&treasury, &prices, &range);
        let before = balances.total_at(range.start());

        // the first generated token doubles as the reserve
        let spread = apply_spread(balances, "T0", p, &range).unwrap();
        prop_assert_eq!(spread.len(), n);
        let after = spread.total_at(range.start());
        prop_assert!((before - after).abs() <= 1e-9 * before.abs().max(1.0));
    }

    #[test]
    fn property_zero_spread_is_identity(seed in any::<u64>(), n in 0usize..10) {
        let range = window(7);
        let (treasury, prices) = generate_treasury(n, seed, &range);
        let balances = build_balances(&treasury, &prices, &range);

        let spread = apply_spread(balances.clone(), "USDR", 0.0, &range).unwrap();
        for (symbol, series) in balances.iter() {
            prop_assert_eq!(spread.get(symbol), Some(series));
        }
        prop_assert!(spread.get("USDR").unwrap().values().all(|v| v == 0.0));
    }

    #[test]
    fn property_full_spread_zeroes_other_tokens(seed in any::<u64>(), n in 0usize..10) {
        let range = window(7);
        let (treasury, prices) = generate_treasury(n, seed, &range);
        let balances = build_balances(&treasury, &prices, &range);
        let before = balances.total_at(range.start());

        let spread = apply_spread(balances, "USDR", 100.0, &range).unwrap();
        for (symbol, series) in spread.iter().filter(|(s, _)| s.as_str() != "USDR") {
            prop_assert!(series.values().all(|v| v == 0.0), "{} not zeroed", symbol);
        }
        let reserve = spread.get("USDR").unwrap();
        prop_assert!(reserve.values().all(|v| (v - before).abs() <= 1e-9 * before.max(1.0)));
    }

    #[test]
    fn property_out_of_range_percentage_rejected(p in prop_oneof![-1e6f64..-1e-9, 100.000_001f64..1e6]) {
        let range = window(3);
        let result = apply_spread(BalanceTable::new(), "USDR", p, &range);
        let rejected = matches!(result, Err(TreasuryError::InvalidSpreadPercentage { .. }));
        prop_assert!(rejected, "{} accepted", p);
    }
}

// =============================================================================
// RISK PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn property_risk_contributions_are_additive(seed in any::<u64>(), n in 1usize..12, days in 3i64..40) {
        let range = window(days);
        let (treasury, prices) = generate_treasury(n, seed, &range);
        let attribution = risk_attribution(&treasury, &prices, &range).unwrap();

        prop_assert_eq!(attribution.by_token.len(), n);
        if attribution.portfolio_volatility > 0.0 {
            let diff = (attribution.total_contribution() - attribution.portfolio_volatility).abs();
            prop_assert!(diff < 1e-10, "sum {} vs sigma {}", attribution.total_contribution(), attribution.portfolio_volatility);
        }
    }

    #[test]
    fn property_constant_prices_attribute_zero(seed in any::<u64>(), n in 0usize..12, days in 1i64..20) {
        let range = window(days);
        let (mut treasury, _) = generate_treasury(n, seed, &range);
        let prices: PriceTable = treasury
            .assets
            .iter()
            .map(|a| (a.key(), TimeSeries::constant(&range, 1.0 + a.balance)))
            .collect();
        for asset in &mut treasury.assets {
            asset.balance *= 2.0;
        }

        let treasury = attribute_risk(treasury, &prices, &range).unwrap();
        prop_assert!(treasury.assets.iter().all(|a| a.risk_contribution == Some(0.0)));
    }
}

#[test]
fn property_weights_sum_to_one() {
    let range = window(15);
    for seed in 0..20 {
        let (treasury, prices) = generate_treasury(8, seed, &range);
        let attribution = risk_attribution(&treasury, &prices, &range).unwrap();
        let total: f64 = attribution.by_token.iter().map(|c| c.weight).sum();
        assert!((total - 1.0).abs() < 1e-12, "seed {seed}: weights sum to {total}");
    }
}
