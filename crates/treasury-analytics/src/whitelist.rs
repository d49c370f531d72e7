//! Whitelist filtering of raw portfolio holdings.
//!
//! A raw item becomes an [`Erc20`] asset only if it has a non-zero closing
//! quote, a whitelisted contract address and at least one holding. Dropped
//! items are logged at `debug` and never fail the request.

use std::collections::BTreeSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use treasury_core::types::{Erc20, HistoricalPrice, TokenAddress, Treasury};
use treasury_traits::{RawPortfolio, RawPortfolioItem, Whitelist};

/// Significant digits a [`Decimal`] mantissa can carry.
const MAX_MANTISSA_DIGITS: usize = 28;

/// Largest scale a [`Decimal`] supports.
const MAX_SCALE: usize = 28;

/// Why a raw item was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    NoHoldings,
    NoCloseQuote,
    NotWhitelisted,
}

fn rejection(item: &RawPortfolioItem, whitelist: &Whitelist) -> Option<Rejection> {
    if item.holdings.is_empty() {
        return Some(Rejection::NoHoldings);
    }
    match item.close_quote() {
        Some(q) if q != 0.0 && q.is_finite() => {}
        _ => return Some(Rejection::NoCloseQuote),
    }
    if !whitelist.contains(&TokenAddress::new(&item.contract_address)) {
        return Some(Rejection::NotWhitelisted);
    }
    None
}

/// Converts a raw integer balance into a token quantity.
///
/// `raw` is the balance in the token's smallest unit. Digits beyond what a
/// [`Decimal`] can hold are dropped from the low end, which only affects
/// precision far below an `f64` ulp. Whole parts too wide for a [`Decimal`]
/// are shifted in `f64`. Returns `None` for anything that is not a plain
/// unsigned integer.
pub fn scale_raw_balance(raw: &str, decimals: u32) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = raw.trim_start_matches('0');
    if digits.is_empty() {
        return Some(0.0);
    }

    let decimals = decimals as usize;
    let len = digits.len();
    let mut dropped = len.saturating_sub(MAX_MANTISSA_DIGITS);
    if decimals > dropped + MAX_SCALE {
        dropped = decimals - MAX_SCALE;
    }
    if dropped >= len {
        // Below 1e-28 of a token.
        return Some(0.0);
    }

    let mantissa: i128 = digits[..len - dropped].parse().ok()?;
    if decimals >= dropped {
        let scale = u32::try_from(decimals - dropped).ok()?;
        Decimal::from_i128_with_scale(mantissa, scale).to_f64()
    } else {
        let shift = i32::try_from(dropped - decimals).ok()?;
        Some(mantissa as f64 * 10f64.powi(shift))
    }
}

/// Token quantity at the close of the window.
///
/// Prefers the raw balance scaled by the contract's decimals, falling back to
/// closing value over closing price when the raw balance is unusable.
pub fn close_quantity(item: &RawPortfolioItem) -> Option<f64> {
    let close = item.close_holding()?;
    let from_raw = close
        .close_balance()
        .zip(item.contract_decimals)
        .and_then(|(raw, decimals)| scale_raw_balance(raw, decimals));
    if from_raw.is_some() {
        return from_raw;
    }
    let quote = close.close_quote()?;
    match close.quote_rate {
        Some(rate) if rate > 0.0 => Some(quote / rate),
        _ => None,
    }
}

/// Filters raw holdings down to whitelisted, priced assets.
///
/// Items are kept in input order. When two kept items share a symbol only
/// the first survives.
pub fn filter_holdings(items: &[RawPortfolioItem], whitelist: &Whitelist) -> Vec<Erc20> {
    let mut seen = BTreeSet::new();
    let mut assets = Vec::new();

    for item in items {
        let symbol = item.symbol();
        if let Some(reason) = rejection(item, whitelist) {
            debug!(symbol = %symbol, address = %item.contract_address, ?reason, "dropping holding");
            continue;
        }
        let Some(quantity) = close_quantity(item) else {
            debug!(symbol = %symbol, address = %item.contract_address, "dropping holding without a usable balance");
            continue;
        };
        if !seen.insert(symbol.clone()) {
            debug!(symbol = %symbol, address = %item.contract_address, "dropping duplicate symbol");
            continue;
        }
        assets.push(Erc20::new(item.name(), symbol, item.contract_address.as_str(), quantity));
    }

    assets
}

/// Builds a [`Treasury`] from a raw portfolio.
///
/// Price windows are taken from every item, whitelisted or not; assets only
/// from items passing [`filter_holdings`].
pub fn treasury_from_portfolio(portfolio: &RawPortfolio, whitelist: &Whitelist) -> Treasury {
    let windows = portfolio
        .items
        .iter()
        .map(|item| {
            HistoricalPrice::new(
                item.contract_address.as_str(),
                item.name(),
                item.symbol(),
                item.quotes(),
            )
        })
        .collect();
    let assets = filter_holdings(&portfolio.items, whitelist);
    debug!(
        address = %portfolio.address,
        items = portfolio.items.len(),
        retained = assets.len(),
        "built treasury"
    );
    Treasury::new(portfolio.address.clone(), assets, windows)
}

/// Keeps only the assets whose symbol is in `symbols`.
pub fn retain_priced_assets(mut treasury: Treasury, symbols: &BTreeSet<String>) -> Treasury {
    treasury.assets.retain(|asset| {
        let keep = symbols.contains(&asset.symbol);
        if !keep {
            debug!(symbol = %asset.symbol, "dropping asset without price or balance series");
        }
        keep
    });
    treasury
}
