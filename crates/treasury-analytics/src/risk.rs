//! Risk contribution decomposition.
//!
//! Splits portfolio volatility into additive per-token contributions using
//! the Euler allocation:
//!
//! ```text
//! σ_p² = wᵀ Σ w
//! contribution_i = w_i (Σ w)_i / σ_p
//! ```
//!
//! where `Σ` is the sample covariance of daily simple returns over the
//! window and `w` holds end-of-window value weights. Contributions sum to
//! `σ_p`.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use treasury_core::error::{TreasuryError, TreasuryResult};
use treasury_core::types::{DateRange, PriceTable, Treasury};

/// Portfolio volatility at or below this is treated as zero.
const ZERO_VOLATILITY: f64 = 1e-15;

/// Contribution of a single token to portfolio volatility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenContribution {
    /// Token symbol.
    pub symbol: String,

    /// End-of-window value weight (0-1).
    pub weight: f64,

    /// Additive share of portfolio volatility.
    pub contribution: f64,

    /// Contribution as percentage of portfolio volatility (0-100).
    pub contribution_pct: f64,
}

/// Risk decomposition of a treasury over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAttribution {
    /// Contributions by token, sorted by absolute contribution descending.
    pub by_token: Vec<TokenContribution>,

    /// Daily portfolio volatility σ_p.
    pub portfolio_volatility: f64,

    /// Number of daily return observations used.
    pub observations: usize,
}

impl RiskAttribution {
    fn flat(treasury: &Treasury, weights: &Array1<f64>, observations: usize) -> Self {
        let by_token = treasury
            .assets
            .iter()
            .zip(weights.iter())
            .map(|(asset, &weight)| TokenContribution {
                symbol: asset.symbol.clone(),
                weight,
                contribution: 0.0,
                contribution_pct: 0.0,
            })
            .collect();
        Self {
            by_token,
            portfolio_volatility: 0.0,
            observations,
        }
    }

    /// Contribution of `symbol`, if the token was attributed.
    #[must_use]
    pub fn contribution_of(&self, symbol: &str) -> Option<f64> {
        self.by_token
            .iter()
            .find(|c| c.symbol == symbol)
            .map(|c| c.contribution)
    }

    /// Sum of all contributions; equals the portfolio volatility.
    #[must_use]
    pub fn total_contribution(&self) -> f64 {
        self.by_token.iter().map(|c| c.contribution).sum()
    }

    /// Returns the top N contributors by absolute contribution.
    #[must_use]
    pub fn top_contributors(&self, n: usize) -> Vec<&TokenContribution> {
        self.by_token.iter().take(n).collect()
    }

    /// Writes each asset's contribution onto `treasury`, 0 for unattributed assets.
    pub fn apply_to(&self, treasury: &mut Treasury) {
        for asset in &mut treasury.assets {
            asset.risk_contribution = Some(self.contribution_of(&asset.symbol).unwrap_or(0.0));
        }
    }
}

/// Daily simple returns, one column per asset.
///
/// A zero prior price yields a zero return. Assets without a price series
/// have all-zero returns.
fn return_matrix(treasury: &Treasury, prices: &PriceTable, range: &DateRange) -> Array2<f64> {
    let days = range.len();
    let periods = days.saturating_sub(1);
    let mut returns = Array2::<f64>::zeros((periods, treasury.num_assets()));

    for (j, asset) in treasury.assets.iter().enumerate() {
        let Some(series) = prices.get(&asset.key()) else {
            debug!(symbol = %asset.symbol, "no price series, returns are zero");
            continue;
        };
        let aligned: Vec<f64> = series.reindex_ffill(range).values().collect();
        for (t, pair) in aligned.windows(2).enumerate() {
            if pair[0] != 0.0 {
                returns[[t, j]] = pair[1] / pair[0] - 1.0;
            }
        }
    }

    returns
}

/// End-of-window value weights; all zero when the total is zero.
fn value_weights(treasury: &Treasury) -> Array1<f64> {
    let balances: Array1<f64> = treasury.assets.iter().map(|a| a.balance).collect();
    let total = balances.sum();
    if total == 0.0 {
        Array1::zeros(balances.len())
    } else {
        balances / total
    }
}

/// Sample covariance of the columns of `returns` (n - 1 denominator).
fn sample_covariance(returns: &Array2<f64>) -> Option<Array2<f64>> {
    let observations = returns.nrows();
    if observations < 2 {
        return None;
    }
    let means = returns.mean_axis(Axis(0))?;
    let centered = returns - &means;
    Some(centered.t().dot(&centered) / (observations - 1) as f64)
}

/// Decomposes portfolio volatility into per-token contributions.
///
/// `treasury` balances must already be end-of-window values. A window with
/// fewer than two return observations, or with zero portfolio volatility,
/// attributes zero to every token.
pub fn risk_attribution(
    treasury: &Treasury,
    prices: &PriceTable,
    range: &DateRange,
) -> TreasuryResult<RiskAttribution> {
    let weights = value_weights(treasury);
    let returns = return_matrix(treasury, prices, range);
    let observations = returns.nrows();

    let Some(covariance) = sample_covariance(&returns) else {
        debug!(observations, "too few observations for covariance");
        return Ok(RiskAttribution::flat(treasury, &weights, observations));
    };

    let marginal = covariance.dot(&weights);
    let variance = weights.dot(&marginal);
    if !variance.is_finite() {
        return Err(TreasuryError::calculation_failed(format!(
            "portfolio variance is not finite ({variance})"
        )));
    }
    let volatility = variance.max(0.0).sqrt();
    if volatility <= ZERO_VOLATILITY {
        debug!(observations, "zero-variance window");
        return Ok(RiskAttribution::flat(treasury, &weights, observations));
    }

    let mut by_token: Vec<TokenContribution> = treasury
        .assets
        .iter()
        .enumerate()
        .map(|(i, asset)| {
            let contribution = weights[i] * marginal[i] / volatility;
            TokenContribution {
                symbol: asset.symbol.clone(),
                weight: weights[i],
                contribution,
                contribution_pct: contribution / volatility * 100.0,
            }
        })
        .collect();
    by_token.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));

    debug!(observations, volatility, tokens = by_token.len(), "attributed risk");
    Ok(RiskAttribution {
        by_token,
        portfolio_volatility: volatility,
        observations,
    })
}

/// Sets every asset's `risk_contribution` from [`risk_attribution`].
pub fn attribute_risk(mut treasury: Treasury, prices: &PriceTable, range: &DateRange) -> TreasuryResult<Treasury> {
    risk_attribution(&treasury, prices, range)?.apply_to(&mut treasury);
    Ok(treasury)
}
