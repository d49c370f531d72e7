//! Spread backtest orchestration.
//!
//! The `SpreadEngine` runs one pipeline per request:
//!
//! 1. Fetch the portfolio and the whitelist concurrently
//! 2. Build the treasury from whitelisted holdings
//! 3. Fetch prices for the held tokens and the reserve token
//! 4. Build balance series and drop assets that ended up without one
//! 5. Apply the spread and reconcile the treasury with end-of-window values
//! 6. Total the balances and attribute risk
//!
//! Nothing is shared between requests except the collaborators.
//!
//! # Example
//!
//! ```rust,ignore
//! use treasury_engine::{SpreadEngineBuilder, SpreadRequest};
//!
//! let engine = SpreadEngineBuilder::new()
//!     .with_portfolio_source(portfolio)
//!     .with_whitelist_source(whitelist)
//!     .build()?;
//!
//! let request = engine.new_request("0xtreasury", range, &SpreadToken::new("Real USD", "USDR", "0x..."));
//! let backtest = engine.backtest(&request).await?;
//! println!("end total: {:?}", backtest.total_balance.value_at(range.end()));
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use treasury_analytics::{
    apply_spread, build_balances, reconcile, retain_priced_assets, risk_attribution, total_balance,
    treasury_from_portfolio, validate_spread_percentage, RiskAttribution, SpreadToken,
};
use treasury_core::types::{BalanceTable, Date, DateRange, PriceTable, TokenKey, TotalBalance, Treasury};
use treasury_traits::ids::ChainId;
use treasury_traits::portfolio::PortfolioSource;
use treasury_traits::prices::PriceSource;
use treasury_traits::whitelist::{Whitelist, WhitelistSource};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::sources::WindowPriceSource;

// =============================================================================
// REQUEST / RESULT
// =============================================================================

/// A spread backtest request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadRequest {
    /// Treasury wallet address.
    pub treasury_address: String,
    /// Chain the treasury lives on.
    pub chain_id: ChainId,
    /// First day of the window.
    pub start: Date,
    /// Last day of the window, inclusive.
    pub end: Date,
    /// Reserve token name.
    pub spread_token_name: String,
    /// Reserve token symbol.
    pub spread_token_symbol: String,
    /// Reserve token contract address.
    pub spread_token_address: String,
    /// Percentage of every balance diverted into the reserve (0-100).
    pub spread_percentage: f64,
}

impl SpreadRequest {
    /// The backtest window.
    pub fn range(&self) -> EngineResult<DateRange> {
        Ok(DateRange::new(self.start, self.end)?)
    }

    /// The reserve token.
    pub fn spread_token(&self) -> SpreadToken {
        SpreadToken::new(
            self.spread_token_name.as_str(),
            self.spread_token_symbol.as_str(),
            self.spread_token_address.as_str(),
        )
    }

    /// Set the chain.
    pub fn with_chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Set the spread percentage.
    pub fn with_spread_percentage(mut self, spread_percentage: f64) -> Self {
        self.spread_percentage = spread_percentage;
        self
    }
}

/// Outcome of a spread backtest.
#[derive(Debug, Clone)]
pub struct SpreadBacktest {
    /// Identifier of the request, as logged.
    pub request_id: Uuid,
    /// Reconciled treasury with risk contributions.
    pub treasury: Treasury,
    /// Prices used.
    pub prices: PriceTable,
    /// Per-token balances after the spread.
    pub balances: BalanceTable,
    /// Sum of all balances.
    pub total_balance: TotalBalance,
    /// Risk decomposition at the end of the window.
    pub risk: RiskAttribution,
}

impl SpreadBacktest {
    /// The `(treasury, prices, balances, total)` tuple.
    pub fn into_parts(self) -> (Treasury, PriceTable, BalanceTable, TotalBalance) {
        (self.treasury, self.prices, self.balances, self.total_balance)
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// The spread backtest engine.
pub struct SpreadEngine {
    config: EngineConfig,
    portfolio: Arc<dyn PortfolioSource>,
    whitelist: Arc<dyn WhitelistSource>,
    prices: Option<Arc<dyn PriceSource>>,
}

impl SpreadEngine {
    /// Creates a new engine. Without a price source, prices come from the
    /// portfolio's own quote windows.
    pub fn new(
        config: EngineConfig,
        portfolio: Arc<dyn PortfolioSource>,
        whitelist: Arc<dyn WhitelistSource>,
        prices: Option<Arc<dyn PriceSource>>,
    ) -> Self {
        Self {
            config,
            portfolio,
            whitelist,
            prices,
        }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A request with the configured default chain and spread percentage.
    pub fn new_request(
        &self,
        treasury_address: impl Into<String>,
        range: DateRange,
        spread_token: &SpreadToken,
    ) -> SpreadRequest {
        SpreadRequest {
            treasury_address: treasury_address.into(),
            chain_id: self.config.chain_id(),
            start: range.start(),
            end: range.end(),
            spread_token_name: spread_token.name.clone(),
            spread_token_symbol: spread_token.symbol.clone(),
            spread_token_address: spread_token.address.to_string(),
            spread_percentage: self.config.default_spread_percentage,
        }
    }

    /// Runs a spread backtest.
    ///
    /// Upstream failures on the portfolio or whitelist degrade to a treasury
    /// with no assets. A failing price source aborts the request.
    pub async fn backtest(&self, request: &SpreadRequest) -> EngineResult<SpreadBacktest> {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "backtest",
            %request_id,
            treasury = %request.treasury_address,
            chain_id = %request.chain_id
        );
        self.run(request, request_id).instrument(span).await
    }

    async fn run(&self, request: &SpreadRequest, request_id: Uuid) -> EngineResult<SpreadBacktest> {
        let range = request.range()?;
        let spread_percentage = validate_spread_percentage(request.spread_percentage)?;
        let spread_token = request.spread_token();
        if spread_token.symbol.is_empty() {
            return Err(EngineError::InvalidRequest("spread token symbol is empty".into()));
        }
        info!(
            start = %range.start(),
            end = %range.end(),
            spread_token = %spread_token.symbol,
            spread_percentage,
            "starting backtest"
        );

        let (portfolio, whitelist) = tokio::join!(
            self.portfolio
                .fetch_portfolio(&request.treasury_address, request.chain_id),
            self.whitelist.whitelist(),
        );
        let whitelist = whitelist.unwrap_or_else(|e| {
            warn!(error = %e, "whitelist unavailable, every asset will be filtered");
            Whitelist::new()
        });
        let treasury = treasury_from_portfolio(&portfolio, &whitelist);

        let prices = self.fetch_prices(&treasury, &spread_token, &range).await?;

        let balances = build_balances(&treasury, &prices, &range);
        let priced: BTreeSet<String> = prices
            .existing_token_symbols()
            .intersection(&balances.existing_token_symbols())
            .cloned()
            .collect();
        let treasury = retain_priced_assets(treasury, &priced);

        let balances = apply_spread(balances, &spread_token.symbol, spread_percentage, &range)?;
        let mut treasury = reconcile(treasury, &balances, range.end(), &spread_token)?;
        let total_balance = total_balance(&balances);

        let risk = risk_attribution(&treasury, &prices, &range)?;
        risk.apply_to(&mut treasury);

        info!(
            assets = treasury.num_assets(),
            start_total = total_balance.value_at(range.start()).unwrap_or(0.0),
            end_total = total_balance.value_at(range.end()).unwrap_or(0.0),
            volatility = risk.portfolio_volatility,
            "backtest complete"
        );

        Ok(SpreadBacktest {
            request_id,
            treasury,
            prices,
            balances,
            total_balance,
            risk,
        })
    }

    async fn fetch_prices(
        &self,
        treasury: &Treasury,
        spread_token: &SpreadToken,
        range: &DateRange,
    ) -> EngineResult<PriceTable> {
        let mut tokens = treasury.token_keys();
        tokens.insert(TokenKey::new(spread_token.symbol.as_str(), spread_token.address.clone()));

        let prices = match &self.prices {
            Some(source) => source.fetch_prices(&tokens, range).await?,
            None => {
                WindowPriceSource::new(&treasury.windows)
                    .fetch_prices(&tokens, range)
                    .await?
            }
        };
        Ok(prices)
    }
}
