//! File-based portfolio sources.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

use treasury_traits::ids::ChainId;
use treasury_traits::portfolio::{PortfolioSource, RawPortfolio};

// =============================================================================
// JSON PORTFOLIO SOURCE
// =============================================================================

/// Accepted file layouts: the provider's `{"data": {...}}` envelope or the
/// bare portfolio object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortfolioFile {
    Envelope { data: RawPortfolio },
    Bare(RawPortfolio),
}

impl PortfolioFile {
    fn into_portfolio(self) -> RawPortfolio {
        match self {
            PortfolioFile::Envelope { data } | PortfolioFile::Bare(data) => data,
        }
    }
}

/// Reads saved provider responses from `{dir}/{address}_{chain_id}.json`.
///
/// Addresses are lowercased when building the file name. Missing or
/// malformed files yield an empty portfolio.
pub struct JsonPortfolioSource {
    dir: PathBuf,
}

impl JsonPortfolioSource {
    /// Create a new JSON portfolio source rooted at `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the file holding `address` on `chain_id`.
    pub fn file_path(&self, address: &str, chain_id: ChainId) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", address.trim().to_lowercase(), chain_id))
    }
}

#[async_trait]
impl PortfolioSource for JsonPortfolioSource {
    async fn fetch_portfolio(&self, address: &str, chain_id: ChainId) -> RawPortfolio {
        let path = self.file_path(address, chain_id);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                error!(address, %chain_id, path = %path.display(), error = %e, "portfolio unavailable");
                return RawPortfolio::empty(address);
            }
        };

        let mut portfolio = match serde_json::from_str::<PortfolioFile>(&content) {
            Ok(file) => file.into_portfolio(),
            Err(e) => {
                error!(address, %chain_id, path = %path.display(), error = %e, "malformed portfolio payload");
                return RawPortfolio::empty(address);
            }
        };

        if portfolio.address.is_empty() {
            portfolio.address = address.to_string();
        }
        debug!(address, %chain_id, items = portfolio.items.len(), "loaded portfolio file");
        portfolio
    }
}

// =============================================================================
// EMPTY SOURCE
// =============================================================================

/// Portfolio source that holds nothing.
pub struct EmptyPortfolioSource;

#[async_trait]
impl PortfolioSource for EmptyPortfolioSource {
    async fn fetch_portfolio(&self, address: &str, _chain_id: ChainId) -> RawPortfolio {
        RawPortfolio::empty(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const PAYLOAD: &str = r#"{
        "data": {
            "address": "0xtreasury",
            "items": [{
                "contract_address": "0xaaa",
                "contract_ticker_symbol": "AAA",
                "contract_decimals": 2,
                "holdings": [{
                    "timestamp": "2022-01-01T00:00:00Z",
                    "quote_rate": 1.0,
                    "close": {"balance": "1000", "quote": 10.0}
                }]
            }]
        },
        "error": false
    }"#;

    #[tokio::test]
    async fn test_reads_envelope() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("0xtreasury_1.json"), PAYLOAD).unwrap();

        let source = JsonPortfolioSource::new(dir.path());
        let portfolio = source.fetch_portfolio("0xTreasury", ChainId::ETHEREUM).await;
        assert_eq!(portfolio.address, "0xtreasury");
        assert_eq!(portfolio.items.len(), 1);
        assert_eq!(portfolio.items[0].symbol(), "AAA");
    }

    #[tokio::test]
    async fn test_reads_bare_portfolio() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("0xtreasury_137.json"),
            r#"{"items": [{"contract_address": "0xaaa", "holdings": []}]}"#,
        )
        .unwrap();

        let source = JsonPortfolioSource::new(dir.path());
        let portfolio = source.fetch_portfolio("0xtreasury", ChainId::new(137)).await;
        assert_eq!(portfolio.address, "0xtreasury");
        assert_eq!(portfolio.items.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonPortfolioSource::new(dir.path());
        let portfolio = source.fetch_portfolio("0xnothing", ChainId::ETHEREUM).await;
        assert!(portfolio.is_empty());
        assert_eq!(portfolio.address, "0xnothing");
    }

    #[tokio::test]
    async fn test_malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("0xtreasury_1.json"), r#"{"items": 5}"#).unwrap();

        let source = JsonPortfolioSource::new(dir.path());
        assert!(source.fetch_portfolio("0xtreasury", ChainId::ETHEREUM).await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_source() {
        let portfolio = EmptyPortfolioSource.fetch_portfolio("0xabc", ChainId::ETHEREUM).await;
        assert_eq!(portfolio, RawPortfolio::empty("0xabc"));
    }
}
