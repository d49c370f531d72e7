//! File-based whitelist sources.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use treasury_traits::error::TraitError;
use treasury_traits::whitelist::{Whitelist, WhitelistSource};

/// Token list entry; only the address matters.
#[derive(Debug, Deserialize)]
struct ListedToken {
    address: String,
}

/// Accepted layouts: a token list (`{"tokens": [{"address": ...}]}`) or a
/// plain array of addresses.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WhitelistFile {
    TokenList { tokens: Vec<ListedToken> },
    Addresses(Vec<String>),
}

impl WhitelistFile {
    fn into_whitelist(self) -> Whitelist {
        match self {
            WhitelistFile::TokenList { tokens } => tokens.into_iter().map(|t| t.address).collect(),
            WhitelistFile::Addresses(addresses) => addresses.into_iter().collect(),
        }
    }
}

/// JSON whitelist, re-read on every request so external refreshes apply.
pub struct JsonWhitelistSource {
    file_path: PathBuf,
}

impl JsonWhitelistSource {
    /// Create a new JSON whitelist source.
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl WhitelistSource for JsonWhitelistSource {
    async fn whitelist(&self) -> Result<Whitelist, TraitError> {
        let content = tokio::fs::read_to_string(&self.file_path).await?;
        let file: WhitelistFile =
            serde_json::from_str(&content).map_err(|e| TraitError::ParseError(e.to_string()))?;
        let whitelist = file.into_whitelist();
        debug!(path = %self.file_path.display(), addresses = whitelist.len(), "loaded whitelist");
        Ok(whitelist)
    }
}

/// Fixed in-memory whitelist.
pub struct StaticWhitelistSource {
    whitelist: Whitelist,
}

impl StaticWhitelistSource {
    /// Create a new static whitelist source.
    pub fn new(whitelist: Whitelist) -> Self {
        Self { whitelist }
    }
}

#[async_trait]
impl WhitelistSource for StaticWhitelistSource {
    async fn whitelist(&self) -> Result<Whitelist, TraitError> {
        Ok(self.whitelist.clone())
    }
}
