//! Token whitelist.

use std::collections::HashSet;

use async_trait::async_trait;

use treasury_core::types::TokenAddress;

use crate::error::TraitError;

/// Set of token addresses considered legitimate (non-spam).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    addresses: HashSet<TokenAddress>,
}

impl Whitelist {
    /// Create an empty whitelist; it rejects every token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether an address is whitelisted.
    pub fn contains(&self, address: &TokenAddress) -> bool {
        self.addresses.contains(address)
    }

    /// Add an address.
    pub fn insert(&mut self, address: impl Into<TokenAddress>) -> bool {
        self.addresses.insert(address.into())
    }

    /// Number of whitelisted addresses.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// True when no address is whitelisted.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

impl<A: Into<TokenAddress>> FromIterator<A> for Whitelist {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self {
            addresses: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Trait for whitelist providers, refreshed externally.
#[async_trait]
pub trait WhitelistSource: Send + Sync {
    /// Current whitelist.
    async fn whitelist(&self) -> Result<Whitelist, TraitError>;
}
