use std::collections::HashMap;

use crate::config::TokensConfig;

/// In-memory lookup of token decimals keyed by upper-cased asset symbol.
/// Used by the decoder to turn raw integer-unit amounts into token units.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    decimals: HashMap<String, u32>,
    default_decimals: u32,
}

impl TokenRegistry {
    /// Build the registry from config. Later entries for the same symbol win.
    pub fn from_config(config: &TokensConfig) -> Self {
        let mut decimals = HashMap::with_capacity(config.assets.len());
        for token in &config.assets {
            let symbol = token.symbol.trim().to_uppercase();
            if let Some(previous) = decimals.insert(symbol, token.decimals) {
                tracing::debug!(
                    symbol = %token.symbol,
                    previous,
                    decimals = token.decimals,
                    "Duplicate token entry in config, overriding"
                );
            }
        }
        Self {
            decimals,
            default_decimals: config.default_decimals,
        }
    }

    /// Decimals for an asset symbol, falling back to the configured default
    /// for unknown or missing symbols.
    pub fn decimals_for(&self, symbol: Option<&str>) -> u32 {
        symbol
            .and_then(|s| self.decimals.get(&s.trim().to_uppercase()))
            .copied()
            .unwrap_or(self.default_decimals)
    }

    pub fn len(&self) -> usize {
        self.decimals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decimals.is_empty()
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::from_config(&TokensConfig::default())
    }
}
