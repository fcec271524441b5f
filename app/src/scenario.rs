// In app/src/scenario.rs

use anyhow::{Context, Result};
use core_types::{Portfolio, Position, Signal, Symbol};
use engine::providers::StaticPriceOracle;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// A recorded portfolio, price table and signal batch to replay on paper.
#[derive(Deserialize, Debug)]
pub struct Scenario {
    pub cash: Decimal,
    #[serde(default)]
    pub positions: Vec<PositionEntry>,
    #[serde(default)]
    pub prices: HashMap<Symbol, Decimal>,
    #[serde(default)]
    pub signals: Vec<Signal>,
}

#[derive(Deserialize, Debug)]
pub struct PositionEntry {
    pub symbol: Symbol,
    pub quantity: Decimal,
    pub average_price: Decimal,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Builds the starting portfolio, rejecting malformed positions.
    pub fn portfolio(&self) -> Result<Portfolio> {
        let positions = self
            .positions
            .iter()
            .map(|p| Position::new(p.symbol.clone(), p.quantity, p.average_price))
            .collect::<core_types::Result<Vec<_>>>()?;
        Ok(Portfolio::new(self.cash, positions)?)
    }

    pub fn oracle(&self) -> StaticPriceOracle {
        StaticPriceOracle::new(self.prices.iter().map(|(s, p)| (s.clone(), *p)))
    }
}
