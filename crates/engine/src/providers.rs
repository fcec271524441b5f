// In crates/engine/src/providers.rs

use async_trait::async_trait;
use core_types::{Execution, Portfolio, PriceLookup, Symbol};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Supplies portfolio snapshots and receives fills.
///
/// Snapshots are eventually consistent with the last recorded fill.
#[async_trait]
pub trait PortfolioProvider: Send + Sync {
    /// Returns an immutable, point-in-time copy of the portfolio.
    async fn snapshot(&self) -> anyhow::Result<Portfolio>;

    /// Books a fill reported by the executor.
    async fn record_fill(&self, fill: &Execution) -> anyhow::Result<()>;
}

/// Supplies the latest tradable price for a symbol.
///
/// Stale or missing data is reported as [`PriceLookup::Unavailable`]; the
/// freshness threshold belongs to the implementation.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn current_price(&self, symbol: &Symbol) -> PriceLookup;
}

/// An optional collaborator, matched on explicitly by the caller.
#[derive(Debug, Clone)]
pub enum Capability<T> {
    Available(T),
    Unavailable,
}

impl<T> Capability<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }
}

impl<T> From<Option<T>> for Capability<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Capability::Unavailable, Capability::Available)
    }
}

/// An in-process portfolio shared between the engine and anything else that
/// needs to read it (e.g., a report at the end of a run).
#[derive(Debug, Clone)]
pub struct SharedPortfolio {
    inner: Arc<Mutex<Portfolio>>,
}

impl SharedPortfolio {
    pub fn new(portfolio: Portfolio) -> Self {
        Self {
            inner: Arc::new(Mutex::new(portfolio)),
        }
    }
}

#[async_trait]
impl PortfolioProvider for SharedPortfolio {
    async fn snapshot(&self) -> anyhow::Result<Portfolio> {
        Ok(self.inner.lock().await.clone())
    }

    async fn record_fill(&self, fill: &Execution) -> anyhow::Result<()> {
        let mut portfolio = self.inner.lock().await;
        portfolio.apply_fill(fill)?;
        tracing::debug!(
            symbol = %fill.symbol,
            cash = %portfolio.cash,
            capital = %portfolio.capital,
            "Portfolio updated from fill."
        );
        Ok(())
    }
}

/// A fixed table of prices. Symbols not in the table have no price.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceOracle {
    prices: HashMap<Symbol, Decimal>,
}

impl StaticPriceOracle {
    pub fn new(prices: impl IntoIterator<Item = (Symbol, Decimal)>) -> Self {
        Self {
            prices: prices.into_iter().collect(),
        }
    }

    pub fn with_price(mut self, symbol: Symbol, price: Decimal) -> Self {
        self.prices.insert(symbol, price);
        self
    }
}

#[async_trait]
impl PriceOracle for StaticPriceOracle {
    async fn current_price(&self, symbol: &Symbol) -> PriceLookup {
        self.prices.get(symbol).copied().into()
    }
}
