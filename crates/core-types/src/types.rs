// In crates/core-types/src/types.rs

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tradable instrument identifier (e.g., "SBER").
///
/// Deserialization goes through [`Symbol::new`], so an empty symbol in a
/// scenario or signal feed is rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(pub String);

impl Symbol {
    /// Creates a symbol, rejecting empty or whitespace-only identifiers.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(Error::EmptySymbol);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Symbol {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a signal source wants done with a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

/// A trading signal produced once per evaluation cycle and consumed once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: Symbol,
    pub action: SignalAction,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

impl Signal {
    pub fn new(symbol: Symbol, action: SignalAction, confidence: f64) -> Self {
        Self {
            symbol,
            action,
            confidence: confidence.clamp(0.0, 1.0),
            generated_at: Utc::now(),
        }
    }

    /// Overrides the generation time, mostly useful for replaying recorded signals.
    pub fn at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }
}

/// The outcome of asking a price oracle for a tradable price.
///
/// Missing or stale data is reported as `Unavailable` rather than as a
/// fabricated number, so downstream sizing can fail closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceLookup {
    Found(Decimal),
    Unavailable,
}

impl PriceLookup {
    /// Returns the price only if it is strictly positive.
    pub fn usable(self) -> Option<Decimal> {
        match self {
            PriceLookup::Found(price) if price > Decimal::ZERO => Some(price),
            _ => None,
        }
    }
}

impl From<Option<Decimal>> for PriceLookup {
    fn from(price: Option<Decimal>) -> Self {
        price.map_or(PriceLookup::Unavailable, PriceLookup::Found)
    }
}

/// The side of an order or a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

/// A market order the dispatcher is asked to place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: Decimal,
}

/// The result of a filled order, as reported by an executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub symbol: Symbol,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    pub fee: Decimal,
}

impl Execution {
    /// Gross traded value, excluding fees.
    pub fn notional(&self) -> Result<Decimal> {
        self.price
            .checked_mul(self.quantity)
            .ok_or(Error::Overflow("fill notional"))
    }
}
