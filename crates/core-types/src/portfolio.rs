// In crates/core-types/src/portfolio.rs

use crate::types::{Execution, Side, Symbol};
use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// An open holding in a single symbol.
///
/// Positions are long-only: `quantity` is never negative and a position whose
/// quantity reaches zero is removed from the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub symbol: Symbol,
    pub quantity: Decimal,
    pub average_price: Decimal,
}

impl Position {
    /// Creates a position, enforcing `quantity >= 0` and `average_price > 0`.
    pub fn new(symbol: Symbol, quantity: Decimal, average_price: Decimal) -> Result<Self> {
        if quantity < Decimal::ZERO {
            return Err(Error::InvalidPosition {
                symbol: symbol.0,
                reason: format!("negative quantity {quantity}"),
            });
        }
        if average_price <= Decimal::ZERO {
            return Err(Error::InvalidPosition {
                symbol: symbol.0,
                reason: format!("non-positive average price {average_price}"),
            });
        }
        Ok(Self {
            symbol,
            quantity,
            average_price,
        })
    }

    /// Book value of the position (quantity at average price).
    pub fn value(&self) -> Result<Decimal> {
        self.quantity
            .checked_mul(self.average_price)
            .ok_or(Error::Overflow("position value"))
    }
}

/// A point-in-time view of the account.
///
/// For portfolios built with [`Portfolio::new`] the identity
/// `capital = cash + sum(position.value())` holds and is preserved by
/// [`Portfolio::apply_fill`]. A provider may instead report a marked-to-market
/// capital through [`Portfolio::from_snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Portfolio {
    pub capital: Decimal,
    pub cash: Decimal,
    pub positions: BTreeMap<Symbol, Position>,
}

impl Portfolio {
    /// Builds a portfolio from cash and holdings, deriving capital from them.
    ///
    /// Fails if the holdings are too large to sum in a `Decimal`.
    pub fn new(cash: Decimal, positions: impl IntoIterator<Item = Position>) -> Result<Self> {
        let mut portfolio = Self::from_snapshot(Decimal::ZERO, cash, positions);
        portfolio.capital = cash
            .checked_add(portfolio.invested_value()?)
            .ok_or(Error::Overflow("portfolio capital"))?;
        Ok(portfolio)
    }

    /// Wraps a provider-reported snapshot without recomputing capital.
    pub fn from_snapshot(
        capital: Decimal,
        cash: Decimal,
        positions: impl IntoIterator<Item = Position>,
    ) -> Self {
        Self {
            capital,
            cash,
            positions: positions
                .into_iter()
                .map(|p| (p.symbol.clone(), p))
                .collect(),
        }
    }

    pub fn position(&self, symbol: &Symbol) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Sum of position book values.
    pub fn invested_value(&self) -> Result<Decimal> {
        self.positions.values().try_fold(Decimal::ZERO, |total, position| {
            total
                .checked_add(position.value()?)
                .ok_or(Error::Overflow("invested value"))
        })
    }

    /// Verifies every position is well-formed and that capital equals cash plus holdings.
    pub fn check_invariants(&self) -> Result<()> {
        for (key, position) in &self.positions {
            if key != &position.symbol {
                return Err(Error::InvalidPosition {
                    symbol: key.0.clone(),
                    reason: format!("stored under mismatched key (position is {})", position.symbol),
                });
            }
            Position::new(position.symbol.clone(), position.quantity, position.average_price)?;
        }
        let expected = self
            .cash
            .checked_add(self.invested_value()?)
            .ok_or(Error::Overflow("portfolio capital"))?;
        if self.capital != expected {
            return Err(Error::CapitalMismatch {
                capital: self.capital,
                expected,
            });
        }
        Ok(())
    }

    /// Books a fill: creates, grows, shrinks, or removes the position and moves cash.
    ///
    /// Capital moves by the change in `cash + holdings`, so a buy only costs the fee
    /// and a sell realizes the difference to the average price.
    pub fn apply_fill(&mut self, fill: &Execution) -> Result<()> {
        if fill.quantity <= Decimal::ZERO {
            return Err(Error::InvalidFill(format!("non-positive quantity {}", fill.quantity)));
        }
        if fill.price <= Decimal::ZERO {
            return Err(Error::InvalidFill(format!("non-positive price {}", fill.price)));
        }
        if fill.fee < Decimal::ZERO {
            return Err(Error::InvalidFill(format!("negative fee {}", fill.fee)));
        }

        let notional = fill.notional()?;
        let held = self.position(&fill.symbol).cloned();
        let value_before = match &held {
            Some(position) => position.value()?,
            None => Decimal::ZERO,
        };

        // Everything is computed up front so a failed fill leaves the portfolio untouched.
        let (updated, cash) = match fill.side {
            Side::Buy => {
                let (quantity, cost) = match &held {
                    Some(position) => (position.quantity, value_before),
                    None => (Decimal::ZERO, Decimal::ZERO),
                };
                let new_quantity = quantity
                    .checked_add(fill.quantity)
                    .ok_or(Error::Overflow("position quantity"))?;
                let average_price = cost
                    .checked_add(notional)
                    .and_then(|total| total.checked_div(new_quantity))
                    .ok_or(Error::Overflow("average price"))?;
                let cash = notional
                    .checked_add(fill.fee)
                    .and_then(|debit| self.cash.checked_sub(debit))
                    .ok_or(Error::Overflow("cash"))?;
                let position = Position {
                    symbol: fill.symbol.clone(),
                    quantity: new_quantity,
                    average_price,
                };
                (Some(position), cash)
            }
            Side::Sell => {
                let held_quantity = held.as_ref().map(|p| p.quantity).unwrap_or_default();
                if fill.quantity > held_quantity {
                    return Err(Error::InsufficientPosition {
                        symbol: fill.symbol.0.clone(),
                        requested: fill.quantity,
                        held: held_quantity,
                    });
                }
                let remaining = held_quantity - fill.quantity;
                let cash = notional
                    .checked_sub(fill.fee)
                    .and_then(|credit| self.cash.checked_add(credit))
                    .ok_or(Error::Overflow("cash"))?;
                let position = held
                    .filter(|_| !remaining.is_zero())
                    .map(|p| Position { quantity: remaining, ..p });
                (position, cash)
            }
        };

        let value_after = match &updated {
            Some(position) => position.value()?,
            None => Decimal::ZERO,
        };
        let capital = cash
            .checked_sub(self.cash)
            .zip(value_after.checked_sub(value_before))
            .and_then(|(cash_delta, value_delta)| cash_delta.checked_add(value_delta))
            .and_then(|delta| self.capital.checked_add(delta))
            .ok_or(Error::Overflow("portfolio capital"))?;

        match updated {
            Some(position) => {
                self.positions.insert(fill.symbol.clone(), position);
            }
            None => {
                self.positions.remove(&fill.symbol);
            }
        }
        self.cash = cash;
        self.capital = capital;
        Ok(())
    }
}
