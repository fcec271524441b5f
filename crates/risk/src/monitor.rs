// In crates/risk/src/monitor.rs

use crate::gate::{approximate, as_percent};
use crate::types::TradingSettings;
use crate::{Error, Result};
use core_types::{Portfolio, Position, Symbol};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// A warning about one holding, raised after trades have been booked.
///
/// Alerts are informational. They never block or unwind a trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "alert", rename_all = "snake_case")]
pub enum PositionAlert {
    /// The holding is a larger share of portfolio value than the threshold.
    Concentration {
        symbol: Symbol,
        weight_percent: f64,
        threshold_percent: f64,
    },
    /// The current price is further below the average price than the threshold.
    UnrealizedLoss {
        symbol: Symbol,
        loss_percent: f64,
        threshold_percent: f64,
    },
}

/// Reviews holdings for concentration and unrealized losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionMonitor {
    /// Fraction of portfolio value in `(0, 1]`.
    pub max_weight: Decimal,
    /// Fraction of the average price in `(0, 1]`.
    pub max_loss: Decimal,
}

impl Default for PositionMonitor {
    fn default() -> Self {
        Self {
            max_weight: Decimal::new(2, 1),
            max_loss: Decimal::new(1, 1),
        }
    }
}

impl PositionMonitor {
    pub fn new(max_weight: Decimal, max_loss: Decimal) -> Result<Self> {
        for (key, value) in [("concentration_alert", max_weight), ("loss_alert", max_loss)] {
            if value <= Decimal::ZERO || value > Decimal::ONE {
                return Err(Error::InvalidParameters(format!(
                    "{key} must be in (0, 1], got {value}"
                )));
            }
        }
        Ok(Self { max_weight, max_loss })
    }

    /// Checks every holding in `portfolio`, in symbol order.
    ///
    /// Holdings are marked at `prices` where a price is known and at their
    /// average price otherwise, so a holding without a price never reports a loss.
    /// Weights are taken against `cash + marked holdings`.
    pub fn review(&self, portfolio: &Portfolio, prices: &HashMap<Symbol, Decimal>) -> Vec<PositionAlert> {
        let marked: Vec<(&Position, Decimal, Option<Decimal>)> = portfolio
            .positions
            .values()
            .map(|position| {
                let mark = prices
                    .get(&position.symbol)
                    .copied()
                    .filter(|price| *price > Decimal::ZERO)
                    .unwrap_or(position.average_price);
                (position, mark, position.quantity.checked_mul(mark))
            })
            .collect();

        let total = marked.iter().try_fold(portfolio.cash, |total, (_, _, value)| {
            total.checked_add((*value)?)
        });

        let mut alerts = Vec::new();
        for (position, mark, value) in marked {
            if let Some(loss_percent) = self.loss_percent(position, mark) {
                alerts.push(PositionAlert::UnrealizedLoss {
                    symbol: position.symbol.clone(),
                    loss_percent,
                    threshold_percent: percent_of(self.max_loss),
                });
            }

            // Without a representable positive total there is nothing to weigh against.
            let (Some(value), Some(total)) = (value, total) else {
                continue;
            };
            if total <= Decimal::ZERO {
                continue;
            }
            let over = total
                .checked_mul(self.max_weight)
                .is_none_or(|limit| value > limit);
            if over {
                let weight_percent = match value.checked_mul(HUNDRED).and_then(|v| v.checked_div(total)) {
                    Some(weight) => as_percent(weight),
                    None => approximate(value) / approximate(total) * 100.0,
                };
                alerts.push(PositionAlert::Concentration {
                    symbol: position.symbol.clone(),
                    weight_percent,
                    threshold_percent: percent_of(self.max_weight),
                });
            }
        }
        alerts
    }

    fn loss_percent(&self, position: &Position, mark: Decimal) -> Option<f64> {
        let floor = position
            .average_price
            .checked_mul(Decimal::ONE.checked_sub(self.max_loss)?)?;
        if mark >= floor {
            return None;
        }
        let drop = position.average_price - mark;
        let loss = drop
            .checked_mul(HUNDRED)
            .and_then(|d| d.checked_div(position.average_price))
            .map(as_percent)
            .unwrap_or_else(|| approximate(drop) / approximate(position.average_price) * 100.0);
        Some(loss)
    }
}

fn percent_of(fraction: Decimal) -> f64 {
    match fraction.checked_mul(HUNDRED) {
        Some(percent) => as_percent(percent),
        None => approximate(fraction) * 100.0,
    }
}

impl TryFrom<&TradingSettings> for PositionMonitor {
    type Error = Error;

    fn try_from(settings: &TradingSettings) -> Result<Self> {
        let fraction = |value: f64, key: &str| {
            Decimal::try_from(value)
                .map_err(|e| Error::InvalidParameters(format!("{key} {value}: {e}")))
        };
        Self::new(
            fraction(settings.concentration_alert, "concentration_alert")?,
            fraction(settings.loss_alert, "loss_alert")?,
        )
    }
}
