// In crates/risk/src/types.rs

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The `trading` section of the configuration file.
///
/// Field names follow the on-disk keys (`trading.position_size`,
/// `trading.max_positions`, ...). Validation happens when converting into
/// [`RiskConfig`] or [`crate::AdmissionPolicy`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TradingSettings {
    /// Fraction of capital each new trade is sized to; also the per-symbol weight ceiling.
    #[serde(default = "default_position_size")]
    pub position_size: f64,

    /// Maximum number of distinct symbols held at once.
    #[serde(default = "default_max_positions")]
    pub max_positions: u32,

    /// Signals below this confidence are ignored.
    #[serde(default = "default_signal_threshold")]
    pub signal_threshold: f64,

    /// Minimum seconds between two trades in the same symbol.
    #[serde(default = "default_min_trade_interval")]
    pub min_trade_interval: u64,

    /// Signals older than this many seconds are dropped.
    #[serde(default = "default_signal_max_age")]
    pub signal_max_age: u64,

    /// A holding above this fraction of portfolio value is reported after each cycle.
    #[serde(default = "default_concentration_alert")]
    pub concentration_alert: f64,

    /// A holding whose price is this fraction below its average price is reported.
    #[serde(default = "default_loss_alert")]
    pub loss_alert: f64,
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            position_size: default_position_size(),
            max_positions: default_max_positions(),
            signal_threshold: default_signal_threshold(),
            min_trade_interval: default_min_trade_interval(),
            signal_max_age: default_signal_max_age(),
            concentration_alert: default_concentration_alert(),
            loss_alert: default_loss_alert(),
        }
    }
}

fn default_position_size() -> f64 { 0.1 }
fn default_max_positions() -> u32 { 10 }
fn default_signal_threshold() -> f64 { 0.6 }
fn default_min_trade_interval() -> u64 { 3600 }
fn default_signal_max_age() -> u64 { 300 }
fn default_concentration_alert() -> f64 { 0.2 }
fn default_loss_alert() -> f64 { 0.1 }

/// Validated risk limits, immutable for the length of a trading session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskConfig {
    /// Fraction of capital in `(0, 1]`.
    pub position_size_fraction: Decimal,
    /// At least 1.
    pub max_positions: u32,
}

impl RiskConfig {
    pub fn new(position_size_fraction: Decimal, max_positions: u32) -> Result<Self> {
        if position_size_fraction <= Decimal::ZERO || position_size_fraction > Decimal::ONE {
            return Err(Error::InvalidParameters(format!(
                "position_size must be in (0, 1], got {position_size_fraction}"
            )));
        }
        if max_positions == 0 {
            return Err(Error::InvalidParameters(
                "max_positions must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            position_size_fraction,
            max_positions,
        })
    }
}

impl TryFrom<&TradingSettings> for RiskConfig {
    type Error = Error;

    fn try_from(settings: &TradingSettings) -> Result<Self> {
        let fraction = Decimal::try_from(settings.position_size).map_err(|e| {
            Error::InvalidParameters(format!("position_size {}: {e}", settings.position_size))
        })?;
        Self::new(fraction, settings.max_positions)
    }
}

/// Why the gate decided the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LimitReason {
    Ok,
    ExceedsLimit,
    NoPrice,
    NoCapital,
    /// The trade size does not fit in a `Decimal` (e.g., a near-zero price).
    Unsizable,
}

/// The gate's verdict for one BUY signal. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitDecision {
    pub approved: bool,
    /// Weight of the symbol after the trade, in percent of capital.
    pub projected_weight_percent: f64,
    /// The ceiling the projection was compared against, in percent.
    pub max_weight_percent: f64,
    pub reason: LimitReason,
    /// Size of the proposed trade, when a price was available to compute it.
    pub candidate_quantity: Option<Decimal>,
}

impl LimitDecision {
    /// A fail-closed rejection for which no size could be computed.
    pub(crate) fn rejected(reason: LimitReason, max_weight_percent: f64) -> Self {
        Self {
            approved: false,
            projected_weight_percent: 0.0,
            max_weight_percent,
            reason,
            candidate_quantity: None,
        }
    }
}
