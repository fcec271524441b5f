// In crates/execution/src/types.rs

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Settings for the paper executor (the `paper` config section).
#[derive(Debug, Clone, Deserialize)]
pub struct PaperSettings {
    /// Commission as a fraction of traded notional (e.g., 0.0005 for 0.05%).
    #[serde(default = "default_commission_rate")]
    pub commission_rate: f64,

    /// Order quantities are rounded down to a multiple of this.
    #[serde(default = "default_lot_size")]
    pub lot_size: u32,
}

impl PaperSettings {
    /// The commission rate as a `Decimal`, checked to lie in `[0, 1)`.
    pub fn commission(&self) -> Result<Decimal> {
        let rate = Decimal::try_from(self.commission_rate)
            .map_err(|e| Error::InvalidSettings(format!("commission_rate: {e}")))?;
        if rate < Decimal::ZERO || rate >= Decimal::ONE {
            return Err(Error::InvalidSettings(format!(
                "commission_rate must be in [0, 1), got {rate}"
            )));
        }
        Ok(rate)
    }

    /// Checks every paper setting; a zero lot size would turn every order into nothing.
    pub fn validate(&self) -> Result<()> {
        self.commission()?;
        if self.lot_size == 0 {
            return Err(Error::InvalidSettings("lot_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for PaperSettings {
    fn default() -> Self {
        Self {
            commission_rate: default_commission_rate(),
            lot_size: default_lot_size(),
        }
    }
}

fn default_commission_rate() -> f64 { 0.0005 }
fn default_lot_size() -> u32 { 1 }
