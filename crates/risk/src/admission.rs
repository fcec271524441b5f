// In crates/risk/src/admission.rs

use crate::types::TradingSettings;
use crate::{Error, Result};
use chrono::{DateTime, TimeDelta, Utc};
use core_types::{Portfolio, Signal, SignalAction};

/// Why a signal was dropped before reaching the position limit gate.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("HOLD signals require no action")]
    Hold,

    #[error("Signal confidence ({confidence:.3}) is below threshold ({threshold:.3})")]
    LowConfidence { confidence: f64, threshold: f64 },

    #[error("Signal is {age_secs}s old, older than the {max_age_secs}s limit")]
    StaleSignal { age_secs: i64, max_age_secs: i64 },

    #[error("Already holding {held} positions (max {max})")]
    MaxPositionsReached { held: usize, max: u32 },

    #[error("Last trade was {elapsed_secs}s ago, minimum interval is {interval_secs}s")]
    Cooldown { elapsed_secs: i64, interval_secs: i64 },
}

/// Signal-level filters applied before sizing: confidence, freshness,
/// position count and per-symbol trade spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdmissionPolicy {
    pub min_confidence: f64,
    pub max_positions: u32,
    pub min_trade_interval: TimeDelta,
    pub signal_max_age: TimeDelta,
}

impl TryFrom<&TradingSettings> for AdmissionPolicy {
    type Error = Error;

    fn try_from(settings: &TradingSettings) -> Result<Self> {
        if !(0.0..=1.0).contains(&settings.signal_threshold) {
            return Err(Error::InvalidParameters(format!(
                "signal_threshold must be in [0, 1], got {}",
                settings.signal_threshold
            )));
        }
        if settings.max_positions == 0 {
            return Err(Error::InvalidParameters(
                "max_positions must be at least 1".to_string(),
            ));
        }
        let seconds = |value: u64, key: &str| {
            i64::try_from(value)
                .ok()
                .and_then(TimeDelta::try_seconds)
                .ok_or_else(|| Error::InvalidParameters(format!("{key} is out of range: {value}")))
        };
        Ok(Self {
            min_confidence: settings.signal_threshold,
            max_positions: settings.max_positions,
            min_trade_interval: seconds(settings.min_trade_interval, "min_trade_interval")?,
            signal_max_age: seconds(settings.signal_max_age, "signal_max_age")?,
        })
    }
}

impl AdmissionPolicy {
    /// Checks whether `signal` may proceed to sizing at time `now`.
    ///
    /// `last_trade_at` is the time of the most recent fill in the signal's symbol.
    /// The position cap only blocks BUYs that would open a new symbol; SELLs and
    /// additions to an existing holding are left to the other checks.
    pub fn admit(
        &self,
        signal: &Signal,
        portfolio: &Portfolio,
        last_trade_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> std::result::Result<(), Rejection> {
        if signal.action == SignalAction::Hold {
            return Err(Rejection::Hold);
        }

        // NaN confidence never passes.
        if !(signal.confidence >= self.min_confidence) {
            return Err(Rejection::LowConfidence {
                confidence: signal.confidence,
                threshold: self.min_confidence,
            });
        }

        let age = now - signal.generated_at;
        if age > self.signal_max_age {
            return Err(Rejection::StaleSignal {
                age_secs: age.num_seconds(),
                max_age_secs: self.signal_max_age.num_seconds(),
            });
        }

        let held = portfolio.position(&signal.symbol).is_some();
        if signal.action == SignalAction::Buy
            && !held
            && portfolio.position_count() >= self.max_positions as usize
        {
            return Err(Rejection::MaxPositionsReached {
                held: portfolio.position_count(),
                max: self.max_positions,
            });
        }

        if held {
            if let Some(last) = last_trade_at {
                let elapsed = now - last;
                if elapsed < self.min_trade_interval {
                    return Err(Rejection::Cooldown {
                        elapsed_secs: elapsed.num_seconds(),
                        interval_secs: self.min_trade_interval.num_seconds(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Position, Symbol};
    use rust_decimal_macros::dec;

    fn policy() -> AdmissionPolicy {
        AdmissionPolicy::try_from(&TradingSettings {
            max_positions: 2,
            ..TradingSettings::default()
        })
        .unwrap()
    }

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    fn holding(symbols: &[&str]) -> Portfolio {
        let positions = symbols
            .iter()
            .map(|s| Position::new(sym(s), dec!(10), dec!(100)).unwrap());
        Portfolio::new(dec!(100000), positions).unwrap()
    }

    #[test]
    fn hold_is_never_admitted() {
        let now = Utc::now();
        let signal = Signal::new(sym("SBER"), SignalAction::Hold, 1.0).at(now);
        assert_eq!(policy().admit(&signal, &holding(&[]), None, now), Err(Rejection::Hold));
    }

    #[test]
    fn confidence_threshold_is_inclusive() {
        let now = Utc::now();
        let p = policy();
        let at = Signal::new(sym("SBER"), SignalAction::Buy, 0.6).at(now);
        let below = Signal::new(sym("SBER"), SignalAction::Buy, 0.59).at(now);
        assert!(p.admit(&at, &holding(&[]), None, now).is_ok());
        assert!(matches!(
            p.admit(&below, &holding(&[]), None, now),
            Err(Rejection::LowConfidence { .. })
        ));
    }

    #[test]
    fn nan_confidence_is_rejected() {
        let now = Utc::now();
        let mut signal = Signal::new(sym("SBER"), SignalAction::Buy, 0.9).at(now);
        signal.confidence = f64::NAN;
        assert!(matches!(
            policy().admit(&signal, &holding(&[]), None, now),
            Err(Rejection::LowConfidence { .. })
        ));
    }

    #[test]
    fn old_signals_are_dropped() {
        let now = Utc::now();
        let signal = Signal::new(sym("SBER"), SignalAction::Buy, 0.9).at(now - TimeDelta::minutes(6));
        assert!(matches!(
            policy().admit(&signal, &holding(&[]), None, now),
            Err(Rejection::StaleSignal { .. })
        ));
    }

    #[test]
    fn position_cap_blocks_only_new_symbols() {
        let now = Utc::now();
        let full = holding(&["SBER", "GAZP"]);
        let p = policy();

        let new_symbol = Signal::new(sym("LKOH"), SignalAction::Buy, 0.9).at(now);
        assert_eq!(
            p.admit(&new_symbol, &full, None, now),
            Err(Rejection::MaxPositionsReached { held: 2, max: 2 })
        );

        let existing = Signal::new(sym("SBER"), SignalAction::Buy, 0.9).at(now);
        assert!(p.admit(&existing, &full, None, now).is_ok());

        let sell = Signal::new(sym("GAZP"), SignalAction::Sell, 0.9).at(now);
        assert!(p.admit(&sell, &full, None, now).is_ok());
    }

    #[test]
    fn recent_trade_in_held_symbol_triggers_cooldown() {
        let now = Utc::now();
        let portfolio = holding(&["SBER"]);
        let signal = Signal::new(sym("SBER"), SignalAction::Sell, 0.9).at(now);
        let p = policy();

        assert!(matches!(
            p.admit(&signal, &portfolio, Some(now - TimeDelta::minutes(10)), now),
            Err(Rejection::Cooldown { .. })
        ));
        assert!(p.admit(&signal, &portfolio, Some(now - TimeDelta::hours(2)), now).is_ok());
    }

    #[test]
    fn threshold_outside_unit_interval_is_invalid() {
        let settings = TradingSettings {
            signal_threshold: 1.5,
            ..TradingSettings::default()
        };
        assert!(AdmissionPolicy::try_from(&settings).is_err());
    }
}
