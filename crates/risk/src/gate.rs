// In crates/risk/src/gate.rs

use crate::types::{LimitDecision, LimitReason, RiskConfig};
use crate::LimitGate;
use core_types::{Portfolio, PriceLookup, Symbol};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Decides whether a BUY in `symbol` keeps that symbol's weight within the limit.
///
/// The configured `position_size_fraction` is used twice: a new trade is sized
/// to `capital * fraction`, and the symbol's total weight after the trade may
/// not exceed `fraction * 100` percent. A fresh position therefore lands
/// exactly on the ceiling and is approved; adding to an existing one is
/// rejected.
///
/// The approval itself compares values, `existing * price + candidate_value`
/// against `candidate_value`, so it never depends on how a division rounds.
/// The percentages in the decision are for reporting only.
///
/// The function is pure and never panics. Non-positive capital yields
/// `NoCapital`, a missing or non-positive price yields `NoPrice`, and a trade
/// size that does not fit in a `Decimal` yields `Unsizable`, all with
/// `approved == false`.
pub fn evaluate(
    symbol: &Symbol,
    portfolio: &Portfolio,
    config: RiskConfig,
    price: PriceLookup,
) -> LimitDecision {
    let fraction = config.position_size_fraction;
    let max_weight_percent = match fraction.checked_mul(HUNDRED) {
        Some(max_weight) => as_percent(max_weight),
        None => approximate(fraction) * 100.0,
    };

    // --- Fail-closed preconditions ---

    let capital = portfolio.capital;
    if capital <= Decimal::ZERO {
        return LimitDecision::rejected(LimitReason::NoCapital, max_weight_percent);
    }

    let Some(price) = price.usable() else {
        return LimitDecision::rejected(LimitReason::NoPrice, max_weight_percent);
    };

    // --- Sizing ---

    let Some((candidate_value, candidate_quantity)) = capital
        .checked_mul(fraction)
        .and_then(|value| Some((value, value.checked_div(price)?)))
    else {
        return LimitDecision::rejected(LimitReason::Unsizable, max_weight_percent);
    };

    let existing_quantity = match portfolio.position(symbol) {
        Some(position) => {
            debug_assert!(
                position.quantity >= Decimal::ZERO,
                "negative quantity in snapshot for {symbol}"
            );
            position.quantity
        }
        None => Decimal::ZERO,
    };

    // --- Limit check ---

    // (existing + candidate) * price, without dividing and re-multiplying the candidate.
    // A projection too large to represent is certainly above the ceiling.
    let projected_value = existing_quantity
        .checked_mul(price)
        .and_then(|existing_value| existing_value.checked_add(candidate_value));
    let approved = projected_value.is_some_and(|value| value <= candidate_value);

    let projected_weight_percent = match projected_value
        .and_then(|value| value.checked_mul(HUNDRED))
        .and_then(|value| value.checked_div(capital))
    {
        Some(weight) => as_percent(weight),
        None => {
            let value = approximate(existing_quantity) * approximate(price)
                + approximate(candidate_value);
            value / approximate(capital) * 100.0
        }
    };

    LimitDecision {
        approved,
        projected_weight_percent,
        max_weight_percent,
        reason: if approved {
            LimitReason::Ok
        } else {
            LimitReason::ExceedsLimit
        },
        candidate_quantity: Some(candidate_quantity),
    }
}

// Normalized first so equal decimals always map to the same float.
pub(crate) fn as_percent(value: Decimal) -> f64 {
    approximate(value.normalize())
}

pub(crate) fn approximate(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// A [`LimitGate`] bound to one session's [`RiskConfig`].
#[derive(Debug, Clone, Copy)]
pub struct PositionLimitGate {
    config: RiskConfig,
}

impl PositionLimitGate {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> RiskConfig {
        self.config
    }
}

impl LimitGate for PositionLimitGate {
    fn name(&self) -> &'static str {
        "PositionLimitGate"
    }

    fn evaluate(&self, symbol: &Symbol, portfolio: &Portfolio, price: PriceLookup) -> LimitDecision {
        evaluate(symbol, portfolio, self.config, price)
    }
}
