// In crates/execution/src/sizing.rs

use risk::LimitDecision;
use rust_decimal::Decimal;

/// Rounds `quantity` down to whole lots. Returns `None` below one lot.
pub fn round_to_lots(quantity: Decimal, lot_size: u32) -> Option<Decimal> {
    if lot_size == 0 || quantity <= Decimal::ZERO {
        return None;
    }
    let lot = Decimal::from(lot_size);
    let lots = (quantity / lot).floor();
    if lots < Decimal::ONE {
        return None;
    }
    Some(lots * lot)
}

/// Turns an approved gate decision into an order quantity in whole lots.
///
/// Rejected decisions, decisions without a computed quantity, and quantities
/// smaller than one lot all yield `None`: nothing should be dispatched.
pub fn size_order(decision: &LimitDecision, lot_size: u32) -> Option<Decimal> {
    if !decision.approved {
        return None;
    }
    round_to_lots(decision.candidate_quantity?, lot_size)
}
