// In crates/risk/src/lib.rs

use core_types::{Portfolio, PriceLookup, Symbol};

pub mod admission;
pub mod error;
pub mod gate;
pub mod monitor;
pub mod types;

// Re-export public types
pub use admission::{AdmissionPolicy, Rejection};
pub use error::{Error, Result};
pub use gate::{PositionLimitGate, evaluate};
pub use monitor::{PositionAlert, PositionMonitor};
pub use types::{LimitDecision, LimitReason, RiskConfig, TradingSettings};

/// The interface between signal processing and order execution.
///
/// A `LimitGate` decides whether a proposed BUY may go ahead given an immutable
/// portfolio snapshot and the latest price. Implementations must be pure: no
/// I/O, no logging, no mutation, so they can be called concurrently for many
/// symbols without locking.
pub trait LimitGate: Sync {
    /// The name of the gate, used in logs.
    fn name(&self) -> &'static str;

    /// Evaluates a BUY for `symbol`.
    ///
    /// Rejections (`NoPrice`, `NoCapital`, `Unsizable`, `ExceedsLimit`) are returned as values
    /// with `approved == false`; this never fails.
    fn evaluate(&self, symbol: &Symbol, portfolio: &Portfolio, price: PriceLookup) -> LimitDecision;
}
