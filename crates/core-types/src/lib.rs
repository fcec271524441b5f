// In crates/core-types/src/lib.rs

pub mod error;
pub mod portfolio;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use error::{Error, Result};
pub use portfolio::{Portfolio, Position};
pub use types::{Execution, OrderRequest, PriceLookup, Side, Signal, SignalAction, Symbol};
