// In crates/core-types/src/error.rs

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Symbol must not be empty")]
    EmptySymbol,

    #[error("Invalid position for {symbol}: {reason}")]
    InvalidPosition { symbol: String, reason: String },

    #[error("Cannot sell {requested} of {symbol}: only {held} held")]
    InsufficientPosition {
        symbol: String,
        requested: Decimal,
        held: Decimal,
    },

    #[error("Portfolio capital {capital} does not match cash + positions ({expected})")]
    CapitalMismatch { capital: Decimal, expected: Decimal },

    #[error("Invalid fill: {0}")]
    InvalidFill(String),

    #[error("Arithmetic overflow computing {0}")]
    Overflow(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
