// In crates/app-config/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load configuration")]
    LoadError(#[from] config::ConfigError),

    #[error("Invalid trading settings: {0}")]
    InvalidTrading(#[from] risk::Error),

    #[error("Invalid paper settings: {0}")]
    InvalidPaper(#[from] execution::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
