// In crates/execution/src/lib.rs

use async_trait::async_trait;
use core_types::{Execution, OrderRequest};
use rust_decimal::Decimal;

pub mod error;
pub mod paper;
pub mod sizing;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use paper::PaperExecutor;
pub use sizing::size_order;
pub use types::PaperSettings;

/// The universal interface for an execution handler.
///
/// An `Executor` takes an order that already passed the risk checks and
/// places it, reporting the fill. It is only invoked for approved BUYs and
/// for SELLs; it does not retry and does not report partial fills.
#[async_trait]
pub trait Executor {
    /// The name of the executor (e.g., "PaperExecutor").
    fn name(&self) -> &'static str;

    /// Executes a given order request.
    ///
    /// # Arguments
    ///
    /// * `order_request`: The order to place.
    /// * `current_price`: The last known price, used by simulated executors as the fill price.
    ///
    /// # Returns
    ///
    /// The `Execution` on success, or an `Error` if the order could not be filled.
    async fn execute(
        &mut self,
        order_request: &OrderRequest,
        current_price: Decimal,
    ) -> Result<Execution>;
}
