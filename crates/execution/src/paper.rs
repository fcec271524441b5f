// In crates/execution/src/paper.rs

use crate::types::PaperSettings;
use crate::{Error, Executor, Result};
use async_trait::async_trait;
use core_types::{Execution, OrderRequest};
use rust_decimal::Decimal;

/// An executor that fills every valid market order immediately at the given price.
///
/// A commission of `notional * commission_rate` is charged on each fill. Filled
/// executions are kept in an in-memory history.
#[derive(Debug)]
pub struct PaperExecutor {
    commission_rate: Decimal,
    history: Vec<Execution>,
}

impl PaperExecutor {
    pub fn new(settings: &PaperSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            commission_rate: settings.commission()?,
            history: Vec::new(),
        })
    }

    /// All fills produced so far, oldest first.
    pub fn history(&self) -> &[Execution] {
        &self.history
    }
}

#[async_trait]
impl Executor for PaperExecutor {
    fn name(&self) -> &'static str {
        "PaperExecutor"
    }

    async fn execute(
        &mut self,
        order_request: &OrderRequest,
        current_price: Decimal,
    ) -> Result<Execution> {
        if order_request.quantity <= Decimal::ZERO {
            return Err(Error::InvalidOrder(format!(
                "non-positive quantity {} for {}",
                order_request.quantity, order_request.symbol
            )));
        }
        if current_price <= Decimal::ZERO {
            return Err(Error::ExecutionFailed {
                reason: format!("no usable price for {}", order_request.symbol),
            });
        }

        let fee = order_request
            .quantity
            .checked_mul(current_price)
            .and_then(|notional| notional.checked_mul(self.commission_rate))
            .ok_or_else(|| Error::InvalidOrder(format!(
                "order value for {} is out of range",
                order_request.symbol
            )))?;
        let execution = Execution {
            symbol: order_request.symbol.clone(),
            side: order_request.side,
            price: current_price,
            quantity: order_request.quantity,
            fee,
        };

        tracing::info!(
            symbol = %execution.symbol,
            side = ?execution.side,
            quantity = %execution.quantity,
            price = %execution.price,
            fee = %execution.fee,
            "Paper order filled."
        );
        self.history.push(execution.clone());
        Ok(execution)
    }
}
