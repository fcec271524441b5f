// In crates/engine/src/lib.rs

pub mod providers;
pub mod report;

use crate::providers::{Capability, PortfolioProvider, PriceOracle};
use anyhow::Result;
use app_config::Settings;
use chrono::{DateTime, Utc};
use core_types::{OrderRequest, PriceLookup, Side, Signal, SignalAction, Symbol};
use execution::{Executor, PaperExecutor, size_order};
use risk::{AdmissionPolicy, LimitGate, LimitReason, PositionAlert, PositionLimitGate, PositionMonitor};
use std::collections::HashMap;
use std::sync::Arc;

pub use report::{CycleReport, SignalOutcome};

/// Drives signals through admission, the position limit gate and execution.
///
/// Every signal is evaluated against a freshly fetched snapshot, so a fill
/// earlier in the cycle is visible to later signals. Nothing in a cycle aborts
/// it: each signal ends in exactly one [`SignalOutcome`]. After the last signal
/// the holdings are reviewed for concentration and unrealized losses.
pub struct Engine {
    portfolio: Arc<dyn PortfolioProvider>,
    oracle: Capability<Arc<dyn PriceOracle>>,
    gate: Box<dyn LimitGate + Send>,
    executor: Box<dyn Executor + Send>,
    policy: AdmissionPolicy,
    monitor: PositionMonitor,
    lot_size: u32,
    /// Time of the last fill per symbol, for the cooldown check.
    last_trade_at: HashMap<Symbol, DateTime<Utc>>,
}

impl Engine {
    pub fn new(
        portfolio: Arc<dyn PortfolioProvider>,
        oracle: Capability<Arc<dyn PriceOracle>>,
        gate: Box<dyn LimitGate + Send>,
        executor: Box<dyn Executor + Send>,
        policy: AdmissionPolicy,
        lot_size: u32,
    ) -> Self {
        Self {
            portfolio,
            oracle,
            gate,
            executor,
            policy,
            monitor: PositionMonitor::default(),
            lot_size,
            last_trade_at: HashMap::new(),
        }
    }

    /// Replaces the default post-cycle alert thresholds.
    pub fn with_monitor(mut self, monitor: PositionMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    /// Builds a paper-trading engine from validated settings.
    pub fn paper(
        settings: &Settings,
        portfolio: Arc<dyn PortfolioProvider>,
        oracle: Capability<Arc<dyn PriceOracle>>,
    ) -> Result<Self> {
        let gate = PositionLimitGate::new(settings.risk_config()?);
        let executor = PaperExecutor::new(&settings.paper)?;
        let engine = Self::new(
            portfolio,
            oracle,
            Box::new(gate),
            Box::new(executor),
            settings.admission_policy()?,
            settings.paper.lot_size,
        );
        Ok(engine.with_monitor(settings.position_monitor()?))
    }

    /// Runs one evaluation cycle at the current time.
    pub async fn run_cycle(&mut self, signals: &[Signal]) -> CycleReport {
        self.run_cycle_at(signals, Utc::now()).await
    }

    /// Runs one evaluation cycle as of `now`.
    pub async fn run_cycle_at(&mut self, signals: &[Signal], now: DateTime<Utc>) -> CycleReport {
        tracing::info!(
            count = signals.len(),
            gate = self.gate.name(),
            executor = self.executor.name(),
            "Starting evaluation cycle."
        );

        let mut report = CycleReport::default();
        for signal in signals {
            let outcome = self.process_signal(signal, now).await;
            report.outcomes.push(outcome);
        }
        report.alerts = self.review_positions().await;

        tracing::info!(
            signals = signals.len(),
            executed = report.executed_count(),
            alerts = report.alerts.len(),
            "Evaluation cycle finished."
        );
        report
    }

    async fn process_signal(&mut self, signal: &Signal, now: DateTime<Utc>) -> SignalOutcome {
        let symbol = signal.symbol.clone();

        // --- 1. Fresh snapshot for every signal ---
        let snapshot = match self.portfolio.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(symbol = %symbol, error = %e, "Failed to fetch portfolio snapshot.");
                return SignalOutcome::Failed {
                    symbol,
                    reason: format!("portfolio snapshot: {e}"),
                };
            }
        };

        // --- 2. Admission checks ---
        let last_trade = self.last_trade_at.get(&symbol).copied();
        if let Err(rejection) = self.policy.admit(signal, &snapshot, last_trade, now) {
            tracing::debug!(symbol = %symbol, %rejection, "Signal skipped.");
            return SignalOutcome::Skipped { symbol, rejection };
        }

        let price = self.lookup_price(&symbol).await;

        // --- 3. Sizing ---
        let (order, decision) = match signal.action {
            SignalAction::Buy => {
                let decision = self.gate.evaluate(&symbol, &snapshot, price);
                match decision.reason {
                    LimitReason::Ok => {}
                    LimitReason::ExceedsLimit => {
                        tracing::info!(
                            symbol = %symbol,
                            projected = decision.projected_weight_percent,
                            max = decision.max_weight_percent,
                            "BUY rejected: position weight would exceed the limit."
                        );
                        return SignalOutcome::Vetoed { symbol, decision };
                    }
                    LimitReason::NoPrice | LimitReason::NoCapital | LimitReason::Unsizable => {
                        tracing::warn!(symbol = %symbol, reason = ?decision.reason, "BUY rejected, skipping symbol this cycle.");
                        return SignalOutcome::Vetoed { symbol, decision };
                    }
                }

                let Some(quantity) = size_order(&decision, self.lot_size) else {
                    tracing::info!(symbol = %symbol, candidate = ?decision.candidate_quantity, "Approved size is below one lot.");
                    return SignalOutcome::BelowOneLot { symbol, decision };
                };
                tracing::info!(symbol = %symbol, %quantity, weight = decision.projected_weight_percent, "BUY approved.");
                (OrderRequest { symbol: symbol.clone(), side: Side::Buy, quantity }, Some(decision))
            }
            SignalAction::Sell => {
                // SELLs reduce concentration and bypass the gate; they close the holding.
                let Some(position) = snapshot.position(&symbol) else {
                    tracing::debug!(symbol = %symbol, "SELL for a symbol that is not held.");
                    return SignalOutcome::NothingToSell { symbol };
                };
                if price.usable().is_none() {
                    tracing::warn!(symbol = %symbol, "No price for SELL, skipping symbol this cycle.");
                    return SignalOutcome::PriceUnavailable { symbol };
                }
                (OrderRequest { symbol: symbol.clone(), side: Side::Sell, quantity: position.quantity }, None)
            }
            // Admission never lets HOLD through.
            SignalAction::Hold => {
                return SignalOutcome::Skipped { symbol, rejection: risk::Rejection::Hold };
            }
        };

        // --- 4. Dispatch ---
        let Some(fill_price) = price.usable() else {
            return SignalOutcome::Failed { symbol, reason: "price vanished before dispatch".to_string() };
        };
        let execution = match self.executor.execute(&order, fill_price).await {
            Ok(execution) => execution,
            Err(e) => {
                tracing::error!(symbol = %symbol, error = %e, ?order, "Order execution failed.");
                return SignalOutcome::Failed { symbol, reason: e.to_string() };
            }
        };

        // --- 5. Book the fill ---
        if let Err(e) = self.portfolio.record_fill(&execution).await {
            tracing::error!(symbol = %symbol, error = %e, "Filled order could not be booked.");
            return SignalOutcome::Failed { symbol, reason: format!("record fill: {e}") };
        }
        self.last_trade_at.insert(symbol, now);

        SignalOutcome::Executed { execution, decision }
    }

    // --- Post-cycle position review ---

    async fn review_positions(&self) -> Vec<PositionAlert> {
        let snapshot = match self.portfolio.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch portfolio snapshot for the position review.");
                return Vec::new();
            }
        };

        let mut prices = HashMap::new();
        for symbol in snapshot.positions.keys() {
            if let Some(price) = self.lookup_price(symbol).await.usable() {
                prices.insert(symbol.clone(), price);
            }
        }

        let alerts = self.monitor.review(&snapshot, &prices);
        for alert in &alerts {
            match alert {
                PositionAlert::Concentration { symbol, weight_percent, threshold_percent } => {
                    tracing::warn!(
                        symbol = %symbol,
                        weight = weight_percent,
                        threshold = threshold_percent,
                        "High concentration in a single position."
                    );
                }
                PositionAlert::UnrealizedLoss { symbol, loss_percent, threshold_percent } => {
                    tracing::warn!(
                        symbol = %symbol,
                        loss = loss_percent,
                        threshold = threshold_percent,
                        "Large unrealized loss on a position."
                    );
                }
            }
        }
        alerts
    }

    async fn lookup_price(&self, symbol: &Symbol) -> PriceLookup {
        match &self.oracle {
            Capability::Available(oracle) => oracle.current_price(symbol).await,
            Capability::Unavailable => PriceLookup::Unavailable,
        }
    }
}
