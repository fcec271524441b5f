// In crates/engine/src/report.rs

use core_types::{Execution, Symbol};
use risk::{LimitDecision, PositionAlert, Rejection};
use serde::Serialize;

/// What happened to one signal during a cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SignalOutcome {
    /// Dropped by the admission checks before sizing.
    Skipped {
        symbol: Symbol,
        #[serde(serialize_with = "as_display")]
        rejection: Rejection,
    },
    /// Rejected by the position limit gate; the dispatcher was not called.
    Vetoed { symbol: Symbol, decision: LimitDecision },
    /// Approved, but the sized quantity was smaller than one lot.
    BelowOneLot { symbol: Symbol, decision: LimitDecision },
    /// A SELL for a symbol that is not held.
    NothingToSell { symbol: Symbol },
    /// A SELL for which no usable price was available.
    PriceUnavailable { symbol: Symbol },
    /// The order was filled and booked.
    Executed {
        execution: Execution,
        decision: Option<LimitDecision>,
    },
    /// A collaborator failed; the cycle moved on to the next signal.
    Failed { symbol: Symbol, reason: String },
}

fn as_display<S: serde::Serializer>(value: &Rejection, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// The outcomes of one evaluation cycle, in signal order, followed by the
/// alerts from the end-of-cycle position review.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleReport {
    pub outcomes: Vec<SignalOutcome>,
    pub alerts: Vec<PositionAlert>,
}

impl CycleReport {
    /// Fills produced during the cycle.
    pub fn executions(&self) -> impl Iterator<Item = &Execution> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            SignalOutcome::Executed { execution, .. } => Some(execution),
            _ => None,
        })
    }

    pub fn executed_count(&self) -> usize {
        self.executions().count()
    }
}
