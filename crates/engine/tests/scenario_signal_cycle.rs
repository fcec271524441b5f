// End-to-end cycles: signals -> admission -> position limit gate -> paper fills.

use app_config::Settings;
use async_trait::async_trait;
use chrono::Utc;
use core_types::{Execution, OrderRequest, Portfolio, Position, Signal, SignalAction, Symbol};
use engine::providers::{Capability, PortfolioProvider, PriceOracle, SharedPortfolio, StaticPriceOracle};
use engine::{Engine, SignalOutcome};
use execution::Executor;
use risk::{LimitReason, PositionAlert, PositionLimitGate, PositionMonitor, Rejection};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn sym(s: &str) -> Symbol {
    Symbol::new(s).unwrap()
}

fn buy(s: &str) -> Signal {
    Signal::new(sym(s), SignalAction::Buy, 0.8)
}

fn sell(s: &str) -> Signal {
    Signal::new(sym(s), SignalAction::Sell, 0.8)
}

fn settings_without_cooldown() -> Settings {
    let mut settings = Settings::default();
    settings.trading.min_trade_interval = 0;
    settings
}

fn oracle(prices: &[(&str, Decimal)]) -> Capability<Arc<dyn PriceOracle>> {
    let oracle = StaticPriceOracle::new(prices.iter().map(|(s, p)| (sym(s), *p)));
    Capability::Available(Arc::new(oracle))
}

#[tokio::test]
async fn fresh_buy_is_filled_and_booked() {
    let portfolio = SharedPortfolio::new(Portfolio::new(dec!(1000000), []).unwrap());
    let mut engine = Engine::paper(
        &Settings::default(),
        Arc::new(portfolio.clone()),
        oracle(&[("SBER", dec!(250))]),
    )
    .unwrap();

    let report = engine.run_cycle(&[buy("SBER")]).await;

    let [SignalOutcome::Executed { execution, decision }] = report.outcomes.as_slice() else {
        panic!("unexpected outcomes: {:?}", report.outcomes);
    };
    assert_eq!(execution.quantity, dec!(400));
    assert_eq!(execution.fee, dec!(50));
    assert_eq!(decision.as_ref().unwrap().projected_weight_percent, 10.0);

    let after = portfolio.snapshot().await.unwrap();
    assert_eq!(after.position(&sym("SBER")).unwrap().quantity, dec!(400));
    assert_eq!(after.cash, dec!(899950));
    after.check_invariants().unwrap();
}

#[tokio::test]
async fn second_buy_sees_the_first_fill_and_is_vetoed() {
    let portfolio = SharedPortfolio::new(Portfolio::new(dec!(1000000), []).unwrap());
    let mut engine = Engine::paper(
        &settings_without_cooldown(),
        Arc::new(portfolio.clone()),
        oracle(&[("SBER", dec!(250))]),
    )
    .unwrap();

    let report = engine.run_cycle(&[buy("SBER"), buy("SBER")]).await;

    assert_eq!(report.executed_count(), 1);
    match &report.outcomes[1] {
        SignalOutcome::Vetoed { decision, .. } => {
            assert_eq!(decision.reason, LimitReason::ExceedsLimit);
            assert!(decision.projected_weight_percent > 19.0);
        }
        other => panic!("expected veto, got {other:?}"),
    }
}

#[tokio::test]
async fn existing_position_above_limit_blocks_buy() {
    let held = Position::new(sym("SBER"), dec!(300), dec!(250)).unwrap();
    let portfolio = SharedPortfolio::new(Portfolio::new(dec!(925000), [held]).unwrap());
    let mut engine = Engine::paper(
        &Settings::default(),
        Arc::new(portfolio.clone()),
        oracle(&[("SBER", dec!(250))]),
    )
    .unwrap();

    let report = engine.run_cycle(&[buy("SBER")]).await;
    match &report.outcomes[0] {
        SignalOutcome::Vetoed { decision, .. } => {
            assert_eq!(decision.reason, LimitReason::ExceedsLimit);
            assert_eq!(decision.projected_weight_percent, 17.5);
        }
        other => panic!("expected veto, got {other:?}"),
    }
    assert_eq!(portfolio.snapshot().await.unwrap().cash, dec!(925000));
}

#[tokio::test]
async fn missing_oracle_fails_closed_and_the_loop_continues() {
    let portfolio = SharedPortfolio::new(Portfolio::new(dec!(500000), []).unwrap());
    let mut engine = Engine::paper(&Settings::default(), Arc::new(portfolio), Capability::Unavailable).unwrap();

    let report = engine.run_cycle(&[buy("GAZP"), buy("SBER")]).await;

    assert_eq!(report.outcomes.len(), 2);
    for outcome in &report.outcomes {
        match outcome {
            SignalOutcome::Vetoed { decision, .. } => {
                assert_eq!(decision.reason, LimitReason::NoPrice);
                assert_eq!(decision.candidate_quantity, None);
            }
            other => panic!("expected NoPrice veto, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn zero_capital_blocks_buys() {
    let portfolio = SharedPortfolio::new(Portfolio::new(dec!(0), []).unwrap());
    let mut engine = Engine::paper(
        &Settings::default(),
        Arc::new(portfolio),
        oracle(&[("SBER", dec!(250))]),
    )
    .unwrap();

    let report = engine.run_cycle(&[buy("SBER")]).await;
    assert!(matches!(
        &report.outcomes[0],
        SignalOutcome::Vetoed { decision, .. } if decision.reason == LimitReason::NoCapital
    ));
}

#[tokio::test]
async fn sell_bypasses_the_gate_and_closes_the_holding() {
    let held = Position::new(sym("SBER"), dec!(300), dec!(250)).unwrap();
    let portfolio = SharedPortfolio::new(Portfolio::new(dec!(925000), [held]).unwrap());
    let mut engine = Engine::paper(
        &Settings::default(),
        Arc::new(portfolio.clone()),
        oracle(&[("SBER", dec!(260))]),
    )
    .unwrap();

    let report = engine.run_cycle(&[sell("SBER"), sell("GAZP")]).await;

    assert!(matches!(
        &report.outcomes[0],
        SignalOutcome::Executed { decision: None, execution } if execution.quantity == dec!(300)
    ));
    assert!(matches!(&report.outcomes[1], SignalOutcome::NothingToSell { .. }));
    assert!(portfolio.snapshot().await.unwrap().positions.is_empty());
}

#[tokio::test]
async fn low_confidence_and_hold_are_skipped() {
    let portfolio = SharedPortfolio::new(Portfolio::new(dec!(1000000), []).unwrap());
    let mut engine = Engine::paper(
        &Settings::default(),
        Arc::new(portfolio),
        oracle(&[("SBER", dec!(250))]),
    )
    .unwrap();

    let signals = [
        Signal::new(sym("SBER"), SignalAction::Buy, 0.3),
        Signal::new(sym("SBER"), SignalAction::Hold, 0.9),
    ];
    let report = engine.run_cycle_at(&signals, Utc::now()).await;

    assert!(matches!(
        &report.outcomes[0],
        SignalOutcome::Skipped { rejection: Rejection::LowConfidence { .. }, .. }
    ));
    assert!(matches!(
        &report.outcomes[1],
        SignalOutcome::Skipped { rejection: Rejection::Hold, .. }
    ));
    assert_eq!(report.executed_count(), 0);
}

#[tokio::test]
async fn cooldown_applies_after_a_fill() {
    let portfolio = SharedPortfolio::new(Portfolio::new(dec!(1000000), []).unwrap());
    let mut engine = Engine::paper(
        &Settings::default(),
        Arc::new(portfolio),
        oracle(&[("SBER", dec!(250))]),
    )
    .unwrap();

    let report = engine.run_cycle(&[buy("SBER"), sell("SBER")]).await;
    assert_eq!(report.executed_count(), 1);
    assert!(matches!(
        &report.outcomes[1],
        SignalOutcome::Skipped { rejection: Rejection::Cooldown { .. }, .. }
    ));
}

#[tokio::test]
async fn lot_size_rounds_down_and_small_orders_are_dropped() {
    let mut settings = Settings::default();
    settings.paper.lot_size = 1000;
    let portfolio = SharedPortfolio::new(Portfolio::new(dec!(1000000), []).unwrap());
    let mut engine = Engine::paper(
        &settings,
        Arc::new(portfolio),
        oracle(&[("SBER", dec!(250)), ("GAZP", dec!(40))]),
    )
    .unwrap();

    let report = engine.run_cycle(&[buy("SBER"), buy("GAZP")]).await;

    // 400 shares of SBER is under one lot of 1000.
    assert!(matches!(&report.outcomes[0], SignalOutcome::BelowOneLot { .. }));
    // 2500 shares of GAZP round down to 2000.
    assert!(matches!(
        &report.outcomes[1],
        SignalOutcome::Executed { execution, .. } if execution.quantity == dec!(2000)
    ));
}

struct RejectingExecutor;

#[async_trait]
impl Executor for RejectingExecutor {
    fn name(&self) -> &'static str {
        "RejectingExecutor"
    }

    async fn execute(&mut self, order: &OrderRequest, _price: Decimal) -> execution::Result<Execution> {
        Err(execution::Error::ExecutionFailed {
            reason: format!("broker rejected {}", order.symbol),
        })
    }
}

#[tokio::test]
async fn dispatcher_failure_is_recorded_without_touching_the_portfolio() {
    let settings = Settings::default();
    let portfolio = SharedPortfolio::new(Portfolio::new(dec!(1000000), []).unwrap());
    let mut engine = Engine::new(
        Arc::new(portfolio.clone()),
        oracle(&[("SBER", dec!(250)), ("GAZP", dec!(125))]),
        Box::new(PositionLimitGate::new(settings.risk_config().unwrap())),
        Box::new(RejectingExecutor),
        settings.admission_policy().unwrap(),
        1,
    );

    let report = engine.run_cycle(&[buy("SBER"), buy("GAZP")]).await;

    assert_eq!(report.outcomes.len(), 2);
    for outcome in &report.outcomes {
        assert!(matches!(outcome, SignalOutcome::Failed { .. }), "{outcome:?}");
    }
    assert_eq!(portfolio.snapshot().await.unwrap(), Portfolio::new(dec!(1000000), []).unwrap());
}

#[tokio::test]
async fn position_review_reports_concentrated_and_losing_holdings() {
    let held = Position::new(sym("SBER"), dec!(300), dec!(250)).unwrap();
    let portfolio = SharedPortfolio::new(Portfolio::new(dec!(100000), [held]).unwrap());
    let mut engine = Engine::paper(
        &Settings::default(),
        Arc::new(portfolio),
        oracle(&[("SBER", dec!(200))]),
    )
    .unwrap();

    let report = engine.run_cycle(&[]).await;

    assert!(report.outcomes.is_empty());
    assert_eq!(
        report.alerts,
        vec![
            PositionAlert::UnrealizedLoss {
                symbol: sym("SBER"),
                loss_percent: 20.0,
                threshold_percent: 10.0,
            },
            PositionAlert::Concentration {
                symbol: sym("SBER"),
                weight_percent: 37.5,
                threshold_percent: 20.0,
            },
        ]
    );
}

#[tokio::test]
async fn position_review_sees_fills_from_the_same_cycle() {
    let mut settings = Settings::default();
    settings.trading.position_size = 0.5;
    let portfolio = SharedPortfolio::new(Portfolio::new(dec!(1000000), []).unwrap());
    let mut engine = Engine::paper(
        &settings,
        Arc::new(portfolio),
        oracle(&[("SBER", dec!(250))]),
    )
    .unwrap();

    let report = engine.run_cycle(&[buy("SBER")]).await;

    assert_eq!(report.executed_count(), 1);
    assert_eq!(report.alerts.len(), 1);
    assert!(matches!(
        &report.alerts[0],
        PositionAlert::Concentration { symbol, weight_percent, .. }
            if symbol == &sym("SBER") && *weight_percent > 49.0 && *weight_percent < 51.0
    ));
}

#[tokio::test]
async fn position_review_uses_configured_thresholds() {
    let held = Position::new(sym("SBER"), dec!(300), dec!(250)).unwrap();
    let portfolio = SharedPortfolio::new(Portfolio::new(dec!(100000), [held]).unwrap());
    let mut engine = Engine::paper(
        &Settings::default(),
        Arc::new(portfolio),
        oracle(&[("SBER", dec!(200))]),
    )
    .unwrap()
    .with_monitor(PositionMonitor::new(dec!(0.5), dec!(0.25)).unwrap());

    let report = engine.run_cycle(&[]).await;
    assert!(report.alerts.is_empty(), "{:?}", report.alerts);
}

#[tokio::test]
async fn fresh_buy_within_limits_raises_no_alerts() {
    let portfolio = SharedPortfolio::new(Portfolio::new(dec!(1000000), []).unwrap());
    let mut engine = Engine::paper(
        &Settings::default(),
        Arc::new(portfolio),
        oracle(&[("SBER", dec!(250))]),
    )
    .unwrap();

    let report = engine.run_cycle(&[buy("SBER")]).await;
    assert_eq!(report.executed_count(), 1);
    assert!(report.alerts.is_empty());
}
