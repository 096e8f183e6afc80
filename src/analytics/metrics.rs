use serde::{Deserialize, Serialize};

use crate::models::TradeDirection;

/// Inputs for the per-trade derived metrics. `account_balance` comes from
/// the profile at computation time, not from the trade itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeMetricsInput {
    pub direction: TradeDirection,
    pub entry_price: f64,
    pub exit_price: f64,
    pub position_size: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub account_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeMetrics {
    pub profit_loss: f64,
    pub risk_percentage: f64,
    pub risk_reward_ratio: f64,
}

/// Per-trade derived fields. No rounding here; formatting is a
/// presentation concern.
///
/// Zero-guards are hard invariants: a zero balance, zero position size or
/// zero stop-loss distance yields 0, never NaN or infinity. Non-finite
/// inputs are treated as 0 so bad records cannot poison aggregates.
pub fn compute_trade_metrics(input: &TradeMetricsInput) -> TradeMetrics {
    let entry = sanitize(input.entry_price);
    let exit = sanitize(input.exit_price);
    let size = sanitize(input.position_size);
    let stop = sanitize(input.stop_loss);
    let target = sanitize(input.take_profit);
    let balance = sanitize(input.account_balance);

    let profit_loss = match input.direction {
        TradeDirection::Buy => (exit - entry) * size,
        TradeDirection::Sell => (entry - exit) * size,
    };

    let stop_distance = (entry - stop).abs();

    let risk_percentage = if balance <= 0.0 || size <= 0.0 {
        0.0
    } else {
        stop_distance * size / balance * 100.0
    };

    let risk_reward_ratio = if stop_distance == 0.0 {
        0.0
    } else {
        (target - entry).abs() / stop_distance
    };

    TradeMetrics {
        profit_loss,
        risk_percentage,
        risk_reward_ratio,
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn buy_input() -> TradeMetricsInput {
        TradeMetricsInput {
            direction: TradeDirection::Buy,
            entry_price: 100.0,
            exit_price: 110.0,
            position_size: 10.0,
            stop_loss: 95.0,
            take_profit: 120.0,
            account_balance: 10_000.0,
        }
    }

    #[test]
    fn test_buy_trade_metrics() {
        let metrics = compute_trade_metrics(&buy_input());
        assert!((metrics.profit_loss - 100.0).abs() < TOLERANCE);
        assert!((metrics.risk_percentage - 0.5).abs() < TOLERANCE);
        assert!((metrics.risk_reward_ratio - 4.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_sell_trade_metrics() {
        let metrics = compute_trade_metrics(&TradeMetricsInput {
            direction: TradeDirection::Sell,
            entry_price: 100.0,
            exit_price: 90.0,
            position_size: 5.0,
            stop_loss: 105.0,
            take_profit: 80.0,
            account_balance: 10_000.0,
        });
        assert!((metrics.profit_loss - 50.0).abs() < TOLERANCE);
        assert!((metrics.risk_percentage - 0.25).abs() < TOLERANCE);
        assert!((metrics.risk_reward_ratio - 4.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_profit_sign_follows_direction() {
        let mut input = buy_input();
        input.exit_price = 90.0;
        assert!(compute_trade_metrics(&input).profit_loss < 0.0);

        input.direction = TradeDirection::Sell;
        assert!(compute_trade_metrics(&input).profit_loss > 0.0);
    }

    #[test]
    fn test_zero_balance_zeroes_risk() {
        let mut input = buy_input();
        input.account_balance = 0.0;
        assert_eq!(compute_trade_metrics(&input).risk_percentage, 0.0);

        input.account_balance = -500.0;
        assert_eq!(compute_trade_metrics(&input).risk_percentage, 0.0);
    }

    #[test]
    fn test_zero_size_zeroes_risk() {
        let mut input = buy_input();
        input.position_size = 0.0;
        assert_eq!(compute_trade_metrics(&input).risk_percentage, 0.0);
        assert_eq!(compute_trade_metrics(&input).profit_loss, 0.0);
    }

    #[test]
    fn test_rr_zero_iff_stop_at_entry() {
        let mut input = buy_input();
        input.stop_loss = 100.0;
        assert_eq!(compute_trade_metrics(&input).risk_reward_ratio, 0.0);

        input.stop_loss = 99.999;
        assert!(compute_trade_metrics(&input).risk_reward_ratio > 0.0);
    }

    #[test]
    fn test_nan_inputs_do_not_propagate() {
        let mut input = buy_input();
        input.exit_price = f64::NAN;
        input.take_profit = f64::INFINITY;
        let metrics = compute_trade_metrics(&input);
        assert!(metrics.profit_loss.is_finite());
        assert!(metrics.risk_percentage.is_finite());
        assert!(metrics.risk_reward_ratio.is_finite());
    }
}
