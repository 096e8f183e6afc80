use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ftmo::{self, FtmoAnalytics};
use super::{bucketing, finite_mean};
use crate::models::TradeEntry;

/// Number of points retained in the mini equity curve.
pub const MINI_EQUITY_CURVE_POINTS: usize = 30;

/// Current week's P&L against the previous week's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekPerformanceChange {
    pub profit_loss: f64,
    /// (current - previous) / |previous|; 0 when the previous week is flat.
    pub percentage_change: f64,
    pub comparison_to_previous_week: f64,
    /// `[start, end)` of the current week in epoch nanoseconds.
    pub week_range: (i64, i64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomepageSummaryMetrics {
    pub total_profit_loss: f64,
    /// Overall win rate across all trades, 0..1.
    pub win_rate: f64,
    pub last_week_change: WeekPerformanceChange,
    /// Cumulative P&L per trading day, most recent days last.
    pub mini_equity_curve: Vec<f64>,
    pub ftmo_analytics: FtmoAnalytics,
    pub average_risk_percentage: f64,
    pub average_risk_reward_ratio: f64,
}

pub fn homepage_summary(
    trades: &[TradeEntry],
    account_balance: f64,
    now_ns: i64,
) -> HomepageSummaryMetrics {
    let total_profit_loss: f64 = trades
        .iter()
        .map(|t| t.profit_loss)
        .filter(|p| p.is_finite())
        .sum();
    let wins = trades.iter().filter(|t| t.profit_loss > 0.0).count();
    let win_rate = if trades.is_empty() {
        0.0
    } else {
        wins as f64 / trades.len() as f64
    };

    HomepageSummaryMetrics {
        total_profit_loss,
        win_rate,
        last_week_change: week_change(trades, now_ns),
        mini_equity_curve: mini_equity_curve(trades),
        ftmo_analytics: ftmo::ftmo_analytics(trades, account_balance),
        average_risk_percentage: finite_mean(trades.iter().map(|t| t.risk_percentage)),
        average_risk_reward_ratio: finite_mean(trades.iter().map(|t| t.risk_reward_ratio)),
    }
}

fn week_change(trades: &[TradeEntry], now_ns: i64) -> WeekPerformanceChange {
    let (start, end) = bucketing::week_bounds_ns(now_ns);
    let week_len = end - start;

    let sum_range = |from: i64, to: i64| -> f64 {
        trades
            .iter()
            .filter(|t| t.date >= from && t.date < to)
            .map(|t| t.profit_loss)
            .filter(|p| p.is_finite())
            .sum()
    };

    let current = sum_range(start, end);
    let previous = sum_range(start - week_len, start);

    let percentage_change = if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous.abs()
    };

    WeekPerformanceChange {
        profit_loss: current,
        percentage_change,
        comparison_to_previous_week: current - previous,
        week_range: (start, end),
    }
}

/// Cumulative P&L sampled once per trading day, capped to the most recent
/// [`MINI_EQUITY_CURVE_POINTS`] days.
fn mini_equity_curve(trades: &[TradeEntry]) -> Vec<f64> {
    let mut daily: BTreeMap<String, f64> = BTreeMap::new();
    for trade in trades {
        if trade.profit_loss.is_finite() {
            *daily.entry(bucketing::day_key(trade.date)).or_insert(0.0) += trade.profit_loss;
        }
    }

    let mut cumulative = 0.0;
    let curve: Vec<f64> = daily
        .into_values()
        .map(|daily_pnl| {
            cumulative += daily_pnl;
            cumulative
        })
        .collect();

    if curve.len() > MINI_EQUITY_CURVE_POINTS {
        curve[curve.len() - MINI_EQUITY_CURVE_POINTS..].to_vec()
    } else {
        curve
    }
}
