use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{bucketing, finite_mean};
use crate::models::TradeEntry;

/// Rollup for one week or month bucket. `period` is the canonical bucket
/// key (`YYYY-Wnn` or `YYYY-MM`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodicPerformanceData {
    pub period: String,
    pub profit_loss: f64,
    pub num_trades: usize,
    /// Fraction of trades in the bucket with positive P&L, 0..1.
    pub win_rate: f64,
    /// Bucket P&L divided by the account balance; 0 when balance <= 0.
    pub percentage_return: f64,
    pub average_risk_percentage: f64,
    pub average_risk_reward_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_profit_loss: f64,
    /// Overall win rate across all trades, 0..1. This is the per-trade
    /// rate, not a mean of per-bucket win rates.
    pub average_win_rate: f64,
    pub total_trades: usize,
    /// Total P&L divided by the account balance; 0 when balance <= 0.
    pub cumulative_percentage_return: f64,
    pub weekly_performance: Vec<PeriodicPerformanceData>,
    pub monthly_performance: Vec<PeriodicPerformanceData>,
    pub average_risk_percentage: f64,
    pub average_risk_reward_ratio: f64,
}

/// Weekly and monthly rollups over the full trade history, ordered
/// chronologically, plus the global totals.
pub fn performance_summary(trades: &[TradeEntry], account_balance: f64) -> PerformanceSummary {
    let weekly = bucketed(trades, account_balance, bucketing::week_key);
    let monthly = bucketed(trades, account_balance, bucketing::month_key);

    let total_profit_loss: f64 = trades
        .iter()
        .map(|t| t.profit_loss)
        .filter(|p| p.is_finite())
        .sum();
    let wins = trades.iter().filter(|t| t.profit_loss > 0.0).count();
    let average_win_rate = if trades.is_empty() {
        0.0
    } else {
        wins as f64 / trades.len() as f64
    };

    PerformanceSummary {
        total_profit_loss,
        average_win_rate,
        total_trades: trades.len(),
        cumulative_percentage_return: percentage_return(total_profit_loss, account_balance),
        weekly_performance: weekly,
        monthly_performance: monthly,
        average_risk_percentage: finite_mean(trades.iter().map(|t| t.risk_percentage)),
        average_risk_reward_ratio: finite_mean(trades.iter().map(|t| t.risk_reward_ratio)),
    }
}

fn bucketed(
    trades: &[TradeEntry],
    account_balance: f64,
    key_fn: fn(i64) -> String,
) -> Vec<PeriodicPerformanceData> {
    // BTreeMap keeps buckets chronologically ordered: the keys are
    // fixed-width and zero-padded, so lexicographic order is time order.
    let mut buckets: BTreeMap<String, Vec<&TradeEntry>> = BTreeMap::new();
    for trade in trades {
        buckets.entry(key_fn(trade.date)).or_default().push(trade);
    }

    buckets
        .into_iter()
        .map(|(period, bucket)| {
            let profit_loss: f64 = bucket
                .iter()
                .map(|t| t.profit_loss)
                .filter(|p| p.is_finite())
                .sum();
            let wins = bucket.iter().filter(|t| t.profit_loss > 0.0).count();
            PeriodicPerformanceData {
                period,
                profit_loss,
                num_trades: bucket.len(),
                win_rate: wins as f64 / bucket.len() as f64,
                percentage_return: percentage_return(profit_loss, account_balance),
                average_risk_percentage: finite_mean(bucket.iter().map(|t| t.risk_percentage)),
                average_risk_reward_ratio: finite_mean(
                    bucket.iter().map(|t| t.risk_reward_ratio),
                ),
            }
        })
        .collect()
}

fn percentage_return(profit_loss: f64, account_balance: f64) -> f64 {
    if account_balance <= 0.0 {
        0.0
    } else {
        profit_loss / account_balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::trade_on;

    #[test]
    fn test_empty_trade_set() {
        let summary = performance_summary(&[], 10_000.0);
        assert_eq!(summary.total_profit_loss, 0.0);
        assert_eq!(summary.total_trades, 0);
        assert_eq!(summary.average_win_rate, 0.0);
        assert!(summary.weekly_performance.is_empty());
        assert!(summary.monthly_performance.is_empty());
    }

    #[test]
    fn test_weekly_and_monthly_totals_cross_check() {
        // Trades spread over two months and three weeks.
        let trades = vec![
            trade_on(2024, 2, 26, 50.0),
            trade_on(2024, 3, 1, -20.0),
            trade_on(2024, 3, 12, 80.0),
            trade_on(2024, 3, 13, 10.0),
        ];
        let summary = performance_summary(&trades, 10_000.0);
        let weekly_total: f64 = summary.weekly_performance.iter().map(|p| p.profit_loss).sum();
        let monthly_total: f64 = summary
            .monthly_performance
            .iter()
            .map(|p| p.profit_loss)
            .sum();
        assert!((weekly_total - summary.total_profit_loss).abs() < 1e-9);
        assert!((monthly_total - summary.total_profit_loss).abs() < 1e-9);
        assert_eq!(summary.monthly_performance.len(), 2);
    }

    #[test]
    fn test_buckets_are_chronological() {
        let trades = vec![
            trade_on(2024, 3, 12, 1.0),
            trade_on(2023, 12, 4, 1.0),
            trade_on(2024, 1, 8, 1.0),
        ];
        let summary = performance_summary(&trades, 1_000.0);
        let periods: Vec<&str> = summary
            .monthly_performance
            .iter()
            .map(|p| p.period.as_str())
            .collect();
        assert_eq!(periods, vec!["2023-12", "2024-01", "2024-03"]);
    }

    #[test]
    fn test_bucket_win_rate_is_per_bucket() {
        let trades = vec![
            trade_on(2024, 3, 11, 10.0),
            trade_on(2024, 3, 12, -5.0),
            trade_on(2024, 3, 13, -5.0),
            trade_on(2024, 3, 14, -5.0),
        ];
        let summary = performance_summary(&trades, 1_000.0);
        assert_eq!(summary.weekly_performance.len(), 1);
        assert_eq!(summary.weekly_performance[0].win_rate, 0.25);
        assert_eq!(summary.average_win_rate, 0.25);
        assert_eq!(summary.weekly_performance[0].num_trades, 4);
    }

    #[test]
    fn test_percentage_return_zero_guard() {
        let trades = vec![trade_on(2024, 3, 11, 100.0)];
        let summary = performance_summary(&trades, 0.0);
        assert_eq!(summary.cumulative_percentage_return, 0.0);
        assert_eq!(summary.weekly_performance[0].percentage_return, 0.0);

        let funded = performance_summary(&trades, 10_000.0);
        assert!((funded.cumulative_percentage_return - 0.01).abs() < 1e-9);
    }
}
