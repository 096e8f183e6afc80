//! FTMO-style evaluation: fixed prop-firm thresholds, not user knobs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{bucketing, finite_mean};
use crate::models::TradeEntry;

/// Daily loss cap as a fraction of the account balance.
pub const DAILY_LOSS_CAP: f64 = 0.05;
/// Profit target as a fraction of the account balance.
pub const PROFIT_TARGET: f64 = 0.10;
/// Maximum allowed consistency rate (variance / |mean| of daily P&L).
pub const CONSISTENCY_CEILING: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtmoAnalytics {
    /// Worst single-day P&L (0 when there are no trades). Positive when
    /// every trading day closed green.
    pub max_daily_loss: f64,
    pub max_daily_profit: f64,
    /// Total P&L over the 10% profit target; dimensionless, can exceed 1.
    pub profit_target_progress: f64,
    /// Sample variance of daily P&L over |mean|; 0 with fewer than two
    /// trading days or a zero mean.
    pub consistency_rate: f64,
    pub average_risk_percentage: f64,
    pub average_risk_reward_ratio: f64,
    pub overall_compliance: bool,
}

pub fn ftmo_analytics(trades: &[TradeEntry], account_balance: f64) -> FtmoAnalytics {
    let mut daily: BTreeMap<String, f64> = BTreeMap::new();
    for trade in trades {
        if trade.profit_loss.is_finite() {
            *daily.entry(bucketing::day_key(trade.date)).or_insert(0.0) += trade.profit_loss;
        }
    }
    let daily_totals: Vec<f64> = daily.into_values().collect();

    let max_daily_loss = daily_totals.iter().copied().fold(f64::INFINITY, f64::min);
    let max_daily_loss = if max_daily_loss.is_finite() { max_daily_loss } else { 0.0 };
    let max_daily_profit = daily_totals
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let max_daily_profit = if max_daily_profit.is_finite() { max_daily_profit } else { 0.0 };

    let total_profit_loss: f64 = daily_totals.iter().sum();
    let profit_target_progress = if account_balance <= 0.0 {
        0.0
    } else {
        total_profit_loss / (account_balance * PROFIT_TARGET)
    };

    let consistency_rate = consistency(&daily_totals);

    let overall_compliance = max_daily_loss >= -DAILY_LOSS_CAP * account_balance
        && profit_target_progress >= 1.0
        && consistency_rate <= CONSISTENCY_CEILING;

    FtmoAnalytics {
        max_daily_loss,
        max_daily_profit,
        profit_target_progress,
        consistency_rate,
        average_risk_percentage: finite_mean(trades.iter().map(|t| t.risk_percentage)),
        average_risk_reward_ratio: finite_mean(trades.iter().map(|t| t.risk_reward_ratio)),
        overall_compliance,
    }
}

fn consistency(daily_totals: &[f64]) -> f64 {
    if daily_totals.len() < 2 {
        return 0.0;
    }
    let mean = daily_totals.iter().sum::<f64>() / daily_totals.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = daily_totals
        .iter()
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / (daily_totals.len() - 1) as f64;
    variance / mean.abs()
}
