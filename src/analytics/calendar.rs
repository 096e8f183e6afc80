use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{bucketing, finite_mean};
use crate::models::TradeEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarDayStatus {
    Profit,
    Loss,
    Neutral,
}

/// One calendar day with at least one trade. Days without trades are never
/// emitted; the rendering layer fills the gaps in the month grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarDayPerformance {
    pub day: u32,
    pub total_profit_loss: f64,
    pub trades: Vec<TradeEntry>,
    pub average_risk_percentage: f64,
    pub average_risk_reward_ratio: f64,
    pub status: CalendarDayStatus,
}

/// Per-day performance for the given UTC month/year, ascending by day.
/// Deterministic for a given trade set; recomputed on every call.
pub fn calendar_performance(
    trades: &[TradeEntry],
    month: u32,
    year: i32,
) -> Vec<CalendarDayPerformance> {
    let mut days: BTreeMap<u32, Vec<&TradeEntry>> = BTreeMap::new();
    for trade in trades {
        if let Some(day) = bucketing::day_of_month_in(trade.date, month, year) {
            days.entry(day).or_default().push(trade);
        }
    }

    days.into_iter()
        .map(|(day, day_trades)| {
            let total: f64 = day_trades
                .iter()
                .map(|t| t.profit_loss)
                .filter(|p| p.is_finite())
                .sum();
            let status = if total > 0.0 {
                CalendarDayStatus::Profit
            } else if total < 0.0 {
                CalendarDayStatus::Loss
            } else {
                CalendarDayStatus::Neutral
            };
            CalendarDayPerformance {
                day,
                total_profit_loss: total,
                average_risk_percentage: finite_mean(
                    day_trades.iter().map(|t| t.risk_percentage),
                ),
                average_risk_reward_ratio: finite_mean(
                    day_trades.iter().map(|t| t.risk_reward_ratio),
                ),
                status,
                trades: day_trades.into_iter().cloned().collect(),
            }
        })
        .collect()
}

/// All trades whose UTC calendar day matches (day, month, year).
pub fn trades_for_day(trades: &[TradeEntry], day: u32, month: u32, year: i32) -> Vec<TradeEntry> {
    trades
        .iter()
        .filter(|t| bucketing::day_of_month_in(t.date, month, year) == Some(day))
        .cloned()
        .collect()
}
