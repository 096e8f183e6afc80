//! Pure analytics over a snapshot of the trade list and profile.
//!
//! Nothing in this module touches the database or mutates its inputs;
//! every summary is recomputed from scratch on each call, so callers never
//! see stale derived data after a trade mutation.

pub mod bucketing;
pub mod calendar;
pub mod ftmo;
pub mod goals;
pub mod homepage;
pub mod metrics;
pub mod periodic;

pub use calendar::{CalendarDayPerformance, CalendarDayStatus};
pub use ftmo::FtmoAnalytics;
pub use goals::{
    AchievementBadge, AchievementBadgeStatus, GoalStatus, PerformanceGoalsSummary,
};
pub use homepage::{HomepageSummaryMetrics, WeekPerformanceChange};
pub use metrics::{TradeMetrics, TradeMetricsInput};
pub use periodic::{PeriodicPerformanceData, PerformanceSummary};

/// Mean over finite values only; 0 for an empty (or all-NaN) input.
/// Aggregates must never surface NaN or infinity.
pub(crate) fn finite_mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        if v.is_finite() {
            sum += v;
            count += 1;
        }
    }
    if count == 0 { 0.0 } else { sum / count as f64 }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use crate::models::{TradeChecklist, TradeDirection, TradeEntry};

    pub fn ns_at_noon(year: i32, month: u32, day: u32) -> i64 {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_nanos_opt()
            .unwrap()
    }

    pub fn trade_at(date_ns: i64, profit_loss: f64) -> TradeEntry {
        TradeEntry {
            id: format!("TRADE-{date_ns}"),
            date: date_ns,
            asset: "EURUSD".to_string(),
            direction: TradeDirection::Buy,
            entry_price: 100.0,
            exit_price: 100.0 + profit_loss,
            position_size: 1.0,
            stop_loss: 95.0,
            take_profit: 110.0,
            risk_percentage: 0.5,
            risk_reward_ratio: 2.0,
            profit_loss,
            notes: String::new(),
            tags: Vec::new(),
            before_trade_image: None,
            after_trade_image: None,
            checklist: TradeChecklist::default(),
        }
    }

    pub fn trade_on(year: i32, month: u32, day: u32, profit_loss: f64) -> TradeEntry {
        trade_at(ns_at_noon(year, month, day), profit_loss)
    }
}
