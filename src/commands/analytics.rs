//! Query surface for the derived summaries. Each call re-reads the full
//! trade set and recomputes from scratch, so every summary reflects the
//! latest mutations with zero staleness.

use chrono::Utc;

use crate::analytics::{
    calendar, ftmo, goals, homepage, periodic, CalendarDayPerformance, FtmoAnalytics,
    HomepageSummaryMetrics, PerformanceGoalsSummary, PerformanceSummary,
};
use crate::commands::{profile, trades};
use crate::db::Database;
use crate::error::JournalError;
use crate::models::{TradeEntry, UserProfile};

fn now_ns() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

fn snapshot(db: &Database) -> Result<(Vec<TradeEntry>, UserProfile), JournalError> {
    let trades = trades::get_trades(db)?;
    // A missing profile degrades to zeroed balance-dependent metrics
    // rather than an error.
    let profile = profile::get_profile(db)?.unwrap_or_default();
    Ok((trades, profile))
}

pub fn get_calendar_performance(
    db: &Database,
    month: u32,
    year: i32,
) -> Result<Vec<CalendarDayPerformance>, JournalError> {
    let trades = trades::get_trades(db)?;
    Ok(calendar::calendar_performance(&trades, month, year))
}

pub fn get_trades_for_day(
    db: &Database,
    day: u32,
    month: u32,
    year: i32,
) -> Result<Vec<TradeEntry>, JournalError> {
    let trades = trades::get_trades(db)?;
    Ok(calendar::trades_for_day(&trades, day, month, year))
}

pub fn get_performance_summary(db: &Database) -> Result<PerformanceSummary, JournalError> {
    let (trades, profile) = snapshot(db)?;
    Ok(periodic::performance_summary(&trades, profile.account_balance))
}

pub fn get_ftmo_analytics(db: &Database) -> Result<FtmoAnalytics, JournalError> {
    let (trades, profile) = snapshot(db)?;
    Ok(ftmo::ftmo_analytics(&trades, profile.account_balance))
}

pub fn get_performance_goals_summary(
    db: &Database,
) -> Result<PerformanceGoalsSummary, JournalError> {
    let (trades, profile) = snapshot(db)?;
    Ok(goals::performance_goals_summary(&trades, &profile, now_ns()))
}

pub fn get_homepage_summary(db: &Database) -> Result<HomepageSummaryMetrics, JournalError> {
    let (trades, profile) = snapshot(db)?;
    Ok(homepage::homepage_summary(
        &trades,
        profile.account_balance,
        now_ns(),
    ))
}

/// Total P&L as a percentage of the account balance; 0 without a funded
/// profile.
pub fn percentage_profit_loss(db: &Database) -> Result<f64, JournalError> {
    let (trades, profile) = snapshot(db)?;
    if profile.account_balance <= 0.0 {
        return Ok(0.0);
    }
    let total: f64 = trades
        .iter()
        .map(|t| t.profit_loss)
        .filter(|p| p.is_finite())
        .sum();
    Ok(total / profile.account_balance * 100.0)
}
