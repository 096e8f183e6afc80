//! Goal evaluation and achievement badges.
//!
//! Everything here is a pure function of the trade snapshot, the profile
//! and an explicit `now_ns` anchor. Badges are ephemeral: they are derived
//! by comparing the current snapshot against the snapshot without the most
//! recent trade, so a badge disappears once the underlying transition is
//! no longer the latest notable event.

use serde::{Deserialize, Serialize};

use super::bucketing;
use crate::models::{PerformanceGoals, TradeEntry, UserProfile};

/// Progress at or above this multiple of the target is classified as
/// over-target ("too aggressive" for the period).
pub const OVER_TARGET_CEILING: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GoalStatus {
    OnTrack,
    OverTarget,
    UnderTarget,
    AtLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AchievementBadgeStatus {
    TargetReached,
    Milestone,
    GoalAchieved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementBadge {
    pub title: String,
    pub status: AchievementBadgeStatus,
    pub description: String,
    /// Epoch nanoseconds of the trade that triggered the badge.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceGoalsSummary {
    pub monthly_profit_goal: f64,
    /// Current-month profit over the monthly goal; 0 when the goal is 0.
    pub monthly_profit_progress: f64,
    pub weekly_profit_target: f64,
    pub current_week_profit: f64,
    /// Current-week profit over the weekly target; 0 when the target is 0.
    pub weekly_progress: f64,
    pub weekly_goal_status: GoalStatus,
    pub max_drawdown_limit: f64,
    /// Largest peak-to-trough equity decline as a fraction of the peak.
    pub current_drawdown: f64,
    pub goal_status: GoalStatus,
    pub achievement_badge: Option<AchievementBadge>,
}

pub fn performance_goals_summary(
    trades: &[TradeEntry],
    profile: &UserProfile,
    now_ns: i64,
) -> PerformanceGoalsSummary {
    let goals = &profile.performance_goals;
    let current = GoalsSnapshot::compute(trades, goals, profile.account_balance, now_ns);
    let badge = detect_badge(trades, goals, profile.account_balance, now_ns, &current);

    let drawdown_breached =
        goals.max_drawdown_limit > 0.0 && current.drawdown >= goals.max_drawdown_limit;

    let weekly_goal_status = if drawdown_breached {
        GoalStatus::AtLimit
    } else {
        classify_progress(current.weekly_progress, goals.weekly_profit_target)
    };

    // Precedence: drawdown breach, then monthly shortfall, then weekly.
    let goal_status = if drawdown_breached {
        GoalStatus::AtLimit
    } else if classify_progress(current.monthly_progress, goals.monthly_profit_goal)
        == GoalStatus::UnderTarget
    {
        GoalStatus::UnderTarget
    } else {
        weekly_goal_status
    };

    PerformanceGoalsSummary {
        monthly_profit_goal: goals.monthly_profit_goal,
        monthly_profit_progress: current.monthly_progress,
        weekly_profit_target: goals.weekly_profit_target,
        current_week_profit: current.week_profit,
        weekly_progress: current.weekly_progress,
        weekly_goal_status,
        max_drawdown_limit: goals.max_drawdown_limit,
        current_drawdown: current.drawdown,
        goal_status,
        achievement_badge: badge,
    }
}

/// Equity-curve state plus period progress, computed from one snapshot of
/// the trade list.
#[derive(Debug, Clone)]
struct GoalsSnapshot {
    week_profit: f64,
    weekly_progress: f64,
    monthly_progress: f64,
    drawdown: f64,
    final_equity: f64,
    peak_equity: f64,
}

impl GoalsSnapshot {
    fn compute(
        trades: &[TradeEntry],
        goals: &PerformanceGoals,
        account_balance: f64,
        now_ns: i64,
    ) -> Self {
        let week = bucketing::week_key(now_ns);
        let month = bucketing::month_key(now_ns);

        let week_profit = period_profit(trades, |ns| bucketing::week_key(ns) == week);
        let month_profit = period_profit(trades, |ns| bucketing::month_key(ns) == month);

        let (drawdown, final_equity, peak_equity) = walk_equity(trades, account_balance);

        GoalsSnapshot {
            week_profit,
            weekly_progress: progress(week_profit, goals.weekly_profit_target),
            monthly_progress: progress(month_profit, goals.monthly_profit_goal),
            drawdown,
            final_equity,
            peak_equity,
        }
    }
}

fn period_profit(trades: &[TradeEntry], in_period: impl Fn(i64) -> bool) -> f64 {
    trades
        .iter()
        .filter(|t| in_period(t.date))
        .map(|t| t.profit_loss)
        .filter(|p| p.is_finite())
        .sum()
}

fn progress(profit: f64, target: f64) -> f64 {
    if target <= 0.0 { 0.0 } else { profit / target }
}

/// Status from a progress fraction alone. A target of 0 disables the
/// signal. Thresholds: negative progress is under target, at or above
/// [`OVER_TARGET_CEILING`] is over target, anything in between is on track.
fn classify_progress(progress: f64, target: f64) -> GoalStatus {
    if target <= 0.0 {
        GoalStatus::OnTrack
    } else if progress < 0.0 {
        GoalStatus::UnderTarget
    } else if progress >= OVER_TARGET_CEILING {
        GoalStatus::OverTarget
    } else {
        GoalStatus::OnTrack
    }
}

/// Walk the chronologically sorted equity curve tracking the running peak.
/// Returns (max drawdown fraction, final equity, peak equity). The curve
/// starts at the account balance; a non-positive balance starts at 0 and
/// the drawdown stays 0 until the peak turns positive.
fn walk_equity(trades: &[TradeEntry], account_balance: f64) -> (f64, f64, f64) {
    let mut sorted: Vec<&TradeEntry> = trades.iter().collect();
    sorted.sort_by_key(|t| t.date);

    let mut equity = account_balance.max(0.0);
    let mut peak = equity;
    let mut max_drawdown: f64 = 0.0;

    for trade in sorted {
        if trade.profit_loss.is_finite() {
            equity += trade.profit_loss;
        }
        if equity > peak {
            peak = equity;
        } else if peak > 0.0 {
            max_drawdown = max_drawdown.max((peak - equity) / peak);
        }
    }

    (max_drawdown, equity, peak)
}

/// Badge for the transition caused by the most recent trade, if any.
/// Recomputes the snapshot without that trade and compares. Precedence:
/// monthly goal achieved, then weekly target reached, then a new equity
/// high milestone. At most one badge is surfaced.
fn detect_badge(
    trades: &[TradeEntry],
    goals: &PerformanceGoals,
    account_balance: f64,
    now_ns: i64,
    current: &GoalsSnapshot,
) -> Option<AchievementBadge> {
    let latest_idx = trades
        .iter()
        .enumerate()
        .max_by_key(|(_, t)| t.date)
        .map(|(i, _)| i)?;
    let latest = &trades[latest_idx];

    let mut previous_trades: Vec<TradeEntry> = trades.to_vec();
    previous_trades.remove(latest_idx);
    let previous =
        GoalsSnapshot::compute(&previous_trades, goals, account_balance, now_ns);

    if goals.monthly_profit_goal > 0.0
        && current.monthly_progress >= 1.0
        && previous.monthly_progress < 1.0
    {
        return Some(AchievementBadge {
            title: "Monthly Goal Achieved".to_string(),
            status: AchievementBadgeStatus::GoalAchieved,
            description: format!(
                "Reached {:.0}% of your monthly profit goal",
                current.monthly_progress * 100.0
            ),
            timestamp: latest.date,
        });
    }

    if goals.weekly_profit_target > 0.0
        && current.weekly_progress >= 1.0
        && previous.weekly_progress < 1.0
    {
        return Some(AchievementBadge {
            title: "Weekly Target Reached".to_string(),
            status: AchievementBadgeStatus::TargetReached,
            description: format!(
                "Reached {:.0}% of your weekly profit target",
                current.weekly_progress * 100.0
            ),
            timestamp: latest.date,
        });
    }

    if latest.profit_loss > 0.0 && current.final_equity > previous.peak_equity {
        return Some(AchievementBadge {
            title: "New Equity High".to_string(),
            status: AchievementBadgeStatus::Milestone,
            description: "Your account equity reached a new all-time high".to_string(),
            timestamp: latest.date,
        });
    }

    None
}
