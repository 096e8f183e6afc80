use serde::{Deserialize, Serialize};

/// User-defined performance targets. `max_drawdown_limit` is a fraction of
/// peak equity in 0..1; a value of 0 disables the corresponding signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceGoals {
    pub monthly_profit_goal: f64,
    pub weekly_profit_target: f64,
    pub max_drawdown_limit: f64,
}

/// Single-row profile for the journal owner. Identity is handled outside
/// this crate; one profile exists per database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub account_balance: f64,
    pub currency: String,
    pub performance_goals: PerformanceGoals,
}
