use chrono::Utc;

use crate::commands::trades;
use crate::db::Database;
use crate::error::JournalError;
use crate::models::{PerformanceGoals, UserProfile};

pub fn get_profile(db: &Database) -> Result<Option<UserProfile>, JournalError> {
    let conn = db.conn.lock().map_err(|e| JournalError::Database(e.to_string()))?;

    let profile = conn
        .query_row(
            "SELECT name, account_balance, currency, monthly_profit_goal,
                    weekly_profit_target, max_drawdown_limit
             FROM profile WHERE id = 1",
            [],
            |row| {
                Ok(UserProfile {
                    name: row.get(0)?,
                    account_balance: row.get(1)?,
                    currency: row.get(2)?,
                    performance_goals: PerformanceGoals {
                        monthly_profit_goal: row.get(3)?,
                        weekly_profit_target: row.get(4)?,
                        max_drawdown_limit: row.get(5)?,
                    },
                })
            },
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;

    Ok(profile)
}

/// Upsert the single profile row. A balance change invalidates every stored
/// derived metric, so all trades are recomputed before returning.
pub fn save_profile(db: &Database, profile: &UserProfile) -> Result<UserProfile, JournalError> {
    {
        let conn = db.conn.lock().map_err(|e| JournalError::Database(e.to_string()))?;
        let now = Utc::now().timestamp();

        conn.execute(
            "INSERT INTO profile (
                id, name, account_balance, currency, monthly_profit_goal,
                weekly_profit_target, max_drawdown_limit, created_at, updated_at
            ) VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                account_balance = excluded.account_balance,
                currency = excluded.currency,
                monthly_profit_goal = excluded.monthly_profit_goal,
                weekly_profit_target = excluded.weekly_profit_target,
                max_drawdown_limit = excluded.max_drawdown_limit,
                updated_at = excluded.updated_at",
            rusqlite::params![
                profile.name,
                profile.account_balance,
                profile.currency,
                profile.performance_goals.monthly_profit_goal,
                profile.performance_goals.weekly_profit_target,
                profile.performance_goals.max_drawdown_limit,
                now,
                now
            ],
        )?;

        let touched = trades::recompute_derived_metrics(&conn, profile.account_balance)?;
        if touched > 0 {
            log::info!("Recomputed derived metrics for {} trades", touched);
        }
    }

    get_profile(db)?.ok_or_else(|| JournalError::Database("profile row missing after save".into()))
}
