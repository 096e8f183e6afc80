use chrono::Utc;
use rusqlite::Connection;

use crate::analytics::metrics::{compute_trade_metrics, TradeMetricsInput};
use crate::analytics::PerformanceGoalsSummary;
use crate::commands::{analytics, profile};
use crate::db::Database;
use crate::error::JournalError;
use crate::models::{
    CreateTradeInput, TradeChecklist, TradeDirection, TradeEntry, TradeImage, UpdateTradeInput,
};
use serde::{Deserialize, Serialize};

/// Result of adding a trade: the stored entry plus the refreshed goals
/// summary, so callers never render a stale goal state after a mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTradeResult {
    pub trade: TradeEntry,
    pub updated_goals: PerformanceGoalsSummary,
}

const TRADE_COLUMNS: &str = "id, date, asset, direction, entry_price, exit_price, position_size, \
     stop_loss, take_profit, risk_percentage, risk_reward_ratio, profit_loss, notes, tags, \
     before_trade_image, after_trade_image, checklist";

fn json_error(idx: usize, err: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

/// Map a database row (in [`TRADE_COLUMNS`] order) to a TradeEntry.
fn map_row_to_trade(row: &rusqlite::Row) -> rusqlite::Result<TradeEntry> {
    let direction_text: String = row.get(3)?;
    let direction = TradeDirection::parse(&direction_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown trade direction: {direction_text}").into(),
        )
    })?;

    let tags_json: String = row.get(13)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).map_err(|e| json_error(13, e))?;

    let before_json: Option<String> = row.get(14)?;
    let before_trade_image: Option<TradeImage> = before_json
        .map(|j| serde_json::from_str(&j))
        .transpose()
        .map_err(|e| json_error(14, e))?;

    let after_json: Option<String> = row.get(15)?;
    let after_trade_image: Option<TradeImage> = after_json
        .map(|j| serde_json::from_str(&j))
        .transpose()
        .map_err(|e| json_error(15, e))?;

    let checklist_json: String = row.get(16)?;
    let checklist: TradeChecklist =
        serde_json::from_str(&checklist_json).map_err(|e| json_error(16, e))?;

    Ok(TradeEntry {
        id: row.get(0)?,
        date: row.get(1)?,
        asset: row.get(2)?,
        direction,
        entry_price: row.get(4)?,
        exit_price: row.get(5)?,
        position_size: row.get(6)?,
        stop_loss: row.get(7)?,
        take_profit: row.get(8)?,
        risk_percentage: row.get(9)?,
        risk_reward_ratio: row.get(10)?,
        profit_loss: row.get(11)?,
        notes: row.get(12)?,
        tags,
        before_trade_image,
        after_trade_image,
        checklist,
    })
}

/// The full unpaginated trade set, newest first. Analytics always consume
/// this complete set.
pub fn get_trades(db: &Database) -> Result<Vec<TradeEntry>, JournalError> {
    let conn = db.conn.lock().map_err(|e| JournalError::Database(e.to_string()))?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {TRADE_COLUMNS} FROM trades ORDER BY date DESC"
    ))?;
    let trades = stmt
        .query_map([], map_row_to_trade)?
        .collect::<rusqlite::Result<Vec<TradeEntry>>>()?;
    Ok(trades)
}

pub fn get_trade(db: &Database, id: &str) -> Result<TradeEntry, JournalError> {
    let conn = db.conn.lock().map_err(|e| JournalError::Database(e.to_string()))?;

    conn.query_row(
        &format!("SELECT {TRADE_COLUMNS} FROM trades WHERE id = ?"),
        [id],
        map_row_to_trade,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => JournalError::TradeNotFound(id.to_string()),
        other => other.into(),
    })
}

pub fn add_trade(db: &Database, input: CreateTradeInput) -> Result<AddTradeResult, JournalError> {
    let balance = profile::get_profile(db)?
        .map(|p| p.account_balance)
        .unwrap_or(0.0);

    let metrics = compute_trade_metrics(&TradeMetricsInput {
        direction: input.direction,
        entry_price: input.entry_price,
        exit_price: input.exit_price,
        position_size: input.position_size,
        stop_loss: input.stop_loss,
        take_profit: input.take_profit,
        account_balance: balance,
    });

    let id = format!("TRADE-{}-{}", Utc::now().timestamp_millis(), uuid::Uuid::new_v4());
    let now = Utc::now().timestamp();

    {
        let conn = db.conn.lock().map_err(|e| JournalError::Database(e.to_string()))?;
        conn.execute(
            "INSERT INTO trades (
                id, date, asset, direction, entry_price, exit_price, position_size,
                stop_loss, take_profit, risk_percentage, risk_reward_ratio, profit_loss,
                notes, tags, before_trade_image, after_trade_image, checklist,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                id,
                input.date,
                input.asset,
                input.direction.as_str(),
                input.entry_price,
                input.exit_price,
                input.position_size,
                input.stop_loss,
                input.take_profit,
                metrics.risk_percentage,
                metrics.risk_reward_ratio,
                metrics.profit_loss,
                input.notes,
                serde_json::to_string(&input.tags)?,
                input
                    .before_trade_image
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?,
                input
                    .after_trade_image
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?,
                serde_json::to_string(&input.checklist)?,
                now,
                now
            ],
        )?;
    }

    let trade = get_trade(db, &id)?;
    let updated_goals = analytics::get_performance_goals_summary(db)?;
    Ok(AddTradeResult {
        trade,
        updated_goals,
    })
}

/// Apply a partial edit, then recompute the derived metrics from the
/// merged fields and the current balance.
pub fn edit_trade(
    db: &Database,
    id: &str,
    update: UpdateTradeInput,
) -> Result<TradeEntry, JournalError> {
    let mut trade = get_trade(db, id)?;

    if let Some(date) = update.date {
        trade.date = date;
    }
    if let Some(asset) = update.asset {
        trade.asset = asset;
    }
    if let Some(direction) = update.direction {
        trade.direction = direction;
    }
    if let Some(entry_price) = update.entry_price {
        trade.entry_price = entry_price;
    }
    if let Some(exit_price) = update.exit_price {
        trade.exit_price = exit_price;
    }
    if let Some(position_size) = update.position_size {
        trade.position_size = position_size;
    }
    if let Some(stop_loss) = update.stop_loss {
        trade.stop_loss = stop_loss;
    }
    if let Some(take_profit) = update.take_profit {
        trade.take_profit = take_profit;
    }
    if let Some(notes) = update.notes {
        trade.notes = notes;
    }
    if let Some(tags) = update.tags {
        trade.tags = tags;
    }
    if update.before_trade_image.is_some() {
        trade.before_trade_image = update.before_trade_image;
    }
    if update.after_trade_image.is_some() {
        trade.after_trade_image = update.after_trade_image;
    }

    let balance = profile::get_profile(db)?
        .map(|p| p.account_balance)
        .unwrap_or(0.0);
    let metrics = compute_trade_metrics(&TradeMetricsInput {
        direction: trade.direction,
        entry_price: trade.entry_price,
        exit_price: trade.exit_price,
        position_size: trade.position_size,
        stop_loss: trade.stop_loss,
        take_profit: trade.take_profit,
        account_balance: balance,
    });
    trade.risk_percentage = metrics.risk_percentage;
    trade.risk_reward_ratio = metrics.risk_reward_ratio;
    trade.profit_loss = metrics.profit_loss;

    {
        let conn = db.conn.lock().map_err(|e| JournalError::Database(e.to_string()))?;
        conn.execute(
            "UPDATE trades SET
                date = ?, asset = ?, direction = ?, entry_price = ?, exit_price = ?,
                position_size = ?, stop_loss = ?, take_profit = ?, risk_percentage = ?,
                risk_reward_ratio = ?, profit_loss = ?, notes = ?, tags = ?,
                before_trade_image = ?, after_trade_image = ?, updated_at = ?
             WHERE id = ?",
            rusqlite::params![
                trade.date,
                trade.asset,
                trade.direction.as_str(),
                trade.entry_price,
                trade.exit_price,
                trade.position_size,
                trade.stop_loss,
                trade.take_profit,
                trade.risk_percentage,
                trade.risk_reward_ratio,
                trade.profit_loss,
                trade.notes,
                serde_json::to_string(&trade.tags)?,
                trade
                    .before_trade_image
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?,
                trade
                    .after_trade_image
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?,
                Utc::now().timestamp(),
                id
            ],
        )?;
    }

    get_trade(db, id)
}

pub fn update_trade_checklist(
    db: &Database,
    id: &str,
    checklist: TradeChecklist,
) -> Result<TradeEntry, JournalError> {
    {
        let conn = db.conn.lock().map_err(|e| JournalError::Database(e.to_string()))?;
        let changed = conn.execute(
            "UPDATE trades SET checklist = ?, updated_at = ? WHERE id = ?",
            rusqlite::params![
                serde_json::to_string(&checklist)?,
                Utc::now().timestamp(),
                id
            ],
        )?;
        if changed == 0 {
            return Err(JournalError::TradeNotFound(id.to_string()));
        }
    }
    get_trade(db, id)
}

/// Delete a trade and return the refreshed goals summary.
pub fn delete_trade(db: &Database, id: &str) -> Result<PerformanceGoalsSummary, JournalError> {
    {
        let conn = db.conn.lock().map_err(|e| JournalError::Database(e.to_string()))?;
        let deleted = conn.execute("DELETE FROM trades WHERE id = ?", [id])?;
        if deleted == 0 {
            return Err(JournalError::TradeNotFound(id.to_string()));
        }
    }
    analytics::get_performance_goals_summary(db)
}

/// Recompute every trade's stored derived metrics against `balance`.
/// Called when the account balance changes; returns the number of trades
/// touched.
pub(crate) fn recompute_derived_metrics(
    conn: &Connection,
    balance: f64,
) -> Result<usize, JournalError> {
    let mut stmt = conn.prepare(
        "SELECT id, direction, entry_price, exit_price, position_size, stop_loss, take_profit
         FROM trades",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, f64>(6)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut update = conn.prepare(
        "UPDATE trades SET risk_percentage = ?, risk_reward_ratio = ?, profit_loss = ?
         WHERE id = ?",
    )?;

    let mut touched = 0;
    for (id, direction_text, entry, exit, size, stop, target) in rows {
        let direction = TradeDirection::parse(&direction_text).unwrap_or(TradeDirection::Buy);
        let metrics = compute_trade_metrics(&TradeMetricsInput {
            direction,
            entry_price: entry,
            exit_price: exit,
            position_size: size,
            stop_loss: stop,
            take_profit: target,
            account_balance: balance,
        });
        touched += update.execute(rusqlite::params![
            metrics.risk_percentage,
            metrics.risk_reward_ratio,
            metrics.profit_loss,
            id
        ])?;
    }

    Ok(touched)
}
