use serde::{Deserialize, Serialize};

/// Direction of a trade. Stored as lowercase text (`buy` / `sell`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl TradeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeDirection::Buy => "buy",
            TradeDirection::Sell => "sell",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "buy" => Some(TradeDirection::Buy),
            "sell" => Some(TradeDirection::Sell),
            _ => None,
        }
    }
}

/// Opaque reference to an attachment in the external blob store.
/// The journal never interprets the reference, it only round-trips it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeImage {
    pub reference: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeChecklistItem {
    pub id: String,
    pub description: String,
    pub confirmed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeChecklist {
    pub items: Vec<TradeChecklistItem>,
}

impl TradeChecklist {
    /// Share of confirmed items, 0..=100. Empty checklists count as 0.
    pub fn completion_percentage(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        let confirmed = self.items.iter().filter(|i| i.confirmed).count();
        confirmed as f64 / self.items.len() as f64 * 100.0
    }
}

/// A single journaled trade. `date` is an epoch timestamp in nanoseconds,
/// UTC-anchored. The derived fields (`risk_percentage`, `risk_reward_ratio`,
/// `profit_loss`) are recomputed on every write and whenever the account
/// balance changes; they are never entered by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeEntry {
    pub id: String,
    pub date: i64,
    pub asset: String,
    pub direction: TradeDirection,

    pub entry_price: f64,
    pub exit_price: f64,
    pub position_size: f64,
    pub stop_loss: f64,
    pub take_profit: f64,

    pub risk_percentage: f64,
    pub risk_reward_ratio: f64,
    pub profit_loss: f64,

    pub notes: String,
    pub tags: Vec<String>,
    pub before_trade_image: Option<TradeImage>,
    pub after_trade_image: Option<TradeImage>,
    pub checklist: TradeChecklist,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTradeInput {
    pub date: i64,
    pub asset: String,
    pub direction: TradeDirection,
    pub entry_price: f64,
    pub exit_price: f64,
    pub position_size: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub before_trade_image: Option<TradeImage>,
    pub after_trade_image: Option<TradeImage>,
    #[serde(default)]
    pub checklist: TradeChecklist,
}

/// Partial edit payload. Absent fields keep their stored value; images are
/// replaced only when provided.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTradeInput {
    pub date: Option<i64>,
    pub asset: Option<String>,
    pub direction: Option<TradeDirection>,
    pub entry_price: Option<f64>,
    pub exit_price: Option<f64>,
    pub position_size: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub before_trade_image: Option<TradeImage>,
    pub after_trade_image: Option<TradeImage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_round_trip() {
        assert_eq!(TradeDirection::parse("buy"), Some(TradeDirection::Buy));
        assert_eq!(TradeDirection::parse("sell"), Some(TradeDirection::Sell));
        assert_eq!(TradeDirection::parse("hold"), None);
        assert_eq!(TradeDirection::Buy.as_str(), "buy");
        assert_eq!(TradeDirection::Sell.as_str(), "sell");
    }

    #[test]
    fn test_checklist_completion() {
        let empty = TradeChecklist::default();
        assert_eq!(empty.completion_percentage(), 0.0);

        let checklist = TradeChecklist {
            items: vec![
                TradeChecklistItem {
                    id: "1".to_string(),
                    description: "Checked higher timeframe".to_string(),
                    confirmed: true,
                },
                TradeChecklistItem {
                    id: "2".to_string(),
                    description: "Set alerts".to_string(),
                    confirmed: false,
                },
            ],
        };
        assert_eq!(checklist.completion_percentage(), 50.0);
    }
}
