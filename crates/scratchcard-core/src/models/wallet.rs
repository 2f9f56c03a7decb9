use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Balance ledger for a single currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(default)]
pub struct Wallet {
    pub id: String,
    pub user_id: String,
    /// Decimal amount, kept as the API's string to avoid float rounding.
    pub balance: String,
    pub currency: String,
    pub symbol: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    /// Fields this struct does not model, kept so they are written back
    #[serde(flatten)]
    #[cfg_attr(feature = "ts", ts(skip))]
    pub extra: Map<String, Value>,
}

impl Wallet {
    pub fn display_balance(&self) -> String {
        format!("{} {}", self.symbol, self.balance)
    }
}
