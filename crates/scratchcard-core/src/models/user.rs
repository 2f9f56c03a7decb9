use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{parse_timestamp, InviteCode, Wallet};

/// The authenticated identity as returned by the authentication API.
///
/// Monetary totals are decimal strings and timestamps are the API's own
/// strings. The struct is stored under the `user` storage key and must
/// write back what it read: missing fields take defaults, contact fields
/// may be null, and unknown fields land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(default)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// National tax id.
    pub cpf: Option<String>,
    pub username: String,
    pub full_name: String,
    pub is_admin: bool,
    pub total_scratch_cards: i64,
    pub total_wins: i64,
    pub total_losses: i64,
    pub total_deposits: String,
    pub total_withdrawals: String,
    pub created_at: String,
    pub updated_at: String,
    pub wallet: Vec<Wallet>,
    pub invite_code: InviteCode,
    #[serde(flatten)]
    #[cfg_attr(feature = "ts", ts(skip))]
    pub extra: Map<String, Value>,
}

impl User {
    /// Find the wallet for a currency code (case-insensitive)
    pub fn wallet_for(&self, currency: &str) -> Option<&Wallet> {
        self.wallet
            .iter()
            .find(|w| w.currency.eq_ignore_ascii_case(currency))
    }

    pub fn active_wallets(&self) -> impl Iterator<Item = &Wallet> {
        self.wallet.iter().filter(|w| w.is_active)
    }

    pub fn member_since(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }

    /// Name to show in the UI: full name, falling back to username
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}
