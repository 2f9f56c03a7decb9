use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(default)]
pub struct InviteCode {
    pub id: String,
    pub user_id: String,
    pub code: String,
    pub commission_rate: String,
    pub total_invites: i64,
    pub total_commission: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    #[serde(flatten)]
    #[cfg_attr(feature = "ts", ts(skip))]
    pub extra: Map<String, Value>,
}
