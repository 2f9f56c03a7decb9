//! Data models for the authenticated identity.
//!
//! These mirror the user payload returned by the authentication API and
//! are cached verbatim in durable storage:
//!
//! - `User`: the identity record with aggregate statistics
//! - `Wallet`: one balance ledger per currency
//! - `InviteCode`: the referral-program record

pub mod invite;
pub mod user;
pub mod wallet;

pub use invite::InviteCode;
pub use user::User;
pub use wallet::Wallet;

use chrono::{DateTime, Utc};

/// Parse an API timestamp. The models keep the original string so the
/// cached record is written back exactly as received.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
