//! Signup records and endpoint payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored signup row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRecord {
    /// Normalized (trimmed, lowercased) address.
    pub email: String,
    /// Set by the store at insert time.
    pub created_at: DateTime<Utc>,
    /// Client address reported at signup time.
    pub ip_address: Option<String>,
}

/// Row to insert; `created_at` is left to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSignup {
    pub email: String,
    pub ip_address: String,
}

/// Result of a conditional insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written.
    Inserted,
    /// A row with the same email already existed; nothing was written.
    Duplicate,
}

/// Successful `/signup` body. Duplicates are reported with `success: false`
/// and `duplicate: true` but still carry a 200 status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
}

impl SignupResponse {
    pub const SUBSCRIBED: &'static str = "Thank you for subscribing!";
    pub const ALREADY_SUBSCRIBED: &'static str = "Already Subscribed!";

    pub fn subscribed() -> Self {
        Self {
            success: true,
            message: Self::SUBSCRIBED.to_string(),
            duplicate: false,
        }
    }

    pub fn duplicate() -> Self {
        Self {
            success: false,
            message: Self::ALREADY_SUBSCRIBED.to_string(),
            duplicate: true,
        }
    }
}

/// `/stats` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_signups: u64,
}

/// `/admin-signups` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSignupsResponse {
    pub signups: Vec<SignupRecord>,
    pub total: usize,
}

impl From<Vec<SignupRecord>> for AdminSignupsResponse {
    fn from(signups: Vec<SignupRecord>) -> Self {
        let total = signups.len();
        Self { signups, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_signup_response_shapes() {
        let ok = serde_json::to_value(SignupResponse::subscribed()).unwrap();
        assert_eq!(ok, json!({"success": true, "message": "Thank you for subscribing!"}));

        let dup = serde_json::to_value(SignupResponse::duplicate()).unwrap();
        assert_eq!(
            dup,
            json!({"success": false, "duplicate": true, "message": "Already Subscribed!"})
        );
    }

    #[test]
    fn test_record_parses_postgrest_timestamp() {
        let record: SignupRecord = serde_json::from_value(json!({
            "email": "a@b.co",
            "created_at": "2025-03-01T12:30:00.123456+00:00",
            "ip_address": null
        }))
        .unwrap();

        assert_eq!(record.email, "a@b.co");
        assert_eq!(record.created_at.timestamp(), 1_740_832_200);
        assert!(record.ip_address.is_none());
    }
}
