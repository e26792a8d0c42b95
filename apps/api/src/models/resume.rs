use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// One uploaded resume. Uploads append rows; the latest `created_at` per user
/// is the "current" resume everywhere it matters.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: String,
    pub file_url: String,
    pub raw_text: String,
    /// Structured fields (skills/experience/education) written by out-of-band
    /// parsing; optional, untyped at rest. See `resumes::parsed` for the
    /// validated view.
    pub parsed_data: Option<Value>,
    pub created_at: DateTime<Utc>,
}
