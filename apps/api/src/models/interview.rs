use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::application::ApplicationStatus;

/// Lifecycle of one screening call.
///
/// `Pending`: row exists, no provider call yet.
/// `InProgress`: provider acknowledged the call; `call_id` is set.
/// `AnalysisPending`: provider reported call-ended; transcript captured.
/// `Completed` / `Failed`: terminal, written only by downstream analysis
/// (nothing in this service transitions into them).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Pending,
    InProgress,
    AnalysisPending,
    Completed,
    Failed,
}

impl SessionStatus {
    /// Terminal states are sticky: a late or replayed `call-ended` webhook
    /// must never regress a session downstream analysis already finalized.
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }
}

/// One AI screening interview tied to exactly one application
/// (UNIQUE on application_id at the storage layer).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSessionRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub session_type: String,
    pub status: SessionStatus,
    /// Provider-assigned call id; null until the provider acknowledges the
    /// call. Webhooks match sessions by this id, not by application id.
    pub call_id: Option<String>,
    pub transcript: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flattened session + application + job + company row for the candidate's
/// interview list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSummaryRow {
    pub id: Uuid,
    pub status: SessionStatus,
    pub session_type: String,
    pub created_at: DateTime<Utc>,
    pub application_id: Uuid,
    pub application_status: ApplicationStatus,
    pub job_id: Uuid,
    pub job_title: String,
    pub company_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::AnalysisPending).unwrap(),
            "\"ANALYSIS_PENDING\""
        );
        assert_eq!(
            serde_json::to_string(&SessionStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
    }

    #[test]
    fn test_status_deserializes_screaming_snake() {
        let s: SessionStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(s, SessionStatus::Pending);
    }

    #[test]
    fn test_only_completed_and_failed_are_terminal() {
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
        assert!(!SessionStatus::Pending.is_terminal());
        assert!(!SessionStatus::InProgress.is_terminal());
        assert!(!SessionStatus::AnalysisPending.is_terminal());
    }
}
