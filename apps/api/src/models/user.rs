use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role chosen at first sign-in. Immutable afterwards; there is no edit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Candidate,
    Recruiter,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CANDIDATE" => Some(Role::Candidate),
            "RECRUITER" => Some(Role::Recruiter),
            _ => None,
        }
    }
}

/// A user profile. `id` is the identity-provider subject, not a local id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub role: Role,
    pub company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_known_values() {
        assert_eq!(Role::parse("CANDIDATE"), Some(Role::Candidate));
        assert_eq!(Role::parse("RECRUITER"), Some(Role::Recruiter));
    }

    #[test]
    fn test_role_parse_rejects_other_values() {
        assert_eq!(Role::parse("candidate"), None);
        assert_eq!(Role::parse("ADMIN"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_role_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&Role::Candidate).unwrap(),
            "\"CANDIDATE\""
        );
        assert_eq!(
            serde_json::to_string(&Role::Recruiter).unwrap(),
            "\"RECRUITER\""
        );
    }
}
