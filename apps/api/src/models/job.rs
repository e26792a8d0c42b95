use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Closed,
}

impl JobStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(JobStatus::Active),
            "closed" => Some(JobStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub department: String,
    pub location: String,
    pub salary: String,
    pub description: String,
    pub requirements: String,
    pub required_skills: Vec<String>,
    pub status: JobStatus,
    pub posted_date: DateTime<Utc>,
}

/// A job with its company name joined in; what listings and detail views return.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobWithCompanyRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub department: String,
    pub location: String,
    pub salary: String,
    pub description: String,
    pub requirements: String,
    pub required_skills: Vec<String>,
    pub status: JobStatus,
    pub posted_date: DateTime<Utc>,
    pub company_name: String,
}
