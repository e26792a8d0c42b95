use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::interviews::prompt::assistant_request;
use crate::interviews::session::start_interview;
use crate::models::interview::InterviewSummaryRow;
use crate::models::job::JobWithCompanyRow;
use crate::models::resume::ResumeRow;
use crate::resumes::parsed::ParsedResume;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewRequest {
    pub job_id: Option<String>,
    pub candidate_number: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewResponse {
    pub message: &'static str,
    pub call_id: String,
    pub session_id: Uuid,
}

/// POST /api/v1/interviews/start
///
/// Runs the start pipeline (resume precondition, application upsert, session
/// insert-or-fetch, provider call). A duplicate start is answered with the
/// existing call rather than an error.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<StartInterviewRequest>,
) -> Result<Json<StartInterviewResponse>, AppError> {
    let (job_id, candidate_number) = parse_start_request(&req)?;

    let outcome =
        start_interview(&state.db, &state.voice, &user.id, job_id, &candidate_number).await?;

    info!(
        "Interview start for user {}: session {} call {} (reused: {})",
        user.id, outcome.session_id, outcome.call_id, outcome.reused
    );

    Ok(Json(StartInterviewResponse {
        message: start_message(outcome.reused),
        call_id: outcome.call_id,
        session_id: outcome.session_id,
    }))
}

/// GET /api/v1/interviews
///
/// The authenticated candidate's sessions, newest first, flattened with the
/// application, job, and company they belong to.
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<InterviewSummaryRow>>, AppError> {
    let sessions: Vec<InterviewSummaryRow> = sqlx::query_as(
        r#"
        SELECT s.id, s.status, s.session_type, s.created_at,
               a.id AS application_id, a.status AS application_status,
               j.id AS job_id, j.title AS job_title, c.name AS company_name
        FROM interview_sessions s
        JOIN applications a ON a.id = s.application_id
        JOIN jobs j ON j.id = a.job_id
        JOIN companies c ON c.id = j.company_id
        WHERE a.candidate_id = $1
        ORDER BY s.created_at DESC
        "#,
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(sessions))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssistantSessionRequest {
    pub job_id: Option<String>,
    pub resume_id: Option<String>,
    pub candidate_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssistantSessionResponse {
    pub assistant_id: String,
}

/// POST /api/v1/interviews/assistants
///
/// Builds a per-interview assistant on the provider from the job posting and
/// the named resume, and returns its id for the browser SDK to dial.
pub async fn handle_create_assistant_session(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<CreateAssistantSessionRequest>,
) -> Result<Json<CreateAssistantSessionResponse>, AppError> {
    let (job_id, resume_id, candidate_id) = parse_assistant_request(&req)?;

    let job: Option<JobWithCompanyRow> = sqlx::query_as(
        "SELECT j.*, c.name AS company_name FROM jobs j \
         JOIN companies c ON c.id = j.company_id WHERE j.id = $1",
    )
    .bind(job_id)
    .fetch_optional(&state.db)
    .await?;
    let job = job.ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    let resume: Option<ResumeRow> =
        sqlx::query_as("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
            .bind(resume_id)
            .bind(&candidate_id)
            .fetch_optional(&state.db)
            .await?;
    let resume = resume.ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

    let parsed = ParsedResume::from_stored(resume.parsed_data.as_ref());
    let request = assistant_request(&job, &resume.raw_text, parsed.as_ref());
    let assistant = state.voice.create_assistant(&request).await?;

    info!(
        "Created assistant {} for job {} / candidate {}",
        assistant.id, job.id, candidate_id
    );

    Ok(Json(CreateAssistantSessionResponse {
        assistant_id: assistant.id,
    }))
}

fn start_message(reused: bool) -> &'static str {
    if reused {
        "Interview already started"
    } else {
        "Interview call initiated"
    }
}

fn parse_start_request(req: &StartInterviewRequest) -> Result<(Uuid, String), AppError> {
    let job_id = non_blank(req.job_id.as_deref());
    let number = non_blank(req.candidate_number.as_deref());
    let (Some(job_id), Some(number)) = (job_id, number) else {
        return Err(AppError::Validation("Missing required fields".to_string()));
    };

    let job_id = Uuid::parse_str(job_id)
        .map_err(|_| AppError::Validation(format!("Invalid jobId: {job_id}")))?;
    Ok((job_id, number.to_string()))
}

fn parse_assistant_request(
    req: &CreateAssistantSessionRequest,
) -> Result<(Uuid, Uuid, String), AppError> {
    let (Some(job_id), Some(resume_id), Some(candidate_id)) = (
        non_blank(req.job_id.as_deref()),
        non_blank(req.resume_id.as_deref()),
        non_blank(req.candidate_id.as_deref()),
    ) else {
        return Err(AppError::Validation(
            "Missing required parameters: jobId, resumeId, candidateId".to_string(),
        ));
    };

    let job_id = Uuid::parse_str(job_id)
        .map_err(|_| AppError::Validation(format!("Invalid jobId: {job_id}")))?;
    let resume_id = Uuid::parse_str(resume_id)
        .map_err(|_| AppError::Validation(format!("Invalid resumeId: {resume_id}")))?;
    Ok((job_id, resume_id, candidate_id.to_string()))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_req(job_id: Option<&str>, number: Option<&str>) -> StartInterviewRequest {
        StartInterviewRequest {
            job_id: job_id.map(String::from),
            candidate_number: number.map(String::from),
        }
    }

    #[test]
    fn test_start_request_missing_fields() {
        for req in [
            start_req(None, Some("browser")),
            start_req(Some("5a4db224-5006-4cb6-9d5b-56d07fbbbd63"), None),
            start_req(Some("   "), Some("browser")),
            start_req(Some("5a4db224-5006-4cb6-9d5b-56d07fbbbd63"), Some("")),
        ] {
            let err = parse_start_request(&req).unwrap_err();
            match err {
                AppError::Validation(msg) => assert_eq!(msg, "Missing required fields"),
                other => panic!("expected Validation, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_start_request_rejects_malformed_job_id() {
        let err = parse_start_request(&start_req(Some("not-a-uuid"), Some("browser"))).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_start_request_accepts_valid_input() {
        let (job_id, number) = parse_start_request(&start_req(
            Some("5a4db224-5006-4cb6-9d5b-56d07fbbbd63"),
            Some(" +15551234567 "),
        ))
        .unwrap();
        assert_eq!(job_id.to_string(), "5a4db224-5006-4cb6-9d5b-56d07fbbbd63");
        assert_eq!(number, "+15551234567");
    }

    #[test]
    fn test_start_message_selection() {
        assert_eq!(start_message(false), "Interview call initiated");
        assert_eq!(start_message(true), "Interview already started");
    }

    #[test]
    fn test_start_response_uses_camel_case() {
        let response = StartInterviewResponse {
            message: "Interview call initiated",
            call_id: "call_1".to_string(),
            session_id: Uuid::new_v4(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("callId").is_some());
        assert!(json.get("sessionId").is_some());
        assert!(json.get("call_id").is_none());
    }

    #[test]
    fn test_assistant_request_requires_all_fields() {
        let err = parse_assistant_request(&CreateAssistantSessionRequest {
            job_id: Some("5a4db224-5006-4cb6-9d5b-56d07fbbbd63".to_string()),
            resume_id: None,
            candidate_id: Some("user_1".to_string()),
        })
        .unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert_eq!(msg, "Missing required parameters: jobId, resumeId, candidateId")
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
