/// Voice provider webhook (POST /api/v1/voice/webhook).
///
/// CRITICAL: this endpoint never returns an error status. Provider webhooks
/// retry on non-2xx, and a malformed or unmatchable event must not trigger a
/// retry storm. Internal failures are logged and swallowed; the provider
/// always sees 200.
use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::{FromRow, PgPool};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::interviews::session::record_call_ended;
use crate::models::interview::SessionStatus;
use crate::state::AppState;
use crate::voice::events::{CallStatus, ServerMessage, CALL_ENDED};

/// Tool the assistant invokes mid-call to pull the candidate's resume.
pub const RESUME_DATA_FUNCTION: &str = "get_candidate_resume_data";

/// Tool results the model reads back. These are strings the assistant
/// interprets, not HTTP errors; wording is part of the contract.
const RESUME_NOT_FOUND_RESULT: &str = r#"{"error":"Resume data not found for this session."}"#;
const LOOKUP_FAILED_RESULT: &str = r#"{"error":"Internal server error during data retrieval."}"#;
const RESUME_RETRIEVED_MESSAGE: &str =
    "Resume data retrieved successfully. Use this to ask questions.";

pub async fn handle_voice_webhook(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    // The provider wraps every event as {message: {...}}.
    let Some(message) = body.get("message") else {
        return Json(received_ack());
    };

    match ServerMessage::parse(message.clone()) {
        ServerMessage::FunctionCall { function_call } => {
            if function_call.name != RESUME_DATA_FUNCTION {
                return Json(received_ack());
            }
            let result = resume_data_result(
                &state.db,
                function_call.parameters.interview_session_id.as_deref(),
            )
            .await;
            Json(function_call_response(RESUME_DATA_FUNCTION, result))
        }
        ServerMessage::StatusUpdate { status, call } => {
            if status == CALL_ENDED {
                match call {
                    Some(call) => apply_call_ended(&state.db, &call).await,
                    None => warn!("call-ended status update without call payload"),
                }
            }
            Json(received_ack())
        }
        ServerMessage::Unknown => Json(received_ack()),
    }
}

#[derive(FromRow)]
struct SessionResumeRow {
    parsed_data: Option<Value>,
    job_title: Option<String>,
}

/// Field order is the wire order the assistant was prompted with.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResumeDataResult<'a> {
    parsed_resume: &'a Value,
    job_title: &'a str,
    message: &'static str,
}

/// Resolves session → application → resume/job for the tool call. A garbage
/// session id, a vanished resume, and a never-parsed resume all look the same
/// to the assistant: not found.
async fn resume_data_result(pool: &PgPool, session_id: Option<&str>) -> String {
    let Some(session_id) = session_id.and_then(|raw| Uuid::parse_str(raw).ok()) else {
        return RESUME_NOT_FOUND_RESULT.to_string();
    };

    let row: Result<Option<SessionResumeRow>, sqlx::Error> = sqlx::query_as(
        r#"
        SELECT r.parsed_data, j.title AS job_title
        FROM interview_sessions s
        JOIN applications a ON a.id = s.application_id
        LEFT JOIN resumes r ON r.id = a.resume_id
        LEFT JOIN jobs j ON j.id = a.job_id
        WHERE s.id = $1
        "#,
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await;

    match row {
        Ok(Some(SessionResumeRow {
            parsed_data: Some(parsed),
            job_title,
        })) => found_result(&parsed, job_title.as_deref()),
        Ok(_) => RESUME_NOT_FOUND_RESULT.to_string(),
        Err(e) => {
            error!("resume lookup failed for session {session_id}: {e}");
            LOOKUP_FAILED_RESULT.to_string()
        }
    }
}

fn found_result(parsed: &Value, job_title: Option<&str>) -> String {
    let payload = ResumeDataResult {
        parsed_resume: parsed,
        job_title: job_title.unwrap_or("unknown job"),
        message: RESUME_RETRIEVED_MESSAGE,
    };
    serde_json::to_string(&payload).unwrap_or_else(|_| LOOKUP_FAILED_RESULT.to_string())
}

async fn apply_call_ended(pool: &PgPool, call: &CallStatus) {
    match record_call_ended(pool, &call.id, call.transcript.as_deref()).await {
        // Unknown call id, the event raced ahead of the call-id write, or the
        // session is already finalized. Dropping it is safe: the provider
        // redelivers, and a terminal session must not regress anyway.
        Ok(0) => match call_status(pool, &call.id).await {
            Some(status) if status.is_terminal() => {
                warn!("call-ended for finalized call {}; dropped", call.id)
            }
            _ => warn!("call-ended for unmatched call {}; dropped", call.id),
        },
        Ok(_) => info!("stored transcript for call {}", call.id),
        Err(e) => error!("failed to apply call-ended for call {}: {e}", call.id),
    }
}

/// Best-effort status probe for the drop log; errors just mean less context.
async fn call_status(pool: &PgPool, call_id: &str) -> Option<SessionStatus> {
    sqlx::query_scalar("SELECT status FROM interview_sessions WHERE call_id = $1")
        .bind(call_id)
        .fetch_optional(pool)
        .await
        .ok()
        .flatten()
}

fn function_call_response(name: &str, result: String) -> Value {
    json!({ "functionCall": { "name": name, "result": result } })
}

fn received_ack() -> Value {
    json!({ "received": true })
}
