/// Interview session state machine.
///
/// States: PENDING → IN_PROGRESS → ANALYSIS_PENDING → {COMPLETED | FAILED}.
/// Every transition has a causal event; nothing moves on a timer. This
/// service writes the first three states; the terminal pair belongs to the
/// downstream transcript-analysis worker.
///
/// Concurrency is settled at the storage layer, not with locks:
/// - one application per (candidate, job) via `ON CONFLICT DO UPDATE`
/// - one session per application via `ON CONFLICT DO NOTHING` + re-fetch
/// Two concurrent starts converge on the same row and the same answer.
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::models::interview::{InterviewSessionRow, SessionStatus};
use crate::voice::VoiceClient;

pub struct StartOutcome {
    pub session_id: Uuid,
    pub call_id: String,
    /// True when an existing provider call was returned instead of dialing.
    pub reused: bool,
}

/// Runs the start-interview pipeline for an authenticated candidate.
///
/// Order matters: the resume precondition and job lookup run before any row
/// is written, so a rejected start leaves no application or session behind.
pub async fn start_interview(
    pool: &PgPool,
    voice: &VoiceClient,
    candidate_id: &str,
    job_id: Uuid,
    candidate_number: &str,
) -> Result<StartOutcome, AppError> {
    let resume_id = latest_resume_id(pool, candidate_id)
        .await?
        .ok_or_else(missing_resume_error)?;

    let job_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM jobs WHERE id = $1)")
        .bind(job_id)
        .fetch_one(pool)
        .await?;
    if !job_exists {
        return Err(AppError::NotFound("Job not found".to_string()));
    }

    let application = upsert_application(pool, candidate_id, job_id, resume_id).await?;
    let session = find_or_create_session(pool, application.id).await?;

    // Re-invite policy: once a provider call exists for this session, repeat
    // starts return it untouched. Issuing a second call would double-dial the
    // candidate and orphan the first transcript.
    if let Some(existing) = reuse_existing_call(&session) {
        return Ok(StartOutcome {
            session_id: session.id,
            call_id: existing.to_string(),
            reused: true,
        });
    }

    // Single attempt. Call creation is not idempotent; a blind retry could
    // dial twice.
    let call = voice.create_call(candidate_number, session.id).await?;

    if let Err(e) = mark_in_progress(pool, session.id, &call.id).await {
        // The provider call is now live with no session pointing at it.
        // Compensation here is detection: log both ids for the reconciliation
        // sweep, then fail the request.
        error!(
            "orphaned provider call {} for session {}: {e}",
            call.id, session.id
        );
        return Err(AppError::Database(e));
    }

    Ok(StartOutcome {
        session_id: session.id,
        call_id: call.id,
        reused: false,
    })
}

/// Hard precondition, not a retryable error: a candidate with no resume on
/// file cannot start an interview, and no session row is created.
fn missing_resume_error() -> AppError {
    AppError::Validation(
        "Resume required to start interview, but not found for candidate.".to_string(),
    )
}

/// Latest upload wins; older rows stay for audit.
pub async fn latest_resume_id(pool: &PgPool, user_id: &str) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT id FROM resumes WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// One application per (candidate, job), enforced by the unique constraint.
/// A repeat start refreshes the invited status and repoints at the latest
/// resume instead of erroring.
async fn upsert_application(
    pool: &PgPool,
    candidate_id: &str,
    job_id: Uuid,
    resume_id: Uuid,
) -> Result<ApplicationRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO applications (candidate_id, job_id, resume_id, status)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (candidate_id, job_id)
        DO UPDATE SET status = EXCLUDED.status,
                      resume_id = EXCLUDED.resume_id,
                      updated_at = now()
        RETURNING *
        "#,
    )
    .bind(candidate_id)
    .bind(job_id)
    .bind(resume_id)
    .bind(ApplicationStatus::InterviewInvited)
    .fetch_one(pool)
    .await
}

/// One session per application. The insert is a no-op when the row already
/// exists; the follow-up SELECT always finds exactly one row, whichever
/// request created it.
async fn find_or_create_session(
    pool: &PgPool,
    application_id: Uuid,
) -> Result<InterviewSessionRow, sqlx::Error> {
    sqlx::query(
        "INSERT INTO interview_sessions (application_id) VALUES ($1) \
         ON CONFLICT (application_id) DO NOTHING",
    )
    .bind(application_id)
    .execute(pool)
    .await?;

    sqlx::query_as("SELECT * FROM interview_sessions WHERE application_id = $1")
        .bind(application_id)
        .fetch_one(pool)
        .await
}

/// The re-invite decision: any stored call id means the provider was already
/// engaged for this session, whatever state it has reached since.
pub fn reuse_existing_call(session: &InterviewSessionRow) -> Option<&str> {
    session.call_id.as_deref()
}

async fn mark_in_progress(
    pool: &PgPool,
    session_id: Uuid,
    call_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE interview_sessions SET status = $1, call_id = $2, updated_at = now() \
         WHERE id = $3",
    )
    .bind(SessionStatus::InProgress)
    .bind(call_id)
    .bind(session_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Call-ended update. Redeliveries vary in payload: an event that carries no
/// transcript must keep the one already stored, hence the COALESCE. Terminal
/// rows are excluded so a late replay never regresses a finalized session.
const CALL_ENDED_UPDATE: &str = r#"
    UPDATE interview_sessions
    SET status = $2, transcript = COALESCE($3, transcript), updated_at = now()
    WHERE call_id = $1 AND status <> $4 AND status <> $5
"#;

/// Applies a call-ended event: transcript stored verbatim, status moves to
/// ANALYSIS_PENDING. Redelivery with a transcript is an idempotent overwrite;
/// redelivery without one leaves the stored transcript alone. Returns the
/// number of rows matched so the caller can tell a dropped event from an
/// applied one.
pub async fn record_call_ended(
    pool: &PgPool,
    call_id: &str,
    transcript: Option<&str>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(CALL_ENDED_UPDATE)
        .bind(call_id)
        .bind(SessionStatus::AnalysisPending)
        .bind(transcript)
        .bind(SessionStatus::Completed)
        .bind(SessionStatus::Failed)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
