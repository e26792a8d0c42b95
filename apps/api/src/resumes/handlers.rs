use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resumes::extract::{extract_pdf_text, text_long_enough};
use crate::state::AppState;

#[derive(Serialize)]
pub struct UploadResumeResponse {
    pub resume: ResumeRow,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentResumeResponse {
    pub resume_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Serialize)]
pub struct DeleteResumeResponse {
    pub message: &'static str,
}

/// POST /api/v1/resumes
///
/// Accepts a PDF under the multipart field `resume`. The extraction gates run
/// on the in-memory bytes before anything is stored, so a rejected upload
/// leaves neither an orphaned object nor a row behind.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResumeResponse>, AppError> {
    let data = read_resume_field(&mut multipart).await?;
    let raw_text = readable_resume_text(&data)?;

    let key = format!("resumes/{}/{}.pdf", user.id, Uuid::new_v4());
    state
        .s3
        .put_object()
        .bucket(&state.config.s3_bucket)
        .key(&key)
        .body(ByteStream::from(data.clone()))
        .content_type("application/pdf")
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

    let file_url = format!(
        "{}/{}/{}",
        state.config.s3_endpoint, state.config.s3_bucket, key
    );

    let resume: ResumeRow = sqlx::query_as(
        "INSERT INTO resumes (user_id, file_url, raw_text) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(&user.id)
    .bind(&file_url)
    .bind(&raw_text)
    .fetch_one(&state.db)
    .await?;

    info!(
        "Stored resume {} for user {} ({} chars extracted)",
        resume.id,
        user.id,
        raw_text.chars().count()
    );

    Ok(Json(UploadResumeResponse { resume }))
}

/// GET /api/v1/resumes/current
///
/// Latest upload wins. Responds 200 whether or not a resume exists; absence
/// is signalled in the body, not the status.
pub async fn handle_current_resume(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<CurrentResumeResponse>, AppError> {
    let resume: Option<ResumeRow> = sqlx::query_as(
        "SELECT * FROM resumes WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(&user.id)
    .fetch_optional(&state.db)
    .await?;

    let response = match resume {
        Some(r) => CurrentResumeResponse {
            resume_url: Some(r.file_url),
            resume_id: Some(r.id),
            uploaded_at: Some(r.created_at),
            message: None,
        },
        None => CurrentResumeResponse {
            resume_url: None,
            resume_id: None,
            uploaded_at: None,
            message: Some("No resume found"),
        },
    };

    Ok(Json(response))
}

/// DELETE /api/v1/resumes/:resume_id
///
/// Ownership is part of the WHERE clause, so a foreign row and a missing row
/// are indistinguishable to the caller.
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(resume_id): Path<Uuid>,
) -> Result<Json<DeleteResumeResponse>, AppError> {
    let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(resume_id)
        .bind(&user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(
            "Resume not found or access denied".to_string(),
        ));
    }

    info!("Deleted resume {resume_id} for user {}", user.id);

    Ok(Json(DeleteResumeResponse {
        message: "Resume deleted successfully",
    }))
}

/// Both upload gates in one place: the bytes must be a readable PDF (422
/// otherwise) whose extracted text clears the length floor (400 otherwise).
fn readable_resume_text(data: &[u8]) -> Result<String, AppError> {
    let raw_text = extract_pdf_text(data)?;
    if !text_long_enough(&raw_text) {
        return Err(AppError::Validation(
            "Resume content too short or could not be read".to_string(),
        ));
    }
    Ok(raw_text)
}

async fn read_resume_field(multipart: &mut Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart payload: {e}")))?
    {
        if field.name() == Some("resume") {
            return field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")));
        }
    }
    Err(AppError::Validation("No file uploaded".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_response_with_resume_omits_message() {
        let response = CurrentResumeResponse {
            resume_url: Some("https://files.example/resumes/u1/a.pdf".to_string()),
            resume_id: Some(Uuid::new_v4()),
            uploaded_at: Some(Utc::now()),
            message: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("message").is_none());
        assert!(json.get("resumeUrl").is_some());
        assert!(json.get("uploadedAt").is_some());
    }

    #[test]
    fn test_unreadable_pdf_rejected_before_any_store_call() {
        // The gate runs on the raw bytes; a rejected upload must fail here,
        // ahead of the S3 put in the handler.
        let err = readable_resume_text(b"not a pdf at all").unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[test]
    fn test_current_response_without_resume_keeps_null_url() {
        let response = CurrentResumeResponse {
            resume_url: None,
            resume_id: None,
            uploaded_at: None,
            message: Some("No resume found"),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["resumeUrl"].is_null());
        assert_eq!(json["message"], "No resume found");
        assert!(json.get("resumeId").is_none());
    }
}
