use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::job::{JobRow, JobStatus, JobWithCompanyRow};
use crate::models::user::UserRow;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct JobListQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub title: String,
    pub department: String,
    pub location: String,
    pub salary: String,
    pub description: String,
    pub requirements: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
}

const JOB_WITH_COMPANY: &str = r#"
    SELECT j.*, c.name AS company_name
    FROM jobs j
    JOIN companies c ON c.id = j.company_id
"#;

/// GET /api/v1/jobs
///
/// Public listing, newest first. `?status=active` narrows to open roles;
/// anything other than the two known statuses is a 400.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<Vec<JobWithCompanyRow>>, AppError> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(JobStatus::parse(raw).ok_or_else(|| {
            AppError::Validation(format!("Invalid status filter: {raw}"))
        })?),
        None => None,
    };

    let jobs: Vec<JobWithCompanyRow> = match status {
        Some(status) => {
            sqlx::query_as(&format!(
                "{JOB_WITH_COMPANY} WHERE j.status = $1 ORDER BY j.posted_date DESC"
            ))
            .bind(status)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as(&format!("{JOB_WITH_COMPANY} ORDER BY j.posted_date DESC"))
                .fetch_all(&state.db)
                .await?
        }
    };

    Ok(Json(jobs))
}

/// GET /api/v1/jobs/:job_id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobWithCompanyRow>, AppError> {
    let job: Option<JobWithCompanyRow> =
        sqlx::query_as(&format!("{JOB_WITH_COMPANY} WHERE j.id = $1"))
            .bind(job_id)
            .fetch_optional(&state.db)
            .await?;

    let job = job.ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    Ok(Json(job))
}

/// POST /api/v1/jobs
///
/// Only recruiters attached to a company can post; the job is owned by that
/// company, never one named in the request.
pub async fn handle_create_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    let profile: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(&user.id)
        .fetch_optional(&state.db)
        .await?;

    let company_id = profile
        .and_then(|p| p.company_id)
        .ok_or(AppError::Forbidden)?;

    validate_create_job(&req)?;

    let job: JobRow = sqlx::query_as(
        r#"
        INSERT INTO jobs
            (company_id, title, department, location, salary, description,
             requirements, required_skills)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(company_id)
    .bind(&req.title)
    .bind(&req.department)
    .bind(&req.location)
    .bind(&req.salary)
    .bind(&req.description)
    .bind(&req.requirements)
    .bind(&req.required_skills)
    .fetch_one(&state.db)
    .await?;

    info!("Created job {} for company {company_id}", job.id);

    Ok((StatusCode::CREATED, Json(job)))
}

/// Every text field is required; `required_skills` may be empty.
fn validate_create_job(req: &CreateJobRequest) -> Result<(), AppError> {
    let required = [
        &req.title,
        &req.department,
        &req.location,
        &req.salary,
        &req.description,
        &req.requirements,
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_req() -> CreateJobRequest {
        CreateJobRequest {
            title: "Backend Engineer".to_string(),
            department: "Engineering".to_string(),
            location: "Remote".to_string(),
            salary: "$150k".to_string(),
            description: "Build services.".to_string(),
            requirements: "Rust, SQL".to_string(),
            required_skills: vec![],
        }
    }

    #[test]
    fn test_complete_request_passes_validation() {
        assert!(validate_create_job(&create_req()).is_ok());
    }

    #[test]
    fn test_any_blank_text_field_fails_validation() {
        for blank in ["", "   "] {
            let mut req = create_req();
            req.department = blank.to_string();
            assert!(validate_create_job(&req).is_err());

            let mut req = create_req();
            req.location = blank.to_string();
            assert!(validate_create_job(&req).is_err());

            let mut req = create_req();
            req.title = blank.to_string();
            assert!(validate_create_job(&req).is_err());
        }
    }

    #[test]
    fn test_empty_skills_list_is_allowed() {
        let req = create_req();
        assert!(req.required_skills.is_empty());
        assert!(validate_create_job(&req).is_ok());
    }

    #[test]
    fn test_create_job_request_defaults_skills() {
        let req: CreateJobRequest = serde_json::from_value(json!({
            "title": "Backend Engineer",
            "department": "Engineering",
            "location": "Remote",
            "salary": "$150k",
            "description": "Build services.",
            "requirements": "Rust, SQL"
        }))
        .unwrap();
        assert!(req.required_skills.is_empty());
    }

    #[test]
    fn test_create_job_request_accepts_camel_case_skills() {
        let req: CreateJobRequest = serde_json::from_value(json!({
            "title": "Backend Engineer",
            "department": "Engineering",
            "location": "Remote",
            "salary": "$150k",
            "description": "Build services.",
            "requirements": "Rust, SQL",
            "requiredSkills": ["Rust", "PostgreSQL"]
        }))
        .unwrap();
        assert_eq!(req.required_skills, vec!["Rust", "PostgreSQL"]);
    }
}
