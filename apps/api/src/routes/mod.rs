pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::interviews::handlers as interviews;
use crate::interviews::webhook;
use crate::jobs::handlers as jobs;
use crate::profiles::handlers as profiles;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile
        .route("/api/v1/profile", post(profiles::handle_create_profile))
        .route("/api/v1/profile/role", get(profiles::handle_get_role))
        // Jobs
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route("/api/v1/jobs/:job_id", get(jobs::handle_get_job))
        // Resumes
        .route("/api/v1/resumes", post(resumes::handle_upload_resume))
        .route(
            "/api/v1/resumes/current",
            get(resumes::handle_current_resume),
        )
        .route(
            "/api/v1/resumes/:resume_id",
            delete(resumes::handle_delete_resume),
        )
        // Interviews
        .route(
            "/api/v1/interviews",
            get(interviews::handle_list_interviews),
        )
        .route(
            "/api/v1/interviews/start",
            post(interviews::handle_start_interview),
        )
        .route(
            "/api/v1/interviews/assistants",
            post(interviews::handle_create_assistant_session),
        )
        // Provider callbacks (no identity headers; the provider is the caller)
        .route("/api/v1/voice/webhook", post(webhook::handle_voice_webhook))
        .with_state(state)
}
