use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::voice::VoiceClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    /// The one voice-provider client, constructed at startup from `Config`.
    pub voice: VoiceClient,
    pub config: Config,
}
