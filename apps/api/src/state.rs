use std::sync::Arc;

use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::config::Config;
use crate::storage::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Holds short-lived slot locks taken while an interview is being booked.
    pub redis: RedisClient,
    /// Resume storage. S3 by default, a stub when `TEST_MODE` is set.
    pub resumes: Arc<dyn ResumeStore>,
    pub config: Config,
}
