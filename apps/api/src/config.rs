use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    /// Custom S3 endpoint (MinIO, localstack). `None` talks to AWS.
    pub s3_endpoint: Option<String>,
    pub aws_region: String,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub cors_allowed_origins: Vec<String>,
    pub cors_allow_credentials: bool,
    /// Skip resume uploads and record a stub URL instead.
    pub test_mode: bool,
    /// Base URL of the candidate-facing app, used to build share links.
    pub public_app_url: String,
    pub resume_max_bytes: usize,
    pub slot_lock_ttl_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: env_or("S3_BUCKET", "hireeasy-resumes"),
            s3_endpoint: optional_env("S3_ENDPOINT"),
            aws_region: env_or("AWS_REGION", "us-east-1"),
            aws_access_key_id: optional_env("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: optional_env("AWS_SECRET_ACCESS_KEY"),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            cors_allowed_origins: split_list(&env_or(
                "CORS_ALLOWED_ORIGINS",
                "http://localhost:3000",
            )),
            cors_allow_credentials: parse_bool("CORS_ALLOW_CREDENTIALS", "true")?,
            test_mode: parse_bool("TEST_MODE", "false")? || parse_bool("S3_TEST_MODE", "false")?,
            public_app_url: env_or("PUBLIC_APP_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            resume_max_bytes: env_or("RESUME_MAX_BYTES", "10485760")
                .parse::<usize>()
                .context("RESUME_MAX_BYTES must be a positive integer")?,
            slot_lock_ttl_ms: env_or("SLOT_LOCK_TTL_MS", "5000")
                .parse::<u64>()
                .context("SLOT_LOCK_TTL_MS must be a positive integer")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_bool(key: &str, default: &str) -> Result<bool> {
    let raw = env_or(key, default);
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => anyhow::bail!("{key} must be a boolean, got '{other}'"),
    }
}

/// Splits a comma-separated env value, dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
