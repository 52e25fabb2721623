use std::path::PathBuf;
use std::time::Duration;

use panelsmith_core::model::ImageQuality;
use panelsmith_jobs::client::DEFAULT_JOBS_API_URL;
use panelsmith_jobs::JobsConfig;
use panelsmith_openai::api::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use panelsmith_openai::OpenAiConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the
/// upstream credentials, which default to empty (calls then fail upstream).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds. Sequence runs make two upstream
    /// calls per panel, so this is generous.
    pub request_timeout_secs: u64,
    /// Directory holding the project document.
    pub data_dir: PathBuf,
    pub openai: OpenAiConfig,
    /// Quality tier for panel images.
    pub panel_quality: ImageQuality,
    /// Quality tier for synchronous character images.
    pub character_quality: ImageQuality,
    pub jobs: JobsConfig,
    /// Seconds between reference-job status queries.
    pub job_poll_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                                  |
    /// |--------------------------|----------------------------------------------------------|
    /// | `HOST`                   | `0.0.0.0`                                                |
    /// | `PORT`                   | `3000`                                                   |
    /// | `CORS_ORIGINS`           | `http://localhost:3000`                                  |
    /// | `REQUEST_TIMEOUT_SECS`   | `600`                                                    |
    /// | `DATA_DIR`               | `./data`                                                 |
    /// | `OPENAI_API_KEY`         | (empty)                                                  |
    /// | `OPENAI_BASE_URL`        | `https://api.openai.com/v1`                              |
    /// | `OPENAI_MODEL`           | `gpt-4o`                                                 |
    /// | `PANEL_QUALITY`          | `high`                                                   |
    /// | `CHARACTER_QUALITY`      | `low`                                                    |
    /// | `JOBS_API_URL`           | `https://backend.build.mugafi.com/v1/external/midjourney` |
    /// | `JOBS_API_TOKEN`         | (empty)                                                  |
    /// | `JOB_POLL_INTERVAL_SECS` | `5`                                                      |
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "600")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let data_dir = PathBuf::from(env_or("DATA_DIR", "./data"));

        let openai = OpenAiConfig {
            api_key: env_or("OPENAI_API_KEY", ""),
            base_url: env_or("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            model: env_or("OPENAI_MODEL", DEFAULT_MODEL),
        };

        let panel_quality: ImageQuality = env_or("PANEL_QUALITY", "high")
            .parse()
            .expect("PANEL_QUALITY must be low, medium or high");

        let character_quality: ImageQuality = env_or("CHARACTER_QUALITY", "low")
            .parse()
            .expect("CHARACTER_QUALITY must be low, medium or high");

        let jobs = JobsConfig {
            api_url: env_or("JOBS_API_URL", DEFAULT_JOBS_API_URL),
            api_token: env_or("JOBS_API_TOKEN", ""),
        };

        let job_poll_interval_secs: u64 = env_or("JOB_POLL_INTERVAL_SECS", "5")
            .parse()
            .expect("JOB_POLL_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            data_dir,
            openai,
            panel_quality,
            character_quality,
            jobs,
            job_poll_interval_secs,
        }
    }

    pub fn job_poll_interval(&self) -> Duration {
        Duration::from_secs(self.job_poll_interval_secs.max(1))
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
