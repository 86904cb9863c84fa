/// Server configuration loaded from environment variables.
pub struct Config {
    pub port: u16,
    pub mongodb_uri: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub sentry_dsn: Option<String>,
    pub environment: String,
}

pub const DEFAULT_PORT: u16 = 5000;

impl Config {
    pub fn from_env() -> Self {
        Self::from_raw_values(
            std::env::var("PORT").ok().as_deref(),
            std::env::var("MONGODB_URI").ok().as_deref(),
            std::env::var("OPENROUTER_API_KEY").ok().as_deref(),
            std::env::var("SENTRY_DSN").ok().as_deref(),
            std::env::var("ENVIRONMENT").ok().as_deref(),
        )
    }

    /// Build a Config from raw string values (as they would come from env vars).
    /// Used directly in tests to avoid mutating process-global environment.
    pub fn from_raw_values(
        port: Option<&str>,
        mongodb_uri: Option<&str>,
        openrouter_api_key: Option<&str>,
        sentry_dsn: Option<&str>,
        environment: Option<&str>,
    ) -> Self {
        let port = port.and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_PORT);

        let environment = environment
            .filter(|s| !s.is_empty())
            .map(String::from)
            .unwrap_or_else(|| "local".to_string());

        Config {
            port,
            mongodb_uri: non_empty(mongodb_uri),
            openrouter_api_key: non_empty(openrouter_api_key),
            sentry_dsn: non_empty(sentry_dsn),
            environment,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(String::from)
}
