/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | /var/lib/menu-sync | Working directory (database, logs) |
/// | DATABASE_PATH | {WORK_DIR}/menu-sync.db | SQLite file |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | TENANT_ID | default | Tenant whose catalog is read |
/// | CATALOG_URL | - | Catalog Service base URL |
/// | CATALOG_FILE | - | JSON catalog snapshot, used instead of CATALOG_URL |
/// | PLATFORM_URL | http://localhost:4000 | Delivery platform base URL |
/// | PLATFORM_TOKEN | - | Bearer token for the platform |
/// | PLATFORM_TIMEOUT_MS | 30000 | Timeout of catalog and platform HTTP calls |
/// | MODIFIER_FETCH_CONCURRENCY | 8 | Parallel modifier loads during a sync |
/// | LOG_LEVEL | info | Default log level |
/// | LOG_DIR | - | Daily rolling log files, if the directory exists |
/// | ENVIRONMENT | development | development / staging / production |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/menu-sync CATALOG_FILE=catalog.json cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub database_path: String,
    pub http_port: u16,
    pub tenant_id: String,
    pub catalog_url: Option<String>,
    pub catalog_file: Option<String>,
    pub platform_url: String,
    pub platform_token: Option<String>,
    pub platform_timeout_ms: u64,
    pub modifier_fetch_concurrency: usize,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// development | staging | production
    pub environment: String,
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/menu-sync".into());
        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| format!("{}/menu-sync.db", work_dir.trim_end_matches('/')));

        Self {
            database_path,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            tenant_id: std::env::var("TENANT_ID").unwrap_or_else(|_| "default".into()),
            catalog_url: non_empty_var("CATALOG_URL"),
            catalog_file: non_empty_var("CATALOG_FILE"),
            platform_url: std::env::var("PLATFORM_URL")
                .unwrap_or_else(|_| "http://localhost:4000".into()),
            platform_token: non_empty_var("PLATFORM_TOKEN"),
            platform_timeout_ms: std::env::var("PLATFORM_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30000),
            modifier_fetch_concurrency: std::env::var("MODIFIER_FETCH_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(8),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: non_empty_var("LOG_DIR"),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            work_dir,
        }
    }

    /// Override the paths and port; everything else from the environment
    ///
    /// Used by tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_path = format!("{}/menu-sync.db", config.work_dir.trim_end_matches('/'));
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
