use std::path::PathBuf;

use shared::order::FulfillmentPolicy;

use crate::auth::JwtConfig;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | /var/lib/selempangku | Work directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development / staging / production |
/// | RESTOCK_ON_REJECT | false | Restore product stock when a payment is rejected |
/// | STRICT_FULFILLMENT | false | Enforce forward-only fulfillment transitions |
/// | ADMIN_USERNAME | admin | Seeded operator account (first start) |
/// | ADMIN_PASSWORD | unset | Operator password; bootstrap is skipped when unset |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/selempangku HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Work directory for database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Runtime environment: development | staging | production
    pub environment: String,

    // === Order/payment policy ===
    /// Restore stock when a payment is rejected. The original system never
    /// restored stock once reserved; that stays the default.
    pub restock_on_reject: bool,
    /// Fulfillment transition policy for the admin status endpoint
    pub fulfillment_policy: FulfillmentPolicy,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let strict = std::env::var("STRICT_FULFILLMENT")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/selempangku".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            restock_on_reject: std::env::var("RESTOCK_ON_REJECT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            fulfillment_policy: if strict {
                FulfillmentPolicy::Strict
            } else {
                FulfillmentPolicy::Permissive
            },
        }
    }

    /// Override work dir and port, for tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Make sure the work directory layout exists
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
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
