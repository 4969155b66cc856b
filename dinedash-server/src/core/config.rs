//! Server configuration
//!
//! All configuration comes from environment variables, read once at process
//! start into an immutable [`Config`].
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/dinedash | Working directory (database, logs) |
//! | HTTP_PORT | 8000 | HTTP API port |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | RESERVATION_WINDOW_MINUTES | 90 | Table/slot overlap window |
//! | RESTAURANT_TIMEZONE | UTC | IANA zone opening hours are read in |
//! | JWT_SECRET | (dev fallback) | JWT signing secret |
//! | JWT_EXPIRATION_MINUTES | 1440 | Token lifetime |
//! | USE_SMTP_FOR_EMAIL | false | Email vs console notifications |
//! | EMAIL_HOST | localhost | SMTP relay host |
//! | EMAIL_PORT | 587 | SMTP relay port |
//! | EMAIL_HOST_USER | (empty) | SMTP username |
//! | EMAIL_HOST_PASSWORD | (empty) | SMTP password |
//! | EMAIL_USE_TLS | true | STARTTLS on the SMTP connection |
//! | EMAIL_TIMEOUT | 2 | SMTP timeout (seconds) |
//! | EMAIL_FROM | no-reply@dinedash.local | From address for outgoing mail |
//! | NOMINATIM_URL | https://nominatim.openstreetmap.org | Geocoder |

use std::path::PathBuf;

use chrono_tz::Tz;

use crate::auth::JwtConfig;

/// Notification transport settings (see [`crate::notify`])
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// When false, notifications go to the console/log sink
    pub use_smtp: bool,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// STARTTLS on the SMTP connection
    pub use_tls: bool,
    /// Connection/send timeout in seconds
    pub timeout_secs: u64,
    /// From address for outgoing mail
    pub from_address: String,
}

impl EmailConfig {
    fn from_env() -> Self {
        Self {
            use_smtp: env_parse("USE_SMTP_FOR_EMAIL", false),
            host: std::env::var("EMAIL_HOST").unwrap_or_else(|_| "localhost".into()),
            port: env_parse("EMAIL_PORT", 587),
            username: std::env::var("EMAIL_HOST_USER").unwrap_or_default(),
            password: std::env::var("EMAIL_HOST_PASSWORD").unwrap_or_default(),
            use_tls: env_parse("EMAIL_USE_TLS", true),
            timeout_secs: env_parse("EMAIL_TIMEOUT", 2),
            from_address: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "no-reply@dinedash.local".into()),
        }
    }
}

/// Server configuration, assembled once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding `database/` and `logs/`
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Running environment: development | staging | production
    pub environment: String,
    /// JWT authentication settings
    pub jwt: JwtConfig,
    /// Overlap window for table/slot conflicts, in minutes
    pub reservation_window_minutes: i64,
    /// Timezone restaurant opening hours are interpreted in
    pub timezone: Tz,
    /// Notification transport settings
    pub email: EmailConfig,
    /// Nominatim base URL for address geocoding
    pub nominatim_url: String,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults where unset.
    pub fn from_env() -> Self {
        let timezone = std::env::var("RESTAURANT_TIMEZONE")
            .ok()
            .and_then(|v| v.parse::<Tz>().ok())
            .unwrap_or(chrono_tz::UTC);

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/dinedash".into()),
            http_port: env_parse("HTTP_PORT", 8000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            jwt: JwtConfig::from_env(),
            reservation_window_minutes: env_parse("RESERVATION_WINDOW_MINUTES", 90),
            timezone,
            email: EmailConfig::from_env(),
            nominatim_url: std::env::var("NOMINATIM_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".into()),
        }
    }

    /// Database directory (`work_dir/database`)
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Log directory (`work_dir/logs`)
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Create the working directory structure if missing
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    /// Overlap window as a chrono duration
    pub fn reservation_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.reservation_window_minutes)
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
