use std::path::PathBuf;

use fitout_core::credentials::DEFAULT_INVITATION_EXPIRY_DAYS;

use crate::auth::jwt::JwtConfig;

/// Default maximum floor-plan upload size (20 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Root directory for uploaded floor plans.
    pub upload_dir: PathBuf,
    /// Upper bound on request bodies, and therefore on uploads.
    pub max_upload_bytes: usize,
    /// Lifetime of new invitations when the request does not specify one.
    pub invitation_expiry_days: i64,
    /// Initial admin account created when no admin exists yet.
    pub admin_bootstrap: Option<AdminBootstrap>,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

/// Credentials for the first administrator.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                 |
    /// |----------------------------|-------------------------|
    /// | `HOST`                     | `0.0.0.0`               |
    /// | `PORT`                     | `3000`                  |
    /// | `CORS_ORIGINS`             | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                    |
    /// | `UPLOAD_DIR`               | `storage/floor-plans`   |
    /// | `MAX_UPLOAD_BYTES`         | `20971520`              |
    /// | `INVITATION_EXPIRY_DAYS`   | `14`                    |
    /// | `ADMIN_BOOTSTRAP_EMAIL`    | unset                   |
    /// | `ADMIN_BOOTSTRAP_PASSWORD` | unset                   |
    ///
    /// # Panics
    ///
    /// Panics on unparsable numbers and when JWT configuration is missing.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let upload_dir = PathBuf::from(
            std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "storage/floor-plans".into()),
        );

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let invitation_expiry_days: i64 = std::env::var("INVITATION_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_INVITATION_EXPIRY_DAYS.to_string())
            .parse()
            .expect("INVITATION_EXPIRY_DAYS must be a valid i64");
        assert!(invitation_expiry_days > 0, "INVITATION_EXPIRY_DAYS must be positive");

        let admin_bootstrap = match (
            std::env::var("ADMIN_BOOTSTRAP_EMAIL"),
            std::env::var("ADMIN_BOOTSTRAP_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminBootstrap { email, password })
            }
            _ => None,
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            upload_dir,
            max_upload_bytes,
            invitation_expiry_days,
            admin_bootstrap,
            jwt,
        }
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
